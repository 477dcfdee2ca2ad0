pub mod page;
pub mod server;

pub use server::{router, serve, AppState};
