pub mod config;
pub mod dataset;
pub mod dates;
pub mod live;
pub mod pipeline;
pub mod render;

pub use config::{BoundingBox, DateWindow, SkyFareConfig};
pub use dataset::{generate_fares, HistoricalFare};
pub use dates::{DateInputError, DateRange};
pub use live::{FetchError, FetchOutcome, LiveFlightRecord, LiveSource, OpenSkyFetcher};
pub use pipeline::{build_page, PageFragments, PageReport, RefreshForm, RouteSummary};
