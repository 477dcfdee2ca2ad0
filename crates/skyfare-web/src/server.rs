use crate::page::render_index;
use anyhow::{Context, Result};
use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::{Form, Router};
use log::{debug, error, info};
use skyfare_core::{build_page, LiveSource, OpenSkyFetcher, RefreshForm, SkyFareConfig};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Shared per-process state. Nothing in here changes after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<SkyFareConfig>,
    pub source: Arc<dyn LiveSource>,
}

impl AppState {
    pub fn new(config: SkyFareConfig) -> Self {
        let source = Arc::new(OpenSkyFetcher::new(&config));
        Self::with_source(config, source)
    }

    pub fn with_source(config: SkyFareConfig, source: Arc<dyn LiveSource>) -> Self {
        Self {
            config: Arc::new(config),
            source,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index).post(refresh))
        .with_state(state)
}

pub async fn serve(bind_addr: &str, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("Listening — addr=http://{}/", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

async fn index(State(state): State<AppState>) -> Result<Html<String>, (StatusCode, String)> {
    render_view(state, None).await
}

// A POST without a usable form body is treated as a refresh with both fields
// missing, so it gets the inline date error instead of a bare 4xx.
async fn refresh(
    State(state): State<AppState>,
    form: Result<Form<RefreshForm>, FormRejection>,
) -> Result<Html<String>, (StatusCode, String)> {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            debug!("Unreadable refresh form — reason={}", rejection);
            RefreshForm::default()
        }
    };
    render_view(state, Some(form)).await
}

// The live fetch blocks, so the whole page is built on the blocking pool.
async fn render_view(
    state: AppState,
    form: Option<RefreshForm>,
) -> Result<Html<String>, (StatusCode, String)> {
    tokio::task::spawn_blocking(move || {
        let report = build_page(&state.config, state.source.as_ref(), form.as_ref());
        let fragments = report.render(state.config.live_row_limit);
        render_index(&fragments, &state.config.window)
    })
    .await
    .map(Html)
    .map_err(|e| {
        error!("Page render task failed: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    })
}
