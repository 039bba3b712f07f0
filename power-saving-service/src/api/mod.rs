pub mod error;
pub mod handlers;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use axum::{routing::get, Router};
use kepco_client::{domain::CustomerRecord, LoadProfileApi};

use crate::{
    dates::Clock,
    pipeline::{drain, PipelineError},
    sources::CustomerCsvFileSource,
};

pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn LoadProfileApi>,
    pub directory: PathBuf,
    pub clock: Clock,
}

impl AppState {
    /// The directory is re-read on every request so edits apply without a restart.
    pub async fn customers(&self) -> Result<Vec<CustomerRecord>, PipelineError> {
        drain(&CustomerCsvFileSource::new(&self.directory)).await
    }
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/powerSaving/kepcoDailyData", get(handlers::kepco_daily_data))
        .route("/powerSaving/kepcoDailyData15min", get(handlers::kepco_daily_data_15min))
        .route("/powerSaving/kepco15minData", get(handlers::kepco_15min_data))
        .route("/powerSaving/kepcoDailyRangeData", get(handlers::kepco_daily_range_data))
        .route("/test/hello", get(handlers::hello))
        .route("/test/datetime", get(handlers::datetime))
}

/// Routes are served both at the root and under the legacy `/api` prefix.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes())
        .nest("/api", routes())
        .with_state(state)
}

pub async fn serve(bind_addr: &str, state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr = bind_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid server.bind_addr: {e}"))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "power-saving API listening");

    axum::serve(listener, router(state).into_make_service()).await?;
    Ok(())
}
