use std::{sync::Arc, time::Duration};

use anyhow::Result;
use kepco_client::KepcoClient;
use power_saving_service::{
    api, config::AppConfig, dates::Clock, metrics_server, observability, AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let cfg = AppConfig::load()?;

    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr)?;
    }

    if cfg.upstream.service_key.is_empty() {
        tracing::warn!("upstream service key is empty; set KEPCO_SERVICE_KEY");
    }

    let client = KepcoClient::new(
        &cfg.upstream.base_url,
        &cfg.upstream.service_key,
        Duration::from_secs(cfg.upstream.timeout_secs),
    )?;

    let state = AppState {
        api: Arc::new(client),
        directory: cfg.directory.path.clone(),
        clock: Clock::from_hours(cfg.clock.utc_offset_hours),
    };

    api::serve(&cfg.server.bind_addr, state).await
}
