//! One-shot job: build yesterday's reports, mail them, clean up.
//! Meant to be run from cron once a day.

use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use kepco_client::KepcoClient;
use power_saving_service::{
    config::AppConfig,
    dates::Clock,
    observability,
    report::{run_daily_reports, ReportGenerator, SmtpMailer},
};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let cfg = AppConfig::load()?;
    let mail_cfg = cfg
        .mail
        .clone()
        .ok_or_else(|| anyhow!("[mail] section is required for the report job"))?;

    let client = KepcoClient::new(
        &cfg.upstream.base_url,
        &cfg.upstream.service_key,
        Duration::from_secs(cfg.upstream.timeout_secs),
    )?;
    let clock = Clock::from_hours(cfg.clock.utc_offset_hours);
    let output_dir = cfg.report_output_dir();

    let generator = ReportGenerator::new(&client, &cfg.directory.path, &output_dir);
    let mailer = SmtpMailer::new(mail_cfg);

    let summary = run_daily_reports(&generator, &mailer, &clock).await;
    tracing::info!(
        reports = summary.generated.len(),
        mailed = summary.mailed,
        "report job finished"
    );

    if summary.generated.is_empty() {
        bail!("no report could be generated");
    }
    Ok(())
}
