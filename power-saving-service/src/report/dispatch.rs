use std::path::PathBuf;

use super::{mailer::ReportMailer, ReportGenerator, ReportKind};
use crate::dates::Clock;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub generated: Vec<PathBuf>,
    pub mailed: bool,
}

/// Builds yesterday's daily and 15-minute reports, mails whatever was
/// produced and removes the files afterwards.
///
/// A failed report does not stop the other one. Nothing is mailed when
/// neither report could be written.
pub async fn run_daily_reports(
    generator: &ReportGenerator<'_>,
    mailer: &dyn ReportMailer,
    clock: &Clock,
) -> DispatchSummary {
    let report_date = clock.yesterday();
    let mut summary = DispatchSummary::default();

    for kind in [ReportKind::Daily, ReportKind::Interval] {
        match generator.generate(kind, report_date, clock.now()).await {
            Ok(path) => summary.generated.push(path),
            Err(e) => tracing::error!(
                report = kind.label(),
                %report_date,
                error = %e,
                "report generation failed"
            ),
        }
    }

    if summary.generated.is_empty() {
        tracing::error!(%report_date, "no report generated, skipping mail");
        return summary;
    }

    match mailer.send_reports(&summary.generated, clock.today()).await {
        Ok(()) => summary.mailed = true,
        Err(e) => tracing::error!(error = %e, "failed to send report mail"),
    }

    for path in &summary.generated {
        match tokio::fs::remove_file(path).await {
            Ok(()) => tracing::debug!(path = %path.display(), "removed report file"),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove report file")
            }
        }
    }

    summary
}
