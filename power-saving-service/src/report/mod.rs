//! Scheduled daily reports: two spreadsheets for yesterday, mailed together.

pub mod dispatch;
pub mod mailer;

use std::path::{Path, PathBuf};

use kepco_client::{domain::stamp::compact_date, LoadProfileApi};
use time::{Date, OffsetDateTime};

use crate::{
    aggregate::{self, AggregateError, DailyTotal, FailurePolicy, Interval},
    pipeline::{drain, PipelineError},
    render::{xlsx, RenderError},
    sources::CustomerCsvFileSource,
};

pub use dispatch::{run_daily_reports, DispatchSummary};
pub use mailer::{MailError, ReportMailer, SmtpMailer};

#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Directory(#[from] PipelineError),
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Daily,
    Interval,
}

impl ReportKind {
    pub fn label(self) -> &'static str {
        match self {
            ReportKind::Daily => "daily",
            ReportKind::Interval => "15min",
        }
    }

    pub fn table_name(self) -> &'static str {
        match self {
            ReportKind::Daily => "DailyReportTable",
            ReportKind::Interval => "Min15ReportTable",
        }
    }

    /// `kepco_daily_report_20241002_060000.xlsx`
    pub fn file_name(self, generated_at: OffsetDateTime) -> String {
        format!(
            "kepco_{}_report_{}_{:02}{:02}{:02}.xlsx",
            self.label(),
            compact_date(generated_at.date()),
            generated_at.hour(),
            generated_at.minute(),
            generated_at.second()
        )
    }
}

pub struct ReportGenerator<'a> {
    api: &'a dyn LoadProfileApi,
    directory: &'a Path,
    output_dir: &'a Path,
}

impl<'a> ReportGenerator<'a> {
    pub fn new(api: &'a dyn LoadProfileApi, directory: &'a Path, output_dir: &'a Path) -> Self {
        Self {
            api,
            directory,
            output_dir,
        }
    }

    /// Builds one report for `report_date` and writes it under the output dir.
    pub async fn generate(
        &self,
        kind: ReportKind,
        report_date: Date,
        generated_at: OffsetDateTime,
    ) -> Result<PathBuf, ReportError> {
        let customers = drain(&CustomerCsvFileSource::new(self.directory)).await?;
        let days = [report_date];

        let set = match kind {
            ReportKind::Daily => {
                let policy = FailurePolicy::RecordInline;
                aggregate::collect(&DailyTotal, self.api, &customers, &days, policy).await?
            }
            ReportKind::Interval => {
                let policy = FailurePolicy::Skip;
                aggregate::collect(&Interval, self.api, &customers, &days, policy).await?
            }
        };

        let path = self.output_dir.join(kind.file_name(generated_at));
        xlsx::write_xlsx_file(&set, kind.table_name(), &path)?;

        metrics::counter!("reports_generated_total", "kind" => kind.label()).increment(1);
        tracing::info!(
            report = kind.label(),
            %report_date,
            rows = set.len(),
            path = %path.display(),
            "report written"
        );
        Ok(path)
    }
}
