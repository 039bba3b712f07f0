use std::{fs::File, path::PathBuf};

use csv::StringRecord;
use kepco_client::domain::{CustomerLabels, CustomerRecord};

use crate::pipeline::{PipelineError, Source, SourceStream};

pub const CUSTOMER_NUMBER_COLUMN: &str = "고객번호";
pub const BONBU_COLUMN: &str = "본부명";
pub const CENTER_COLUMN: &str = "센터";
pub const TEAM_COLUMN: &str = "팀";
pub const GUKSA_COLUMN: &str = "국사";

/// Customer directory read from the reference CSV.
///
/// Expected header columns (by name):
/// - 고객번호 (customer number, kept as text so leading zeros survive)
/// - 본부명 (optional)
/// - 센터 (optional)
/// - 팀 (optional)
/// - 국사 (optional)
///
/// Rows with an empty customer number are skipped.
pub struct CustomerCsvFileSource {
    path: PathBuf,
}

impl CustomerCsvFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

fn parse_optional_string(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

struct ColumnIndex {
    customer_number: usize,
    bonbu: Option<usize>,
    center: Option<usize>,
    team: Option<usize>,
    guksa: Option<usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self, PipelineError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
        };

        Ok(Self {
            customer_number: find(CUSTOMER_NUMBER_COLUMN).ok_or_else(|| {
                PipelineError::Source(format!(
                    "missing column '{CUSTOMER_NUMBER_COLUMN}' in customer CSV"
                ))
            })?,
            bonbu: find(BONBU_COLUMN),
            center: find(CENTER_COLUMN),
            team: find(TEAM_COLUMN),
            guksa: find(GUKSA_COLUMN),
        })
    }

    fn record_to_customer(&self, record: &StringRecord) -> Option<CustomerRecord> {
        let get = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .and_then(parse_optional_string)
        };

        let customer_number = get(Some(self.customer_number))?;
        Some(CustomerRecord::new(
            customer_number,
            CustomerLabels {
                bonbu: get(self.bonbu),
                center: get(self.center),
                team: get(self.team),
                guksa: get(self.guksa),
            },
        ))
    }
}

#[async_trait::async_trait]
impl Source<CustomerRecord> for CustomerCsvFileSource {
    async fn stream(&self) -> SourceStream<CustomerRecord> {
        // The directory is a few dozen rows; a blocking reader inside the stream is fine.
        let path = self.path.clone();
        let s = async_stream::try_stream! {
            let file = File::open(&path).map_err(|e| {
                PipelineError::Source(format!(
                    "failed to open customer CSV {}: {e}",
                    path.display()
                ))
            })?;
            let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(file);
            let headers = rdr
                .headers()
                .map_err(|e| PipelineError::Source(format!("failed to read CSV headers: {e}")))?
                .clone();
            let columns = ColumnIndex::from_headers(&headers)?;

            for result in rdr.records() {
                let record = result.map_err(|e| PipelineError::Source(format!(
                    "failed to read CSV record: {e}"
                )))?;

                match columns.record_to_customer(&record) {
                    Some(customer) => yield customer,
                    None => {
                        metrics::counter!("customer_csv_skipped_rows_total").increment(1);
                        tracing::debug!(
                            line = ?record.position().map(|p| p.line()),
                            "skipping row without customer number"
                        );
                    }
                }
            }
        };

        Box::pin(s)
    }
}
