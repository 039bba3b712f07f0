pub mod kepco;

use time::{Date, PrimitiveDateTime};

use crate::domain::LpRecord;

pub use kepco::KepcoClient;

/// Why a single upstream call produced no usable list.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamFailure {
    /// Non-200 answer; rendered as the bare status code.
    #[error("{0}")]
    Status(u16),
    #[error("{0}")]
    Transport(String),
    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Result of one (customer, date) or (customer, date-time) call.
///
/// Failures are values here: whether one aborts a request or becomes an
/// `"API Error"` row is decided by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Always non-empty.
    Records(Vec<LpRecord>),
    NoData,
    Failed(UpstreamFailure),
}

impl FetchOutcome {
    pub fn from_records(records: Vec<LpRecord>) -> Self {
        if records.is_empty() {
            FetchOutcome::NoData
        } else {
            FetchOutcome::Records(records)
        }
    }
}

/// Load-profile endpoints of the upstream API.
#[async_trait::async_trait]
pub trait LoadProfileApi: Send + Sync {
    /// `getDayLpData.do`: one record per meter with `pwr_qtyHHMM` fields.
    async fn day_lp(&self, customer_number: &str, date: Date) -> FetchOutcome;

    /// `getMinuteLpData.do`: records with a single `pwr_qty` reading.
    async fn minute_lp(&self, customer_number: &str, stamp: PrimitiveDateTime) -> FetchOutcome;
}
