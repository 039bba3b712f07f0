//! Turns upstream load profiles into output rows.
//!
//! Each variant (daily total, 15-minute, minute) implements [`Aggregation`];
//! [`collect`] drives any of them over customers and keys, strictly one
//! upstream call at a time. What a failed or empty call turns into is chosen
//! per call site with a [`FailurePolicy`].

pub mod daily;
pub mod interval;
pub mod minute;

use std::fmt;

use kepco_client::{
    domain::{CustomerRecord, LpRecord, OutputRow, ResultSet, RowShape},
    FetchOutcome, LoadProfileApi, UpstreamFailure,
};

pub use daily::DailyTotal;
pub use interval::Interval;
pub use minute::Minute;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Failed calls become an `"API Error"` row; empty calls become the
    /// variant's no-data rows.
    RecordInline,
    /// Failed and empty calls are logged and produce nothing.
    Skip,
    /// The first failed or empty call ends the whole run.
    Abort,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    #[error("API Error for Customer Number {customer_number}: {failure}")]
    Upstream {
        customer_number: String,
        failure: UpstreamFailure,
    },
    #[error("No data found for Customer Number {customer_number}")]
    NoData { customer_number: String },
}

#[async_trait::async_trait]
pub trait Aggregation: Send + Sync {
    /// What a single upstream call is keyed by besides the customer.
    type Key: Copy + Send + Sync + fmt::Display;

    fn shape(&self) -> RowShape;

    async fn fetch(
        &self,
        api: &dyn LoadProfileApi,
        customer_number: &str,
        key: Self::Key,
    ) -> FetchOutcome;

    /// Rows for a non-empty record list.
    fn measured_rows(
        &self,
        customer: &CustomerRecord,
        key: Self::Key,
        records: &[LpRecord],
    ) -> Vec<OutputRow>;

    /// Rows for an empty record list under [`FailurePolicy::RecordInline`].
    fn no_data_rows(&self, customer: &CustomerRecord, key: Self::Key) -> Vec<OutputRow>;

    /// The sentinel row for a failed call under [`FailurePolicy::RecordInline`].
    fn failure_row(
        &self,
        customer: &CustomerRecord,
        key: Self::Key,
        failure: &UpstreamFailure,
    ) -> OutputRow;
}

/// Applies `policy` to one upstream outcome.
pub fn aggregate_outcome<A: Aggregation>(
    aggregation: &A,
    customer: &CustomerRecord,
    key: A::Key,
    outcome: &FetchOutcome,
    policy: FailurePolicy,
) -> Result<Vec<OutputRow>, AggregateError> {
    let customer_number = customer.customer_number.as_str();

    match outcome {
        FetchOutcome::Records(records) => Ok(aggregation.measured_rows(customer, key, records)),
        FetchOutcome::NoData => match policy {
            FailurePolicy::RecordInline => Ok(aggregation.no_data_rows(customer, key)),
            FailurePolicy::Skip => {
                tracing::warn!(
                    customer_number,
                    %key,
                    "No data found for Customer Number {customer_number}"
                );
                Ok(Vec::new())
            }
            FailurePolicy::Abort => Err(AggregateError::NoData {
                customer_number: customer_number.to_string(),
            }),
        },
        FetchOutcome::Failed(failure) => match policy {
            FailurePolicy::RecordInline => {
                Ok(vec![aggregation.failure_row(customer, key, failure)])
            }
            FailurePolicy::Skip => {
                tracing::warn!(
                    customer_number,
                    %key,
                    "API Error for Customer Number {customer_number}: {failure}"
                );
                Ok(Vec::new())
            }
            FailurePolicy::Abort => Err(AggregateError::Upstream {
                customer_number: customer_number.to_string(),
                failure: failure.clone(),
            }),
        },
    }
}

/// Fetches and aggregates every (key, customer) pair, keys outermost.
pub async fn collect<A: Aggregation>(
    aggregation: &A,
    api: &dyn LoadProfileApi,
    customers: &[CustomerRecord],
    keys: &[A::Key],
    policy: FailurePolicy,
) -> Result<ResultSet, AggregateError> {
    let mut results = ResultSet::new(aggregation.shape());

    for &key in keys {
        for customer in customers {
            let outcome = aggregation.fetch(api, &customer.customer_number, key).await;

            metrics::counter!("kepco_upstream_requests_total").increment(1);
            match &outcome {
                FetchOutcome::Records(_) => {}
                FetchOutcome::NoData => {
                    metrics::counter!("kepco_upstream_empty_total").increment(1)
                }
                FetchOutcome::Failed(_) => {
                    metrics::counter!("kepco_upstream_failures_total").increment(1)
                }
            }

            results.extend(aggregate_outcome(aggregation, customer, key, &outcome, policy)?);
        }
    }

    tracing::info!(
        rows = results.len(),
        customers = customers.len(),
        keys = keys.len(),
        "aggregation finished"
    );
    Ok(results)
}
