use kepco_client::{
    domain::{CustomerRecord, LpRecord, OutputRow, PowerUsage, Quantity, RowShape},
    FetchOutcome, LoadProfileApi, UpstreamFailure,
};
use time::Date;

use super::Aggregation;

/// One row per customer per day: the sum of every `pwr_qty*` number.
///
/// A present record without any matching field sums to 0; only an empty
/// record list yields `null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DailyTotal;

#[async_trait::async_trait]
impl Aggregation for DailyTotal {
    type Key = Date;

    fn shape(&self) -> RowShape {
        RowShape::DailyTotal
    }

    async fn fetch(
        &self,
        api: &dyn LoadProfileApi,
        customer_number: &str,
        date: Date,
    ) -> FetchOutcome {
        api.day_lp(customer_number, date).await
    }

    fn measured_rows(
        &self,
        customer: &CustomerRecord,
        date: Date,
        records: &[LpRecord],
    ) -> Vec<OutputRow> {
        let total: Quantity = records.iter().map(LpRecord::total).sum();
        vec![OutputRow::daily(customer, date, PowerUsage::Measured(total))]
    }

    fn no_data_rows(&self, customer: &CustomerRecord, date: Date) -> Vec<OutputRow> {
        vec![OutputRow::daily(customer, date, PowerUsage::NoData)]
    }

    fn failure_row(
        &self,
        customer: &CustomerRecord,
        date: Date,
        failure: &UpstreamFailure,
    ) -> OutputRow {
        OutputRow::daily(customer, date, PowerUsage::Failed(failure.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::date;

    use super::*;
    use crate::aggregate::{aggregate_outcome, testing::*, FailurePolicy};

    const DAY: Date = date!(2024 - 10 - 01);

    fn run(outcome: FetchOutcome) -> Vec<OutputRow> {
        let customer = customer("12345");
        aggregate_outcome(&DailyTotal, &customer, DAY, &outcome, FailurePolicy::RecordInline)
            .unwrap()
    }

    #[test]
    fn sums_every_prefixed_number_across_records() {
        let rows = run(records(json!([
            { "meterNo": "M1", "pwr_qty0015": 10, "pwr_qty0030": 5, "pwr_qty0045": "n/a" },
            { "meterNo": "M2", "pwr_qty0015": 2.5 }
        ])));

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].power_usage, PowerUsage::Measured(Quantity::Float(17.5)));
        assert_eq!(rows[0].date, DAY);
        assert!(rows[0].slot.is_none());
    }

    #[test]
    fn record_without_quantities_sums_to_zero() {
        let rows = run(records(json!([{ "meterNo": "M1", "custNo": "12345" }])));
        assert_eq!(rows[0].power_usage, PowerUsage::Measured(Quantity::ZERO));
    }

    #[test]
    fn empty_list_is_null() {
        let rows = run(FetchOutcome::NoData);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].power_usage, PowerUsage::NoData);
    }

    #[test]
    fn failed_call_is_api_error_row() {
        let rows = run(FetchOutcome::Failed(UpstreamFailure::Status(500)));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].power_usage, PowerUsage::Failed("500".to_string()));
        assert_eq!(
            serde_json::to_value(rows[0].power_usage.to_cell()).unwrap(),
            json!("API Error")
        );
    }
}
