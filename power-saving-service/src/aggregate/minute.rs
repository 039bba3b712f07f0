use kepco_client::{
    domain::{CustomerRecord, LpRecord, MeterSlot, OutputRow, PowerUsage, RowShape, TimeSlot},
    FetchOutcome, LoadProfileApi, UpstreamFailure,
};
use time::PrimitiveDateTime;

use super::Aggregation;

/// Passes `pwr_qty` readings through, stamped with the record's own
/// `mr_ymd`/`mr_hhmi`. The queried stamp stands in when those are unusable.
#[derive(Debug, Clone, Copy, Default)]
pub struct Minute;

#[async_trait::async_trait]
impl Aggregation for Minute {
    type Key = PrimitiveDateTime;

    fn shape(&self) -> RowShape {
        RowShape::Interval
    }

    async fn fetch(
        &self,
        api: &dyn LoadProfileApi,
        customer_number: &str,
        at: PrimitiveDateTime,
    ) -> FetchOutcome {
        api.minute_lp(customer_number, at).await
    }

    fn measured_rows(
        &self,
        customer: &CustomerRecord,
        at: PrimitiveDateTime,
        records: &[LpRecord],
    ) -> Vec<OutputRow> {
        records
            .iter()
            .filter_map(|record| {
                let quantity = record.minute_quantity()?;
                let time = record
                    .reading_time()
                    .unwrap_or_else(|| TimeSlot::from(at.time()));
                Some(OutputRow::interval(
                    customer,
                    record.reading_date().unwrap_or(at.date()),
                    MeterSlot {
                        meter_no: record.meter_no(),
                        time: Some(time),
                    },
                    PowerUsage::Measured(quantity),
                ))
            })
            .collect()
    }

    fn no_data_rows(&self, _customer: &CustomerRecord, _at: PrimitiveDateTime) -> Vec<OutputRow> {
        Vec::new()
    }

    fn failure_row(
        &self,
        customer: &CustomerRecord,
        at: PrimitiveDateTime,
        failure: &UpstreamFailure,
    ) -> OutputRow {
        OutputRow::interval(
            customer,
            at.date(),
            MeterSlot {
                meter_no: None,
                time: Some(TimeSlot::from(at.time())),
            },
            PowerUsage::Failed(failure.to_string()),
        )
    }
}

#[cfg(test)]
mod tests {
    use kepco_client::domain::{Column, Quantity};
    use serde_json::json;
    use time::macros::{date, datetime};

    use super::*;
    use crate::aggregate::{aggregate_outcome, testing::*, FailurePolicy};

    const AT: PrimitiveDateTime = datetime!(2024 - 10 - 01 13:15);

    fn run(outcome: FetchOutcome) -> Vec<OutputRow> {
        let customer = customer("12345");
        aggregate_outcome(&Minute, &customer, AT, &outcome, FailurePolicy::RecordInline).unwrap()
    }

    #[test]
    fn uses_the_records_own_stamp() {
        let rows = run(records(json!([
            { "meterNo": "M1", "mr_ymd": "20240930", "mr_hhmi": "2345", "pwr_qty": 7 },
            { "meterNo": "M1", "mr_ymd": "20241001", "mr_hhmi": "0000", "pwr_qty": "7" }
        ])));

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, date!(2024 - 09 - 30));
        assert_eq!(serde_json::to_value(rows[0].cell(Column::Time)).unwrap(), json!("23:45"));
        assert_eq!(rows[0].power_usage, PowerUsage::Measured(Quantity::Int(7)));
    }

    #[test]
    fn ignores_prefixed_interval_fields() {
        let rows = run(records(json!([{ "meterNo": "M1", "pwr_qty0015": 7 }])));
        assert!(rows.is_empty());
    }

    #[test]
    fn falls_back_to_queried_stamp() {
        let rows = run(records(json!([{ "meterNo": "M1", "mr_ymd": "bogus", "pwr_qty": 1.5 }])));
        assert_eq!(rows[0].date, date!(2024 - 10 - 01));
        assert_eq!(serde_json::to_value(rows[0].cell(Column::Time)).unwrap(), json!("13:15"));
    }
}
