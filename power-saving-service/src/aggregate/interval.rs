use kepco_client::{
    domain::{CustomerRecord, LpRecord, MeterSlot, OutputRow, PowerUsage, RowShape},
    FetchOutcome, LoadProfileApi, UpstreamFailure,
};
use time::Date;

use super::Aggregation;

/// One row per `pwr_qtyHHMM` reading, in the order upstream listed them.
///
/// Slots missing from the payload are simply absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct Interval;

#[async_trait::async_trait]
impl Aggregation for Interval {
    type Key = Date;

    fn shape(&self) -> RowShape {
        RowShape::Interval
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
        records
            .iter()
            .flat_map(|record| {
                let meter_no = record.meter_no();
                record.interval_readings().map(move |reading| {
                    OutputRow::interval(
                        customer,
                        date,
                        MeterSlot {
                            meter_no: meter_no.clone(),
                            time: Some(reading.slot),
                        },
                        PowerUsage::Measured(reading.quantity),
                    )
                })
            })
            .collect()
    }

    fn no_data_rows(&self, _customer: &CustomerRecord, _date: Date) -> Vec<OutputRow> {
        Vec::new()
    }

    fn failure_row(
        &self,
        customer: &CustomerRecord,
        date: Date,
        failure: &UpstreamFailure,
    ) -> OutputRow {
        OutputRow::interval(
            customer,
            date,
            MeterSlot::default(),
            PowerUsage::Failed(failure.to_string()),
        )
    }
}
