pub mod customer;
pub mod load_profile;
pub mod stamp;
pub mod usage;

pub use customer::{CustomerLabels, CustomerRecord};
pub use load_profile::{IntervalReading, LpRecord, Quantity, TimeSlot};
pub use usage::{
    Cell, Column, MeterSlot, OutputRow, PowerUsage, ResultSet, RowShape, API_ERROR_SENTINEL,
};
