//! Output rows and the column projection shared by every renderer.

use serde::{
    ser::{SerializeMap, SerializeSeq},
    Serialize, Serializer,
};
use time::Date;

use super::{CustomerLabels, CustomerRecord, Quantity, TimeSlot};

/// Rendered in place of a value when the upstream call failed.
pub const API_ERROR_SENTINEL: &str = "API Error";

#[derive(Debug, Clone, PartialEq)]
pub enum PowerUsage {
    Measured(Quantity),
    /// Upstream answered with an empty list.
    NoData,
    /// Upstream call failed; the reason is kept for logs only.
    Failed(String),
}

impl PowerUsage {
    pub fn to_cell(&self) -> Cell {
        match self {
            PowerUsage::Measured(q) => Cell::Number(*q),
            PowerUsage::NoData => Cell::Empty,
            PowerUsage::Failed(_) => Cell::Text(API_ERROR_SENTINEL.to_string()),
        }
    }
}

/// A single rendered value: JSON string / number / null, or an XLSX cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(Quantity),
    Empty,
}

impl From<Option<String>> for Cell {
    fn from(v: Option<String>) -> Self {
        v.map(Cell::Text).unwrap_or(Cell::Empty)
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::Number(q) => q.serialize(serializer),
            Cell::Empty => serializer.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    CustomerNumber,
    MeterNo,
    Date,
    Time,
    Bonbu,
    Center,
    Team,
    Guksa,
    PowerUsage,
}

impl Column {
    pub const fn header(self) -> &'static str {
        match self {
            Column::CustomerNumber => "Customer Number",
            Column::MeterNo => "MeterNo",
            Column::Date => "Date",
            Column::Time => "Time",
            Column::Bonbu => "Bonbu",
            Column::Center => "Center",
            Column::Team => "Team",
            Column::Guksa => "Guksa",
            Column::PowerUsage => "Power Usage",
        }
    }
}

const DAILY_COLUMNS: &[Column] = &[
    Column::CustomerNumber,
    Column::Date,
    Column::Bonbu,
    Column::Center,
    Column::Team,
    Column::Guksa,
    Column::PowerUsage,
];

const INTERVAL_COLUMNS: &[Column] = &[
    Column::CustomerNumber,
    Column::MeterNo,
    Column::Date,
    Column::Time,
    Column::Bonbu,
    Column::Center,
    Column::Team,
    Column::Guksa,
    Column::PowerUsage,
];

/// Column layout of a result set. 15-minute and minute rows share `Interval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowShape {
    DailyTotal,
    Interval,
}

impl RowShape {
    pub fn columns(self) -> &'static [Column] {
        match self {
            RowShape::DailyTotal => DAILY_COLUMNS,
            RowShape::Interval => INTERVAL_COLUMNS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeterSlot {
    pub meter_no: Option<String>,
    pub time: Option<TimeSlot>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputRow {
    pub customer_number: String,
    pub date: Date,
    pub labels: CustomerLabels,
    pub slot: Option<MeterSlot>,
    pub power_usage: PowerUsage,
}

impl OutputRow {
    pub fn daily(customer: &CustomerRecord, date: Date, power_usage: PowerUsage) -> Self {
        Self {
            customer_number: customer.customer_number.clone(),
            date,
            labels: customer.labels.clone(),
            slot: None,
            power_usage,
        }
    }

    pub fn interval(
        customer: &CustomerRecord,
        date: Date,
        slot: MeterSlot,
        power_usage: PowerUsage,
    ) -> Self {
        Self {
            customer_number: customer.customer_number.clone(),
            date,
            labels: customer.labels.clone(),
            slot: Some(slot),
            power_usage,
        }
    }

    pub fn cell(&self, column: Column) -> Cell {
        let slot = self.slot.as_ref();
        match column {
            Column::CustomerNumber => Cell::Text(self.customer_number.clone()),
            Column::MeterNo => slot.and_then(|s| s.meter_no.clone()).into(),
            // `Date`'s Display is already ISO `YYYY-MM-DD`.
            Column::Date => Cell::Text(self.date.to_string()),
            Column::Time => slot.and_then(|s| s.time).map(|t| t.to_string()).into(),
            Column::Bonbu => self.labels.bonbu.clone().into(),
            Column::Center => self.labels.center.clone().into(),
            Column::Team => self.labels.team.clone().into(),
            Column::Guksa => self.labels.guksa.clone().into(),
            Column::PowerUsage => self.power_usage.to_cell(),
        }
    }
}

/// Ordered rows of one request or report run. No dedup, no sort.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    shape: RowShape,
    rows: Vec<OutputRow>,
}

impl ResultSet {
    pub fn new(shape: RowShape) -> Self {
        Self {
            shape,
            rows: Vec::new(),
        }
    }

    pub fn shape(&self) -> RowShape {
        self.shape
    }

    pub fn rows(&self) -> &[OutputRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn extend(&mut self, rows: impl IntoIterator<Item = OutputRow>) {
        self.rows.extend(rows);
    }

    pub fn columns(&self) -> &'static [Column] {
        self.shape.columns()
    }

    /// Rows projected onto this set's columns, in column order.
    pub fn cell_rows(&self) -> impl Iterator<Item = Vec<Cell>> + '_ {
        let columns = self.columns();
        self.rows
            .iter()
            .map(move |row| columns.iter().map(|c| row.cell(*c)).collect())
    }
}

struct RowView<'a> {
    columns: &'static [Column],
    row: &'a OutputRow,
}

impl Serialize for RowView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for column in self.columns {
            map.serialize_entry(column.header(), &self.row.cell(*column))?;
        }
        map.end()
    }
}

impl Serialize for ResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let columns = self.columns();
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&RowView { columns, row })?;
        }
        seq.end()
    }
}
