//! Typed view over the free-form records of `dayLpDataInfoList` and
//! `minuteLpDataInfoList`.
//!
//! Day records carry one numeric field per interval, named `pwr_qtyHHMM`.
//! Minute records carry a single `pwr_qty` plus their own `mr_ymd`/`mr_hhmi`
//! stamp. Field order is the order of the upstream payload.

use std::{
    fmt,
    iter::Sum,
    ops::Add,
};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use time::Date;

use super::stamp;

pub const QUANTITY_PREFIX: &str = "pwr_qty";
pub const MINUTE_QUANTITY_FIELD: &str = "pwr_qty";
pub const METER_NO_FIELD: &str = "meterNo";
pub const MINUTE_DATE_FIELD: &str = "mr_ymd";
pub const MINUTE_TIME_FIELD: &str = "mr_hhmi";

static SLOT_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^pwr_qty(\d{4})$").expect("slot field pattern is valid"));

/// Numeric energy quantity as it arrived from upstream.
///
/// Integers stay integers when summed so the rendered JSON keeps the legacy
/// shape (`15`, not `15.0`); any float promotes the result to a float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Quantity {
    Int(i64),
    Float(f64),
}

impl Quantity {
    pub const ZERO: Quantity = Quantity::Int(0);

    /// Only JSON numbers count. Booleans, strings and nulls are skipped.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .map(Quantity::Int)
                .or_else(|| n.as_f64().map(Quantity::Float)),
            _ => None,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Quantity::Int(v) => v as f64,
            Quantity::Float(v) => v,
        }
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Quantity) -> Quantity {
        match (self, rhs) {
            (Quantity::Int(a), Quantity::Int(b)) => a
                .checked_add(b)
                .map(Quantity::Int)
                .unwrap_or_else(|| Quantity::Float(a as f64 + b as f64)),
            (a, b) => Quantity::Float(a.as_f64() + b.as_f64()),
        }
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Quantity>>(iter: I) -> Quantity {
        iter.fold(Quantity::ZERO, Add::add)
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Quantity::Int(v) => serializer.serialize_i64(v),
            Quantity::Float(v) => serializer.serialize_f64(v),
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Int(v) => write!(f, "{v}"),
            Quantity::Float(v) => write!(f, "{v}"),
        }
    }
}

/// Wall-clock label of a reading, rendered `HH:MM`.
///
/// Not a `time::Time`: the last interval of a day is labelled `2400`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSlot {
    hour: u8,
    minute: u8,
}

impl TimeSlot {
    pub fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }

    /// Parses a compact `HHMM` label. Only the shape is checked.
    pub fn parse_compact(s: &str) -> Option<Self> {
        if s.len() != 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self {
            hour: s[..2].parse().ok()?,
            minute: s[2..].parse().ok()?,
        })
    }
}

impl From<time::Time> for TimeSlot {
    fn from(t: time::Time) -> Self {
        Self::new(t.hour(), t.minute())
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// One `pwr_qtyHHMM` reading of a day record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalReading {
    pub slot: TimeSlot,
    pub quantity: Quantity,
}

/// One element of an upstream LP list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct LpRecord {
    fields: Map<String, Value>,
}

impl LpRecord {
    pub fn meter_no(&self) -> Option<String> {
        self.fields.get(METER_NO_FIELD).and_then(text_of)
    }

    /// Every numeric field named with the quantity prefix, in payload order.
    pub fn prefixed_quantities(&self) -> impl Iterator<Item = (&str, Quantity)> + '_ {
        self.fields.iter().filter_map(|(name, value)| {
            if !name.starts_with(QUANTITY_PREFIX) {
                return None;
            }
            Quantity::from_json(value).map(|q| (name.as_str(), q))
        })
    }

    /// Sum of [`Self::prefixed_quantities`]; zero when no field matches.
    pub fn total(&self) -> Quantity {
        self.prefixed_quantities().map(|(_, q)| q).sum()
    }

    /// Numeric `pwr_qtyHHMM` fields, in payload order.
    pub fn interval_readings(&self) -> impl Iterator<Item = IntervalReading> + '_ {
        self.fields.iter().filter_map(|(name, value)| {
            let caps = SLOT_FIELD.captures(name)?;
            let slot = TimeSlot::parse_compact(caps.get(1)?.as_str())?;
            let quantity = Quantity::from_json(value)?;
            Some(IntervalReading { slot, quantity })
        })
    }

    pub fn minute_quantity(&self) -> Option<Quantity> {
        self.fields
            .get(MINUTE_QUANTITY_FIELD)
            .and_then(Quantity::from_json)
    }

    pub fn reading_date(&self) -> Option<Date> {
        self.fields
            .get(MINUTE_DATE_FIELD)
            .and_then(text_of)
            .and_then(|s| stamp::parse_compact_date(&s))
    }

    pub fn reading_time(&self) -> Option<TimeSlot> {
        self.fields
            .get(MINUTE_TIME_FIELD)
            .and_then(text_of)
            .and_then(|s| TimeSlot::parse_compact(&s))
    }
}

/// Upstream sends identifiers and stamps as strings, occasionally as numbers.
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
