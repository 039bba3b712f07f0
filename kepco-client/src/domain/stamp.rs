//! Compact date stamps used on the wire (`YYYYMMDD`, `YYYYMMDDHHMM`).

use time::{macros::format_description, Date, PrimitiveDateTime};

pub fn parse_compact_date(s: &str) -> Option<Date> {
    Date::parse(s.trim(), format_description!("[year][month][day]")).ok()
}

pub fn parse_compact_date_time(s: &str) -> Option<PrimitiveDateTime> {
    PrimitiveDateTime::parse(
        s.trim(),
        format_description!("[year][month][day][hour][minute]"),
    )
    .ok()
}

pub fn compact_date(date: Date) -> String {
    format!(
        "{:04}{:02}{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

pub fn compact_date_time(stamp: PrimitiveDateTime) -> String {
    format!(
        "{}{:02}{:02}",
        compact_date(stamp.date()),
        stamp.hour(),
        stamp.minute()
    )
}
