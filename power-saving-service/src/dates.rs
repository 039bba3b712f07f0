//! Calendar helpers: "yesterday", query-parameter parsing and range expansion.

use kepco_client::domain::stamp;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DateParamError {
    #[error("Invalid {name} '{value}'. Use YYYYMMDD.")]
    Date { name: &'static str, value: String },
    #[error("Invalid {name} '{value}'. Use YYYYMMDDHHMM.")]
    DateTime { name: &'static str, value: String },
    #[error("{name} is required. Use YYYYMMDDHHMM.")]
    Missing { name: &'static str },
    #[error("Date range spans {days} days. Use at most {max}.")]
    RangeTooLong { days: i64, max: i64 },
}

/// Longest inclusive span `kepcoDailyRangeData` accepts. Every day costs one
/// sequential upstream call per customer.
pub const MAX_RANGE_DAYS: i64 = 366;

/// Fixed-offset wall clock. Upstream data is keyed by local calendar days.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    offset: UtcOffset,
}

impl Clock {
    pub fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }

    /// Falls back to UTC when the configured hour offset is out of range.
    pub fn from_hours(hours: i8) -> Self {
        let offset = UtcOffset::from_hms(hours, 0, 0).unwrap_or_else(|_| {
            tracing::warn!(hours, "invalid utc offset, using UTC");
            UtcOffset::UTC
        });
        Self::new(offset)
    }

    pub fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.offset)
    }

    pub fn today(&self) -> Date {
        self.now().date()
    }

    pub fn yesterday(&self) -> Date {
        yesterday_of(self.today())
    }
}

pub fn yesterday_of(today: Date) -> Date {
    today.previous_day().unwrap_or(today)
}

/// Every date from `start` to `end`, both inclusive.
///
/// An inverted range (`end < start`) expands to nothing rather than erroring.
pub fn expand_range(start: Date, end: Date) -> Vec<Date> {
    if end < start {
        return Vec::new();
    }

    let mut dates = Vec::with_capacity(((end - start).whole_days() + 1) as usize);
    let mut current = start;
    loop {
        dates.push(current);
        if current >= end {
            break;
        }
        match current.next_day() {
            Some(next) => current = next,
            None => break,
        }
    }
    dates
}

/// `YYYYMMDD` query value, or `default` when the parameter is absent or blank.
pub fn date_param(
    name: &'static str,
    value: Option<&str>,
    default: Date,
) -> Result<Date, DateParamError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(v) => stamp::parse_compact_date(v).ok_or_else(|| DateParamError::Date {
            name,
            value: v.to_string(),
        }),
    }
}

/// Required `YYYYMMDDHHMM` query value.
pub fn date_time_param(
    name: &'static str,
    value: Option<&str>,
) -> Result<PrimitiveDateTime, DateParamError> {
    let v = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(DateParamError::Missing { name })?;
    stamp::parse_compact_date_time(v).ok_or_else(|| DateParamError::DateTime {
        name,
        value: v.to_string(),
    })
}

/// Range endpoints fall back to yesterday..yesterday unless both bounds are given.
/// Inverted ranges pass through; spans over [`MAX_RANGE_DAYS`] are rejected.
pub fn range_params(
    start: Option<&str>,
    end: Option<&str>,
    yesterday: Date,
) -> Result<(Date, Date), DateParamError> {
    fn given(v: Option<&str>) -> Option<&str> {
        v.map(str::trim).filter(|v| !v.is_empty())
    }

    let (start, end) = match (given(start), given(end)) {
        (Some(s), Some(e)) => (
            date_param("startDate", Some(s), yesterday)?,
            date_param("endDate", Some(e), yesterday)?,
        ),
        _ => return Ok((yesterday, yesterday)),
    };

    let days = (end - start).whole_days() + 1;
    if days > MAX_RANGE_DAYS {
        return Err(DateParamError::RangeTooLong {
            days,
            max: MAX_RANGE_DAYS,
        });
    }
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn range_is_inclusive_and_ordered() {
        let dates = expand_range(date!(2024 - 02 - 27), date!(2024 - 03 - 01));
        assert_eq!(
            dates,
            vec![
                date!(2024 - 02 - 27),
                date!(2024 - 02 - 28),
                date!(2024 - 02 - 29),
                date!(2024 - 03 - 01),
            ]
        );
    }

    #[test]
    fn single_day_range_has_one_date() {
        assert_eq!(
            expand_range(date!(2024 - 10 - 01), date!(2024 - 10 - 01)),
            vec![date!(2024 - 10 - 01)]
        );
    }

    #[test]
    fn inverted_range_is_empty() {
        assert!(expand_range(date!(2024 - 10 - 02), date!(2024 - 10 - 01)).is_empty());
    }

    #[test]
    fn missing_date_defaults_and_bad_date_is_rejected() {
        let y = date!(2024 - 10 - 01);
        assert_eq!(date_param("date", None, y), Ok(y));
        assert_eq!(date_param("date", Some(""), y), Ok(y));
        assert_eq!(date_param("date", Some("20240315"), y), Ok(date!(2024 - 03 - 15)));
        assert_eq!(
            date_param("date", Some("2024-03-15"), y).unwrap_err().to_string(),
            "Invalid date '2024-03-15'. Use YYYYMMDD."
        );
    }

    #[test]
    fn date_time_is_required() {
        assert_eq!(
            date_time_param("dateTime", None).unwrap_err().to_string(),
            "dateTime is required. Use YYYYMMDDHHMM."
        );
        assert_eq!(
            date_time_param("dateTime", Some("202410011315")),
            Ok(datetime!(2024 - 10 - 01 13:15))
        );
        assert!(date_time_param("dateTime", Some("20241001")).is_err());
    }

    #[test]
    fn range_defaults_to_yesterday_unless_both_bounds_given() {
        let y = date!(2024 - 10 - 01);
        assert_eq!(range_params(Some("20240901"), None, y), Ok((y, y)));
        assert_eq!(range_params(None, None, y), Ok((y, y)));
        assert_eq!(
            range_params(Some("20240901"), Some("20240903"), y),
            Ok((date!(2024 - 09 - 01), date!(2024 - 09 - 03)))
        );
    }

    #[test]
    fn range_span_is_capped() {
        let y = date!(2024 - 10 - 01);
        assert_eq!(
            range_params(Some("20240101"), Some("20241231"), y),
            Ok((date!(2024 - 01 - 01), date!(2024 - 12 - 31)))
        );
        assert_eq!(
            range_params(Some("20240101"), Some("20250101"), y),
            Err(DateParamError::RangeTooLong { days: 367, max: MAX_RANGE_DAYS })
        );
        assert_eq!(
            range_params(Some("00010101"), Some("99991231"), y)
                .unwrap_err()
                .to_string(),
            "Date range spans 3652059 days. Use at most 366."
        );
        assert_eq!(
            range_params(Some("20241005"), Some("20241001"), y),
            Ok((date!(2024 - 10 - 05), date!(2024 - 10 - 01)))
        );
    }

    #[test]
    fn yesterday_crosses_month_and_year() {
        assert_eq!(yesterday_of(date!(2025 - 01 - 01)), date!(2024 - 12 - 31));
    }
}
