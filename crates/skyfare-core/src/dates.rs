use chrono::{DateTime, NaiveDate, NaiveDateTime};
use thiserror::Error;

const DATE_FORMATS: [&str; 7] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateInputError {
    #[error("missing value for '{0}'")]
    Missing(&'static str),
    #[error("could not parse '{0}' as a date")]
    Unparseable(String),
}

/// Inclusive calendar range submitted with the refresh form.
///
/// A range whose start is after its end is valid and simply matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, DateInputError> {
        let start = parse_calendar_date(start.ok_or(DateInputError::Missing("start_date"))?)?;
        let end = parse_calendar_date(end.ok_or(DateInputError::Missing("end_date"))?)?;
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Inclusive day count, zero for an inverted range.
    pub fn day_count(&self) -> usize {
        if self.start > self.end {
            0
        } else {
            (self.end - self.start).num_days() as usize + 1
        }
    }
}

/// Lenient date parser for free-text form input. Accepts ISO dates and
/// date-times (the time part is dropped), slash/dot separated forms,
/// compact `YYYYMMDD`, and month names.
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate, DateInputError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(DateInputError::Unparseable(raw.to_string()));
    }

    if text.len() == 8 && text.bytes().all(|b| b.is_ascii_digit()) {
        let (year, rest) = text.split_at(4);
        let (month, day) = rest.split_at(2);
        if let (Ok(y), Ok(m), Ok(d)) = (year.parse(), month.parse(), day.parse()) {
            if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
                return Ok(date);
            }
        }
        return Err(DateInputError::Unparseable(raw.to_string()));
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Ok(date);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.date_naive());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(dt.date());
        }
    }

    Err(DateInputError::Unparseable(raw.to_string()))
}
