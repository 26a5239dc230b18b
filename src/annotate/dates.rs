//! Date normalization to `yyyymmdd` integers

use crate::error::Result;
use crate::table::{ColumnKind, Table};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;

pub const DATE_COLUMN: &str = "date_created";
pub const OUTPUT_COLUMN: &str = "date_created_converted";

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%Y%m%d",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse free-form date text into a calendar date
///
/// Date-times keep the calendar date as written; offsets are not applied.
pub fn parse_calendar_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.date_naive());
    }
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
    {
        return Some(date);
    }
    let naive = text.strip_suffix('Z').unwrap_or(text);
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(naive, fmt).ok())
        .map(|dt| dt.date())
}

/// `year * 10000 + month * 100 + day`
pub fn date_key(date: NaiveDate) -> i64 {
    date.year() as i64 * 10_000 + date.month() as i64 * 100 + date.day() as i64
}

/// Return a copy of `table` with `date_created_converted` appended
pub fn convert_dates(table: &Table) -> Result<Table> {
    convert_date_column(table, DATE_COLUMN, OUTPUT_COLUMN)
}

/// Convert any date-text column into an Int64 `yyyymmdd` column
pub fn convert_date_column(table: &Table, column: &str, output: &str) -> Result<Table> {
    let values = table.text_values(column)?;
    let keys: Vec<Option<i64>> = values
        .iter()
        .map(|v| v.as_deref().and_then(parse_calendar_date).map(date_key))
        .collect();
    let unparsed = keys
        .iter()
        .zip(&values)
        .filter(|(k, v)| k.is_none() && v.is_some())
        .count();

    let mut out = table.clone();
    out.push_column(Series::new(output.into(), keys), ColumnKind::Numeric)?;
    tracing::debug!(column, unparsed, "converted dates");
    Ok(out)
}
