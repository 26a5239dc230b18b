//! Row annotators
//!
//! Independent column-wise computations appended to a copy of the table:
//! - [`OutlierMarker`]: `outlier_rule_for_{column}` with `High`/`Low`/`Normal`
//! - [`mark_inconsistent`]: `inconsistence_rule` from null ids
//! - [`convert_dates`]: `date_created_converted` as `yyyymmdd`

mod consistency;
mod dates;
mod outlier;

pub use consistency::mark_inconsistent;
pub use dates::{convert_date_column, convert_dates, date_key, parse_calendar_date};
pub use outlier::{mark_outliers, OutlierLabel, OutlierMarker, DEFAULT_THRESHOLD};

use crate::error::Result;
use crate::table::Table;

/// Numeric columns marked by [`annotate`] when present
pub const OUTLIER_COLUMNS: &[&str] = &["price", "base_price", "sold_quantity"];

/// Apply every annotator whose input column is present
pub fn annotate(table: &Table, marker: &OutlierMarker) -> Result<Table> {
    let mut out = table.clone();
    for column in OUTLIER_COLUMNS {
        if out.contains(column) {
            out = marker.mark(&out, column)?;
        }
    }
    if out.contains(consistency::ID_COLUMN) {
        out = mark_inconsistent(&out)?;
    }
    if out.contains(dates::DATE_COLUMN) {
        out = convert_dates(&out)?;
    }
    tracing::info!(columns = out.width(), rows = out.height(), "annotated table");
    Ok(out)
}
