//! Download naming for exported CSV payloads.

use chrono::NaiveDate;

use crate::normalize::DisplayTimezone;

pub const CONTENT_TYPE: &str = "text/csv";

/// `<entity>-csv-<YYYY-MM-DD>`, or `csv-<YYYY-MM-DD>` without an entity.
/// The `.csv` extension is not included.
#[must_use]
pub fn default_filename(entity: Option<&str>, today: NaiveDate) -> String {
    let base = format!("csv-{}", today.format("%Y-%m-%d"));
    match entity.map(str::trim).filter(|e| !e.is_empty()) {
        Some(e) => format!("{e}-{base}"),
        None => base,
    }
}

/// [`default_filename`] for today's date in `tz`.
#[must_use]
pub fn today_filename(entity: Option<&str>, tz: &DisplayTimezone) -> String {
    default_filename(entity, tz.today())
}

/// `Content-Disposition` value for a download named `<filename>.csv`.
#[must_use]
pub fn attachment_header(filename: &str) -> String {
    format!("attachment; filename={filename}.csv")
}
