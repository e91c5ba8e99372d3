use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::column::ColumnMapping;
use crate::dataset::{Dataset, rows};
use crate::errors::{ExportError, Result};
use crate::normalize::FormatOptions;
use crate::record::Record;

use super::options::{CsvOptions, ExportReport};
use super::sinks::{CsvSink, RowSink};

/// Feed the lazy row stream for `objects` into `sink`, header first.
///
/// Rows already handed to the sink stay there if a later row fails; use
/// [`export_file`] when the destination must never see partial output.
///
/// # Errors
/// The first resolution, normalization or sink error.
pub fn stream_into<S, I>(
    sink: &mut S,
    mapping: &ColumnMapping,
    objects: I,
    options: &FormatOptions,
) -> Result<ExportReport>
where
    S: RowSink + ?Sized,
    I: IntoIterator,
    I::Item: Record,
{
    let mut report = ExportReport::default();
    sink.write_headers(&mapping.labels())?;
    for row in rows(mapping, objects, options) {
        sink.write_row(&row?)?;
        report.written += 1;
    }
    sink.finish()?;
    Ok(report)
}

/// Stream `objects` through `mapping` as CSV into `writer`.
///
/// # Errors
/// See [`stream_into`].
pub fn export_rows<W, I>(
    writer: W,
    mapping: &ColumnMapping,
    objects: I,
    options: &FormatOptions,
    csv: &CsvOptions,
) -> Result<ExportReport>
where
    W: Write,
    I: IntoIterator,
    I::Item: Record,
{
    let mut sink = CsvSink::new(writer, csv);
    stream_into(&mut sink, mapping, objects, options)
}

/// Write an already built dataset as CSV.
///
/// # Errors
/// Returns `Serialization` for unrenderable cells, or `Csv`/`Io` on write failure.
pub fn write_dataset<W: Write>(writer: W, dataset: &Dataset, csv: &CsvOptions) -> Result<ExportReport> {
    let mut sink = CsvSink::new(writer, csv);
    let mut report = ExportReport::default();
    sink.write_headers(dataset.headers())?;
    for row in dataset.rows() {
        sink.write_row(row)?;
        report.written += 1;
    }
    sink.finish()?;
    Ok(report)
}

/// Render a dataset to a CSV string.
///
/// # Errors
/// See [`write_dataset`].
pub fn to_csv_string(dataset: &Dataset, csv: &CsvOptions) -> Result<String> {
    let mut sink = CsvSink::new(Vec::new(), csv);
    sink.write_headers(dataset.headers())?;
    for row in dataset.rows() {
        sink.write_row(row)?;
    }
    let bytes = sink.into_inner()?;
    String::from_utf8(bytes).map_err(|e| ExportError::serialization(e.to_string()))
}

/// Export to `path` atomically via a temp file + persist.
///
/// A failed build leaves any existing file at `path` untouched.
///
/// # Errors
/// Returns an error if the build fails, the destination cannot be created, or
/// the write/persist fails.
pub fn export_file<I>(
    path: impl AsRef<Path>,
    mapping: &ColumnMapping,
    objects: I,
    options: &FormatOptions,
    csv: &CsvOptions,
) -> Result<ExportReport>
where
    I: IntoIterator,
    I::Item: Record,
{
    log::info!("export: path={}, columns={}", path.as_ref().display(), mapping.len());
    let dest = path.as_ref();
    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.exists() {
        std::fs::create_dir_all(parent)?;
    }
    let mut tmp = NamedTempFile::new_in(parent)?;
    let report = match export_rows(&mut tmp, mapping, objects, options, csv) {
        Ok(r) => r,
        Err(e) => {
            log::warn!("export aborted, {} left unchanged: {e}", dest.display());
            return Err(e);
        }
    };
    // persist replaces an existing file in one step; retry for transient
    // sharing violations on Windows
    let mut last_err: Option<io::Error> = None;
    for attempt in 0..5 {
        match tmp.persist(dest) {
            Ok(_file) => {
                log::info!("export: wrote {} rows to {}", report.written, dest.display());
                return Ok(report);
            }
            Err(pe) => {
                last_err = Some(pe.error);
                tmp = pe.file;
                std::thread::sleep(std::time::Duration::from_millis(10 + attempt * 5));
            }
        }
    }
    Err(ExportError::Io(last_err.unwrap_or_else(|| io::Error::other("failed to persist export file"))))
}
