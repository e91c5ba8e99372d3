use crate::column::ColumnMapping;
use crate::errors::Result;
use crate::normalize::{FormatOptions, normalize};
use crate::record::Record;
use crate::resolve::resolve;
use crate::value::Value;

/// One output line; aligned by position with [`Dataset::headers`].
pub type Row = Vec<Value>;

/// Headers plus rows. Every row has exactly `headers().len()` cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    #[must_use]
    pub fn into_parts(self) -> (Vec<String>, Vec<Row>) {
        (self.headers, self.rows)
    }

    /// Render with default CSV options (comma delimiter, header line).
    ///
    /// # Errors
    /// Returns `Serialization` if a cell cannot be rendered as text.
    pub fn to_csv(&self) -> Result<String> {
        crate::export::to_csv_string(self, &crate::export::CsvOptions::default())
    }

    pub(crate) fn from_parts(headers: Vec<String>, rows: Vec<Row>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == headers.len()));
        Self { headers, rows }
    }
}

/// Resolve and normalize every column of `mapping` against one record.
///
/// # Errors
/// The first resolution or normalization error.
pub fn materialize_row(mapping: &ColumnMapping, obj: &dyn Record, options: &FormatOptions) -> Result<Row> {
    mapping.iter().map(|column| normalize(resolve(obj, column)?, options)).collect()
}

/// Lazy row stream over a source collection. Single pass; stops after the
/// first error.
pub struct Rows<'m, I> {
    mapping: &'m ColumnMapping,
    options: &'m FormatOptions,
    objects: I,
    failed: bool,
}

impl<I> Iterator for Rows<'_, I>
where
    I: Iterator,
    I::Item: Record,
{
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let obj = self.objects.next()?;
        let row = materialize_row(self.mapping, &obj, self.options);
        self.failed = row.is_err();
        Some(row)
    }
}

pub fn rows<'m, I>(mapping: &'m ColumnMapping, objects: I, options: &'m FormatOptions) -> Rows<'m, I::IntoIter>
where
    I: IntoIterator,
    I::Item: Record,
{
    Rows { mapping, options, objects: objects.into_iter(), failed: false }
}

/// Materialize the whole dataset. Fails fast: no partial dataset is returned.
///
/// # Errors
/// The first resolution or normalization error of any cell.
pub fn build<I>(mapping: &ColumnMapping, objects: I, options: &FormatOptions) -> Result<Dataset>
where
    I: IntoIterator,
    I::Item: Record,
{
    log::debug!("dataset build: columns={}", mapping.len());
    let collected: Result<Vec<Row>> = rows(mapping, objects, options).collect();
    match collected {
        Ok(rows) => {
            log::debug!("dataset built: rows={} columns={}", rows.len(), mapping.len());
            Ok(Dataset::from_parts(mapping.labels(), rows))
        }
        Err(e) => {
            log::warn!("dataset build aborted: {e}");
            Err(e)
        }
    }
}
