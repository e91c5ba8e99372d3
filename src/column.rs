//! Column specifications and the ordered label -> column mapping.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::errors::{BoxError, ExportError, Result};
use crate::record::Record;
use crate::value::Value;

/// A dotted attribute path such as `contact.address.zip`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dot-separated path. Empty paths and empty segments are rejected.
    ///
    /// # Errors
    /// Returns `InvalidPath` for `""`, `"a..b"`, `".a"` and the like.
    pub fn parse(path: &str) -> Result<Self> {
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(ExportError::InvalidPath(path.to_string()));
        }
        Ok(Self { segments })
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl FromStr for FieldPath {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// Signature of a computed column: `(record, label) -> value`.
pub type ComputeFn = dyn Fn(&dyn Record, &str) -> std::result::Result<Value, BoxError> + Send + Sync;

/// How one cell is derived from a record.
#[derive(Clone)]
pub enum ColumnSpec {
    Path(FieldPath),
    Computed(Arc<ComputeFn>),
}

impl ColumnSpec {
    /// # Errors
    /// Returns `InvalidPath` if `path` is not a valid dotted path.
    pub fn path(path: &str) -> Result<Self> {
        FieldPath::parse(path).map(Self::Path)
    }

    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&dyn Record, &str) -> std::result::Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(f))
    }
}

impl fmt::Debug for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => f.debug_tuple("Path").field(&p.to_string()).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// A labelled column with an optional fallback for missing attributes.
///
/// `default: None` means a missing attribute is an error; `Some(Value::Text(""))`
/// is a real default that yields an empty cell.
#[derive(Debug, Clone)]
pub struct Column {
    label: String,
    spec: ColumnSpec,
    default: Option<Value>,
}

impl Column {
    pub fn new(label: impl Into<String>, spec: ColumnSpec) -> Self {
        Self { label: label.into(), spec, default: None }
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn spec(&self) -> &ColumnSpec {
        &self.spec
    }

    #[must_use]
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

/// Ordered, label-unique list of columns. Iteration order is output order.
#[derive(Debug, Clone, Default)]
pub struct ColumnMapping {
    columns: Vec<Column>,
}

impl ColumnMapping {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mapping of path columns from `(label, path)` pairs.
    ///
    /// # Errors
    /// Fails on an invalid path or a repeated label.
    pub fn from_paths<I, L, P>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (L, P)>,
        L: Into<String>,
        P: AsRef<str>,
    {
        let mut mapping = Self::new();
        for (label, path) in pairs {
            mapping.push(Column::new(label, ColumnSpec::path(path.as_ref())?))?;
        }
        Ok(mapping)
    }

    /// # Errors
    /// Returns `DuplicateLabel` if a column with the same label exists.
    pub fn push(&mut self, column: Column) -> Result<()> {
        if self.get(column.label()).is_some() {
            return Err(ExportError::DuplicateLabel(column.label));
        }
        self.columns.push(column);
        Ok(())
    }

    /// Builder-style [`push`](Self::push) of a path column.
    ///
    /// # Errors
    /// Fails on an invalid path or a repeated label.
    pub fn path(mut self, label: impl Into<String>, path: &str) -> Result<Self> {
        self.push(Column::new(label, ColumnSpec::path(path)?))?;
        Ok(self)
    }

    /// Builder-style [`push`](Self::push) of a path column with a default.
    ///
    /// # Errors
    /// Fails on an invalid path or a repeated label.
    pub fn path_or(
        mut self,
        label: impl Into<String>,
        path: &str,
        default: impl Into<Value>,
    ) -> Result<Self> {
        self.push(Column::new(label, ColumnSpec::path(path)?).with_default(default))?;
        Ok(self)
    }

    /// Builder-style [`push`](Self::push) of a computed column.
    ///
    /// # Errors
    /// Returns `DuplicateLabel` on a repeated label.
    pub fn computed<F>(mut self, label: impl Into<String>, f: F) -> Result<Self>
    where
        F: Fn(&dyn Record, &str) -> std::result::Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.push(Column::new(label, ColumnSpec::computed(f)))?;
        Ok(self)
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.label == label)
    }

    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.label.clone()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<'a> IntoIterator for &'a ColumnMapping {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}
