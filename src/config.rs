//! TOML export configuration.
//!
//! ```toml
//! entity = "Contact"
//! timezone = "America/Chicago"
//! allow_newlines = false
//! null_policy = "strict"
//!
//! [[columns]]
//! label = "Name"
//! path = "profile.name"
//!
//! [[columns]]
//! label = "Zip"
//! path = "contact.address.zip"
//! default = ""
//! ```
//!
//! Precedence: CLI > env (`CSVVIEW_TIMEZONE`, `CSVVIEW_ALLOW_NEWLINES`) > file > defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::column::{Column, ColumnMapping, ColumnSpec};
use crate::errors::{ExportError, Result};
use crate::export::CsvOptions;
use crate::normalize::{DisplayTimezone, FormatOptions, NullPolicy, validate_format};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub entity: Option<String>,
    pub timezone: Option<String>,
    pub allow_newlines: Option<bool>,
    pub datetime_format: Option<String>,
    pub date_format: Option<String>,
    pub null_policy: Option<NullPolicy>,
    pub true_label: Option<String>,
    pub false_label: Option<String>,
    pub delimiter: Option<char>,
    pub columns: Vec<ColumnConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub label: String,
    pub path: String,
    #[serde(default)]
    pub default: Option<String>,
}

impl ExportConfig {
    /// # Errors
    /// Returns `Config` if the text is not valid TOML for this schema.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ExportError::Config(e.to_string()))
    }

    /// # Errors
    /// Returns `Io` if the file cannot be read, `Config` if it does not parse.
    pub fn load(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        log::debug!("config: loaded {}", path.display());
        Self::from_toml_str(&s)
    }

    /// Overlay `CSVVIEW_*` environment variables.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|k| std::env::var(k).ok());
    }

    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(tz) = lookup("CSVVIEW_TIMEZONE") {
            self.timezone = Some(tz);
        }
        if let Some(v) = lookup("CSVVIEW_ALLOW_NEWLINES") {
            self.allow_newlines = Some(matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"));
        }
    }

    /// Columns in file order.
    ///
    /// # Errors
    /// Fails on an invalid path or duplicate label.
    pub fn mapping(&self) -> Result<ColumnMapping> {
        let mut mapping = ColumnMapping::new();
        for c in &self.columns {
            let mut column = Column::new(c.label.clone(), ColumnSpec::path(&c.path)?);
            if let Some(d) = &c.default {
                column = column.with_default(d.as_str());
            }
            mapping.push(column)?;
        }
        Ok(mapping)
    }

    /// # Errors
    /// `InvalidTimezone` or `Config` for a bad strftime pattern.
    pub fn format_options(&self) -> Result<FormatOptions> {
        let mut opts = FormatOptions::default();
        if let Some(tz) = &self.timezone {
            opts.timezone = tz.parse::<DisplayTimezone>()?;
        }
        if let Some(b) = self.allow_newlines {
            opts.allow_newlines = b;
        }
        if let Some(f) = &self.datetime_format {
            validate_format(f)?;
            opts.datetime_format.clone_from(f);
        }
        if let Some(f) = &self.date_format {
            validate_format(f)?;
            opts.date_format.clone_from(f);
        }
        if let Some(p) = self.null_policy {
            opts.null_policy = p;
        }
        if let Some(l) = &self.true_label {
            opts.true_label.clone_from(l);
        }
        if let Some(l) = &self.false_label {
            opts.false_label.clone_from(l);
        }
        Ok(opts)
    }

    /// # Errors
    /// Returns `Config` for a non-ASCII delimiter.
    pub fn csv_options(&self) -> Result<CsvOptions> {
        let mut opts = CsvOptions::default();
        if let Some(d) = self.delimiter {
            opts.delimiter = u8::try_from(d)
                .ok()
                .filter(u8::is_ascii)
                .ok_or_else(|| ExportError::Config(format!("delimiter must be ASCII: {d:?}")))?;
        }
        Ok(opts)
    }
}
