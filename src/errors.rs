use thiserror::Error;

/// Boxed error returned by computed columns.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T> = std::result::Result<T, ExportError>;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Missing attribute '{segment}' while resolving '{path}'")]
    MissingAttribute { path: String, segment: String },

    #[error(transparent)]
    Computation(BoxError),

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Duplicate column label: {0}")]
    DuplicateLabel(String),

    #[error("Invalid attribute path: '{0}'")]
    InvalidPath(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    pub(crate) fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization { message: message.into() }
    }
}
