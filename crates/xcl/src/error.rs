//! Error types for the transformation pipeline

use thiserror::Error;
use xcl_core::Address;
use xcl_csv::CsvError;
use xcl_script::ScriptError;
use xcl_xlsx::XlsxError;

/// Result type alias using [`XclError`]
pub type XclResult<T> = std::result::Result<T, XclError>;

/// Errors that abort a conversion
#[derive(Debug, Error)]
pub enum XclError {
    /// A column expression failed to evaluate
    #[error("Evaluation of `{expression}` for {address} failed: {source}")]
    Evaluation {
        address: Address,
        expression: String,
        #[source]
        source: ScriptError,
    },

    /// A row ended before a column referenced by an expression was seen
    #[error("Column ${column} used by `{expression}` is not present in row {}", .row + 1)]
    UnboundColumn {
        row: u32,
        column: u32,
        expression: String,
    },

    /// The file extension does not name a supported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Core error
    #[error(transparent)]
    Core(#[from] xcl_core::Error),

    /// CSV error
    #[error(transparent)]
    Csv(#[from] CsvError),

    /// XLSX error
    #[error(transparent)]
    Xlsx(#[from] XlsxError),
}

impl From<std::io::Error> for XclError {
    fn from(err: std::io::Error) -> Self {
        XclError::Core(xcl_core::Error::Io(err))
    }
}

impl XclError {
    /// Whether this error came from evaluating a column expression
    pub fn is_evaluation(&self) -> bool {
        matches!(self, XclError::Evaluation { .. } | XclError::UnboundColumn { .. })
    }
}
