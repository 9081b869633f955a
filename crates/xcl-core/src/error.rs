//! Error types for xcl-core

use crate::cell::{Address, CellType};
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors shared by every stage of the cell stream
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid address literal
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// A cell's declared type cannot represent its value
    #[error("Type mismatch at {address}: expected {expected}, got {found}")]
    TypeMismatch {
        address: Address,
        expected: CellType,
        found: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error raised by a concrete codec behind the producer/consumer traits
    #[error("{format} error: {source}")]
    Codec {
        format: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A consumer was used after it was closed
    #[error("Consumer already closed")]
    Closed,
}

impl Error {
    /// Wrap a codec-specific error
    pub fn codec<E>(format: &'static str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Codec {
            format,
            source: Box::new(source),
        }
    }

    /// Build a type mismatch error
    pub fn type_mismatch<S: Into<String>>(address: Address, expected: CellType, found: S) -> Self {
        Error::TypeMismatch {
            address,
            expected,
            found: found.into(),
        }
    }

    /// Whether this error is a [`Error::TypeMismatch`]
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Error::TypeMismatch { .. })
    }
}
