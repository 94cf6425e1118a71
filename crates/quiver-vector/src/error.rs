//! Engine-reported failures.

use thiserror::Error;

/// Status reported by the storage backend.
///
/// These are the errors the appender layer surfaces verbatim as its
/// engine-diagnostic text; they carry enough context to be shown to a user
/// unchanged.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EngineError {
    /// Named table does not exist.
    #[error("unknown table: {0}")]
    UnknownTable(String),

    /// A table with this name already exists.
    #[error("table already exists: {0}")]
    TableExists(String),

    /// Chunk shape does not match the target table.
    #[error("column mismatch on table {table}: {message}")]
    ColumnMismatch {
        /// Target table name.
        table: String,
        /// Human-readable description of the mismatch.
        message: String,
    },

    /// Payload bytes violate the column type's encoding rules.
    #[error("invalid data for column {column}: {message}")]
    InvalidData {
        /// Zero-based column index.
        column: usize,
        /// Human-readable description of the violation.
        message: String,
    },
}

/// Result alias for backend operations.
pub type Result<T> = std::result::Result<T, EngineError>;
