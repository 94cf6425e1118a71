//! Error hierarchy for the bulk appender.
//!
//! Follows the canonical error struct pattern: one opaque struct wrapping a
//! `pub(crate)` kind enum, with `is_xxx()` predicates instead of an exposed
//! kind. Construction-time failures (`UnsupportedType`, `CannotAppendToEnum`)
//! are fatal to the appender; value-level failures (`BindTypeMismatch`,
//! `OutOfRange`, `InvalidUuid`) abort the current row and leave the appender
//! reusable; `AppendFailed` carries the engine's own diagnostic text.

use thiserror::Error;

use quiver_vector::TypeTag;

/// Root error type for append operations.
///
/// Every variant renders as human-readable text naming the offending SQL
/// type and, where applicable, the shape of the value that was received;
/// the same text is retained in the appender's last-error slot.
#[derive(Error, Debug)]
#[error("{kind}")]
pub struct AppendError {
    kind: ErrorKind,
}

/// Internal error classification.
///
/// `pub(crate)` so variants can be added without breaking changes; external
/// code classifies through the `is_xxx()` predicates.
#[derive(Error, Debug)]
#[non_exhaustive]
pub(crate) enum ErrorKind {
    /// A column type with no appender mapping.
    #[error("unsupported column type: {name}")]
    UnsupportedType { name: String },

    /// Enum columns cannot be bulk-appended.
    #[error("cannot append to enum column {column}")]
    CannotAppendToEnum { column: usize },

    /// Value shape does not match the column type.
    #[error("type mismatch: cannot bind a {value} value to a {target} column")]
    BindTypeMismatch { target: String, value: String },

    /// Numeric value outside the target type's range.
    #[error("value is out of range for {target}")]
    OutOfRange { target: String },

    /// Malformed UUID text or binary payload.
    #[error("invalid uuid: {message}")]
    InvalidUuid { message: String },

    /// Column count or column index disagrees with the target table.
    #[error("schema mismatch: expected {expected} columns, got {actual}")]
    SchemaMismatch { expected: usize, actual: usize },

    /// The engine rejected an append or flush; carries its diagnostic.
    #[error("append failed: {message}")]
    AppendFailed { message: String },
}

impl AppendError {
    // ═══════════════════════════════════════════════════════════════════════
    // Constructors
    // ═══════════════════════════════════════════════════════════════════════

    /// Error for a column type the appender cannot map.
    #[must_use]
    pub fn unsupported_type(name: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::UnsupportedType { name: name.into() },
        }
    }

    /// Error for an enum column encountered at construction.
    #[must_use]
    pub const fn cannot_append_to_enum(column: usize) -> Self {
        Self {
            kind: ErrorKind::CannotAppendToEnum { column },
        }
    }

    /// Error for a value whose shape cannot bind to the target type.
    #[must_use]
    pub fn bind_type_mismatch(target: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::BindTypeMismatch {
                target: target.into(),
                value: value.into(),
            },
        }
    }

    /// Error for a numeric value outside the target type's range.
    #[must_use]
    pub fn out_of_range(target: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::OutOfRange {
                target: target.into(),
            },
        }
    }

    /// Error for malformed UUID input.
    #[must_use]
    pub fn invalid_uuid(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::InvalidUuid {
                message: message.into(),
            },
        }
    }

    /// Error for a column count or index mismatch.
    #[must_use]
    pub const fn schema_mismatch(expected: usize, actual: usize) -> Self {
        Self {
            kind: ErrorKind::SchemaMismatch { expected, actual },
        }
    }

    /// Error wrapping an engine-reported failure.
    #[must_use]
    pub fn append_failed(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::AppendFailed {
                message: message.into(),
            },
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Predicate Methods (is_xxx)
    // ═══════════════════════════════════════════════════════════════════════

    /// Returns true if this is an unsupported-type error.
    #[must_use]
    pub const fn is_unsupported_type(&self) -> bool {
        matches!(self.kind, ErrorKind::UnsupportedType { .. })
    }

    /// Returns true if this is the enum-column construction failure.
    #[must_use]
    pub const fn is_cannot_append_to_enum(&self) -> bool {
        matches!(self.kind, ErrorKind::CannotAppendToEnum { .. })
    }

    /// Returns true if this is a bind-type mismatch.
    #[must_use]
    pub const fn is_bind_type_mismatch(&self) -> bool {
        matches!(self.kind, ErrorKind::BindTypeMismatch { .. })
    }

    /// Returns true if this is an out-of-range error.
    #[must_use]
    pub const fn is_out_of_range(&self) -> bool {
        matches!(self.kind, ErrorKind::OutOfRange { .. })
    }

    /// Returns true if this is a malformed-UUID error.
    #[must_use]
    pub const fn is_invalid_uuid(&self) -> bool {
        matches!(self.kind, ErrorKind::InvalidUuid { .. })
    }

    /// Returns true if this is a schema mismatch.
    #[must_use]
    pub const fn is_schema_mismatch(&self) -> bool {
        matches!(self.kind, ErrorKind::SchemaMismatch { .. })
    }

    /// Returns true if this wraps an engine-reported failure.
    #[must_use]
    pub const fn is_append_failed(&self) -> bool {
        matches!(self.kind, ErrorKind::AppendFailed { .. })
    }

    /// Whether the appender remains usable after this error.
    ///
    /// Value-level errors abort the current row only; engine failures clear
    /// the open chunk but accept fresh rows. Construction-time failures are
    /// fatal by definition (there is no appender to reuse).
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::BindTypeMismatch { .. }
                | ErrorKind::OutOfRange { .. }
                | ErrorKind::InvalidUuid { .. }
                | ErrorKind::SchemaMismatch { .. }
                | ErrorKind::AppendFailed { .. }
        )
    }
}

impl From<quiver_vector::EngineError> for AppendError {
    fn from(err: quiver_vector::EngineError) -> Self {
        Self::append_failed(err.to_string())
    }
}

/// Convenience constructor for the common mismatch-by-tag case.
pub(crate) fn mismatch_for_tag(tag: TypeTag, value: &'static str) -> AppendError {
    AppendError::bind_type_mismatch(tag.sql_name(), value)
}

/// Convenience constructor for out-of-range failures on a tagged target.
pub(crate) fn out_of_range_for_tag(tag: TypeTag) -> AppendError {
    AppendError::out_of_range(tag.sql_name())
}

/// Result type alias for append operations.
pub type Result<T> = std::result::Result<T, AppendError>;
