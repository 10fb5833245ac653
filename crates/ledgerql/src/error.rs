//! Error handling for the query engine.
//!
//! One unified error type covers the whole pipeline, from clause
//! extraction down to blob persistence. Every error is raised
//! synchronously to the immediate caller; nothing is retried internally.

use thiserror::Error;

/// Stable numeric codes for categorizing errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // General errors (0x0000 - 0x00FF)
    /// Operation not supported by the engine.
    Unsupported = 0x0001,

    // Parse errors (0x0100 - 0x01FF)
    /// Query string could not be split into the required clauses.
    MalformedQuery = 0x0100,
    /// Condition clause does not match the supported grammar.
    PredicateCompile = 0x0101,

    // Execution errors (0x0200 - 0x02FF)
    /// Column list and value list lengths differ.
    ArityMismatch = 0x0200,
    /// Update matched zero rows.
    NoMatchingRow = 0x0201,
    /// Insert targeted a primary key that already exists.
    DuplicateKey = 0x0202,

    // Storage errors (0x0300 - 0x03FF)
    /// Table blob could not be encoded or decoded.
    Codec = 0x0300,
    /// I/O failure in the blob store.
    Io = 0x0301,
}

impl ErrorCode {
    /// Returns the numeric code.
    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match (*self as u16) >> 8 {
            0x00 => "General",
            0x01 => "Parse",
            0x02 => "Execution",
            0x03 => "Storage",
            _ => "Unknown",
        }
    }
}

/// The error type for all engine operations.
///
/// A failed mutation never partially applies: by the time any of these
/// are raised from a write path, the targeted table is byte-identical to
/// its state before the call.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Clause extraction could not locate the keywords the statement
    /// kind requires, or the query is not one of the known kinds.
    #[error("malformed query: {message}")]
    MalformedQuery {
        /// What was wrong with the query string.
        message: String,
    },

    /// A `where`/`on` condition does not match the supported grammar.
    #[error("cannot compile condition `{clause}`: {message}")]
    PredicateCompile {
        /// The offending clause text.
        clause: String,
        /// What the parser choked on.
        message: String,
    },

    /// Insert/update column and value lists have different lengths.
    #[error("column list has {columns} entries but value list has {values}")]
    ArityMismatch {
        /// Number of columns in the `set` clause.
        columns: usize,
        /// Number of positional values.
        values: usize,
    },

    /// Caller attempted a capability that is explicitly out of scope.
    #[error("operation not supported: {operation}")]
    Unsupported {
        /// The unsupported operation.
        operation: String,
    },

    /// An update targeted zero rows.
    #[error("update matched no rows in table '{table}'")]
    NoMatchingRow {
        /// The table the update ran against.
        table: String,
    },

    /// An insert targeted a primary key that is already present.
    #[error("duplicate key {key} in table '{table}'")]
    DuplicateKey {
        /// The table the insert ran against.
        table: String,
        /// The colliding key.
        key: u64,
    },

    /// A table blob could not be serialized or deserialized.
    #[error("codec error for table '{table}': {source}")]
    Codec {
        /// The table whose blob failed to round-trip.
        table: String,
        /// The underlying serde error.
        source: serde_json::Error,
    },

    /// I/O error from the blob store.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

impl LedgerError {
    /// Returns the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::MalformedQuery { .. } => ErrorCode::MalformedQuery,
            Self::PredicateCompile { .. } => ErrorCode::PredicateCompile,
            Self::ArityMismatch { .. } => ErrorCode::ArityMismatch,
            Self::Unsupported { .. } => ErrorCode::Unsupported,
            Self::NoMatchingRow { .. } => ErrorCode::NoMatchingRow,
            Self::DuplicateKey { .. } => ErrorCode::DuplicateKey,
            Self::Codec { .. } => ErrorCode::Codec,
            Self::Io { .. } => ErrorCode::Io,
        }
    }

    /// Creates a malformed-query error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedQuery {
            message: message.into(),
        }
    }

    /// Creates an unsupported-operation error.
    #[must_use]
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }
}

/// Result type alias for engine operations.
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = LedgerError::NoMatchingRow {
            table: "accounts".to_string(),
        };
        assert_eq!(err.code(), ErrorCode::NoMatchingRow);
        assert_eq!(err.code().category(), "Execution");
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::ArityMismatch {
            columns: 3,
            values: 2,
        };
        assert_eq!(
            err.to_string(),
            "column list has 3 entries but value list has 2"
        );
    }

    #[test]
    fn test_category_ranges() {
        assert_eq!(ErrorCode::MalformedQuery.category(), "Parse");
        assert_eq!(ErrorCode::PredicateCompile.category(), "Parse");
        assert_eq!(ErrorCode::Codec.category(), "Storage");
        assert_eq!(ErrorCode::Unsupported.category(), "General");
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: LedgerError = io_err.into();
        assert_eq!(err.code(), ErrorCode::Io);
    }
}
