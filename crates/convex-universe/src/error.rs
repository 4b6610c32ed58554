//! Error types for the bond universe schema layer.

use thiserror::Error;

/// Result type for universe operations.
pub type UniverseResult<T> = Result<T, UniverseError>;

/// Errors raised when bond data does not satisfy the trading schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UniverseError {
    /// A required column has no value for a record.
    #[error("Missing required column '{column}' for bond '{isin}'")]
    MissingColumn {
        /// The bond identifier (may be empty if the identifier itself is missing).
        isin: String,
        /// The missing column.
        column: String,
    },

    /// A value lies outside the range declared by the schema.
    #[error("Column '{column}' out of range for bond '{isin}': {value} (expected {expected})")]
    OutOfRange {
        /// The bond identifier.
        isin: String,
        /// The offending column.
        column: String,
        /// The offending value, formatted.
        value: String,
        /// The accepted range, formatted.
        expected: String,
    },

    /// The same identifier appears more than once in a snapshot.
    #[error("Duplicate identifier '{isin}' in universe")]
    DuplicateIdentifier {
        /// The duplicated identifier.
        isin: String,
    },

    /// A categorical value could not be parsed.
    #[error("Invalid {kind} value: '{value}'")]
    InvalidValue {
        /// The category (e.g. "rating", "sector").
        kind: String,
        /// The unparseable input.
        value: String,
    },
}

impl UniverseError {
    /// Create a missing column error.
    #[must_use]
    pub fn missing_column(isin: impl Into<String>, column: impl Into<String>) -> Self {
        Self::MissingColumn {
            isin: isin.into(),
            column: column.into(),
        }
    }

    /// Create an out-of-range error.
    #[must_use]
    pub fn out_of_range(
        isin: impl Into<String>,
        column: impl Into<String>,
        value: impl std::fmt::Display,
        expected: impl Into<String>,
    ) -> Self {
        Self::OutOfRange {
            isin: isin.into(),
            column: column.into(),
            value: value.to_string(),
            expected: expected.into(),
        }
    }

    /// Create an invalid categorical value error.
    #[must_use]
    pub fn invalid_value(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            kind: kind.into(),
            value: value.into(),
        }
    }
}
