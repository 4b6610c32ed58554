//! Error types for basket construction.
//!
//! Every variant is fatal for the build that raised it. Conditions that only
//! degrade a basket (advisory constraint breaches, empty candidate sets) are
//! reported as warnings on the output instead.

use crate::constraints::ConstraintViolation;
use convex_universe::UniverseError;
use thiserror::Error;

/// Result type for basket operations.
pub type BasketResult<T> = Result<T, BasketError>;

/// Errors that abort a basket build.
#[derive(Error, Debug, Clone)]
pub enum BasketError {
    /// The universe does not satisfy the trading schema.
    #[error("Schema mismatch: {reason}")]
    SchemaMismatch {
        /// What the universe got wrong.
        reason: String,
    },

    /// A weighting strategy could not produce a valid weight vector.
    #[error("Invalid weighting input: {reason}")]
    InvalidWeightingInput {
        /// Why the weights could not be computed.
        reason: String,
    },

    /// The similarity reference bond is not in the universe.
    #[error("Reference bond '{isin}' not found in universe")]
    ReferenceNotFound {
        /// The missing identifier.
        isin: String,
    },

    /// The basket type is not one of the supported builders.
    #[error("Unsupported basket type: '{basket_type}'")]
    UnsupportedBasketType {
        /// The unrecognized basket type.
        basket_type: String,
    },

    /// Strict mode found blocking constraint violations.
    #[error("Basket breaches {} blocking constraint(s)", .violations.iter().filter(|v| v.is_blocking()).count())]
    ConstraintViolation {
        /// Every violation found, blocking and warning alike.
        violations: Vec<ConstraintViolation>,
    },

    /// The specification is well-formed but unusable.
    #[error("Invalid basket specification: {reason}")]
    InvalidSpecification {
        /// What is wrong with the specification.
        reason: String,
    },

    /// Reading or writing an interchange document failed.
    #[error("Serialization failed: {reason}")]
    Serialization {
        /// The underlying parser or writer message.
        reason: String,
    },
}

impl BasketError {
    /// Create a schema mismatch error.
    #[must_use]
    pub fn schema_mismatch(reason: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            reason: reason.into(),
        }
    }

    /// Create an invalid weighting input error.
    #[must_use]
    pub fn invalid_weighting(reason: impl Into<String>) -> Self {
        Self::InvalidWeightingInput {
            reason: reason.into(),
        }
    }

    /// Create a reference-not-found error.
    #[must_use]
    pub fn reference_not_found(isin: impl Into<String>) -> Self {
        Self::ReferenceNotFound { isin: isin.into() }
    }

    /// Create an unsupported basket type error.
    #[must_use]
    pub fn unsupported_basket_type(basket_type: impl Into<String>) -> Self {
        Self::UnsupportedBasketType {
            basket_type: basket_type.into(),
        }
    }

    /// Create an invalid specification error.
    #[must_use]
    pub fn invalid_spec(reason: impl Into<String>) -> Self {
        Self::InvalidSpecification {
            reason: reason.into(),
        }
    }

    /// Create a serialization error.
    #[must_use]
    pub fn serialization(reason: impl std::fmt::Display) -> Self {
        Self::Serialization {
            reason: reason.to_string(),
        }
    }

    /// The violations carried by a strict-mode constraint failure.
    #[must_use]
    pub fn violations(&self) -> &[ConstraintViolation] {
        match self {
            Self::ConstraintViolation { violations } => violations,
            _ => &[],
        }
    }
}

impl From<UniverseError> for BasketError {
    fn from(err: UniverseError) -> Self {
        Self::schema_mismatch(err.to_string())
    }
}

impl From<serde_json::Error> for BasketError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err)
    }
}

impl From<toml::de::Error> for BasketError {
    fn from(err: toml::de::Error) -> Self {
        Self::serialization(err)
    }
}

impl From<toml::ser::Error> for BasketError {
    fn from(err: toml::ser::Error) -> Self {
        Self::serialization(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BasketError::reference_not_found("XS0000000009");
        assert!(err.to_string().contains("XS0000000009"));

        let err = BasketError::unsupported_basket_type("momentum");
        assert!(err.to_string().contains("momentum"));

        let err = BasketError::invalid_weighting("sum of amounts is zero");
        assert!(err.to_string().contains("sum of amounts is zero"));
    }

    #[test]
    fn test_from_universe_error() {
        let err: BasketError = UniverseError::DuplicateIdentifier { isin: "A1".into() }.into();
        assert!(matches!(err, BasketError::SchemaMismatch { .. }));
        assert!(err.to_string().contains("A1"));
    }

    #[test]
    fn test_violations_accessor() {
        assert!(BasketError::invalid_spec("x").violations().is_empty());
    }

    #[test]
    fn test_error_clone() {
        let err = BasketError::schema_mismatch("missing column");
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
    }
}
