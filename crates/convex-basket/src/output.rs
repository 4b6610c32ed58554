//! Basket results.

use crate::config::ConstraintConfig;
use crate::constraints::ConstraintViolation;
use crate::error::BasketResult;
use crate::metrics::QualityMetrics;
use crate::spec::{BasketFilters, BasketType};
use crate::weighting::{WeightVector, WeightingMethod};
use chrono::{DateTime, Utc};
use convex_universe::BondRecord;
use serde::{Deserialize, Serialize};

/// One basket member with its weight and original attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constituent {
    /// The bond as it appeared in the universe.
    pub bond: BondRecord,

    /// Basket weight.
    pub weight: f64,

    /// Similarity to the reference bond (similarity baskets only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
}

impl Constituent {
    /// The constituent's identifier.
    #[must_use]
    pub fn isin(&self) -> &str {
        &self.bond.isin
    }
}

/// Build parameters and counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketMetadata {
    /// Specification label, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Builder used.
    pub basket_type: BasketType,

    /// Weighting actually applied.
    pub weighting_method: WeightingMethod,

    /// Bonds in the universe.
    pub universe_size: usize,

    /// Bonds that passed the filters before truncation.
    pub candidates_matched: usize,

    /// Bonds in the basket.
    pub constituent_count: usize,

    /// Sum of weights (1.0 unless empty).
    pub total_weight: f64,

    /// Similarity reference, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_isin: Option<String>,

    /// Filters as specified.
    pub filters: BasketFilters,

    /// Limits the basket was checked against.
    pub constraints: ConstraintConfig,

    /// Build timestamp.
    pub created_at: DateTime<Utc>,
}

/// The result of one basket build. Immutable once assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketOutput {
    /// Unique basket identifier (UUID v4).
    pub basket_id: String,

    /// Members in basket order.
    pub constituents: Vec<Constituent>,

    /// Build parameters and counts.
    pub metadata: BasketMetadata,

    /// Diversification and composition statistics.
    pub quality_metrics: QualityMetrics,

    /// Every constraint violation found.
    #[serde(default)]
    pub violations: Vec<ConstraintViolation>,

    /// Selection and advisory warnings, in the order they arose.
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl BasketOutput {
    /// Number of constituents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.constituents.len()
    }

    /// True if the basket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constituents.is_empty()
    }

    /// Looks up a constituent by identifier.
    #[must_use]
    pub fn constituent(&self, isin: &str) -> Option<&Constituent> {
        self.constituents.iter().find(|c| c.isin() == isin)
    }

    /// Weight vector in basket order.
    #[must_use]
    pub fn weights(&self) -> WeightVector {
        WeightVector::from_pairs(
            self.constituents
                .iter()
                .map(|c| (c.bond.isin.clone(), c.weight)),
        )
    }

    /// Identifiers in basket order.
    #[must_use]
    pub fn isins(&self) -> Vec<&str> {
        self.constituents.iter().map(Constituent::isin).collect()
    }

    /// True if no constraint was breached.
    #[must_use]
    pub fn is_compliant(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations that abort strict builds.
    pub fn blocking_violations(&self) -> impl Iterator<Item = &ConstraintViolation> {
        self.violations.iter().filter(|v| v.is_blocking())
    }

    /// Writes a pretty-printed JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`BasketError::Serialization`](crate::BasketError::Serialization)
    /// if a value cannot be encoded.
    pub fn to_json(&self) -> BasketResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`BasketError::Serialization`](crate::BasketError::Serialization)
    /// for malformed input.
    pub fn from_json(json: &str) -> BasketResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
