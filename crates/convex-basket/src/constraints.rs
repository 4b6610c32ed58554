//! Constraint validation.
//!
//! The validator only reports; it never changes weights or drops bonds.
//! Checks run in a fixed order so reports are reproducible:
//!
//! 1. basket size
//! 2. single-position weights, in constituent order
//! 3. sector concentration, alphabetical
//! 4. rating concentration per notch, best to worst
//! 5. diversification floor (skipped for an empty basket)

use crate::config::ConstraintConfig;
use crate::metrics::effective_positions;
use crate::output::BasketOutput;
use crate::weighting::WeightVector;
use convex_universe::{BondRecord, CreditRating};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Weights within this distance of a limit are compliant.
pub const LIMIT_TOLERANCE: f64 = 1e-9;

/// Which limit was breached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Too many constituents.
    Size,
    /// One position is too heavy.
    PositionConcentration,
    /// One sector is too heavy.
    SectorConcentration,
    /// One rating notch is too heavy.
    RatingConcentration,
    /// Too few effective positions.
    Diversification,
}

impl ViolationKind {
    /// Returns a human-readable name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Size => "basket size",
            Self::PositionConcentration => "position concentration",
            Self::SectorConcentration => "sector concentration",
            Self::RatingConcentration => "rating concentration",
            Self::Diversification => "diversification",
        }
    }
}

/// Whether a violation can abort a strict build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Reported, never aborts.
    Warning,
    /// Aborts the build in strict mode.
    Blocking,
}

/// One breached limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    /// Which limit.
    pub kind: ViolationKind,
    /// The affected position, sector or rating; `basket` for aggregates.
    pub entity: String,
    /// Warning or blocking.
    pub severity: Severity,
    /// Observed value.
    pub actual: f64,
    /// Configured limit.
    pub limit: f64,
    /// What to change to comply.
    pub remediation: String,
}

impl ConstraintViolation {
    /// True if the violation aborts strict builds.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Blocking
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Blocking => "blocking",
        };
        write!(
            f,
            "{level} {} violation on {}: {:.4} vs limit {:.4}; {}",
            self.kind.name(),
            self.entity,
            self.actual,
            self.limit,
            self.remediation
        )
    }
}

/// Entity label used for basket-wide violations.
pub const BASKET_ENTITY: &str = "basket";

/// Checks weighted baskets against a [`ConstraintConfig`].
#[derive(Debug, Clone, Copy)]
pub struct ConstraintValidator<'c> {
    config: &'c ConstraintConfig,
}

impl<'c> ConstraintValidator<'c> {
    /// Creates a validator for the given limits.
    #[must_use]
    pub fn new(config: &'c ConstraintConfig) -> Self {
        Self { config }
    }

    /// Validates bonds and their weights (aligned by position).
    ///
    /// Returns every violation in check order; empty means compliant.
    #[must_use]
    pub fn validate_basket_constraints(
        &self,
        bonds: &[&BondRecord],
        weights: &WeightVector,
    ) -> Vec<ConstraintViolation> {
        debug_assert_eq!(bonds.len(), weights.len());
        let positions: Vec<(&BondRecord, f64)> = bonds
            .iter()
            .copied()
            .zip(weights.weights().iter().copied())
            .collect();
        self.check(&positions)
    }

    /// Re-validates a finished basket against these limits.
    #[must_use]
    pub fn validate_constraints(&self, output: &BasketOutput) -> Vec<ConstraintViolation> {
        let positions: Vec<(&BondRecord, f64)> = output
            .constituents
            .iter()
            .map(|c| (&c.bond, c.weight))
            .collect();
        self.check(&positions)
    }

    fn check(&self, positions: &[(&BondRecord, f64)]) -> Vec<ConstraintViolation> {
        let c = self.config;
        let mut violations = Vec::new();

        if positions.len() > c.max_basket_size {
            violations.push(ConstraintViolation {
                kind: ViolationKind::Size,
                entity: BASKET_ENTITY.to_string(),
                severity: Severity::Blocking,
                actual: positions.len() as f64,
                limit: c.max_basket_size as f64,
                remediation: format!(
                    "remove {} constituent(s) or lower size_limit",
                    positions.len() - c.max_basket_size
                ),
            });
        }

        for (bond, weight) in positions {
            if exceeds(*weight, c.max_position_weight) {
                violations.push(ConstraintViolation {
                    kind: ViolationKind::PositionConcentration,
                    entity: bond.isin.clone(),
                    severity: Severity::Blocking,
                    actual: *weight,
                    limit: c.max_position_weight,
                    remediation: format!(
                        "reduce {} by {:.4} or add constituents",
                        bond.isin,
                        weight - c.max_position_weight
                    ),
                });
            }
        }

        if let Some(max) = c.max_sector_weight {
            let mut by_sector: BTreeMap<&str, f64> = BTreeMap::new();
            for (bond, weight) in positions {
                *by_sector.entry(bond.sector.name()).or_insert(0.0) += weight;
            }
            for (sector, weight) in by_sector {
                if exceeds(weight, max) {
                    violations.push(ConstraintViolation {
                        kind: ViolationKind::SectorConcentration,
                        entity: sector.to_string(),
                        severity: Severity::Blocking,
                        actual: weight,
                        limit: max,
                        remediation: format!(
                            "move {:.4} of weight out of {sector}",
                            weight - max
                        ),
                    });
                }
            }
        }

        if let Some(max) = c.max_rating_weight {
            let mut by_rating: BTreeMap<CreditRating, f64> = BTreeMap::new();
            for (bond, weight) in positions {
                *by_rating.entry(bond.rating).or_insert(0.0) += weight;
            }
            for (rating, weight) in by_rating {
                if exceeds(weight, max) {
                    violations.push(ConstraintViolation {
                        kind: ViolationKind::RatingConcentration,
                        entity: rating.to_string(),
                        severity: Severity::Blocking,
                        actual: weight,
                        limit: max,
                        remediation: format!(
                            "move {:.4} of weight out of {rating}-rated bonds",
                            weight - max
                        ),
                    });
                }
            }
        }

        if let Some(floor) = c.min_effective_positions {
            if !positions.is_empty() {
                let weights: Vec<f64> = positions.iter().map(|(_, w)| *w).collect();
                let n_eff = effective_positions(&weights);
                if n_eff + LIMIT_TOLERANCE < floor {
                    violations.push(ConstraintViolation {
                        kind: ViolationKind::Diversification,
                        entity: BASKET_ENTITY.to_string(),
                        severity: Severity::Warning,
                        actual: n_eff,
                        limit: floor,
                        remediation: "add constituents or spread weight more evenly".to_string(),
                    });
                }
            }
        }

        violations
    }
}

fn exceeds(value: f64, limit: f64) -> bool {
    value > limit + LIMIT_TOLERANCE
}
