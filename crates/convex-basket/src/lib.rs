//! # Convex Basket
//!
//! Bond basket construction for fixed income portfolio workflows.
//!
//! A basket is a curated, weighted subset of a bond [`Universe`]. This crate
//! builds baskets from a declarative [`BasketSpec`] in a repeatable, auditable
//! way: the same specification over the same universe yields the same
//! constituents, weights and metrics.
//!
//! ## Design Philosophy
//!
//! - **Pure functions**: no I/O, no caching, no shared mutable state
//! - **Enum dispatch**: builders and weighting strategies are closed sets
//!   selected per call
//! - **Explicit warnings**: non-fatal problems are collected on the output
//! - **Deterministic ties**: the bond identifier is the final sort key
//!
//! ## Quick Start
//!
//! ```rust
//! use convex_basket::prelude::*;
//! use rust_decimal::Decimal;
//!
//! let bonds: Vec<BondRecord> = (1..=5)
//!     .map(|i| {
//!         BondRecord::builder()
//!             .isin(format!("US000000000{i}"))
//!             .sector("Industrials")
//!             .rating(CreditRating::BBB)
//!             .duration(f64::from(i))
//!             .liquidity_score(10.0 * f64::from(i))
//!             .amount_outstanding(Decimal::from(500_000_000))
//!             .build()
//!             .unwrap()
//!     })
//!     .collect();
//! let universe = Universe::new(bonds).unwrap();
//!
//! let spec = BasketSpec::sector("Industrial")
//!     .with_size_limit(3)
//!     .with_weighting(WeightingMethod::liquidity());
//!
//! let basket = BasketConstructor::new().build_basket(&spec, &universe).unwrap();
//! assert_eq!(basket.len(), 3);
//! assert!((basket.metadata.total_weight - 1.0).abs() < 1e-9);
//! ```
//!
//! ## Module Overview
//!
//! - [`weighting`] - Equal, amount-outstanding, liquidity and custom weights
//! - [`builders`] - Candidate selection per basket type
//! - [`similarity`] - Similarity scoring against a reference bond
//! - [`constraints`] - Portfolio limit checks with remediation hints
//! - [`metrics`] - Herfindahl, effective N, distributions
//! - [`constructor`] - The build orchestrator
//! - [`spec`] - Basket specifications (JSON / TOML)
//! - [`output`] - Basket results
//! - [`config`] - Constraint and construction settings
//!
//! ## Feature Flags
//!
//! - `parallel`: Enable rayon-based parallel batch builds

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod builders;
pub mod config;
pub mod constraints;
pub mod constructor;
pub mod error;
pub mod metrics;
pub mod output;
pub mod parallel;
pub mod similarity;
pub mod spec;
pub mod weighting;

// Re-export error types at crate root
pub use error::{BasketError, BasketResult};

pub use builders::{
    BasketBuilder, Candidate, CandidateSet, SectorBasketBuilder, SectorRatingBasketBuilder,
    SectorRatingDurationBasketBuilder, SelectCandidates, SelectionRules, SimilarityBasketBuilder,
    NO_CANDIDATES_WARNING,
};
pub use config::{ConstraintConfig, ConstructionConfig, ValidationMode};
pub use constraints::{ConstraintValidator, ConstraintViolation, Severity, ViolationKind};
pub use constructor::BasketConstructor;
pub use metrics::{
    effective_positions, herfindahl_index, DistributionStats, QualityMetrics,
    QualityMetricsCalculator,
};
pub use output::{BasketMetadata, BasketOutput, Constituent};
pub use similarity::{FactorDistances, SimilarityConfig, SimilarityMatcher, SimilarityWeights};
pub use spec::{BasketFilters, BasketSpec, BasketType, DurationFilter, RatingFilter};
pub use weighting::{CustomWeight, WeightVector, WeightingMethod, WeightingStrategy};

// Schema types callers need alongside the engine
pub use convex_universe::{
    BondRecord, BondRecordBuilder, CreditRating, DurationBucket, Sector, Universe, UniverseError,
};

/// Prelude module for convenient imports.
///
/// ```rust
/// use convex_basket::prelude::*;
/// ```
pub mod prelude {
    pub use crate::builders::{BasketBuilder, SelectCandidates, NO_CANDIDATES_WARNING};
    pub use crate::config::{ConstraintConfig, ConstructionConfig, ValidationMode};
    pub use crate::constraints::{ConstraintValidator, ConstraintViolation, Severity, ViolationKind};
    pub use crate::constructor::BasketConstructor;
    pub use crate::error::{BasketError, BasketResult};
    pub use crate::metrics::{QualityMetrics, QualityMetricsCalculator};
    pub use crate::output::{BasketOutput, Constituent};
    pub use crate::similarity::{SimilarityConfig, SimilarityMatcher, SimilarityWeights};
    pub use crate::spec::{BasketFilters, BasketSpec, BasketType, DurationFilter, RatingFilter};
    pub use crate::weighting::{WeightVector, WeightingMethod, WeightingStrategy};
    pub use convex_universe::{BondRecord, CreditRating, DurationBucket, Sector, Universe};
}
