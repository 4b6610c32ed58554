//! Basket builders.
//!
//! A builder turns a universe into a candidate set. It never weights:
//!
//! - **Sector**: one sector, optionally above a liquidity floor
//! - **Sector/Rating**: adds a rating band compared by rank
//! - **Sector/Rating/Duration**: adds a duration bucket or range
//! - **Similarity**: the closest bonds to a reference bond
//!
//! Rule-based builders truncate to the size limit by descending liquidity,
//! then descending amount outstanding, then ascending identifier. An empty
//! result is not an error; the builder records [`NO_CANDIDATES_WARNING`].
//!
//! # Example
//!
//! ```rust,ignore
//! let builder = BasketBuilder::from_spec(&spec)?;
//! let mut warnings = Vec::new();
//! let candidates = builder.select_candidates(&universe, &mut warnings)?;
//! ```

mod rules;
mod similarity;

pub use rules::*;
pub use similarity::*;

use crate::error::{BasketError, BasketResult};
use crate::spec::{BasketSpec, BasketType};
use convex_universe::{BondRecord, Universe};

/// Warning recorded when a builder selects nothing.
pub const NO_CANDIDATES_WARNING: &str = "no candidates matched filters";

/// A selected bond, with its similarity score when one was computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate<'u> {
    /// The selected bond.
    pub bond: &'u BondRecord,
    /// Similarity to the reference bond (similarity baskets only).
    pub similarity: Option<f64>,
}

impl<'u> Candidate<'u> {
    /// A candidate chosen by filtering.
    #[must_use]
    pub fn new(bond: &'u BondRecord) -> Self {
        Self {
            bond,
            similarity: None,
        }
    }

    /// A candidate chosen by similarity.
    #[must_use]
    pub fn scored(bond: &'u BondRecord, score: f64) -> Self {
        Self {
            bond,
            similarity: Some(score),
        }
    }

    /// Similarity score, 0 when none was computed.
    #[must_use]
    pub fn score(&self) -> f64 {
        self.similarity.unwrap_or(0.0)
    }
}

/// The ordered output of a builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateSet<'u> {
    candidates: Vec<Candidate<'u>>,
    matched: usize,
}

impl<'u> CandidateSet<'u> {
    /// Wraps selected candidates; `matched` counts bonds that passed the
    /// filters before truncation.
    #[must_use]
    pub fn new(candidates: Vec<Candidate<'u>>, matched: usize) -> Self {
        Self {
            candidates,
            matched,
        }
    }

    /// Selected candidates in basket order.
    #[must_use]
    pub fn candidates(&self) -> &[Candidate<'u>] {
        &self.candidates
    }

    /// The selected bonds in basket order.
    #[must_use]
    pub fn bonds(&self) -> Vec<&'u BondRecord> {
        self.candidates.iter().map(|c| c.bond).collect()
    }

    /// Bonds that passed the filters before truncation.
    #[must_use]
    pub fn matched(&self) -> usize {
        self.matched
    }

    /// Number of selected candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// True if nothing was selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Candidate selection, the one operation every builder provides.
pub trait SelectCandidates {
    /// Selects candidates from the universe.
    ///
    /// Selection problems that do not abort the build are appended to
    /// `warnings`.
    ///
    /// # Errors
    ///
    /// Builders fail only on conditions that make the basket meaningless,
    /// such as a missing similarity reference.
    fn select_candidates<'u>(
        &self,
        universe: &'u Universe,
        warnings: &mut Vec<String>,
    ) -> BasketResult<CandidateSet<'u>>;
}

/// The builder chosen for a basket type.
#[derive(Debug, Clone)]
pub enum BasketBuilder {
    /// Sector basket.
    Sector(SectorBasketBuilder),
    /// Sector and rating basket.
    SectorRating(SectorRatingBasketBuilder),
    /// Sector, rating and duration basket.
    SectorRatingDuration(SectorRatingDurationBasketBuilder),
    /// Similarity basket.
    Similarity(SimilarityBasketBuilder),
}

impl BasketBuilder {
    /// Selects the builder for a specification's basket type.
    ///
    /// # Errors
    ///
    /// Returns [`BasketError::InvalidSpecification`] if a filter the basket
    /// type needs is missing.
    pub fn from_spec(spec: &BasketSpec) -> BasketResult<Self> {
        let f = &spec.filters;
        let limit = spec.size_limit();
        let required = |name: &str| {
            BasketError::invalid_spec(format!(
                "{} basket requires filter '{name}'",
                spec.basket_type.code()
            ))
        };

        let builder = match spec.basket_type {
            BasketType::Sector => {
                let sector = f.sector.clone().ok_or_else(|| required("sector"))?;
                Self::Sector(
                    SectorBasketBuilder::new(sector, limit).with_min_liquidity(f.min_liquidity),
                )
            }
            BasketType::SectorRating => {
                let sector = f.sector.clone().ok_or_else(|| required("sector"))?;
                let rating = f.rating.ok_or_else(|| required("rating"))?;
                Self::SectorRating(
                    SectorRatingBasketBuilder::new(sector, rating, limit)
                        .with_min_liquidity(f.min_liquidity),
                )
            }
            BasketType::SectorRatingDuration => {
                let sector = f.sector.clone().ok_or_else(|| required("sector"))?;
                let rating = f.rating.ok_or_else(|| required("rating"))?;
                let duration = f.duration.ok_or_else(|| required("duration"))?;
                Self::SectorRatingDuration(
                    SectorRatingDurationBasketBuilder::new(sector, rating, duration, limit)
                        .with_min_liquidity(f.min_liquidity),
                )
            }
            BasketType::Similarity => {
                let reference = f
                    .reference_isin
                    .clone()
                    .ok_or_else(|| required("reference_isin"))?;
                let config = f.similarity.clone().unwrap_or_default();
                Self::Similarity(
                    SimilarityBasketBuilder::new(reference, config, limit)?
                        .with_min_liquidity(f.min_liquidity),
                )
            }
        };
        Ok(builder)
    }

    /// The basket type this builder serves.
    #[must_use]
    pub fn basket_type(&self) -> BasketType {
        match self {
            Self::Sector(_) => BasketType::Sector,
            Self::SectorRating(_) => BasketType::SectorRating,
            Self::SectorRatingDuration(_) => BasketType::SectorRatingDuration,
            Self::Similarity(_) => BasketType::Similarity,
        }
    }
}

impl SelectCandidates for BasketBuilder {
    fn select_candidates<'u>(
        &self,
        universe: &'u Universe,
        warnings: &mut Vec<String>,
    ) -> BasketResult<CandidateSet<'u>> {
        match self {
            Self::Sector(b) => b.select_candidates(universe, warnings),
            Self::SectorRating(b) => b.select_candidates(universe, warnings),
            Self::SectorRatingDuration(b) => b.select_candidates(universe, warnings),
            Self::Similarity(b) => b.select_candidates(universe, warnings),
        }
    }
}
