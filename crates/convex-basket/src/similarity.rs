//! Similarity matching against a reference bond.
//!
//! Each candidate is compared with the reference on four factors. Every
//! factor distance lies in [0, 1]:
//!
//! | Factor    | Distance                                  |
//! |-----------|-------------------------------------------|
//! | duration  | `min(|Δd| / duration_scale, 1)`           |
//! | rating    | `min(notches / 21, 1)`, NR vs rated = 1   |
//! | sector    | 0 on match, else 1                        |
//! | liquidity | `min(|Δl| / liquidity_scale, 1)`          |
//!
//! The score is `1 - Σ w·d / Σ w`, so 1.0 means identical on every factor.

use crate::builders::Candidate;
use crate::error::{BasketError, BasketResult};
use convex_universe::{BondRecord, Universe, RATED_NOTCHES};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Largest notch distance on the rated scale (AAA to D).
const MAX_NOTCHES: f64 = (RATED_NOTCHES - 1) as f64;

/// Relative importance of each similarity factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityWeights {
    /// Weight of the duration distance.
    pub duration: f64,
    /// Weight of the rating distance.
    pub rating: f64,
    /// Weight of the sector distance.
    pub sector: f64,
    /// Weight of the liquidity distance.
    pub liquidity: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            duration: 0.25,
            rating: 0.25,
            sector: 0.25,
            liquidity: 0.25,
        }
    }
}

impl SimilarityWeights {
    fn as_array(&self) -> [f64; 4] {
        [self.duration, self.rating, self.sector, self.liquidity]
    }

    fn total(&self) -> f64 {
        self.as_array().iter().sum()
    }
}

/// Tolerances and factor weights for similarity matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// Factor weights.
    pub weights: SimilarityWeights,

    /// Duration difference (years) that counts as fully dissimilar.
    pub duration_scale: f64,

    /// Liquidity difference that counts as fully dissimilar.
    pub liquidity_scale: f64,

    /// Hard limit on |Δ duration| in years.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_duration_diff: Option<f64>,

    /// Hard limit on rating distance in notches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rating_notches: Option<u8>,

    /// Hard limit on |Δ liquidity|.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_liquidity_diff: Option<f64>,

    /// Keep only bonds in the reference's sector.
    pub require_same_sector: bool,

    /// Drop candidates scoring below this floor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_similarity: Option<f64>,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            weights: SimilarityWeights::default(),
            duration_scale: 10.0,
            liquidity_scale: 100.0,
            max_duration_diff: None,
            max_rating_notches: None,
            max_liquidity_diff: None,
            require_same_sector: false,
            min_similarity: None,
        }
    }
}

impl SimilarityConfig {
    /// Creates a config with equal factor weights and no hard limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the factor weights.
    #[must_use]
    pub fn with_weights(mut self, weights: SimilarityWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Sets the duration and liquidity scales.
    #[must_use]
    pub fn with_scales(mut self, duration_scale: f64, liquidity_scale: f64) -> Self {
        self.duration_scale = duration_scale;
        self.liquidity_scale = liquidity_scale;
        self
    }

    /// Sets the hard duration tolerance.
    #[must_use]
    pub fn with_max_duration_diff(mut self, years: f64) -> Self {
        self.max_duration_diff = Some(years);
        self
    }

    /// Sets the hard rating tolerance.
    #[must_use]
    pub fn with_max_rating_notches(mut self, notches: u8) -> Self {
        self.max_rating_notches = Some(notches);
        self
    }

    /// Sets the hard liquidity tolerance.
    #[must_use]
    pub fn with_max_liquidity_diff(mut self, diff: f64) -> Self {
        self.max_liquidity_diff = Some(diff);
        self
    }

    /// Sets whether candidates must share the reference's sector.
    #[must_use]
    pub fn with_same_sector(mut self, required: bool) -> Self {
        self.require_same_sector = required;
        self
    }

    /// Sets the minimum score.
    #[must_use]
    pub fn with_min_similarity(mut self, floor: f64) -> Self {
        self.min_similarity = Some(floor);
        self
    }

    /// Checks weights, scales and tolerances.
    ///
    /// # Errors
    ///
    /// Returns [`BasketError::InvalidSpecification`] for negative or
    /// non-finite weights, a zero weight sum, non-positive scales, or
    /// negative tolerances.
    pub fn validate(&self) -> BasketResult<()> {
        let weights = self.weights.as_array();
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(BasketError::invalid_spec(format!(
                "similarity weights must be finite and >= 0, got {weights:?}"
            )));
        }
        if self.weights.total() <= 0.0 {
            return Err(BasketError::invalid_spec(
                "similarity weights sum to zero",
            ));
        }
        for (name, scale) in [
            ("duration_scale", self.duration_scale),
            ("liquidity_scale", self.liquidity_scale),
        ] {
            if !(scale.is_finite() && scale > 0.0) {
                return Err(BasketError::invalid_spec(format!(
                    "{name} must be positive, got {scale}"
                )));
            }
        }
        for (name, limit) in [
            ("max_duration_diff", self.max_duration_diff),
            ("max_liquidity_diff", self.max_liquidity_diff),
            ("min_similarity", self.min_similarity),
        ] {
            if let Some(v) = limit {
                if v.is_nan() || v < 0.0 {
                    return Err(BasketError::invalid_spec(format!(
                        "{name} must be >= 0, got {v}"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Per-factor distances between two bonds, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorDistances {
    /// Scaled duration distance.
    pub duration: f64,
    /// Scaled rating distance.
    pub rating: f64,
    /// 0 on sector match, else 1.
    pub sector: f64,
    /// Scaled liquidity distance.
    pub liquidity: f64,
}

/// Scores and ranks bonds by similarity to a reference.
#[derive(Debug, Clone)]
pub struct SimilarityMatcher {
    config: SimilarityConfig,
}

impl SimilarityMatcher {
    /// Creates a matcher.
    ///
    /// # Errors
    ///
    /// Returns [`BasketError::InvalidSpecification`] if the config is invalid.
    pub fn new(config: SimilarityConfig) -> BasketResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The matcher's configuration.
    #[must_use]
    pub fn config(&self) -> &SimilarityConfig {
        &self.config
    }

    /// Per-factor distances from `reference` to `candidate`.
    #[must_use]
    pub fn factor_distances(&self, reference: &BondRecord, candidate: &BondRecord) -> FactorDistances {
        let duration =
            ((reference.duration - candidate.duration).abs() / self.config.duration_scale).min(1.0);
        let rating = reference
            .rating
            .notches_from(candidate.rating)
            .map_or(1.0, |n| (f64::from(n) / MAX_NOTCHES).min(1.0));
        let sector = if reference.sector == candidate.sector {
            0.0
        } else {
            1.0
        };
        let liquidity = ((reference.liquidity_score - candidate.liquidity_score).abs()
            / self.config.liquidity_scale)
            .min(1.0);

        FactorDistances {
            duration,
            rating,
            sector,
            liquidity,
        }
    }

    /// Similarity score in [0, 1]; 1.0 means identical on every factor.
    #[must_use]
    pub fn similarity(&self, reference: &BondRecord, candidate: &BondRecord) -> f64 {
        let d = self.factor_distances(reference, candidate);
        let w = &self.config.weights;
        let weighted =
            w.duration * d.duration + w.rating * d.rating + w.sector * d.sector + w.liquidity * d.liquidity;
        (1.0 - weighted / w.total()).clamp(0.0, 1.0)
    }

    /// Scores every candidate against the reference, in input order.
    ///
    /// The reference is scored like any other bond if present.
    #[must_use]
    pub fn calculate_similarity_scores<'u>(
        &self,
        reference: &BondRecord,
        candidates: &[&'u BondRecord],
    ) -> Vec<Candidate<'u>> {
        candidates
            .iter()
            .map(|&bond| Candidate::scored(bond, self.similarity(reference, bond)))
            .collect()
    }

    /// Keeps candidates inside every hard tolerance.
    #[must_use]
    pub fn apply_similarity_constraints<'u>(
        &self,
        reference: &BondRecord,
        candidates: Vec<&'u BondRecord>,
    ) -> Vec<&'u BondRecord> {
        let c = &self.config;
        candidates
            .into_iter()
            .filter(|b| {
                c.max_duration_diff
                    .map_or(true, |max| (reference.duration - b.duration).abs() <= max)
            })
            .filter(|b| {
                c.max_rating_notches.map_or(true, |max| {
                    reference
                        .rating
                        .notches_from(b.rating)
                        .is_some_and(|n| n <= max)
                })
            })
            .filter(|b| {
                c.max_liquidity_diff.map_or(true, |max| {
                    (reference.liquidity_score - b.liquidity_score).abs() <= max
                })
            })
            .filter(|b| !c.require_same_sector || reference.sector == b.sector)
            .collect()
    }

    /// Sorts by descending score; ties go to the smaller identifier.
    pub fn rank_by_similarity(scored: &mut [Candidate<'_>]) {
        scored.sort_by(|a, b| {
            b.score()
                .total_cmp(&a.score())
                .then_with(|| a.bond.isin.cmp(&b.bond.isin))
        });
    }

    /// Finds bonds similar to `reference_isin`, best first.
    ///
    /// Pipeline: hard tolerances, scoring, `min_similarity` floor, ranking,
    /// then truncation to `limit`. The reference itself is excluded.
    ///
    /// # Errors
    ///
    /// Returns [`BasketError::ReferenceNotFound`] if the reference is absent.
    pub fn find_similar_bonds<'u>(
        &self,
        universe: &'u Universe,
        reference_isin: &str,
        limit: Option<usize>,
    ) -> BasketResult<Vec<Candidate<'u>>> {
        let reference = universe
            .get(reference_isin)
            .ok_or_else(|| BasketError::reference_not_found(reference_isin))?;

        let pool: Vec<&BondRecord> = universe
            .iter()
            .filter(|b| b.isin != reference.isin)
            .collect();
        let pool_size = pool.len();
        let eligible = self.apply_similarity_constraints(reference, pool);

        let mut scored = self.calculate_similarity_scores(reference, &eligible);
        if let Some(floor) = self.config.min_similarity {
            scored.retain(|c| c.score() >= floor);
        }
        Self::rank_by_similarity(&mut scored);
        if let Some(n) = limit {
            scored.truncate(n);
        }

        debug!(
            reference = reference_isin,
            pool = pool_size,
            eligible = eligible.len(),
            selected = scored.len(),
            "similarity search complete"
        );
        Ok(scored)
    }
}
