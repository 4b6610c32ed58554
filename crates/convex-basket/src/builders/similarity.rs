//! Similarity builder.

use super::{CandidateSet, SelectCandidates, NO_CANDIDATES_WARNING};
use crate::error::BasketResult;
use crate::similarity::{SimilarityConfig, SimilarityMatcher};
use convex_universe::Universe;
use tracing::warn;

/// Selects the bonds closest to a reference bond.
///
/// The liquidity floor and the size limit apply after ranking, so the basket
/// holds the `size_limit` best-scoring bonds above the floor.
#[derive(Debug, Clone)]
pub struct SimilarityBasketBuilder {
    reference_isin: String,
    matcher: SimilarityMatcher,
    size_limit: usize,
    min_liquidity: Option<f64>,
}

impl SimilarityBasketBuilder {
    /// Creates a similarity builder.
    ///
    /// # Errors
    ///
    /// Returns [`BasketError::InvalidSpecification`](crate::BasketError::InvalidSpecification)
    /// if the similarity config is invalid.
    pub fn new(
        reference_isin: impl Into<String>,
        config: SimilarityConfig,
        size_limit: usize,
    ) -> BasketResult<Self> {
        Ok(Self {
            reference_isin: reference_isin.into(),
            matcher: SimilarityMatcher::new(config)?,
            size_limit,
            min_liquidity: None,
        })
    }

    /// Sets the liquidity floor.
    #[must_use]
    pub fn with_min_liquidity(mut self, floor: Option<f64>) -> Self {
        self.min_liquidity = floor;
        self
    }

    /// The reference bond identifier.
    #[must_use]
    pub fn reference_isin(&self) -> &str {
        &self.reference_isin
    }
}

impl SelectCandidates for SimilarityBasketBuilder {
    fn select_candidates<'u>(
        &self,
        universe: &'u Universe,
        warnings: &mut Vec<String>,
    ) -> BasketResult<CandidateSet<'u>> {
        let mut ranked = self
            .matcher
            .find_similar_bonds(universe, &self.reference_isin, None)?;
        if let Some(floor) = self.min_liquidity {
            ranked.retain(|c| c.bond.liquidity_score >= floor);
        }

        let matched = ranked.len();
        ranked.truncate(self.size_limit);

        if ranked.is_empty() {
            warn!(reference = %self.reference_isin, "{NO_CANDIDATES_WARNING}");
            warnings.push(NO_CANDIDATES_WARNING.to_string());
        }
        Ok(CandidateSet::new(ranked, matched))
    }
}
