//! Basket construction orchestrator.
//!
//! [`BasketConstructor`] runs one build end to end:
//!
//! 1. validate the specification and pick the builder for its basket type
//! 2. select candidates
//! 3. weight them
//! 4. validate constraints (strict mode aborts on blocking violations)
//! 5. compute quality metrics
//! 6. assemble a [`BasketOutput`] with a fresh identifier
//!
//! The constructor holds no per-build state, so one instance can serve
//! concurrent builds over a shared universe.

use crate::builders::{BasketBuilder, SelectCandidates};
use crate::config::ConstructionConfig;
use crate::constraints::ConstraintValidator;
use crate::error::{BasketError, BasketResult};
use crate::metrics::QualityMetricsCalculator;
use crate::output::{BasketMetadata, BasketOutput, Constituent};
use crate::parallel::maybe_parallel_map;
use crate::spec::BasketSpec;
use crate::weighting::{WeightVector, WeightingStrategy};
use chrono::Utc;
use convex_universe::{BondRecord, Universe};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Builds baskets from specifications.
#[derive(Debug, Clone, Default)]
pub struct BasketConstructor {
    config: ConstructionConfig,
}

impl BasketConstructor {
    /// Creates a constructor with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a constructor with explicit settings.
    #[must_use]
    pub fn with_config(config: ConstructionConfig) -> Self {
        Self { config }
    }

    /// The constructor's settings.
    #[must_use]
    pub fn config(&self) -> &ConstructionConfig {
        &self.config
    }

    /// Builds one basket using the specification's weighting method.
    ///
    /// # Errors
    ///
    /// - [`BasketError::InvalidSpecification`] for an unusable specification
    /// - [`BasketError::InvalidWeightingInput`] if weights cannot be computed,
    ///   including `custom` methods (use [`Self::build_basket_with_weighting`])
    /// - [`BasketError::ReferenceNotFound`] for a missing similarity reference
    /// - [`BasketError::ConstraintViolation`] in strict mode
    pub fn build_basket(&self, spec: &BasketSpec, universe: &Universe) -> BasketResult<BasketOutput> {
        let strategy = WeightingStrategy::from_method(&spec.weighting_method)?;
        self.build_basket_with_weighting(spec, universe, &strategy)
    }

    /// Builds one basket with an explicit weighting strategy.
    ///
    /// The strategy replaces the specification's weighting method; the
    /// output metadata records the strategy actually used.
    ///
    /// # Errors
    ///
    /// Same as [`Self::build_basket`].
    pub fn build_basket_with_weighting(
        &self,
        spec: &BasketSpec,
        universe: &Universe,
        strategy: &WeightingStrategy,
    ) -> BasketResult<BasketOutput> {
        spec.validate()?;
        let builder = BasketBuilder::from_spec(spec)?;

        let mut warnings = Vec::new();
        let candidates = builder.select_candidates(universe, &mut warnings)?;
        let bonds = candidates.bonds();

        let weights = if bonds.is_empty() {
            WeightVector::empty()
        } else {
            strategy.compute_weights(&bonds)?
        };
        debug!(
            basket_type = spec.basket_type.code(),
            weighting = strategy.method().code(),
            constituents = weights.len(),
            "weights computed"
        );

        let violations =
            ConstraintValidator::new(&spec.constraints).validate_basket_constraints(&bonds, &weights);
        if !violations.is_empty() {
            warn!(
                basket_type = spec.basket_type.code(),
                count = violations.len(),
                mode = %spec.constraints.mode,
                "constraint violations found"
            );
            if spec.constraints.is_strict() && violations.iter().any(|v| v.is_blocking()) {
                return Err(BasketError::ConstraintViolation { violations });
            }
            warnings.extend(violations.iter().map(ToString::to_string));
        }

        let quality_metrics = QualityMetricsCalculator::new().calculate_portfolio_metrics(&bonds, &weights);

        let constituents: Vec<Constituent> = candidates
            .candidates()
            .iter()
            .zip(weights.weights())
            .map(|(c, &weight)| Constituent {
                bond: c.bond.clone(),
                weight,
                similarity_score: c.similarity,
            })
            .collect();

        let output = BasketOutput {
            basket_id: Uuid::new_v4().to_string(),
            metadata: BasketMetadata {
                name: spec.name.clone(),
                basket_type: spec.basket_type,
                weighting_method: strategy.method(),
                universe_size: universe.len(),
                candidates_matched: candidates.matched(),
                constituent_count: constituents.len(),
                total_weight: weights.sum(),
                reference_isin: spec.filters.reference_isin.clone(),
                filters: spec.filters.clone(),
                constraints: spec.constraints.clone(),
                created_at: Utc::now(),
            },
            constituents,
            quality_metrics,
            violations,
            warnings,
        };

        info!(
            basket_id = %output.basket_id,
            basket_type = spec.basket_type.code(),
            constituents = output.len(),
            effective_positions = output.quality_metrics.effective_positions,
            warnings = output.warnings.len(),
            "basket built"
        );
        Ok(output)
    }

    /// Builds a basket from raw records, validating them first.
    ///
    /// # Errors
    ///
    /// Returns [`BasketError::SchemaMismatch`] if the records violate the
    /// trading schema, otherwise the same errors as [`Self::build_basket`].
    pub fn build_basket_from_records(
        &self,
        spec: &BasketSpec,
        records: Vec<BondRecord>,
    ) -> BasketResult<BasketOutput> {
        let universe = Universe::new(records)?;
        self.build_basket(spec, &universe)
    }

    /// Builds several baskets over one universe.
    ///
    /// Results keep the order of `specs`; one failing build does not affect
    /// the others. Runs in parallel when the config allows it.
    #[must_use]
    pub fn build_baskets(
        &self,
        specs: &[BasketSpec],
        universe: &Universe,
    ) -> Vec<BasketResult<BasketOutput>> {
        maybe_parallel_map(specs, &self.config, |spec| self.build_basket(spec, universe))
    }
}
