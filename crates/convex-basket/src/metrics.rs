//! Basket quality metrics.
//!
//! Concentration, diversification and distribution statistics for a
//! weighted basket. All functions are pure; distributions are ordered maps so
//! serialized output is deterministic.

use crate::weighting::WeightVector;
use convex_universe::{BondRecord, CreditRating};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of largest positions summed in [`QualityMetrics::top5_weight`].
pub const TOP_N: usize = 5;

/// Herfindahl-Hirschman index: Σ w².
#[must_use]
pub fn herfindahl_index(weights: &[f64]) -> f64 {
    weights.iter().map(|w| w * w).sum()
}

/// Effective number of positions: 1 / HHI, 0 for an empty basket.
#[must_use]
pub fn effective_positions(weights: &[f64]) -> f64 {
    let hhi = herfindahl_index(weights);
    if hhi > 0.0 {
        1.0 / hhi
    } else {
        0.0
    }
}

/// Weighted summary of one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionStats {
    /// Weighted mean.
    pub weighted_mean: f64,
    /// Weighted standard deviation (population).
    pub weighted_std: f64,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
}

impl DistributionStats {
    /// Summarizes `(value, weight)` pairs; `None` if empty or weightless.
    #[must_use]
    pub fn from_weighted(pairs: &[(f64, f64)]) -> Option<Self> {
        let total: f64 = pairs.iter().map(|(_, w)| w).sum();
        if pairs.is_empty() || total <= 0.0 {
            return None;
        }
        let mean = pairs.iter().map(|(x, w)| x * w).sum::<f64>() / total;
        let variance = pairs
            .iter()
            .map(|(x, w)| w * (x - mean).powi(2))
            .sum::<f64>()
            / total;
        let min = pairs.iter().map(|(x, _)| *x).fold(f64::INFINITY, f64::min);
        let max = pairs
            .iter()
            .map(|(x, _)| *x)
            .fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            weighted_mean: mean,
            weighted_std: variance.max(0.0).sqrt(),
            min,
            max,
        })
    }
}

/// Diversification and composition statistics of a basket.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Number of constituents.
    pub constituent_count: usize,

    /// Σ w².
    pub herfindahl_index: f64,

    /// 1 / HHI (0 when empty).
    pub effective_positions: f64,

    /// Largest single weight.
    pub max_weight: f64,

    /// Sum of the five largest weights.
    pub top5_weight: f64,

    /// Weighted average duration (years).
    pub weighted_avg_duration: Option<f64>,

    /// Weighted average rating rank over rated bonds.
    pub weighted_avg_rating_rank: Option<f64>,

    /// Rating nearest the weighted average rank.
    pub average_rating: Option<CreditRating>,

    /// Weighted average yield over bonds with a yield.
    pub weighted_avg_yield: Option<f64>,

    /// Weight in investment-grade bonds.
    pub investment_grade_weight: f64,

    /// Weight per sector.
    pub sector_distribution: BTreeMap<String, f64>,

    /// Weight per rating notch (S&P notation).
    pub rating_distribution: BTreeMap<String, f64>,

    /// Weight per duration bucket.
    pub duration_distribution: BTreeMap<String, f64>,

    /// Number of distinct sectors.
    pub sector_count: usize,

    /// Number of distinct rating notches.
    pub rating_count: usize,

    /// Liquidity score summary.
    pub liquidity: Option<DistributionStats>,

    /// Amount outstanding summary.
    pub amount_outstanding: Option<DistributionStats>,

    /// Total amount outstanding.
    #[serde(serialize_with = "rust_decimal::serde::str::serialize")]
    pub total_amount_outstanding: Decimal,
}

impl QualityMetrics {
    /// True if the basket has no constituents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constituent_count == 0
    }
}

/// Computes [`QualityMetrics`] for weighted bonds.
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityMetricsCalculator;

impl QualityMetricsCalculator {
    /// Creates a calculator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Metrics for bonds and their weights (aligned by position).
    #[must_use]
    pub fn calculate_portfolio_metrics(
        &self,
        bonds: &[&BondRecord],
        weights: &WeightVector,
    ) -> QualityMetrics {
        debug_assert_eq!(bonds.len(), weights.len());
        let w = weights.weights();
        if bonds.is_empty() {
            return QualityMetrics::default();
        }

        let mut sorted = w.to_vec();
        sorted.sort_by(|a, b| b.total_cmp(a));
        let top5_weight: f64 = sorted.iter().take(TOP_N).sum();

        let positions: Vec<(&BondRecord, f64)> = bonds.iter().copied().zip(w.iter().copied()).collect();

        let weighted_avg_duration =
            weighted_mean(positions.iter().map(|(b, w)| (b.duration, *w)));

        let weighted_avg_rating_rank = weighted_mean(
            positions
                .iter()
                .filter(|(b, _)| b.rating.is_rated())
                .map(|(b, w)| (f64::from(b.rating.rank()), *w)),
        );
        let average_rating = weighted_avg_rating_rank
            .and_then(|rank| CreditRating::from_rank(rank.round() as u8));

        let weighted_avg_yield = weighted_mean(
            positions
                .iter()
                .filter_map(|(b, w)| b.yield_to_maturity.map(|y| (y, *w))),
        );

        let investment_grade_weight: f64 = positions
            .iter()
            .filter(|(b, _)| b.rating.is_investment_grade())
            .map(|(_, w)| w)
            .sum();

        let mut sector_distribution = BTreeMap::new();
        let mut rating_distribution = BTreeMap::new();
        let mut duration_distribution = BTreeMap::new();
        for (bond, weight) in &positions {
            *sector_distribution
                .entry(bond.sector.name().to_string())
                .or_insert(0.0) += weight;
            *rating_distribution
                .entry(bond.rating.to_string())
                .or_insert(0.0) += weight;
            if let Some(bucket) = bond.bucket() {
                *duration_distribution
                    .entry(bucket.label().to_string())
                    .or_insert(0.0) += weight;
            }
        }

        let liquidity_pairs: Vec<(f64, f64)> = positions
            .iter()
            .map(|(b, w)| (b.liquidity_score, *w))
            .collect();
        let amount_pairs: Vec<(f64, f64)> = positions
            .iter()
            .filter_map(|(b, w)| b.amount_f64().map(|a| (a, *w)))
            .collect();

        QualityMetrics {
            constituent_count: bonds.len(),
            herfindahl_index: herfindahl_index(w),
            effective_positions: effective_positions(w),
            max_weight: weights.max_weight(),
            top5_weight,
            weighted_avg_duration,
            weighted_avg_rating_rank,
            average_rating,
            weighted_avg_yield,
            investment_grade_weight,
            sector_count: sector_distribution.len(),
            rating_count: rating_distribution.len(),
            sector_distribution,
            rating_distribution,
            duration_distribution,
            liquidity: DistributionStats::from_weighted(&liquidity_pairs),
            amount_outstanding: DistributionStats::from_weighted(&amount_pairs),
            total_amount_outstanding: bonds.iter().map(|b| b.amount_outstanding).sum(),
        }
    }
}

/// Σ x·w / Σ w over the pairs; `None` when the weights sum to zero.
fn weighted_mean(pairs: impl Iterator<Item = (f64, f64)>) -> Option<f64> {
    let (sum, total) = pairs.fold((0.0, 0.0), |(s, t), (x, w)| (s + x * w, t + w));
    if total > 0.0 {
        Some(sum / total)
    } else {
        None
    }
}
