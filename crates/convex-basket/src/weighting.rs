//! Weighting strategies.
//!
//! A [`WeightingMethod`] is the serializable description carried by a basket
//! specification; a [`WeightingStrategy`] is the executable form that maps a
//! candidate set to a [`WeightVector`]. Every strategy either returns weights
//! that are non-negative and sum to 1.0, or fails with
//! [`BasketError::InvalidWeightingInput`]. NaN weights are never produced.

use crate::error::{BasketError, BasketResult};
use convex_universe::BondRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Default liquidity exponent.
pub const DEFAULT_LIQUIDITY_POWER: f64 = 1.0;

fn default_power() -> f64 {
    DEFAULT_LIQUIDITY_POWER
}

/// Serializable description of a weighting scheme.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum WeightingMethod {
    /// Equal weight across all constituents
    #[default]
    Equal,

    /// Weight by amount outstanding
    AmountOutstanding,

    /// Weight by liquidity score raised to `power`
    Liquidity {
        /// Exponent applied to each liquidity score.
        #[serde(default = "default_power")]
        power: f64,
    },

    /// Caller-supplied scoring function, identified by name
    Custom {
        /// Label of the scoring function.
        name: String,
    },
}

impl WeightingMethod {
    /// Liquidity weighting with the default exponent.
    #[must_use]
    pub fn liquidity() -> Self {
        Self::Liquidity {
            power: DEFAULT_LIQUIDITY_POWER,
        }
    }

    /// Returns a human-readable name for the weighting method.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Equal => "Equal Weight",
            Self::AmountOutstanding => "Amount Outstanding",
            Self::Liquidity { .. } => "Liquidity",
            Self::Custom { .. } => "Custom",
        }
    }

    /// Returns a short code for the weighting method.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Equal => "EQ",
            Self::AmountOutstanding => "AMT",
            Self::Liquidity { .. } => "LIQ",
            Self::Custom { .. } => "CUSTOM",
        }
    }
}

impl fmt::Display for WeightingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Liquidity { power } => write!(f, "{} (power {power})", self.name()),
            Self::Custom { name } => write!(f, "{} ({name})", self.name()),
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// Raw scoring function: one score per bond, in input order.
pub type ScoreFn = dyn Fn(&[&BondRecord]) -> Vec<f64> + Send + Sync;

/// A named, shareable scoring function.
#[derive(Clone)]
pub struct CustomWeight {
    name: String,
    scorer: Arc<ScoreFn>,
}

impl CustomWeight {
    /// Wraps a scoring function.
    pub fn new<F>(name: impl Into<String>, scorer: F) -> Self
    where
        F: Fn(&[&BondRecord]) -> Vec<f64> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            scorer: Arc::new(scorer),
        }
    }

    /// The function's label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw scores for the given bonds.
    #[must_use]
    pub fn score(&self, bonds: &[&BondRecord]) -> Vec<f64> {
        (self.scorer)(bonds)
    }
}

impl fmt::Debug for CustomWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomWeight")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Executable weighting strategy.
#[derive(Debug, Clone, Default)]
pub enum WeightingStrategy {
    /// 1/n per constituent.
    #[default]
    Equal,
    /// amount_i / Σ amount.
    AmountOutstanding,
    /// liquidity_i^p / Σ liquidity^p.
    Liquidity {
        /// Exponent applied to each liquidity score.
        power: f64,
    },
    /// score_i / Σ score from a caller function.
    Custom(CustomWeight),
}

impl WeightingStrategy {
    /// Resolves a serializable method into a strategy.
    ///
    /// # Errors
    ///
    /// `Custom` methods carry no function and cannot be resolved here; pass a
    /// [`WeightingStrategy::Custom`] to the constructor instead.
    pub fn from_method(method: &WeightingMethod) -> BasketResult<Self> {
        match method {
            WeightingMethod::Equal => Ok(Self::Equal),
            WeightingMethod::AmountOutstanding => Ok(Self::AmountOutstanding),
            WeightingMethod::Liquidity { power } => Ok(Self::Liquidity { power: *power }),
            WeightingMethod::Custom { name } => Err(BasketError::invalid_weighting(format!(
                "custom weighting '{name}' needs a scoring function; \
                 use build_basket_with_weighting"
            ))),
        }
    }

    /// Wraps a scoring function as a custom strategy.
    pub fn custom<F>(name: impl Into<String>, scorer: F) -> Self
    where
        F: Fn(&[&BondRecord]) -> Vec<f64> + Send + Sync + 'static,
    {
        Self::Custom(CustomWeight::new(name, scorer))
    }

    /// The serializable description of this strategy.
    #[must_use]
    pub fn method(&self) -> WeightingMethod {
        match self {
            Self::Equal => WeightingMethod::Equal,
            Self::AmountOutstanding => WeightingMethod::AmountOutstanding,
            Self::Liquidity { power } => WeightingMethod::Liquidity { power: *power },
            Self::Custom(custom) => WeightingMethod::Custom {
                name: custom.name().to_string(),
            },
        }
    }

    /// Computes one weight per bond, aligned with the input order.
    ///
    /// # Errors
    ///
    /// Returns [`BasketError::InvalidWeightingInput`] when the inputs cannot
    /// yield a valid distribution. Only `Equal` accepts an empty input.
    pub fn compute_weights(&self, bonds: &[&BondRecord]) -> BasketResult<WeightVector> {
        let isins = bonds.iter().map(|b| b.isin.clone()).collect();

        let raw = match self {
            Self::Equal => return Ok(WeightVector::equal(isins)),
            _ if bonds.is_empty() => {
                return Err(BasketError::invalid_weighting(format!(
                    "{} weighting needs at least one bond",
                    self.method().name()
                )))
            }
            Self::AmountOutstanding => amount_scores(bonds)?,
            Self::Liquidity { power } => liquidity_scores(bonds, *power)?,
            Self::Custom(custom) => custom_scores(custom, bonds)?,
        };

        WeightVector::normalized(isins, raw).ok_or_else(|| {
            BasketError::invalid_weighting(format!(
                "{} scores sum to zero",
                self.method().name()
            ))
        })
    }
}

fn amount_scores(bonds: &[&BondRecord]) -> BasketResult<Vec<f64>> {
    bonds
        .iter()
        .map(|b| match b.amount_f64() {
            Some(a) if a.is_finite() && a >= 0.0 => Ok(a),
            Some(a) if a < 0.0 => Err(BasketError::invalid_weighting(format!(
                "negative amount outstanding for {}",
                b.isin
            ))),
            _ => Err(BasketError::invalid_weighting(format!(
                "amount outstanding for {} is not representable",
                b.isin
            ))),
        })
        .collect()
}

fn liquidity_scores(bonds: &[&BondRecord], power: f64) -> BasketResult<Vec<f64>> {
    if !power.is_finite() {
        return Err(BasketError::invalid_weighting(format!(
            "liquidity power must be finite, got {power}"
        )));
    }

    bonds
        .iter()
        .map(|b| {
            let l = b.liquidity_score;
            if !l.is_finite() || l < 0.0 {
                return Err(BasketError::invalid_weighting(format!(
                    "invalid liquidity score {l} for {}",
                    b.isin
                )));
            }
            // l^0 is 1 for every score, zero included.
            if power == 0.0 {
                return Ok(1.0);
            }
            if power < 1.0 && l <= 0.0 {
                return Err(BasketError::invalid_weighting(format!(
                    "liquidity score for {} must be positive when power is {power}",
                    b.isin
                )));
            }
            let s = l.powf(power);
            if s.is_finite() {
                Ok(s)
            } else {
                Err(BasketError::invalid_weighting(format!(
                    "liquidity score {l} for {} overflows at power {power}",
                    b.isin
                )))
            }
        })
        .collect()
}

fn custom_scores(custom: &CustomWeight, bonds: &[&BondRecord]) -> BasketResult<Vec<f64>> {
    let scores = custom.score(bonds);
    if scores.len() != bonds.len() {
        return Err(BasketError::invalid_weighting(format!(
            "custom weighting '{}' returned {} scores for {} bonds",
            custom.name(),
            scores.len(),
            bonds.len()
        )));
    }
    if let Some((b, s)) = bonds
        .iter()
        .zip(&scores)
        .find(|(_, s)| !s.is_finite() || **s < 0.0)
    {
        return Err(BasketError::invalid_weighting(format!(
            "custom weighting '{}' gave invalid score {s} for {}",
            custom.name(),
            b.isin
        )));
    }
    Ok(scores)
}

/// Weights aligned with bond identifiers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WeightVector {
    isins: Vec<String>,
    weights: Vec<f64>,
}

impl WeightVector {
    /// An empty weight vector.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Exactly 1/n per identifier.
    #[must_use]
    pub fn equal(isins: Vec<String>) -> Self {
        let n = isins.len();
        let weights = if n == 0 {
            Vec::new()
        } else {
            vec![1.0 / n as f64; n]
        };
        Self { isins, weights }
    }

    /// Divides raw scores by their sum; `None` when the sum is not positive.
    #[must_use]
    pub fn normalized(isins: Vec<String>, raw: Vec<f64>) -> Option<Self> {
        let total: f64 = raw.iter().sum();
        if !(total > 0.0 && total.is_finite()) {
            return None;
        }
        let weights = raw.into_iter().map(|s| s / total).collect();
        Some(Self { isins, weights })
    }

    /// Builds a vector from already-normalized pairs.
    #[must_use]
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, f64)>) -> Self {
        let (isins, weights) = pairs.into_iter().unzip();
        Self { isins, weights }
    }

    /// Weights in constituent order.
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Identifiers in constituent order.
    #[must_use]
    pub fn isins(&self) -> &[String] {
        &self.isins
    }

    /// Weight of one identifier.
    #[must_use]
    pub fn get(&self, isin: &str) -> Option<f64> {
        self.isins
            .iter()
            .position(|i| i == isin)
            .map(|idx| self.weights[idx])
    }

    /// Iterates `(isin, weight)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.isins
            .iter()
            .map(String::as_str)
            .zip(self.weights.iter().copied())
    }

    /// Sum of weights.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Largest single weight (0 when empty).
    #[must_use]
    pub fn max_weight(&self) -> f64 {
        self.weights.iter().copied().fold(0.0, f64::max)
    }

    /// Number of weights.
    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// True if there are no weights.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use convex_universe::CreditRating;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn bond(isin: &str, liquidity: f64, amount: Decimal) -> BondRecord {
        BondRecord::builder()
            .isin(isin)
            .sector("Industrial")
            .rating(CreditRating::A)
            .duration(5.0)
            .liquidity_score(liquidity)
            .amount_outstanding(amount)
            .build()
            .unwrap()
    }

    fn bonds() -> Vec<BondRecord> {
        vec![
            bond("B1", 10.0, dec!(100)),
            bond("B2", 30.0, dec!(300)),
            bond("B3", 60.0, dec!(600)),
        ]
    }

    // =========================================================================
    // Methods
    // =========================================================================

    #[test]
    fn test_method_default_and_names() {
        assert_eq!(WeightingMethod::default(), WeightingMethod::Equal);
        assert_eq!(WeightingMethod::Equal.code(), "EQ");
        assert_eq!(WeightingMethod::AmountOutstanding.name(), "Amount Outstanding");
        assert_eq!(
            WeightingMethod::liquidity().to_string(),
            "Liquidity (power 1)"
        );
    }

    #[test]
    fn test_method_serde_tagged() {
        let json = serde_json::to_value(WeightingMethod::Liquidity { power: 2.0 }).unwrap();
        assert_eq!(json["method"], "liquidity");
        assert_eq!(json["power"], 2.0);

        let parsed: WeightingMethod = serde_json::from_str(r#"{"method":"liquidity"}"#).unwrap();
        assert_eq!(parsed, WeightingMethod::Liquidity { power: 1.0 });

        let parsed: WeightingMethod =
            serde_json::from_str(r#"{"method":"amount_outstanding"}"#).unwrap();
        assert_eq!(parsed, WeightingMethod::AmountOutstanding);
    }

    #[test]
    fn test_from_method() {
        let s = WeightingStrategy::from_method(&WeightingMethod::liquidity()).unwrap();
        assert_eq!(s.method(), WeightingMethod::liquidity());

        let err = WeightingStrategy::from_method(&WeightingMethod::Custom {
            name: "spread".into(),
        })
        .unwrap_err();
        assert!(matches!(err, BasketError::InvalidWeightingInput { .. }));
    }

    // =========================================================================
    // Strategies
    // =========================================================================

    #[test]
    fn test_equal() {
        let data = bonds();
        let refs: Vec<&BondRecord> = data.iter().collect();
        let w = WeightingStrategy::Equal.compute_weights(&refs).unwrap();
        assert_eq!(w.len(), 3);
        assert!(w.weights().iter().all(|&x| x == 1.0 / 3.0));
        assert_eq!(w.isins()[1], "B2");
    }

    #[test]
    fn test_equal_empty_is_not_error() {
        let w = WeightingStrategy::Equal.compute_weights(&[]).unwrap();
        assert!(w.is_empty());
        assert_eq!(w.sum(), 0.0);
    }

    #[test]
    fn test_amount_outstanding() {
        let data = bonds();
        let refs: Vec<&BondRecord> = data.iter().collect();
        let w = WeightingStrategy::AmountOutstanding
            .compute_weights(&refs)
            .unwrap();
        assert_relative_eq!(w.get("B1").unwrap(), 0.1, epsilon = 1e-12);
        assert_relative_eq!(w.get("B3").unwrap(), 0.6, epsilon = 1e-12);
        assert_relative_eq!(w.sum(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_amount_outstanding_zero_sum_fails() {
        let data = vec![bond("Z1", 10.0, dec!(0)), bond("Z2", 10.0, dec!(0))];
        let refs: Vec<&BondRecord> = data.iter().collect();
        let err = WeightingStrategy::AmountOutstanding
            .compute_weights(&refs)
            .unwrap_err();
        assert!(matches!(err, BasketError::InvalidWeightingInput { .. }));
    }

    #[test]
    fn test_amount_outstanding_negative_fails() {
        let data = vec![bond("N1", 10.0, dec!(-5)), bond("N2", 10.0, dec!(50))];
        let refs: Vec<&BondRecord> = data.iter().collect();
        assert!(WeightingStrategy::AmountOutstanding
            .compute_weights(&refs)
            .is_err());
    }

    #[test]
    fn test_liquidity_power() {
        let data = bonds();
        let refs: Vec<&BondRecord> = data.iter().collect();

        let w = WeightingStrategy::Liquidity { power: 1.0 }
            .compute_weights(&refs)
            .unwrap();
        assert_relative_eq!(w.get("B3").unwrap(), 0.6, epsilon = 1e-12);

        let w = WeightingStrategy::Liquidity { power: 2.0 }
            .compute_weights(&refs)
            .unwrap();
        // 100 + 900 + 3600
        assert_relative_eq!(w.get("B1").unwrap(), 100.0 / 4600.0, epsilon = 1e-12);

        let w = WeightingStrategy::Liquidity { power: 0.0 }
            .compute_weights(&refs)
            .unwrap();
        for x in w.weights() {
            assert_relative_eq!(*x, 1.0 / 3.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_liquidity_zero_scores() {
        let data = vec![bond("L1", 0.0, dec!(1)), bond("L2", 0.0, dec!(1))];
        let refs: Vec<&BondRecord> = data.iter().collect();
        assert!(WeightingStrategy::Liquidity { power: 1.0 }
            .compute_weights(&refs)
            .is_err());

        let data = vec![bond("L1", 0.0, dec!(1)), bond("L2", 20.0, dec!(1))];
        let refs: Vec<&BondRecord> = data.iter().collect();
        let w = WeightingStrategy::Liquidity { power: 1.0 }
            .compute_weights(&refs)
            .unwrap();
        assert_eq!(w.get("L1"), Some(0.0));
        assert!(WeightingStrategy::Liquidity { power: 0.5 }
            .compute_weights(&refs)
            .is_err());
        assert!(WeightingStrategy::Liquidity { power: -1.0 }
            .compute_weights(&refs)
            .is_err());
    }

    #[test]
    fn test_liquidity_power_zero_ignores_zero_scores() {
        let data = vec![bond("P1", 0.0, dec!(1)), bond("P2", 40.0, dec!(1))];
        let refs: Vec<&BondRecord> = data.iter().collect();
        let w = WeightingStrategy::Liquidity { power: 0.0 }
            .compute_weights(&refs)
            .unwrap();
        assert_eq!(w.weights(), &[0.5, 0.5]);

        let data = vec![bond("Z1", 0.0, dec!(1)), bond("Z2", 0.0, dec!(1))];
        let refs: Vec<&BondRecord> = data.iter().collect();
        let w = WeightingStrategy::Liquidity { power: 0.0 }
            .compute_weights(&refs)
            .unwrap();
        assert_eq!(w.weights(), &[0.5, 0.5]);
    }

    #[test]
    fn test_liquidity_non_finite_power() {
        let data = bonds();
        let refs: Vec<&BondRecord> = data.iter().collect();
        assert!(WeightingStrategy::Liquidity { power: f64::NAN }
            .compute_weights(&refs)
            .is_err());
    }

    #[test]
    fn test_custom() {
        let data = bonds();
        let refs: Vec<&BondRecord> = data.iter().collect();
        let strategy = WeightingStrategy::custom("duration", |bs: &[&BondRecord]| {
            bs.iter().map(|b| b.duration).collect()
        });
        let w = strategy.compute_weights(&refs).unwrap();
        assert_relative_eq!(w.sum(), 1.0, epsilon = 1e-12);
        assert_eq!(
            strategy.method(),
            WeightingMethod::Custom {
                name: "duration".into()
            }
        );
    }

    #[test]
    fn test_custom_failures() {
        let data = bonds();
        let refs: Vec<&BondRecord> = data.iter().collect();

        let short = WeightingStrategy::custom("short", |_: &[&BondRecord]| vec![1.0]);
        assert!(short.compute_weights(&refs).is_err());

        let zeros = WeightingStrategy::custom("zeros", |bs: &[&BondRecord]| vec![0.0; bs.len()]);
        assert!(zeros.compute_weights(&refs).is_err());

        let negative =
            WeightingStrategy::custom("neg", |bs: &[&BondRecord]| vec![-1.0; bs.len()]);
        assert!(negative.compute_weights(&refs).is_err());

        let nan = WeightingStrategy::custom("nan", |bs: &[&BondRecord]| vec![f64::NAN; bs.len()]);
        assert!(nan.compute_weights(&refs).is_err());
    }

    #[test]
    fn test_non_equal_empty_fails() {
        assert!(WeightingStrategy::AmountOutstanding
            .compute_weights(&[])
            .is_err());
    }

    #[test]
    fn test_weight_vector_accessors() {
        let w = WeightVector::from_pairs(vec![("A".to_string(), 0.7), ("B".to_string(), 0.3)]);
        assert_eq!(w.max_weight(), 0.7);
        assert_eq!(w.get("B"), Some(0.3));
        assert_eq!(w.get("C"), None);
        assert_eq!(w.iter().count(), 2);
        assert_eq!(WeightVector::empty().max_weight(), 0.0);
        assert!(WeightVector::normalized(vec!["A".into()], vec![0.0]).is_none());
    }

    #[test]
    fn test_custom_debug_hides_closure() {
        let custom = CustomWeight::new("flat", |bs: &[&BondRecord]| vec![1.0; bs.len()]);
        assert!(format!("{custom:?}").contains("flat"));
    }
}
