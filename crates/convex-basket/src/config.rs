//! Configuration for basket construction.

use crate::error::{BasketError, BasketResult};
use serde::{Deserialize, Serialize};

/// How the constructor reacts to blocking constraint violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Blocking violations abort the build.
    Strict,

    /// Every violation is attached to the output as a warning.
    #[default]
    Advisory,
}

impl ValidationMode {
    /// Returns a human-readable name for the mode.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Strict => "Strict",
            Self::Advisory => "Advisory",
        }
    }
}

impl std::fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Portfolio-level limits a basket is checked against.
///
/// Every field has a default, so specification documents only need to name
/// the limits they override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintConfig {
    /// Maximum number of constituents.
    pub max_basket_size: usize,

    /// Maximum weight of any single position.
    pub max_position_weight: f64,

    /// Maximum aggregate weight of one sector.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_sector_weight: Option<f64>,

    /// Maximum aggregate weight of one rating notch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rating_weight: Option<f64>,

    /// Minimum effective number of positions (1 / Herfindahl).
    ///
    /// Documents write `false` when the check is disabled.
    #[serde(with = "optional_floor")]
    pub min_effective_positions: Option<f64>,

    /// Strict or advisory handling of blocking violations.
    pub mode: ValidationMode,
}

impl Default for ConstraintConfig {
    fn default() -> Self {
        Self {
            max_basket_size: 100,
            max_position_weight: 0.25,
            max_sector_weight: None,
            max_rating_weight: None,
            min_effective_positions: Some(3.0),
            mode: ValidationMode::Advisory,
        }
    }
}

impl ConstraintConfig {
    /// Creates a config with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config that aborts on blocking violations.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            mode: ValidationMode::Strict,
            ..Self::default()
        }
    }

    /// Sets the maximum basket size.
    #[must_use]
    pub fn with_max_basket_size(mut self, size: usize) -> Self {
        self.max_basket_size = size;
        self
    }

    /// Sets the maximum single-position weight.
    #[must_use]
    pub fn with_max_position_weight(mut self, weight: f64) -> Self {
        self.max_position_weight = weight;
        self
    }

    /// Sets the maximum sector concentration.
    #[must_use]
    pub fn with_max_sector_weight(mut self, weight: f64) -> Self {
        self.max_sector_weight = Some(weight);
        self
    }

    /// Sets the maximum rating concentration.
    #[must_use]
    pub fn with_max_rating_weight(mut self, weight: f64) -> Self {
        self.max_rating_weight = Some(weight);
        self
    }

    /// Sets the diversification floor; `None` disables the check.
    #[must_use]
    pub fn with_min_effective_positions(mut self, floor: Option<f64>) -> Self {
        self.min_effective_positions = floor;
        self
    }

    /// Sets the validation mode.
    #[must_use]
    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    /// True in strict mode.
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.mode == ValidationMode::Strict
    }

    /// Checks that every limit is usable.
    pub(crate) fn check(&self) -> BasketResult<()> {
        if self.max_basket_size == 0 {
            return Err(BasketError::invalid_spec("max_basket_size must be positive"));
        }
        check_fraction("max_position_weight", Some(self.max_position_weight))?;
        check_fraction("max_sector_weight", self.max_sector_weight)?;
        check_fraction("max_rating_weight", self.max_rating_weight)?;
        if let Some(floor) = self.min_effective_positions {
            if !floor.is_finite() || floor < 0.0 {
                return Err(BasketError::invalid_spec(format!(
                    "min_effective_positions must be finite and >= 0, got {floor}"
                )));
            }
        }
        Ok(())
    }
}

fn check_fraction(name: &str, value: Option<f64>) -> BasketResult<()> {
    match value {
        Some(v) if !(v > 0.0 && v <= 1.0) => Err(BasketError::invalid_spec(format!(
            "{name} must be in (0, 1], got {v}"
        ))),
        _ => Ok(()),
    }
}

/// Diversification floor as a number, or `false` when disabled.
///
/// TOML has no null, so a disabled floor needs a value of its own.
mod optional_floor {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Floor {
        Value(f64),
        Enabled(bool),
    }

    pub fn serialize<S: Serializer>(floor: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match floor {
            Some(value) => serializer.serialize_f64(*value),
            None => serializer.serialize_bool(false),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        match Option::<Floor>::deserialize(deserializer)? {
            Some(Floor::Value(value)) => Ok(Some(value)),
            Some(Floor::Enabled(false)) | None => Ok(None),
            Some(Floor::Enabled(true)) => Err(de::Error::custom(
                "min_effective_positions must be a number or false",
            )),
        }
    }
}

/// Execution settings for the constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstructionConfig {
    /// Enable parallel batch builds (requires 'parallel' feature).
    pub parallel: bool,

    /// Minimum number of specifications in a batch to go parallel.
    pub parallel_threshold: usize,
}

impl Default for ConstructionConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_threshold: 8,
        }
    }
}

impl ConstructionConfig {
    /// Creates a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config that always builds sequentially.
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    /// Sets whether to use parallel processing.
    #[must_use]
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Sets the threshold for parallel processing.
    #[must_use]
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Returns true if parallel processing should be used for the given count.
    #[must_use]
    pub fn should_parallelize(&self, count: usize) -> bool {
        cfg!(feature = "parallel") && self.parallel && count >= self.parallel_threshold
    }
}
