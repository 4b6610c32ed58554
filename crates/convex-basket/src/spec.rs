//! Basket specifications.
//!
//! A [`BasketSpec`] is the immutable input of one build: which builder to use,
//! how to filter, how to weight, and which limits to check. Specifications
//! are interchangeable as JSON or TOML documents; unknown basket types are
//! rejected while parsing with [`BasketError::UnsupportedBasketType`].

use crate::config::ConstraintConfig;
use crate::error::{BasketError, BasketResult};
use crate::similarity::SimilarityConfig;
use crate::weighting::WeightingMethod;
use convex_universe::{CreditRating, DurationBucket, Sector};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Supported basket builders.
///
/// Written as its `snake_case` code; any spelling [`FromStr`] accepts is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BasketType {
    /// All bonds of one sector.
    Sector,
    /// One sector within a rating band.
    SectorRating,
    /// One sector within a rating band and duration bucket.
    SectorRatingDuration,
    /// Bonds closest to a reference bond.
    Similarity,
}

impl BasketType {
    /// All basket types.
    pub const ALL: [BasketType; 4] = [
        Self::Sector,
        Self::SectorRating,
        Self::SectorRatingDuration,
        Self::Similarity,
    ];

    /// Interchange code (`snake_case`).
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Sector => "sector",
            Self::SectorRating => "sector_rating",
            Self::SectorRatingDuration => "sector_rating_duration",
            Self::Similarity => "similarity",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sector => "Sector",
            Self::SectorRating => "Sector/Rating",
            Self::SectorRatingDuration => "Sector/Rating/Duration",
            Self::Similarity => "Similarity",
        }
    }
}

impl FromStr for BasketType {
    type Err = BasketError;

    fn from_str(s: &str) -> BasketResult<Self> {
        let code = s.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|t| t.code() == code)
            .ok_or_else(|| BasketError::unsupported_basket_type(s))
    }
}

impl std::fmt::Display for BasketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl TryFrom<String> for BasketType {
    type Error = BasketError;

    fn try_from(s: String) -> BasketResult<Self> {
        s.parse()
    }
}

impl From<BasketType> for String {
    fn from(basket_type: BasketType) -> Self {
        basket_type.code().to_string()
    }
}

/// Rating selection, compared by numeric rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RatingFilter {
    /// One notch only.
    Exact {
        /// The accepted rating.
        rating: CreditRating,
    },
    /// Inclusive band between two notches.
    Range {
        /// Best (lowest rank) accepted rating.
        best: CreditRating,
        /// Worst (highest rank) accepted rating.
        worst: CreditRating,
    },
    /// AAA through BBB-.
    InvestmentGrade,
    /// BB+ through D.
    HighYield,
}

impl RatingFilter {
    /// Accepts one notch.
    #[must_use]
    pub fn exact(rating: CreditRating) -> Self {
        Self::Exact { rating }
    }

    /// Accepts an inclusive band; the order of the bounds does not matter.
    #[must_use]
    pub fn range(best: CreditRating, worst: CreditRating) -> Self {
        Self::Range { best, worst }
    }

    /// True if the rating passes the filter.
    #[must_use]
    pub fn matches(&self, rating: CreditRating) -> bool {
        match self {
            Self::Exact { rating: r } => rating.rank() == r.rank(),
            Self::Range { best, worst } => {
                let lo = best.rank().min(worst.rank());
                let hi = best.rank().max(worst.rank());
                (lo..=hi).contains(&rating.rank())
            }
            Self::InvestmentGrade => rating.is_investment_grade(),
            Self::HighYield => rating.is_high_yield(),
        }
    }
}

impl std::fmt::Display for RatingFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact { rating } => write!(f, "{rating}"),
            Self::Range { best, worst } => write!(f, "{best}..{worst}"),
            Self::InvestmentGrade => write!(f, "IG"),
            Self::HighYield => write!(f, "HY"),
        }
    }
}

/// Duration selection; bounds are lower-inclusive, upper-exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DurationFilter {
    /// Membership in a fixed bucket.
    Bucket {
        /// The accepted bucket.
        bucket: DurationBucket,
    },
    /// Explicit `[min, max)` range in years.
    Range {
        /// Lower bound (inclusive).
        min: f64,
        /// Upper bound (exclusive).
        max: f64,
    },
}

impl DurationFilter {
    /// Accepts one bucket.
    #[must_use]
    pub fn bucket(bucket: DurationBucket) -> Self {
        Self::Bucket { bucket }
    }

    /// True if the duration passes the filter.
    #[must_use]
    pub fn matches(&self, duration: f64) -> bool {
        match self {
            Self::Bucket { bucket } => bucket.contains(duration),
            Self::Range { min, max } => duration >= *min && duration < *max,
        }
    }
}

/// Selection filters; which ones are required depends on the basket type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasketFilters {
    /// Sector to select (normalized on parse).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<Sector>,

    /// Rating band.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<RatingFilter>,

    /// Duration bucket or range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<DurationFilter>,

    /// Minimum liquidity score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_liquidity: Option<f64>,

    /// Maximum constituents; defaults to the constraint `max_basket_size`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_limit: Option<usize>,

    /// Reference bond for similarity baskets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_isin: Option<String>,

    /// Similarity tolerances and weights.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<SimilarityConfig>,
}

/// The complete input of one basket build.
///
/// # Example
///
/// ```
/// use convex_basket::prelude::*;
///
/// let spec = BasketSpec::sector("Industrials")
///     .with_size_limit(3)
///     .with_weighting(WeightingMethod::liquidity());
///
/// let json = spec.to_json().unwrap();
/// assert_eq!(BasketSpec::from_json(&json).unwrap(), spec);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketSpec {
    /// Optional label carried into the output metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Which builder to use.
    pub basket_type: BasketType,

    /// Selection filters.
    #[serde(default)]
    pub filters: BasketFilters,

    /// Weighting method and parameters.
    #[serde(default)]
    pub weighting_method: WeightingMethod,

    /// Portfolio limits.
    #[serde(default)]
    pub constraints: ConstraintConfig,
}

impl BasketSpec {
    /// Creates a specification with empty filters and default settings.
    #[must_use]
    pub fn new(basket_type: BasketType) -> Self {
        Self {
            name: None,
            basket_type,
            filters: BasketFilters::default(),
            weighting_method: WeightingMethod::default(),
            constraints: ConstraintConfig::default(),
        }
    }

    /// Sector basket.
    #[must_use]
    pub fn sector(sector: impl Into<Sector>) -> Self {
        Self::new(BasketType::Sector).with_sector(sector)
    }

    /// Sector basket within a rating band.
    #[must_use]
    pub fn sector_rating(sector: impl Into<Sector>, rating: RatingFilter) -> Self {
        Self::new(BasketType::SectorRating)
            .with_sector(sector)
            .with_rating(rating)
    }

    /// Sector basket within a rating band and duration range.
    #[must_use]
    pub fn sector_rating_duration(
        sector: impl Into<Sector>,
        rating: RatingFilter,
        duration: DurationFilter,
    ) -> Self {
        Self::new(BasketType::SectorRatingDuration)
            .with_sector(sector)
            .with_rating(rating)
            .with_duration(duration)
    }

    /// Similarity basket around a reference bond.
    #[must_use]
    pub fn similarity(reference_isin: impl Into<String>, config: SimilarityConfig) -> Self {
        let mut spec = Self::new(BasketType::Similarity);
        spec.filters.reference_isin = Some(reference_isin.into());
        spec.filters.similarity = Some(config);
        spec
    }

    /// Sets the label.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the sector filter.
    #[must_use]
    pub fn with_sector(mut self, sector: impl Into<Sector>) -> Self {
        self.filters.sector = Some(sector.into());
        self
    }

    /// Sets the rating filter.
    #[must_use]
    pub fn with_rating(mut self, rating: RatingFilter) -> Self {
        self.filters.rating = Some(rating);
        self
    }

    /// Sets the duration filter.
    #[must_use]
    pub fn with_duration(mut self, duration: DurationFilter) -> Self {
        self.filters.duration = Some(duration);
        self
    }

    /// Sets the liquidity floor.
    #[must_use]
    pub fn with_min_liquidity(mut self, floor: f64) -> Self {
        self.filters.min_liquidity = Some(floor);
        self
    }

    /// Sets the size limit.
    #[must_use]
    pub fn with_size_limit(mut self, limit: usize) -> Self {
        self.filters.size_limit = Some(limit);
        self
    }

    /// Sets the weighting method.
    #[must_use]
    pub fn with_weighting(mut self, method: WeightingMethod) -> Self {
        self.weighting_method = method;
        self
    }

    /// Sets the constraint configuration.
    #[must_use]
    pub fn with_constraints(mut self, constraints: ConstraintConfig) -> Self {
        self.constraints = constraints;
        self
    }

    /// Effective size limit: the filter if set, else `max_basket_size`.
    #[must_use]
    pub fn size_limit(&self) -> usize {
        self.filters
            .size_limit
            .unwrap_or(self.constraints.max_basket_size)
    }

    /// Checks that the specification is usable before any work is done.
    ///
    /// # Errors
    ///
    /// Returns [`BasketError::InvalidSpecification`] for a zero size limit,
    /// a bad liquidity floor, a negative or non-finite liquidity power, bad
    /// constraint limits, an inverted duration range, or an invalid
    /// similarity configuration. Required filters are checked when the
    /// builder is selected.
    pub fn validate(&self) -> BasketResult<()> {
        if self.filters.size_limit == Some(0) {
            return Err(BasketError::invalid_spec("size_limit must be positive"));
        }
        if let Some(floor) = self.filters.min_liquidity {
            if !floor.is_finite() {
                return Err(BasketError::invalid_spec(format!(
                    "min_liquidity must be finite, got {floor}"
                )));
            }
        }
        if let Some(DurationFilter::Range { min, max }) = self.filters.duration {
            if !(min.is_finite() && min >= 0.0 && max > min) {
                return Err(BasketError::invalid_spec(format!(
                    "duration range [{min}, {max}) is empty or invalid"
                )));
            }
        }
        if let WeightingMethod::Liquidity { power } = self.weighting_method {
            if !power.is_finite() || power < 0.0 {
                return Err(BasketError::invalid_spec(format!(
                    "liquidity power must be finite and >= 0, got {power}"
                )));
            }
        }
        if let Some(similarity) = &self.filters.similarity {
            similarity.validate()?;
        }
        self.constraints.check()
    }

    /// Parses a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`BasketError::UnsupportedBasketType`] for an unknown
    /// `basket_type` and [`BasketError::Serialization`] for malformed input.
    pub fn from_json(json: &str) -> BasketResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if let Some(code) = value.get("basket_type").and_then(serde_json::Value::as_str) {
            code.parse::<BasketType>()?;
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Writes a pretty-printed JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`BasketError::Serialization`] if a value cannot be encoded.
    pub fn to_json(&self) -> BasketResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`BasketError::UnsupportedBasketType`] for an unknown
    /// `basket_type` and [`BasketError::Serialization`] for malformed input.
    pub fn from_toml(document: &str) -> BasketResult<Self> {
        let table: toml::Table = document.parse()?;
        if let Some(code) = table.get("basket_type").and_then(toml::Value::as_str) {
            code.parse::<BasketType>()?;
        }
        Ok(toml::from_str(document)?)
    }

    /// Writes a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`BasketError::Serialization`] if a value cannot be encoded.
    pub fn to_toml(&self) -> BasketResult<String> {
        Ok(toml::to_string(self)?)
    }
}
