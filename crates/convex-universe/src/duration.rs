//! Duration bucket classification.

use crate::error::{UniverseError, UniverseResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Fixed duration buckets in years.
///
/// Every bucket is lower-inclusive and upper-exclusive: a duration of exactly
/// 3.0 belongs to [`DurationBucket::ThreeToFive`], not `OneToThree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DurationBucket {
    /// [0, 1)
    ZeroToOne,
    /// [1, 3)
    OneToThree,
    /// [3, 5)
    ThreeToFive,
    /// [5, 7)
    FiveToSeven,
    /// [7, 10)
    SevenToTen,
    /// [10, 15)
    TenToFifteen,
    /// 15 and above
    FifteenPlus,
}

impl DurationBucket {
    /// All buckets, shortest first.
    pub const ALL: [DurationBucket; 7] = [
        Self::ZeroToOne,
        Self::OneToThree,
        Self::ThreeToFive,
        Self::FiveToSeven,
        Self::SevenToTen,
        Self::TenToFifteen,
        Self::FifteenPlus,
    ];

    /// Bucket containing `years`. Negative or non-finite durations have no bucket.
    #[must_use]
    pub fn from_duration(years: f64) -> Option<Self> {
        if !years.is_finite() || years < 0.0 {
            return None;
        }
        Self::ALL.into_iter().find(|b| b.contains(years))
    }

    /// Inclusive lower bound in years.
    #[must_use]
    pub fn lower(&self) -> f64 {
        match self {
            Self::ZeroToOne => 0.0,
            Self::OneToThree => 1.0,
            Self::ThreeToFive => 3.0,
            Self::FiveToSeven => 5.0,
            Self::SevenToTen => 7.0,
            Self::TenToFifteen => 10.0,
            Self::FifteenPlus => 15.0,
        }
    }

    /// Exclusive upper bound in years (`None` for the open-ended bucket).
    #[must_use]
    pub fn upper(&self) -> Option<f64> {
        match self {
            Self::ZeroToOne => Some(1.0),
            Self::OneToThree => Some(3.0),
            Self::ThreeToFive => Some(5.0),
            Self::FiveToSeven => Some(7.0),
            Self::SevenToTen => Some(10.0),
            Self::TenToFifteen => Some(15.0),
            Self::FifteenPlus => None,
        }
    }

    /// Membership test using the half-open interval.
    #[must_use]
    pub fn contains(&self, years: f64) -> bool {
        years >= self.lower() && self.upper().map_or(years.is_finite(), |u| years < u)
    }

    /// Short label, also accepted by [`FromStr`].
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::ZeroToOne => "0-1Y",
            Self::OneToThree => "1-3Y",
            Self::ThreeToFive => "3-5Y",
            Self::FiveToSeven => "5-7Y",
            Self::SevenToTen => "7-10Y",
            Self::TenToFifteen => "10-15Y",
            Self::FifteenPlus => "15Y+",
        }
    }
}

impl FromStr for DurationBucket {
    type Err = UniverseError;

    fn from_str(s: &str) -> UniverseResult<Self> {
        let wanted = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|b| b.label() == wanted || b.label().trim_end_matches('Y') == wanted)
            .ok_or_else(|| UniverseError::invalid_value("duration bucket", s))
    }
}

impl std::fmt::Display for DurationBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl TryFrom<String> for DurationBucket {
    type Error = UniverseError;

    fn try_from(s: String) -> UniverseResult<Self> {
        s.parse()
    }
}

impl From<DurationBucket> for String {
    fn from(bucket: DurationBucket) -> Self {
        bucket.label().to_string()
    }
}
