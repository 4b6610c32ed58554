//! Credit rating hierarchy.
//!
//! Ratings are ordinal. Every comparison in basket construction goes through
//! [`CreditRating::rank`], never through the rating string.
//!
//! - [`CreditRating`]: 22 notches from AAA (rank 1) to D (rank 22), plus NR
//! - [`RatingBucket`]: letter-grade groups for reporting

use crate::error::{UniverseError, UniverseResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Number of rated notches in the hierarchy (AAA through D).
pub const RATED_NOTCHES: u8 = 22;

/// Agency-agnostic credit rating.
///
/// The discriminant is the rank: lower is better. `NotRated` sorts last.
///
/// # Examples
///
/// ```
/// use convex_universe::CreditRating;
///
/// let rating: CreditRating = "Baa1".parse().unwrap();
/// assert_eq!(rating, CreditRating::BBBPlus);
/// assert_eq!(rating.rank(), 8);
/// assert!(rating.is_investment_grade());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(try_from = "String", into = "String")]
pub enum CreditRating {
    /// AAA
    AAA = 1,
    /// AA+
    AAPlus = 2,
    /// AA
    AA = 3,
    /// AA-
    AAMinus = 4,
    /// A+
    APlus = 5,
    /// A
    A = 6,
    /// A-
    AMinus = 7,
    /// BBB+
    BBBPlus = 8,
    /// BBB
    BBB = 9,
    /// BBB- (lowest investment grade)
    BBBMinus = 10,
    /// BB+
    BBPlus = 11,
    /// BB
    BB = 12,
    /// BB-
    BBMinus = 13,
    /// B+
    BPlus = 14,
    /// B
    B = 15,
    /// B-
    BMinus = 16,
    /// CCC+
    CCCPlus = 17,
    /// CCC
    CCC = 18,
    /// CCC-
    CCCMinus = 19,
    /// CC
    CC = 20,
    /// C
    C = 21,
    /// Default
    D = 22,
    /// Not rated
    #[default]
    NotRated = 99,
}

/// (rating, S&P notation, Moody's notation), best to worst.
static RATING_SCALE: [(CreditRating, &str, &str); 22] = [
    (CreditRating::AAA, "AAA", "Aaa"),
    (CreditRating::AAPlus, "AA+", "Aa1"),
    (CreditRating::AA, "AA", "Aa2"),
    (CreditRating::AAMinus, "AA-", "Aa3"),
    (CreditRating::APlus, "A+", "A1"),
    (CreditRating::A, "A", "A2"),
    (CreditRating::AMinus, "A-", "A3"),
    (CreditRating::BBBPlus, "BBB+", "Baa1"),
    (CreditRating::BBB, "BBB", "Baa2"),
    (CreditRating::BBBMinus, "BBB-", "Baa3"),
    (CreditRating::BBPlus, "BB+", "Ba1"),
    (CreditRating::BB, "BB", "Ba2"),
    (CreditRating::BBMinus, "BB-", "Ba3"),
    (CreditRating::BPlus, "B+", "B1"),
    (CreditRating::B, "B", "B2"),
    (CreditRating::BMinus, "B-", "B3"),
    (CreditRating::CCCPlus, "CCC+", "Caa1"),
    (CreditRating::CCC, "CCC", "Caa2"),
    (CreditRating::CCCMinus, "CCC-", "Caa3"),
    (CreditRating::CC, "CC", "Ca"),
    (CreditRating::C, "C", "C"),
    (CreditRating::D, "D", "D"),
];

impl CreditRating {
    /// Numeric rank in the hierarchy (1 = AAA, 22 = D, 99 = NR).
    #[must_use]
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// Looks up a rating by rank. Ranks outside 1..=22 and 99 yield `None`.
    #[must_use]
    pub fn from_rank(rank: u8) -> Option<Self> {
        if rank == Self::NotRated.rank() {
            return Some(Self::NotRated);
        }
        RATING_SCALE
            .iter()
            .find(|(r, _, _)| r.rank() == rank)
            .map(|(r, _, _)| *r)
    }

    /// All rated notches, best to worst (excludes NR).
    pub fn rated() -> impl Iterator<Item = CreditRating> {
        RATING_SCALE.iter().map(|(r, _, _)| *r)
    }

    /// Returns true for ratings other than NR.
    #[must_use]
    pub fn is_rated(&self) -> bool {
        *self != Self::NotRated
    }

    /// BBB- or better.
    #[must_use]
    pub fn is_investment_grade(&self) -> bool {
        self.is_rated() && *self <= Self::BBBMinus
    }

    /// BB+ down to C (D and NR excluded).
    #[must_use]
    pub fn is_high_yield(&self) -> bool {
        *self >= Self::BBPlus && *self <= Self::C
    }

    /// Absolute notch distance between two ratings.
    ///
    /// Returns `None` when exactly one side is unrated; two unrated bonds are
    /// zero notches apart.
    #[must_use]
    pub fn notches_from(&self, other: CreditRating) -> Option<u8> {
        match (self.is_rated(), other.is_rated()) {
            (true, true) => Some(self.rank().abs_diff(other.rank())),
            (false, false) => Some(0),
            _ => None,
        }
    }

    /// Letter-grade bucket.
    #[must_use]
    pub fn bucket(&self) -> RatingBucket {
        match self.rank() {
            1 => RatingBucket::AAA,
            2..=4 => RatingBucket::AA,
            5..=7 => RatingBucket::A,
            8..=10 => RatingBucket::BBB,
            11..=13 => RatingBucket::BB,
            14..=16 => RatingBucket::B,
            17..=21 => RatingBucket::CCC,
            22 => RatingBucket::Default,
            _ => RatingBucket::NotRated,
        }
    }

    /// S&P-style notation.
    #[must_use]
    pub fn sp_notation(&self) -> &'static str {
        RATING_SCALE
            .iter()
            .find(|(r, _, _)| r == self)
            .map_or("NR", |(_, sp, _)| *sp)
    }

    /// Moody's-style notation.
    #[must_use]
    pub fn moodys_notation(&self) -> &'static str {
        RATING_SCALE
            .iter()
            .find(|(r, _, _)| r == self)
            .map_or("NR", |(_, _, moodys)| *moodys)
    }

    /// Parses S&P or Moody's notation; S&P matching ignores case and spaces.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if let Some((r, _, _)) = RATING_SCALE.iter().find(|(_, _, m)| *m == trimmed) {
            return Some(*r);
        }

        let upper: String = trimmed
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();
        match upper.as_str() {
            "NR" | "NOTRATED" | "WR" => Some(Self::NotRated),
            _ => RATING_SCALE
                .iter()
                .find(|(_, sp, _)| *sp == upper)
                .map(|(r, _, _)| *r),
        }
    }
}

impl FromStr for CreditRating {
    type Err = UniverseError;

    fn from_str(s: &str) -> UniverseResult<Self> {
        Self::parse(s).ok_or_else(|| UniverseError::invalid_value("rating", s))
    }
}

impl std::fmt::Display for CreditRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sp_notation())
    }
}

impl TryFrom<String> for CreditRating {
    type Error = UniverseError;

    fn try_from(s: String) -> UniverseResult<Self> {
        s.parse()
    }
}

impl From<CreditRating> for String {
    fn from(rating: CreditRating) -> Self {
        rating.sp_notation().to_string()
    }
}

/// Letter-grade rating groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RatingBucket {
    /// AAA
    AAA,
    /// AA+, AA, AA-
    AA,
    /// A+, A, A-
    A,
    /// BBB+, BBB, BBB-
    BBB,
    /// BB+, BB, BB-
    BB,
    /// B+, B, B-
    B,
    /// CCC+ through C
    CCC,
    /// D
    Default,
    /// Not rated
    NotRated,
}

impl RatingBucket {
    /// Display label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::AAA => "AAA",
            Self::AA => "AA",
            Self::A => "A",
            Self::BBB => "BBB",
            Self::BB => "BB",
            Self::B => "B",
            Self::CCC => "CCC & Below",
            Self::Default => "Default",
            Self::NotRated => "Not Rated",
        }
    }

    /// True for AAA through BBB.
    #[must_use]
    pub fn is_investment_grade(&self) -> bool {
        *self <= Self::BBB
    }
}

impl std::fmt::Display for RatingBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
