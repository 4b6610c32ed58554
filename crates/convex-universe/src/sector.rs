//! Sector classification.
//!
//! Sectors arrive from many providers with inconsistent spelling
//! ("INDUSTRIALS", "industrial", "Ind"). [`Sector`] stores the normalized
//! name so two records compare equal whenever they name the same sector.

use serde::{Deserialize, Serialize};

/// Known abbreviations and plurals mapped to their standard sector name.
///
/// Keys are compared after separator collapsing and upper-casing.
pub const SECTOR_ALIASES: &[(&str, &str)] = &[
    ("IND", "Industrial"),
    ("INDU", "Industrial"),
    ("INDUSTRIALS", "Industrial"),
    ("FIN", "Financial"),
    ("FINANCIALS", "Financial"),
    ("BANKS", "Financial"),
    ("BANKING", "Financial"),
    ("UTIL", "Utility"),
    ("UTILITIES", "Utility"),
    ("GOVT", "Government"),
    ("GOV", "Government"),
    ("SOVEREIGN", "Government"),
    ("TREASURY", "Government"),
    ("AGCY", "Agency"),
    ("MUNI", "Municipal"),
    ("SUPRA", "Supranational"),
    ("TECH", "Technology"),
    ("IT", "Technology"),
    ("INFORMATION TECHNOLOGY", "Technology"),
    ("ENERGY", "Energy"),
    ("OIL & GAS", "Energy"),
    ("HEALTHCARE", "Health Care"),
    ("TELECOM", "Communications"),
    ("TELECOMMUNICATIONS", "Communications"),
    ("COMMUNICATION SERVICES", "Communications"),
    ("CONSUMER DISCRETIONARY", "Consumer Cyclical"),
    ("CONSUMER STAPLES", "Consumer Non-Cyclical"),
    ("MATERIALS", "Basic Materials"),
    ("REIT", "Real Estate"),
    ("REITS", "Real Estate"),
    ("ABS", "Asset-Backed"),
    ("MBS", "Mortgage-Backed"),
];

/// Normalized issuer sector.
///
/// Construction always normalizes, so equality and hashing operate on the
/// canonical form.
///
/// # Examples
///
/// ```
/// use convex_universe::Sector;
///
/// assert_eq!(Sector::new("  INDUSTRIALS "), Sector::new("industrial"));
/// assert_eq!(Sector::new("consumer_staples").name(), "Consumer Non-Cyclical");
/// assert_eq!(Sector::new("high-yield  energy").name(), "High Yield Energy");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Sector(String);

impl Sector {
    /// Creates a sector from any provider spelling.
    #[must_use]
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(normalize_sector(raw.as_ref()))
    }

    /// The canonical sector name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }

    /// True if the raw spelling normalizes to this sector.
    #[must_use]
    pub fn matches(&self, raw: &str) -> bool {
        self.0 == normalize_sector(raw)
    }

    /// True if nothing was left after normalization.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Sector {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for Sector {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<Sector> for String {
    fn from(sector: Sector) -> Self {
        sector.0
    }
}

impl std::fmt::Display for Sector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalizes a raw sector string.
///
/// Separators (`_`, `-`, runs of whitespace) collapse to single spaces, aliases
/// resolve through [`SECTOR_ALIASES`], and anything else is title-cased.
#[must_use]
pub fn normalize_sector(raw: &str) -> String {
    let collapsed = raw
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let key = collapsed.to_uppercase();
    if let Some((_, canonical)) = SECTOR_ALIASES.iter().find(|(alias, _)| *alias == key) {
        return (*canonical).to_string();
    }

    // Canonical names with hyphens ("Asset-Backed") lose them in collapsing,
    // so compare against canonical names with the same treatment.
    if let Some((_, canonical)) = SECTOR_ALIASES
        .iter()
        .find(|(_, canonical)| canonical.replace('-', " ").to_uppercase() == key)
    {
        return (*canonical).to_string();
    }

    collapsed
        .split(' ')
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
