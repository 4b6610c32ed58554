//! Rule-based builders: sector, sector/rating, sector/rating/duration.

use super::{Candidate, CandidateSet, SelectCandidates, NO_CANDIDATES_WARNING};
use crate::error::BasketResult;
use crate::spec::{DurationFilter, RatingFilter};
use convex_universe::{BondRecord, Sector, Universe};
use std::cmp::Ordering;
use tracing::{debug, warn};

/// Filters shared by the rule-based builders.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionRules {
    /// Required sector.
    pub sector: Sector,
    /// Optional rating band.
    pub rating: Option<RatingFilter>,
    /// Optional duration bucket or range.
    pub duration: Option<DurationFilter>,
    /// Optional liquidity floor (inclusive).
    pub min_liquidity: Option<f64>,
}

impl SelectionRules {
    /// Rules matching one sector.
    #[must_use]
    pub fn sector(sector: Sector) -> Self {
        Self {
            sector,
            rating: None,
            duration: None,
            min_liquidity: None,
        }
    }

    /// True if the bond passes every rule.
    #[must_use]
    pub fn accepts(&self, bond: &BondRecord) -> bool {
        bond.sector == self.sector
            && self.rating.map_or(true, |r| r.matches(bond.rating))
            && self.duration.map_or(true, |d| d.matches(bond.duration))
            && self.min_liquidity.map_or(true, |m| bond.liquidity_score >= m)
    }

    /// Filters, orders and truncates the universe.
    pub fn select<'u>(
        &self,
        universe: &'u Universe,
        size_limit: usize,
        warnings: &mut Vec<String>,
    ) -> CandidateSet<'u> {
        let mut matched: Vec<&BondRecord> = universe.iter().filter(|b| self.accepts(b)).collect();
        let total = matched.len();

        matched.sort_by(|a, b| liquidity_order(a, b));
        matched.truncate(size_limit);

        debug!(
            sector = %self.sector,
            universe = universe.len(),
            matched = total,
            selected = matched.len(),
            "candidates selected"
        );
        if matched.is_empty() {
            warn!(sector = %self.sector, "{NO_CANDIDATES_WARNING}");
            warnings.push(NO_CANDIDATES_WARNING.to_string());
        }

        CandidateSet::new(matched.into_iter().map(Candidate::new).collect(), total)
    }
}

/// Descending liquidity, then descending amount outstanding, then identifier.
fn liquidity_order(a: &BondRecord, b: &BondRecord) -> Ordering {
    b.liquidity_score
        .total_cmp(&a.liquidity_score)
        .then_with(|| b.amount_outstanding.cmp(&a.amount_outstanding))
        .then_with(|| a.isin.cmp(&b.isin))
}

/// Selects the most liquid bonds of one sector.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorBasketBuilder {
    rules: SelectionRules,
    size_limit: usize,
}

impl SectorBasketBuilder {
    /// Creates a sector builder.
    #[must_use]
    pub fn new(sector: impl Into<Sector>, size_limit: usize) -> Self {
        Self {
            rules: SelectionRules::sector(sector.into()),
            size_limit,
        }
    }

    /// Sets the liquidity floor.
    #[must_use]
    pub fn with_min_liquidity(mut self, floor: Option<f64>) -> Self {
        self.rules.min_liquidity = floor;
        self
    }

    /// The active rules.
    #[must_use]
    pub fn rules(&self) -> &SelectionRules {
        &self.rules
    }
}

impl SelectCandidates for SectorBasketBuilder {
    fn select_candidates<'u>(
        &self,
        universe: &'u Universe,
        warnings: &mut Vec<String>,
    ) -> BasketResult<CandidateSet<'u>> {
        Ok(self.rules.select(universe, self.size_limit, warnings))
    }
}

/// Selects one sector within a rating band.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorRatingBasketBuilder {
    rules: SelectionRules,
    size_limit: usize,
}

impl SectorRatingBasketBuilder {
    /// Creates a sector/rating builder.
    #[must_use]
    pub fn new(sector: impl Into<Sector>, rating: RatingFilter, size_limit: usize) -> Self {
        Self {
            rules: SelectionRules {
                rating: Some(rating),
                ..SelectionRules::sector(sector.into())
            },
            size_limit,
        }
    }

    /// Sets the liquidity floor.
    #[must_use]
    pub fn with_min_liquidity(mut self, floor: Option<f64>) -> Self {
        self.rules.min_liquidity = floor;
        self
    }

    /// The active rules.
    #[must_use]
    pub fn rules(&self) -> &SelectionRules {
        &self.rules
    }
}

impl SelectCandidates for SectorRatingBasketBuilder {
    fn select_candidates<'u>(
        &self,
        universe: &'u Universe,
        warnings: &mut Vec<String>,
    ) -> BasketResult<CandidateSet<'u>> {
        Ok(self.rules.select(universe, self.size_limit, warnings))
    }
}

/// Selects one sector within a rating band and duration range.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorRatingDurationBasketBuilder {
    rules: SelectionRules,
    size_limit: usize,
}

impl SectorRatingDurationBasketBuilder {
    /// Creates a sector/rating/duration builder.
    #[must_use]
    pub fn new(
        sector: impl Into<Sector>,
        rating: RatingFilter,
        duration: DurationFilter,
        size_limit: usize,
    ) -> Self {
        Self {
            rules: SelectionRules {
                rating: Some(rating),
                duration: Some(duration),
                ..SelectionRules::sector(sector.into())
            },
            size_limit,
        }
    }

    /// Sets the liquidity floor.
    #[must_use]
    pub fn with_min_liquidity(mut self, floor: Option<f64>) -> Self {
        self.rules.min_liquidity = floor;
        self
    }

    /// The active rules.
    #[must_use]
    pub fn rules(&self) -> &SelectionRules {
        &self.rules
    }
}

impl SelectCandidates for SectorRatingDurationBasketBuilder {
    fn select_candidates<'u>(
        &self,
        universe: &'u Universe,
        warnings: &mut Vec<String>,
    ) -> BasketResult<CandidateSet<'u>> {
        Ok(self.rules.select(universe, self.size_limit, warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convex_universe::{CreditRating, DurationBucket};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn bond(
        isin: &str,
        sector: &str,
        rating: CreditRating,
        duration: f64,
        liq: f64,
        amount: Decimal,
    ) -> BondRecord {
        BondRecord::builder()
            .isin(isin)
            .sector(sector)
            .rating(rating)
            .duration(duration)
            .liquidity_score(liq)
            .amount_outstanding(amount)
            .build()
            .unwrap()
    }

    fn universe() -> Universe {
        Universe::new(vec![
            bond("IND1", "Industrial", CreditRating::A, 2.0, 10.0, dec!(100)),
            bond("IND2", "industrials", CreditRating::BBB, 4.0, 50.0, dec!(100)),
            bond("IND3", "IND", CreditRating::BBPlus, 3.0, 30.0, dec!(200)),
            bond("IND4", "Industrial", CreditRating::AA, 5.0, 30.0, dec!(100)),
            bond("IND5", "Industrial", CreditRating::NotRated, 4.5, 30.0, dec!(100)),
            bond("FIN1", "Financial", CreditRating::A, 4.0, 90.0, dec!(500)),
        ])
        .unwrap()
    }

    fn isins(set: &CandidateSet<'_>) -> Vec<String> {
        set.bonds().iter().map(|b| b.isin.clone()).collect()
    }

    #[test]
    fn test_sector_order_and_ties() {
        let u = universe();
        let mut warnings = Vec::new();
        let set = SectorBasketBuilder::new("Industrial", 10)
            .select_candidates(&u, &mut warnings)
            .unwrap();

        // 30.0 three-way tie: IND3 has the larger amount, then IND4 < IND5 by id
        assert_eq!(isins(&set), vec!["IND2", "IND3", "IND4", "IND5", "IND1"]);
        assert_eq!(set.matched(), 5);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_sector_truncation() {
        let u = universe();
        let mut warnings = Vec::new();
        let set = SectorBasketBuilder::new("industrial", 2)
            .select_candidates(&u, &mut warnings)
            .unwrap();
        assert_eq!(isins(&set), vec!["IND2", "IND3"]);
        assert_eq!(set.matched(), 5);
    }

    #[test]
    fn test_min_liquidity() {
        let u = universe();
        let mut warnings = Vec::new();
        let set = SectorBasketBuilder::new("Industrial", 10)
            .with_min_liquidity(Some(30.0))
            .select_candidates(&u, &mut warnings)
            .unwrap();
        assert_eq!(set.len(), 4);
        assert!(set.bonds().iter().all(|b| b.liquidity_score >= 30.0));
    }

    #[test]
    fn test_no_match_warns() {
        let u = universe();
        let mut warnings = Vec::new();
        let set = SectorBasketBuilder::new("Utility", 10)
            .select_candidates(&u, &mut warnings)
            .unwrap();
        assert!(set.is_empty());
        assert_eq!(warnings, vec![NO_CANDIDATES_WARNING.to_string()]);
    }

    #[test]
    fn test_sector_rating() {
        let u = universe();
        let mut warnings = Vec::new();
        let set = SectorRatingBasketBuilder::new("Industrial", RatingFilter::InvestmentGrade, 10)
            .select_candidates(&u, &mut warnings)
            .unwrap();
        assert_eq!(isins(&set), vec!["IND2", "IND4", "IND1"]);

        let set = SectorRatingBasketBuilder::new(
            "Industrial",
            RatingFilter::range(CreditRating::AA, CreditRating::A),
            10,
        )
        .select_candidates(&u, &mut warnings)
        .unwrap();
        assert_eq!(isins(&set), vec!["IND4", "IND1"]);
    }

    #[test]
    fn test_sector_rating_duration() {
        let u = universe();
        let mut warnings = Vec::new();
        let set = SectorRatingDurationBasketBuilder::new(
            "Industrial",
            RatingFilter::range(CreditRating::AAA, CreditRating::BBBMinus),
            DurationFilter::bucket(DurationBucket::ThreeToFive),
            10,
        )
        .select_candidates(&u, &mut warnings)
        .unwrap();
        // IND4 sits at 5.0, the start of the next bucket
        assert_eq!(isins(&set), vec!["IND2"]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_rules_accepts() {
        let rules = SelectionRules {
            rating: Some(RatingFilter::HighYield),
            ..SelectionRules::sector(Sector::new("Industrial"))
        };
        let b = bond("X1", "IND", CreditRating::BB, 1.0, 1.0, dec!(1));
        assert!(rules.accepts(&b));
        let b = bond("X2", "IND", CreditRating::A, 1.0, 1.0, dec!(1));
        assert!(!rules.accepts(&b));
    }
}
