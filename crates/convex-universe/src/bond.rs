//! Bond records: one row of the trading universe.

use crate::duration::DurationBucket;
use crate::error::{UniverseError, UniverseResult};
use crate::rating::CreditRating;
use crate::sector::Sector;
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single bond in the universe.
///
/// Required columns are plain fields; optional columns are `Option`s.
/// Records are usually created through [`BondRecordBuilder`] and become
/// schema-checked when placed in a [`Universe`](crate::Universe).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondRecord {
    /// ISIN, unique within a universe.
    pub isin: String,

    /// Normalized issuer sector.
    pub sector: Sector,

    /// Composite credit rating.
    pub rating: CreditRating,

    /// Duration in years.
    pub duration: f64,

    /// Liquidity score (0-100, higher is more liquid).
    pub liquidity_score: f64,

    /// Amount outstanding in currency units.
    ///
    /// Written as a decimal string; numeric input is accepted too.
    #[serde(serialize_with = "rust_decimal::serde::str::serialize")]
    pub amount_outstanding: Decimal,

    /// Clean price per 100 par.
    #[serde(
        default,
        serialize_with = "rust_decimal::serde::str_option::serialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<Decimal>,

    /// Yield to maturity (as decimal, e.g. 0.05 for 5%).
    #[serde(default, rename = "yield", skip_serializing_if = "Option::is_none")]
    pub yield_to_maturity: Option<f64>,

    /// Explicit duration bucket column; derived from `duration` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_bucket: Option<DurationBucket>,

    /// Final maturity date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maturity_date: Option<NaiveDate>,
}

impl BondRecord {
    /// Creates a builder.
    #[must_use]
    pub fn builder() -> BondRecordBuilder {
        BondRecordBuilder::new()
    }

    /// The duration bucket, preferring the explicit column.
    #[must_use]
    pub fn bucket(&self) -> Option<DurationBucket> {
        self.duration_bucket
            .or_else(|| DurationBucket::from_duration(self.duration))
    }

    /// Amount outstanding as `f64` (`None` if not representable).
    #[must_use]
    pub fn amount_f64(&self) -> Option<f64> {
        self.amount_outstanding.to_f64()
    }

    /// Rating rank shortcut.
    #[must_use]
    pub fn rating_rank(&self) -> u8 {
        self.rating.rank()
    }
}

/// Builder for [`BondRecord`].
///
/// # Example
///
/// ```
/// use convex_universe::{BondRecord, CreditRating};
/// use rust_decimal::Decimal;
///
/// let bond = BondRecord::builder()
///     .isin("US0000000001")
///     .sector("Industrials")
///     .rating(CreditRating::A)
///     .duration(4.2)
///     .liquidity_score(65.0)
///     .amount_outstanding(Decimal::from(500_000_000))
///     .build()
///     .unwrap();
///
/// assert_eq!(bond.sector.name(), "Industrial");
/// ```
#[derive(Debug, Clone, Default)]
pub struct BondRecordBuilder {
    isin: Option<String>,
    sector: Option<Sector>,
    rating: Option<CreditRating>,
    duration: Option<f64>,
    liquidity_score: Option<f64>,
    amount_outstanding: Option<Decimal>,
    price: Option<Decimal>,
    yield_to_maturity: Option<f64>,
    duration_bucket: Option<DurationBucket>,
    maturity_date: Option<NaiveDate>,
}

impl BondRecordBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the ISIN.
    #[must_use]
    pub fn isin(mut self, isin: impl Into<String>) -> Self {
        self.isin = Some(isin.into());
        self
    }

    /// Sets the sector (normalized).
    #[must_use]
    pub fn sector(mut self, sector: impl Into<Sector>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    /// Sets the rating.
    #[must_use]
    pub fn rating(mut self, rating: CreditRating) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Sets the duration in years.
    #[must_use]
    pub fn duration(mut self, years: f64) -> Self {
        self.duration = Some(years);
        self
    }

    /// Sets the liquidity score.
    #[must_use]
    pub fn liquidity_score(mut self, score: f64) -> Self {
        self.liquidity_score = Some(score);
        self
    }

    /// Sets the amount outstanding.
    #[must_use]
    pub fn amount_outstanding(mut self, amount: Decimal) -> Self {
        self.amount_outstanding = Some(amount);
        self
    }

    /// Sets the clean price.
    #[must_use]
    pub fn price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    /// Sets the yield to maturity.
    #[must_use]
    pub fn yield_to_maturity(mut self, ytm: f64) -> Self {
        self.yield_to_maturity = Some(ytm);
        self
    }

    /// Sets an explicit duration bucket.
    #[must_use]
    pub fn duration_bucket(mut self, bucket: DurationBucket) -> Self {
        self.duration_bucket = Some(bucket);
        self
    }

    /// Sets the maturity date.
    #[must_use]
    pub fn maturity_date(mut self, date: NaiveDate) -> Self {
        self.maturity_date = Some(date);
        self
    }

    /// Builds the record.
    ///
    /// # Errors
    ///
    /// Returns [`UniverseError::MissingColumn`] if a required column was not set.
    /// Value ranges are checked by [`TradingSchema`](crate::TradingSchema).
    pub fn build(self) -> UniverseResult<BondRecord> {
        let isin = self
            .isin
            .ok_or_else(|| UniverseError::missing_column("", "isin"))?;
        let sector = self
            .sector
            .ok_or_else(|| UniverseError::missing_column(&isin, "sector"))?;
        let rating = self
            .rating
            .ok_or_else(|| UniverseError::missing_column(&isin, "rating"))?;
        let duration = self
            .duration
            .ok_or_else(|| UniverseError::missing_column(&isin, "duration"))?;
        let liquidity_score = self
            .liquidity_score
            .ok_or_else(|| UniverseError::missing_column(&isin, "liquidity_score"))?;
        let amount_outstanding = self
            .amount_outstanding
            .ok_or_else(|| UniverseError::missing_column(&isin, "amount_outstanding"))?;

        Ok(BondRecord {
            isin,
            sector,
            rating,
            duration,
            liquidity_score,
            amount_outstanding,
            price: self.price,
            yield_to_maturity: self.yield_to_maturity,
            duration_bucket: self.duration_bucket,
            maturity_date: self.maturity_date,
        })
    }
}
