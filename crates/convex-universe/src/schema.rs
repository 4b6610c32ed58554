//! Trading schema: the column contract of a bond universe.
//!
//! The schema describes which columns exist, which are required, and the
//! value ranges each accepts. [`TradingSchema::validate_record`] checks one
//! record; [`Universe::new`](crate::Universe::new) applies it to a snapshot.

use crate::bond::BondRecord;
use crate::duration::DurationBucket;
use crate::error::{UniverseError, UniverseResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Columns every record must carry.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "isin",
    "sector",
    "rating",
    "duration",
    "liquidity_score",
    "amount_outstanding",
];

/// Columns a record may carry.
pub const OPTIONAL_COLUMNS: [&str; 4] = ["price", "yield", "duration_bucket", "maturity_date"];

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    /// Free-form unique key.
    Identifier,
    /// Categorical value.
    Categorical,
    /// Ordinal value with a numeric rank.
    Ordinal,
    /// Continuous numeric value.
    Continuous,
    /// Calendar date.
    Date,
}

/// Value limits enforced by the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingSchema {
    /// Smallest accepted duration (years).
    pub min_duration: f64,
    /// Largest accepted duration (years).
    pub max_duration: f64,
    /// Smallest accepted liquidity score.
    pub min_liquidity: f64,
    /// Largest accepted liquidity score.
    pub max_liquidity: f64,
    /// Longest accepted ISIN.
    pub max_isin_len: usize,
}

impl Default for TradingSchema {
    fn default() -> Self {
        Self {
            min_duration: 0.0,
            max_duration: 100.0,
            min_liquidity: 0.0,
            max_liquidity: 100.0,
            max_isin_len: 12,
        }
    }
}

impl TradingSchema {
    /// Creates the default schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Semantic type of a known column, `None` for unknown names.
    #[must_use]
    pub fn column_type(column: &str) -> Option<ColumnType> {
        match column {
            "isin" => Some(ColumnType::Identifier),
            "sector" | "duration_bucket" => Some(ColumnType::Categorical),
            "rating" => Some(ColumnType::Ordinal),
            "duration" | "liquidity_score" | "amount_outstanding" | "price" | "yield" => {
                Some(ColumnType::Continuous)
            }
            "maturity_date" => Some(ColumnType::Date),
            _ => None,
        }
    }

    /// True if the column is required.
    #[must_use]
    pub fn is_required(column: &str) -> bool {
        REQUIRED_COLUMNS.contains(&column)
    }

    /// Checks one record against the schema.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule: empty identifier, empty sector,
    /// out-of-range duration/liquidity/amount/price, non-finite yield, or an
    /// explicit duration bucket that disagrees with the duration.
    pub fn validate_record(&self, bond: &BondRecord) -> UniverseResult<()> {
        let isin = bond.isin.trim();
        if isin.is_empty() {
            return Err(UniverseError::missing_column("", "isin"));
        }
        if isin.len() > self.max_isin_len {
            return Err(UniverseError::out_of_range(
                isin,
                "isin",
                isin.len(),
                format!("at most {} characters", self.max_isin_len),
            ));
        }
        if bond.sector.is_empty() {
            return Err(UniverseError::missing_column(isin, "sector"));
        }

        check_range(
            isin,
            "duration",
            bond.duration,
            self.min_duration,
            self.max_duration,
        )?;
        check_range(
            isin,
            "liquidity_score",
            bond.liquidity_score,
            self.min_liquidity,
            self.max_liquidity,
        )?;

        if bond.amount_outstanding < Decimal::ZERO {
            return Err(UniverseError::out_of_range(
                isin,
                "amount_outstanding",
                bond.amount_outstanding,
                ">= 0",
            ));
        }

        if let Some(price) = bond.price {
            if price <= Decimal::ZERO {
                return Err(UniverseError::out_of_range(isin, "price", price, "> 0"));
            }
        }

        if let Some(ytm) = bond.yield_to_maturity {
            if !ytm.is_finite() {
                return Err(UniverseError::out_of_range(isin, "yield", ytm, "finite"));
            }
        }

        if let Some(bucket) = bond.duration_bucket {
            if DurationBucket::from_duration(bond.duration) != Some(bucket) {
                return Err(UniverseError::out_of_range(
                    isin,
                    "duration_bucket",
                    bucket,
                    format!("bucket containing duration {}", bond.duration),
                ));
            }
        }

        Ok(())
    }
}

fn check_range(isin: &str, column: &str, value: f64, min: f64, max: f64) -> UniverseResult<()> {
    if value.is_nan() {
        return Err(UniverseError::missing_column(isin, column));
    }
    if value < min || value > max {
        return Err(UniverseError::out_of_range(
            isin,
            column,
            value,
            format!("[{min}, {max}]"),
        ));
    }
    Ok(())
}
