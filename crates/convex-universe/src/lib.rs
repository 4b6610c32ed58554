//! # Convex Universe
//!
//! The schema layer for bond basket construction.
//!
//! A [`Universe`] is a validated, read-only snapshot of [`BondRecord`]s. Once
//! constructed it guarantees the trading schema: required columns present,
//! identifiers unique, values inside their declared ranges. Downstream crates
//! consume it without re-checking.
//!
//! ## Module Overview
//!
//! - [`bond`] - Bond records and their builder
//! - [`rating`] - Credit rating hierarchy with numeric ranks
//! - [`sector`] - Sector normalization and aliases
//! - [`duration`] - Fixed duration buckets (lower-inclusive, upper-exclusive)
//! - [`schema`] - Column contract and record validation
//! - [`universe`] - Validated universe snapshots

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod bond;
pub mod duration;
pub mod error;
pub mod rating;
pub mod schema;
pub mod sector;
pub mod universe;

pub use bond::{BondRecord, BondRecordBuilder};
pub use duration::DurationBucket;
pub use error::{UniverseError, UniverseResult};
pub use rating::{CreditRating, RatingBucket, RATED_NOTCHES};
pub use schema::{ColumnType, TradingSchema, OPTIONAL_COLUMNS, REQUIRED_COLUMNS};
pub use sector::{normalize_sector, Sector, SECTOR_ALIASES};
pub use universe::Universe;
