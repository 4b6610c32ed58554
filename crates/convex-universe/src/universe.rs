//! Validated, read-only universe snapshots.

use crate::bond::BondRecord;
use crate::error::{UniverseError, UniverseResult};
use crate::schema::TradingSchema;
use crate::sector::Sector;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// An immutable snapshot of bond records.
///
/// A `Universe` can only be created through schema validation, so every
/// consumer may rely on unique identifiers and in-range values. Records keep
/// their input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Universe {
    records: Vec<BondRecord>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Universe {
    /// Validates records against the default [`TradingSchema`].
    ///
    /// # Errors
    ///
    /// Returns the first schema violation, including duplicate identifiers.
    pub fn new(records: Vec<BondRecord>) -> UniverseResult<Self> {
        Self::with_schema(records, &TradingSchema::default())
    }

    /// Validates records against a custom schema.
    ///
    /// # Errors
    ///
    /// Returns the first schema violation, including duplicate identifiers.
    pub fn with_schema(records: Vec<BondRecord>, schema: &TradingSchema) -> UniverseResult<Self> {
        let mut index = HashMap::with_capacity(records.len());
        for (i, bond) in records.iter().enumerate() {
            schema.validate_record(bond)?;
            if index.insert(bond.isin.clone(), i).is_some() {
                return Err(UniverseError::DuplicateIdentifier {
                    isin: bond.isin.clone(),
                });
            }
        }
        Ok(Self { records, index })
    }

    /// An empty universe.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Looks up a bond by identifier.
    #[must_use]
    pub fn get(&self, isin: &str) -> Option<&BondRecord> {
        self.index.get(isin).map(|&i| &self.records[i])
    }

    /// True if the identifier is present.
    #[must_use]
    pub fn contains(&self, isin: &str) -> bool {
        self.index.contains_key(isin)
    }

    /// Iterates records in input order.
    pub fn iter(&self) -> std::slice::Iter<'_, BondRecord> {
        self.records.iter()
    }

    /// All records in input order.
    #[must_use]
    pub fn records(&self) -> &[BondRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct sectors, sorted.
    #[must_use]
    pub fn sectors(&self) -> BTreeSet<&Sector> {
        self.records.iter().map(|b| &b.sector).collect()
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a> IntoIterator for &'a Universe {
    type Item = &'a BondRecord;
    type IntoIter = std::slice::Iter<'a, BondRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl TryFrom<Vec<BondRecord>> for Universe {
    type Error = UniverseError;

    fn try_from(records: Vec<BondRecord>) -> UniverseResult<Self> {
        Self::new(records)
    }
}

impl<'de> Deserialize<'de> for Universe {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            records: Vec<BondRecord>,
        }

        let raw = Raw::deserialize(deserializer)?;
        Self::new(raw.records).map_err(serde::de::Error::custom)
    }
}
