//! Season snapshot data model: the read-only country/rank dataset.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::category::Category;
use crate::constants::FALLBACK_RANK;

/// Unique country key within a snapshot (ISO-style code).
pub type CountryCode = String;

/// Snapshot metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SnapshotMeta {
    #[serde(default)]
    pub season: String,
}

/// A country as published in the season snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Country {
    pub name: String,
    #[serde(default)]
    pub flag: String,
    #[serde(default)]
    pub ranks: BTreeMap<Category, u32>,
}

impl Country {
    /// World rank for a category; 1 is best. Countries absent from a
    /// ranking are charged the sentinel worst rank.
    #[must_use]
    pub fn rank(&self, category: Category) -> u32 {
        match self.ranks.get(&category) {
            Some(&rank) if rank >= 1 => rank,
            _ => FALLBACK_RANK,
        }
    }

    /// Best rank across a pool, ignoring exclusivity.
    #[must_use]
    pub fn best_rank(&self, pool: &[Category]) -> u32 {
        pool.iter()
            .map(|&category| self.rank(category))
            .min()
            .unwrap_or(FALLBACK_RANK)
    }
}

/// Container for the whole season dataset, loaded once per session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Snapshot {
    #[serde(default)]
    pub meta: SnapshotMeta,
    #[serde(default)]
    pub countries: BTreeMap<CountryCode, Country>,
}

impl Snapshot {
    /// Empty snapshot: the degraded fallback when the dataset fetch fails.
    /// Rounds cannot start from it, but nothing crashes either.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a snapshot from its JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a valid snapshot.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn country(&self, code: &str) -> Option<&Country> {
        self.countries.get(code)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.countries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}
