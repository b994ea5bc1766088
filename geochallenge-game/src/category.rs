//! The fixed set of ranking categories countries are placed into.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Category pools never exceed the canonical eight, so they fit inline.
pub type CategoryPool = SmallVec<[Category; 8]>;

/// A ranking dimension. The set is closed; a season snapshot may carry
/// ranks for any subset of these per country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    SmallArea,
    Gdp,
    CapitalPop,
    Military,
    Football,
    Eez,
    Rice,
    Francophones,
}

impl Category {
    /// Canonical ordering used for pools, fallback placement and display.
    pub const ALL: [Category; 8] = [
        Category::SmallArea,
        Category::Gdp,
        Category::CapitalPop,
        Category::Military,
        Category::Football,
        Category::Eez,
        Category::Rice,
        Category::Francophones,
    ];

    /// Stable string id, matching the snapshot and persisted-state schema.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Category::SmallArea => "small_area",
            Category::Gdp => "gdp",
            Category::CapitalPop => "capital_pop",
            Category::Military => "military",
            Category::Football => "football",
            Category::Eez => "eez",
            Category::Rice => "rice",
            Category::Francophones => "francophones",
        }
    }

    /// Human-readable label for result tables and share text.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Category::SmallArea => "Smallest area",
            Category::Gdp => "Global GDP",
            Category::CapitalPop => "Largest capital",
            Category::Military => "Army size",
            Category::Football => "Football",
            Category::Eez => "EEZ size",
            Category::Rice => "Rice production",
            Category::Francophones => "French speakers",
        }
    }

    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Category::SmallArea => "\u{1F4CF}",
            Category::Gdp => "\u{1F4B0}",
            Category::CapitalPop => "\u{1F3D9}\u{FE0F}",
            Category::Military => "\u{2694}\u{FE0F}",
            Category::Football => "\u{26BD}",
            Category::Eez => "\u{1F30A}",
            Category::Rice => "\u{1F33E}",
            Category::Francophones => "\u{1F5E3}\u{FE0F}",
        }
    }

    /// Full pool in canonical order.
    #[must_use]
    pub fn full_pool() -> CategoryPool {
        Self::ALL.into_iter().collect()
    }

    /// First six canonical categories, used by the easy difficulty profile.
    #[must_use]
    pub fn easy_pool() -> CategoryPool {
        Self::ALL[..6].iter().copied().collect()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}
