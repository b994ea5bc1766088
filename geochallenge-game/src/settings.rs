//! User settings and difficulty profiles.

use serde::{Deserialize, Serialize};

use crate::category::{Category, CategoryPool};
use crate::constants::DEFAULT_TIMER_SECS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Expert,
}

impl Difficulty {
    /// Countries drawn per round for this profile.
    #[must_use]
    pub const fn country_count(self) -> usize {
        match self {
            Difficulty::Easy => 6,
            Difficulty::Normal => 8,
            Difficulty::Hard => 10,
            Difficulty::Expert => 12,
        }
    }

    /// Default category pool for this profile.
    #[must_use]
    pub fn pool(self) -> CategoryPool {
        match self {
            Difficulty::Easy => Category::easy_pool(),
            _ => Category::full_pool(),
        }
    }

    /// Whether a manual category selection may replace the profile pool.
    /// Easy and normal always play their own pools.
    #[must_use]
    pub const fn allows_category_override(self) -> bool {
        matches!(self, Difficulty::Hard | Difficulty::Expert)
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
        };
        f.write_str(label)
    }
}

/// Persisted user settings. Serde defaults keep partial blobs
/// deserializing to the documented defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Manual category selection; `None` plays the profile pool.
    #[serde(default)]
    pub selected_categories: Option<Vec<Category>>,
    #[serde(default)]
    pub timer_enabled: bool,
    /// Seconds granted per country when the timer is enabled.
    #[serde(default = "default_timer_duration")]
    pub timer_duration: u32,
    #[serde(default = "default_hints_enabled")]
    pub hints_enabled: bool,
}

const fn default_timer_duration() -> u32 {
    DEFAULT_TIMER_SECS
}

const fn default_hints_enabled() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            selected_categories: None,
            timer_enabled: false,
            timer_duration: DEFAULT_TIMER_SECS,
            hints_enabled: true,
        }
    }
}

/// Resolved configuration for one round draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundPlan {
    pub pool: CategoryPool,
    pub country_count: usize,
}

impl Settings {
    /// Resolve the difficulty profile and any manual category selection
    /// into the pool and country count for the next round. The selection
    /// only applies on hard/expert; the country count never drops below
    /// the profile count and grows to cover a larger selection.
    #[must_use]
    pub fn round_plan(&self) -> RoundPlan {
        let difficulty = self.difficulty;
        let mut pool = difficulty.pool();
        let mut country_count = difficulty.country_count();

        if difficulty.allows_category_override()
            && let Some(selection) = self.selected_categories.as_deref()
            && !selection.is_empty()
        {
            pool = selection.iter().copied().collect();
            country_count = country_count.max(pool.len());
        }

        RoundPlan {
            pool,
            country_count,
        }
    }
}
