//! Cross-session progression ledger: totals, streaks and per-category
//! accumulators. Mutated only right after a round completes.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::category::Category;
use crate::session::RoundSummary;

/// Running accumulator for one category across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CategoryStats {
    pub count: u32,
    pub sum: u64,
    /// Best (lowest) rank ever scored in this category.
    pub best: u32,
    /// Rounded `sum / count`, recomputed on every update.
    pub average: u32,
}

/// Persisted long-lived statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SessionStats {
    #[serde(default)]
    pub total_rounds: u32,
    #[serde(default)]
    pub total_score: u64,
    /// Rounded running average score.
    #[serde(default)]
    pub average_score: u32,
    /// Minimum score ever; `None` before the first completion.
    #[serde(default)]
    pub best_score: Option<u32>,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub best_streak: u32,
    /// Device-local calendar date of the last completed round.
    #[serde(default)]
    pub last_played: Option<NaiveDate>,
    #[serde(default)]
    pub per_category: BTreeMap<Category, CategoryStats>,
}

/// Level derived from accumulated play, shown on the stats screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelProgress {
    pub level: u32,
    pub xp: u32,
    pub xp_in_level: u32,
    pub xp_for_next_level: u32,
}

fn rounded_div(sum: u64, count: u64) -> u32 {
    if count == 0 {
        return 0;
    }
    let avg = (sum + count / 2) / count;
    u32::try_from(avg).unwrap_or(u32::MAX)
}

impl SessionStats {
    /// Fold a completed round into the totals and per-category
    /// accumulators.
    pub fn record_round(&mut self, summary: &RoundSummary) {
        self.total_rounds = self.total_rounds.saturating_add(1);
        self.total_score = self.total_score.saturating_add(u64::from(summary.score));
        self.average_score = rounded_div(self.total_score, u64::from(self.total_rounds));
        self.best_score = Some(match self.best_score {
            Some(best) => best.min(summary.score),
            None => summary.score,
        });

        for placement in &summary.placements {
            let entry = self
                .per_category
                .entry(placement.category)
                .or_insert(CategoryStats {
                    count: 0,
                    sum: 0,
                    best: u32::MAX,
                    average: 0,
                });
            entry.count = entry.count.saturating_add(1);
            entry.sum = entry.sum.saturating_add(u64::from(placement.rank));
            entry.best = entry.best.min(placement.rank);
            entry.average = rounded_div(entry.sum, u64::from(entry.count));
        }
    }

    /// Advance the daily streak for a completion on `today` and return the
    /// current streak. Same calendar day: no change. Exactly the next day:
    /// increment. Anything else: reset to 1.
    pub fn update_streak(&mut self, today: NaiveDate) -> u32 {
        if self.last_played == Some(today) {
            return self.current_streak;
        }
        let yesterday = today.checked_sub_days(Days::new(1));
        if self.last_played.is_some() && self.last_played == yesterday {
            self.current_streak = self.current_streak.saturating_add(1);
        } else {
            self.current_streak = 1;
        }
        self.best_streak = self.best_streak.max(self.current_streak);
        self.last_played = Some(today);
        self.current_streak
    }

    /// XP grows with rounds played and with how low the best score got.
    #[must_use]
    pub fn level(&self) -> LevelProgress {
        let score_bonus = self
            .best_score
            .map_or(0, |best| 200u32.saturating_sub(best).saturating_mul(5));
        let xp = self
            .total_rounds
            .saturating_mul(10)
            .saturating_add(score_bonus);
        LevelProgress {
            level: xp / 100 + 1,
            xp,
            xp_in_level: xp % 100,
            xp_for_next_level: 100,
        }
    }
}
