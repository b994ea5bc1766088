//! Badge catalogue and unlock engine.
//!
//! Predicates are pure functions of the updated statistics and the round
//! just completed. Every predicate is evaluated on every completion so
//! several badges may unlock at once; unlocking is append-only and
//! idempotent.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::constants::{SPEED_BADGE_MS, TOP10_SCORE_MAX, TOP50_SCORE_MAX};
use crate::session::RoundSummary;
use crate::stats::SessionStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    FirstGame,
    FiveGames,
    TwentyGames,
    FiftyGames,
    PerfectScore,
    #[serde(rename = "top_10_score")]
    Top10Score,
    #[serde(rename = "top_50_score")]
    Top50Score,
    #[serde(rename = "streak_5")]
    Streak5,
    #[serde(rename = "streak_10")]
    Streak10,
    #[serde(rename = "streak_30")]
    Streak30,
    NoHints,
    SpeedDemon,
}

/// Display grouping on the badges screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeGroup {
    Progression,
    Score,
    Performance,
    Special,
}

impl Badge {
    pub const ALL: [Badge; 12] = [
        Badge::FirstGame,
        Badge::FiveGames,
        Badge::TwentyGames,
        Badge::FiftyGames,
        Badge::PerfectScore,
        Badge::Top10Score,
        Badge::Top50Score,
        Badge::Streak5,
        Badge::Streak10,
        Badge::Streak30,
        Badge::NoHints,
        Badge::SpeedDemon,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Badge::FirstGame => "First steps",
            Badge::FiveGames => "Regular",
            Badge::TwentyGames => "Enthusiast",
            Badge::FiftyGames => "Expert",
            Badge::PerfectScore => "Perfect score",
            Badge::Top10Score => "Top 10",
            Badge::Top50Score => "Top 50",
            Badge::Streak5 => "5-day streak",
            Badge::Streak10 => "10-day streak",
            Badge::Streak30 => "30-day streak",
            Badge::NoHints => "No help needed",
            Badge::SpeedDemon => "Lightning",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Badge::FirstGame => "Complete your first round",
            Badge::FiveGames => "Play 5 rounds",
            Badge::TwentyGames => "Play 20 rounds",
            Badge::FiftyGames => "Play 50 rounds",
            Badge::PerfectScore => "Match the optimal score",
            Badge::Top10Score => "Finish with 10 points or fewer",
            Badge::Top50Score => "Finish with 50 points or fewer",
            Badge::Streak5 => "Play 5 days in a row",
            Badge::Streak10 => "Play 10 days in a row",
            Badge::Streak30 => "Play 30 days in a row",
            Badge::NoHints => "Finish a round without hints",
            Badge::SpeedDemon => "Finish a round in under 2 minutes",
        }
    }

    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Badge::FirstGame => "\u{1F3AE}",
            Badge::FiveGames => "\u{1F3AF}",
            Badge::TwentyGames => "\u{1F525}",
            Badge::FiftyGames => "\u{2B50}",
            Badge::PerfectScore => "\u{1F4AF}",
            Badge::Top10Score => "\u{1F3C6}",
            Badge::Top50Score => "\u{1F947}",
            Badge::Streak5 => "\u{1F4C5}",
            Badge::Streak10 => "\u{1F4C6}",
            Badge::Streak30 => "\u{1F5D3}\u{FE0F}",
            Badge::NoHints => "\u{1F9E0}",
            Badge::SpeedDemon => "\u{26A1}",
        }
    }

    #[must_use]
    pub const fn group(self) -> BadgeGroup {
        match self {
            Badge::FirstGame | Badge::FiveGames | Badge::TwentyGames | Badge::FiftyGames => {
                BadgeGroup::Progression
            }
            Badge::PerfectScore | Badge::Top10Score | Badge::Top50Score => BadgeGroup::Score,
            Badge::Streak5 | Badge::Streak10 | Badge::Streak30 => BadgeGroup::Performance,
            Badge::NoHints | Badge::SpeedDemon => BadgeGroup::Special,
        }
    }

    /// Unlock predicate over the post-round statistics and the round
    /// summary.
    #[must_use]
    pub fn earned(self, stats: &SessionStats, summary: &RoundSummary) -> bool {
        match self {
            Badge::FirstGame => stats.total_rounds >= 1,
            Badge::FiveGames => stats.total_rounds >= 5,
            Badge::TwentyGames => stats.total_rounds >= 20,
            Badge::FiftyGames => stats.total_rounds >= 50,
            Badge::PerfectScore => summary.score == summary.optimal_score,
            Badge::Top10Score => summary.score <= TOP10_SCORE_MAX,
            Badge::Top50Score => summary.score <= TOP50_SCORE_MAX,
            Badge::Streak5 => stats.current_streak >= 5,
            Badge::Streak10 => stats.current_streak >= 10,
            Badge::Streak30 => stats.current_streak >= 30,
            Badge::NoHints => summary.hint_penalty == 0,
            Badge::SpeedDemon => summary.duration_ms < SPEED_BADGE_MS,
        }
    }
}

/// Evaluate the whole catalogue against the updated stats and the round
/// summary, add anything newly earned to `unlocked`, and return the new
/// unlocks in catalogue order. Already-unlocked badges never re-fire.
pub fn check_badges(
    stats: &SessionStats,
    summary: &RoundSummary,
    unlocked: &mut BTreeSet<Badge>,
) -> Vec<Badge> {
    let mut fresh = Vec::new();
    for badge in Badge::ALL {
        if badge.earned(stats, summary) && unlocked.insert(badge) {
            fresh.push(badge);
        }
    }
    fresh
}
