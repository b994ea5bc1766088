//! Centralized balance and tuning constants for Geo Challenge game logic.
//!
//! These values define the deterministic math for scoring, hints and
//! progression. Keeping them together ensures that gameplay can only be
//! adjusted via code changes reviewed in version control, rather than
//! through external JSON assets.

// Scoring ------------------------------------------------------------------
/// Rank charged when a country has no entry for a category. One more than
/// the number of sovereign states considered by the dataset.
pub const FALLBACK_RANK: u32 = 196;

// Round mechanics ----------------------------------------------------------
/// Undo uses allowed per round.
pub const MAX_UNDOS: u32 = 3;
/// Points added to the score for each hint served.
pub const HINT_COST: u32 = 5;
/// Hints allowed per round.
pub const HINT_LIMIT: u32 = 3;
/// Default seconds granted per country when the timer is enabled.
pub const DEFAULT_TIMER_SECS: u32 = 60;

// Persistence caps ---------------------------------------------------------
/// Maximum entries kept in the local leaderboard.
pub const LEADERBOARD_CAP: usize = 50;
/// Maximum round summaries kept in the rounds history log.
pub const HISTORY_CAP: usize = 100;
/// Country codes stored per leaderboard entry.
pub const LEADERBOARD_COUNTRY_LIMIT: usize = 8;

// Badges -------------------------------------------------------------------
/// Wall-clock round duration under which the speed badge unlocks.
pub const SPEED_BADGE_MS: u64 = 120_000;
/// Final score at or below which the top-10 badge unlocks.
pub const TOP10_SCORE_MAX: u32 = 10;
/// Final score at or below which the top-50 badge unlocks.
pub const TOP50_SCORE_MAX: u32 = 50;
