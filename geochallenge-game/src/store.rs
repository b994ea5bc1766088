//! Persistence gateway: an abstract key-value store plus the typed
//! profile that round-trips every persisted blob through JSON.
//!
//! The core never talks to a concrete storage medium. Read failures and
//! corrupt blobs degrade to documented defaults; write failures are
//! logged and gameplay continues with in-memory state as the authority.

use chrono::NaiveDate;
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use crate::badges::Badge;
use crate::constants::{HISTORY_CAP, LEADERBOARD_CAP, LEADERBOARD_COUNTRY_LIMIT};
use crate::data::CountryCode;
use crate::session::RoundSummary;
use crate::settings::Settings;
use crate::stats::SessionStats;

/// Trait for abstracting the browser's key-value storage.
/// Platform-specific implementations should provide this.
pub trait KeyValueStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the raw string stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Write `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be written, e.g.
    /// on quota exhaustion.
    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Remove `key` if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be written.
    fn remove(&self, key: &str) -> Result<(), Self::Error>;
}

/// In-memory store for tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    type Error = std::convert::Infallible;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

// Persisted-state keys. The key strings and badge ids are stable; blob
// bodies use this crate's own field names.
pub const KEY_PERSONAL_BEST: &str = "geo-challenge-pb";
pub const KEY_LEADERBOARD: &str = "geo-challenge-leaderboard";
pub const KEY_HISTORY: &str = "geo-challenge-history";
pub const KEY_SETTINGS: &str = "geo-challenge-settings";
pub const KEY_STATS: &str = "geo-challenge-stats";
pub const KEY_BADGES: &str = "geo-challenge-badges";
pub const KEY_TUTORIAL: &str = "geo-challenge-tutorial";
pub const KEY_CURRENT_ROUND: &str = "geo-challenge-current-round";

/// One local-leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub score: u32,
    pub date: NaiveDate,
    #[serde(default)]
    pub countries: Vec<CountryCode>,
}

/// Typed gateway over a [`KeyValueStore`], one JSON blob per key.
#[derive(Debug, Clone, Default)]
pub struct Profile<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> Profile<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(raw) => raw?,
            Err(err) => {
                warn!("storage read failed for {key}: {err}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                // Corrupt persisted state is treated as absent.
                warn!("discarding corrupt blob under {key}: {err}");
                None
            }
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => {
                if let Err(err) = self.store.set(key, &raw) {
                    warn!("storage write failed for {key}: {err}");
                }
            }
            Err(err) => warn!("could not serialize blob for {key}: {err}"),
        }
    }

    fn delete(&self, key: &str) {
        if let Err(err) = self.store.remove(key) {
            warn!("storage remove failed for {key}: {err}");
        }
    }

    // Personal best -------------------------------------------------------

    #[must_use]
    pub fn personal_best(&self) -> Option<u32> {
        self.read(KEY_PERSONAL_BEST)
    }

    /// Persist `score` when it strictly beats the stored best. Returns
    /// whether a new record was set.
    pub fn save_personal_best(&self, score: u32) -> bool {
        match self.personal_best() {
            Some(best) if score >= best => false,
            _ => {
                self.write(KEY_PERSONAL_BEST, &score);
                true
            }
        }
    }

    pub fn reset_personal_best(&self) {
        self.delete(KEY_PERSONAL_BEST);
    }

    // Leaderboard ---------------------------------------------------------

    #[must_use]
    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        self.read(KEY_LEADERBOARD).unwrap_or_default()
    }

    /// Insert a finished round into the local leaderboard, keeping it
    /// sorted ascending by score and capped. Entries beyond the cap are
    /// dropped. Returns the 1-based position of the new entry, or `None`
    /// when it fell off the end.
    pub fn add_to_leaderboard(
        &self,
        score: u32,
        countries: &[CountryCode],
        date: NaiveDate,
    ) -> Option<usize> {
        let mut board = self.leaderboard();
        let entry = LeaderboardEntry {
            score,
            date,
            countries: countries
                .iter()
                .take(LEADERBOARD_COUNTRY_LIMIT)
                .cloned()
                .collect(),
        };
        // Equal scores keep older entries first.
        let index = board.partition_point(|existing| existing.score <= score);
        board.insert(index, entry);
        board.truncate(LEADERBOARD_CAP);
        self.write(KEY_LEADERBOARD, &board);
        (index < LEADERBOARD_CAP).then_some(index + 1)
    }

    pub fn reset_leaderboard(&self) {
        self.delete(KEY_LEADERBOARD);
    }

    // Round history -------------------------------------------------------

    #[must_use]
    pub fn round_history(&self) -> Vec<RoundSummary> {
        self.read(KEY_HISTORY).unwrap_or_default()
    }

    /// Prepend a round summary to the history log, newest first, capped.
    pub fn push_round_history(&self, summary: &RoundSummary) {
        let mut history = self.round_history();
        history.insert(0, summary.clone());
        history.truncate(HISTORY_CAP);
        self.write(KEY_HISTORY, &history);
    }

    // Statistics ----------------------------------------------------------

    #[must_use]
    pub fn stats(&self) -> SessionStats {
        self.read(KEY_STATS).unwrap_or_default()
    }

    pub fn save_stats(&self, stats: &SessionStats) {
        self.write(KEY_STATS, stats);
    }

    pub fn reset_stats(&self) {
        self.delete(KEY_STATS);
        self.delete(KEY_HISTORY);
    }

    // Settings ------------------------------------------------------------

    #[must_use]
    pub fn settings(&self) -> Settings {
        self.read(KEY_SETTINGS).unwrap_or_default()
    }

    pub fn save_settings(&self, settings: &Settings) {
        self.write(KEY_SETTINGS, settings);
    }

    // Badges --------------------------------------------------------------

    #[must_use]
    pub fn unlocked_badges(&self) -> BTreeSet<Badge> {
        self.read(KEY_BADGES).unwrap_or_default()
    }

    pub fn save_unlocked_badges(&self, badges: &BTreeSet<Badge>) {
        self.write(KEY_BADGES, badges);
    }

    pub fn reset_badges(&self) {
        self.delete(KEY_BADGES);
    }

    // Tutorial ------------------------------------------------------------

    #[must_use]
    pub fn tutorial_completed(&self) -> bool {
        self.read(KEY_TUTORIAL).unwrap_or(false)
    }

    pub fn mark_tutorial_completed(&self) {
        self.write(KEY_TUTORIAL, &true);
    }

    pub fn reset_tutorial(&self) {
        self.delete(KEY_TUTORIAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile<MemoryStore> {
        Profile::new(MemoryStore::new())
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, d).unwrap()
    }

    #[test]
    fn personal_best_only_improves_downward() {
        let profile = profile();
        assert!(profile.personal_best().is_none());
        assert!(profile.save_personal_best(100));
        assert!(profile.save_personal_best(90));
        assert!(!profile.save_personal_best(95));
        assert_eq!(profile.personal_best(), Some(90));
        assert!(!profile.save_personal_best(90));
    }

    #[test]
    fn leaderboard_sorts_ascending_and_reports_position() {
        let profile = profile();
        assert_eq!(profile.add_to_leaderboard(40, &[], date(1)), Some(1));
        assert_eq!(profile.add_to_leaderboard(20, &[], date(2)), Some(1));
        assert_eq!(profile.add_to_leaderboard(30, &[], date(3)), Some(2));
        // Equal score lands after the existing entry.
        assert_eq!(profile.add_to_leaderboard(30, &[], date(4)), Some(3));

        let board = profile.leaderboard();
        let scores: Vec<u32> = board.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![20, 30, 30, 40]);
        assert_eq!(board[1].date, date(3));
    }

    #[test]
    fn leaderboard_drops_worst_entry_past_cap() {
        let profile = profile();
        for score in 0..LEADERBOARD_CAP as u32 {
            profile.add_to_leaderboard(score, &[], date(1));
        }
        // Worse than every kept entry: inserted then truncated away.
        assert_eq!(profile.add_to_leaderboard(1000, &[], date(2)), None);
        let board = profile.leaderboard();
        assert_eq!(board.len(), LEADERBOARD_CAP);
        assert!(board.iter().all(|e| e.score < 1000));
    }

    #[test]
    fn leaderboard_truncates_country_list() {
        let profile = profile();
        let countries: Vec<CountryCode> = (0..12).map(|i| format!("C{i}")).collect();
        profile.add_to_leaderboard(10, &countries, date(1));
        assert_eq!(
            profile.leaderboard()[0].countries.len(),
            LEADERBOARD_COUNTRY_LIMIT
        );
    }

    #[test]
    fn corrupt_blobs_degrade_to_defaults() {
        let profile = profile();
        profile.store().set(KEY_STATS, "not json").unwrap();
        profile.store().set(KEY_LEADERBOARD, "{\"nope\":1}").unwrap();
        profile.store().set(KEY_SETTINGS, "[]").unwrap();
        assert_eq!(profile.stats(), SessionStats::default());
        assert!(profile.leaderboard().is_empty());
        assert_eq!(profile.settings(), Settings::default());
        assert!(!profile.tutorial_completed());
    }

    #[test]
    fn badges_roundtrip_as_id_array() {
        let profile = profile();
        let mut unlocked = BTreeSet::new();
        unlocked.insert(Badge::FirstGame);
        unlocked.insert(Badge::Top10Score);
        profile.save_unlocked_badges(&unlocked);

        let raw = profile.store().get(KEY_BADGES).unwrap().unwrap();
        assert_eq!(raw, "[\"first_game\",\"top_10_score\"]");
        assert_eq!(profile.unlocked_badges(), unlocked);
    }

    #[test]
    fn tutorial_flag_sets_and_resets() {
        let profile = profile();
        profile.mark_tutorial_completed();
        assert!(profile.tutorial_completed());
        profile.reset_tutorial();
        assert!(!profile.tutorial_completed());
    }
}
