//! Geo Challenge Game Engine
//!
//! Platform-agnostic core game logic for the Geo Challenge geography
//! trivia game. This crate provides scoring, round state, progression and
//! badge mechanics without UI or platform-specific dependencies.

pub mod analysis;
pub mod badges;
pub mod category;
pub mod constants;
pub mod data;
pub mod hints;
pub mod round;
pub mod session;
pub mod settings;
pub mod stats;
pub mod store;

// Re-export commonly used types
pub use analysis::{ScoreAnalysis, analyze, efficiency};
pub use badges::{Badge, BadgeGroup, check_badges};
pub use category::{Category, CategoryPool};
pub use data::{Country, CountryCode, Snapshot, SnapshotMeta};
pub use hints::{Hint, HintTier, candidate_hints, request_hint};
pub use round::{PlaceError, Placement, Round, RoundError};
pub use session::{FinalizeError, RoundOutcome, RoundSummary, finalize_round};
pub use settings::{Difficulty, RoundPlan, Settings};
pub use stats::{CategoryStats, LevelProgress, SessionStats};
pub use store::{KeyValueStore, LeaderboardEntry, MemoryStore, Profile};

use chrono::NaiveDate;
use log::warn;
use rand::Rng;

use crate::store::KEY_CURRENT_ROUND;

/// Trait for abstracting the season snapshot fetch.
/// Platform-specific implementations should provide this.
pub trait SnapshotLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the season snapshot from the platform-specific source.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be fetched or parsed.
    fn load_snapshot(&self) -> Result<Snapshot, Self::Error>;
}

/// Main game engine tying the snapshot source and the persistence
/// gateway together for one browser session.
pub struct GameEngine<L, S>
where
    L: SnapshotLoader,
    S: KeyValueStore,
{
    loader: L,
    profile: Profile<S>,
    snapshot: Snapshot,
}

impl<L, S> GameEngine<L, S>
where
    L: SnapshotLoader,
    S: KeyValueStore,
{
    /// Create an engine with no dataset loaded yet. Rounds cannot start
    /// until [`Self::load_snapshot`] has run.
    pub fn new(loader: L, store: S) -> Self {
        Self {
            loader,
            profile: Profile::new(store),
            snapshot: Snapshot::empty(),
        }
    }

    /// Fetch the season snapshot. A failed fetch degrades to the empty
    /// snapshot and returns `false`; initialization never crashes over a
    /// missing dataset.
    pub fn load_snapshot(&mut self) -> bool {
        match self.loader.load_snapshot() {
            Ok(snapshot) => {
                self.snapshot = snapshot;
                true
            }
            Err(err) => {
                warn!("snapshot unavailable, starting degraded: {err}");
                self.snapshot = Snapshot::empty();
                false
            }
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    #[must_use]
    pub fn profile(&self) -> &Profile<S> {
        &self.profile
    }

    /// Draw a round from the persisted settings.
    ///
    /// # Errors
    ///
    /// Returns [`RoundError::InsufficientData`] when the snapshot cannot
    /// cover the configured country count, including the degraded empty
    /// snapshot.
    pub fn start_round<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Round, RoundError> {
        let settings = self.profile.settings();
        Round::select(&self.snapshot, &settings, rng)
    }

    /// Persist an in-progress round so a reload can resume it.
    ///
    /// # Errors
    ///
    /// Returns an error if the round cannot be serialized or written.
    pub fn save_round(&self, round: &Round) -> Result<(), anyhow::Error>
    where
        S::Error: Into<anyhow::Error>,
    {
        let raw = serde_json::to_string(round)?;
        self.profile
            .store()
            .set(KEY_CURRENT_ROUND, &raw)
            .map_err(Into::into)
    }

    /// Load the saved in-progress round, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or the saved round
    /// cannot be deserialized.
    pub fn load_round(&self) -> Result<Option<Round>, anyhow::Error>
    where
        S::Error: Into<anyhow::Error>,
    {
        let Some(raw) = self
            .profile
            .store()
            .get(KEY_CURRENT_ROUND)
            .map_err(Into::into)?
        else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Drop any saved in-progress round. Storage failures are logged and
    /// swallowed; a stale save is harmless.
    pub fn clear_saved_round(&self) {
        if let Err(err) = self.profile.store().remove(KEY_CURRENT_ROUND) {
            warn!("could not clear saved round: {err}");
        }
    }

    /// Finalize a terminal round against the persisted ledgers. Any saved
    /// in-progress round is cleared on success.
    ///
    /// # Errors
    ///
    /// Returns [`FinalizeError::RoundInProgress`] when the round is not
    /// terminal yet.
    pub fn finalize_round(
        &self,
        round: &Round,
        duration_ms: u64,
        today: NaiveDate,
    ) -> Result<RoundOutcome, FinalizeError> {
        let settings = self.profile.settings();
        let outcome = session::finalize_round(
            &self.profile,
            round,
            &self.snapshot,
            settings.difficulty,
            duration_ms,
            today,
        )?;
        self.clear_saved_round();
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::convert::Infallible;

    #[derive(Clone, Copy, Default)]
    struct FixtureLoader {
        countries: usize,
    }

    impl SnapshotLoader for FixtureLoader {
        type Error = Infallible;

        fn load_snapshot(&self) -> Result<Snapshot, Self::Error> {
            let mut snapshot = Snapshot::empty();
            snapshot.meta.season = "2025-11".to_string();
            for i in 0..self.countries {
                let code = format!("C{i:02}");
                let ranks = Category::ALL
                    .into_iter()
                    .enumerate()
                    .map(|(j, category)| (category, (i + j + 1) as u32))
                    .collect();
                snapshot.countries.insert(
                    code.clone(),
                    Country {
                        name: code,
                        flag: String::new(),
                        ranks,
                    },
                );
            }
            Ok(snapshot)
        }
    }

    #[derive(Debug)]
    struct FailingLoader;

    impl SnapshotLoader for FailingLoader {
        type Error = std::io::Error;

        fn load_snapshot(&self) -> Result<Snapshot, Self::Error> {
            Err(std::io::Error::other("offline"))
        }
    }

    #[test]
    fn engine_plays_a_full_round_end_to_end() {
        let mut engine = GameEngine::new(FixtureLoader { countries: 20 }, MemoryStore::default());
        assert!(engine.load_snapshot());

        let mut rng = ChaCha8Rng::seed_from_u64(0xABCD);
        let mut round = engine.start_round(&mut rng).unwrap();
        while let Some(category) = round.first_open_category() {
            if round.is_complete() {
                break;
            }
            round.place(category, engine.snapshot()).unwrap();
        }
        assert!(round.is_complete());

        let today = NaiveDate::from_ymd_opt(2025, 11, 20).unwrap();
        let outcome = engine.finalize_round(&round, 90_000, today).unwrap();
        assert!(outcome.new_record);
        assert_eq!(engine.profile().stats().total_rounds, 1);
    }

    #[test]
    fn failed_fetch_degrades_to_empty_snapshot() {
        let mut engine = GameEngine::new(FailingLoader, MemoryStore::default());
        assert!(!engine.load_snapshot());
        assert!(engine.snapshot().is_empty());

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let err = engine.start_round(&mut rng).unwrap_err();
        assert!(matches!(err, RoundError::InsufficientData { available: 0, .. }));
    }

    #[test]
    fn saved_round_resumes_and_clears_on_finalize() {
        let store = MemoryStore::default();
        let mut engine = GameEngine::new(FixtureLoader { countries: 20 }, store.clone());
        engine.load_snapshot();

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut round = engine.start_round(&mut rng).unwrap();
        round.place(Category::Gdp, engine.snapshot()).unwrap();
        engine.save_round(&round).unwrap();

        // A reload builds a fresh engine over the same storage.
        let mut resumed_engine = GameEngine::new(FixtureLoader { countries: 20 }, store);
        resumed_engine.load_snapshot();
        let mut resumed = resumed_engine.load_round().unwrap().unwrap();
        assert_eq!(resumed, round);

        while let Some(category) = resumed.first_open_category() {
            if resumed.is_complete() {
                break;
            }
            resumed.place(category, resumed_engine.snapshot()).unwrap();
        }
        let today = NaiveDate::from_ymd_opt(2025, 11, 21).unwrap();
        resumed_engine
            .finalize_round(&resumed, 60_000, today)
            .unwrap();
        assert!(resumed_engine.load_round().unwrap().is_none());
    }

    #[test]
    fn round_draw_honours_persisted_settings() {
        let mut engine = GameEngine::new(FixtureLoader { countries: 20 }, MemoryStore::default());
        engine.load_snapshot();
        engine.profile().save_settings(&Settings {
            difficulty: Difficulty::Expert,
            ..Settings::default()
        });

        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let round = engine.start_round(&mut rng).unwrap();
        assert_eq!(round.countries.len(), 12);
        assert_eq!(round.pool.len(), 8);
    }
}
