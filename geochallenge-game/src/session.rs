//! Round finalization sequencing.
//!
//! When a round turns terminal the caller runs one synchronous pass:
//! personal-best check, leaderboard and history writes, streak and stat
//! updates, then badge evaluation against the updated statistics. The
//! outcome carries everything the presentation layer shows afterwards.

use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::{ScoreAnalysis, analyze, efficiency};
use crate::badges::{Badge, check_badges};
use crate::data::{CountryCode, Snapshot};
use crate::round::{Placement, Round};
use crate::settings::Difficulty;
use crate::store::{KeyValueStore, Profile};

/// Persisted summary of one completed round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub date: NaiveDate,
    pub difficulty: Difficulty,
    pub score: u32,
    pub optimal_score: u32,
    pub efficiency: u32,
    pub hint_penalty: u32,
    pub hints_used: u32,
    pub undos_used: u32,
    pub duration_ms: u64,
    pub countries: Vec<CountryCode>,
    pub placements: Vec<Placement>,
}

/// Everything the results screen needs after finalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOutcome {
    pub summary: RoundSummary,
    pub analysis: ScoreAnalysis,
    pub new_record: bool,
    /// 1-based leaderboard position, when the round made the board.
    pub leaderboard_position: Option<usize>,
    pub current_streak: u32,
    /// Newly unlocked badges, queued for sequential display.
    pub new_badges: Vec<Badge>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FinalizeError {
    #[error("round still has countries awaiting placement")]
    RoundInProgress,
}

impl RoundSummary {
    /// Derive the persisted summary from a terminal round.
    fn from_round(
        round: &Round,
        analysis: &ScoreAnalysis,
        difficulty: Difficulty,
        duration_ms: u64,
        date: NaiveDate,
    ) -> Self {
        Self {
            date,
            difficulty,
            score: round.score,
            optimal_score: analysis.optimal,
            efficiency: efficiency(analysis.optimal, round.score),
            hint_penalty: round.hint_penalty,
            hints_used: round.hint_count,
            undos_used: round.undo_count,
            duration_ms,
            countries: round.countries.clone(),
            placements: round.results.clone(),
        }
    }
}

/// Run the full finalization sequence for a terminal round.
///
/// # Errors
///
/// Returns [`FinalizeError::RoundInProgress`] when countries are still
/// awaiting placement; nothing is persisted in that case.
pub fn finalize_round<S: KeyValueStore>(
    profile: &Profile<S>,
    round: &Round,
    snapshot: &Snapshot,
    difficulty: Difficulty,
    duration_ms: u64,
    today: NaiveDate,
) -> Result<RoundOutcome, FinalizeError> {
    if !round.is_complete() {
        return Err(FinalizeError::RoundInProgress);
    }

    let analysis = analyze(snapshot, &round.countries, &round.pool);
    let summary = RoundSummary::from_round(round, &analysis, difficulty, duration_ms, today);

    let new_record = profile.save_personal_best(summary.score);
    let leaderboard_position = profile.add_to_leaderboard(summary.score, &round.countries, today);
    profile.push_round_history(&summary);

    let mut stats = profile.stats();
    let current_streak = stats.update_streak(today);
    stats.record_round(&summary);
    profile.save_stats(&stats);

    // Badges see the statistics that already include this round.
    let mut unlocked = profile.unlocked_badges();
    let new_badges = check_badges(&stats, &summary, &mut unlocked);
    if !new_badges.is_empty() {
        profile.save_unlocked_badges(&unlocked);
    }

    debug!(
        "round finalized: score={} optimal={} efficiency={}% new_record={} badges={}",
        summary.score,
        summary.optimal_score,
        summary.efficiency,
        new_record,
        new_badges.len()
    );

    Ok(RoundOutcome {
        summary,
        analysis,
        new_record,
        leaderboard_position,
        current_streak,
        new_badges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::data::Country;
    use crate::settings::Settings;
    use crate::store::MemoryStore;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn snapshot() -> Snapshot {
        let mut snapshot = Snapshot::empty();
        for i in 0..16 {
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
        snapshot
    }

    fn played_round(snapshot: &Snapshot) -> Round {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut round = Round::select(snapshot, &Settings::default(), &mut rng).unwrap();
        while !round.is_complete() {
            let category = round.first_open_category().unwrap();
            round.place(category, snapshot).unwrap();
        }
        round
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 20).unwrap()
    }

    #[test]
    fn finalize_rejects_rounds_in_progress() {
        let snapshot = snapshot();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let round = Round::select(&snapshot, &Settings::default(), &mut rng).unwrap();
        let profile = Profile::new(MemoryStore::default());
        let err =
            finalize_round(&profile, &round, &snapshot, Difficulty::Normal, 0, today()).unwrap_err();
        assert_eq!(err, FinalizeError::RoundInProgress);
        assert!(profile.round_history().is_empty());
        assert_eq!(profile.stats().total_rounds, 0);
    }

    #[test]
    fn finalize_persists_every_ledger() {
        let snapshot = snapshot();
        let round = played_round(&snapshot);
        let profile = Profile::new(MemoryStore::default());

        let outcome = finalize_round(
            &profile,
            &round,
            &snapshot,
            Difficulty::Normal,
            45_000,
            today(),
        )
        .unwrap();

        assert!(outcome.new_record);
        assert_eq!(outcome.leaderboard_position, Some(1));
        assert_eq!(outcome.current_streak, 1);
        assert_eq!(outcome.summary.score, round.score);
        assert!(outcome.new_badges.contains(&Badge::FirstGame));
        assert!(outcome.new_badges.contains(&Badge::SpeedDemon));

        assert_eq!(profile.personal_best(), Some(round.score));
        assert_eq!(profile.leaderboard().len(), 1);
        assert_eq!(profile.round_history().len(), 1);
        assert_eq!(profile.stats().total_rounds, 1);
        assert_eq!(profile.unlocked_badges().len(), outcome.new_badges.len());
    }

    #[test]
    fn second_worse_round_is_not_a_record() {
        let snapshot = snapshot();
        let round = played_round(&snapshot);
        let profile = Profile::new(MemoryStore::default());
        profile.save_personal_best(1);

        let outcome = finalize_round(
            &profile,
            &round,
            &snapshot,
            Difficulty::Normal,
            300_000,
            today(),
        )
        .unwrap();
        assert!(!outcome.new_record);
        assert_eq!(profile.personal_best(), Some(1));
    }

    #[test]
    fn badges_do_not_refire_on_later_rounds() {
        let snapshot = snapshot();
        let round = played_round(&snapshot);
        let profile = Profile::new(MemoryStore::default());

        let first = finalize_round(
            &profile,
            &round,
            &snapshot,
            Difficulty::Normal,
            45_000,
            today(),
        )
        .unwrap();
        let second = finalize_round(
            &profile,
            &round,
            &snapshot,
            Difficulty::Normal,
            45_000,
            today(),
        )
        .unwrap();

        assert!(first.new_badges.contains(&Badge::FirstGame));
        assert!(!second.new_badges.contains(&Badge::FirstGame));
        assert_eq!(profile.stats().total_rounds, 2);
        // Same-day second completion leaves the streak untouched.
        assert_eq!(second.current_streak, 1);
    }

    #[test]
    fn summary_efficiency_matches_analysis() {
        let snapshot = snapshot();
        let round = played_round(&snapshot);
        let profile = Profile::new(MemoryStore::default());
        let outcome = finalize_round(
            &profile,
            &round,
            &snapshot,
            Difficulty::Normal,
            45_000,
            today(),
        )
        .unwrap();

        assert!(outcome.analysis.absolute_min <= outcome.analysis.optimal);
        assert!(outcome.analysis.optimal <= outcome.summary.score);
        assert!(outcome.summary.score <= outcome.analysis.worst);
        assert_eq!(
            outcome.summary.efficiency,
            efficiency(outcome.analysis.optimal, outcome.summary.score)
        );
    }
}
