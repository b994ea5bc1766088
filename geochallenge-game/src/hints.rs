//! Hint selection policy: tiered rank hints for the current country.
//!
//! Policy constants live in [`crate::constants`]; the assignment engine
//! only ever sees the cost through [`Round::apply_hint`].

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::constants::{HINT_COST, HINT_LIMIT};
use crate::data::Country;
use crate::round::Round;

/// Coarseness bucket a hint reveals about a rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintTier {
    Top10,
    Top20,
    Top50,
    Top100,
    Low,
}

impl HintTier {
    #[must_use]
    pub const fn for_rank(rank: u32) -> Self {
        if rank <= 10 {
            HintTier::Top10
        } else if rank <= 20 {
            HintTier::Top20
        } else if rank <= 50 {
            HintTier::Top50
        } else if rank <= 100 {
            HintTier::Top100
        } else {
            HintTier::Low
        }
    }
}

/// A served hint: the country's standing in one still-open category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    pub category: Category,
    pub tier: HintTier,
    pub rank: u32,
}

/// Candidate hints for the current country: one per open pool category
/// with a published rank, best ranks first. Categories without data never
/// produce a hint.
#[must_use]
pub fn candidate_hints(country: &Country, round: &Round) -> Vec<Hint> {
    let mut hints: Vec<Hint> = round
        .pool
        .iter()
        .copied()
        .filter(|&category| !round.assignments.contains_key(&category))
        .filter_map(|category| {
            let rank = *country.ranks.get(&category)?;
            (rank >= 1).then(|| Hint {
                category,
                tier: HintTier::for_rank(rank),
                rank,
            })
        })
        .collect();
    hints.sort_by_key(|hint| hint.rank);
    hints
}

/// Serve the most useful unused hint and charge the round for it.
/// Returns `None` once the per-round limit is spent or nothing is left to
/// reveal; the round is untouched in that case.
pub fn request_hint(round: &mut Round, country: &Country, used: &mut Vec<Hint>) -> Option<Hint> {
    if round.hint_count >= HINT_LIMIT || round.is_complete() {
        return None;
    }
    let hint = candidate_hints(country, round)
        .into_iter()
        .find(|hint| used.iter().all(|u| u.category != hint.category))?;
    used.push(hint.clone());
    round.apply_hint(HINT_COST);
    Some(hint)
}
