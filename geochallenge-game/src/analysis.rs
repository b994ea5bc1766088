//! Reference-score analysis for a round's country draw.
//!
//! Three integers bracket the player's result: an unconstrained lower
//! bound, a greedy feasible best and a greedy feasible worst. The greedy
//! assignments are intentionally not a true optimal bipartite matching;
//! they are the displayed values and must stay stable, tie-breaks
//! included.

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::constants::FALLBACK_RANK;
use crate::data::{CountryCode, Snapshot};

/// Reference scores for one round draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ScoreAnalysis {
    /// Sum of each country's best rank over the pool, ignoring category
    /// exclusivity. A lower bound, not necessarily achievable.
    pub absolute_min: u32,
    /// Greedy best total respecting one country per category.
    pub optimal: u32,
    /// Greedy worst total respecting one country per category.
    pub worst: u32,
}

fn rank_of(snapshot: &Snapshot, code: &str, category: Category) -> u32 {
    snapshot
        .country(code)
        .map_or(FALLBACK_RANK, |country| country.rank(category))
}

/// Greedy pass over `order`: each country claims the open category that
/// minimises (or maximises) its rank. Ties keep the first category
/// encountered in pool order. Countries left without an open category
/// contribute nothing.
fn greedy_total(
    snapshot: &Snapshot,
    order: &[CountryCode],
    pool: &[Category],
    pick_max: bool,
) -> u32 {
    let mut claimed = vec![false; pool.len()];
    let mut total: u32 = 0;
    for code in order {
        let mut chosen: Option<(usize, u32)> = None;
        for (slot, &category) in pool.iter().enumerate() {
            if claimed[slot] {
                continue;
            }
            let rank = rank_of(snapshot, code, category);
            let better = match chosen {
                None => true,
                Some((_, best)) => {
                    if pick_max {
                        rank > best
                    } else {
                        rank < best
                    }
                }
            };
            if better {
                chosen = Some((slot, rank));
            }
        }
        if let Some((slot, rank)) = chosen {
            claimed[slot] = true;
            total = total.saturating_add(rank);
        }
    }
    total
}

/// Compute the reference scores for a round's draw.
#[must_use]
pub fn analyze(snapshot: &Snapshot, countries: &[CountryCode], pool: &[Category]) -> ScoreAnalysis {
    let absolute_min = countries
        .iter()
        .map(|code| {
            pool.iter()
                .map(|&category| rank_of(snapshot, code, category))
                .min()
                .unwrap_or(FALLBACK_RANK)
        })
        .fold(0u32, u32::saturating_add);

    // Best case walks the round order, matching what a flawless player
    // would see at the table.
    let optimal = greedy_total(snapshot, countries, pool, false);

    // Worst case first sorts countries ascending by mean rank over the
    // pool so the blandest countries burn the good categories. The pool
    // length is shared, so sorting by rank sum orders exactly as the
    // mean would; stable sort keeps the draw order on ties.
    let mut by_mean: Vec<CountryCode> = countries.to_vec();
    by_mean.sort_by_key(|code| {
        pool.iter()
            .map(|&category| u64::from(rank_of(snapshot, code, category)))
            .sum::<u64>()
    });
    let worst = greedy_total(snapshot, &by_mean, pool, true);

    ScoreAnalysis {
        absolute_min,
        optimal,
        worst,
    }
}

/// Efficiency shown to the player: the greedy best as a rounded
/// percentage of the actual score. A zero actual score only happens when
/// the optimal is also zero, reported as fully efficient.
#[must_use]
pub fn efficiency(optimal: u32, actual: u32) -> u32 {
    if actual == 0 {
        return 100;
    }
    let pct = f64::from(optimal) / f64::from(actual) * 100.0;
    let rounded = pct.round();
    if rounded >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        rounded as u32
    }
}
