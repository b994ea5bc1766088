//! Round state and the assignment engine.
//!
//! A round walks an immutable sequence of drawn countries; each user action
//! assigns the current country to a free category, charging that country's
//! world rank as points. Lower is better. Undo restores the previous
//! snapshot atomically and is capped per round.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::category::{Category, CategoryPool};
use crate::constants::{FALLBACK_RANK, MAX_UNDOS};
use crate::data::{CountryCode, Snapshot};
use crate::settings::Settings;

/// One confirmed placement, mirroring assignment order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub category: Category,
    pub country: CountryCode,
    pub country_name: String,
    #[serde(default)]
    pub flag: String,
    pub rank: u32,
}

/// Restorable prior state for the undo stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct UndoFrame {
    current_index: usize,
    assignments: BTreeMap<Category, CountryCode>,
    score: u32,
    results: Vec<Placement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundError {
    #[error("snapshot has {available} countries but the round needs {requested}")]
    InsufficientData { requested: usize, available: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlaceError {
    /// The category is outside the round's pool or already holds a country.
    #[error("category {0} is not open for placement")]
    CategoryUnavailable(Category),
    /// Every country has been placed; the round is immutable.
    #[error("round is already complete")]
    RoundComplete,
}

/// One playthrough from country draw to completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    /// Drawn country codes, fixed at round start.
    pub countries: Vec<CountryCode>,
    /// Categories playable this round, in canonical (or selected) order.
    pub pool: CategoryPool,
    pub current_index: usize,
    /// At most one country per category.
    pub assignments: BTreeMap<Category, CountryCode>,
    pub score: u32,
    pub results: Vec<Placement>,
    history: Vec<UndoFrame>,
    pub undo_count: u32,
    pub max_undos: u32,
    pub hint_count: u32,
    pub hint_penalty: u32,
}

impl Round {
    /// Draw a new round: uniform sampling without replacement over the
    /// snapshot's countries, using the pool and count from the settings.
    ///
    /// # Errors
    ///
    /// Returns [`RoundError::InsufficientData`] when the snapshot holds
    /// fewer countries than the plan requests.
    pub fn select<R: Rng + ?Sized>(
        snapshot: &Snapshot,
        settings: &Settings,
        rng: &mut R,
    ) -> Result<Self, RoundError> {
        let plan = settings.round_plan();
        let mut codes: Vec<CountryCode> = snapshot.countries.keys().cloned().collect();
        if codes.len() < plan.country_count {
            return Err(RoundError::InsufficientData {
                requested: plan.country_count,
                available: codes.len(),
            });
        }
        codes.shuffle(rng);
        codes.truncate(plan.country_count);
        Ok(Self::with_draw(codes, plan.pool))
    }

    /// Build a round over an explicit draw, bypassing sampling. Used by
    /// shells restoring a round and by deterministic tests.
    #[must_use]
    pub fn with_draw(countries: Vec<CountryCode>, pool: CategoryPool) -> Self {
        Self {
            countries,
            pool,
            current_index: 0,
            assignments: BTreeMap::new(),
            score: 0,
            results: Vec::new(),
            history: Vec::new(),
            undo_count: 0,
            max_undos: MAX_UNDOS,
            hint_count: 0,
            hint_penalty: 0,
        }
    }

    /// Whether every country has been consumed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current_index >= self.countries.len()
    }

    /// Country code currently awaiting placement.
    #[must_use]
    pub fn current_country(&self) -> Option<&CountryCode> {
        self.countries.get(self.current_index)
    }

    /// Whether a category can receive the current country.
    #[must_use]
    pub fn is_open(&self, category: Category) -> bool {
        self.pool.contains(&category) && !self.assignments.contains_key(&category)
    }

    /// Assign the current country to `category`, charging its rank.
    ///
    /// # Errors
    ///
    /// Returns [`PlaceError::RoundComplete`] on a terminal round and
    /// [`PlaceError::CategoryUnavailable`] when the category is outside
    /// the pool or already taken. Both are soft conditions for the shell;
    /// state is untouched on error.
    pub fn place(&mut self, category: Category, snapshot: &Snapshot) -> Result<Placement, PlaceError> {
        if self.is_complete() {
            return Err(PlaceError::RoundComplete);
        }
        if !self.is_open(category) {
            return Err(PlaceError::CategoryUnavailable(category));
        }

        self.history.push(UndoFrame {
            current_index: self.current_index,
            assignments: self.assignments.clone(),
            score: self.score,
            results: self.results.clone(),
        });

        let code = self.countries[self.current_index].clone();
        let placement = match snapshot.country(&code) {
            Some(country) => Placement {
                category,
                country: code.clone(),
                country_name: country.name.clone(),
                flag: country.flag.clone(),
                rank: country.rank(category),
            },
            // Drawn code missing from the snapshot: charge the sentinel.
            None => Placement {
                category,
                country: code.clone(),
                country_name: code.clone(),
                flag: String::new(),
                rank: FALLBACK_RANK,
            },
        };

        self.assignments.insert(category, code);
        self.score = self.score.saturating_add(placement.rank);
        self.results.push(placement.clone());
        self.current_index += 1;
        Ok(placement)
    }

    /// Restore the state before the most recent placement. A user-facing
    /// soft limit: past the cap or with nothing to undo this is a no-op
    /// and returns `false`.
    pub fn undo(&mut self) -> bool {
        if self.undo_count >= self.max_undos {
            return false;
        }
        let Some(frame) = self.history.pop() else {
            return false;
        };
        self.current_index = frame.current_index;
        self.assignments = frame.assignments;
        self.score = frame.score;
        self.results = frame.results;
        self.undo_count += 1;
        true
    }

    /// Charge a hint penalty. The selection policy lives in [`crate::hints`];
    /// the engine accepts any cost. No-op once the round is terminal.
    pub fn apply_hint(&mut self, cost: u32) {
        if self.is_complete() {
            return;
        }
        self.score = self.score.saturating_add(cost);
        self.hint_penalty = self.hint_penalty.saturating_add(cost);
        self.hint_count += 1;
    }

    /// Timer-expiry fallback: the first pool category without an
    /// assignment, in pool order. Deterministic so an expiry can never
    /// stall the round.
    #[must_use]
    pub fn first_open_category(&self) -> Option<Category> {
        self.pool
            .iter()
            .copied()
            .find(|&category| !self.assignments.contains_key(&category))
    }

    /// Undo uses still available this round.
    #[must_use]
    pub fn undos_remaining(&self) -> u32 {
        self.max_undos.saturating_sub(self.undo_count)
    }
}
