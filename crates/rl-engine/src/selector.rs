//! Epsilon-greedy candidate selection over the catalog.
//!
//! One uniform draw per call decides the branch: below the exploration rate we
//! return eligible items the user has not been shown recently, in random order;
//! otherwise we return every eligible item ranked by learned preference.

use meal_core::{Catalog, DietaryFilter, MealResult};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::history::HistoryTracker;
use crate::preference::PreferenceStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    Explore,
    /// Exploration found nothing outside the history, so the history was reset.
    ExploreAfterReset,
    Exploit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSet {
    pub mode: SelectionMode,
    pub items: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct EpsilonGreedySelector {
    exploration_rate: f64,
}

impl EpsilonGreedySelector {
    pub fn new(exploration_rate: f64) -> Self {
        Self {
            exploration_rate: exploration_rate.clamp(0.0, 1.0),
        }
    }

    pub fn exploration_rate(&self) -> f64 {
        self.exploration_rate
    }

    /// Produce the ordered candidate list for one recommendation.
    ///
    /// Every returned item passes `filter` and is absent from `dislikes`.
    pub fn select<R: Rng>(
        &self,
        catalog: &Catalog,
        preferences: &PreferenceStore,
        history: &mut HistoryTracker,
        dislikes: &HashSet<String>,
        filter: DietaryFilter,
        rng: &mut R,
    ) -> MealResult<CandidateSet> {
        let eligible: Vec<&str> = catalog
            .items()
            .iter()
            .filter(|item| filter.admits(item.tag) && !dislikes.contains(&item.id))
            .map(|item| item.id.as_str())
            .collect();

        if rng.gen::<f64>() < self.exploration_rate {
            let mut mode = SelectionMode::Explore;
            let mut fresh: Vec<String> = eligible
                .iter()
                .filter(|id| !history.contains(id))
                .map(|id| id.to_string())
                .collect();

            if fresh.is_empty() && !eligible.is_empty() {
                debug!(history = history.len(), "exploration exhausted, resetting history");
                metrics::counter!("history.resets").increment(1);
                history.clear();
                fresh = eligible.iter().map(|id| id.to_string()).collect();
                mode = SelectionMode::ExploreAfterReset;
            }

            fresh.shuffle(rng);
            return Ok(CandidateSet { mode, items: fresh });
        }

        let mut ranked = Vec::with_capacity(eligible.len());
        for id in eligible {
            ranked.push((id, preferences.value(id)?));
        }
        // Stable: equal values keep catalog order.
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Ok(CandidateSet {
            mode: SelectionMode::Exploit,
            items: ranked.into_iter().map(|(id, _)| id.to_string()).collect(),
        })
    }
}
