//! Meal recommendation orchestrator: candidate selection, budget-constrained
//! optimization, implicit reward, history update, and companion suggestions.

use chrono::{DateTime, Utc};
use meal_core::config::VetoPolicy;
use meal_core::{AppConfig, Catalog, DietaryFilter, MealError, MealResult, SelectionResult};
use meal_rl_engine::{EpsilonGreedySelector, HistoryTracker, PreferenceStore, SelectionMode};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::catalog::MenuDefinition;
use crate::compatibility::CompatibilityMatrix;
use crate::optimizer::{BudgetOptimizer, Candidate};
use crate::similarity::{NoSimilarity, SimilarityLookup, TfIdfSimilarity};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationRequest {
    /// Informational; validated against the catalog but not used for ranking.
    #[serde(default)]
    pub likes: Vec<String>,
    #[serde(default)]
    pub dislikes: Vec<String>,
    pub budget: i64,
    #[serde(default)]
    pub dietary_filter: DietaryFilter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanionSuggestion {
    pub item_id: String,
    pub similar: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub request_id: Uuid,
    pub mode: SelectionMode,
    pub candidate_count: usize,
    pub selection: SelectionResult,
    /// Item that received the implicit reward, if anything was selected.
    pub rewarded_item: Option<String>,
    pub companions: Vec<CompanionSuggestion>,
    pub generated_at: DateTime<Utc>,
}

/// Mutable per-session learning state. Each session owns its own.
pub struct SessionState {
    pub preferences: PreferenceStore,
    pub history: HistoryTracker,
}

impl SessionState {
    pub fn new(catalog: &Catalog, config: &AppConfig) -> Self {
        Self {
            preferences: PreferenceStore::new(
                catalog,
                config.learning.initial_value,
                config.learning.learning_rate,
            ),
            history: HistoryTracker::new(config.exploration.history_capacity),
        }
    }
}

pub struct MealRecommender {
    catalog: Arc<Catalog>,
    compatibility: Arc<CompatibilityMatrix>,
    similarity: Arc<dyn SimilarityLookup>,
    state: SessionState,
    selector: EpsilonGreedySelector,
    max_repeat: u32,
    veto_policy: VetoPolicy,
    implicit_reward: f64,
    companion_count: usize,
    rng: StdRng,
    config: AppConfig,
}

impl MealRecommender {
    pub fn new(
        catalog: Arc<Catalog>,
        compatibility: Arc<CompatibilityMatrix>,
        similarity: Arc<dyn SimilarityLookup>,
        config: &AppConfig,
    ) -> MealResult<Self> {
        config.validate()?;
        Ok(Self::assemble(catalog, compatibility, similarity, config))
    }

    fn assemble(
        catalog: Arc<Catalog>,
        compatibility: Arc<CompatibilityMatrix>,
        similarity: Arc<dyn SimilarityLookup>,
        config: &AppConfig,
    ) -> Self {
        let state = SessionState::new(&catalog, config);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            catalog,
            compatibility,
            similarity,
            state,
            selector: EpsilonGreedySelector::new(config.exploration.exploration_rate),
            max_repeat: config.optimizer.max_repeat,
            veto_policy: config.optimizer.veto_policy,
            implicit_reward: config.learning.implicit_reward,
            companion_count: if config.similarity.enabled {
                config.similarity.top_n
            } else {
                0
            },
            rng,
            config: config.clone(),
        }
    }

    /// Build a recommender from a menu: catalog, compatibility model, and
    /// (when enabled) the TF-IDF companion lookup.
    pub fn from_menu(menu: &MenuDefinition, config: &AppConfig) -> MealResult<Self> {
        config.validate()?;
        let catalog = menu.catalog()?;
        let compatibility =
            CompatibilityMatrix::from_grouping(&catalog, &menu.rules, &config.compatibility)?;
        let similarity: Arc<dyn SimilarityLookup> = if config.similarity.enabled {
            Arc::new(TfIdfSimilarity::from_catalog(&catalog))
        } else {
            Arc::new(NoSimilarity)
        };
        info!(
            items = catalog.len(),
            exploration_rate = config.exploration.exploration_rate,
            max_repeat = config.optimizer.max_repeat,
            seeded = config.seed.is_some(),
            "meal recommender ready"
        );
        Self::new(
            Arc::new(catalog),
            Arc::new(compatibility),
            similarity,
            config,
        )
    }

    /// Like [`Self::from_menu`], reading the menu from `config.catalog_path`
    /// or falling back to the reference menu.
    pub fn from_config(config: &AppConfig) -> MealResult<Self> {
        let menu = match &config.catalog_path {
            Some(path) => MenuDefinition::load(path)?,
            None => MenuDefinition::reference(),
        };
        Self::from_menu(&menu, config)
    }

    /// Start a fresh session with this recommender's settings over the same
    /// catalog, compatibility model, and similarity lookup.
    pub fn new_session(&self) -> Self {
        Self::assemble(
            self.catalog.clone(),
            self.compatibility.clone(),
            self.similarity.clone(),
            &self.config,
        )
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn compatibility(&self) -> &CompatibilityMatrix {
        &self.compatibility
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn preference(&self, item_id: &str) -> MealResult<f64> {
        self.state.preferences.value(item_id)
    }

    pub fn similar_items(&self, item_id: &str, top_n: usize) -> MealResult<Vec<String>> {
        self.catalog.require(item_id)?;
        Ok(self.similarity.similar_items(item_id, top_n))
    }

    pub fn recommend(
        &mut self,
        request: &RecommendationRequest,
    ) -> MealResult<RecommendationResponse> {
        if request.budget < 0 {
            return Err(MealError::InvalidBudget(request.budget));
        }
        let budget =
            u32::try_from(request.budget).map_err(|_| MealError::InvalidBudget(request.budget))?;
        for id in request.likes.iter().chain(&request.dislikes) {
            self.catalog.require(id)?;
        }
        metrics::counter!("recommendations.requests").increment(1);

        let dislikes: HashSet<String> = request.dislikes.iter().cloned().collect();
        let candidates = self.selector.select(
            &self.catalog,
            &self.state.preferences,
            &mut self.state.history,
            &dislikes,
            request.dietary_filter,
            &mut self.rng,
        )?;
        match candidates.mode {
            SelectionMode::Exploit => metrics::counter!("recommendations.exploit").increment(1),
            _ => metrics::counter!("recommendations.explore").increment(1),
        }

        let mut scored = Vec::with_capacity(candidates.items.len());
        for id in &candidates.items {
            scored.push(Candidate {
                index: self.catalog.require(id)?,
                value: self.state.preferences.value(id)?,
            });
        }

        let selection = BudgetOptimizer::new(&self.catalog, &self.compatibility, self.veto_policy)
            .optimize(&scored, budget, self.max_repeat);

        let rewarded_item = self.apply_implicit_reward(&selection)?;
        self.state.history.record(selection.units());

        let companions = self.companions(&selection);

        if selection.is_empty() {
            metrics::counter!("recommendations.empty").increment(1);
        }
        info!(
            mode = ?candidates.mode,
            candidates = candidates.items.len(),
            budget,
            selected = selection.unit_count(),
            total_cost = selection.total_cost,
            rewarded = rewarded_item.as_deref().unwrap_or("-"),
            "recommendation served"
        );

        Ok(RecommendationResponse {
            request_id: Uuid::new_v4(),
            mode: candidates.mode,
            candidate_count: candidates.items.len(),
            selection,
            rewarded_item,
            companions,
            generated_at: Utc::now(),
        })
    }

    /// Explicit user rating for one item. Returns the updated preference value.
    pub fn feedback(&mut self, item_id: &str, rating: f64) -> MealResult<f64> {
        let value = self.state.preferences.update(item_id, rating)?;
        metrics::counter!("feedback.applied").increment(1);
        debug!(item = %item_id, rating, value, "feedback applied");
        Ok(value)
    }

    /// Implicit positive feedback on one selected item, sampled uniformly.
    fn apply_implicit_reward(&mut self, selection: &SelectionResult) -> MealResult<Option<String>> {
        let Some(chosen) = selection.items.choose(&mut self.rng) else {
            return Ok(None);
        };
        self.state
            .preferences
            .update(&chosen.item_id, self.implicit_reward)?;
        Ok(Some(chosen.item_id.clone()))
    }

    fn companions(&self, selection: &SelectionResult) -> Vec<CompanionSuggestion> {
        if self.companion_count == 0 {
            return Vec::new();
        }
        selection
            .items
            .iter()
            .map(|selected| CompanionSuggestion {
                item_id: selected.item_id.clone(),
                similar: self
                    .similarity
                    .similar_items(&selected.item_id, self.companion_count),
            })
            .collect()
    }
}
