use serde::Deserialize;
use tracing::debug;

use crate::error::{MealError, MealResult};

/// Root application configuration. Loaded from environment variables
/// with the prefix `MEAL_PLANNER__` and an optional TOML config file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Fixed RNG seed; `None` seeds from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    /// JSON menu definition; `None` uses the built-in reference menu.
    #[serde(default)]
    pub catalog_path: Option<String>,
    #[serde(default)]
    pub learning: LearningConfig,
    #[serde(default)]
    pub exploration: ExplorationConfig,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    #[serde(default)]
    pub compatibility: CompatibilityConfig,
    #[serde(default)]
    pub similarity: SimilarityConfig,
    #[serde(default)]
    pub planner: PlannerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LearningConfig {
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default = "default_initial_value")]
    pub initial_value: f64,
    /// Reward applied to one sampled item after every recommendation.
    #[serde(default = "default_implicit_reward")]
    pub implicit_reward: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExplorationConfig {
    #[serde(default = "default_exploration_rate")]
    pub exploration_rate: f64,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

/// How a negative compatibility between a candidate and the partial
/// selection is treated during the DP transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum VetoPolicy {
    /// Any negative relationship rejects the extension outright.
    #[default]
    Strict,
    /// Negative relationships are summed into the candidate's value instead.
    PenaltyOnly,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptimizerConfig {
    #[serde(default = "default_max_repeat")]
    pub max_repeat: u32,
    #[serde(default)]
    pub veto_policy: VetoPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompatibilityConfig {
    #[serde(default = "default_substitute_score")]
    pub substitute_score: f64,
    #[serde(default = "default_complement_score")]
    pub complement_score: f64,
    #[serde(default = "default_standalone_score")]
    pub standalone_score: f64,
    #[serde(default = "default_cross_diet_score")]
    pub cross_diet_score: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimilarityConfig {
    #[serde(default = "default_similarity_enabled")]
    pub enabled: bool,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlannerConfig {
    #[serde(default = "default_minimum_spend_ratio")]
    pub minimum_spend_ratio: f64,
    #[serde(default = "default_pacing_factor")]
    pub pacing_factor: f64,
    #[serde(default = "default_daily_cap_factor")]
    pub daily_cap_factor: f64,
}

// Default functions
fn default_learning_rate() -> f64 {
    0.1
}
fn default_initial_value() -> f64 {
    5.0
}
fn default_implicit_reward() -> f64 {
    9.0
}
fn default_exploration_rate() -> f64 {
    0.3
}
fn default_history_capacity() -> usize {
    10
}
fn default_max_repeat() -> u32 {
    3
}
fn default_substitute_score() -> f64 {
    -0.7
}
fn default_complement_score() -> f64 {
    0.6
}
fn default_standalone_score() -> f64 {
    -0.8
}
fn default_cross_diet_score() -> f64 {
    -0.4
}
fn default_similarity_enabled() -> bool {
    true
}
fn default_top_n() -> usize {
    3
}
fn default_minimum_spend_ratio() -> f64 {
    0.6
}
fn default_pacing_factor() -> f64 {
    1.2
}
fn default_daily_cap_factor() -> f64 {
    1.5
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: default_learning_rate(),
            initial_value: default_initial_value(),
            implicit_reward: default_implicit_reward(),
        }
    }
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            exploration_rate: default_exploration_rate(),
            history_capacity: default_history_capacity(),
        }
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_repeat: default_max_repeat(),
            veto_policy: VetoPolicy::default(),
        }
    }
}

impl Default for CompatibilityConfig {
    fn default() -> Self {
        Self {
            substitute_score: default_substitute_score(),
            complement_score: default_complement_score(),
            standalone_score: default_standalone_score(),
            cross_diet_score: default_cross_diet_score(),
        }
    }
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            enabled: default_similarity_enabled(),
            top_n: default_top_n(),
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            minimum_spend_ratio: default_minimum_spend_ratio(),
            pacing_factor: default_pacing_factor(),
            daily_cap_factor: default_daily_cap_factor(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            seed: None,
            catalog_path: None,
            learning: LearningConfig::default(),
            exploration: ExplorationConfig::default(),
            optimizer: OptimizerConfig::default(),
            compatibility: CompatibilityConfig::default(),
            similarity: SimilarityConfig::default(),
            planner: PlannerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and an optional config file.
    pub fn load(path: Option<&str>) -> MealResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("MEAL_PLANNER")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        debug!(file = path.unwrap_or("-"), "configuration loaded");
        Ok(config)
    }

    /// Reject values the learning rule and optimizer cannot work with.
    pub fn validate(&self) -> MealResult<()> {
        let alpha = self.learning.learning_rate;
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(MealError::Config(format!(
                "learning.learning_rate must be in (0, 1), got {alpha}"
            )));
        }
        let epsilon = self.exploration.exploration_rate;
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(MealError::Config(format!(
                "exploration.exploration_rate must be in [0, 1], got {epsilon}"
            )));
        }
        if self.exploration.history_capacity == 0 {
            return Err(MealError::Config(
                "exploration.history_capacity must be positive".to_string(),
            ));
        }
        if self.optimizer.max_repeat == 0 {
            return Err(MealError::Config(
                "optimizer.max_repeat must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
