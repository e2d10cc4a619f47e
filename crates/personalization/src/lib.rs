//! Meal personalization: pairwise compatibility, budget-constrained selection,
//! name-similarity companions, and the recommendation orchestrator that ties
//! them to the learning engine.

pub mod catalog;
pub mod compatibility;
pub mod optimizer;
pub mod planner;
pub mod recommendations;
pub mod similarity;

pub use catalog::MenuDefinition;
pub use compatibility::{CompatibilityMatrix, CompatibilityRule, GroupingRules};
pub use optimizer::{BudgetOptimizer, Candidate};
pub use planner::{DayPlan, MealPlan, MealPlanner, PlanRequest};
pub use recommendations::{MealRecommender, RecommendationRequest, RecommendationResponse};
pub use similarity::{NoSimilarity, SimilarityLookup, TfIdfSimilarity};
