//! Multi-day meal planning: paces a total budget over several days and runs a
//! full recommendation for each day.

use meal_core::config::PlannerConfig;
use meal_core::{DietaryFilter, MealError, MealResult, SelectionResult};
use meal_rl_engine::SelectionMode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::recommendations::{MealRecommender, RecommendationRequest};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanRequest {
    pub days: u32,
    pub daily_budget: i64,
    #[serde(default)]
    pub likes: Vec<String>,
    #[serde(default)]
    pub dislikes: Vec<String>,
    #[serde(default)]
    pub dietary_filter: DietaryFilter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: u32,
    /// Budget the day was allowed to spend.
    pub day_budget: u32,
    pub mode: SelectionMode,
    pub selection: SelectionResult,
    pub spent: u32,
    /// Spend fell short of `minimum_spend_ratio * daily_budget`.
    pub below_minimum: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlan {
    pub days: Vec<DayPlan>,
    pub total_budget: i64,
    pub remaining_budget: i64,
}

pub struct MealPlanner {
    config: PlannerConfig,
}

impl MealPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// Budget for `day` (1-based): the average of what is left, stretched by
    /// the pacing factor, at least `daily_budget * daily_cap_factor`, and never
    /// more than what remains.
    fn day_budget(&self, remaining: i64, days: u32, day: u32, daily_budget: i64) -> i64 {
        let days_left = f64::from(days.saturating_sub(day) + 1);
        let average = remaining as f64 / days_left;
        let cap = (average * self.config.pacing_factor)
            .max(daily_budget as f64 * self.config.daily_cap_factor);
        (remaining as f64).min(cap).floor() as i64
    }

    pub fn plan(
        &self,
        recommender: &mut MealRecommender,
        request: &PlanRequest,
    ) -> MealResult<MealPlan> {
        if request.daily_budget < 0 {
            return Err(MealError::InvalidBudget(request.daily_budget));
        }
        let total_budget = request
            .daily_budget
            .checked_mul(i64::from(request.days))
            .ok_or(MealError::InvalidBudget(request.daily_budget))?;
        let minimum_spend =
            (self.config.minimum_spend_ratio * request.daily_budget as f64).floor() as u32;
        let mut remaining = total_budget;
        let mut days = Vec::new();

        for day in 1..=request.days {
            let day_budget = self
                .day_budget(remaining, request.days, day, request.daily_budget)
                .min(i64::from(u32::MAX));
            if day_budget <= 0 {
                break;
            }

            let response = recommender.recommend(&RecommendationRequest {
                likes: request.likes.clone(),
                dislikes: request.dislikes.clone(),
                budget: day_budget,
                dietary_filter: request.dietary_filter,
            })?;
            if response.selection.is_empty() {
                debug!(day, day_budget, "nothing affordable, stopping plan");
                break;
            }

            let spent = response.selection.total_cost;
            remaining -= i64::from(spent);
            days.push(DayPlan {
                day,
                day_budget: day_budget as u32,
                mode: response.mode,
                selection: response.selection,
                spent,
                below_minimum: spent < minimum_spend,
            });

            if remaining <= 0 {
                break;
            }
        }

        info!(
            requested_days = request.days,
            planned_days = days.len(),
            total_budget,
            remaining,
            "meal plan built"
        );
        Ok(MealPlan {
            days,
            total_budget,
            remaining_budget: remaining,
        })
    }
}
