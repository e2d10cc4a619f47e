//! Meal Planner: budget-aware meal recommendations that learn from feedback.
//!
//! Command-line entry point: loads configuration, builds the recommender, and
//! prints recommendations, multi-day plans, or similar items as JSON.

use anyhow::Context;
use clap::{Parser, Subcommand};
use meal_core::config::AppConfig;
use meal_core::DietaryFilter;
use meal_personalization::{MealPlanner, MealRecommender, PlanRequest, RecommendationRequest};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "meal-planner")]
#[command(about = "Budget-constrained meal recommendations with online preference learning")]
#[command(version)]
struct Cli {
    /// TOML config file (environment variables with MEAL_PLANNER__ still apply)
    #[arg(long)]
    config: Option<String>,

    /// RNG seed for reproducible recommendations (overrides config)
    #[arg(long, env = "MEAL_PLANNER__SEED")]
    seed: Option<u64>,

    /// JSON menu definition (overrides config; default is the built-in menu)
    #[arg(long, env = "MEAL_PLANNER__CATALOG_PATH")]
    catalog: Option<String>,

    /// Exploration rate in [0, 1] (overrides config)
    #[arg(long)]
    exploration_rate: Option<f64>,

    /// Maximum units of one item per selection (overrides config)
    #[arg(long)]
    max_repeat: Option<u32>,

    /// Ratings applied before the command runs, as "item=rating" (repeatable)
    #[arg(long = "feedback", value_name = "ITEM=RATING")]
    feedback: Vec<String>,

    /// Emit logs as JSON
    #[arg(long, default_value_t = false)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Recommend a set of items within a budget
    Recommend {
        /// Budget in whole currency units
        #[arg(short, long)]
        budget: i64,

        #[command(flatten)]
        filters: Filters,

        /// Number of consecutive recommendations in this session
        #[arg(long, default_value_t = 1)]
        rounds: u32,
    },

    /// Spread a daily budget over several days
    Plan {
        #[arg(short, long)]
        days: u32,

        #[arg(long)]
        daily_budget: i64,

        #[command(flatten)]
        filters: Filters,
    },

    /// List items with similar names
    Similar {
        #[arg(short, long)]
        item: String,

        #[arg(long, default_value_t = 3)]
        top_n: usize,
    },
}

#[derive(clap::Args, Debug)]
struct Filters {
    /// Comma-separated liked items
    #[arg(long, value_delimiter = ',')]
    likes: Vec<String>,

    /// Comma-separated disliked items
    #[arg(long, value_delimiter = ',')]
    dislikes: Vec<String>,

    /// any, vegetarian, or non_vegetarian
    #[arg(long, default_value = "any")]
    diet: String,
}

impl Filters {
    fn dietary_filter(&self) -> anyhow::Result<DietaryFilter> {
        Ok(self.diet.parse()?)
    }
}

fn parse_feedback(raw: &str) -> anyhow::Result<(String, f64)> {
    let (item, rating) = raw
        .rsplit_once('=')
        .with_context(|| format!("feedback must look like ITEM=RATING, got {raw:?}"))?;
    let rating: f64 = rating
        .trim()
        .parse()
        .with_context(|| format!("invalid rating in {raw:?}"))?;
    Ok((item.trim().to_string(), rating))
}

/// An explicit config file must load; without one, environment problems fall
/// back to defaults.
fn load_config(path: Option<&str>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(Some(path))
            .with_context(|| format!("failed to load config file {path}")),
        None => Ok(AppConfig::load(None).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            AppConfig::default()
        })),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing (stderr, so stdout stays machine-readable)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "meal_planner=info,meal_personalization=info".into());
    if cli.json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    // Load configuration
    let mut config = load_config(cli.config.as_deref())?;

    // Apply CLI overrides
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(path) = cli.catalog.clone() {
        config.catalog_path = Some(path);
    }
    if let Some(rate) = cli.exploration_rate {
        config.exploration.exploration_rate = rate;
    }
    if let Some(max_repeat) = cli.max_repeat {
        config.optimizer.max_repeat = max_repeat;
    }
    config.validate()?;

    info!(
        seed = ?config.seed,
        catalog = config.catalog_path.as_deref().unwrap_or("reference"),
        exploration_rate = config.exploration.exploration_rate,
        max_repeat = config.optimizer.max_repeat,
        "Configuration loaded"
    );

    let mut recommender = MealRecommender::from_config(&config)?;

    for raw in &cli.feedback {
        let (item, rating) = parse_feedback(raw)?;
        let value = recommender.feedback(&item, rating)?;
        info!(item = %item, rating, value, "Applied feedback");
    }

    match cli.command {
        Commands::Recommend {
            budget,
            filters,
            rounds,
        } => {
            let request = RecommendationRequest {
                likes: filters.likes.clone(),
                dislikes: filters.dislikes.clone(),
                budget,
                dietary_filter: filters.dietary_filter()?,
            };
            let mut responses = Vec::with_capacity(rounds as usize);
            for _ in 0..rounds {
                responses.push(recommender.recommend(&request)?);
            }
            print_json(&responses)?;
        }
        Commands::Plan {
            days,
            daily_budget,
            filters,
        } => {
            let request = PlanRequest {
                days,
                daily_budget,
                likes: filters.likes.clone(),
                dislikes: filters.dislikes.clone(),
                dietary_filter: filters.dietary_filter()?,
            };
            let plan = MealPlanner::new(config.planner.clone()).plan(&mut recommender, &request)?;
            print_json(&plan)?;
        }
        Commands::Similar { item, top_n } => {
            let similar = recommender.similar_items(&item, top_n)?;
            print_json(&similar)?;
        }
    }

    Ok(())
}
