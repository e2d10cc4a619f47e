use thiserror::Error;

pub type MealResult<T> = Result<T, MealError>;

#[derive(Error, Debug)]
pub enum MealError {
    #[error("Unknown item: {0}")]
    InvalidItem(String),

    #[error("Invalid budget: {0} (must be non-negative)")]
    InvalidBudget(i64),

    #[error("Invalid rating: {0}")]
    InvalidRating(f64),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for MealError {
    fn from(err: config::ConfigError) -> Self {
        MealError::Config(err.to_string())
    }
}
