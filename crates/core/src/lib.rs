pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{MealError, MealResult};
pub use types::{Catalog, DietaryFilter, DietaryTag, Item, SelectedItem, SelectionResult};
