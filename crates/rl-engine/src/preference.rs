//! Preference store: one learned value ("Q-value") per catalog item, moved
//! toward each observed reward by a fixed-rate exponential moving average.

use dashmap::DashMap;
use meal_core::{Catalog, MealError, MealResult};
use std::collections::HashMap;
use tracing::debug;

pub struct PreferenceStore {
    values: DashMap<String, f64>,
    learning_rate: f64,
}

impl PreferenceStore {
    /// Seed every catalog item with `initial_value`.
    pub fn new(catalog: &Catalog, initial_value: f64, learning_rate: f64) -> Self {
        let values = DashMap::with_capacity(catalog.len());
        for item in catalog.items() {
            values.insert(item.id.clone(), initial_value);
        }
        Self {
            values,
            learning_rate,
        }
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn value(&self, item_id: &str) -> MealResult<f64> {
        self.values
            .get(item_id)
            .map(|v| *v)
            .ok_or_else(|| MealError::InvalidItem(item_id.to_string()))
    }

    /// Apply `value += alpha * (reward - value)` and return the new value.
    ///
    /// The entry stays locked for the read-modify-write, so concurrent readers
    /// never observe a half-applied update.
    pub fn update(&self, item_id: &str, reward: f64) -> MealResult<f64> {
        if !reward.is_finite() {
            return Err(MealError::InvalidRating(reward));
        }
        let mut entry = self
            .values
            .get_mut(item_id)
            .ok_or_else(|| MealError::InvalidItem(item_id.to_string()))?;
        let before = *entry;
        let after = before + self.learning_rate * (reward - before);
        *entry = after;
        debug!(item = %item_id, reward, before, after, "preference updated");
        Ok(after)
    }

    pub fn snapshot(&self) -> HashMap<String, f64> {
        self.values
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meal_core::{DietaryTag, Item};

    fn store() -> PreferenceStore {
        let catalog = Catalog::new(vec![
            Item::new("Masala Dosa", 32, DietaryTag::Vegetarian),
            Item::new("Chicken 65", 78, DietaryTag::NonVegetarian),
        ])
        .unwrap();
        PreferenceStore::new(&catalog, 5.0, 0.1)
    }

    #[test]
    fn test_initial_values() {
        let store = store();
        assert_eq!(store.value("Masala Dosa").unwrap(), 5.0);
        assert_eq!(store.value("Chicken 65").unwrap(), 5.0);
    }

    #[test]
    fn test_update_exact_step() {
        let store = store();
        let after = store.update("Masala Dosa", 9.0).unwrap();
        assert_eq!(after, 5.4);
        assert_eq!(store.value("Masala Dosa").unwrap(), 5.4);
        // Other items untouched
        assert_eq!(store.value("Chicken 65").unwrap(), 5.0);
    }

    #[test]
    fn test_update_with_zero_delta_is_noop() {
        let store = store();
        let current = store.value("Chicken 65").unwrap();
        let after = store.update("Chicken 65", current).unwrap();
        assert_eq!(after, current);
    }

    #[test]
    fn test_repeated_feedback_converges_monotonically() {
        let store = store();
        for reward in [9.0, 1.0] {
            for _ in 0..20 {
                let before = store.value("Masala Dosa").unwrap();
                let after = store.update("Masala Dosa", reward).unwrap();
                assert!((after - reward).abs() < (before - reward).abs());
            }
        }
    }

    #[test]
    fn test_unknown_item_rejected_without_mutation() {
        let store = store();
        let before = store.snapshot();
        assert!(matches!(
            store.update("Pizza", 9.0),
            Err(MealError::InvalidItem(_))
        ));
        assert!(store.value("Pizza").is_err());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_non_finite_reward_rejected() {
        let store = store();
        assert!(matches!(
            store.update("Masala Dosa", f64::NAN),
            Err(MealError::InvalidRating(_))
        ));
        assert_eq!(store.value("Masala Dosa").unwrap(), 5.0);
    }
}
