use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{MealError, MealResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DietaryTag {
    Vegetarian,
    NonVegetarian,
}

/// Dietary restriction supplied with a recommendation request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DietaryFilter {
    #[default]
    Any,
    Vegetarian,
    NonVegetarian,
}

impl DietaryFilter {
    pub fn admits(&self, tag: DietaryTag) -> bool {
        match self {
            DietaryFilter::Any => true,
            DietaryFilter::Vegetarian => tag == DietaryTag::Vegetarian,
            DietaryFilter::NonVegetarian => tag == DietaryTag::NonVegetarian,
        }
    }
}

impl std::str::FromStr for DietaryFilter {
    type Err = MealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "any" => Ok(DietaryFilter::Any),
            "vegetarian" | "veg" => Ok(DietaryFilter::Vegetarian),
            "non_vegetarian" | "non_veg" => Ok(DietaryFilter::NonVegetarian),
            other => Err(MealError::Config(format!("unknown dietary filter: {other}"))),
        }
    }
}

/// A menu item. Immutable once loaded into a [`Catalog`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: String,
    pub cost: u32,
    pub tag: DietaryTag,
}

impl Item {
    pub fn new(id: impl Into<String>, cost: u32, tag: DietaryTag) -> Self {
        Self {
            id: id.into(),
            cost,
            tag,
        }
    }
}

/// Ordered, read-only item table. Catalog order is the tie-breaker wherever
/// two items rank equally.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<Item>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(items: Vec<Item>) -> MealResult<Self> {
        let mut index = HashMap::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            if item.id.trim().is_empty() {
                return Err(MealError::InvalidCatalog(format!(
                    "item at position {idx} has an empty identifier"
                )));
            }
            if item.cost == 0 {
                return Err(MealError::InvalidCatalog(format!(
                    "item {} must have a positive cost",
                    item.id
                )));
            }
            if index.insert(item.id.clone(), idx).is_some() {
                return Err(MealError::InvalidCatalog(format!(
                    "duplicate item identifier: {}",
                    item.id
                )));
            }
        }
        Ok(Self { items, index })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, idx: usize) -> &Item {
        &self.items[idx]
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.index_of(id).map(|idx| &self.items[idx])
    }

    /// Resolve an identifier or fail with [`MealError::InvalidItem`].
    pub fn require(&self, id: &str) -> MealResult<usize> {
        self.index_of(id).ok_or_else(|| MealError::InvalidItem(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectedItem {
    pub item_id: String,
    pub quantity: u32,
    pub unit_cost: u32,
}

/// The multiset chosen by one recommendation call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SelectionResult {
    pub items: Vec<SelectedItem>,
    pub total_cost: u32,
    /// Sum of adjusted values of every selected unit.
    pub total_value: f64,
}

impl SelectionResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn quantity_of(&self, item_id: &str) -> u32 {
        self.items
            .iter()
            .find(|s| s.item_id == item_id)
            .map(|s| s.quantity)
            .unwrap_or(0)
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.quantity_of(item_id) > 0
    }

    /// Every selected unit, in selection order.
    pub fn units(&self) -> impl Iterator<Item = &str> {
        self.items
            .iter()
            .flat_map(|s| std::iter::repeat(s.item_id.as_str()).take(s.quantity as usize))
    }

    pub fn unit_count(&self) -> usize {
        self.items.iter().map(|s| s.quantity as usize).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> Catalog {
        Catalog::new(vec![
            Item::new("Roti", 9, DietaryTag::Vegetarian),
            Item::new("Egg Curry", 23, DietaryTag::NonVegetarian),
        ])
        .unwrap()
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = sample_catalog();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.index_of("Egg Curry"), Some(1));
        assert_eq!(catalog.get("Roti").map(|i| i.cost), Some(9));
        assert!(matches!(
            catalog.require("Pizza"),
            Err(MealError::InvalidItem(id)) if id == "Pizza"
        ));
    }

    #[test]
    fn test_catalog_rejects_duplicates_and_zero_cost() {
        let dup = Catalog::new(vec![
            Item::new("Roti", 9, DietaryTag::Vegetarian),
            Item::new("Roti", 10, DietaryTag::Vegetarian),
        ]);
        assert!(matches!(dup, Err(MealError::InvalidCatalog(_))));

        let free = Catalog::new(vec![Item::new("Water", 0, DietaryTag::Vegetarian)]);
        assert!(matches!(free, Err(MealError::InvalidCatalog(_))));
    }

    #[test]
    fn test_dietary_filter_admits() {
        assert!(DietaryFilter::Any.admits(DietaryTag::NonVegetarian));
        assert!(DietaryFilter::Vegetarian.admits(DietaryTag::Vegetarian));
        assert!(!DietaryFilter::Vegetarian.admits(DietaryTag::NonVegetarian));
        assert!(!DietaryFilter::NonVegetarian.admits(DietaryTag::Vegetarian));
    }

    #[test]
    fn test_dietary_filter_parse() {
        assert_eq!("veg".parse::<DietaryFilter>().unwrap(), DietaryFilter::Vegetarian);
        assert_eq!(
            "non-vegetarian".parse::<DietaryFilter>().unwrap(),
            DietaryFilter::NonVegetarian
        );
        assert!("vegan".parse::<DietaryFilter>().is_err());
    }

    #[test]
    fn test_selection_units() {
        let selection = SelectionResult {
            items: vec![
                SelectedItem {
                    item_id: "Roti".to_string(),
                    quantity: 2,
                    unit_cost: 9,
                },
                SelectedItem {
                    item_id: "Egg Curry".to_string(),
                    quantity: 1,
                    unit_cost: 23,
                },
            ],
            total_cost: 41,
            total_value: 15.0,
        };
        let units: Vec<&str> = selection.units().collect();
        assert_eq!(units, vec!["Roti", "Roti", "Egg Curry"]);
        assert_eq!(selection.unit_count(), 3);
        assert_eq!(selection.quantity_of("Roti"), 2);
        assert!(!selection.contains("Naan"));
    }
}
