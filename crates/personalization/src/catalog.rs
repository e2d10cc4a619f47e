//! Menu definitions: the item table plus the grouping rules that drive the
//! compatibility model. Loaded from JSON or taken from the built-in canteen menu.

use meal_core::{Catalog, DietaryTag, Item, MealResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::compatibility::GroupingRules;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuDefinition {
    pub items: Vec<Item>,
    #[serde(default)]
    pub rules: GroupingRules,
}

impl MenuDefinition {
    pub fn from_json(json: &str) -> MealResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> MealResult<Self> {
        let path = path.as_ref();
        let menu = Self::from_json(&std::fs::read_to_string(path)?)?;
        info!(path = %path.display(), items = menu.items.len(), "menu loaded");
        Ok(menu)
    }

    pub fn catalog(&self) -> MealResult<Catalog> {
        Catalog::new(self.items.clone())
    }

    /// The 40-item canteen menu the recommender ships with.
    pub fn reference() -> Self {
        let items = REFERENCE_ITEMS
            .iter()
            .map(|&(name, cost)| Item::new(name, cost, infer_tag(name)))
            .collect();

        let group = |names: &[&str]| names.iter().map(|n| n.to_string()).collect::<Vec<_>>();
        let breads = group(BREADS);
        let dosas = group(DOSAS);
        let rice = group(RICE);
        let noodles = group(NOODLES);
        let curries = group(CURRIES);
        let starters = group(STARTERS);
        let chaat = group(CHAAT);
        let eggs = group(EGG_PLATES);
        let juices = group(JUICES);

        let rules = GroupingRules {
            substitute_groups: vec![
                breads.clone(),
                dosas.clone(),
                rice.clone(),
                noodles.clone(),
                curries.clone(),
                starters.clone(),
                chaat.clone(),
                eggs,
                juices.clone(),
            ],
            complementary_groups: vec![
                (breads.clone(), curries.clone()),
                (group(&["Plain Rice", "Jeera Rice"]), curries),
                (noodles.clone(), starters),
                (dosas.clone(), juices.clone()),
                (chaat, juices),
            ],
            standalone_items: vec!["North Indian Thali".to_string()],
            staple_groups: vec![breads, rice, dosas, noodles],
        };

        Self { items, rules }
    }
}

/// Egg and chicken dishes are non-vegetarian; everything else is vegetarian.
fn infer_tag(name: &str) -> DietaryTag {
    let lower = name.to_ascii_lowercase();
    if lower.contains("egg") || lower.contains("chicken") {
        DietaryTag::NonVegetarian
    } else {
        DietaryTag::Vegetarian
    }
}

const REFERENCE_ITEMS: &[(&str, u32)] = &[
    ("North Indian Thali", 68),
    ("Phulkha (3 pcs)", 16),
    ("Chapathi (2 pcs)", 14),
    ("Roti", 9),
    ("Naan", 9),
    ("Butter Roti", 14),
    ("Butter Naan", 14),
    ("Uthapam", 24),
    ("Plain Dosa", 21),
    ("Onion Dosa", 27),
    ("Onion Uthapam", 27),
    ("Masala Dosa", 32),
    ("Plain Rice", 21),
    ("Jeera Rice", 34),
    ("Veg Noodles", 45),
    ("Egg Noodles", 63),
    ("Chicken Noodles", 66),
    ("Moong Dhal", 27),
    ("Aloo Pakke Subji", 32),
    ("Black Channa Masala", 39),
    ("Chilly Baby Corn", 43),
    ("Papedi Chat", 21),
    ("Pani Poori", 17),
    ("Dahi Poori", 21),
    ("Veg Rice", 47),
    ("Egg Rice", 61),
    ("Chicken Rice", 76),
    ("Mushroom Rice", 56),
    ("Egg Biryani", 63),
    ("Chicken Biryani", 83),
    ("Chicken 65", 78),
    ("Egg Curry", 23),
    ("Single Egg Curry", 13),
    ("Boiled Eggs", 9),
    ("Scrambled Eggs", 13),
    ("Pepper Chicken", 70),
    ("Chicken Masala", 68),
    ("Chicken Manchurian", 72),
    ("Lemon Juice", 13),
    ("Watermelon Juice", 19),
];

const BREADS: &[&str] = &[
    "Phulkha (3 pcs)",
    "Chapathi (2 pcs)",
    "Roti",
    "Naan",
    "Butter Roti",
    "Butter Naan",
];
const DOSAS: &[&str] = &[
    "Uthapam",
    "Plain Dosa",
    "Onion Dosa",
    "Onion Uthapam",
    "Masala Dosa",
];
const RICE: &[&str] = &[
    "Plain Rice",
    "Jeera Rice",
    "Veg Rice",
    "Egg Rice",
    "Chicken Rice",
    "Mushroom Rice",
    "Egg Biryani",
    "Chicken Biryani",
];
const NOODLES: &[&str] = &["Veg Noodles", "Egg Noodles", "Chicken Noodles"];
const CURRIES: &[&str] = &[
    "Moong Dhal",
    "Aloo Pakke Subji",
    "Black Channa Masala",
    "Egg Curry",
    "Single Egg Curry",
    "Chicken Masala",
];
const STARTERS: &[&str] = &[
    "Chilly Baby Corn",
    "Chicken 65",
    "Pepper Chicken",
    "Chicken Manchurian",
];
const CHAAT: &[&str] = &["Papedi Chat", "Pani Poori", "Dahi Poori"];
const EGG_PLATES: &[&str] = &["Boiled Eggs", "Scrambled Eggs"];
const JUICES: &[&str] = &["Lemon Juice", "Watermelon Juice"];
