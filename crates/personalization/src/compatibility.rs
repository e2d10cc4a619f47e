//! Pairwise item compatibility: a symmetric score matrix in [-1, 1] built once
//! from grouping rules and read-only afterwards.
//!
//! Rules are applied in list order and later rules overwrite earlier ones for
//! the same pair, so the order returned by [`GroupingRules::to_rules`] is part
//! of the model: substitutes, complements, standalone, cross-diet.

use meal_core::config::CompatibilityConfig;
use meal_core::{Catalog, MealError, MealResult};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Named item groups from which the compatibility rules are derived.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupingRules {
    /// Items that substitute for each other; every pair inside a group is discouraged.
    #[serde(default)]
    pub substitute_groups: Vec<Vec<String>>,
    /// Pairs of groups whose members go well together.
    #[serde(default)]
    pub complementary_groups: Vec<(Vec<String>, Vec<String>)>,
    /// Complete meals on their own.
    #[serde(default)]
    pub standalone_items: Vec<String>,
    /// Core staples a standalone item should not be combined with.
    #[serde(default)]
    pub staple_groups: Vec<Vec<String>>,
}

impl GroupingRules {
    /// Expand the groups into rules in their fixed application order.
    pub fn to_rules(&self, scores: &CompatibilityConfig) -> Vec<CompatibilityRule> {
        let mut rules = Vec::new();
        for group in &self.substitute_groups {
            rules.push(CompatibilityRule::Substitutes {
                group: group.clone(),
                score: scores.substitute_score,
            });
        }
        for (left, right) in &self.complementary_groups {
            rules.push(CompatibilityRule::Complements {
                left: left.clone(),
                right: right.clone(),
                score: scores.complement_score,
            });
        }
        let staples: Vec<String> = self.staple_groups.iter().flatten().cloned().collect();
        for item in &self.standalone_items {
            rules.push(CompatibilityRule::Standalone {
                item: item.clone(),
                staples: staples.clone(),
                score: scores.standalone_score,
            });
        }
        rules.push(CompatibilityRule::CrossDiet {
            score: scores.cross_diet_score,
        });
        rules
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompatibilityRule {
    Substitutes {
        group: Vec<String>,
        score: f64,
    },
    Complements {
        left: Vec<String>,
        right: Vec<String>,
        score: f64,
    },
    Standalone {
        item: String,
        staples: Vec<String>,
        score: f64,
    },
    /// Every vegetarian / non-vegetarian pair.
    CrossDiet {
        score: f64,
    },
}

#[derive(Debug, Clone)]
pub struct CompatibilityMatrix {
    scores: Array2<f64>,
}

impl CompatibilityMatrix {
    /// All pairs neutral (0.0).
    pub fn neutral(size: usize) -> Self {
        Self {
            scores: Array2::zeros((size, size)),
        }
    }

    /// Apply `rules` in order over `catalog`. Unknown identifiers are rejected.
    pub fn from_rules(catalog: &Catalog, rules: &[CompatibilityRule]) -> MealResult<Self> {
        let mut matrix = Self::neutral(catalog.len());

        for rule in rules {
            match rule {
                CompatibilityRule::Substitutes { group, score } => {
                    let members = resolve(catalog, group)?;
                    for (pos, &a) in members.iter().enumerate() {
                        for &b in &members[pos + 1..] {
                            matrix.set(a, b, *score);
                        }
                    }
                }
                CompatibilityRule::Complements { left, right, score } => {
                    let left = resolve(catalog, left)?;
                    let right = resolve(catalog, right)?;
                    for &a in &left {
                        for &b in &right {
                            matrix.set(a, b, *score);
                        }
                    }
                }
                CompatibilityRule::Standalone {
                    item,
                    staples,
                    score,
                } => {
                    let a = resolve_one(catalog, item)?;
                    for b in resolve(catalog, staples)? {
                        matrix.set(a, b, *score);
                    }
                }
                CompatibilityRule::CrossDiet { score } => {
                    let items = catalog.items();
                    for a in 0..items.len() {
                        for b in (a + 1)..items.len() {
                            if items[a].tag != items[b].tag {
                                matrix.set(a, b, *score);
                            }
                        }
                    }
                }
            }
        }

        debug!(
            items = catalog.len(),
            rules = rules.len(),
            negative_pairs = matrix.negative_pair_count(),
            "compatibility matrix built"
        );
        Ok(matrix)
    }

    pub fn from_grouping(
        catalog: &Catalog,
        grouping: &GroupingRules,
        scores: &CompatibilityConfig,
    ) -> MealResult<Self> {
        Self::from_rules(catalog, &grouping.to_rules(scores))
    }

    fn set(&mut self, a: usize, b: usize, score: f64) {
        if a == b {
            return;
        }
        let score = score.clamp(-1.0, 1.0);
        self.scores[[a, b]] = score;
        self.scores[[b, a]] = score;
    }

    pub fn size(&self) -> usize {
        self.scores.nrows()
    }

    /// Relationship between two catalog positions. Self-pairs are neutral.
    pub fn relationship_at(&self, a: usize, b: usize) -> f64 {
        if a == b {
            0.0
        } else {
            self.scores[[a, b]]
        }
    }

    pub fn relationship(&self, catalog: &Catalog, a: &str, b: &str) -> MealResult<f64> {
        Ok(self.relationship_at(catalog.require(a)?, catalog.require(b)?))
    }

    fn negative_pair_count(&self) -> usize {
        let n = self.size();
        (0..n)
            .flat_map(|a| ((a + 1)..n).map(move |b| (a, b)))
            .filter(|&(a, b)| self.scores[[a, b]] < 0.0)
            .count()
    }
}

fn resolve_one(catalog: &Catalog, id: &str) -> MealResult<usize> {
    catalog
        .index_of(id)
        .ok_or_else(|| MealError::InvalidCatalog(format!("rule references unknown item: {id}")))
}

fn resolve(catalog: &Catalog, ids: &[String]) -> MealResult<Vec<usize>> {
    ids.iter().map(|id| resolve_one(catalog, id)).collect()
}
