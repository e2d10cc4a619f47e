//! Budget-constrained selection: a 0/1 knapsack over candidate units whose
//! admission depends on what the partial selection already holds.
//!
//! Each candidate is expanded into `max_repeat` consecutive units, so a row of
//! the table stands for one unit and the `i - 1` transition can still pick an
//! item several times. Because a unit's adjusted value depends on the
//! selection it extends, rows keep only a `taken` bit per budget cell; the
//! selection behind any cell is recovered by walking those bits backwards.

use meal_core::config::VetoPolicy;
use meal_core::{Catalog, SelectedItem, SelectionResult};
use tracing::debug;

use crate::compatibility::CompatibilityMatrix;

/// One candidate item: its catalog position and learned value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub index: usize,
    pub value: f64,
}

pub struct BudgetOptimizer<'a> {
    catalog: &'a Catalog,
    compatibility: &'a CompatibilityMatrix,
    policy: VetoPolicy,
}

/// `taken` bits for every (unit row, budget) cell, row-major.
struct TakeTable {
    bits: Vec<bool>,
    width: usize,
}

impl TakeTable {
    fn new(rows: usize, width: usize) -> Self {
        Self {
            bits: vec![false; rows * width],
            width,
        }
    }

    /// `row` is 1-based; row 0 (no units considered) is never taken.
    fn get(&self, row: usize, budget: usize) -> bool {
        row > 0 && self.bits[(row - 1) * self.width + budget]
    }

    fn set(&mut self, row: usize, budget: usize) {
        self.bits[(row - 1) * self.width + budget] = true;
    }
}

impl<'a> BudgetOptimizer<'a> {
    pub fn new(
        catalog: &'a Catalog,
        compatibility: &'a CompatibilityMatrix,
        policy: VetoPolicy,
    ) -> Self {
        Self {
            catalog,
            compatibility,
            policy,
        }
    }

    /// Choose a multiset of `candidates` with total cost `<= budget`, at most
    /// `max_repeat` units per item, maximizing the summed adjusted value.
    ///
    /// Earlier candidates win ties: a cell only changes on strict improvement.
    pub fn optimize(
        &self,
        candidates: &[Candidate],
        budget: u32,
        max_repeat: u32,
    ) -> SelectionResult {
        let units: Vec<Candidate> = candidates
            .iter()
            .flat_map(|c| std::iter::repeat(*c).take(max_repeat as usize))
            .collect();
        // Cells at or above the cost of taking every unit all resolve alike.
        let reachable: u64 = units
            .iter()
            .map(|u| u64::from(self.catalog.item(u.index).cost))
            .sum();
        let budget = u64::from(budget).min(reachable) as u32;
        let width = budget as usize + 1;

        if units.is_empty() || budget == 0 {
            return SelectionResult::empty();
        }

        let mut prev = vec![0.0f64; width];
        let mut cur = vec![0.0f64; width];
        let mut taken = TakeTable::new(units.len(), width);

        for row in 1..=units.len() {
            let unit = units[row - 1];
            let cost = self.catalog.item(unit.index).cost as usize;

            for b in 0..width {
                cur[b] = prev[b];
                if cost > b {
                    continue;
                }
                let Some(adjusted) =
                    self.admit(unit, &units, &taken, row - 1, b - cost, max_repeat)
                else {
                    continue;
                };
                let extended = prev[b - cost] + adjusted;
                if extended > prev[b] {
                    cur[b] = extended;
                    taken.set(row, b);
                }
            }
            std::mem::swap(&mut prev, &mut cur);
        }

        let picked: Vec<usize> =
            walk(&units, &taken, self.catalog, units.len(), budget as usize).collect();
        let result = self.collect(candidates, &picked, max_repeat, prev[budget as usize]);
        debug!(
            candidates = candidates.len(),
            units = units.len(),
            budget,
            total_cost = result.total_cost,
            total_value = result.total_value,
            "selection optimized"
        );
        result
    }

    /// Adjusted value of adding `unit` to the selection behind cell
    /// `(row, budget)`, or `None` when the extension is rejected.
    fn admit(
        &self,
        unit: Candidate,
        units: &[Candidate],
        taken: &TakeTable,
        row: usize,
        budget: usize,
        max_repeat: u32,
    ) -> Option<f64> {
        let mut copies = 0u32;
        let mut penalty = 0.0;
        let mut penalized: Vec<usize> = Vec::new();

        for other in walk(units, taken, self.catalog, row, budget) {
            let other = units[other].index;
            if other == unit.index {
                copies += 1;
                if copies >= max_repeat {
                    return None;
                }
                continue;
            }
            let relationship = self.compatibility.relationship_at(unit.index, other);
            if relationship < 0.0 {
                if self.policy == VetoPolicy::Strict {
                    return None;
                }
                if !penalized.contains(&other) {
                    penalized.push(other);
                    penalty += relationship;
                }
            }
        }

        Some(unit.value + penalty)
    }

    fn collect(
        &self,
        candidates: &[Candidate],
        picked: &[usize],
        max_repeat: u32,
        total_value: f64,
    ) -> SelectionResult {
        let mut counts = vec![0u32; candidates.len()];
        for &unit_row in picked {
            // Units are laid out candidate by candidate.
            counts[unit_row / max_repeat as usize] += 1;
        }

        let items: Vec<SelectedItem> = candidates
            .iter()
            .zip(counts)
            .filter(|(_, quantity)| *quantity > 0)
            .map(|(candidate, quantity)| {
                let item = self.catalog.item(candidate.index);
                SelectedItem {
                    item_id: item.id.clone(),
                    quantity,
                    unit_cost: item.cost,
                }
            })
            .collect();
        let total_cost = items.iter().map(|s| s.unit_cost * s.quantity).sum();

        SelectionResult {
            items,
            total_cost,
            total_value,
        }
    }
}

/// Walks the `taken` bits back from `(row, budget)`, yielding the unit rows
/// (0-based into `units`) of the selection behind that cell, last unit first.
struct Walk<'t> {
    units: &'t [Candidate],
    taken: &'t TakeTable,
    catalog: &'t Catalog,
    row: usize,
    budget: usize,
}

impl Iterator for Walk<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.row > 0 {
            let row = self.row;
            self.row -= 1;
            if self.taken.get(row, self.budget) {
                let unit = row - 1;
                self.budget -= self.catalog.item(self.units[unit].index).cost as usize;
                return Some(unit);
            }
        }
        None
    }
}

fn walk<'t>(
    units: &'t [Candidate],
    taken: &'t TakeTable,
    catalog: &'t Catalog,
    row: usize,
    budget: usize,
) -> Walk<'t> {
    Walk {
        units,
        taken,
        catalog,
        row,
        budget,
    }
}
