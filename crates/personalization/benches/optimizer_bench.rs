//! Benchmarks for the budget-constrained optimizer on the reference menu.
//! Run with: cargo bench -p meal-personalization

use meal_core::config::{CompatibilityConfig, VetoPolicy};
use meal_personalization::{BudgetOptimizer, Candidate, CompatibilityMatrix, MenuDefinition};

fn main() {
    let menu = MenuDefinition::reference();
    let catalog = menu.catalog().expect("reference menu is valid");
    let matrix =
        CompatibilityMatrix::from_grouping(&catalog, &menu.rules, &CompatibilityConfig::default())
            .expect("reference rules resolve");
    let candidates: Vec<Candidate> = (0..catalog.len())
        .map(|index| Candidate {
            index,
            value: 5.0 + (index % 7) as f64 * 0.3,
        })
        .collect();

    for policy in [VetoPolicy::Strict, VetoPolicy::PenaltyOnly] {
        let optimizer = BudgetOptimizer::new(&catalog, &matrix, policy);
        for budget in [100u32, 200, 400] {
            // Warmup
            for _ in 0..3 {
                optimizer.optimize(&candidates, budget, 3);
            }

            let iterations = 50;
            let start = std::time::Instant::now();
            let mut selected = 0;
            for _ in 0..iterations {
                selected = optimizer.optimize(&candidates, budget, 3).unit_count();
            }
            let elapsed = start.elapsed();

            println!("=== Optimizer Benchmark ({policy:?}, budget {budget}) ===");
            println!("Iterations:  {}", iterations);
            println!("Total time:  {:?}", elapsed);
            println!("Per call:    {:?}", elapsed / iterations);
            println!("Candidates:  {}", candidates.len());
            println!("Selected:    {} units", selected);
        }
    }
}
