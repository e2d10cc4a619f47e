//! End-to-end recommendation flow against the reference canteen menu.

#[cfg(test)]
mod tests {
    use meal_core::{AppConfig, DietaryFilter, DietaryTag, SelectionResult};
    use meal_personalization::{
        MealPlanner, MealRecommender, MenuDefinition, PlanRequest, RecommendationRequest,
    };

    fn config(seed: u64) -> AppConfig {
        AppConfig {
            seed: Some(seed),
            ..Default::default()
        }
    }

    fn recommender(seed: u64) -> MealRecommender {
        MealRecommender::from_menu(&MenuDefinition::reference(), &config(seed)).unwrap()
    }

    /// Checks every selection invariant against the recommender's own model.
    fn assert_valid(
        recommender: &MealRecommender,
        request: &RecommendationRequest,
        selection: &SelectionResult,
    ) {
        let catalog = recommender.catalog();
        assert!(i64::from(selection.total_cost) <= request.budget);

        let mut cost = 0;
        for selected in &selection.items {
            let item = catalog.get(&selected.item_id).unwrap();
            assert!(selected.quantity >= 1 && selected.quantity <= 3);
            assert!(!request.dislikes.contains(&selected.item_id));
            assert!(request.dietary_filter.admits(item.tag));
            cost += item.cost * selected.quantity;
        }
        assert_eq!(cost, selection.total_cost);

        for a in &selection.items {
            for b in &selection.items {
                if a.item_id != b.item_id {
                    let r = recommender
                        .compatibility()
                        .relationship(catalog, &a.item_id, &b.item_id)
                        .unwrap();
                    assert!(r >= 0.0, "{} conflicts with {}", a.item_id, b.item_id);
                }
            }
        }
    }

    #[test]
    fn test_reference_harness_cases() {
        let mut recommender = recommender(42);
        let cases = [
            ("Chicken Biryani", "Boiled Eggs", 200),
            ("Veg Noodles", "Egg Curry", 150),
            ("Masala Dosa", "Chicken 65", 100),
        ];

        for (liked, disliked, budget) in cases {
            let request = RecommendationRequest {
                likes: vec![liked.to_string()],
                dislikes: vec![disliked.to_string()],
                budget,
                dietary_filter: DietaryFilter::Any,
            };
            let response = recommender.recommend(&request).unwrap();
            assert!(!response.selection.is_empty());
            assert!(!response.selection.contains(disliked));
            assert_valid(&recommender, &request, &response.selection);

            let rewarded = response.rewarded_item.unwrap();
            assert!(response.selection.contains(&rewarded));
            assert!(recommender.preference(&rewarded).unwrap() > 5.0);
        }
    }

    #[test]
    fn test_many_rounds_keep_invariants() {
        let mut recommender = recommender(7);
        let filters = [
            DietaryFilter::Any,
            DietaryFilter::Vegetarian,
            DietaryFilter::NonVegetarian,
        ];

        for round in 0..60i64 {
            let request = RecommendationRequest {
                likes: vec![],
                dislikes: vec!["Roti".to_string()],
                budget: (round * 7) % 180,
                dietary_filter: filters[(round % 3) as usize],
            };
            let response = recommender.recommend(&request).unwrap();
            assert_valid(&recommender, &request, &response.selection);
            assert!(recommender.state().history.len() <= 10);
        }
    }

    #[test]
    fn test_vegetarian_filter() {
        let mut recommender = recommender(3);
        let request = RecommendationRequest {
            budget: 150,
            dietary_filter: DietaryFilter::Vegetarian,
            ..Default::default()
        };
        let response = recommender.recommend(&request).unwrap();
        for selected in &response.selection.items {
            let item = recommender.catalog().get(&selected.item_id).unwrap();
            assert_eq!(item.tag, DietaryTag::Vegetarian);
        }
    }

    #[test]
    fn test_identical_seeds_produce_identical_runs() {
        let run = |seed: u64| {
            let mut recommender = recommender(seed);
            (0..10)
                .map(|i| {
                    recommender
                        .recommend(&RecommendationRequest {
                            budget: 60 + i * 15,
                            ..Default::default()
                        })
                        .unwrap()
                        .selection
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(run(99), run(99));
    }

    #[test]
    fn test_feedback_steers_exploitation() {
        let mut config = config(11);
        config.exploration.exploration_rate = 0.0;
        let mut recommender =
            MealRecommender::from_menu(&MenuDefinition::reference(), &config).unwrap();
        for _ in 0..30 {
            recommender.feedback("Masala Dosa", 100.0).unwrap();
        }

        let response = recommender
            .recommend(&RecommendationRequest {
                budget: 32,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(response.selection.quantity_of("Masala Dosa"), 1);
        assert_eq!(response.selection.total_cost, 32);
    }

    #[test]
    fn test_three_day_plan() {
        let config = config(5);
        let mut recommender =
            MealRecommender::from_menu(&MenuDefinition::reference(), &config).unwrap();
        let plan = MealPlanner::new(config.planner.clone())
            .plan(
                &mut recommender,
                &PlanRequest {
                    days: 3,
                    daily_budget: 120,
                    dislikes: vec!["Boiled Eggs".to_string()],
                    ..Default::default()
                },
            )
            .unwrap();

        let spent: i64 = plan.days.iter().map(|d| i64::from(d.spent)).sum();
        assert!(spent <= 360);
        assert_eq!(plan.remaining_budget, 360 - spent);
        for day in &plan.days {
            assert!(!day.selection.contains("Boiled Eggs"));
        }
    }
}
