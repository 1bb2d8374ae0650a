//! Tests for nutrition plan computation
//!
//! Covers target resolution, density-proportional allocation, portion
//! conversion, global rescaling and per-category rounding.

use proptest::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};
use shared::planner::{
    allocate, category_sub_target, macro_density, portion_grams, round_portion, scaled_portions,
    VEGETABLE_CAP_GRAMS,
};
use shared::{
    compute_nutrition_plan, resolve_macro_targets, MacroBreakdown, MacroCategory, MacroTarget,
    PlanError, PlanSummary, SelectedFood,
};
use uuid::Uuid;

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn breakdown(protein: &str, carbs: &str, fats: &str) -> MacroBreakdown {
    MacroBreakdown {
        id: Uuid::new_v4(),
        goal_type: "Maintenance".to_string(),
        protein_pct: dec(protein),
        carbs_pct: dec(carbs),
        fats_pct: dec(fats),
    }
}

fn target_2000() -> MacroTarget {
    resolve_macro_targets(dec("2000"), &breakdown("30", "40", "30")).unwrap()
}

fn food(
    name: &str,
    category: MacroCategory,
    calories: &str,
    protein: &str,
    carbs: &str,
    fats: &str,
) -> SelectedFood {
    SelectedFood {
        food_id: Uuid::new_v4(),
        group_id: Uuid::new_v4(),
        name: name.to_string(),
        category,
        calories_per_100g: dec(calories),
        protein_per_100g: dec(protein),
        carbs_per_100g: dec(carbs),
        fats_per_100g: dec(fats),
        reference_grams: dec("100"),
    }
}

fn chicken() -> SelectedFood {
    food("Chicken Breast", MacroCategory::Protein, "165", "31", "0", "3.6")
}

fn rice() -> SelectedFood {
    food("Jasmine Rice", MacroCategory::Carb, "130", "2.7", "28", "0.3")
}

fn banana() -> SelectedFood {
    food("Banana", MacroCategory::Fruit, "89", "1.1", "23", "0.3")
}

fn broccoli() -> SelectedFood {
    food("Broccoli", MacroCategory::Vegetable, "34", "2.8", "7", "0.4")
}

// =============================================================================
// Target resolution
// =============================================================================

mod macro_targets {
    use super::*;

    #[test]
    fn maintenance_split_at_2000_kcal() {
        let target = target_2000();
        assert_eq!(target.protein_grams, dec("150"));
        assert_eq!(target.carb_grams, dec("200"));
        // 2000 * 0.30 / 9 = 66.67
        assert_eq!(target.fat_grams, dec("67"));
    }

    #[test]
    fn fat_loss_split() {
        let target = resolve_macro_targets(dec("1800"), &breakdown("40", "30", "30")).unwrap();
        assert_eq!(target.protein_grams, dec("180"));
        assert_eq!(target.carb_grams, dec("135"));
        assert_eq!(target.fat_grams, dec("60"));
    }

    #[test]
    fn non_positive_target_rejected() {
        assert_eq!(
            resolve_macro_targets(Decimal::ZERO, &breakdown("30", "40", "30")),
            Err(PlanError::InvalidCalorieTarget(Decimal::ZERO))
        );
        assert!(resolve_macro_targets(dec("-500"), &breakdown("30", "40", "30")).is_err());
    }

    #[test]
    fn percentages_must_total_100() {
        let err = resolve_macro_targets(dec("2000"), &breakdown("30", "40", "40")).unwrap_err();
        assert_eq!(err, PlanError::InvalidMacroPercentages { total: dec("110") });
    }

    #[test]
    fn small_percentage_drift_tolerated() {
        assert!(resolve_macro_targets(dec("2000"), &breakdown("33.3", "33.3", "33.3")).is_ok());
    }

    #[test]
    fn negative_percentage_rejected() {
        assert!(resolve_macro_targets(dec("2000"), &breakdown("-10", "80", "30")).is_err());
    }
}

// =============================================================================
// Density and allocation
// =============================================================================

mod allocation {
    use super::*;

    #[test]
    fn protein_foods_score_on_protein() {
        let density = macro_density(&chicken());
        assert_eq!(density, dec("31") / dec("165"));
    }

    #[test]
    fn carbohydrate_foods_score_on_carbs() {
        assert_eq!(macro_density(&banana()), dec("23") / dec("89"));
    }

    #[test]
    fn zero_calorie_food_scores_zero() {
        let water = food("Water", MacroCategory::Fruit, "0", "0", "0", "0");
        assert_eq!(macro_density(&water), Decimal::ZERO);
    }

    #[test]
    fn carbohydrate_target_split_70_20_10() {
        let target = target_2000();
        assert_eq!(category_sub_target(MacroCategory::Protein, &target), dec("150"));
        assert_eq!(category_sub_target(MacroCategory::Carb, &target), dec("140"));
        assert_eq!(category_sub_target(MacroCategory::Fruit, &target), dec("40"));
        assert_eq!(category_sub_target(MacroCategory::Vegetable, &target), dec("20"));
    }

    #[test]
    fn category_share_is_proportional_to_density() {
        let a = food("Tofu", MacroCategory::Protein, "100", "10", "2", "5");
        let b = food("Tempeh", MacroCategory::Protein, "100", "30", "9", "11");
        let foods = vec![a, b];
        let allocations = allocate(&target_2000(), &foods);

        // densities 0.1 and 0.3 share 150 g as 1:3
        assert_eq!(allocations.len(), 2);
        assert_eq!(allocations[0].allocated_grams, dec("37.5"));
        assert_eq!(allocations[1].allocated_grams, dec("112.5"));
    }

    #[test]
    fn zero_density_category_left_out() {
        let foods = vec![
            chicken(),
            food("Diet Jelly", MacroCategory::Fruit, "0", "0", "0", "0"),
        ];
        let allocations = allocate(&target_2000(), &foods);
        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].food.category, MacroCategory::Protein);
    }

    #[test]
    fn missing_category_does_not_change_others() {
        let with_fruit = vec![chicken(), rice(), banana()];
        let without_fruit = vec![chicken(), rice()];
        let target = target_2000();

        let grams = |foods: &[SelectedFood], name: &str| {
            allocate(&target, foods)
                .into_iter()
                .find(|a| a.food.name == name)
                .map(|a| a.allocated_grams)
        };
        assert_eq!(grams(&with_fruit, "Jasmine Rice"), grams(&without_fruit, "Jasmine Rice"));
        assert_eq!(grams(&with_fruit, "Chicken Breast"), grams(&without_fruit, "Chicken Breast"));
    }
}

// =============================================================================
// Portion conversion and rounding
// =============================================================================

mod portions {
    use super::*;

    #[test]
    fn allocated_protein_to_grams() {
        let lean = food("Lean Fish", MacroCategory::Protein, "150", "25", "0", "5");
        // 150 / (25 / 100) = 600
        assert_eq!(portion_grams(&lean, dec("150")), dec("600"));
        assert_eq!(round_portion(MacroCategory::Protein, dec("600")), dec("600"));
    }

    #[test]
    fn no_driving_macro_falls_back_to_reference_portion() {
        let mut oil = food("Olive Oil", MacroCategory::Carb, "884", "0", "0", "100");
        oil.reference_grams = dec("15");
        assert_eq!(portion_grams(&oil, dec("40")), dec("15"));
    }

    #[test]
    fn protein_and_carb_round_to_50g() {
        assert_eq!(round_portion(MacroCategory::Protein, dec("224.9")), dec("200"));
        assert_eq!(round_portion(MacroCategory::Protein, dec("225")), dec("250"));
        assert_eq!(round_portion(MacroCategory::Carb, dec("512")), dec("500"));
    }

    #[test]
    fn fruit_and_vegetable_round_to_10g() {
        assert_eq!(round_portion(MacroCategory::Fruit, dec("174")), dec("170"));
        assert_eq!(round_portion(MacroCategory::Fruit, dec("175")), dec("180"));
        assert_eq!(round_portion(MacroCategory::Vegetable, dec("86")), dec("90"));
    }

    #[test]
    fn vegetables_capped() {
        assert_eq!(round_portion(MacroCategory::Vegetable, dec("612")), VEGETABLE_CAP_GRAMS);
        assert_eq!(round_portion(MacroCategory::Fruit, dec("612")), dec("610"));
    }

    #[test]
    fn tiny_portions_round_to_zero() {
        assert_eq!(round_portion(MacroCategory::Protein, dec("20")), Decimal::ZERO);
    }
}

// =============================================================================
// Full plan
// =============================================================================

mod full_plan {
    use super::*;

    #[test]
    fn single_protein_food_scaled_to_target() {
        let lean = food("Lean Fish", MacroCategory::Protein, "150", "25", "0", "5");
        let plan = compute_nutrition_plan(&target_2000(), &[lean]);

        // 600 g carries 900 kcal; scaled by 2000/900 to 1333.3 g, rounded to 1350 g
        assert!(plan.is_computed());
        assert_eq!(plan.foods.len(), 1);
        assert_eq!(plan.foods[0].portion_grams, dec("1350"));
        assert_eq!(plan.foods[0].calories, dec("2025"));
        assert_eq!(plan.foods[0].protein, dec("337.5"));
    }

    #[test]
    fn rows_ordered_by_category_then_name() {
        let beef = food("Beef", MacroCategory::Protein, "250", "26", "0", "15");
        let foods = vec![broccoli(), banana(), rice(), chicken(), beef];
        let plan = compute_nutrition_plan(&target_2000(), &foods);

        let names: Vec<&str> = plan.foods.iter().map(|f| f.food_name.as_str()).collect();
        assert_eq!(names, vec!["Beef", "Chicken Breast", "Jasmine Rice", "Banana", "Broccoli"]);
    }

    #[test]
    fn no_fruit_selected_means_no_fruit_rows() {
        let plan = compute_nutrition_plan(&target_2000(), &[chicken(), rice(), broccoli()]);
        assert!(plan.foods.iter().all(|f| f.category != MacroCategory::Fruit));
        assert_eq!(plan.foods.len(), 3);
    }

    #[test]
    fn empty_selection_not_computed() {
        let plan = compute_nutrition_plan(&target_2000(), &[]);
        assert!(!plan.is_computed());
        assert_eq!(plan.scale_factor, None);
        assert_eq!(plan.target, target_2000());
    }

    #[test]
    fn selection_without_calories_not_computed() {
        let water = food("Water", MacroCategory::Fruit, "0", "0", "0", "0");
        let plan = compute_nutrition_plan(&target_2000(), &[water]);
        assert!(!plan.is_computed());
    }

    #[test]
    fn duplicate_food_planned_once() {
        let rice = rice();
        let plan = compute_nutrition_plan(&target_2000(), &[rice.clone(), rice]);
        assert_eq!(plan.foods.len(), 1);
    }

    #[test]
    fn nutrients_recomputed_from_rounded_grams() {
        let plan = compute_nutrition_plan(&target_2000(), &[chicken(), rice(), banana(), broccoli()]);
        for row in &plan.foods {
            let source = [chicken(), rice(), banana(), broccoli()]
                .into_iter()
                .find(|f| f.name == row.food_name)
                .unwrap();
            let expected = source.calories_per_100g * (row.portion_grams / dec("100"));
            assert_eq!(row.calories, expected, "{}", row.food_name);
        }
    }

    #[test]
    fn summary_totals_rounded_to_one_decimal() {
        let plan = compute_nutrition_plan(&target_2000(), &[chicken(), rice(), banana(), broccoli()]);
        let summary = PlanSummary::from_results(plan.foods.clone());

        assert_eq!(summary.total_foods, 4);
        let calories: Decimal = plan.foods.iter().map(|f| f.calories).sum();
        assert_eq!(
            summary.total_calories,
            calories.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
        );
        assert!(summary.total_protein.scale() <= 1);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod property_tests {
    use super::*;

    fn category_strategy() -> impl Strategy<Value = MacroCategory> {
        prop_oneof![
            Just(MacroCategory::Protein),
            Just(MacroCategory::Carb),
            Just(MacroCategory::Fruit),
            Just(MacroCategory::Vegetable),
        ]
    }

    /// Strategy for a library food with plausible per-100g values
    fn food_strategy(category: impl Strategy<Value = MacroCategory>) -> impl Strategy<Value = SelectedFood> {
        (category, 1i64..=900, 0i64..=40, 0i64..=80, 0i64..=30, 50i64..=200).prop_map(
            |(category, calories, protein, carbs, fats, reference)| SelectedFood {
                food_id: Uuid::new_v4(),
                group_id: Uuid::new_v4(),
                name: format!("{}-{}-{}", category, calories, protein),
                category,
                calories_per_100g: Decimal::from(calories),
                protein_per_100g: Decimal::from(protein),
                carbs_per_100g: Decimal::from(carbs),
                fats_per_100g: Decimal::from(fats),
                reference_grams: Decimal::from(reference),
            },
        )
    }

    fn selection_strategy() -> impl Strategy<Value = Vec<SelectedFood>> {
        prop::collection::vec(food_strategy(category_strategy()), 0..8)
    }

    /// Targets from 1200 to 4000 kcal with one of the seeded breakdowns
    fn target_strategy() -> impl Strategy<Value = MacroTarget> {
        let splits = prop_oneof![
            Just(("40", "30", "30")),
            Just(("30", "40", "30")),
            Just(("30", "45", "25")),
            Just(("35", "35", "30")),
        ];
        (1200i64..=4000, splits).prop_map(|(calories, (p, c, f))| {
            resolve_macro_targets(Decimal::from(calories), &breakdown(p, c, f)).unwrap()
        })
    }

    /// Whole-percentage splits that add up to exactly 100
    fn percentage_split_strategy() -> impl Strategy<Value = (i64, i64, i64)> {
        (0i64..=100).prop_flat_map(|protein| {
            (Just(protein), 0i64..=(100 - protein))
                .prop_map(|(protein, carbs)| (protein, carbs, 100 - protein - carbs))
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Gram targets convert back to the calorie target, give or take
        /// half a gram of each macro
        #[test]
        fn prop_gram_targets_imply_calorie_target(
            calories in 800i64..=6000,
            (p, c, f) in percentage_split_strategy(),
        ) {
            let split = MacroBreakdown {
                id: Uuid::new_v4(),
                goal_type: "Custom".to_string(),
                protein_pct: Decimal::from(p),
                carbs_pct: Decimal::from(c),
                fats_pct: Decimal::from(f),
            };
            let target = resolve_macro_targets(Decimal::from(calories), &split).unwrap();

            let drift = (target.implied_calories() - target.calorie_target).abs();
            prop_assert!(drift <= dec("8.5"), "implied {} vs target {}", target.implied_calories(), calories);
        }

        /// Within a category the allocations add back up to its sub-target
        #[test]
        fn prop_allocations_sum_to_category_sub_target(target in target_strategy(), foods in selection_strategy()) {
            let allocations = allocate(&target, &foods);
            for category in MacroCategory::ALL {
                let in_category: Vec<_> = allocations.iter().filter(|a| a.food.category == category).collect();
                if in_category.is_empty() {
                    continue;
                }
                let total: Decimal = in_category.iter().map(|a| a.allocated_grams).sum();
                let sub_target = category_sub_target(category, &target);
                prop_assert!((total - sub_target).abs() < dec("0.000001"),
                    "{} allocated {} of {}", category, total, sub_target);
            }
        }

        /// Same inputs, same plan
        #[test]
        fn prop_plan_is_deterministic(target in target_strategy(), foods in selection_strategy()) {
            prop_assert_eq!(
                compute_nutrition_plan(&target, &foods),
                compute_nutrition_plan(&target, &foods)
            );
        }

        /// Before rounding, the rescaled calories land on the target
        #[test]
        fn prop_rescaled_calories_meet_target(target in target_strategy(), foods in selection_strategy()) {
            if let Some((_, portions)) = scaled_portions(&target, &foods) {
                let total: Decimal = portions.iter().map(|p| p.nutrients.calories).sum();
                prop_assert!((total - target.calorie_target).abs() < dec("0.0001"),
                    "total {} vs target {}", total, target.calorie_target);
            }
        }

        /// Every portion sits on its category's increment; vegetables never exceed the cap
        #[test]
        fn prop_portions_on_increments(target in target_strategy(), foods in selection_strategy()) {
            let plan = compute_nutrition_plan(&target, &foods);
            for row in &plan.foods {
                let step = shared::planner::rounding_increment(row.category);
                prop_assert_eq!(row.portion_grams % step, Decimal::ZERO);
                prop_assert!(row.portion_grams >= Decimal::ZERO);
                if row.category == MacroCategory::Vegetable {
                    prop_assert!(row.portion_grams <= VEGETABLE_CAP_GRAMS);
                }
            }
        }

        /// Rounding drift is bounded by half an increment per food
        #[test]
        fn prop_rounding_drift_bounded(
            target in target_strategy(),
            foods in prop::collection::vec(
                food_strategy(prop_oneof![
                    Just(MacroCategory::Protein),
                    Just(MacroCategory::Carb),
                    Just(MacroCategory::Fruit),
                ]),
                1..6,
            ),
        ) {
            let plan = compute_nutrition_plan(&target, &foods);
            if plan.is_computed() {
                let bound: Decimal = foods
                    .iter()
                    .map(|f| {
                        shared::planner::rounding_increment(f.category) / Decimal::TWO
                            * f.calories_per_100g / Decimal::ONE_HUNDRED
                            + dec("0.01")
                    })
                    .sum();
                let drift = (plan.totals().calories - target.calorie_target).abs();
                prop_assert!(drift <= bound, "drift {} exceeds {}", drift, bound);
            }
        }

        /// One row per distinct scorable food, never more
        #[test]
        fn prop_one_row_per_food(target in target_strategy(), foods in selection_strategy()) {
            let plan = compute_nutrition_plan(&target, &foods);
            prop_assert!(plan.foods.len() <= foods.len());

            let scorable = foods.iter().filter(|f| macro_density(f) > Decimal::ZERO).count();
            if scorable > 0 {
                prop_assert!(plan.is_computed());
            }
            for row in &plan.foods {
                prop_assert!(foods.iter().any(|f| f.food_id == row.food_id && f.category == row.category));
            }
        }

        /// Categories that are absent from the selection stay absent from the plan
        #[test]
        fn prop_no_rows_for_unselected_categories(target in target_strategy(), foods in selection_strategy()) {
            let plan = compute_nutrition_plan(&target, &foods);
            for row in &plan.foods {
                prop_assert!(foods.iter().any(|f| f.category == row.category));
            }
        }
    }
}
