//! Tests for reference-data rules: diet filtering, best-food ranking and
//! input validation

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    filter_groups_for_diet, rank_best_foods, validate_macro_breakdown, validate_password,
    validate_workout_days, DietType, FoodGroup, FoodItem, MacroBreakdown, MacroCategory,
    BEST_FOODS_PER_GROUP,
};
use std::str::FromStr;
use uuid::Uuid;

fn food(name: &str, protein: i64, carbs: i64, fats: i64) -> FoodItem {
    FoodItem {
        id: Uuid::new_v4(),
        group_id: Uuid::nil(),
        name: name.to_string(),
        calories_per_100g: Decimal::from(protein * 4 + carbs * 4 + fats * 9),
        protein_per_100g: Decimal::from(protein),
        carbs_per_100g: Decimal::from(carbs),
        fats_per_100g: Decimal::from(fats),
        reference_grams: Decimal::ONE_HUNDRED,
    }
}

fn group(name: &str, is_meat: bool, is_red_meat: bool) -> FoodGroup {
    FoodGroup {
        id: Uuid::new_v4(),
        name: name.to_string(),
        category: MacroCategory::Protein,
        is_meat,
        is_red_meat,
    }
}

fn names(foods: &[FoodItem]) -> Vec<&str> {
    foods.iter().map(|f| f.name.as_str()).collect()
}

// =============================================================================
// Best-food ranking
// =============================================================================

mod ranking {
    use super::*;

    #[test]
    fn protein_group_prefers_lean_protein() {
        let foods = vec![
            food("Salmon", 20, 0, 13),
            food("Chicken Breast", 31, 0, 4),
            food("Turkey", 31, 0, 2),
        ];
        let best = rank_best_foods(MacroCategory::Protein, foods);
        assert_eq!(names(&best), vec!["Turkey", "Chicken Breast"]);
    }

    #[test]
    fn carb_group_prefers_carbs_then_low_protein() {
        let foods = vec![
            food("Quinoa", 4, 21, 2),
            food("Jasmine Rice", 3, 28, 0),
            food("Oats", 13, 28, 7),
        ];
        let best = rank_best_foods(MacroCategory::Carb, foods);
        assert_eq!(names(&best), vec!["Jasmine Rice", "Oats"]);
    }

    #[test]
    fn vegetables_ranked_like_carbs() {
        let foods = vec![food("Spinach", 3, 4, 0), food("Carrot", 1, 10, 0)];
        let best = rank_best_foods(MacroCategory::Vegetable, foods);
        assert_eq!(names(&best), vec!["Carrot", "Spinach"]);
    }

    #[test]
    fn ties_broken_by_name() {
        let foods = vec![food("Banana", 1, 23, 0), food("Apple", 1, 23, 0)];
        let best = rank_best_foods(MacroCategory::Fruit, foods);
        assert_eq!(names(&best), vec!["Apple", "Banana"]);
    }

    #[test]
    fn short_groups_kept_whole() {
        assert!(rank_best_foods(MacroCategory::Protein, vec![]).is_empty());
        assert_eq!(rank_best_foods(MacroCategory::Protein, vec![food("Tofu", 8, 2, 5)]).len(), 1);
    }
}

// =============================================================================
// Diet filtering and labels
// =============================================================================

mod diets {
    use super::*;

    #[test]
    fn balanced_keeps_everything() {
        let groups = vec![group("Beef", true, true), group("Legumes", false, false)];
        assert_eq!(filter_groups_for_diet(&groups, DietType::Balanced), groups);
    }

    #[test]
    fn diet_labels_parse_loosely() {
        assert_eq!(DietType::from_str("No Red Meat"), Ok(DietType::NoRedMeat));
        assert_eq!(DietType::from_str("no-red-meat"), Ok(DietType::NoRedMeat));
        assert_eq!(DietType::from_str(" Vegetarian "), Ok(DietType::Vegetarian));
        assert!(DietType::from_str("carnivore").is_err());
    }

    #[test]
    fn category_labels_accept_plurals() {
        assert_eq!(MacroCategory::from_str("Carbs"), Ok(MacroCategory::Carb));
        assert_eq!(MacroCategory::from_str("vegetables"), Ok(MacroCategory::Vegetable));
        assert!(MacroCategory::from_str("fat").is_err());
    }
}

// =============================================================================
// Validation
// =============================================================================

mod validation {
    use super::*;

    fn breakdown(p: &str, c: &str, f: &str) -> MacroBreakdown {
        MacroBreakdown {
            id: Uuid::new_v4(),
            goal_type: "cut".to_string(),
            protein_pct: Decimal::from_str(p).unwrap(),
            carbs_pct: Decimal::from_str(c).unwrap(),
            fats_pct: Decimal::from_str(f).unwrap(),
        }
    }

    #[test]
    fn breakdown_tolerance_is_one_point() {
        assert!(validate_macro_breakdown(&breakdown("40", "40", "21")).is_ok());
        assert!(validate_macro_breakdown(&breakdown("40", "40", "19")).is_ok());
        assert!(validate_macro_breakdown(&breakdown("40", "40", "21.5")).is_err());
    }

    #[test]
    fn password_length_counts_characters() {
        assert!(validate_password("pässwörd").is_ok());
        assert!(validate_password("short").is_err());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod property_tests {
    use super::*;

    fn foods_strategy() -> impl Strategy<Value = Vec<FoodItem>> {
        prop::collection::vec((0i64..=40, 0i64..=60, 0i64..=30), 0..10).prop_map(|macros| {
            macros
                .into_iter()
                .enumerate()
                .map(|(i, (p, c, f))| food(&format!("Food {:02}", i), p, c, f))
                .collect()
        })
    }

    fn category_strategy() -> impl Strategy<Value = MacroCategory> {
        prop::sample::select(MacroCategory::ALL.to_vec())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Never more than the per-group limit, never more than offered
        #[test]
        fn prop_best_foods_bounded(foods in foods_strategy(), category in category_strategy()) {
            let offered = foods.len();
            let best = rank_best_foods(category, foods);
            prop_assert_eq!(best.len(), offered.min(BEST_FOODS_PER_GROUP));
        }

        /// The top suggestion carries the most of the group's scoring macro
        #[test]
        fn prop_top_food_maximises_scoring_macro(foods in foods_strategy(), category in category_strategy()) {
            prop_assume!(!foods.is_empty());
            let scoring = |f: &FoodItem| {
                if category.is_carbohydrate_source() { f.carbs_per_100g } else { f.protein_per_100g }
            };
            let max = foods.iter().map(scoring).max().unwrap();
            let best = rank_best_foods(category, foods);
            prop_assert_eq!(scoring(&best[0]), max);
        }

        /// Ranking does not depend on input order
        #[test]
        fn prop_ranking_order_independent(foods in foods_strategy(), category in category_strategy()) {
            let mut reversed = foods.clone();
            reversed.reverse();
            let forward = rank_best_foods(category, foods);
            let backward = rank_best_foods(category, reversed);
            prop_assert_eq!(forward, backward);
        }

        /// Filtering keeps order and only ever removes groups
        #[test]
        fn prop_diet_filter_is_ordered_subset(flags in prop::collection::vec((any::<bool>(), any::<bool>()), 0..12)) {
            let groups: Vec<FoodGroup> = flags
                .iter()
                .enumerate()
                .map(|(i, (meat, red))| group(&format!("G{}", i), *meat || *red, *red))
                .collect();
            for diet in DietType::ALL {
                let kept = filter_groups_for_diet(&groups, diet);
                let mut remaining = groups.iter();
                for g in &kept {
                    prop_assert!(remaining.any(|candidate| candidate == g));
                    prop_assert!(diet.allows(g));
                }
            }
        }

        /// Workout days accepted exactly on 1..=7
        #[test]
        fn prop_workout_days_range(days in -20i32..30) {
            prop_assert_eq!(validate_workout_days(days).is_ok(), (1..=7).contains(&days));
        }
    }
}
