//! Distribution of macro targets across the foods of each category

use rust_decimal::Decimal;

use super::density::macro_density;
use crate::models::{MacroTarget, SelectedFood};
use crate::types::MacroCategory;

/// Share of the carbohydrate target given to each carbohydrate category, in percent
const CARB_SHARE_PCT: i64 = 70;
const FRUIT_SHARE_PCT: i64 = 20;
const VEGETABLE_SHARE_PCT: i64 = 10;

/// Macro grams one food is responsible for
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation<'a> {
    pub food: &'a SelectedFood,
    pub density: Decimal,
    pub allocated_grams: Decimal,
}

/// Grams of the driving macro a whole category must supply
pub fn category_sub_target(category: MacroCategory, target: &MacroTarget) -> Decimal {
    let share_of_carbs = |pct: i64| target.carb_grams * Decimal::from(pct) / Decimal::ONE_HUNDRED;
    match category {
        MacroCategory::Protein => target.protein_grams,
        MacroCategory::Carb => share_of_carbs(CARB_SHARE_PCT),
        MacroCategory::Fruit => share_of_carbs(FRUIT_SHARE_PCT),
        MacroCategory::Vegetable => share_of_carbs(VEGETABLE_SHARE_PCT),
    }
}

/// Allocate each category's sub-target proportionally to food density
///
/// Categories whose densities sum to zero are left out entirely. Output is
/// grouped by category, preserving input order within a category.
pub fn allocate<'a>(target: &MacroTarget, foods: &'a [SelectedFood]) -> Vec<Allocation<'a>> {
    let mut allocations = Vec::with_capacity(foods.len());

    for category in MacroCategory::ALL {
        let scored: Vec<(&SelectedFood, Decimal)> = foods
            .iter()
            .filter(|f| f.category == category)
            .map(|f| (f, macro_density(f)))
            .collect();

        let density_sum: Decimal = scored.iter().map(|(_, d)| *d).sum();
        if density_sum <= Decimal::ZERO {
            continue;
        }

        let sub_target = category_sub_target(category, target);
        allocations.extend(scored.into_iter().map(|(food, density)| Allocation {
            food,
            density,
            allocated_grams: density / density_sum * sub_target,
        }));
    }

    allocations
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn target() -> MacroTarget {
        MacroTarget {
            calorie_target: Decimal::from(2000),
            protein_grams: Decimal::from(150),
            carb_grams: Decimal::from(200),
            fat_grams: Decimal::from(67),
        }
    }

    fn food(name: &str, category: MacroCategory, calories: i64, protein: i64, carbs: i64) -> SelectedFood {
        SelectedFood {
            food_id: Uuid::new_v4(),
            group_id: Uuid::new_v4(),
            name: name.to_string(),
            category,
            calories_per_100g: Decimal::from(calories),
            protein_per_100g: Decimal::from(protein),
            carbs_per_100g: Decimal::from(carbs),
            fats_per_100g: Decimal::ONE,
            reference_grams: Decimal::ONE_HUNDRED,
        }
    }

    #[test]
    fn carb_target_split_seventy_twenty_ten() {
        let t = target();
        assert_eq!(category_sub_target(MacroCategory::Carb, &t), Decimal::from(140));
        assert_eq!(category_sub_target(MacroCategory::Fruit, &t), Decimal::from(40));
        assert_eq!(category_sub_target(MacroCategory::Vegetable, &t), Decimal::from(20));
        assert_eq!(category_sub_target(MacroCategory::Protein, &t), Decimal::from(150));
    }

    #[test]
    fn allocation_proportional_to_density() {
        let foods = vec![
            food("Chicken", MacroCategory::Protein, 100, 30, 0),
            food("Eggs", MacroCategory::Protein, 100, 10, 0),
        ];
        let allocations = allocate(&target(), &foods);
        assert_eq!(allocations.len(), 2);
        assert_eq!(allocations[0].allocated_grams.round_dp(6), Decimal::new(1125, 1));
        assert_eq!(allocations[1].allocated_grams.round_dp(6), Decimal::new(375, 1));
    }

    #[test]
    fn zero_density_category_is_skipped() {
        let foods = vec![
            food("Chicken", MacroCategory::Protein, 100, 30, 0),
            food("Water chestnut", MacroCategory::Vegetable, 0, 0, 0),
        ];
        let allocations = allocate(&target(), &foods);
        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].food.name, "Chicken");
        assert_eq!(allocations[0].allocated_grams, Decimal::from(150));
    }

    #[test]
    fn zero_density_food_keeps_a_zero_share() {
        let foods = vec![
            food("Banana", MacroCategory::Fruit, 90, 1, 23),
            food("Diet jelly", MacroCategory::Fruit, 0, 0, 0),
        ];
        let allocations = allocate(&target(), &foods);
        assert_eq!(allocations.len(), 2);
        assert_eq!(allocations[1].allocated_grams, Decimal::ZERO);
        assert_eq!(allocations[0].allocated_grams, Decimal::from(40));
    }
}
