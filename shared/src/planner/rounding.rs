//! Snapping portions to kitchen-friendly sizes

use rust_decimal::{Decimal, RoundingStrategy};

use super::portion::Portion;
use crate::models::PortionResult;
use crate::types::MacroCategory;

pub const VEGETABLE_CAP_GRAMS: Decimal = Decimal::from_parts(250, 0, 0, false, 0);

/// Step a category's portions are rounded to, in grams
pub fn rounding_increment(category: MacroCategory) -> Decimal {
    match category {
        MacroCategory::Protein | MacroCategory::Carb => Decimal::from(50),
        MacroCategory::Fruit | MacroCategory::Vegetable => Decimal::TEN,
    }
}

/// Round to the nearest increment; vegetables are also capped
pub fn round_portion(category: MacroCategory, grams: Decimal) -> Decimal {
    let step = rounding_increment(category);
    let rounded = (grams / step).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero) * step;
    match category {
        MacroCategory::Vegetable => rounded.min(VEGETABLE_CAP_GRAMS),
        _ => rounded,
    }
}

/// Round a scaled portion and recompute its nutrients from the rounded weight
pub fn finalize(portion: &Portion<'_>) -> PortionResult {
    let food = portion.food;
    let grams = round_portion(food.category, portion.grams);
    let nutrients = food.nutrients_for(grams).round_dp(2);

    PortionResult {
        food_id: food.food_id,
        food_name: food.name.clone(),
        group_id: food.group_id,
        category: food.category,
        portion_grams: grams,
        calories: nutrients.calories,
        protein: nutrients.protein,
        carbs: nutrients.carbs,
        fats: nutrients.fats,
    }
}
