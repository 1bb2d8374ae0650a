//! Macro density scoring

use rust_decimal::Decimal;

use crate::models::SelectedFood;

/// Grams of the category's driving macro per calorie
///
/// Protein foods score on protein, every other category on carbohydrates.
/// A food without calories scores zero.
pub fn macro_density(food: &SelectedFood) -> Decimal {
    if food.calories_per_100g <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let grams = food.driving_macro_per_100g().max(Decimal::ZERO);
    grams / food.calories_per_100g
}
