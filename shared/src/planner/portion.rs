//! Conversion of allocated macro grams into food portions

use rust_decimal::Decimal;

use super::allocation::Allocation;
use crate::models::{NutrientTotals, SelectedFood};

/// A portion of one food with the nutrients it carries
#[derive(Debug, Clone, PartialEq)]
pub struct Portion<'a> {
    pub food: &'a SelectedFood,
    pub grams: Decimal,
    pub nutrients: NutrientTotals,
}

/// Grams of `food` needed to supply `allocated` grams of its driving macro
///
/// Falls back to the food's reference portion when it carries none of that macro.
pub fn portion_grams(food: &SelectedFood, allocated: Decimal) -> Decimal {
    let macro_per_gram = food.driving_macro_per_100g() / Decimal::ONE_HUNDRED;
    if macro_per_gram <= Decimal::ZERO {
        return food.reference_grams;
    }
    allocated / macro_per_gram
}

pub fn provisional_portions<'a>(allocations: &[Allocation<'a>]) -> Vec<Portion<'a>> {
    allocations
        .iter()
        .map(|a| {
            let grams = portion_grams(a.food, a.allocated_grams);
            Portion {
                food: a.food,
                grams,
                nutrients: a.food.nutrients_for(grams),
            }
        })
        .collect()
}
