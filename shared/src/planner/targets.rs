//! Calorie target to macro gram targets

use rust_decimal::{Decimal, RoundingStrategy};

use super::PlanError;
use crate::models::{MacroBreakdown, MacroTarget};

pub const KCAL_PER_GRAM_PROTEIN: Decimal = Decimal::from_parts(4, 0, 0, false, 0);
pub const KCAL_PER_GRAM_CARBS: Decimal = Decimal::from_parts(4, 0, 0, false, 0);
pub const KCAL_PER_GRAM_FAT: Decimal = Decimal::from_parts(9, 0, 0, false, 0);

/// Allowed distance of the percentage total from 100
const PERCENT_TOLERANCE: Decimal = Decimal::ONE;

/// Convert a calorie target and a percentage split into whole-gram macro targets
pub fn resolve_macro_targets(
    calorie_target: Decimal,
    breakdown: &MacroBreakdown,
) -> Result<MacroTarget, PlanError> {
    if calorie_target <= Decimal::ZERO {
        return Err(PlanError::InvalidCalorieTarget(calorie_target));
    }

    let percentages = [breakdown.protein_pct, breakdown.carbs_pct, breakdown.fats_pct];
    let total: Decimal = percentages.iter().sum();
    if percentages.iter().any(|p| *p < Decimal::ZERO)
        || (total - Decimal::ONE_HUNDRED).abs() > PERCENT_TOLERANCE
    {
        return Err(PlanError::InvalidMacroPercentages { total });
    }

    Ok(MacroTarget {
        calorie_target,
        protein_grams: grams_for(calorie_target, breakdown.protein_pct, KCAL_PER_GRAM_PROTEIN),
        carb_grams: grams_for(calorie_target, breakdown.carbs_pct, KCAL_PER_GRAM_CARBS),
        fat_grams: grams_for(calorie_target, breakdown.fats_pct, KCAL_PER_GRAM_FAT),
    })
}

fn grams_for(calories: Decimal, percent: Decimal, kcal_per_gram: Decimal) -> Decimal {
    (calories * percent / Decimal::ONE_HUNDRED / kcal_per_gram)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
