//! Nutrition plan computation
//!
//! A plan is produced by a fixed sequence of pure stages:
//!
//! 1. [`targets`]: calorie target and macro percentages to gram targets
//! 2. [`density`]: macro grams per calorie for each selected food
//! 3. [`allocation`]: each category's sub-target shared out by density
//! 4. [`portion`]: allocated macro grams to food grams
//! 5. [`rescale`]: one global factor so calories meet the target
//! 6. [`rounding`]: portions snapped per category, nutrients recomputed
//!
//! Nothing here touches storage; callers persist the resulting rows.

pub mod allocation;
pub mod density;
pub mod portion;
pub mod rescale;
pub mod rounding;
pub mod targets;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::models::{MacroTarget, NutrientTotals, PortionResult, SelectedFood};

pub use allocation::{allocate, category_sub_target, Allocation};
pub use density::macro_density;
pub use portion::{portion_grams, provisional_portions, Portion};
pub use rescale::{rescale, scale_factor};
pub use rounding::{finalize, round_portion, rounding_increment, VEGETABLE_CAP_GRAMS};
pub use targets::resolve_macro_targets;

/// Input problems detected before any computation runs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("calorie target must be positive, got {0}")]
    InvalidCalorieTarget(Decimal),

    #[error("macro percentages must be non-negative and sum to 100, got {total}")]
    InvalidMacroPercentages { total: Decimal },
}

/// Result of one plan computation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NutritionPlan {
    pub target: MacroTarget,
    /// Factor applied to provisional portions, absent when nothing was planned
    pub scale_factor: Option<Decimal>,
    pub foods: Vec<PortionResult>,
}

impl NutritionPlan {
    pub fn is_computed(&self) -> bool {
        !self.foods.is_empty()
    }

    pub fn totals(&self) -> NutrientTotals {
        self.foods.iter().map(PortionResult::nutrients).sum()
    }
}

/// Keep the first occurrence of every food id
pub fn dedupe_selection(foods: &[SelectedFood]) -> Vec<SelectedFood> {
    let mut seen = HashSet::new();
    foods
        .iter()
        .filter(|f| seen.insert(f.food_id))
        .cloned()
        .collect()
}

/// Stages 2 to 5: rescaled, unrounded portions
///
/// Returns `None` when the selection yields no calories to scale.
pub fn scaled_portions<'a>(
    target: &MacroTarget,
    foods: &'a [SelectedFood],
) -> Option<(Decimal, Vec<Portion<'a>>)> {
    let allocations = allocate(target, foods);
    let provisional = provisional_portions(&allocations);
    let scale = scale_factor(target.calorie_target, &provisional)?;
    Some((scale, rescale(provisional, scale)))
}

/// Compute the full plan for a resolved target and a food selection
///
/// Rows are ordered by category, then food name.
pub fn compute_nutrition_plan(target: &MacroTarget, foods: &[SelectedFood]) -> NutritionPlan {
    let unique = dedupe_selection(foods);

    let Some((scale, portions)) = scaled_portions(target, &unique) else {
        return NutritionPlan {
            target: *target,
            scale_factor: None,
            foods: Vec::new(),
        };
    };

    let mut rows: Vec<PortionResult> = portions.iter().map(finalize).collect();
    rows.sort_by(|a, b| {
        a.category
            .cmp(&b.category)
            .then_with(|| a.food_name.cmp(&b.food_name))
    });

    NutritionPlan {
        target: *target,
        scale_factor: Some(scale),
        foods: rows,
    }
}
