//! Nutrition plan models

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul};
use uuid::Uuid;

use crate::types::{DietType, MacroCategory};

/// Macro percentage split configured for a goal type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MacroBreakdown {
    pub id: Uuid,
    pub goal_type: String,
    pub protein_pct: Decimal,
    pub carbs_pct: Decimal,
    pub fats_pct: Decimal,
}

/// Gram targets derived from a calorie target and a macro breakdown
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MacroTarget {
    pub calorie_target: Decimal,
    pub protein_grams: Decimal,
    pub carb_grams: Decimal,
    pub fat_grams: Decimal,
}

impl MacroTarget {
    /// Energy implied by the gram targets (4/4/9 kcal per gram)
    pub fn implied_calories(&self) -> Decimal {
        self.protein_grams * Decimal::from(4)
            + self.carb_grams * Decimal::from(4)
            + self.fat_grams * Decimal::from(9)
    }
}

/// A food chosen by the member, joined with its reference nutrients
///
/// Nutrient values are per 100 g of the food.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectedFood {
    pub food_id: Uuid,
    pub group_id: Uuid,
    pub name: String,
    pub category: MacroCategory,
    pub calories_per_100g: Decimal,
    pub protein_per_100g: Decimal,
    pub carbs_per_100g: Decimal,
    pub fats_per_100g: Decimal,
    pub reference_grams: Decimal,
}

impl SelectedFood {
    /// The macro that drives allocation for this food's category
    pub fn driving_macro_per_100g(&self) -> Decimal {
        if self.category.is_carbohydrate_source() {
            self.carbs_per_100g
        } else {
            self.protein_per_100g
        }
    }

    /// Nutrients contained in `grams` of this food
    pub fn nutrients_for(&self, grams: Decimal) -> NutrientTotals {
        let ratio = grams / Decimal::ONE_HUNDRED;
        NutrientTotals {
            calories: self.calories_per_100g * ratio,
            protein: self.protein_per_100g * ratio,
            carbs: self.carbs_per_100g * ratio,
            fats: self.fats_per_100g * ratio,
        }
    }
}

/// Calories and macro grams for a portion or a whole plan
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct NutrientTotals {
    pub calories: Decimal,
    pub protein: Decimal,
    pub carbs: Decimal,
    pub fats: Decimal,
}

impl NutrientTotals {
    pub fn round_dp(&self, dp: u32) -> Self {
        let round = |d: Decimal| d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
        Self {
            calories: round(self.calories),
            protein: round(self.protein),
            carbs: round(self.carbs),
            fats: round(self.fats),
        }
    }
}

impl Add for NutrientTotals {
    type Output = NutrientTotals;

    fn add(self, rhs: Self) -> Self::Output {
        NutrientTotals {
            calories: self.calories + rhs.calories,
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fats: self.fats + rhs.fats,
        }
    }
}

impl Mul<Decimal> for NutrientTotals {
    type Output = NutrientTotals;

    fn mul(self, rhs: Decimal) -> Self::Output {
        NutrientTotals {
            calories: self.calories * rhs,
            protein: self.protein * rhs,
            carbs: self.carbs * rhs,
            fats: self.fats * rhs,
        }
    }
}

impl std::iter::Sum for NutrientTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(NutrientTotals::default(), |acc, n| acc + n)
    }
}

/// Final per-food row of a nutrition plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortionResult {
    pub food_id: Uuid,
    pub food_name: String,
    pub group_id: Uuid,
    pub category: MacroCategory,
    pub portion_grams: Decimal,
    pub calories: Decimal,
    pub protein: Decimal,
    pub carbs: Decimal,
    pub fats: Decimal,
}

impl PortionResult {
    pub fn nutrients(&self) -> NutrientTotals {
        NutrientTotals {
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fats: self.fats,
        }
    }
}

/// Aggregate view over the stored results of one assessment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanSummary {
    pub total_foods: usize,
    pub total_calories: Decimal,
    pub total_protein: Decimal,
    pub total_carbs: Decimal,
    pub total_fats: Decimal,
    pub foods: Vec<PortionResult>,
}

impl PlanSummary {
    /// Summarise stored results; macro totals are rounded to one decimal place
    pub fn from_results(foods: Vec<PortionResult>) -> Self {
        let totals: NutrientTotals = foods.iter().map(PortionResult::nutrients).sum();
        let one_dp = totals.round_dp(1);
        Self {
            total_foods: foods.len(),
            total_calories: one_dp.calories,
            total_protein: one_dp.protein,
            total_carbs: one_dp.carbs,
            total_fats: one_dp.fats,
            foods,
        }
    }
}

/// A food the member picked in the questionnaire
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FoodPreference {
    pub food_id: Uuid,
    pub food_group_id: Uuid,
    pub category: MacroCategory,
}

/// Answers submitted at the end of the nutrition questionnaire
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NutritionAssessmentInput {
    pub diet_type: DietType,
    #[serde(default)]
    pub allergens: Vec<Uuid>,
    pub food_preferences: Vec<FoodPreference>,
}

/// Stored nutrition questionnaire answers with the targets they produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionAssessment {
    pub id: Uuid,
    pub member_id: Uuid,
    pub diet_type: DietType,
    pub allergen_ids: Vec<Uuid>,
    pub food_preferences: Vec<FoodPreference>,
    pub macro_breakdown_id: Uuid,
    pub target: MacroTarget,
    pub created_at: DateTime<Utc>,
}
