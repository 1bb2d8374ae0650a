//! Food reference data: groups, library items and allergens

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

use crate::types::{DietType, MacroCategory};

/// How many foods are suggested per group in the questionnaire
pub const BEST_FOODS_PER_GROUP: usize = 2;

/// A food group (e.g. "Poultry", "Whole grains") shown in the questionnaire
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FoodGroup {
    pub id: Uuid,
    pub name: String,
    pub category: MacroCategory,
    pub is_meat: bool,
    pub is_red_meat: bool,
}

/// A food in the library with per-100g nutrients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FoodItem {
    pub id: Uuid,
    pub group_id: Uuid,
    pub name: String,
    pub calories_per_100g: Decimal,
    pub protein_per_100g: Decimal,
    pub carbs_per_100g: Decimal,
    pub fats_per_100g: Decimal,
    pub reference_grams: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Allergen {
    pub id: Uuid,
    pub name: String,
}

impl DietType {
    /// Whether foods from `group` are allowed under this diet
    pub fn allows(&self, group: &FoodGroup) -> bool {
        match self {
            DietType::Balanced => true,
            DietType::Vegetarian => !group.is_meat,
            DietType::NoRedMeat => !group.is_red_meat,
        }
    }
}

/// Food groups permitted by `diet`, in their original order
pub fn filter_groups_for_diet(groups: &[FoodGroup], diet: DietType) -> Vec<FoodGroup> {
    groups.iter().filter(|g| diet.allows(g)).cloned().collect()
}

/// Order two foods by how well they represent a group of `category`
///
/// Protein groups prefer high protein, then low fat, then low carbs.
/// Carbohydrate groups prefer high carbs, then low protein, then low fat.
pub fn compare_for_category(category: MacroCategory, a: &FoodItem, b: &FoodItem) -> Ordering {
    let ordering = if category.is_carbohydrate_source() {
        b.carbs_per_100g
            .cmp(&a.carbs_per_100g)
            .then(a.protein_per_100g.cmp(&b.protein_per_100g))
            .then(a.fats_per_100g.cmp(&b.fats_per_100g))
    } else {
        b.protein_per_100g
            .cmp(&a.protein_per_100g)
            .then(a.fats_per_100g.cmp(&b.fats_per_100g))
            .then(a.carbs_per_100g.cmp(&b.carbs_per_100g))
    };
    ordering.then_with(|| a.name.cmp(&b.name))
}

/// Pick the best foods of a group for the questionnaire's "best foods" step
pub fn rank_best_foods(category: MacroCategory, mut foods: Vec<FoodItem>) -> Vec<FoodItem> {
    foods.sort_by(|a, b| compare_for_category(category, a, b));
    foods.truncate(BEST_FOODS_PER_GROUP);
    foods
}
