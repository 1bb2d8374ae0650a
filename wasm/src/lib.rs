//! WebAssembly module for the SwiftPass member app
//!
//! Provides client-side computation for:
//! - Macro targets and nutrition plan previews
//! - Diet filtering and best-food ranking
//! - The nutrition and exercise questionnaires
//!
//! Everything crosses the boundary as JSON strings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::wizard::{BestFoodGroup, ExerciseWizard, NutritionWizard};
use shared::{
    compute_nutrition_plan, filter_groups_for_diet, rank_best_foods, resolve_macro_targets,
    Allergen, AssessmentWizard, CardioPreference, DietType, FitnessLevel, FoodGroup, FoodItem,
    MacroBreakdown, MacroCategory, MacroTarget, SelectedFood, Split, SplitPreview,
};
use uuid::Uuid;
use wasm_bindgen::prelude::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::log_1(&JsValue::from_str("swiftpass-wasm ready"));
}

fn parse<T: for<'de> Deserialize<'de>>(json: &str, what: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn render<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| e.to_string())
}

fn to_js(result: Result<String, String>) -> Result<String, JsValue> {
    result.map_err(|e| JsValue::from_str(&e))
}

/// Gram targets for a calorie target under a macro breakdown
#[wasm_bindgen]
pub fn macro_targets(calorie_target: f64, breakdown_json: &str) -> Result<String, JsValue> {
    to_js(macro_targets_json(calorie_target, breakdown_json))
}

fn macro_targets_json(calorie_target: f64, breakdown_json: &str) -> Result<String, String> {
    let breakdown: MacroBreakdown = parse(breakdown_json, "breakdown")?;
    let calories = Decimal::try_from(calorie_target).map_err(|e| e.to_string())?;
    let target = resolve_macro_targets(calories, &breakdown).map_err(|e| e.to_string())?;
    render(&target)
}

/// Portion plan for the selected foods, as the server would compute it
#[wasm_bindgen]
pub fn nutrition_plan(target_json: &str, foods_json: &str) -> Result<String, JsValue> {
    to_js(nutrition_plan_json(target_json, foods_json))
}

fn nutrition_plan_json(target_json: &str, foods_json: &str) -> Result<String, String> {
    let target: MacroTarget = parse(target_json, "target")?;
    let foods: Vec<SelectedFood> = parse(foods_json, "foods")?;
    render(&compute_nutrition_plan(&target, &foods))
}

/// Food groups a diet allows
#[wasm_bindgen]
pub fn food_groups_for_diet(groups_json: &str, diet: &str) -> Result<String, JsValue> {
    to_js(food_groups_for_diet_json(groups_json, diet))
}

fn food_groups_for_diet_json(groups_json: &str, diet: &str) -> Result<String, String> {
    let groups: Vec<FoodGroup> = parse(groups_json, "food groups")?;
    let diet: DietType = diet.parse().map_err(|e: shared::UnknownVariant| e.to_string())?;
    render(&filter_groups_for_diet(&groups, diet))
}

/// The top foods of a group for its macro category
#[wasm_bindgen]
pub fn best_foods(category: &str, foods_json: &str) -> Result<String, JsValue> {
    to_js(best_foods_json(category, foods_json))
}

fn best_foods_json(category: &str, foods_json: &str) -> Result<String, String> {
    let category: MacroCategory = category
        .parse()
        .map_err(|e: shared::UnknownVariant| e.to_string())?;
    let foods: Vec<FoodItem> = parse(foods_json, "foods")?;
    render(&rank_best_foods(category, foods))
}

/// Diet choices as `[value, label]` pairs
#[wasm_bindgen]
pub fn diet_options() -> js_sys::Array {
    DietType::ALL
        .iter()
        .map(|diet| {
            let pair = js_sys::Array::new();
            pair.push(&JsValue::from_str(diet.as_str()));
            pair.push(&JsValue::from_str(diet.label()));
            JsValue::from(pair)
        })
        .collect()
}

/// What the client renders after every questionnaire action
#[derive(Serialize)]
struct WizardView<'a, S: Serialize, W: Serialize> {
    step: S,
    position: usize,
    total: usize,
    done: bool,
    state: &'a W,
}

fn view<W>(wizard: &W) -> Result<String, String>
where
    W: AssessmentWizard + Serialize,
    W::Step: Serialize,
{
    let (position, total) = wizard.progress();
    render(&WizardView {
        step: wizard.step(),
        position,
        total,
        done: wizard.is_done(),
        state: wizard,
    })
}

fn wizard_error(e: shared::WizardError) -> String {
    serde_json::to_string(&e).unwrap_or_else(|_| e.to_string())
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum NutritionAction {
    Next,
    Back,
    ChooseDiet { diet: DietType },
    ToggleAllergen { allergen_id: Uuid },
    ToggleFoodGroup { group_id: Uuid },
    SupplyBestFoods { best_foods: Vec<BestFoodGroup> },
    ChooseFood { group_id: Uuid, food_id: Uuid },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum ExerciseAction {
    Next,
    Back,
    SetFitnessLevel { level: FitnessLevel },
    SetCardio { cardio: CardioPreference },
    SetWorkoutDays { days: i32 },
    ChooseSplit { split_id: Uuid },
    SupplyPreview { preview: SplitPreview },
}

/// Start the nutrition questionnaire over the library's groups and allergens
#[wasm_bindgen]
pub fn nutrition_wizard_start(groups_json: &str, allergens_json: &str) -> Result<String, JsValue> {
    to_js(nutrition_wizard_start_json(groups_json, allergens_json))
}

fn nutrition_wizard_start_json(groups_json: &str, allergens_json: &str) -> Result<String, String> {
    let groups: Vec<FoodGroup> = parse(groups_json, "food groups")?;
    let allergens: Vec<Allergen> = parse(allergens_json, "allergens")?;
    view(&NutritionWizard::new(groups, allergens))
}

/// Apply one action to a nutrition questionnaire state
#[wasm_bindgen]
pub fn nutrition_wizard_apply(state_json: &str, action_json: &str) -> Result<String, JsValue> {
    to_js(nutrition_wizard_apply_json(state_json, action_json))
}

fn nutrition_wizard_apply_json(state_json: &str, action_json: &str) -> Result<String, String> {
    let mut wizard: NutritionWizard = parse(state_json, "questionnaire state")?;
    let action: NutritionAction = parse(action_json, "action")?;

    match action {
        NutritionAction::Next => wizard.next().map(|_| ()),
        NutritionAction::Back => {
            wizard.back();
            Ok(())
        }
        NutritionAction::ChooseDiet { diet } => wizard.choose_diet(diet),
        NutritionAction::ToggleAllergen { allergen_id } => {
            wizard.toggle_allergen(allergen_id).map(|_| ())
        }
        NutritionAction::ToggleFoodGroup { group_id } => {
            wizard.toggle_food_group(group_id).map(|_| ())
        }
        NutritionAction::SupplyBestFoods { best_foods } => wizard.supply_best_foods(best_foods),
        NutritionAction::ChooseFood { group_id, food_id } => wizard.choose_food(group_id, food_id),
    }
    .map_err(wizard_error)?;

    view(&wizard)
}

/// Answers of a finished nutrition questionnaire, ready to POST
#[wasm_bindgen]
pub fn nutrition_wizard_submission(state_json: &str) -> Result<String, JsValue> {
    to_js(nutrition_wizard_submission_json(state_json))
}

fn nutrition_wizard_submission_json(state_json: &str) -> Result<String, String> {
    let wizard: NutritionWizard = parse(state_json, "questionnaire state")?;
    render(&wizard.submission().map_err(wizard_error)?)
}

#[wasm_bindgen]
pub fn exercise_wizard_start(splits_json: &str) -> Result<String, JsValue> {
    to_js(exercise_wizard_start_json(splits_json))
}

fn exercise_wizard_start_json(splits_json: &str) -> Result<String, String> {
    let splits: Vec<Split> = parse(splits_json, "splits")?;
    view(&ExerciseWizard::new(splits))
}

/// Apply one action to an exercise questionnaire state
#[wasm_bindgen]
pub fn exercise_wizard_apply(state_json: &str, action_json: &str) -> Result<String, JsValue> {
    to_js(exercise_wizard_apply_json(state_json, action_json))
}

fn exercise_wizard_apply_json(state_json: &str, action_json: &str) -> Result<String, String> {
    let mut wizard: ExerciseWizard = parse(state_json, "questionnaire state")?;
    let action: ExerciseAction = parse(action_json, "action")?;

    match action {
        ExerciseAction::Next => wizard.next().map(|_| ()),
        ExerciseAction::Back => {
            wizard.back();
            Ok(())
        }
        ExerciseAction::SetFitnessLevel { level } => wizard.set_fitness_level(level),
        ExerciseAction::SetCardio { cardio } => wizard.set_cardio(cardio),
        ExerciseAction::SetWorkoutDays { days } => wizard.set_workout_days(days),
        ExerciseAction::ChooseSplit { split_id } => wizard.choose_split(split_id),
        ExerciseAction::SupplyPreview { preview } => wizard.supply_preview(preview),
    }
    .map_err(wizard_error)?;

    view(&wizard)
}

#[wasm_bindgen]
pub fn exercise_wizard_submission(state_json: &str) -> Result<String, JsValue> {
    to_js(exercise_wizard_submission_json(state_json))
}

fn exercise_wizard_submission_json(state_json: &str) -> Result<String, String> {
    let wizard: ExerciseWizard = parse(state_json, "questionnaire state")?;
    render(&wizard.submission().map_err(wizard_error)?)
}
