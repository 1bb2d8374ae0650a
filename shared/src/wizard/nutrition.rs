use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

use super::{neighbour, position, AssessmentWizard, WizardError};
use crate::models::{
    filter_groups_for_diet, Allergen, FoodGroup, FoodItem, FoodPreference,
    NutritionAssessmentInput,
};
use crate::types::DietType;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NutritionStep {
    Welcome,
    DietType,
    Allergies,
    FoodPreferences,
    Calculating,
    BestFoods,
    Done,
}

impl NutritionStep {
    pub const ORDER: [NutritionStep; 7] = [
        NutritionStep::Welcome,
        NutritionStep::DietType,
        NutritionStep::Allergies,
        NutritionStep::FoodPreferences,
        NutritionStep::Calculating,
        NutritionStep::BestFoods,
        NutritionStep::Done,
    ];
}

/// Suggested foods for one selected group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BestFoodGroup {
    pub group: FoodGroup,
    pub foods: Vec<FoodItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NutritionAnswers {
    pub diet: Option<DietType>,
    pub allergen_ids: BTreeSet<Uuid>,
    pub food_group_ids: BTreeSet<Uuid>,
    /// Chosen food per food group
    pub chosen_foods: BTreeMap<Uuid, Uuid>,
}

/// The nutrition questionnaire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionWizard {
    step: NutritionStep,
    food_groups: Vec<FoodGroup>,
    allergens: Vec<Allergen>,
    answers: NutritionAnswers,
    best_foods: Option<Vec<BestFoodGroup>>,
}

impl NutritionWizard {
    pub fn new(food_groups: Vec<FoodGroup>, allergens: Vec<Allergen>) -> Self {
        Self {
            step: NutritionStep::Welcome,
            food_groups,
            allergens,
            answers: NutritionAnswers::default(),
            best_foods: None,
        }
    }

    pub fn answers(&self) -> &NutritionAnswers {
        &self.answers
    }

    pub fn allergens(&self) -> &[Allergen] {
        &self.allergens
    }

    pub fn best_foods(&self) -> Option<&[BestFoodGroup]> {
        self.best_foods.as_deref()
    }

    /// Food groups the member may pick from under the chosen diet
    pub fn available_food_groups(&self) -> Vec<FoodGroup> {
        filter_groups_for_diet(&self.food_groups, self.answers.diet.unwrap_or_default())
    }

    /// Groups picked so far, in option-list order
    pub fn selected_food_groups(&self) -> Vec<&FoodGroup> {
        self.food_groups
            .iter()
            .filter(|g| self.answers.food_group_ids.contains(&g.id))
            .collect()
    }

    pub fn choose_diet(&mut self, diet: DietType) -> Result<(), WizardError> {
        self.require_step(NutritionStep::DietType, "choosing a diet")?;
        self.answers.diet = Some(diet);
        let allowed: BTreeSet<Uuid> = self.available_food_groups().into_iter().map(|g| g.id).collect();
        self.answers.food_group_ids.retain(|id| allowed.contains(id));
        Ok(())
    }

    /// Select or deselect an allergen; returns whether it is now selected
    pub fn toggle_allergen(&mut self, allergen_id: Uuid) -> Result<bool, WizardError> {
        self.require_step(NutritionStep::Allergies, "selecting allergens")?;
        if !self.allergens.iter().any(|a| a.id == allergen_id) {
            return Err(WizardError::UnknownOption(allergen_id.to_string()));
        }
        Ok(toggle(&mut self.answers.allergen_ids, allergen_id))
    }

    /// Select or deselect a food group; returns whether it is now selected
    ///
    /// Suggestions and food picks made for the old selection are dropped.
    pub fn toggle_food_group(&mut self, group_id: Uuid) -> Result<bool, WizardError> {
        self.require_step(NutritionStep::FoodPreferences, "selecting food groups")?;
        if !self.available_food_groups().iter().any(|g| g.id == group_id) {
            return Err(WizardError::UnknownOption(group_id.to_string()));
        }
        self.clear_suggestions();
        Ok(toggle(&mut self.answers.food_group_ids, group_id))
    }

    /// Hand over the best-food suggestions computed for the selected groups
    pub fn supply_best_foods(&mut self, best_foods: Vec<BestFoodGroup>) -> Result<(), WizardError> {
        self.require_step(NutritionStep::Calculating, "supplying best foods")?;
        if let Some(stray) = best_foods
            .iter()
            .find(|b| !self.answers.food_group_ids.contains(&b.group.id))
        {
            return Err(WizardError::UnknownOption(stray.group.id.to_string()));
        }
        self.best_foods = Some(best_foods);
        Ok(())
    }

    pub fn choose_food(&mut self, group_id: Uuid, food_id: Uuid) -> Result<(), WizardError> {
        self.require_step(NutritionStep::BestFoods, "choosing a food")?;
        let offered = self
            .best_foods
            .iter()
            .flatten()
            .filter(|b| b.group.id == group_id)
            .any(|b| b.foods.iter().any(|f| f.id == food_id));
        if !offered {
            return Err(WizardError::UnknownOption(food_id.to_string()));
        }
        self.answers.chosen_foods.insert(group_id, food_id);
        Ok(())
    }

    /// The submission for the finished questionnaire
    pub fn submission(&self) -> Result<NutritionAssessmentInput, WizardError> {
        if self.step != NutritionStep::Done {
            return Err(WizardError::NotReady("the questionnaire to finish"));
        }
        let food_preferences = self
            .food_groups
            .iter()
            .filter(|g| self.answers.food_group_ids.contains(&g.id))
            .filter_map(|g| {
                self.answers.chosen_foods.get(&g.id).map(|food_id| FoodPreference {
                    food_id: *food_id,
                    food_group_id: g.id,
                    category: g.category,
                })
            })
            .collect();

        Ok(NutritionAssessmentInput {
            diet_type: self.answers.diet.unwrap_or_default(),
            allergens: self.answers.allergen_ids.iter().copied().collect(),
            food_preferences,
        })
    }

    fn clear_suggestions(&mut self) {
        self.best_foods = None;
        self.answers.chosen_foods.clear();
    }

    fn require_step(&self, expected: NutritionStep, action: &'static str) -> Result<(), WizardError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(WizardError::WrongStep {
                action,
                step: format!("{:?}", self.step),
            })
        }
    }
}

fn toggle(set: &mut BTreeSet<Uuid>, id: Uuid) -> bool {
    if set.remove(&id) {
        false
    } else {
        set.insert(id);
        true
    }
}

impl AssessmentWizard for NutritionWizard {
    type Step = NutritionStep;

    fn step(&self) -> NutritionStep {
        self.step
    }

    fn next(&mut self) -> Result<NutritionStep, WizardError> {
        match self.step {
            NutritionStep::Done => return Err(WizardError::Finished),
            NutritionStep::DietType if self.answers.diet.is_none() => {
                return Err(WizardError::MissingAnswer("diet type"));
            }
            NutritionStep::FoodPreferences if self.answers.food_group_ids.is_empty() => {
                return Err(WizardError::MissingAnswer("at least one food group"));
            }
            NutritionStep::Calculating if self.best_foods.is_none() => {
                return Err(WizardError::NotReady("best food suggestions"));
            }
            NutritionStep::BestFoods if self.answers.chosen_foods.is_empty() => {
                return Err(WizardError::MissingAnswer("at least one food"));
            }
            _ => {}
        }
        if let Some(next) = neighbour(&NutritionStep::ORDER, self.step, 1) {
            self.step = next;
        }
        Ok(self.step)
    }

    fn back(&mut self) -> NutritionStep {
        self.step = match self.step {
            // Suggestions depend on the group selection, so they are recomputed
            NutritionStep::Calculating | NutritionStep::BestFoods => {
                self.clear_suggestions();
                NutritionStep::FoodPreferences
            }
            step => neighbour(&NutritionStep::ORDER, step, -1).unwrap_or(step),
        };
        self.step
    }

    fn progress(&self) -> (usize, usize) {
        (position(&NutritionStep::ORDER, &self.step), NutritionStep::ORDER.len())
    }

    fn is_done(&self) -> bool {
        self.step == NutritionStep::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MacroCategory;
    use rust_decimal::Decimal;

    fn group(name: &str, category: MacroCategory, is_meat: bool, is_red_meat: bool) -> FoodGroup {
        FoodGroup {
            id: Uuid::new_v4(),
            name: name.to_string(),
            category,
            is_meat,
            is_red_meat,
        }
    }

    fn item(group_id: Uuid, name: &str) -> FoodItem {
        FoodItem {
            id: Uuid::new_v4(),
            group_id,
            name: name.to_string(),
            calories_per_100g: Decimal::from(100),
            protein_per_100g: Decimal::from(20),
            carbs_per_100g: Decimal::ZERO,
            fats_per_100g: Decimal::from(2),
            reference_grams: Decimal::ONE_HUNDRED,
        }
    }

    #[test]
    fn vegetarian_hides_meat_and_drops_prior_picks() {
        let beef = group("Beef", MacroCategory::Protein, true, true);
        let tofu = group("Tofu", MacroCategory::Protein, false, false);
        let mut wizard = NutritionWizard::new(vec![beef.clone(), tofu.clone()], vec![]);

        wizard.next().unwrap();
        wizard.choose_diet(DietType::Balanced).unwrap();
        wizard.next().unwrap();
        wizard.next().unwrap();
        wizard.toggle_food_group(beef.id).unwrap();
        wizard.back();
        wizard.back();
        wizard.choose_diet(DietType::Vegetarian).unwrap();

        assert!(wizard.answers().food_group_ids.is_empty());
        assert_eq!(wizard.available_food_groups(), vec![tofu]);
    }

    #[test]
    fn back_from_best_foods_skips_calculating() {
        let chicken = group("Chicken", MacroCategory::Protein, true, false);
        let mut wizard = NutritionWizard::new(vec![chicken.clone()], vec![]);
        wizard.next().unwrap();
        wizard.choose_diet(DietType::NoRedMeat).unwrap();
        wizard.next().unwrap();
        wizard.next().unwrap();
        wizard.toggle_food_group(chicken.id).unwrap();
        assert_eq!(wizard.next(), Ok(NutritionStep::Calculating));
        assert_eq!(wizard.next(), Err(WizardError::NotReady("best food suggestions")));

        let breast = item(chicken.id, "Breast");
        wizard
            .supply_best_foods(vec![BestFoodGroup { group: chicken.clone(), foods: vec![breast.clone()] }])
            .unwrap();
        assert_eq!(wizard.next(), Ok(NutritionStep::BestFoods));
        wizard.choose_food(chicken.id, breast.id).unwrap();

        assert_eq!(wizard.back(), NutritionStep::FoodPreferences);
        assert!(wizard.best_foods().is_none());
        assert!(wizard.answers().chosen_foods.is_empty());
    }

    #[test]
    fn completed_flow_produces_submission() {
        let rice = group("Rice", MacroCategory::Carb, false, false);
        let mut wizard = NutritionWizard::new(vec![rice.clone()], vec![]);
        wizard.next().unwrap();
        wizard.choose_diet(DietType::Balanced).unwrap();
        wizard.next().unwrap();
        wizard.next().unwrap();
        wizard.toggle_food_group(rice.id).unwrap();
        wizard.next().unwrap();
        let jasmine = item(rice.id, "Jasmine rice");
        wizard
            .supply_best_foods(vec![BestFoodGroup { group: rice.clone(), foods: vec![jasmine.clone()] }])
            .unwrap();
        wizard.next().unwrap();
        wizard.choose_food(rice.id, jasmine.id).unwrap();
        assert_eq!(wizard.next(), Ok(NutritionStep::Done));
        assert!(wizard.is_done());

        let submission = wizard.submission().unwrap();
        assert_eq!(
            submission.food_preferences,
            vec![FoodPreference { food_id: jasmine.id, food_group_id: rice.id, category: MacroCategory::Carb }]
        );
        assert_eq!(wizard.next(), Err(WizardError::Finished));
    }

    #[test]
    fn actions_rejected_on_wrong_step() {
        let mut wizard = NutritionWizard::new(vec![], vec![]);
        assert!(matches!(
            wizard.choose_diet(DietType::Vegetarian),
            Err(WizardError::WrongStep { .. })
        ));
        assert_eq!(wizard.back(), NutritionStep::Welcome);
        assert_eq!(wizard.progress(), (1, 7));
    }
}
