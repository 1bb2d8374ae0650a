//! Nutrition assessment service
//!
//! Resolves the member's targets, runs the planner and stores the
//! assessment with its per-food results through a [`PlanResultStore`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{
    compute_nutrition_plan, resolve_macro_targets, FoodPreference, MacroCategory, MacroTarget,
    NutritionAssessment, NutritionAssessmentInput, NutritionPlan, PlanSummary, PortionResult,
    SelectedFood,
};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::member::MemberService;
use crate::services::plan_store::{NewNutritionAssessment, PgPlanResultStore, PlanResultStore};
use crate::services::reference::{parse_category, ReferenceService};

/// Nutrition assessment service
#[derive(Clone)]
pub struct NutritionService {
    db: PgPool,
}

/// Response to a nutrition assessment submission
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NutritionPlanResponse {
    pub assessment_id: Uuid,
    pub computed: bool,
    pub target: MacroTarget,
    pub foods: Vec<PortionResult>,
    pub message: String,
}

/// A food group the member chose, with the food picked from it
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct FoodChoice {
    pub food_group_id: Uuid,
    pub group_name: String,
    pub category: String,
    pub food_id: Uuid,
    pub food_name: String,
}

#[derive(Debug, Serialize)]
pub struct CompletionStatus {
    pub completed: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct NutritionAssessmentRow {
    id: Uuid,
    member_id: Uuid,
    diet_type: String,
    allergen_ids: Json<Vec<Uuid>>,
    food_preferences: Json<Vec<FoodPreference>>,
    macro_breakdown_id: Uuid,
    calories_target: Decimal,
    protein_grams: Decimal,
    carbs_grams: Decimal,
    fats_grams: Decimal,
    created_at: DateTime<Utc>,
}

impl TryFrom<NutritionAssessmentRow> for NutritionAssessment {
    type Error = AppError;

    fn try_from(row: NutritionAssessmentRow) -> Result<Self, Self::Error> {
        let diet_type = row.diet_type.parse().map_err(|e: shared::UnknownVariant| {
            AppError::Internal(format!("Stored assessment {} has {}", row.id, e))
        })?;

        Ok(NutritionAssessment {
            id: row.id,
            member_id: row.member_id,
            diet_type,
            allergen_ids: row.allergen_ids.0,
            food_preferences: row.food_preferences.0,
            macro_breakdown_id: row.macro_breakdown_id,
            target: MacroTarget {
                calorie_target: row.calories_target,
                protein_grams: row.protein_grams,
                carb_grams: row.carbs_grams,
                fat_grams: row.fats_grams,
            },
            created_at: row.created_at,
        })
    }
}

const ASSESSMENT_COLUMNS: &str = "id, member_id, diet_type, allergen_ids, food_preferences, \
    macro_breakdown_id, calories_target, protein_grams, carbs_grams, fats_grams, created_at";

/// Plan `foods`, then store the assessment and its rows in place of the
/// member's previous ones
///
/// The plan is computed before anything is written, and a failed write
/// leaves the previous assessment in place.
pub async fn submit_and_store<S>(
    store: &S,
    assessment: &NewNutritionAssessment,
    foods: &[SelectedFood],
) -> AppResult<NutritionPlanResponse>
where
    S: PlanResultStore + ?Sized,
{
    let plan = compute_nutrition_plan(&assessment.target, foods);
    let assessment_id = store.replace_assessment(assessment, &plan.foods).await?;
    Ok(plan_response(assessment_id, foods.len(), plan))
}

/// Plan `foods` against `target` and replace an existing assessment's rows
pub async fn plan_and_store<S>(
    store: &S,
    assessment_id: Uuid,
    member_id: Uuid,
    target: &MacroTarget,
    foods: &[SelectedFood],
) -> AppResult<NutritionPlanResponse>
where
    S: PlanResultStore + ?Sized,
{
    let plan = compute_nutrition_plan(target, foods);
    store
        .replace_results(assessment_id, member_id, &plan.foods)
        .await?;
    Ok(plan_response(assessment_id, foods.len(), plan))
}

fn plan_response(assessment_id: Uuid, selected: usize, plan: NutritionPlan) -> NutritionPlanResponse {
    let message = if selected == 0 {
        "No foods selected"
    } else if !plan.is_computed() {
        "No plan computed: the selected foods provide no usable nutrients"
    } else {
        "Nutrition plan computed"
    };

    let totals = plan.totals();
    tracing::info!(
        assessment_id = %assessment_id,
        selected,
        planned = plan.foods.len(),
        scale_factor = ?plan.scale_factor,
        total_calories = %totals.calories,
        calorie_target = %plan.target.calorie_target,
        "nutrition plan stored"
    );

    NutritionPlanResponse {
        assessment_id,
        computed: plan.is_computed(),
        target: plan.target,
        foods: plan.foods,
        message: message.to_string(),
    }
}

/// Put library foods in the order the member selected them
fn in_selection_order(preferences: &[FoodPreference], mut foods: Vec<SelectedFood>) -> Vec<SelectedFood> {
    foods.sort_by_key(|f| {
        preferences
            .iter()
            .position(|p| p.food_id == f.food_id)
            .unwrap_or(usize::MAX)
    });
    foods
}

impl NutritionService {
    /// Create a new NutritionService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a nutrition assessment and compute its plan
    pub async fn submit_assessment(
        &self,
        member_id: Uuid,
        input: NutritionAssessmentInput,
    ) -> AppResult<NutritionPlanResponse> {
        let initial = MemberService::new(self.db.clone())
            .get_initial_assessment(member_id)
            .await?
            .ok_or(AppError::InitialAssessmentRequired("the nutrition assessment"))?;

        let reference = ReferenceService::new(self.db.clone());
        let breakdown = reference.macro_breakdown_for_goal(&initial.goal_type).await?;
        let target = resolve_macro_targets(initial.calories_target, &breakdown)?;
        tracing::debug!(
            member_id = %member_id,
            calorie_target = %target.calorie_target,
            implied_calories = %target.implied_calories(),
            "resolved macro targets"
        );

        let food_ids: Vec<Uuid> = input.food_preferences.iter().map(|p| p.food_id).collect();
        let foods = in_selection_order(
            &input.food_preferences,
            reference.selected_foods(&food_ids).await?,
        );
        if foods.len() < food_ids.len() {
            tracing::debug!(
                member_id = %member_id,
                requested = food_ids.len(),
                found = foods.len(),
                "some selected foods are not in the library"
            );
        }

        let assessment = NewNutritionAssessment {
            member_id,
            diet_type: input.diet_type,
            allergens: input.allergens,
            food_preferences: input.food_preferences,
            macro_breakdown_id: breakdown.id,
            target,
        };

        let store = PgPlanResultStore::new(self.db.clone());
        submit_and_store(&store, &assessment, &foods).await
    }

    /// Recompute the plan of a stored assessment from its saved answers and
    /// targets, picking up any change in the food library
    pub async fn regenerate_plan(
        &self,
        member_id: Uuid,
        assessment_id: Uuid,
    ) -> AppResult<NutritionPlanResponse> {
        let query = format!(
            "SELECT {} FROM nutrition_assessments WHERE id = $1 AND member_id = $2",
            ASSESSMENT_COLUMNS
        );
        let assessment: NutritionAssessment = sqlx::query_as::<_, NutritionAssessmentRow>(&query)
            .bind(assessment_id)
            .bind(member_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Nutrition assessment".to_string()))?
            .try_into()?;

        let food_ids: Vec<Uuid> = assessment.food_preferences.iter().map(|p| p.food_id).collect();
        let foods = in_selection_order(
            &assessment.food_preferences,
            ReferenceService::new(self.db.clone())
                .selected_foods(&food_ids)
                .await?,
        );

        tracing::debug!(member_id = %member_id, assessment_id = %assessment_id, "regenerating nutrition plan");
        let store = PgPlanResultStore::new(self.db.clone());
        plan_and_store(&store, assessment.id, member_id, &assessment.target, &foods).await
    }

    /// The member's most recent nutrition assessment
    pub async fn latest_assessment(&self, member_id: Uuid) -> AppResult<NutritionAssessment> {
        let query = format!(
            "SELECT {} FROM nutrition_assessments WHERE member_id = $1 ORDER BY created_at DESC LIMIT 1",
            ASSESSMENT_COLUMNS
        );
        sqlx::query_as::<_, NutritionAssessmentRow>(&query)
            .bind(member_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Nutrition assessment".to_string()))?
            .try_into()
    }

    /// Stored plan rows of the latest assessment with totals
    pub async fn results_summary(&self, member_id: Uuid) -> AppResult<PlanSummary> {
        let assessment = self.latest_assessment(member_id).await?;
        let results = PgPlanResultStore::new(self.db.clone())
            .get_results(assessment.id)
            .await?;

        if results.is_empty() {
            return Err(AppError::NotFound("Nutrition plan".to_string()));
        }
        Ok(PlanSummary::from_results(results))
    }

    /// Groups and foods picked in the latest assessment
    pub async fn food_choices(&self, member_id: Uuid) -> AppResult<Vec<FoodChoice>> {
        let assessment = self.latest_assessment(member_id).await?;
        let food_ids: Vec<Uuid> = assessment.food_preferences.iter().map(|p| p.food_id).collect();

        let mut choices = sqlx::query_as::<_, FoodChoice>(
            r#"
            SELECT g.id AS food_group_id, g.name AS group_name, g.category,
                   f.id AS food_id, f.name AS food_name
            FROM food_library f
            JOIN food_groups g ON g.id = f.group_id
            WHERE f.id = ANY($1)
            ORDER BY g.name, f.name
            "#,
        )
        .bind(&food_ids)
        .fetch_all(&self.db)
        .await?;

        let category_rank = |label: &str| parse_category(label).unwrap_or(MacroCategory::Vegetable);
        choices.sort_by(|a, b| category_rank(&a.category).cmp(&category_rank(&b.category)));
        Ok(choices)
    }

    /// Whether the member has a computed plan
    pub async fn status(&self, member_id: Uuid) -> AppResult<CompletionStatus> {
        let completed = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM member_nutrition_results WHERE member_id = $1)",
        )
        .bind(member_id)
        .fetch_one(&self.db)
        .await?;

        Ok(CompletionStatus { completed })
    }
}
