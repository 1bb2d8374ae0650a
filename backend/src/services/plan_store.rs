//! Storage of nutrition assessments and their computed plan rows

use rust_decimal::Decimal;
use shared::{DietType, FoodPreference, MacroTarget, PortionResult};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// A nutrition assessment ready to be stored
#[derive(Debug, Clone)]
pub struct NewNutritionAssessment {
    pub member_id: Uuid,
    pub diet_type: DietType,
    pub allergens: Vec<Uuid>,
    pub food_preferences: Vec<FoodPreference>,
    pub macro_breakdown_id: Uuid,
    pub target: MacroTarget,
}

/// Where assessments and their computed plan rows live
///
/// `replace_assessment` swaps the member's assessment and its rows in one
/// step; on failure the previous assessment and plan stay as they were.
/// `replace_results` swaps the row set of an existing assessment.
#[axum::async_trait]
pub trait PlanResultStore: Send + Sync {
    async fn replace_assessment(
        &self,
        assessment: &NewNutritionAssessment,
        results: &[PortionResult],
    ) -> AppResult<Uuid>;

    async fn replace_results(
        &self,
        assessment_id: Uuid,
        member_id: Uuid,
        results: &[PortionResult],
    ) -> AppResult<()>;

    async fn get_results(&self, assessment_id: Uuid) -> AppResult<Vec<PortionResult>>;
}

/// PostgreSQL-backed result store
#[derive(Clone)]
pub struct PgPlanResultStore {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct ResultRow {
    food_id: Uuid,
    food_name: String,
    group_id: Uuid,
    macro_type: String,
    portion_grams: Decimal,
    calories: Decimal,
    protein: Decimal,
    carbs: Decimal,
    fats: Decimal,
}

impl TryFrom<ResultRow> for PortionResult {
    type Error = AppError;

    fn try_from(row: ResultRow) -> Result<Self, Self::Error> {
        let category = row
            .macro_type
            .parse()
            .map_err(|e: shared::UnknownVariant| AppError::Internal(e.to_string()))?;

        Ok(PortionResult {
            food_id: row.food_id,
            food_name: row.food_name,
            group_id: row.group_id,
            category,
            portion_grams: row.portion_grams,
            calories: row.calories,
            protein: row.protein,
            carbs: row.carbs,
            fats: row.fats,
        })
    }
}

impl PgPlanResultStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

async fn insert_results(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    assessment_id: Uuid,
    member_id: Uuid,
    results: &[PortionResult],
) -> AppResult<()> {
    for result in results {
        sqlx::query(
            r#"
            INSERT INTO member_nutrition_results (
                assessment_id, member_id, food_id, group_id, food_name, macro_type,
                portion_grams, calories, protein, carbs, fats
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(assessment_id)
        .bind(member_id)
        .bind(result.food_id)
        .bind(result.group_id)
        .bind(&result.food_name)
        .bind(result.category.as_str())
        .bind(result.portion_grams)
        .bind(result.calories)
        .bind(result.protein)
        .bind(result.carbs)
        .bind(result.fats)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

#[axum::async_trait]
impl PlanResultStore for PgPlanResultStore {
    async fn replace_assessment(
        &self,
        assessment: &NewNutritionAssessment,
        results: &[PortionResult],
    ) -> AppResult<Uuid> {
        let mut tx = self.db.begin().await?;

        // Cascades to the previous assessment's result rows
        sqlx::query("DELETE FROM nutrition_assessments WHERE member_id = $1")
            .bind(assessment.member_id)
            .execute(&mut *tx)
            .await?;

        let assessment_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO nutrition_assessments (
                member_id, diet_type, allergen_ids, food_preferences, macro_breakdown_id,
                calories_target, protein_grams, carbs_grams, fats_grams
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(assessment.member_id)
        .bind(assessment.diet_type.as_str())
        .bind(Json(&assessment.allergens))
        .bind(Json(&assessment.food_preferences))
        .bind(assessment.macro_breakdown_id)
        .bind(assessment.target.calorie_target)
        .bind(assessment.target.protein_grams)
        .bind(assessment.target.carb_grams)
        .bind(assessment.target.fat_grams)
        .fetch_one(&mut *tx)
        .await?;

        insert_results(&mut tx, assessment_id, assessment.member_id, results).await?;

        tx.commit().await?;
        Ok(assessment_id)
    }

    async fn replace_results(
        &self,
        assessment_id: Uuid,
        member_id: Uuid,
        results: &[PortionResult],
    ) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM member_nutrition_results WHERE assessment_id = $1")
            .bind(assessment_id)
            .execute(&mut *tx)
            .await?;

        insert_results(&mut tx, assessment_id, member_id, results).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_results(&self, assessment_id: Uuid) -> AppResult<Vec<PortionResult>> {
        let rows = sqlx::query_as::<_, ResultRow>(
            r#"
            SELECT food_id, food_name, group_id, macro_type,
                   portion_grams, calories, protein, carbs, fats
            FROM member_nutrition_results
            WHERE assessment_id = $1
            "#,
        )
        .bind(assessment_id)
        .fetch_all(&self.db)
        .await?;

        let mut results = rows
            .into_iter()
            .map(PortionResult::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        // Category order is the enum's, not the stored label's
        results.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.food_name.cmp(&b.food_name)));
        Ok(results)
    }
}
