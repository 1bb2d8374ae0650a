//! Read-only reference data: macro breakdowns, food library, allergens

use rust_decimal::Decimal;
use shared::{
    filter_groups_for_diet, rank_best_foods, Allergen, DietType, FoodGroup, FoodItem,
    MacroBreakdown, SelectedFood,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Reference data service
#[derive(Clone)]
pub struct ReferenceService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct FoodGroupRow {
    id: Uuid,
    name: String,
    category: String,
    is_meat: bool,
    is_red_meat: bool,
}

impl TryFrom<FoodGroupRow> for FoodGroup {
    type Error = AppError;

    fn try_from(row: FoodGroupRow) -> Result<Self, Self::Error> {
        Ok(FoodGroup {
            id: row.id,
            name: row.name,
            category: parse_category(&row.category)?,
            is_meat: row.is_meat,
            is_red_meat: row.is_red_meat,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct FoodRow {
    id: Uuid,
    group_id: Uuid,
    name: String,
    calories_per_100g: Decimal,
    protein_per_100g: Decimal,
    carbs_per_100g: Decimal,
    fats_per_100g: Decimal,
    reference_grams: Decimal,
}

impl From<FoodRow> for FoodItem {
    fn from(row: FoodRow) -> Self {
        FoodItem {
            id: row.id,
            group_id: row.group_id,
            name: row.name,
            calories_per_100g: row.calories_per_100g,
            protein_per_100g: row.protein_per_100g,
            carbs_per_100g: row.carbs_per_100g,
            fats_per_100g: row.fats_per_100g,
            reference_grams: row.reference_grams,
        }
    }
}

/// Food joined with its group's category, as the planner consumes it
#[derive(Debug, sqlx::FromRow)]
struct SelectedFoodRow {
    id: Uuid,
    group_id: Uuid,
    name: String,
    category: String,
    calories_per_100g: Decimal,
    protein_per_100g: Decimal,
    carbs_per_100g: Decimal,
    fats_per_100g: Decimal,
    reference_grams: Decimal,
}

impl TryFrom<SelectedFoodRow> for SelectedFood {
    type Error = AppError;

    fn try_from(row: SelectedFoodRow) -> Result<Self, Self::Error> {
        Ok(SelectedFood {
            food_id: row.id,
            group_id: row.group_id,
            name: row.name,
            category: parse_category(&row.category)?,
            calories_per_100g: row.calories_per_100g,
            protein_per_100g: row.protein_per_100g,
            carbs_per_100g: row.carbs_per_100g,
            fats_per_100g: row.fats_per_100g,
            reference_grams: row.reference_grams,
        })
    }
}

pub(crate) fn parse_category(label: &str) -> AppResult<shared::MacroCategory> {
    label
        .parse()
        .map_err(|e: shared::UnknownVariant| AppError::Internal(e.to_string()))
}

/// Goal types are matched ignoring case and surrounding whitespace
pub(crate) fn normalize_goal_type(goal_type: &str) -> String {
    goal_type.trim().to_lowercase()
}

impl ReferenceService {
    /// Create a new ReferenceService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Macro breakdown configured for a goal type
    pub async fn macro_breakdown_for_goal(&self, goal_type: &str) -> AppResult<MacroBreakdown> {
        sqlx::query_as::<_, (Uuid, String, Decimal, Decimal, Decimal)>(
            r#"
            SELECT id, goal_type, protein_pct, carbs_pct, fats_pct
            FROM macro_breakdowns
            WHERE LOWER(TRIM(goal_type)) = $1
            "#,
        )
        .bind(normalize_goal_type(goal_type))
        .fetch_optional(&self.db)
        .await?
        .map(|(id, goal_type, protein_pct, carbs_pct, fats_pct)| MacroBreakdown {
            id,
            goal_type,
            protein_pct,
            carbs_pct,
            fats_pct,
        })
        .ok_or_else(|| AppError::MacroBreakdownNotFound(goal_type.trim().to_string()))
    }

    /// Food groups allowed under a diet, ordered by category then name
    pub async fn food_groups(&self, diet: DietType) -> AppResult<Vec<FoodGroup>> {
        let rows = sqlx::query_as::<_, FoodGroupRow>(
            r#"
            SELECT id, name, category, is_meat, is_red_meat
            FROM food_groups
            ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let mut groups = rows
            .into_iter()
            .map(FoodGroup::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        groups.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));

        Ok(filter_groups_for_diet(&groups, diet))
    }

    pub async fn food_group(&self, group_id: Uuid) -> AppResult<FoodGroup> {
        sqlx::query_as::<_, FoodGroupRow>(
            "SELECT id, name, category, is_meat, is_red_meat FROM food_groups WHERE id = $1",
        )
        .bind(group_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Food group".to_string()))?
        .try_into()
    }

    /// Every food in a group, by name
    pub async fn foods_in_group(&self, group_id: Uuid) -> AppResult<Vec<FoodItem>> {
        // Surface a 404 for unknown groups instead of an empty list
        self.food_group(group_id).await?;

        let rows = sqlx::query_as::<_, FoodRow>(
            r#"
            SELECT id, group_id, name, calories_per_100g, protein_per_100g,
                   carbs_per_100g, fats_per_100g, reference_grams
            FROM food_library
            WHERE group_id = $1
            ORDER BY name
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(FoodItem::from).collect())
    }

    /// The top foods of a group ranked for its category
    pub async fn best_foods(&self, group_id: Uuid) -> AppResult<(FoodGroup, Vec<FoodItem>)> {
        let group = self.food_group(group_id).await?;
        let foods = self.foods_in_group(group_id).await?;
        let best = rank_best_foods(group.category, foods);
        Ok((group, best))
    }

    pub async fn allergens(&self) -> AppResult<Vec<Allergen>> {
        let rows = sqlx::query_as::<_, (Uuid, String)>("SELECT id, name FROM allergens ORDER BY name")
            .fetch_all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| Allergen { id, name })
            .collect())
    }

    /// Library foods for the given ids, categorised by their group
    ///
    /// Unknown ids are silently absent from the result.
    pub async fn selected_foods(&self, food_ids: &[Uuid]) -> AppResult<Vec<SelectedFood>> {
        if food_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, SelectedFoodRow>(
            r#"
            SELECT f.id, f.group_id, f.name, g.category,
                   f.calories_per_100g, f.protein_per_100g, f.carbs_per_100g,
                   f.fats_per_100g, f.reference_grams
            FROM food_library f
            JOIN food_groups g ON g.id = f.group_id
            WHERE f.id = ANY($1)
            "#,
        )
        .bind(food_ids)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(SelectedFood::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goal_type_normalized_for_lookup() {
        assert_eq!(normalize_goal_type("  Fat Loss "), "fat loss");
        assert_eq!(normalize_goal_type("MUSCLE GAIN"), "muscle gain");
    }

    #[test]
    fn stored_category_labels_parse() {
        assert_eq!(parse_category("fruit").unwrap(), shared::MacroCategory::Fruit);
        assert!(matches!(parse_category("fat"), Err(AppError::Internal(_))));
    }
}
