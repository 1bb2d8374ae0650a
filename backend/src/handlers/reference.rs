//! Reference data handlers: macro breakdowns, food library, allergens

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::{Allergen, DietType, FoodGroup, FoodItem, MacroBreakdown};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    services::ReferenceService,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct DietQuery {
    pub diet: Option<String>,
}

impl DietQuery {
    fn diet(&self) -> AppResult<DietType> {
        match self.diet.as_deref() {
            None => Ok(DietType::default()),
            Some(raw) => raw.parse().map_err(|e: shared::UnknownVariant| AppError::Validation {
                field: "diet".to_string(),
                message: e.to_string(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BestFoodsResponse {
    pub group: FoodGroup,
    pub foods: Vec<FoodItem>,
}

pub async fn get_macro_breakdown(
    State(state): State<AppState>,
    Path(goal_type): Path<String>,
) -> AppResult<Json<MacroBreakdown>> {
    let service = ReferenceService::new(state.db);
    let breakdown = service.macro_breakdown_for_goal(&goal_type).await?;
    Ok(Json(breakdown))
}

/// Food groups allowed under the requested diet
pub async fn list_food_groups(
    State(state): State<AppState>,
    Query(query): Query<DietQuery>,
) -> AppResult<Json<Vec<FoodGroup>>> {
    let diet = query.diet()?;
    let service = ReferenceService::new(state.db);
    Ok(Json(service.food_groups(diet).await?))
}

pub async fn list_foods_in_group(
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
) -> AppResult<Json<Vec<FoodItem>>> {
    let service = ReferenceService::new(state.db);
    Ok(Json(service.foods_in_group(group_id).await?))
}

pub async fn get_best_foods(
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
) -> AppResult<Json<BestFoodsResponse>> {
    let service = ReferenceService::new(state.db);
    let (group, foods) = service.best_foods(group_id).await?;
    Ok(Json(BestFoodsResponse { group, foods }))
}

pub async fn list_allergens(State(state): State<AppState>) -> AppResult<Json<Vec<Allergen>>> {
    let service = ReferenceService::new(state.db);
    Ok(Json(service.allergens().await?))
}
