//! HTTP handlers for the nutrition assessment and its plan

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::{NutritionAssessment, NutritionAssessmentInput, PlanSummary};

use crate::{
    error::AppResult,
    middleware::CurrentMember,
    services::nutrition::{CompletionStatus, FoodChoice, NutritionPlanResponse},
    services::NutritionService,
    AppState,
};
use uuid::Uuid;

/// Submit questionnaire answers and compute the member's plan
pub async fn submit_nutrition_assessment(
    State(state): State<AppState>,
    current_member: CurrentMember,
    Json(input): Json<NutritionAssessmentInput>,
) -> AppResult<(StatusCode, Json<NutritionPlanResponse>)> {
    let service = NutritionService::new(state.db);
    let response = service
        .submit_assessment(current_member.0.member_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Recompute the plan of one of the member's stored assessments
pub async fn regenerate_nutrition_plan(
    State(state): State<AppState>,
    current_member: CurrentMember,
    Path(assessment_id): Path<Uuid>,
) -> AppResult<Json<NutritionPlanResponse>> {
    let service = NutritionService::new(state.db);
    let response = service
        .regenerate_plan(current_member.0.member_id, assessment_id)
        .await?;
    Ok(Json(response))
}

pub async fn get_latest_nutrition_assessment(
    State(state): State<AppState>,
    current_member: CurrentMember,
) -> AppResult<Json<NutritionAssessment>> {
    let service = NutritionService::new(state.db);
    Ok(Json(service.latest_assessment(current_member.0.member_id).await?))
}

/// Stored plan with totals
pub async fn get_nutrition_results(
    State(state): State<AppState>,
    current_member: CurrentMember,
) -> AppResult<Json<PlanSummary>> {
    let service = NutritionService::new(state.db);
    Ok(Json(service.results_summary(current_member.0.member_id).await?))
}

pub async fn get_food_choices(
    State(state): State<AppState>,
    current_member: CurrentMember,
) -> AppResult<Json<Vec<FoodChoice>>> {
    let service = NutritionService::new(state.db);
    Ok(Json(service.food_choices(current_member.0.member_id).await?))
}

pub async fn get_nutrition_status(
    State(state): State<AppState>,
    current_member: CurrentMember,
) -> AppResult<Json<CompletionStatus>> {
    let service = NutritionService::new(state.db);
    Ok(Json(service.status(current_member.0.member_id).await?))
}
