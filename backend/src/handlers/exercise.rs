//! HTTP handlers for splits, the exercise assessment and day completions

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::{ExerciseAssessment, ExerciseAssessmentInput, Split, SplitPreview};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    middleware::CurrentMember,
    services::exercise::{CompleteDayInput, CompletionRecorded, WorkoutPlan},
    services::nutrition::CompletionStatus,
    services::ExerciseService,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct SplitQuery {
    pub workout_days: i32,
}

pub async fn list_splits(
    State(state): State<AppState>,
    Query(query): Query<SplitQuery>,
) -> AppResult<Json<Vec<Split>>> {
    let service = ExerciseService::new(state.db);
    Ok(Json(service.splits_for_days(query.workout_days).await?))
}

pub async fn get_split_preview(
    State(state): State<AppState>,
    Path(split_id): Path<Uuid>,
) -> AppResult<Json<SplitPreview>> {
    let service = ExerciseService::new(state.db);
    Ok(Json(service.preview(split_id).await?))
}

pub async fn submit_exercise_assessment(
    State(state): State<AppState>,
    current_member: CurrentMember,
    Json(input): Json<ExerciseAssessmentInput>,
) -> AppResult<(StatusCode, Json<ExerciseAssessment>)> {
    input.validate()?;
    let service = ExerciseService::new(state.db);
    let assessment = service
        .submit_assessment(current_member.0.member_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(assessment)))
}

/// Latest assessment and the program it assigned
pub async fn get_workout_plan(
    State(state): State<AppState>,
    current_member: CurrentMember,
) -> AppResult<Json<WorkoutPlan>> {
    let service = ExerciseService::new(state.db);
    Ok(Json(service.workout_plan(current_member.0.member_id).await?))
}

pub async fn get_exercise_status(
    State(state): State<AppState>,
    current_member: CurrentMember,
) -> AppResult<Json<CompletionStatus>> {
    let service = ExerciseService::new(state.db);
    Ok(Json(service.status(current_member.0.member_id).await?))
}

pub async fn complete_day(
    State(state): State<AppState>,
    current_member: CurrentMember,
    Json(input): Json<CompleteDayInput>,
) -> AppResult<Json<CompletionRecorded>> {
    let service = ExerciseService::new(state.db);
    Ok(Json(
        service
            .complete_day(current_member.0.member_id, input)
            .await?,
    ))
}

pub async fn list_completions(
    State(state): State<AppState>,
    current_member: CurrentMember,
) -> AppResult<Json<BTreeMap<String, String>>> {
    let service = ExerciseService::new(state.db);
    Ok(Json(service.completions(current_member.0.member_id).await?))
}
