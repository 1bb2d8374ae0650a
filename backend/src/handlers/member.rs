//! Member profile and onboarding handlers

use axum::{extract::State, http::StatusCode, Json};
use shared::{InitialAssessment, InitialAssessmentInput, MemberProfile};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    middleware::CurrentMember,
    services::MemberService,
    AppState,
};

/// Profile of the signed-in member
pub async fn get_me(
    State(state): State<AppState>,
    current_member: CurrentMember,
) -> AppResult<Json<MemberProfile>> {
    let service = MemberService::new(state.db);
    let profile = service.get_profile(current_member.0.member_id).await?;
    Ok(Json(profile))
}

pub async fn save_initial_assessment(
    State(state): State<AppState>,
    current_member: CurrentMember,
    Json(input): Json<InitialAssessmentInput>,
) -> AppResult<(StatusCode, Json<InitialAssessment>)> {
    input.validate()?;
    let service = MemberService::new(state.db);
    let assessment = service
        .save_initial_assessment(current_member.0.member_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(assessment)))
}

pub async fn get_initial_assessment(
    State(state): State<AppState>,
    current_member: CurrentMember,
) -> AppResult<Json<InitialAssessment>> {
    let service = MemberService::new(state.db);
    service
        .get_initial_assessment(current_member.0.member_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Initial assessment".to_string()))
}
