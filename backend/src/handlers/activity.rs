//! Gym visit history, payment log, balance and subscription handlers

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::{ActivityLogEntry, GymVisit, MemberBalance, SubscriptionStatus};

use crate::{
    error::AppResult,
    middleware::CurrentMember,
    services::activity::parse_system_type,
    services::ActivityService,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct ActivityLogQuery {
    pub system_type: Option<String>,
}

#[derive(Serialize)]
pub struct GymVisitsResponse {
    pub activities: Vec<GymVisit>,
}

#[derive(Serialize)]
pub struct ActivityLogResponse {
    pub transactions: Vec<ActivityLogEntry>,
}

pub async fn get_gym_visits(
    State(state): State<AppState>,
    current_member: CurrentMember,
) -> AppResult<Json<GymVisitsResponse>> {
    let service = ActivityService::new(state.db);
    let activities = service.gym_visits(current_member.0.member_id).await?;
    Ok(Json(GymVisitsResponse { activities }))
}

/// Payments and entry charges for the member's (or the requested) payment system
pub async fn get_activity_log(
    State(state): State<AppState>,
    current_member: CurrentMember,
    Query(query): Query<ActivityLogQuery>,
) -> AppResult<Json<ActivityLogResponse>> {
    let system = parse_system_type(query.system_type.as_deref())?;
    let service = ActivityService::new(state.db);
    let transactions = service
        .activity_log(current_member.0.member_id, system)
        .await?;
    Ok(Json(ActivityLogResponse { transactions }))
}

pub async fn get_balance(
    State(state): State<AppState>,
    current_member: CurrentMember,
) -> AppResult<Json<MemberBalance>> {
    let service = ActivityService::new(state.db);
    Ok(Json(service.balance(current_member.0.member_id).await?))
}

pub async fn get_subscription(
    State(state): State<AppState>,
    current_member: CurrentMember,
) -> AppResult<Json<SubscriptionStatus>> {
    let service = ActivityService::new(state.db);
    Ok(Json(service.subscription(current_member.0.member_id).await?))
}
