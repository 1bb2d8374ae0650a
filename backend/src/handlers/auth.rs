//! Authentication handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use shared::MemberProfile;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::CurrentMember;
use crate::services::auth::{
    ChangePasswordInput, ForgotPasswordInput, LoginInput, LoginOutcome, ResetPasswordInput,
    VerifyOtpInput, VerifyResetOtpInput,
};
use crate::services::{AuthService, MemberService};
use crate::AppState;

#[derive(Serialize)]
pub struct LoginResponse {
    pub requires_otp: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<MemberProfile>,
}

impl LoginResponse {
    fn otp_required() -> Self {
        Self {
            requires_otp: true,
            access_token: None,
            token_type: None,
            expires_in: None,
            member: None,
        }
    }
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

fn auth_service(state: &AppState) -> AuthService {
    AuthService::new(state.db.clone(), &state.config, state.otp_delivery.clone())
}

async fn signed_in(
    state: &AppState,
    tokens: crate::services::auth::AuthTokens,
) -> AppResult<LoginResponse> {
    let member = MemberService::new(state.db.clone())
        .get_profile(tokens.member_id)
        .await?;

    Ok(LoginResponse {
        requires_otp: false,
        access_token: Some(tokens.access_token),
        token_type: Some(tokens.token_type),
        expires_in: Some(tokens.expires_in),
        member: Some(member),
    })
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginInput>,
) -> AppResult<Json<LoginResponse>> {
    body.validate()?;
    let service = auth_service(&state);

    match service.login(body).await? {
        LoginOutcome::Authenticated(tokens) => Ok(Json(signed_in(&state, tokens).await?)),
        LoginOutcome::OtpRequired { .. } => Ok(Json(LoginResponse::otp_required())),
    }
}

/// Second login step for devices that are not yet trusted
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpInput>,
) -> AppResult<Json<LoginResponse>> {
    body.validate()?;
    let service = auth_service(&state);
    let tokens = service.verify_login_otp(body).await?;

    Ok(Json(signed_in(&state, tokens).await?))
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordInput>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    body.validate()?;
    auth_service(&state)
        .forgot_password(body)
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            message: "If the account exists, a reset code has been sent",
        }),
    ))
}

/// Confirm a reset code before the member picks a new password
pub async fn verify_forgot_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyResetOtpInput>,
) -> AppResult<Json<MessageResponse>> {
    body.validate()?;
    auth_service(&state).verify_reset_otp(body).await?;

    Ok(Json(MessageResponse {
        message: "Verification code is valid",
    }))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordInput>,
) -> AppResult<Json<MessageResponse>> {
    body.validate()?;
    auth_service(&state)
        .reset_password(body)
        .await?;

    Ok(Json(MessageResponse {
        message: "Password has been reset",
    }))
}

pub async fn change_password(
    State(state): State<AppState>,
    current_member: CurrentMember,
    Json(body): Json<ChangePasswordInput>,
) -> AppResult<Json<MessageResponse>> {
    body.validate()?;
    auth_service(&state)
        .change_password(current_member.0.member_id, body)
        .await?;

    Ok(Json(MessageResponse {
        message: "Password changed",
    }))
}
