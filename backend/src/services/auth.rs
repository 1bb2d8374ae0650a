//! Member authentication: password login, one-time codes, trusted devices
//!
//! Codes are stored as keyed digests and discarded after too many wrong
//! guesses.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use jsonwebtoken::{encode, EncodingKey, Header};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use shared::OtpPurpose;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::Claims;
use crate::services::otp_delivery::OtpDelivery;

type HmacSha256 = Hmac<Sha256>;

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
    otp_expiry_minutes: i64,
    trusted_device_hours: i64,
    otp_max_attempts: i32,
    delivery: Arc<dyn OtpDelivery>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    /// Client-generated identifier of the device signing in
    pub device_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyOtpInput {
    #[validate(email)]
    pub email: String,
    pub otp: String,
    pub device_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordInput {
    #[validate(email)]
    pub email: String,
}

/// Reset code check made before the new password is chosen
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyResetOtpInput {
    #[validate(email)]
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordInput {
    #[validate(email)]
    pub email: String,
    pub otp: String,
    #[validate(length(min = 8))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordInput {
    pub current_password: String,
    #[validate(length(min = 8))]
    pub new_password: String,
}

/// Authentication tokens
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub member_id: Uuid,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Result of a password login
#[derive(Debug)]
pub enum LoginOutcome {
    /// The device is trusted; the member is signed in
    Authenticated(AuthTokens),
    /// A code was sent and must be verified
    OtpRequired { member_id: Uuid },
}

#[derive(Debug, sqlx::FromRow)]
struct MemberCredentialRow {
    id: Uuid,
    email: String,
    password_hash: String,
    is_active: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct StoredOtpRow {
    code_digest: String,
}

/// Uniform six-digit code, leading zeros kept
fn generate_otp_code() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000u32))
}

/// A code is discarded once it has taken this many wrong guesses
fn attempts_exhausted(attempts: i32, max_attempts: i32) -> bool {
    attempts >= max_attempts.max(1)
}

fn otp_mac(secret: &str, member_id: Uuid, purpose: OtpPurpose, code: &str) -> AppResult<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(format!("OTP key rejected: {}", e)))?;
    mac.update(format!("{}:{}:{}", member_id, purpose.as_str(), code).as_bytes());
    Ok(mac)
}

/// Stored form of a code; the plain code never reaches the database
fn otp_digest(secret: &str, member_id: Uuid, purpose: OtpPurpose, code: &str) -> AppResult<String> {
    let mac = otp_mac(secret, member_id, purpose, code)?;
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

fn otp_matches(secret: &str, member_id: Uuid, purpose: OtpPurpose, code: &str, digest: &str) -> bool {
    let Ok(expected) = BASE64.decode(digest) else {
        return false;
    };
    otp_mac(secret, member_id, purpose, code)
        .map(|mac| mac.verify_slice(&expected).is_ok())
        .unwrap_or(false)
}

fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

fn check_password_rules(password: &str) -> AppResult<()> {
    shared::validate_password(password).map_err(|msg| AppError::Validation {
        field: "new_password".to_string(),
        message: msg.to_string(),
    })
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config, delivery: Arc<dyn OtpDelivery>) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            otp_expiry_minutes: config.auth.otp_expiry_minutes,
            trusted_device_hours: config.auth.trusted_device_hours,
            otp_max_attempts: config.auth.otp_max_attempts,
            delivery,
        }
    }

    /// Check the password; sign in directly from a trusted device, otherwise send a code
    pub async fn login(&self, input: LoginInput) -> AppResult<LoginOutcome> {
        let member = self
            .find_member(&input.email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !member.is_active {
            return Err(AppError::Unauthorized("Account is disabled".to_string()));
        }

        let valid = verify(&input.password, &member.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        if let Some(device_id) = input.device_id.as_deref() {
            if self.is_trusted_device(member.id, device_id).await? {
                tracing::debug!(member_id = %member.id, "login from trusted device");
                self.touch_last_login(member.id).await?;
                return self
                    .generate_access_token(member.id, &member.email)
                    .map(LoginOutcome::Authenticated);
            }
        }

        self.issue_otp(member.id, &member.email, OtpPurpose::Login).await?;
        Ok(LoginOutcome::OtpRequired { member_id: member.id })
    }

    /// Verify a login code, trust the device and issue a token
    pub async fn verify_login_otp(&self, input: VerifyOtpInput) -> AppResult<AuthTokens> {
        let member = self
            .find_member(&input.email)
            .await?
            .ok_or(AppError::InvalidOtp)?;

        self.check_otp(member.id, OtpPurpose::Login, &input.otp, true)
            .await?;

        if let Some(device_id) = input.device_id.as_deref() {
            self.trust_device(member.id, device_id).await?;
        }
        self.touch_last_login(member.id).await?;

        tracing::info!(member_id = %member.id, "member signed in");
        self.generate_access_token(member.id, &member.email)
    }

    /// Send a reset code; unknown emails succeed silently
    pub async fn forgot_password(&self, input: ForgotPasswordInput) -> AppResult<()> {
        match self.find_member(&input.email).await? {
            Some(member) if member.is_active => {
                self.issue_otp(member.id, &member.email, OtpPurpose::PasswordReset)
                    .await
            }
            _ => {
                tracing::debug!("password reset requested for unknown or inactive account");
                Ok(())
            }
        }
    }

    /// Check a reset code without using it up; wrong guesses still count
    pub async fn verify_reset_otp(&self, input: VerifyResetOtpInput) -> AppResult<()> {
        let member = self
            .find_member(&input.email)
            .await?
            .ok_or(AppError::InvalidOtp)?;

        self.check_otp(member.id, OtpPurpose::PasswordReset, &input.otp, false)
            .await
    }

    pub async fn reset_password(&self, input: ResetPasswordInput) -> AppResult<()> {
        check_password_rules(&input.new_password)?;

        let member = self
            .find_member(&input.email)
            .await?
            .ok_or(AppError::InvalidOtp)?;

        self.check_otp(member.id, OtpPurpose::PasswordReset, &input.otp, true)
            .await?;
        self.store_password(member.id, &input.new_password).await?;

        // Devices trusted under the old password must verify again
        sqlx::query("DELETE FROM trusted_devices WHERE member_id = $1")
            .bind(member.id)
            .execute(&self.db)
            .await?;

        tracing::info!(member_id = %member.id, "password reset");
        Ok(())
    }

    pub async fn change_password(&self, member_id: Uuid, input: ChangePasswordInput) -> AppResult<()> {
        check_password_rules(&input.new_password)?;

        let current_hash = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM members WHERE id = $1 AND is_active",
        )
        .bind(member_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Member".to_string()))?;

        let valid = verify(&input.current_password, &current_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            return Err(AppError::Validation {
                field: "current_password".to_string(),
                message: "Current password is incorrect".to_string(),
            });
        }

        self.store_password(member_id, &input.new_password).await?;
        tracing::info!(member_id = %member_id, "password changed");
        Ok(())
    }

    async fn find_member(&self, email: &str) -> AppResult<Option<MemberCredentialRow>> {
        let row = sqlx::query_as::<_, MemberCredentialRow>(
            r#"
            SELECT id, email, password_hash, is_active
            FROM members
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email.trim())
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    async fn store_password(&self, member_id: Uuid, password: &str) -> AppResult<()> {
        let password_hash = hash_password(password)?;
        sqlx::query("UPDATE members SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(member_id)
            .bind(&password_hash)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn touch_last_login(&self, member_id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE members SET last_login_at = NOW() WHERE id = $1")
            .bind(member_id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    /// Replace any outstanding code of the same purpose and deliver a new one
    async fn issue_otp(&self, member_id: Uuid, email: &str, purpose: OtpPurpose) -> AppResult<()> {
        let code = generate_otp_code();
        let digest = otp_digest(&self.jwt_secret, member_id, purpose, &code)?;
        let expires_at = Utc::now() + Duration::minutes(self.otp_expiry_minutes);

        sqlx::query(
            r#"
            INSERT INTO member_otps (member_id, purpose, code_digest, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (member_id, purpose) DO UPDATE SET
                code_digest = EXCLUDED.code_digest,
                expires_at = EXCLUDED.expires_at,
                attempts = 0,
                created_at = NOW()
            "#,
        )
        .bind(member_id)
        .bind(purpose.as_str())
        .bind(&digest)
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        self.delivery.deliver(email, purpose, &code).await
    }

    /// Check a code; a matching code is deleted when `consume` is set so it
    /// cannot be used twice
    async fn check_otp(
        &self,
        member_id: Uuid,
        purpose: OtpPurpose,
        code: &str,
        consume: bool,
    ) -> AppResult<()> {
        shared::validate_otp_format(code).map_err(|_| AppError::InvalidOtp)?;

        let stored = sqlx::query_as::<_, StoredOtpRow>(
            r#"
            SELECT code_digest FROM member_otps
            WHERE member_id = $1 AND purpose = $2 AND expires_at > NOW()
            "#,
        )
        .bind(member_id)
        .bind(purpose.as_str())
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidOtp)?;

        if !otp_matches(&self.jwt_secret, member_id, purpose, code, &stored.code_digest) {
            self.record_failed_attempt(member_id, purpose).await?;
            return Err(AppError::InvalidOtp);
        }

        if consume {
            self.delete_otp(member_id, purpose).await?;
        }
        Ok(())
    }

    async fn record_failed_attempt(&self, member_id: Uuid, purpose: OtpPurpose) -> AppResult<()> {
        let attempts = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE member_otps SET attempts = attempts + 1
            WHERE member_id = $1 AND purpose = $2
            RETURNING attempts
            "#,
        )
        .bind(member_id)
        .bind(purpose.as_str())
        .fetch_optional(&self.db)
        .await?;

        if let Some(attempts) = attempts {
            if attempts_exhausted(attempts, self.otp_max_attempts) {
                tracing::warn!(member_id = %member_id, purpose = purpose.as_str(), "verification code discarded after repeated failures");
                self.delete_otp(member_id, purpose).await?;
            }
        }
        Ok(())
    }

    async fn delete_otp(&self, member_id: Uuid, purpose: OtpPurpose) -> AppResult<()> {
        sqlx::query("DELETE FROM member_otps WHERE member_id = $1 AND purpose = $2")
            .bind(member_id)
            .bind(purpose.as_str())
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn is_trusted_device(&self, member_id: Uuid, device_id: &str) -> AppResult<bool> {
        let trusted = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM trusted_devices
                WHERE member_id = $1 AND device_id = $2 AND trusted_until > NOW()
            )
            "#,
        )
        .bind(member_id)
        .bind(device_id)
        .fetch_one(&self.db)
        .await?;

        Ok(trusted)
    }

    async fn trust_device(&self, member_id: Uuid, device_id: &str) -> AppResult<()> {
        let trusted_until = Utc::now() + Duration::hours(self.trusted_device_hours);
        sqlx::query(
            r#"
            INSERT INTO trusted_devices (member_id, device_id, trusted_until)
            VALUES ($1, $2, $3)
            ON CONFLICT (member_id, device_id) DO UPDATE SET trusted_until = EXCLUDED.trusted_until
            "#,
        )
        .bind(member_id)
        .bind(device_id)
        .bind(trusted_until)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    fn generate_access_token(&self, member_id: Uuid, email: &str) -> AppResult<AuthTokens> {
        let now = Utc::now();
        let claims = Claims {
            sub: member_id.to_string(),
            email: email.to_string(),
            exp: (now + Duration::seconds(self.access_token_expiry)).timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        Ok(AuthTokens {
            member_id,
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }
}
