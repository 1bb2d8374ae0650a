//! Delivery of one-time codes to members
//!
//! Production sends each code to a mail relay webhook. The log-only
//! delivery exists for local development and is refused anywhere else.

use std::sync::Arc;

use serde::Serialize;
use shared::OtpPurpose;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Sends a one-time code to the member
#[axum::async_trait]
pub trait OtpDelivery: Send + Sync {
    async fn deliver(&self, email: &str, purpose: OtpPurpose, code: &str) -> AppResult<()>;
}

/// Delivery that only records the dispatch in the log
///
/// The code itself is never logged.
pub struct LogOtpDelivery;

#[axum::async_trait]
impl OtpDelivery for LogOtpDelivery {
    async fn deliver(&self, email: &str, purpose: OtpPurpose, _code: &str) -> AppResult<()> {
        tracing::info!(email = %email, purpose = purpose.as_str(), "verification code issued");
        Ok(())
    }
}

/// Body posted to the relay
#[derive(Debug, Serialize)]
struct OtpWebhookRequest<'a> {
    email: &'a str,
    purpose: &'a str,
    code: &'a str,
    expires_in_minutes: i64,
}

/// Posts codes to an HTTP relay that turns them into email
pub struct WebhookOtpDelivery {
    http_client: reqwest::Client,
    url: String,
    token: Option<String>,
    expires_in_minutes: i64,
}

impl WebhookOtpDelivery {
    pub fn new(url: String, token: Option<String>, expires_in_minutes: i64) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            url,
            token,
            expires_in_minutes,
        })
    }
}

#[axum::async_trait]
impl OtpDelivery for WebhookOtpDelivery {
    async fn deliver(&self, email: &str, purpose: OtpPurpose, code: &str) -> AppResult<()> {
        let request = OtpWebhookRequest {
            email,
            purpose: purpose.as_str(),
            code,
            expires_in_minutes: self.expires_in_minutes,
        };

        let mut builder = self.http_client.post(&self.url).json(&request);
        if let Some(token) = &self.token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AppError::OtpDeliveryError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::OtpDeliveryError(format!(
                "Relay returned {}: {}",
                status, body
            )));
        }

        tracing::info!(email = %email, purpose = purpose.as_str(), "verification code sent");
        Ok(())
    }
}

/// Build the delivery named by `auth.otp_delivery`
pub fn otp_delivery_from_config(config: &Config) -> AppResult<Arc<dyn OtpDelivery>> {
    match config.auth.otp_delivery.trim().to_ascii_lowercase().as_str() {
        "webhook" => {
            let url = config
                .auth
                .otp_webhook_url
                .clone()
                .filter(|url| !url.trim().is_empty())
                .ok_or_else(|| {
                    AppError::Configuration("auth.otp_webhook_url is required for webhook delivery".to_string())
                })?;
            let delivery = WebhookOtpDelivery::new(
                url,
                config.auth.otp_webhook_token.clone(),
                config.auth.otp_expiry_minutes,
            )?;
            Ok(Arc::new(delivery))
        }
        "log" if config.is_development() => {
            tracing::warn!("verification codes are only logged, not delivered");
            Ok(Arc::new(LogOtpDelivery))
        }
        "log" => Err(AppError::Configuration(format!(
            "log-only code delivery is not allowed in {}",
            config.environment
        ))),
        other => Err(AppError::Configuration(format!(
            "unknown auth.otp_delivery '{}'",
            other
        ))),
    }
}
