//! Configuration management for the SwiftPass member backend
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with SWIFTPASS__ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Log output format: "pretty" or "json"
    pub log_format: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT authentication configuration
    pub jwt: JwtConfig,

    /// One-time password and trusted device settings
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWT tokens
    pub secret: String,

    /// Access token expiration in seconds
    pub access_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Minutes a login or reset code stays valid
    pub otp_expiry_minutes: i64,

    /// Hours a device stays trusted after a successful code check
    pub trusted_device_hours: i64,

    /// Wrong guesses allowed before a code is discarded
    pub otp_max_attempts: i32,

    /// How codes reach the member: "webhook", or "log" in development
    pub otp_delivery: String,

    /// Endpoint that forwards codes to the member's inbox
    pub otp_webhook_url: Option<String>,

    /// Bearer token sent to the webhook
    pub otp_webhook_token: Option<String>,
}

/// Signing secret used when running locally without one configured
const DEVELOPMENT_JWT_SECRET: &str = "development-secret-key";

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("SWIFTPASS__ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let mut builder = config::Config::builder();
        if environment == "development" {
            builder = builder.set_default("jwt.secret", DEVELOPMENT_JWT_SECRET)?;
        }

        let config = builder
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("log_format", "pretty")?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("jwt.access_token_expiry", 86400)?
            .set_default("auth.otp_expiry_minutes", 10)?
            .set_default("auth.trusted_device_hours", 24)?
            .set_default("auth.otp_max_attempts", 5)?
            .set_default("auth.otp_delivery", "log")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (SWIFTPASS__ prefix)
            .add_source(
                Environment::with_prefix("SWIFTPASS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
