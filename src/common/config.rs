// src/common/config.rs
//! Environment-driven configuration for the auth service

use std::env;
use std::time::Duration;
use thiserror::Error;

use crate::services::naver::NaverConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Token signing and lifetime settings
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Base64-encoded HMAC secret
    pub secret_key: String,
    pub issuer: String,
    pub token_ttl: Duration,
    /// How long after expiry a token may still be exchanged at `/refresh-token`
    pub refresh_grace: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt: JwtConfig,
    pub naver: NaverConfig,
    pub oauth_state_ttl: Duration,
    pub provider_timeout: Duration,
    pub session_cookie_secure: bool,
    pub cors_origins: Vec<String>,
    pub port: u16,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Signing secret and provider credentials have no defaults; a missing one
    /// stops the service from starting.
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt = JwtConfig {
            secret_key: required("JWT_SECRET_KEY")?,
            issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "basicboard".to_string()),
            token_ttl: Duration::from_secs(parse_or("TOKEN_TTL_HOURS", 2)? * 3600),
            refresh_grace: Duration::from_secs(parse_or("REFRESH_GRACE_HOURS", 168)? * 3600),
        };

        let mut naver = NaverConfig::new(
            required("NAVER_CLIENT_ID")?,
            required("NAVER_CLIENT_SECRET")?,
            required("NAVER_REDIRECT_URI")?,
        );
        if let Ok(url) = env::var("NAVER_AUTHORIZE_URL") {
            naver.authorize_url = url;
        }
        if let Ok(url) = env::var("NAVER_TOKEN_URL") {
            naver.token_url = url;
        }
        if let Ok(url) = env::var("NAVER_PROFILE_URL") {
            naver.profile_url = url;
        }

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://localhost:8080".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            jwt,
            naver,
            oauth_state_ttl: Duration::from_secs(parse_or("OAUTH_STATE_TTL_SECONDS", 600)?),
            provider_timeout: Duration::from_secs(parse_or("PROVIDER_TIMEOUT_SECONDS", 10)?),
            session_cookie_secure: env::var("SESSION_COOKIE_SECURE")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(false),
            cors_origins,
            port: parse_or("PORT", 8080)?,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_falls_back_to_default() {
        env::remove_var("BOARD_AUTH_TEST_UNSET");
        let value: u64 = parse_or("BOARD_AUTH_TEST_UNSET", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_parse_or_rejects_garbage() {
        env::set_var("BOARD_AUTH_TEST_GARBAGE", "two hours");
        let result: Result<u64, _> = parse_or("BOARD_AUTH_TEST_GARBAGE", 2);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
        env::remove_var("BOARD_AUTH_TEST_GARBAGE");
    }

    #[test]
    fn test_required_treats_blank_as_missing() {
        env::set_var("BOARD_AUTH_TEST_BLANK", "   ");
        assert!(matches!(
            required("BOARD_AUTH_TEST_BLANK"),
            Err(ConfigError::Missing("BOARD_AUTH_TEST_BLANK"))
        ));
        env::remove_var("BOARD_AUTH_TEST_BLANK");
    }
}
