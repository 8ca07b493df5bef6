// src/services/naver.rs
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::social::{SocialError, SocialProvider};
use crate::auth::models::{ProviderProfile, SocialLoginType};
use crate::common::safe_email_log;

const NAVER_AUTHORIZE_URL: &str = "https://nid.naver.com/oauth2.0/authorize";
const NAVER_TOKEN_URL: &str = "https://nid.naver.com/oauth2.0/token";
const NAVER_PROFILE_URL: &str = "https://openapi.naver.com/v1/nid/me";

#[derive(Debug, Clone)]
pub struct NaverConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub authorize_url: String,
    pub token_url: String,
    pub profile_url: String,
}

impl NaverConfig {
    /// Credentials with the public NAVER endpoints
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri,
            authorize_url: NAVER_AUTHORIZE_URL.to_string(),
            token_url: NAVER_TOKEN_URL.to_string(),
            profile_url: NAVER_PROFILE_URL.to_string(),
        }
    }
}

// NAVER wraps the profile in {"resultcode", "message", "response": {...}}
#[derive(Debug, Deserialize)]
struct NaverUserResponse {
    resultcode: Option<String>,
    message: Option<String>,
    response: Option<NaverAccount>,
}

#[derive(Debug, Deserialize)]
struct NaverAccount {
    id: Option<String>,
    email: Option<String>,
    nickname: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NaverProvider {
    config: NaverConfig,
    client: Client,
}

impl NaverProvider {
    pub fn new(config: NaverConfig, timeout: Duration) -> Result<Self, SocialError> {
        let client = Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .map_err(|e| {
                error!(error = %e, "Failed to build NAVER HTTP client");
                SocialError::Transport(e.to_string())
            })?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl SocialProvider for NaverProvider {
    fn login_type(&self) -> SocialLoginType {
        SocialLoginType::Naver
    }

    fn authorize_url(&self, state: &str) -> String {
        debug!(
            client_id = %self.config.client_id,
            redirect_uri = %self.config.redirect_uri,
            "Building NAVER authorization URL"
        );
        format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&state={}",
            self.config.authorize_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(state)
        )
    }

    async fn request_access_token(&self, code: &str, state: &str) -> Result<String, SocialError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code", code),
            ("state", state),
        ];

        debug!("Exchanging NAVER authorization code for tokens");

        let response = self
            .client
            .get(&self.config.token_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, endpoint = %self.config.token_url, "NAVER token request failed");
                SocialError::Transport(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SocialError::Transport(e.to_string()))?;

        if !status.is_success() {
            warn!(http_status = %status, "NAVER token endpoint returned error status");
        }

        Ok(body)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, SocialError> {
        let response = self
            .client
            .get(&self.config.profile_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, endpoint = %self.config.profile_url, "NAVER profile request failed");
                SocialError::ProfileFetchFailed(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(http_status = %status, "NAVER profile endpoint returned error status");
            return Err(SocialError::ProfileFetchFailed(format!("HTTP {}", status)));
        }

        let envelope = response
            .json::<NaverUserResponse>()
            .await
            .map_err(|e| SocialError::ProfileFetchFailed(e.to_string()))?;

        let account = envelope.response.ok_or_else(|| {
            warn!(
                resultcode = ?envelope.resultcode,
                message = ?envelope.message,
                "NAVER profile response has no account"
            );
            SocialError::ProfileFetchFailed("response envelope missing".to_string())
        })?;

        let provider_user_id = account
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| SocialError::ProfileFetchFailed("profile id missing".to_string()))?;

        let profile = ProviderProfile {
            provider_user_id,
            email: account.email.unwrap_or_default(),
            nickname: account.nickname.unwrap_or_default(),
        };

        info!(
            provider = "naver",
            provider_id = %profile.provider_user_id,
            email = %safe_email_log(&profile.email),
            "Fetched NAVER profile"
        );
        Ok(profile)
    }
}
