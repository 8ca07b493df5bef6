//! Authentication data models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Member role carried in issued tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Internal member identity surfaced through tokens
///
/// The numeric id and password belong to the member store; social logins
/// arrive with `id = 0` and an empty password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: i64,
    pub login_id: String,
    pub display_name: String,
    pub role: Role,
    #[serde(skip)]
    pub password: String,
}

impl Identity {
    /// Identity for a user who authenticated with a social provider
    pub fn from_social_profile(profile: &ProviderProfile) -> Self {
        Self {
            id: 0,
            login_id: profile.provider_user_id.clone(),
            display_name: profile.nickname.clone(),
            role: Role::User,
            password: String::new(),
        }
    }
}

/// JWT claims structure
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Claims {
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub sub: String,
    pub id: i64,
    pub role: String,
    #[serde(rename = "userName")]
    pub user_name: String,
}

/// Profile returned by a social identity provider, normalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub provider_user_id: String,
    pub email: String,
    pub nickname: String,
}

/// Social login providers known to the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SocialLoginType {
    Naver,
    Kakao,
    Google,
    Apple,
}

impl fmt::Display for SocialLoginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SocialLoginType::Naver => "NAVER",
            SocialLoginType::Kakao => "KAKAO",
            SocialLoginType::Google => "GOOGLE",
            SocialLoginType::Apple => "APPLE",
        };
        f.write_str(name)
    }
}

/// Direct API login payload: a provider access token already held by the client
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLoginRequest {
    pub social_login_type: SocialLoginType,
    pub access_token: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SocialLoginResponse {
    pub user_id: String,
    pub email: String,
    pub nickname: String,
    pub token: String,
}

/// Query parameters the provider appends to the callback redirect
#[derive(Debug, Deserialize)]
pub struct OAuthCallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}
