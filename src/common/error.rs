// Error handling types for the API

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt;
use tracing::error;

use crate::auth::login::LoginError;
use crate::auth::token::TokenError;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    BadRequest(String),
    InternalServer(String),
    ServiceUnavailable(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::InternalServer(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service Unavailable: {}", msg),
        }
    }
}

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message, code) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, "UNAUTHORIZED"),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST"),
            ApiError::InternalServer(msg) => {
                error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    msg,
                    "INTERNAL_SERVER_ERROR",
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                msg,
                "SERVICE_UNAVAILABLE",
            ),
        };

        let error_response = ErrorResponse {
            error: error_message,
            code: code.to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => ApiError::Unauthorized("Expired JWT token".to_string()),
            TokenError::Malformed | TokenError::Invalid => {
                ApiError::Unauthorized("Invalid JWT token".to_string())
            }
            other => ApiError::InternalServer(other.to_string()),
        }
    }
}

impl From<LoginError> for ApiError {
    fn from(err: LoginError) -> Self {
        match err {
            LoginError::CsrfStateMismatch => {
                ApiError::Unauthorized("oauth state mismatch".to_string())
            }
            LoginError::ProviderAccessTokenMissing => {
                ApiError::Unauthorized("provider did not return an access token".to_string())
            }
            LoginError::ProfileFetchFailed(msg) => ApiError::ServiceUnavailable(format!(
                "social profile could not be fetched: {}",
                msg
            )),
            LoginError::TokenExchangeFailed(msg) => ApiError::ServiceUnavailable(format!(
                "social token exchange failed: {}",
                msg
            )),
            LoginError::UnsupportedLoginType(kind) => {
                ApiError::InternalServer(format!("unsupported social login type: {}", kind))
            }
            LoginError::TokenIssueFailed(msg) => {
                ApiError::InternalServer(format!("jwt error: {}", msg))
            }
        }
    }
}
