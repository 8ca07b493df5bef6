// src/auth/middleware.rs
//! Bearer token gate run in front of every route

use axum::{
    extract::{Extension, Request},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::extractors::AuthedUser;
use super::token::TokenValidation;
use crate::common::{safe_token_log, AppState};

const TOKEN_PREFIX: &str = "Bearer ";

/// Paths that bypass the gate; the refresh endpoint must work without a
/// currently valid token
pub const SKIP_PATHS: &[&str] = &["/refresh-token"];

/// Raw bytes following `Bearer ` in the `Authorization` header
///
/// Kept as bytes so a token that is not valid text still counts as present.
fn resolve_token(headers: &HeaderMap) -> Option<&[u8]> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.as_bytes().strip_prefix(TOKEN_PREFIX.as_bytes()))
        .filter(|token| !token.is_empty())
}

fn reject(reason: &'static str) -> Response {
    (StatusCode::UNAUTHORIZED, reason).into_response()
}

/// Authentication gate middleware
///
/// Requests without a bearer token continue unauthenticated; handlers that need
/// a caller take [`AuthedUser`] and reject on their own. A present token must be
/// valid, otherwise the request stops here with 401.
pub async fn authentication_gate(
    Extension(state): Extension<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if SKIP_PATHS.contains(&path.as_str()) {
        debug!(path = %path, "Skipping authentication gate");
        return next.run(request).await;
    }

    let Some(raw) = resolve_token(request.headers()).map(<[u8]>::to_vec) else {
        debug!(path = %path, "No bearer token, continuing unauthenticated");
        return next.run(request).await;
    };

    let token = match String::from_utf8(raw) {
        Ok(token) if token.contains('.') => token,
        Ok(token) => {
            error!(token = %safe_token_log(&token), "Invalid JWT format");
            return reject("Invalid JWT format");
        }
        Err(_) => {
            error!(path = %path, "Bearer token is not valid UTF-8");
            return reject("Invalid JWT format");
        }
    };

    match state.token_codec.validate(&token) {
        TokenValidation::Valid => {
            let identity = match state.token_codec.decode(&token) {
                Ok(identity) => identity,
                Err(e) => {
                    // expired between validate and decode
                    warn!(error = %e, "Token failed second decode");
                    return reject("Expired JWT token");
                }
            };
            debug!(login_id = %identity.login_id, role = %identity.role, "Request authenticated");

            let authed = AuthedUser::from_identity(&identity);
            request.extensions_mut().insert(authed);
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        TokenValidation::Expired => {
            warn!("JWT token expired");
            reject("Expired JWT token")
        }
        TokenValidation::Invalid => {
            error!("JWT verification failed");
            reject("Invalid JWT token")
        }
    }
}
