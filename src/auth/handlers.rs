//! Authentication handlers

use axum::{
    extract::{rejection::JsonRejection, Extension, Json, Query},
    http::{header::LOCATION, StatusCode},
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::extractors::AuthedUser;
use super::login::{landing_redirect, LoginError, ACCESS_DENIED_PAGE};
use super::models::{
    Identity, OAuthCallbackParams, RefreshTokenRequest, SocialLoginRequest, SocialLoginResponse,
    SocialLoginType, TokenResponse,
};
use super::session::{new_session_id, SESSION_COOKIE};
use crate::common::{ApiError, AppState};

/// 302 Found to `location`
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.to_string())]).into_response()
}

/// GET /api/social/naver
/// Starts the NAVER login: binds a fresh state to the browser session and
/// redirects to NAVER's authorization page
pub async fn naver_login_start(
    Extension(state): Extension<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Response), ApiError> {
    start_social_login(&state, jar, SocialLoginType::Naver).await
}

async fn start_social_login(
    state: &AppState,
    jar: CookieJar,
    login_type: SocialLoginType,
) -> Result<(CookieJar, Response), ApiError> {
    let session_id = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(new_session_id);

    let authorize_url = state
        .login
        .begin_browser_login(login_type, &session_id)
        .await?;

    let cookie = Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.session_cookie_secure);

    Ok((jar.add(cookie), found(&authorize_url)))
}

/// GET /api/social/login/callback?code&state
/// Verifies the returned state against the session, then hands the issued
/// token to the landing page
pub async fn social_login_callback(
    Extension(state): Extension<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<OAuthCallbackParams>,
) -> Response {
    if let Some(oauth_error) = &params.error {
        warn!(
            oauth_error = %oauth_error,
            description = ?params.error_description,
            "Provider returned an error to the callback"
        );
        return found(ACCESS_DENIED_PAGE);
    }

    let (Some(code), Some(returned_state)) = (params.code.as_deref(), params.state.as_deref())
    else {
        warn!(
            has_code = params.code.is_some(),
            has_state = params.state.is_some(),
            "Callback missing code or state"
        );
        return found(ACCESS_DENIED_PAGE);
    };

    let session_id = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());

    match state
        .login
        .complete_browser_login(session_id.as_deref(), code, returned_state)
        .await
    {
        Ok(token) => {
            info!("Social login complete, redirecting to landing page");
            found(&landing_redirect(&token))
        }
        Err(LoginError::CsrfStateMismatch) | Err(LoginError::ProviderAccessTokenMissing) => {
            found(ACCESS_DENIED_PAGE)
        }
        Err(e) => {
            error!(error = %e, "Social login callback failed");
            ApiError::from(e).into_response()
        }
    }
}

/// POST /api/social/login
/// Logs in with a provider access token obtained by the client
///
/// # Request Body
/// ```json
/// { "socialLoginType": "NAVER", "accessToken": "<provider access token>" }
/// ```
///
/// # Response
/// ```json
/// { "userId": "...", "email": "...", "nickname": "...", "token": "<jwt>" }
/// ```
pub async fn social_login(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<SocialLoginRequest>, JsonRejection>,
) -> Result<Json<SocialLoginResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        warn!(error = %e, "Rejected social login payload");
        ApiError::BadRequest(e.body_text())
    })?;

    let response = state.login.login_with_access_token(request).await?;
    Ok(Json(response))
}

/// POST /refresh-token
/// Re-issues a token for a caller whose token is valid or expired within the
/// refresh grace period. Not behind the authentication gate.
pub async fn refresh_token(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let identity = state
        .token_codec
        .decode_for_refresh(&request.token, state.config.jwt.refresh_grace)
        .map_err(|e| {
            warn!(error = %e, "Refresh rejected");
            ApiError::from(e)
        })?;

    let token = state
        .token_codec
        .generate(&identity, state.config.jwt.token_ttl)?;

    info!(login_id = %identity.login_id, "Token refreshed");
    Ok(Json(TokenResponse { token }))
}

/// GET /api/me
/// Returns the identity carried by the caller's token
pub async fn me_handler(
    authed: AuthedUser,
    Extension(identity): Extension<Identity>,
) -> Json<serde_json::Value> {
    debug!(id = authed.id, login_id = %authed.login_id, role = %authed.role, "Serving caller identity");
    Json(serde_json::json!({
        "user": identity,
        "isAdmin": authed.is_admin,
    }))
}

/// GET /naver-callback.html
pub async fn naver_callback_page() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Signing in…</title>
</head>
<body>
    <script>
        document.addEventListener("DOMContentLoaded", function () {
            const params = new URLSearchParams(window.location.search);
            const token = params.get("access_token");
            if (token) {
                localStorage.setItem("accessToken", token);
                window.location.href = "/";
            } else {
                alert("Sign-in did not return a token. Please log in again.");
                window.location.href = "/member/login";
            }
        });
    </script>
</body>
</html>"#,
    )
}

/// GET /access-denied
pub async fn access_denied_page() -> (StatusCode, Html<&'static str>) {
    (
        StatusCode::FORBIDDEN,
        Html(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Access denied</title>
</head>
<body>
    <h1>Access denied</h1>
    <p>The sign-in request could not be verified.</p>
    <p><a href="/api/social/naver">Try again</a></p>
</body>
</html>"#,
        ),
    )
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
