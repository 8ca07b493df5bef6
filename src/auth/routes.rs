//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `GET /api/social/naver` - Start NAVER login (302 to NAVER)
/// - `GET /api/social/login/callback` - OAuth callback (302 to landing or denial page)
/// - `POST /api/social/login` - Login with a provider access token
/// - `POST /refresh-token` - Re-issue a token
/// - `GET /api/me` - Current caller's identity
/// - `GET /naver-callback.html`, `GET /access-denied` - Browser landing pages
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/social/naver", get(handlers::naver_login_start))
        .route("/api/social/login/callback", get(handlers::social_login_callback))
        .route("/api/social/login", post(handlers::social_login))
        .route("/refresh-token", post(handlers::refresh_token))
        .route("/api/me", get(handlers::me_handler))
        .route("/naver-callback.html", get(handlers::naver_callback_page))
        .route("/access-denied", get(handlers::access_denied_page))
        .route("/health", get(handlers::health))
}
