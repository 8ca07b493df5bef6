//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use super::models::{Identity, Role};
use crate::common::ApiError;

/// Authenticated caller extractor
///
/// The authentication gate places this in request extensions after a valid
/// token; handlers that require a caller take it as an argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthedUser {
    pub id: i64,
    pub login_id: String,
    pub role: Role,
    pub is_admin: bool,
}

impl AuthedUser {
    pub fn from_identity(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            login_id: identity.login_id.clone(),
            role: identity.role,
            is_admin: identity.role == Role::Admin,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AuthedUser>() {
            Some(user) => Ok(user.clone()),
            None => {
                warn!(path = %parts.uri.path(), "Authentication required but request is anonymous");
                Err(ApiError::Unauthorized("missing auth".into()))
            }
        }
    }
}
