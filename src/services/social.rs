// src/services/social.rs
//! Social identity provider abstraction
//!
//! Each provider drives its own OAuth2 authorization-code exchange and
//! normalizes its user-info payload into a [`ProviderProfile`]. Providers are
//! looked up by [`SocialLoginType`] so new ones plug in without touching the
//! login flows.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::auth::models::{ProviderProfile, SocialLoginType};

#[derive(Debug, Error)]
pub enum SocialError {
    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("profile fetch failed: {0}")]
    ProfileFetchFailed(String),

    #[error("unsupported social login type: {0}")]
    UnsupportedLoginType(SocialLoginType),
}

#[async_trait]
pub trait SocialProvider: Send + Sync {
    fn login_type(&self) -> SocialLoginType;

    /// Provider authorization page for a login attempt guarded by `state`
    fn authorize_url(&self, state: &str) -> String;

    /// Exchange an authorization code for the provider's raw token response body
    async fn request_access_token(&self, code: &str, state: &str) -> Result<String, SocialError>;

    /// Fetch and normalize the profile of the provider account behind `access_token`
    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, SocialError>;
}

#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<SocialLoginType, Arc<dyn SocialProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: Arc<dyn SocialProvider>) {
        self.providers.insert(provider.login_type(), provider);
    }

    pub fn get(&self, login_type: SocialLoginType) -> Result<Arc<dyn SocialProvider>, SocialError> {
        self.providers
            .get(&login_type)
            .cloned()
            .ok_or(SocialError::UnsupportedLoginType(login_type))
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}
