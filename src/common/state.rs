// Application state shared across all modules

use std::sync::Arc;

use crate::auth::login::LoginOrchestrator;
use crate::auth::session::InMemorySessionStore;
use crate::auth::token::{TokenCodec, TokenError};
use crate::common::config::AppConfig;
use crate::services::ProviderRegistry;

/// Application state: token codec, login orchestration, and configuration
///
/// Everything here is immutable after startup; the only per-request mutable
/// data lives behind the orchestrator's session store.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub token_codec: Arc<TokenCodec>,
    pub login: Arc<LoginOrchestrator>,
}

impl AppState {
    /// Wire the codec, session store and providers together
    ///
    /// Fails when the signing secret is unusable.
    pub fn new(config: AppConfig, providers: ProviderRegistry) -> Result<Self, TokenError> {
        let token_codec = Arc::new(TokenCodec::new(
            &config.jwt.secret_key,
            config.jwt.issuer.clone(),
        )?);

        let sessions = Arc::new(InMemorySessionStore::new(config.oauth_state_ttl));
        let login = Arc::new(LoginOrchestrator::new(
            providers,
            sessions,
            token_codec.clone(),
            config.jwt.token_ttl,
        ));

        Ok(Self {
            config: Arc::new(config),
            token_codec,
            login,
        })
    }
}
