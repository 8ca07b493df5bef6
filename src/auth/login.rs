//! Social login flows ending in internal token issuance

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

use super::models::{Identity, SocialLoginRequest, SocialLoginResponse, SocialLoginType};
use super::session::{OAuthState, SessionStore};
use super::token::TokenCodec;
use crate::common::{safe_email_log, safe_token_log};
use crate::services::social::{ProviderRegistry, SocialError, SocialProvider};

/// Static page that picks the issued token out of its query string
pub const LANDING_PAGE: &str = "/naver-callback.html";
pub const ACCESS_DENIED_PAGE: &str = "/access-denied";

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("oauth state missing or mismatched")]
    CsrfStateMismatch,

    #[error("unsupported social login type: {0}")]
    UnsupportedLoginType(SocialLoginType),

    #[error("provider token exchange failed: {0}")]
    TokenExchangeFailed(String),

    #[error("provider response has no access_token")]
    ProviderAccessTokenMissing,

    #[error("profile fetch failed: {0}")]
    ProfileFetchFailed(String),

    #[error("token issuance failed: {0}")]
    TokenIssueFailed(String),
}

impl From<SocialError> for LoginError {
    fn from(err: SocialError) -> Self {
        match err {
            SocialError::Transport(msg) => LoginError::TokenExchangeFailed(msg),
            SocialError::ProfileFetchFailed(msg) => LoginError::ProfileFetchFailed(msg),
            SocialError::UnsupportedLoginType(kind) => LoginError::UnsupportedLoginType(kind),
        }
    }
}

struct IssuedLogin {
    identity: Identity,
    email: String,
    token: String,
}

pub struct LoginOrchestrator {
    providers: ProviderRegistry,
    sessions: Arc<dyn SessionStore>,
    codec: Arc<TokenCodec>,
    token_ttl: Duration,
}

impl LoginOrchestrator {
    pub fn new(
        providers: ProviderRegistry,
        sessions: Arc<dyn SessionStore>,
        codec: Arc<TokenCodec>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            providers,
            sessions,
            codec,
            token_ttl,
        }
    }

    /// Start a browser login: bind a fresh state to the session and return the
    /// provider's authorization URL
    pub async fn begin_browser_login(
        &self,
        login_type: SocialLoginType,
        session_id: &str,
    ) -> Result<String, LoginError> {
        let provider = self.providers.get(login_type)?;
        let state = OAuthState::generate(login_type);
        let url = provider.authorize_url(&state.value);

        self.sessions.put(session_id, state).await;
        info!(provider = %login_type, "Starting social login redirect");
        Ok(url)
    }

    /// Finish a browser login after the provider redirected back
    ///
    /// The session's state is consumed whether or not it matches; the provider is
    /// never contacted unless it does.
    pub async fn complete_browser_login(
        &self,
        session_id: Option<&str>,
        code: &str,
        returned_state: &str,
    ) -> Result<String, LoginError> {
        let stored = match session_id {
            Some(id) => self.sessions.take(id).await,
            None => None,
        };

        let stored = match stored {
            Some(s) if s.value.as_bytes() == returned_state.as_bytes() => s,
            Some(_) => {
                error!("CSRF check failed - state mismatch");
                return Err(LoginError::CsrfStateMismatch);
            }
            None => {
                error!(has_session = session_id.is_some(), "CSRF check failed - no state in session");
                return Err(LoginError::CsrfStateMismatch);
            }
        };

        let provider = self.providers.get(stored.login_type)?;
        let raw = provider.request_access_token(code, returned_state).await?;
        let provider_token = extract_access_token(&raw).ok_or_else(|| {
            error!(provider = %stored.login_type, "Provider token response has no access_token");
            LoginError::ProviderAccessTokenMissing
        })?;

        let issued = self.issue_for(provider.as_ref(), &provider_token).await?;
        Ok(issued.token)
    }

    /// Log in with a provider access token the client already holds
    pub async fn login_with_access_token(
        &self,
        request: SocialLoginRequest,
    ) -> Result<SocialLoginResponse, LoginError> {
        info!(
            provider = %request.social_login_type,
            access_token = %safe_token_log(&request.access_token),
            "Direct social login"
        );

        let provider = self.providers.get(request.social_login_type)?;
        let issued = self.issue_for(provider.as_ref(), &request.access_token).await?;

        Ok(SocialLoginResponse {
            user_id: issued.identity.login_id,
            email: issued.email,
            nickname: issued.identity.display_name,
            token: issued.token,
        })
    }

    async fn issue_for(
        &self,
        provider: &dyn SocialProvider,
        provider_token: &str,
    ) -> Result<IssuedLogin, LoginError> {
        let profile = provider.fetch_profile(provider_token).await?;
        let identity = Identity::from_social_profile(&profile);

        let token = self
            .codec
            .generate(&identity, self.token_ttl)
            .map_err(|e| LoginError::TokenIssueFailed(e.to_string()))?;
        if token.is_empty() {
            return Err(LoginError::TokenIssueFailed("empty token".to_string()));
        }

        info!(
            provider = %provider.login_type(),
            login_id = %identity.login_id,
            email = %safe_email_log(&profile.email),
            "Social login succeeded"
        );
        Ok(IssuedLogin {
            identity,
            email: profile.email,
            token,
        })
    }
}

/// Redirect target delivering `token` to the landing page
pub fn landing_redirect(token: &str) -> String {
    format!("{}?access_token={}", LANDING_PAGE, urlencoding::encode(token))
}

fn extract_access_token(raw: &str) -> Option<String> {
    let json: serde_json::Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "Provider token response is not JSON");
            return None;
        }
    };

    json.get("access_token")
        .and_then(|v| v.as_str())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::auth::models::{ProviderProfile, Role};
    use crate::auth::session::InMemorySessionStore;
    use crate::auth::token::tests::test_codec;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider double that counts outbound calls
    #[derive(Default)]
    pub(crate) struct FakeProvider {
        pub exchanges: AtomicUsize,
        pub profile_fetches: AtomicUsize,
    }

    #[async_trait]
    impl SocialProvider for FakeProvider {
        fn login_type(&self) -> SocialLoginType {
            SocialLoginType::Naver
        }

        fn authorize_url(&self, state: &str) -> String {
            format!("https://provider.test/authorize?state={}", state)
        }

        async fn request_access_token(&self, code: &str, _state: &str) -> Result<String, SocialError> {
            self.exchanges.fetch_add(1, Ordering::SeqCst);
            if code == "good-code" {
                Ok(r#"{"access_token":"provider-token","token_type":"bearer"}"#.to_string())
            } else {
                Ok(r#"{"error":"invalid_request"}"#.to_string())
            }
        }

        async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, SocialError> {
            self.profile_fetches.fetch_add(1, Ordering::SeqCst);
            if access_token == "provider-token" {
                Ok(ProviderProfile {
                    provider_user_id: "naver-42".to_string(),
                    email: "alice@example.com".to_string(),
                    nickname: "Alice".to_string(),
                })
            } else {
                Err(SocialError::ProfileFetchFailed("HTTP 401".to_string()))
            }
        }
    }

    pub(crate) fn orchestrator_with(provider: Arc<FakeProvider>) -> LoginOrchestrator {
        let mut registry = ProviderRegistry::new();
        registry.register(provider);
        LoginOrchestrator::new(
            registry,
            Arc::new(InMemorySessionStore::new(Duration::from_secs(600))),
            Arc::new(test_codec()),
            Duration::from_secs(2 * 3600),
        )
    }

    fn state_from(url: &str) -> String {
        url.split("state=").nth(1).unwrap().to_string()
    }

    #[tokio::test]
    async fn test_matching_state_issues_token_for_profile() {
        let provider = Arc::new(FakeProvider::default());
        let login = orchestrator_with(provider.clone());

        let url = login.begin_browser_login(SocialLoginType::Naver, "s1").await.unwrap();
        let state = state_from(&url);

        let token = login
            .complete_browser_login(Some("s1"), "good-code", &state)
            .await
            .unwrap();

        let identity = test_codec().decode(&token).unwrap();
        assert_eq!(identity.login_id, "naver-42");
        assert_eq!(identity.display_name, "Alice");
        assert_eq!(identity.role, Role::User);
        assert_eq!(identity.id, 0);
    }

    #[tokio::test]
    async fn test_state_mismatch_never_exchanges_code() {
        let provider = Arc::new(FakeProvider::default());
        let login = orchestrator_with(provider.clone());

        login.begin_browser_login(SocialLoginType::Naver, "s1").await.unwrap();

        let result = login
            .complete_browser_login(Some("s1"), "good-code", "forged-state")
            .await;
        assert!(matches!(result, Err(LoginError::CsrfStateMismatch)));
        assert_eq!(provider.exchanges.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_session_never_exchanges_code() {
        let provider = Arc::new(FakeProvider::default());
        let login = orchestrator_with(provider.clone());

        let url = login.begin_browser_login(SocialLoginType::Naver, "s1").await.unwrap();
        let state = state_from(&url);

        assert!(matches!(
            login.complete_browser_login(None, "good-code", &state).await,
            Err(LoginError::CsrfStateMismatch)
        ));
        assert!(matches!(
            login.complete_browser_login(Some("other"), "good-code", &state).await,
            Err(LoginError::CsrfStateMismatch)
        ));
        assert_eq!(provider.exchanges.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_state_is_single_use() {
        let provider = Arc::new(FakeProvider::default());
        let login = orchestrator_with(provider.clone());

        let url = login.begin_browser_login(SocialLoginType::Naver, "s1").await.unwrap();
        let state = state_from(&url);

        assert!(login.complete_browser_login(Some("s1"), "good-code", &state).await.is_ok());
        assert!(matches!(
            login.complete_browser_login(Some("s1"), "good-code", &state).await,
            Err(LoginError::CsrfStateMismatch)
        ));
        assert_eq!(provider.exchanges.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_provider_access_token_aborts() {
        let provider = Arc::new(FakeProvider::default());
        let login = orchestrator_with(provider.clone());

        let url = login.begin_browser_login(SocialLoginType::Naver, "s1").await.unwrap();
        let state = state_from(&url);

        assert!(matches!(
            login.complete_browser_login(Some("s1"), "bad-code", &state).await,
            Err(LoginError::ProviderAccessTokenMissing)
        ));
        assert_eq!(provider.profile_fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_direct_login_returns_profile_and_token() {
        let login = orchestrator_with(Arc::new(FakeProvider::default()));

        let response = login
            .login_with_access_token(SocialLoginRequest {
                social_login_type: SocialLoginType::Naver,
                access_token: "provider-token".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.user_id, "naver-42");
        assert_eq!(response.email, "alice@example.com");
        assert_eq!(response.nickname, "Alice");
        assert_eq!(test_codec().decode(&response.token).unwrap().login_id, "naver-42");
    }

    #[tokio::test]
    async fn test_unregistered_login_type_is_rejected() {
        let login = orchestrator_with(Arc::new(FakeProvider::default()));

        let result = login
            .login_with_access_token(SocialLoginRequest {
                social_login_type: SocialLoginType::Kakao,
                access_token: "provider-token".to_string(),
            })
            .await;
        assert!(matches!(
            result,
            Err(LoginError::UnsupportedLoginType(SocialLoginType::Kakao))
        ));

        assert!(matches!(
            login.begin_browser_login(SocialLoginType::Google, "s1").await,
            Err(LoginError::UnsupportedLoginType(SocialLoginType::Google))
        ));
    }

    #[tokio::test]
    async fn test_direct_login_profile_failure() {
        let login = orchestrator_with(Arc::new(FakeProvider::default()));

        let result = login
            .login_with_access_token(SocialLoginRequest {
                social_login_type: SocialLoginType::Naver,
                access_token: "revoked".to_string(),
            })
            .await;
        assert!(matches!(result, Err(LoginError::ProfileFetchFailed(_))));
    }

    #[test]
    fn test_landing_redirect_encodes_token() {
        assert_eq!(
            landing_redirect("a.b+c/d"),
            "/naver-callback.html?access_token=a.b%2Bc%2Fd"
        );
    }

    #[test]
    fn test_extract_access_token() {
        assert_eq!(
            extract_access_token(r#"{"access_token":"abc"}"#),
            Some("abc".to_string())
        );
        assert_eq!(extract_access_token(r#"{"access_token":""}"#), None);
        assert_eq!(extract_access_token("<html>"), None);
    }
}
