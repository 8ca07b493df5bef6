//! Bearer token issuance and validation
//!
//! Tokens are HS512-signed JWTs. The subject is the member's login id; the
//! numeric id, role and display name ride along as private claims.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::models::{Claims, Identity, Role};

/// HS512 needs at least 512 bits of key material
pub const MIN_SECRET_BYTES: usize = 64;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is not a well-formed JWT")]
    Malformed,

    #[error("token has expired")]
    Expired,

    #[error("token signature or claims are invalid")]
    Invalid,

    #[error("signing secret is not valid base64")]
    KeyDecode,

    #[error("signing secret is {len} bytes, at least {min} required")]
    WeakKey { len: usize, min: usize },

    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Outcome of a non-failing token check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenValidation {
    Valid,
    Expired,
    Invalid,
}

pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.issuer)
            .field("key", &"<redacted>")
            .finish()
    }
}

impl TokenCodec {
    /// Build a codec from a base64-encoded secret
    ///
    /// Fails when the secret does not decode or is too short for HS512, so a
    /// misconfigured service refuses to start instead of issuing weak tokens.
    pub fn new(secret_b64: &str, issuer: impl Into<String>) -> Result<Self, TokenError> {
        let key_bytes = BASE64
            .decode(secret_b64.trim().as_bytes())
            .map_err(|_| TokenError::KeyDecode)?;

        if key_bytes.len() < MIN_SECRET_BYTES {
            return Err(TokenError::WeakKey {
                len: key_bytes.len(),
                min: MIN_SECRET_BYTES,
            });
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(&key_bytes),
            decoding_key: DecodingKey::from_secret(&key_bytes),
            issuer: issuer.into(),
        })
    }

    /// Issue a token for `identity` valid for `ttl` from now
    pub fn generate(&self, identity: &Identity, ttl: Duration) -> Result<String, TokenError> {
        self.issue(identity, Utc::now().timestamp(), ttl)
    }

    fn issue(&self, identity: &Identity, issued_at: i64, ttl: Duration) -> Result<String, TokenError> {
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            iss: self.issuer.clone(),
            iat: issued_at,
            exp: issued_at.saturating_add(ttl_secs),
            sub: identity.login_id.clone(),
            id: identity.id,
            role: identity.role.as_str().to_string(),
            user_name: identity.display_name.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS512), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        info!(
            login_id = %identity.login_id,
            role = %identity.role,
            exp = claims.exp,
            "Issued access token"
        );
        Ok(token)
    }

    /// Verify `token` and return the identity it carries
    pub fn decode(&self, token: &str) -> Result<Identity, TokenError> {
        self.decode_with_grace(token, 0)
    }

    /// Like [`decode`](Self::decode), but tolerates tokens that expired less
    /// than `grace` ago. Signature and issuer are still enforced.
    pub fn decode_for_refresh(&self, token: &str, grace: Duration) -> Result<Identity, TokenError> {
        self.decode_with_grace(token, i64::try_from(grace.as_secs()).unwrap_or(i64::MAX))
    }

    /// Classify `token` without surfacing an error
    pub fn validate(&self, token: &str) -> TokenValidation {
        match self.decode(token) {
            Ok(_) => TokenValidation::Valid,
            Err(TokenError::Expired) => {
                info!("Token has expired");
                TokenValidation::Expired
            }
            Err(e) => {
                warn!(error = %e, "Token validation failed");
                TokenValidation::Invalid
            }
        }
    }

    fn decode_with_grace(&self, token: &str, grace_secs: i64) -> Result<Identity, TokenError> {
        // Expiry is checked by hand below: a token whose exp equals "now" is
        // already expired, and the library only rejects exp strictly in the past.
        let mut validation = Validation::new(Algorithm::HS512);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_issuer(&[self.issuer.as_str()]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            debug!(error = %e, "JWT decoding failed");
            match e.kind() {
                ErrorKind::InvalidToken
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => TokenError::Malformed,
                _ => TokenError::Invalid,
            }
        })?;

        let claims = data.claims;
        let now = Utc::now().timestamp();
        if claims.exp.saturating_add(grace_secs) <= now {
            return Err(TokenError::Expired);
        }

        let role = claims.role.parse::<Role>().map_err(|e| {
            warn!(error = %e, "Token carries an unknown role");
            TokenError::Invalid
        })?;

        Ok(Identity {
            id: claims.id,
            login_id: claims.sub,
            display_name: claims.user_name,
            role,
            password: String::new(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn test_secret() -> String {
        BASE64.encode([7u8; MIN_SECRET_BYTES])
    }

    pub(crate) fn test_codec() -> TokenCodec {
        TokenCodec::new(&test_secret(), "basicboard-test").expect("test key is long enough")
    }

    fn alice() -> Identity {
        Identity {
            id: 1,
            login_id: "u1".to_string(),
            display_name: "Alice".to_string(),
            role: Role::User,
            password: String::new(),
        }
    }

    #[test]
    fn test_generate_then_decode_round_trips_identity() {
        let codec = test_codec();
        let token = codec.generate(&alice(), Duration::from_secs(2 * 3600)).unwrap();

        let identity = codec.decode(&token).unwrap();
        assert_eq!(identity.id, 1);
        assert_eq!(identity.login_id, "u1");
        assert_eq!(identity.role, Role::User);
        assert_eq!(identity.display_name, "Alice");
        assert_eq!(codec.validate(&token), TokenValidation::Valid);
    }

    #[test]
    fn test_zero_ttl_token_is_expired() {
        let codec = test_codec();
        let token = codec.generate(&alice(), Duration::ZERO).unwrap();

        assert_eq!(codec.validate(&token), TokenValidation::Expired);
        assert!(matches!(codec.decode(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_token_fails_after_ttl_elapses() {
        let codec = test_codec();
        let three_hours_ago = Utc::now().timestamp() - 3 * 3600;
        let token = codec
            .issue(&alice(), three_hours_ago, Duration::from_secs(2 * 3600))
            .unwrap();

        assert!(matches!(codec.decode(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_tampered_signature_is_invalid() {
        let codec = test_codec();
        let token = codec.generate(&alice(), Duration::from_secs(3600)).unwrap();

        let sig_start = token.rfind('.').unwrap() + 1;
        let mut bytes = token.into_bytes();
        let target = sig_start + 10;
        bytes[target] = if bytes[target] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert_eq!(codec.validate(&tampered), TokenValidation::Invalid);
        assert!(codec.decode(&tampered).is_err());
    }

    #[test]
    fn test_expired_and_forged_token_is_invalid_not_expired() {
        let codec = test_codec();
        let other = TokenCodec::new(&BASE64.encode([9u8; MIN_SECRET_BYTES]), "basicboard-test")
            .unwrap();
        let token = other.generate(&alice(), Duration::ZERO).unwrap();

        assert_eq!(codec.validate(&token), TokenValidation::Invalid);
    }

    #[test]
    fn test_wrong_issuer_is_invalid() {
        let codec = test_codec();
        let foreign = TokenCodec::new(&test_secret(), "someone-else").unwrap();
        let token = foreign.generate(&alice(), Duration::from_secs(3600)).unwrap();

        assert!(matches!(codec.decode(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let codec = test_codec();
        assert!(matches!(codec.decode("not-a-token"), Err(TokenError::Malformed)));
        assert!(matches!(codec.decode("a.b"), Err(TokenError::Malformed)));
        assert_eq!(codec.validate("not-a-token"), TokenValidation::Invalid);
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let short = BASE64.encode([1u8; 32]);
        assert!(matches!(
            TokenCodec::new(&short, "basicboard"),
            Err(TokenError::WeakKey { len: 32, .. })
        ));
        assert!(matches!(
            TokenCodec::new("%%% not base64 %%%", "basicboard"),
            Err(TokenError::KeyDecode)
        ));
    }

    #[test]
    fn test_refresh_accepts_recently_expired_token() {
        let codec = test_codec();
        let token = codec
            .issue(&alice(), Utc::now().timestamp() - 3 * 3600, Duration::from_secs(2 * 3600))
            .unwrap();

        let identity = codec
            .decode_for_refresh(&token, Duration::from_secs(24 * 3600))
            .unwrap();
        assert_eq!(identity.login_id, "u1");

        assert!(matches!(
            codec.decode_for_refresh(&token, Duration::from_secs(60)),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_admin_role_survives_round_trip() {
        let codec = test_codec();
        let mut admin = alice();
        admin.role = Role::Admin;
        let token = codec.generate(&admin, Duration::from_secs(60)).unwrap();

        assert_eq!(codec.decode(&token).unwrap().role, Role::Admin);
    }
}
