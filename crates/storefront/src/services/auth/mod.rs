//! Authentication service.
//!
//! Login and registration are thin calls into the backend's token and
//! register endpoints; the storefront never sees a password hash. The
//! only local work is decoding the JWT payload for the user id and the
//! expiry claim - a convenience read without signature verification,
//! never a trust decision. The backend re-validates the credential on
//! every protected call.

mod error;

pub use error::AuthError;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use tower_sessions::Session;

use policromica_core::{Email, UserId};

use crate::backend::BackendClient;
use crate::middleware::auth::{clear_credentials, store_credentials};
use crate::models::CurrentUser;

/// The claims the storefront reads from the access credential.
///
/// Everything else in the payload is ignored.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TokenClaims {
    /// Backend user id.
    pub user_id: i64,
    /// Expiry as a Unix timestamp.
    pub exp: i64,
}

impl TokenClaims {
    /// Whether the credential expired before `now` (Unix seconds).
    #[must_use]
    pub const fn is_expired(&self, now: i64) -> bool {
        self.exp <= now
    }
}

/// Decode the payload segment of a JWT without verifying its signature.
///
/// # Errors
///
/// Returns `MalformedToken` if the token does not have three segments,
/// the payload is not valid base64url, or the claims are missing.
pub fn decode_claims(token: &str) -> Result<TokenClaims, AuthError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or(AuthError::MalformedToken)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| AuthError::MalformedToken)?;
    serde_json::from_slice(&bytes).map_err(|_| AuthError::MalformedToken)
}

/// Log in with email and password.
///
/// On success the issued credentials and the email are persisted in the
/// session and the identity is derived from the access credential's
/// payload.
///
/// # Errors
///
/// Returns `InvalidCredentials` for any backend rejection - the route
/// turns it into the single user-facing message, so the caller cannot
/// probe which part was wrong.
pub async fn login(
    backend: &BackendClient,
    session: &Session,
    email: &str,
    password: &str,
) -> Result<CurrentUser, AuthError> {
    let email = Email::parse(email)?;

    let tokens = backend
        .obtain_token(email.as_str(), password)
        .await
        .map_err(|e| {
            tracing::debug!("Token issuance failed: {e}");
            AuthError::InvalidCredentials
        })?;

    let claims = decode_claims(&tokens.access)?;

    store_credentials(session, &tokens, email.as_str()).await?;

    Ok(CurrentUser {
        id: UserId::new(claims.user_id),
        email,
    })
}

/// Register a new account and log in with the same credentials.
///
/// # Errors
///
/// Returns `Backend` carrying the backend's message (e.g. email already
/// registered) when registration fails.
pub async fn register(
    backend: &BackendClient,
    session: &Session,
    nombre: &str,
    email: &str,
    password: &str,
) -> Result<CurrentUser, AuthError> {
    let parsed = Email::parse(email)?;

    backend
        .register(nombre, parsed.as_str(), password)
        .await?;

    // Auto-login after signup
    login(backend, session, parsed.as_str(), password).await
}

/// Log out: clear all persisted credential material.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn logout(session: &Session) -> Result<(), AuthError> {
    clear_credentials(session).await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Build an unsigned JWT-shaped token with the given claims.
    fn token_with_claims(claims: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
        format!("{header}.{payload}.signature-not-checked")
    }

    #[test]
    fn test_decode_claims() {
        let token = token_with_claims(&serde_json::json!({
            "token_type": "access",
            "user_id": 7,
            "exp": 1_900_000_000_i64,
            "iat": 1_899_000_000_i64,
            "jti": "abc123"
        }));

        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.exp, 1_900_000_000);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_claims("not-a-jwt"),
            Err(AuthError::MalformedToken)
        ));
        assert!(matches!(
            decode_claims("a.!!!.c"),
            Err(AuthError::MalformedToken)
        ));
        // Valid base64 but not the expected claims
        let bad_payload = URL_SAFE_NO_PAD.encode(b"{\"sub\":\"x\"}");
        assert!(matches!(
            decode_claims(&format!("h.{bad_payload}.s")),
            Err(AuthError::MalformedToken)
        ));
    }

    #[test]
    fn test_expiry_check() {
        let claims = TokenClaims {
            user_id: 7,
            exp: 1000,
        };
        assert!(claims.is_expired(1000));
        assert!(claims.is_expired(2000));
        assert!(!claims.is_expired(999));
    }

    #[test]
    fn test_past_expiry_token_is_expired_now() {
        let token = token_with_claims(&serde_json::json!({
            "user_id": 7,
            "exp": 1_600_000_000_i64
        }));

        let claims = decode_claims(&token).unwrap();
        assert!(claims.is_expired(chrono::Utc::now().timestamp()));
    }
}
