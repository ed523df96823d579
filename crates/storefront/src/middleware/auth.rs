//! Authentication extractors.
//!
//! Identity is derived, not stored: on every request the cached access
//! credential's expiry claim is decoded (no signature check - the
//! backend re-validates on every protected call) and an expired or
//! malformed credential silently clears the session, leaving the
//! visitor anonymous.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use policromica_core::{Email, UserId};

use crate::backend::TokenPair;
use crate::models::{CurrentUser, session_keys};
use crate::services::auth::decode_claims;

/// Extractor that requires an authenticated visitor.
///
/// If the visitor is not logged in (or their credential expired),
/// HTML requests are redirected to the account page and API paths get
/// a 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hola, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but absent.
pub enum AuthRejection {
    /// Redirect to the account page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API/fragment requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/perfil").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let OptionalAuth(user) = OptionalAuth::from_request_parts(parts, state)
            .await
            .map_err(|_| AuthRejection::Unauthorized)?;

        user.map(Self).ok_or_else(|| {
            if parts.uri.path().starts_with("/api/") {
                AuthRejection::Unauthorized
            } else {
                AuthRejection::RedirectToLogin
            }
        })
    }
}

/// Extractor that optionally restores the current visitor's identity.
///
/// Unlike `RequireAuth`, this never rejects the request.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>() else {
            return Ok(Self(None));
        };

        Ok(Self(restore_identity(session).await))
    }
}

/// Restore the identity from session-cached credentials.
///
/// Requires both the access credential and the cached email; anything
/// expired or malformed triggers an implicit logout and yields `None`.
/// No network round-trip - the client-decoded expiry is trusted for
/// display purposes only.
async fn restore_identity(session: &Session) -> Option<CurrentUser> {
    let token: String = session
        .get(session_keys::ACCESS_TOKEN)
        .await
        .ok()
        .flatten()?;
    let email: String = session.get(session_keys::USER_EMAIL).await.ok().flatten()?;

    let claims = match decode_claims(&token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!("Clearing malformed cached credential: {e}");
            let _ = clear_credentials(session).await;
            return None;
        }
    };

    if claims.is_expired(chrono::Utc::now().timestamp()) {
        tracing::debug!("Cached credential expired, logging out");
        let _ = clear_credentials(session).await;
        return None;
    }

    let Ok(email) = Email::parse(&email) else {
        let _ = clear_credentials(session).await;
        return None;
    };

    Some(CurrentUser {
        id: UserId::new(claims.user_id),
        email,
    })
}

/// Read the raw access credential for backend bearer auth.
pub async fn access_token(session: &Session) -> Option<String> {
    session
        .get::<String>(session_keys::ACCESS_TOKEN)
        .await
        .ok()
        .flatten()
}

/// Persist the issued credentials and the login email in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn store_credentials(
    session: &Session,
    tokens: &TokenPair,
    email: &str,
) -> Result<(), tower_sessions::session::Error> {
    session
        .insert(session_keys::ACCESS_TOKEN, &tokens.access)
        .await?;
    session
        .insert(session_keys::REFRESH_TOKEN, &tokens.refresh)
        .await?;
    session.insert(session_keys::USER_EMAIL, email).await?;
    Ok(())
}

/// Clear all persisted credential material (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_credentials(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<String>(session_keys::ACCESS_TOKEN)
        .await?;
    session
        .remove::<String>(session_keys::REFRESH_TOKEN)
        .await?;
    session.remove::<String>(session_keys::USER_EMAIL).await?;
    session
        .remove::<std::collections::HashSet<i64>>(session_keys::FAVORITE_IDS)
        .await?;
    Ok(())
}
