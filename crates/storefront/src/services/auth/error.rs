//! Authentication error types.

use thiserror::Error;

use crate::backend::BackendError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] policromica_core::EmailError),

    /// Invalid credentials (wrong email or password).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The cached credential cannot be decoded.
    #[error("malformed credential")]
    MalformedToken,

    /// The cached credential's expiry claim is in the past.
    #[error("credential expired")]
    TokenExpired,

    /// Backend API error.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// Session storage error.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}
