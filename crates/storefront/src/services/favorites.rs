//! Favorites with optimistic toggling.
//!
//! The session caches the set of favorited product ids so the heart
//! icons render without a backend round-trip. Toggling is optimistic:
//! the cached set is flipped and persisted first, then the remote
//! toggle is attempted, and a backend failure rolls the local flip
//! back. The visitor sees the change instantly and only loses it if
//! the commit genuinely failed.

use std::collections::HashSet;

use tower_sessions::Session;

use policromica_core::ProductId;

use crate::backend::{BackendClient, BackendError};
use crate::error::AppError;
use crate::models::{CurrentUser, session_keys};

/// Read the cached favorite ids, if the session has been hydrated.
pub async fn cached_ids(session: &Session) -> Option<HashSet<i64>> {
    session
        .get::<HashSet<i64>>(session_keys::FAVORITE_IDS)
        .await
        .ok()
        .flatten()
}

/// Hydrate the cached set from the backend, returning it.
///
/// # Errors
///
/// Returns an error if the backend listing fails or the session cannot
/// be written.
pub async fn hydrate(
    backend: &BackendClient,
    session: &Session,
    user: &CurrentUser,
) -> Result<HashSet<i64>, AppError> {
    if let Some(ids) = cached_ids(session).await {
        return Ok(ids);
    }

    let ids: HashSet<i64> = backend
        .favorites(user.email.as_str())
        .await?
        .into_iter()
        .map(|p| p.id.as_i64())
        .collect();

    session.insert(session_keys::FAVORITE_IDS, &ids).await?;
    Ok(ids)
}

/// Toggle a product in the user's favorites, optimistically.
///
/// Applies the flip to the session first, then commits it remotely;
/// on commit failure the local flip is undone before the error is
/// returned. Returns whether the product is favorited after the
/// toggle.
///
/// # Errors
///
/// Returns the backend error after rolling back the local change.
pub async fn toggle(
    backend: &BackendClient,
    session: &Session,
    user: &CurrentUser,
    product_id: ProductId,
) -> Result<bool, AppError> {
    let previous = hydrate(backend, session, user).await?;

    // Apply locally
    let mut next = previous.clone();
    let now_favored = if next.remove(&product_id.as_i64()) {
        false
    } else {
        next.insert(product_id.as_i64());
        true
    };
    session.insert(session_keys::FAVORITE_IDS, &next).await?;

    // Attempt the remote commit; undo on failure
    if let Err(e) = commit(backend, user, product_id).await {
        tracing::warn!("Favorite toggle failed, rolling back: {e}");
        session
            .insert(session_keys::FAVORITE_IDS, &previous)
            .await?;
        return Err(e.into());
    }

    Ok(now_favored)
}

/// The remote half of the optimistic mutation.
async fn commit(
    backend: &BackendClient,
    user: &CurrentUser,
    product_id: ProductId,
) -> Result<(), BackendError> {
    backend
        .toggle_favorite(user.email.as_str(), product_id)
        .await
}
