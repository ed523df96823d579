//! Session-related types.
//!
//! The visitor's session is the storefront's only client-side state:
//! credential material, the cached email, the serialized cart, and the
//! cached favorite ids each live under their own key, surviving reloads
//! for as long as the session cookie does.

use serde::{Deserialize, Serialize};

use policromica_core::{Email, UserId};

/// Session-stored user identity.
///
/// Derived from the cached access credential on every request; never
/// stored directly. Absent identity means an anonymous visitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User id from the credential's payload.
    pub id: UserId,
    /// The email the user logged in with.
    pub email: Email,
}

/// Session keys. One key per piece of persisted state.
pub mod keys {
    /// JWT access credential issued by the backend.
    pub const ACCESS_TOKEN: &str = "access_token";

    /// JWT refresh credential issued by the backend.
    pub const REFRESH_TOKEN: &str = "refresh_token";

    /// Email cached at login; the credential payload only carries the
    /// user id.
    pub const USER_EMAIL: &str = "user_email";

    /// The serialized cart, rewritten on every mutation.
    pub const CART: &str = "cart";

    /// Cached favorite product ids for optimistic toggling.
    pub const FAVORITE_IDS: &str = "favorite_ids";
}
