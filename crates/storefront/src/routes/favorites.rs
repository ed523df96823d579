//! Favorites route handlers.
//!
//! The grid requires a session identity; anonymous visitors get a
//! login prompt instead. Toggling is an optimistic HTMX fragment: the
//! heart flips immediately and reverts only if the backend commit
//! fails.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use policromica_core::ProductId;

use crate::filters;
use crate::middleware::OptionalAuth;
use crate::routes::products::absolute_image;
use crate::services::favorites;
use crate::state::AppState;

// =============================================================================
// Display Types
// =============================================================================

/// Favorited product card.
#[derive(Clone)]
pub struct FavoriteCardView {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub price: String,
    pub image: Option<String>,
    pub in_stock: bool,
}

// =============================================================================
// Form Types
// =============================================================================

/// Toggle form data.
#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub product_id: i64,
}

// =============================================================================
// Templates
// =============================================================================

/// Favorites page template.
#[derive(Template, WebTemplate)]
#[template(path = "favorites/show.html")]
pub struct FavoritesTemplate {
    pub logged_in: bool,
    pub products: Vec<FavoriteCardView>,
    pub error: Option<String>,
}

/// Favorite heart button fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/favorite_button.html")]
pub struct FavoriteButtonTemplate {
    pub product_id: i64,
    pub favored: bool,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the favorites grid, or a login prompt for anonymous
/// visitors.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Response {
    let Some(user) = user else {
        return FavoritesTemplate {
            logged_in: false,
            products: Vec::new(),
            error: None,
        }
        .into_response();
    };

    let base = &state.config().backend.base_url;
    match state.backend().favorites(user.email.as_str()).await {
        Ok(products) => {
            // Keep the optimistic-toggle cache in sync with what the
            // grid shows.
            let ids: std::collections::HashSet<i64> =
                products.iter().map(|p| p.id.as_i64()).collect();
            if let Err(e) = session
                .insert(crate::models::session_keys::FAVORITE_IDS, &ids)
                .await
            {
                tracing::warn!("Failed to cache favorite ids: {e}");
            }

            FavoritesTemplate {
                logged_in: true,
                products: products
                    .iter()
                    .map(|p| FavoriteCardView {
                        id: p.id.as_i64(),
                        name: p.name.clone(),
                        category: p.category.clone().unwrap_or_default(),
                        price: p.price.format_clp(),
                        image: absolute_image(base, p.image.as_deref()),
                        in_stock: p.stock > 0,
                    })
                    .collect(),
                error: None,
            }
            .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to fetch favorites: {e}");
            FavoritesTemplate {
                logged_in: true,
                products: Vec::new(),
                error: Some("No pudimos cargar tus favoritos. Intenta nuevamente.".to_string()),
            }
            .into_response()
        }
    }
}

/// Toggle a favorite (HTMX).
///
/// The service applies the flip locally before committing remotely and
/// rolls back on failure; either way the fragment renders the state
/// the session ended up with.
#[instrument(skip(state, session))]
pub async fn toggle(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<ToggleForm>,
) -> Response {
    let Some(user) = user else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    let product_id = ProductId::new(form.product_id);
    match favorites::toggle(state.backend(), &session, &user, product_id).await {
        Ok(favored) => FavoriteButtonTemplate {
            product_id: form.product_id,
            favored,
        }
        .into_response(),
        Err(e) => {
            tracing::error!("Favorite toggle failed: {e}");
            // Rolled back; render whatever the cache says now.
            let favored = favorites::cached_ids(&session)
                .await
                .is_some_and(|ids| ids.contains(&form.product_id));
            (
                StatusCode::BAD_GATEWAY,
                FavoriteButtonTemplate {
                    product_id: form.product_id,
                    favored,
                },
            )
                .into_response()
        }
    }
}
