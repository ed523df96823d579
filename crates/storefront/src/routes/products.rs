//! Catalog route handlers.
//!
//! Product listings render directly from the cached backend catalog.
//! Category and search filtering is stateless list filtering, nothing
//! more.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use policromica_core::ProductId;

use crate::backend::Product;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::services::favorites;
use crate::state::AppState;

// =============================================================================
// Display Types
// =============================================================================

/// Product card display data for grids.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub price: String,
    pub image: Option<String>,
    pub in_stock: bool,
}

impl ProductCardView {
    pub(crate) fn from_product(product: &Product, backend_base: &str) -> Self {
        Self {
            id: product.id.as_i64(),
            name: product.name.clone(),
            category: product.category.clone().unwrap_or_default(),
            price: product.price.format_clp(),
            image: absolute_image(backend_base, product.main_image.as_deref()),
            in_stock: product.in_stock(),
        }
    }
}

/// Product detail display data.
#[derive(Clone)]
pub struct ProductDetailView {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub price: String,
    pub description: String,
    pub images: Vec<String>,
    pub in_stock: bool,
}

/// Make a backend-relative media path absolute against the backend
/// host. Absolute URLs pass through untouched.
pub(crate) fn absolute_image(backend_base: &str, path: Option<&str>) -> Option<String> {
    let path = path?;
    if path.starts_with("http://") || path.starts_with("https://") {
        Some(path.to_owned())
    } else {
        Some(format!("{backend_base}{path}"))
    }
}

/// URL slug for a category label ("Aros" -> "aros").
pub(crate) fn category_slug(name: &str) -> String {
    name.to_lowercase().replace(char::is_whitespace, "-")
}

// =============================================================================
// Query Types
// =============================================================================

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Product listing page template (all products / search / category).
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub title: String,
    pub products: Vec<ProductCardView>,
    pub query: Option<String>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductDetailView,
    pub related: Vec<ProductCardView>,
    pub logged_in: bool,
    pub favored: bool,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the full product listing, optionally filtered by a search
/// term (case-insensitive name match).
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse> {
    let catalog = state.backend().products().await?;
    let base = &state.config().backend.base_url;

    let term = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase);

    let products = catalog
        .iter()
        .filter(|p| {
            term.as_deref()
                .is_none_or(|t| p.name.to_lowercase().contains(t))
        })
        .map(|p| ProductCardView::from_product(p, base))
        .collect();

    Ok(ProductsIndexTemplate {
        title: "Nuestros Productos".to_string(),
        products,
        query: query.q,
    })
}

/// Display a category listing.
#[instrument(skip(state))]
pub async fn category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let catalog = state.backend().products().await?;
    let base = &state.config().backend.base_url;

    let mut title = None;
    let products: Vec<ProductCardView> = catalog
        .iter()
        .filter(|p| {
            p.category
                .as_deref()
                .is_some_and(|c| category_slug(c) == slug)
        })
        .inspect(|p| {
            if title.is_none() {
                title.clone_from(&p.category);
            }
        })
        .map(|p| ProductCardView::from_product(p, base))
        .collect();

    Ok(ProductsIndexTemplate {
        title: title.unwrap_or(slug),
        products,
        query: None,
    })
}

/// Display product detail page.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: tower_sessions::Session,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let catalog = state.backend().products().await?;
    let base = &state.config().backend.base_url;

    let product = catalog
        .iter()
        .find(|p| p.id == ProductId::new(id))
        .ok_or_else(|| AppError::NotFound(format!("producto {id}")))?;

    let images: Vec<String> = if product.all_images.is_empty() {
        absolute_image(base, product.main_image.as_deref())
            .into_iter()
            .collect()
    } else {
        product
            .all_images
            .iter()
            .filter_map(|img| absolute_image(base, Some(img)))
            .collect()
    };

    // Same-category suggestions, excluding the product itself
    let related: Vec<ProductCardView> = catalog
        .iter()
        .filter(|p| p.id != product.id && p.category == product.category)
        .take(4)
        .map(|p| ProductCardView::from_product(p, base))
        .collect();

    // Heart state for the toggle button; a failed hydration just
    // renders an unfilled heart.
    let favored = match &user {
        Some(user) => favorites::hydrate(state.backend(), &session, user)
            .await
            .map(|ids| ids.contains(&id))
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to hydrate favorites: {e}");
                false
            }),
        None => false,
    };

    Ok(ProductShowTemplate {
        product: ProductDetailView {
            id: product.id.as_i64(),
            name: product.name.clone(),
            category: product.category.clone().unwrap_or_default(),
            price: product.price.format_clp(),
            description: product.description.clone(),
            images,
            in_stock: product.in_stock(),
        },
        related,
        logged_in: user.is_some(),
        favored,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_image() {
        assert_eq!(
            absolute_image("http://127.0.0.1:8000", Some("/media/aros.jpg")),
            Some("http://127.0.0.1:8000/media/aros.jpg".to_string())
        );
        assert_eq!(
            absolute_image("http://127.0.0.1:8000", Some("https://cdn.example.com/a.jpg")),
            Some("https://cdn.example.com/a.jpg".to_string())
        );
        assert_eq!(absolute_image("http://127.0.0.1:8000", None), None);
    }

    #[test]
    fn test_category_slug() {
        assert_eq!(category_slug("Aros"), "aros");
        assert_eq!(category_slug("Cortadores de Galletas"), "cortadores-de-galletas");
    }
}
