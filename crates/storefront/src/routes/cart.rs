//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page
//! reloads. The cart itself lives in the visitor's session: every
//! mutation loads it, applies the pure operation from
//! `policromica_core::Cart`, and writes the whole cart back, so state
//! survives reloads exactly as the persisted form was left.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, Html, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use policromica_core::{Cart, CartProduct, ProductId};

use crate::backend::BackendError;
use crate::filters;
use crate::models::session_keys;
use crate::routes::products::absolute_image;
use crate::state::AppState;

// =============================================================================
// Session Helpers
// =============================================================================

/// Restore the cart from the session. Absent or invalid stored state
/// yields an empty cart.
pub(crate) async fn load_cart(session: &Session) -> Cart {
    session
        .get::<Cart>(session_keys::CART)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Persist the full cart into the session.
pub(crate) async fn save_cart(
    session: &Session,
    cart: &Cart,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

// =============================================================================
// Display Types
// =============================================================================

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: i64,
    pub name: String,
    pub image: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart
                .items()
                .iter()
                .map(|item| CartItemView {
                    id: item.id.as_i64(),
                    name: item.name.clone(),
                    image: item.image.clone(),
                    quantity: item.quantity,
                    price: item.price.format_clp(),
                    line_total: item.line_total().format_clp(),
                })
                .collect(),
            total: cart.total_price().format_clp(),
            item_count: cart.total_items(),
        }
    }
}

// =============================================================================
// Form Types
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: i64,
    pub quantity: Option<u32>,
}

/// Update quantity form data; `delta` is typically +1 or -1.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: i64,
    pub delta: i32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: i64,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart items fragment template (drawer contents, for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(session))]
pub async fn show(session: Session) -> impl IntoResponse {
    let cart = load_cart(&session).await;
    CartShowTemplate {
        cart: CartView::from(&cart),
    }
}

/// Add item to cart (HTMX).
///
/// Resolves the product from the cached catalog so the stored line
/// carries a normalized numeric price, then increments-or-appends.
/// Returns the count badge and triggers the drawer to open - adding
/// always opens the cart panel.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let product_id = ProductId::new(form.product_id);
    let product = match state.backend().product(product_id).await {
        Ok(product) => product,
        Err(BackendError::NotFound(_)) => {
            return (
                StatusCode::NOT_FOUND,
                Html("<span class=\"error\">Producto no encontrado</span>"),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("Failed to resolve product for cart: {e}");
            return (
                StatusCode::BAD_GATEWAY,
                Html("<span class=\"error\">Error al agregar al carrito</span>"),
            )
                .into_response();
        }
    };

    let mut cart = load_cart(&session).await;
    cart.add(
        CartProduct {
            id: product.id,
            name: product.name,
            image: absolute_image(
                &state.config().backend.base_url,
                product.main_image.as_deref(),
            ),
            price: product.price,
        },
        form.quantity.unwrap_or(1).max(1),
    );

    if let Err(e) = save_cart(&session, &cart).await {
        tracing::error!("Failed to persist cart: {e}");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html("<span class=\"error\">Error al agregar al carrito</span>"),
        )
            .into_response();
    }

    (
        AppendHeaders([("HX-Trigger", "cart-updated, cart-open")]),
        CartCountTemplate {
            count: cart.total_items(),
        },
    )
        .into_response()
}

/// Update cart item quantity by a delta (HTMX).
///
/// A quantity driven to zero or below removes the line.
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Response {
    let mut cart = load_cart(&session).await;
    cart.update_quantity(ProductId::new(form.product_id), form.delta);

    if let Err(e) = save_cart(&session, &cart).await {
        tracing::error!("Failed to persist cart: {e}");
    }

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
        .into_response()
}

/// Remove item from cart (HTMX).
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Response {
    let mut cart = load_cart(&session).await;
    cart.remove(ProductId::new(form.product_id));

    if let Err(e) = save_cart(&session, &cart).await {
        tracing::error!("Failed to persist cart: {e}");
    }

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
        .into_response()
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    let cart = load_cart(&session).await;
    CartCountTemplate {
        count: cart.total_items(),
    }
}

/// Get cart drawer items (HTMX).
#[instrument(skip(session))]
pub async fn panel(session: Session) -> impl IntoResponse {
    let cart = load_cart(&session).await;
    CartItemsTemplate {
        cart: CartView::from(&cart),
    }
}
