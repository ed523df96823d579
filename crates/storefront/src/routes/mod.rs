//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Home page
//! GET  /health                  - Health check
//!
//! # Catalog
//! GET  /productos               - Product listing (with ?q= filter)
//! GET  /producto/{id}           - Product detail
//! GET  /categoria/{slug}        - Category listing
//!
//! # Cart (HTMX fragments)
//! GET  /carro                   - Cart page
//! POST /carro/agregar           - Add to cart (returns badge, opens drawer)
//! POST /carro/actualizar        - Update quantity (returns drawer items)
//! POST /carro/quitar            - Remove item (returns drawer items)
//! GET  /carro/badge             - Cart count badge (fragment)
//! GET  /carro/panel             - Cart drawer items (fragment)
//!
//! # Checkout
//! GET  /checkout                - Shipping form (or empty-cart view)
//! GET  /checkout/envio          - Shipping quote fragment (HTMX)
//! POST /checkout                - Create payment, redirect to provider
//! GET  /compra-exitosa          - Post-payment confirmation (clears cart)
//!
//! # Tracking
//! GET  /envios                  - Track an order by code (?code=)
//! POST /envios/reintentar       - Retry payment for a pending order
//!
//! # Favorites
//! GET  /favoritos               - Favorites grid (login prompt if anonymous)
//! POST /favoritos/toggle        - Optimistic toggle (fragment)
//!
//! # Account
//! GET  /perfil                  - Login/register forms, or profile + orders
//! POST /perfil/login            - Login action
//! POST /perfil/registro         - Register action (auto-login)
//! POST /perfil/salir            - Logout action
//! POST /perfil/actualizar       - Update stored profile
//! ```

pub mod account;
pub mod cart;
pub mod checkout;
pub mod favorites;
pub mod home;
pub mod products;
pub mod track;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/agregar", post(cart::add))
        .route("/actualizar", post(cart::update))
        .route("/quitar", post(cart::remove))
        .route("/badge", get(cart::count))
        .route("/panel", get(cart::panel))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show).post(checkout::submit))
        .route("/envio", get(checkout::shipping_quote))
}

/// Create the tracking routes router.
pub fn track_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(track::show))
        .route("/reintentar", post(track::retry))
}

/// Create the favorites routes router.
pub fn favorites_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(favorites::show))
        .route("/toggle", post(favorites::toggle))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::show))
        .route("/login", post(account::login))
        .route("/registro", post(account::register))
        .route("/salir", post(account::logout))
        .route("/actualizar", post(account::update_profile))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Catalog routes
        .route("/productos", get(products::index))
        .route("/producto/{id}", get(products::show))
        .route("/categoria/{slug}", get(products::category))
        // Cart routes
        .nest("/carro", cart_routes())
        // Checkout routes
        .nest("/checkout", checkout_routes())
        .route("/compra-exitosa", get(checkout::confirmation))
        // Tracking routes
        .nest("/envios", track_routes())
        // Favorites routes
        .nest("/favoritos", favorites_routes())
        // Account routes
        .nest("/perfil", account_routes())
}
