//! Checkout route handlers.
//!
//! A checkout session is one shipping form over the current cart.
//! Whenever the region selection changes, the flat-rate table is
//! consulted via an HTMX fragment; submission stays disabled while the
//! quote is zero ("shipping not yet determined", never free shipping).
//! Submitting builds a payment request for the backend and hands the
//! browser off to the provider's redirect URL - the storefront does not
//! wait for payment completion.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use policromica_core::{Cart, Money, shipping};

use crate::backend::{PaymentLine, PaymentRequest, PaymentShipping};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;
use crate::routes::cart::{CartView, load_cart, save_cart};
use crate::state::AppState;

/// How long the prefill notice stays visible, in milliseconds.
const PREFILL_NOTICE_MS: u32 = 6_000;

// =============================================================================
// Form Types
// =============================================================================

/// The shipping form. Field names match the payment request wire
/// format.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub apellido: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub telefono: String,
    #[serde(default)]
    pub direccion: String,
    #[serde(default)]
    pub ciudad: String,
    #[serde(default)]
    pub region: String,
}

/// Region query for the shipping quote fragment.
#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    #[serde(default)]
    pub region: String,
}

/// Order number query on the confirmation view.
#[derive(Debug, Deserialize)]
pub struct ConfirmQuery {
    pub orden: Option<String>,
}

// =============================================================================
// Display Types
// =============================================================================

/// One row of the region selector.
#[derive(Clone)]
pub struct RegionOption {
    pub name: &'static str,
    pub zone: &'static str,
    pub price: String,
    pub selected: bool,
}

/// Shipping cost summary shared by the form page and the HTMX
/// fragment.
#[derive(Clone)]
pub struct QuoteView {
    /// Cart total before shipping.
    pub subtotal: String,
    /// Formatted fee, present only when a region resolved.
    pub shipping: Option<String>,
    /// `cart total + shipping`, the amount sent to the provider.
    pub total: String,
    /// Submission is allowed only when this is true.
    pub ready: bool,
}

impl QuoteView {
    fn build(cart: &Cart, region: &str) -> Self {
        let fee = shipping::quote(region);
        let subtotal = cart.total_price();
        let total = subtotal + fee;
        Self {
            subtotal: subtotal.format_clp(),
            shipping: (!fee.is_zero()).then(|| fee.format_clp()),
            total: total.format_clp(),
            ready: !fee.is_zero() && !cart.is_empty(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Checkout form page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/form.html")]
pub struct CheckoutTemplate {
    pub cart: CartView,
    pub form: CheckoutForm,
    pub regions: Vec<RegionOption>,
    pub quote: QuoteView,
    pub prefilled: bool,
    pub prefill_notice_ms: u32,
    pub error: Option<String>,
}

/// Empty-cart short-circuit template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/empty.html")]
pub struct CheckoutEmptyTemplate;

/// Shipping quote fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/shipping_quote.html")]
pub struct ShippingQuoteTemplate {
    pub quote: QuoteView,
}

/// Post-payment confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirm.html")]
pub struct ConfirmTemplate {
    pub order_number: Option<String>,
}

fn region_options(selected: &str) -> Vec<RegionOption> {
    shipping::regions()
        .iter()
        .map(|r| RegionOption {
            name: r.name,
            zone: r.zone.as_str(),
            price: r.price.format_clp(),
            selected: r.name == selected,
        })
        .collect()
}

fn render_form(cart: &Cart, form: CheckoutForm, prefilled: bool, error: Option<String>) -> Response {
    let quote = QuoteView::build(cart, &form.region);
    CheckoutTemplate {
        cart: CartView::from(cart),
        regions: region_options(&form.region),
        quote,
        form,
        prefilled,
        prefill_notice_ms: PREFILL_NOTICE_MS,
        error,
    }
    .into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the checkout form, or the empty-cart view.
///
/// With a session identity, the stored profile is fetched by email and
/// the form prefilled: the single full-name field splits into
/// nombre/apellido on the first whitespace run. A failed profile fetch
/// just renders the unprefilled form.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Response {
    let cart = load_cart(&session).await;
    if cart.is_empty() {
        return CheckoutEmptyTemplate.into_response();
    }

    let (form, prefilled) = match &user {
        Some(user) => prefill_form(&state, user).await,
        None => (CheckoutForm::default(), false),
    };

    render_form(&cart, form, prefilled, None)
}

/// Build a prefilled form from the stored profile, falling back to an
/// email-only form when the profile fetch fails.
async fn prefill_form(state: &AppState, user: &CurrentUser) -> (CheckoutForm, bool) {
    let email = user.email.to_string();
    match state.backend().profile(user.email.as_str()).await {
        Ok(profile) => {
            let (nombre, apellido) = split_full_name(&profile.nombre);
            (
                CheckoutForm {
                    nombre,
                    apellido,
                    email,
                    telefono: profile.telefono,
                    direccion: profile.direccion,
                    ciudad: profile.ciudad,
                    region: String::new(),
                },
                true,
            )
        }
        Err(e) => {
            tracing::warn!("Failed to fetch profile for prefill: {e}");
            (
                CheckoutForm {
                    email,
                    ..CheckoutForm::default()
                },
                false,
            )
        }
    }
}

/// Split a stored full-name field on the first whitespace run.
fn split_full_name(full_name: &str) -> (String, String) {
    let full_name = full_name.trim();
    match full_name.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_owned(), rest.trim_start().to_owned()),
        None => (full_name.to_owned(), String::new()),
    }
}

/// Shipping quote fragment (HTMX): recomputed whenever the region
/// field changes.
#[instrument(skip(session))]
pub async fn shipping_quote(
    session: Session,
    Query(query): Query<QuoteQuery>,
) -> impl IntoResponse {
    let cart = load_cart(&session).await;
    ShippingQuoteTemplate {
        quote: QuoteView::build(&cart, &query.region),
    }
}

/// Handle checkout submission.
///
/// Guards first (no backend call on an empty cart or unresolved
/// region), then builds the payment request and redirects the browser
/// to the provider URL. On failure the form re-renders intact with an
/// alert - no data loss.
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CheckoutForm>,
) -> Response {
    let cart = load_cart(&session).await;
    if cart.is_empty() {
        return Redirect::to("/checkout").into_response();
    }

    let fee = shipping::quote(&form.region);
    if fee.is_zero() {
        return render_form(
            &cart,
            form,
            false,
            Some("Selecciona una región de envío para continuar.".to_string()),
        );
    }

    let final_total: Money = cart.total_price() + fee;
    let request = PaymentRequest {
        amount: final_total,
        email: form.email.clone(),
        shipping: PaymentShipping {
            nombre: form.nombre.clone(),
            apellido: form.apellido.clone(),
            email: form.email.clone(),
            telefono: form.telefono.clone(),
            direccion: form.direccion.clone(),
            ciudad: form.ciudad.clone(),
            region: form.region.clone(),
        },
        cart: cart
            .items()
            .iter()
            .map(|item| PaymentLine {
                id: item.id,
                quantity: item.quantity,
            })
            .collect(),
    };

    match state.backend().create_payment(&request).await {
        Ok(redirect) => {
            // Terminal success transition: hand off to the provider and
            // stop - payment completion is confirmed out of band.
            Redirect::to(&redirect.url).into_response()
        }
        Err(e) => {
            tracing::error!("Payment creation failed: {e}");
            render_form(
                &cart,
                form,
                false,
                Some(
                    "Hubo un problema al generar el pago. Por favor, intenta nuevamente."
                        .to_string(),
                ),
            )
        }
    }
}

/// Post-payment confirmation view.
///
/// The payment provider redirects here with the order number as a
/// query parameter; reaching this view is the checkout confirmation,
/// so the cart is cleared.
#[instrument(skip(session))]
pub async fn confirmation(
    session: Session,
    Query(query): Query<ConfirmQuery>,
) -> impl IntoResponse {
    let mut cart = load_cart(&session).await;
    if !cart.is_empty() {
        cart.clear();
        if let Err(e) = save_cart(&session, &cart).await {
            tracing::error!("Failed to clear cart after checkout: {e}");
        }
    }

    ConfirmTemplate {
        order_number: query.orden,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use policromica_core::{CartProduct, ProductId};

    fn cart_with_total(amount: i64) -> Cart {
        let mut cart = Cart::new();
        cart.add(
            CartProduct {
                id: ProductId::new(1),
                name: "Aros Acuarela".to_string(),
                image: None,
                price: Money::new(amount),
            },
            1,
        );
        cart
    }

    #[test]
    fn test_quote_unresolved_region_blocks_submission() {
        let quote = QuoteView::build(&cart_with_total(10_000), "");
        assert!(quote.shipping.is_none());
        assert!(!quote.ready);
        // Nothing resolved: the displayed total is just the subtotal
        assert_eq!(quote.total, "$10.000");
    }

    #[test]
    fn test_quote_resolved_region_prices_and_enables() {
        let quote = QuoteView::build(&cart_with_total(10_000), "Región Metropolitana");
        assert_eq!(quote.shipping.as_deref(), Some("$4.300"));
        assert_eq!(quote.total, "$14.300");
        assert!(quote.ready);
    }

    #[test]
    fn test_quote_empty_cart_never_ready() {
        let quote = QuoteView::build(&Cart::new(), "Región Metropolitana");
        assert!(!quote.ready);
    }

    #[test]
    fn test_split_full_name() {
        assert_eq!(
            split_full_name("María José"),
            ("María".to_string(), "José".to_string())
        );
        assert_eq!(
            split_full_name("  Ana  María Pérez "),
            ("Ana".to_string(), "María Pérez".to_string())
        );
        assert_eq!(split_full_name("Ana"), ("Ana".to_string(), String::new()));
        assert_eq!(split_full_name(""), (String::new(), String::new()));
    }

    #[test]
    fn test_region_options_mark_selection() {
        let options = region_options("Región Metropolitana");
        let selected: Vec<&str> = options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.name)
            .collect();
        assert_eq!(selected, vec!["Región Metropolitana"]);

        let none_selected = region_options("");
        assert!(none_selected.iter().all(|o| !o.selected));
    }
}
