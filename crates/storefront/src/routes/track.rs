//! Order tracking and payment retry route handlers.
//!
//! Tracking is a query/result cycle: nothing is persisted, and every
//! render carries exactly one of {result, error}. The expiry flag and
//! the ownership gate both come from the backend; the storefront only
//! renders them - and re-checks them server-side before a retry, since
//! a stale page must not be able to re-open a closed order.

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

use crate::backend::{BackendError, TrackedOrder};
use crate::filters;
use crate::middleware::{OptionalAuth, auth::access_token};
use crate::models::CurrentUser;
use crate::state::AppState;

/// "No such order" message, with the expected code format.
const NOT_FOUND_MSG: &str =
    "No encontramos ningún pedido con ese código. Verifica el formato (ej: POLI-15).";

/// Generic transport-failure message.
const LOOKUP_FAILED_MSG: &str = "Error al consultar el pedido. Intenta nuevamente.";

/// Generic retry-failure message.
const RETRY_FAILED_MSG: &str = "No pudimos reintentar el pago. Intenta nuevamente.";

// =============================================================================
// Query / Form Types
// =============================================================================

/// Tracking page query.
#[derive(Debug, Deserialize)]
pub struct TrackQuery {
    pub code: Option<String>,
}

/// Payment retry form data.
#[derive(Debug, Deserialize)]
pub struct RetryForm {
    pub code: String,
}

// =============================================================================
// Display Types
// =============================================================================

/// One order line for display.
#[derive(Clone)]
pub struct OrderLineView {
    pub name: String,
    pub quantity: u32,
    pub line_total: String,
}

/// Shipment details, only rendered for the owner.
#[derive(Clone)]
pub struct ShipmentView {
    pub courier: Option<String>,
    pub tracking_number: Option<String>,
    pub address: Option<String>,
    pub customer_name: Option<String>,
}

/// Tracked order display data.
#[derive(Clone)]
pub struct TrackedOrderView {
    pub order_number: String,
    pub status_label: String,
    pub is_expired: bool,
    pub is_owner: bool,
    pub can_retry: bool,
    pub items: Vec<OrderLineView>,
    pub subtotal: String,
    pub shipping: String,
    pub total: String,
    pub date: Option<String>,
    pub shipment: Option<ShipmentView>,
}

impl From<&TrackedOrder> for TrackedOrderView {
    fn from(order: &TrackedOrder) -> Self {
        Self {
            order_number: order.order_number.clone(),
            status_label: order.status.display_name().to_string(),
            is_expired: order.is_expired,
            is_owner: order.is_owner,
            can_retry: order.can_retry(),
            items: order
                .items
                .iter()
                .map(|line| OrderLineView {
                    name: line.name.clone(),
                    quantity: line.quantity,
                    line_total: line.price.times(line.quantity).format_clp(),
                })
                .collect(),
            subtotal: order.subtotal().format_clp(),
            shipping: order.shipping_portion().format_clp(),
            total: order.total.format_clp(),
            date: order.date.clone(),
            shipment: order.shipment.as_ref().map(|s| ShipmentView {
                courier: s.courier.clone(),
                tracking_number: s.tracking_number.clone(),
                address: s.address.clone(),
                customer_name: s.customer_name.clone(),
            }),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Tracking page template.
#[derive(Template, WebTemplate)]
#[template(path = "track/show.html")]
pub struct TrackTemplate {
    /// The submitted code, echoed back into the input.
    pub code: String,
    /// The tracked order, when the lookup succeeded.
    pub result: Option<TrackedOrderView>,
    /// Lookup failure message; never set together with `result`.
    pub error: Option<String>,
    /// Retry failure message, rendered alongside the (re-tracked)
    /// order.
    pub retry_error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Look up an order by code and render the result.
///
/// When a session identity exists, the bearer credential rides along so
/// the backend can recognize the owner and include shipment details.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<TrackQuery>,
) -> Response {
    let Some(code) = query
        .code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
    else {
        return TrackTemplate {
            code: String::new(),
            result: None,
            error: None,
            retry_error: None,
        }
        .into_response();
    };

    let (result, error) = match lookup(&state, &session, &user, code).await {
        Ok(order) => (Some(TrackedOrderView::from(&order)), None),
        Err(BackendError::NotFound(_)) => (None, Some(NOT_FOUND_MSG.to_string())),
        Err(e) => {
            tracing::warn!("Order lookup failed: {e}");
            (None, Some(LOOKUP_FAILED_MSG.to_string()))
        }
    };

    TrackTemplate {
        code: code.to_owned(),
        result,
        error,
        retry_error: None,
    }
    .into_response()
}

/// Retry payment for a pending order.
///
/// The order is re-tracked first and the retry is refused unless it is
/// owned, still pending, and not expired - whatever the page that
/// posted the form believed.
#[instrument(skip(state, session))]
pub async fn retry(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<RetryForm>,
) -> Response {
    let code = form.code.trim();
    if code.is_empty() {
        return Redirect::to("/envios").into_response();
    }

    let order = match lookup(&state, &session, &user, code).await {
        Ok(order) => order,
        Err(BackendError::NotFound(_)) => {
            return render_retry_failure(code, None, NOT_FOUND_MSG);
        }
        Err(e) => {
            tracing::warn!("Order lookup failed before retry: {e}");
            return render_retry_failure(code, None, LOOKUP_FAILED_MSG);
        }
    };

    if !order.can_retry() {
        return render_retry_failure(
            code,
            Some(&order),
            "Este pedido ya no admite reintentos de pago.",
        );
    }

    let email = order
        .email
        .clone()
        .or_else(|| user.as_ref().map(|u| u.email.to_string()));
    let Some(email) = email else {
        return render_retry_failure(code, Some(&order), RETRY_FAILED_MSG);
    };

    match state.backend().retry_payment(order.id, &email).await {
        Ok(redirect) => Redirect::to(&redirect.url).into_response(),
        Err(BackendError::Status { message, .. }) if !message.is_empty() => {
            render_retry_failure(code, Some(&order), &message)
        }
        Err(e) => {
            tracing::error!("Payment retry failed: {e}");
            render_retry_failure(code, Some(&order), RETRY_FAILED_MSG)
        }
    }
}

async fn lookup(
    state: &AppState,
    session: &Session,
    user: &Option<CurrentUser>,
    code: &str,
) -> Result<TrackedOrder, BackendError> {
    // Attach the credential only when an identity was restored; an
    // expired token has already been cleared by the extractor.
    let bearer = if user.is_some() {
        access_token(session).await
    } else {
        None
    };

    state.backend().track_order(code, bearer.as_deref()).await
}

fn render_retry_failure(code: &str, order: Option<&TrackedOrder>, message: &str) -> Response {
    TrackTemplate {
        code: code.to_owned(),
        result: order.map(TrackedOrderView::from),
        error: order.is_none().then(|| message.to_string()),
        retry_error: order.is_some().then(|| message.to_string()),
    }
    .into_response()
}
