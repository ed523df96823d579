//! Domain types for the backend API.
//!
//! These types mirror the JSON the backend emits, normalized at the
//! deserialization boundary: every price becomes a [`Money`] no matter
//! whether the wire carried a number or a formatted string.

use serde::{Deserialize, Serialize};

use policromica_core::{Money, OrderId, OrderStatus, ProductId};

// =============================================================================
// Catalog Types
// =============================================================================

/// A product from `GET /api/products/`.
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    /// Catalog key.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price in whole pesos.
    pub price: Money,
    /// Units in stock; 0 disables add-to-cart.
    #[serde(default)]
    pub stock: i64,
    /// Category label (the backend flattens the relation).
    #[serde(rename = "category__name", default)]
    pub category: Option<String>,
    /// Main image URL, relative to the backend host.
    #[serde(default)]
    pub main_image: Option<String>,
    /// All image URLs.
    #[serde(default)]
    pub all_images: Vec<String>,
    /// Plain-text description.
    #[serde(default)]
    pub description: String,
}

impl Product {
    /// Whether the product can be added to a cart.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// A favorited product from `GET /api/favorites/`.
///
/// Same shape as [`Product`] except the image field is already
/// flattened to `image`.
#[derive(Debug, Clone, Deserialize)]
pub struct FavoriteProduct {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub stock: i64,
    #[serde(rename = "category__name", default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

// =============================================================================
// Auth Types
// =============================================================================

/// Access/refresh pair from `POST /api/token/`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

// =============================================================================
// Profile Types
// =============================================================================

/// Stored shipping/contact profile from `GET /api/profile/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profile {
    /// Single full-name field; split on the first whitespace run when
    /// prefilling the checkout form.
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub telefono: String,
    #[serde(default)]
    pub direccion: String,
    #[serde(default)]
    pub ciudad: String,
}

/// Payload for `POST /api/profile/update/`.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdate {
    pub email: String,
    pub nombre: String,
    pub telefono: String,
    pub direccion: String,
    pub ciudad: String,
}

// =============================================================================
// Payment Types
// =============================================================================

/// Shipping form data sent with a payment request.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentShipping {
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub telefono: String,
    pub direccion: String,
    pub ciudad: String,
    pub region: String,
}

/// One cart line in a payment request.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentLine {
    pub id: ProductId,
    pub quantity: u32,
}

/// Payload for `POST /api/payment/create/`.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentRequest {
    /// Cart total plus shipping, in whole pesos.
    pub amount: Money,
    /// Contact email for the payment provider.
    pub email: String,
    pub shipping: PaymentShipping,
    pub cart: Vec<PaymentLine>,
}

/// Redirect target returned by payment creation and retry.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRedirect {
    pub url: String,
}

// =============================================================================
// Order Types
// =============================================================================

/// One line of a tracked or historical order.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderLine {
    pub name: String,
    pub price: Money,
    pub quantity: u32,
}

/// Shipment details, present only for the order's owner.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Shipment {
    #[serde(default)]
    pub courier: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
}

/// Raw wire shape of `GET /api/track/`.
///
/// The backend signals "no such order" in-band with `success: false`;
/// [`super::BackendClient::track_order`] converts that into an error so
/// callers never see a half-populated order.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackResponse {
    pub success: bool,
    #[serde(default)]
    pub order_id: Option<OrderId>,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    #[serde(default)]
    pub total: Option<Money>,
    #[serde(default)]
    pub is_expired: bool,
    #[serde(default)]
    pub is_owner: bool,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(flatten)]
    pub shipment: Shipment,
}

/// A tracked order: a read-only projection of backend state, alive only
/// for one query/result cycle.
#[derive(Debug, Clone)]
pub struct TrackedOrder {
    pub id: OrderId,
    pub order_number: String,
    pub status: OrderStatus,
    pub items: Vec<OrderLine>,
    /// Authoritative total (items plus whatever shipping the backend
    /// charged).
    pub total: Money,
    /// Set by the backend once a pending order outlives the payment
    /// window.
    pub is_expired: bool,
    /// Whether the requester owns the order; gates shipment details.
    pub is_owner: bool,
    /// Contact email, only present for the owner.
    pub email: Option<String>,
    /// Order date, display-formatted by the backend.
    pub date: Option<String>,
    /// Shipment details, only present for the owner.
    pub shipment: Option<Shipment>,
}

impl TrackedOrder {
    /// Sum of `price x quantity` over the order lines.
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(|i| i.price.times(i.quantity)).sum()
    }

    /// `total - subtotal`, clamped at zero. Presentation only - the
    /// backend's total is the source of truth.
    #[must_use]
    pub fn shipping_portion(&self) -> Money {
        self.total.saturating_sub(self.subtotal())
    }

    /// Whether a payment retry may be offered: owned, still pending,
    /// and not expired.
    #[must_use]
    pub const fn can_retry(&self) -> bool {
        self.is_owner && self.status.is_pending() && !self.is_expired
    }
}

/// A row of `GET /api/orders/` (order history).
#[derive(Debug, Clone, Deserialize)]
pub struct OrderSummary {
    pub order_number: String,
    pub status: OrderStatus,
    pub total: Money,
    #[serde(default)]
    pub date: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_price_accepts_number_and_string() {
        let from_number: Product = serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "Aros Acuarela",
            "price": 6000.0,
            "stock": 4,
            "category__name": "Aros",
            "main_image": "/media/products/aros.jpg",
            "all_images": ["/media/products/aros.jpg"],
            "description": "Hechos a mano"
        }))
        .unwrap();
        assert_eq!(from_number.price, Money::new(6000));
        assert!(from_number.in_stock());

        let from_string: Product = serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "Aros Acuarela",
            "price": "$6.000"
        }))
        .unwrap();
        assert_eq!(from_string.price, Money::new(6000));
        assert!(!from_string.in_stock());
    }

    #[test]
    fn test_track_response_owner_payload() {
        let resp: TrackResponse = serde_json::from_value(serde_json::json!({
            "success": true,
            "order_id": 15,
            "order_number": "POLI-15",
            "status": "pendiente",
            "items": [
                {"name": "Aros Acuarela", "price": 6000, "quantity": 2},
                {"name": "Cortador Estrella", "price": 2000, "quantity": 1}
            ],
            "total": 18300,
            "is_expired": false,
            "is_owner": true,
            "email": "maria@example.cl",
            "date": "2026-08-01",
            "courier": "Starken",
            "tracking_number": "ST-9911",
            "address": "Av. Siempre Viva 742, Santiago",
            "customer_name": "María José"
        }))
        .unwrap();

        assert!(resp.success);
        assert_eq!(resp.order_number.as_deref(), Some("POLI-15"));
        assert_eq!(resp.status, Some(OrderStatus::Pending));
        assert_eq!(resp.shipment.courier.as_deref(), Some("Starken"));
    }

    #[test]
    fn test_track_response_not_found_payload() {
        let resp: TrackResponse = serde_json::from_value(serde_json::json!({
            "success": false
        }))
        .unwrap();

        assert!(!resp.success);
        assert!(resp.order_number.is_none());
        assert!(resp.items.is_empty());
    }

    #[test]
    fn test_tracked_order_derivations() {
        let order = TrackedOrder {
            id: OrderId::new(15),
            order_number: "POLI-15".to_string(),
            status: OrderStatus::Pending,
            items: vec![
                OrderLine {
                    name: "Aros Acuarela".to_string(),
                    price: Money::new(6000),
                    quantity: 2,
                },
                OrderLine {
                    name: "Cortador Estrella".to_string(),
                    price: Money::new(2000),
                    quantity: 1,
                },
            ],
            total: Money::new(18_300),
            is_expired: false,
            is_owner: true,
            email: None,
            date: None,
            shipment: None,
        };

        assert_eq!(order.subtotal(), Money::new(14_000));
        assert_eq!(order.shipping_portion(), Money::new(4300));
        assert!(order.can_retry());
    }

    #[test]
    fn test_backend_total_below_subtotal_clamps_to_zero() {
        let order = TrackedOrder {
            id: OrderId::new(16),
            order_number: "POLI-16".to_string(),
            status: OrderStatus::Paid,
            items: vec![OrderLine {
                name: "Aros Acuarela".to_string(),
                price: Money::new(6000),
                quantity: 1,
            }],
            total: Money::new(5000),
            is_expired: false,
            is_owner: false,
            email: None,
            date: None,
            shipment: None,
        };

        assert_eq!(order.shipping_portion(), Money::zero());
    }

    #[test]
    fn test_retry_gating() {
        let mut order = TrackedOrder {
            id: OrderId::new(15),
            order_number: "POLI-15".to_string(),
            status: OrderStatus::Pending,
            items: vec![],
            total: Money::zero(),
            is_expired: false,
            is_owner: true,
            email: None,
            date: None,
            shipment: None,
        };
        assert!(order.can_retry());

        order.is_expired = true;
        assert!(!order.can_retry());

        order.is_expired = false;
        order.status = OrderStatus::Paid;
        assert!(!order.can_retry());

        order.status = OrderStatus::Pending;
        order.is_owner = false;
        assert!(!order.can_retry());
    }

    #[test]
    fn test_payment_request_wire_shape() {
        let req = PaymentRequest {
            amount: Money::new(14_300),
            email: "maria@example.cl".to_string(),
            shipping: PaymentShipping {
                nombre: "María".to_string(),
                apellido: "José".to_string(),
                email: "maria@example.cl".to_string(),
                telefono: "+56 9 1234 5678".to_string(),
                direccion: "Av. Siempre Viva 742".to_string(),
                ciudad: "Santiago".to_string(),
                region: "Región Metropolitana".to_string(),
            },
            cart: vec![PaymentLine {
                id: ProductId::new(1),
                quantity: 2,
            }],
        };

        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["amount"], 14_300);
        assert_eq!(value["cart"][0]["id"], 1);
        assert_eq!(value["cart"][0]["quantity"], 2);
        assert_eq!(value["shipping"]["region"], "Región Metropolitana");
    }
}
