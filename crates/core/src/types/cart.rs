//! Shopping cart state.
//!
//! The cart is pure data plus pure mutations; persistence is the
//! caller's job. The storefront serializes the whole cart into the
//! visitor's session after every mutation and restores it on the next
//! request, so the serde representation must round-trip exactly.
//!
//! Invariants:
//! - At most one [`CartItem`] per product id. Re-adding a product
//!   increments its quantity instead of duplicating the line.
//! - Every stored quantity is >= 1. A quantity driven to zero or below
//!   removes the line entirely.
//! - Insertion order is preserved.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::money::Money;

/// The product attributes the cart needs when a line is created.
///
/// Display attributes (`name`, `image`) are opaque to the cart; the
/// price must already be normalized to [`Money`] by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartProduct {
    pub id: ProductId,
    pub name: String,
    pub image: Option<String>,
    pub price: Money,
}

/// A single cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// External catalog key.
    pub id: ProductId,
    /// Display name, opaque to the cart.
    pub name: String,
    /// Main image URL, if any.
    pub image: Option<String>,
    /// Unit price in whole pesos.
    pub price: Money,
    /// Always >= 1; a line never exists at quantity 0.
    pub quantity: u32,
}

impl CartItem {
    /// Line total: unit price times quantity.
    #[must_use]
    pub const fn line_total(&self) -> Money {
        self.price.times(self.quantity)
    }
}

/// An ordered collection of cart lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// The cart lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add `quantity` units of a product.
    ///
    /// If a line for the product already exists its quantity is
    /// incremented; otherwise a new line is appended. `quantity` must
    /// be >= 1 - the caller (a form handler defaulting to 1) is
    /// trusted.
    pub fn add(&mut self, product: CartProduct, quantity: u32) {
        debug_assert!(quantity >= 1, "cart lines never hold quantity 0");
        if let Some(item) = self.items.iter_mut().find(|i| i.id == product.id) {
            item.quantity += quantity;
        } else {
            self.items.push(CartItem {
                id: product.id,
                name: product.name,
                image: product.image,
                price: product.price,
                quantity,
            });
        }
    }

    /// Add `delta` (positive or negative) to a line's quantity.
    ///
    /// A resulting quantity <= 0 removes the line. Unknown ids are
    /// ignored.
    pub fn update_quantity(&mut self, id: ProductId, delta: i32) {
        let Some(pos) = self.items.iter().position(|i| i.id == id) else {
            return;
        };
        let item = &mut self.items[pos];
        let updated = i64::from(item.quantity) + i64::from(delta);
        if updated <= 0 {
            self.items.remove(pos);
        } else {
            // Bounded by the u32 it started from plus a form-sized delta.
            item.quantity = u32::try_from(updated).unwrap_or(u32::MAX);
        }
    }

    /// Remove a line unconditionally. Unknown ids are ignored.
    pub fn remove(&mut self, id: ProductId) {
        self.items.retain(|i| i.id != id);
    }

    /// Empty the cart. Used after checkout confirmation.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Total unit count across all lines. Recomputed on every call.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Total price across all lines. Recomputed on every call.
    #[must_use]
    pub fn total_price(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn aros(id: i64, price: i64) -> CartProduct {
        CartProduct {
            id: ProductId::new(id),
            name: format!("Aros Acuarela {id}"),
            image: Some(format!("/media/products/aros-{id}.jpg")),
            price: Money::new(price),
        }
    }

    #[test]
    fn test_re_adding_increments_single_line() {
        let mut cart = Cart::new();
        cart.add(aros(1, 6000), 1);
        cart.add(aros(1, 6000), 2);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_price(), Money::new(18_000));
    }

    #[test]
    fn test_distinct_products_keep_insertion_order() {
        let mut cart = Cart::new();
        cart.add(aros(2, 4500), 1);
        cart.add(aros(1, 6000), 1);
        cart.add(aros(2, 4500), 1);

        let ids: Vec<i64> = cart.items().iter().map(|i| i.id.as_i64()).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_update_quantity_to_zero_removes_line() {
        let mut cart = Cart::new();
        cart.add(aros(1, 5000), 1);
        cart.update_quantity(ProductId::new(1), -1);

        assert!(cart.is_empty());
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_price(), Money::zero());
    }

    #[test]
    fn test_update_quantity_below_zero_removes_line() {
        let mut cart = Cart::new();
        cart.add(aros(1, 5000), 2);
        cart.update_quantity(ProductId::new(1), -5);

        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_unknown_id_is_noop() {
        let mut cart = Cart::new();
        cart.add(aros(1, 5000), 2);
        cart.update_quantity(ProductId::new(99), 1);

        assert_eq!(cart.total_items(), 2);
    }

    #[test]
    fn test_remove_is_unconditional_and_tolerant() {
        let mut cart = Cart::new();
        cart.add(aros(1, 5000), 3);
        cart.remove(ProductId::new(1));
        cart.remove(ProductId::new(1));

        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(aros(1, 5000), 1);
        cart.add(aros(2, 4500), 2);
        cart.clear();

        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals_mixed_lines() {
        let mut cart = Cart::new();
        cart.add(aros(1, 6000), 3);
        cart.add(aros(2, 4500), 1);

        assert_eq!(cart.total_items(), 4);
        assert_eq!(cart.total_price(), Money::new(22_500));
    }

    #[test]
    fn test_serde_reload_roundtrip() {
        let mut cart = Cart::new();
        cart.add(aros(1, 6000), 3);
        cart.add(aros(2, 4500), 1);

        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, cart);
        assert_eq!(restored.total_items(), 4);
        assert_eq!(restored.total_price(), Money::new(22_500));
    }
}
