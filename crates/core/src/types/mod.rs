//! Core types for Policrómica.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod email;
pub mod id;
pub mod money;
pub mod shipping;
pub mod status;

pub use cart::{Cart, CartItem, CartProduct};
pub use email::{Email, EmailError};
pub use id::*;
pub use money::{Money, MoneyError};
pub use shipping::{ShippingRegion, Zone, quote, regions};
pub use status::OrderStatus;
