//! Integration tests for Policrómica.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the backend API, then the storefront
//! cargo run -p policromica-storefront
//!
//! # Run integration tests
//! cargo test -p policromica-integration-tests -- --ignored
//! ```
//!
//! Tests live under `tests/` and are `#[ignore]`d by default: they
//! drive a running storefront (and, transitively, a running backend
//! API) over HTTP with a cookie-holding `reqwest` client, because the
//! cart and credential state live in the session.
//!
//! # Test Categories
//!
//! - `storefront_cart` - Cart and checkout-guard flows
//! - `storefront_tracking` - Order tracking and retry flows
