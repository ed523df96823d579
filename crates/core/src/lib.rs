//! Policrómica Core - Shared types library.
//!
//! This crate provides the domain types shared across the Policrómica
//! components:
//! - `storefront` - Public-facing storefront (axum)
//! - `integration-tests` - End-to-end tests against a running storefront
//!
//! # Architecture
//!
//! The core crate contains only types and pure operations - no I/O, no
//! HTTP clients, no sessions. Everything that talks to the backend API
//! lives in the storefront crate; everything here can be unit tested
//! without a network.
//!
//! # Modules
//!
//! - [`types`] - Money, cart, shipping table, email, IDs, and order status

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
