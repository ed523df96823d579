//! Integration tests for the cart and checkout guards.
//!
//! These tests require:
//! - A running backend API (`BACKEND_API_URL`)
//! - The storefront running (cargo run -p policromica-storefront)
//! - At least one in-stock product in the catalog
//!
//! Run with: cargo test -p policromica-integration-tests -- --ignored

use reqwest::{Client, StatusCode};

/// Base URL for the storefront (configurable via environment).
fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A client that holds the session cookie across requests; without it
/// every request would see a fresh, empty cart.
fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Find a product id to exercise the cart with, scraped from the home
/// page's add-to-cart buttons.
async fn any_product_id(client: &Client) -> i64 {
    let base_url = storefront_base_url();
    let body = client
        .get(format!("{base_url}/"))
        .send()
        .await
        .expect("Failed to load home page")
        .text()
        .await
        .expect("Failed to read home page");

    body.split("\"product_id\": ")
        .nth(1)
        .and_then(|rest| rest.split(['}', ',']).next())
        .and_then(|id| id.trim().parse().ok())
        .expect("Home page should offer at least one product")
}

#[tokio::test]
#[ignore = "Requires running storefront and backend API"]
async fn test_cart_badge_counts_additions() {
    let client = session_client();
    let base_url = storefront_base_url();
    let product_id = any_product_id(&client).await;

    // Empty cart renders no badge
    let badge = client
        .get(format!("{base_url}/carro/badge"))
        .send()
        .await
        .expect("Failed to get badge")
        .text()
        .await
        .expect("Failed to read badge");
    assert!(!badge.contains("cart-count"));

    // Add the same product twice: 1 + 2 units
    for quantity in [1, 2] {
        let resp = client
            .post(format!("{base_url}/carro/agregar"))
            .form(&[
                ("product_id", product_id.to_string()),
                ("quantity", quantity.to_string()),
            ])
            .send()
            .await
            .expect("Failed to add to cart");
        assert_eq!(resp.status(), StatusCode::OK);
    }

    // One line, three units
    let badge = client
        .get(format!("{base_url}/carro/badge"))
        .send()
        .await
        .expect("Failed to get badge")
        .text()
        .await
        .expect("Failed to read badge");
    assert!(badge.contains('3'), "badge should count 3 units: {badge}");
}

#[tokio::test]
#[ignore = "Requires running storefront and backend API"]
async fn test_quantity_to_zero_removes_line() {
    let client = session_client();
    let base_url = storefront_base_url();
    let product_id = any_product_id(&client).await;

    client
        .post(format!("{base_url}/carro/agregar"))
        .form(&[("product_id", product_id.to_string())])
        .send()
        .await
        .expect("Failed to add to cart");

    let panel = client
        .post(format!("{base_url}/carro/actualizar"))
        .form(&[
            ("product_id", product_id.to_string()),
            ("delta", "-1".to_string()),
        ])
        .send()
        .await
        .expect("Failed to update cart")
        .text()
        .await
        .expect("Failed to read panel");

    assert!(
        panel.contains("Tu carrito está vacío"),
        "decrementing the only unit should empty the cart: {panel}"
    );
}

#[tokio::test]
#[ignore = "Requires running storefront and backend API"]
async fn test_checkout_with_empty_cart_short_circuits() {
    let client = session_client();
    let base_url = storefront_base_url();

    let body = client
        .get(format!("{base_url}/checkout"))
        .send()
        .await
        .expect("Failed to load checkout")
        .text()
        .await
        .expect("Failed to read checkout");

    assert!(body.contains("Tu carrito está vacío"));
}

#[tokio::test]
#[ignore = "Requires running storefront and backend API"]
async fn test_shipping_quote_gates_submission() {
    let client = session_client();
    let base_url = storefront_base_url();
    let product_id = any_product_id(&client).await;

    client
        .post(format!("{base_url}/carro/agregar"))
        .form(&[("product_id", product_id.to_string())])
        .send()
        .await
        .expect("Failed to add to cart");

    // No region: quote fragment keeps the submit disabled
    let fragment = client
        .get(format!("{base_url}/checkout/envio"))
        .send()
        .await
        .expect("Failed to get quote")
        .text()
        .await
        .expect("Failed to read quote");
    assert!(fragment.contains("disabled"));
    assert!(fragment.contains("Por calcular"));

    // A resolved region enables it and prices the fee
    let fragment = client
        .get(format!(
            "{base_url}/checkout/envio?region=Regi%C3%B3n%20Metropolitana"
        ))
        .send()
        .await
        .expect("Failed to get quote")
        .text()
        .await
        .expect("Failed to read quote");
    assert!(!fragment.contains("disabled"));
    assert!(fragment.contains("$4.300"));
}

#[tokio::test]
#[ignore = "Requires running storefront and backend API"]
async fn test_confirmation_clears_cart() {
    let client = session_client();
    let base_url = storefront_base_url();
    let product_id = any_product_id(&client).await;

    client
        .post(format!("{base_url}/carro/agregar"))
        .form(&[("product_id", product_id.to_string())])
        .send()
        .await
        .expect("Failed to add to cart");

    let body = client
        .get(format!("{base_url}/compra-exitosa?orden=POLI-15"))
        .send()
        .await
        .expect("Failed to load confirmation")
        .text()
        .await
        .expect("Failed to read confirmation");
    assert!(body.contains("POLI-15"));

    let badge = client
        .get(format!("{base_url}/carro/badge"))
        .send()
        .await
        .expect("Failed to get badge")
        .text()
        .await
        .expect("Failed to read badge");
    assert!(
        !badge.contains("cart-count"),
        "confirmation view must clear the cart: {badge}"
    );
}
