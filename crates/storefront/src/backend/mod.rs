//! Backend API client.
//!
//! # Architecture
//!
//! - Plain JSON over `reqwest`; the backend is the source of truth for
//!   catalog, profiles, orders, and payments - no local sync.
//! - The product catalog is cached in-memory via `moka` (5 minute TTL
//!   by default); everything else is fetched per request.
//! - Authenticated reads attach the visitor's bearer credential; the
//!   backend re-validates it on every call. Nothing client-side is a
//!   trust decision.
//!
//! # Example
//!
//! ```rust,ignore
//! use policromica_storefront::backend::BackendClient;
//!
//! let client = BackendClient::new(&config.backend);
//!
//! let products = client.products().await?;
//! let order = client.track_order("POLI-15", None).await?;
//! ```

pub mod types;

pub use types::*;

use std::sync::Arc;

use moka::future::Cache;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

use policromica_core::{OrderId, ProductId};

use crate::config::BackendApiConfig;

/// Errors that can occur when talking to the backend API.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (network unreachable, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Non-2xx response, with the backend's message when it sent one.
    #[error("API error ({status}): {message}")]
    Status {
        /// HTTP status code.
        status: reqwest::StatusCode,
        /// Backend-provided detail, or a generic placeholder.
        message: String,
    },

    /// The backend explicitly reported the resource as missing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A success response was missing a field the caller needs.
    #[error("Incomplete response: missing {0}")]
    Incomplete(&'static str),
}

/// Error body shapes the backend uses (`{"error": ...}` from the app
/// views, `{"detail": ...}` from the token endpoint).
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// Client for the backend API.
///
/// Cheap to clone; all state lives behind an `Arc`.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: String,
    catalog: Cache<String, Arc<Vec<Product>>>,
}

/// Cache key for the full catalog listing.
const CATALOG_CACHE_KEY: &str = "products";

impl BackendClient {
    /// Create a new backend API client.
    #[must_use]
    pub fn new(config: &BackendApiConfig) -> Self {
        let catalog = Cache::builder()
            .max_capacity(8)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        Self {
            inner: Arc::new(BackendClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                catalog,
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Check a response status and extract the backend's error message
    /// from the body on failure.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error.or(b.detail))
            .unwrap_or_else(|| {
                let truncated: String = body.chars().take(200).collect();
                if truncated.is_empty() {
                    format!("HTTP {status}")
                } else {
                    truncated
                }
            });

        Err(BackendError::Status { status, message })
    }

    // =========================================================================
    // Health
    // =========================================================================

    /// Ping the backend root endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or unhealthy.
    pub async fn ping(&self) -> Result<(), BackendError> {
        let response = self.inner.client.get(self.url("/")).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Get the product catalog.
    ///
    /// Cached; the storefront renders every catalog view from this one
    /// listing, exactly as the backend serves it.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, BackendError> {
        if let Some(products) = self.inner.catalog.get(CATALOG_CACHE_KEY).await {
            debug!("Cache hit for catalog");
            return Ok(products);
        }

        let response = self
            .inner
            .client
            .get(self.url("/api/products/"))
            .send()
            .await?;
        let response = Self::check(response).await?;

        let products: Vec<Product> = response.json().await?;
        let products = Arc::new(products);

        self.inner
            .catalog
            .insert(CATALOG_CACHE_KEY.to_string(), Arc::clone(&products))
            .await;

        Ok(products)
    }

    /// Get a single product by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the id is not in the catalog.
    #[instrument(skip(self))]
    pub async fn product(&self, id: ProductId) -> Result<Product, BackendError> {
        self.products()
            .await?
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("product {id}")))
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Obtain an access/refresh pair from credentials.
    ///
    /// # Errors
    ///
    /// Returns `Status` with the backend's message on bad credentials.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn obtain_token(
        &self,
        email: &str,
        password: &str,
    ) -> Result<TokenPair, BackendError> {
        let response = self
            .inner
            .client
            .post(self.url("/api/token/"))
            .json(&serde_json::json!({
                "username": email,
                "password": password,
            }))
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns `Status` carrying the backend's error message (e.g.
    /// email already registered).
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn register(
        &self,
        nombre: &str,
        email: &str,
        password: &str,
    ) -> Result<(), BackendError> {
        let response = self
            .inner
            .client
            .post(self.url("/api/register/"))
            .json(&serde_json::json!({
                "nombre": nombre,
                "email": email,
                "password": password,
            }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// Get the stored shipping/contact profile for an email.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn profile(&self, email: &str) -> Result<Profile, BackendError> {
        let response = self
            .inner
            .client
            .get(self.url("/api/profile/"))
            .query(&[("email", email)])
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// Update the stored shipping/contact profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, update), fields(email = %update.email))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), BackendError> {
        let response = self
            .inner
            .client
            .post(self.url("/api/profile/update/"))
            .json(update)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    // =========================================================================
    // Payments
    // =========================================================================

    /// Create a payment and get the provider redirect URL.
    ///
    /// # Errors
    ///
    /// Returns `Incomplete` if the backend answered without a URL.
    #[instrument(skip(self, request), fields(amount = request.amount.amount()))]
    pub async fn create_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentRedirect, BackendError> {
        let response = self
            .inner
            .client
            .post(self.url("/api/payment/create/"))
            .json(request)
            .send()
            .await?;
        let response = Self::check(response).await?;
        let redirect: PaymentRedirect = response.json().await?;
        if redirect.url.is_empty() {
            return Err(BackendError::Incomplete("url"));
        }
        Ok(redirect)
    }

    /// Retry payment for a pending order.
    ///
    /// # Errors
    ///
    /// Returns `Status` with the backend's message when the order is no
    /// longer retryable.
    #[instrument(skip(self))]
    pub async fn retry_payment(
        &self,
        order_id: OrderId,
        email: &str,
    ) -> Result<PaymentRedirect, BackendError> {
        let response = self
            .inner
            .client
            .post(self.url("/api/payment/retry/"))
            .json(&serde_json::json!({
                "order_id": order_id,
                "email": email,
            }))
            .send()
            .await?;
        let response = Self::check(response).await?;
        let redirect: PaymentRedirect = response.json().await?;
        if redirect.url.is_empty() {
            return Err(BackendError::Incomplete("url"));
        }
        Ok(redirect)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Look up an order by its human-readable code (`POLI-<n>`).
    ///
    /// The bearer credential, when present, lets the backend mark the
    /// requester as the order's owner and include shipment details.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the backend reports no such code, and
    /// `Incomplete` if a success response is missing required fields.
    #[instrument(skip(self, bearer))]
    pub async fn track_order(
        &self,
        code: &str,
        bearer: Option<&str>,
    ) -> Result<TrackedOrder, BackendError> {
        let mut request = self
            .inner
            .client
            .get(self.url("/api/track/"))
            .query(&[("code", code)]);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = Self::check(request.send().await?).await?;
        let raw: TrackResponse = response.json().await?;

        if !raw.success {
            return Err(BackendError::NotFound(format!("order {code}")));
        }

        Ok(TrackedOrder {
            id: raw.order_id.ok_or(BackendError::Incomplete("order_id"))?,
            order_number: raw
                .order_number
                .ok_or(BackendError::Incomplete("order_number"))?,
            status: raw.status.ok_or(BackendError::Incomplete("status"))?,
            items: raw.items,
            total: raw.total.ok_or(BackendError::Incomplete("total"))?,
            is_expired: raw.is_expired,
            is_owner: raw.is_owner,
            email: raw.email,
            date: raw.date,
            shipment: raw.is_owner.then_some(raw.shipment),
        })
    }

    /// Get the order history for an authenticated user.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, bearer))]
    pub async fn orders(
        &self,
        email: &str,
        bearer: &str,
    ) -> Result<Vec<OrderSummary>, BackendError> {
        let response = self
            .inner
            .client
            .get(self.url("/api/orders/"))
            .query(&[("email", email)])
            .bearer_auth(bearer)
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    /// Get the user's favorited products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn favorites(&self, email: &str) -> Result<Vec<FavoriteProduct>, BackendError> {
        let response = self
            .inner
            .client
            .get(self.url("/api/favorites/"))
            .query(&[("email", email)])
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// Toggle a product in the user's favorites.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails; callers roll back
    /// their optimistic local change in that case.
    #[instrument(skip(self))]
    pub async fn toggle_favorite(
        &self,
        email: &str,
        product_id: ProductId,
    ) -> Result<(), BackendError> {
        let response = self
            .inner
            .client
            .post(self.url("/api/favorites/toggle/"))
            .json(&serde_json::json!({
                "email": email,
                "product_id": product_id,
            }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::NotFound("order POLI-99".to_string());
        assert_eq!(err.to_string(), "Not found: order POLI-99");

        let err = BackendError::Incomplete("url");
        assert_eq!(err.to_string(), "Incomplete response: missing url");

        let err = BackendError::Status {
            status: reqwest::StatusCode::UNAUTHORIZED,
            message: "Credenciales inválidas".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API error (401 Unauthorized): Credenciales inválidas"
        );
    }
}
