//! Integration tests for Ethereal Cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ethereal-cart-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `catalog_api` - Product and category endpoints
//! - `cart_api` - Cart endpoints, totals and persistence
//!
//! Requests are sent straight into the router with `tower::ServiceExt::oneshot`;
//! no socket is bound.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

use ethereal_cart_storefront::config::StorefrontConfig;
use ethereal_cart_storefront::routes;
use ethereal_cart_storefront::services::Catalog;
use ethereal_cart_storefront::services::cart::repository::{
    CartRepository, KeyValueCartRepository,
};
use ethereal_cart_storefront::services::cart::store::{KeyValueStore, MemoryStore};
use ethereal_cart_storefront::state::AppState;

/// Largest response body the helpers will buffer.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// A storefront app over the embedded catalog.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub text: String,
    /// Parsed JSON body, `Value::Null` when the body is not JSON
    pub body: Value,
}

impl TestApp {
    /// App with an in-memory cart store.
    ///
    /// # Panics
    ///
    /// Panics if the embedded catalog is invalid.
    #[must_use]
    pub fn in_memory() -> (Self, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (Self::with_store(store.clone()), store)
    }

    /// App with the cart persisted in `store`.
    ///
    /// # Panics
    ///
    /// Panics if the embedded catalog is invalid.
    #[must_use]
    pub fn with_store(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_repository(Arc::new(KeyValueCartRepository::new(store)))
    }

    /// App with a custom cart repository.
    ///
    /// # Panics
    ///
    /// Panics if the embedded catalog is invalid.
    #[must_use]
    pub fn with_repository(repository: Arc<dyn CartRepository>) -> Self {
        #[allow(clippy::expect_used)]
        let catalog = Catalog::embedded().expect("embedded catalog is valid");
        let state = AppState::new(&StorefrontConfig::default(), Arc::new(catalog), repository);
        Self {
            router: routes::app(state.clone()),
            state,
        }
    }

    /// Send a GET request.
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    /// Send a POST request with a JSON body.
    pub async fn post(&self, uri: &str, body: &Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    /// Send a request and buffer the response.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    #[allow(clippy::expect_used)]
    pub async fn send(&self, method: Method, uri: &str, body: Option<&Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), MAX_BODY_BYTES)
            .await
            .expect("readable body");
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            text,
            body,
        }
    }
}

impl TestResponse {
    /// Product ids of a product listing body, in order.
    #[must_use]
    pub fn product_ids(&self) -> Vec<String> {
        self.body["products"]
            .as_array()
            .map(|products| {
                products
                    .iter()
                    .filter_map(|p| p["id"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Parse a decimal serialized as a JSON string or number.
///
/// # Panics
///
/// Panics if `value` is not a decimal.
#[must_use]
#[allow(clippy::expect_used)]
pub fn dec(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("decimal number"),
        other => panic!("expected a decimal, got {other}"),
    }
}
