//! HTTP error mapping for the cart API.
//!
//! Handlers return [`Result`]. Every error renders as `{"error": "..."}` with
//! a status derived from the failing layer; server-side failures are also
//! reported to Sentry.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::CartError;

/// Error returned by storefront handlers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Unknown product or category.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Query or body rejected before reaching a service.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Cart(CartError::NotFound(_)) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Cart(CartError::InvalidQuantity(_)) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Cart(CartError::StaleCart { .. }) => StatusCode::CONFLICT,
            Self::Cart(CartError::PersistenceUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Message shown to the client. Storage internals stay in logs.
    fn public_message(&self) -> String {
        match self {
            Self::Cart(CartError::PersistenceUnavailable(_)) => {
                "Cart storage is unavailable".to_string()
            }
            Self::Cart(CartError::StaleCart { .. }) => {
                "Cart was modified elsewhere, please retry".to_string()
            }
            Self::Cart(err) => err.to_string(),
            Self::NotFound(_) | Self::BadRequest(_) => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                status = status.as_u16(),
                sentry_event_id = %event_id,
                "Cart API request failed"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = ErrorBody {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handler result.
pub type Result<T> = std::result::Result<T, AppError>;

/// Record a shopper action so it shows up in the trail of a later Sentry event.
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", &[("product_id", "3")]);
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, &str)]) {
    let breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_owned()),
        message: Some(message.to_owned()),
        level: sentry::Level::Info,
        data: data
            .iter()
            .map(|(k, v)| ((*k).to_owned(), serde_json::Value::from(*v)))
            .collect(),
        ..Default::default()
    };
    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ethereal_cart_core::ProductId;

    use super::*;
    use crate::services::cart::repository::RepositoryError;
    use crate::services::cart::store::StoreError;

    async fn render(err: impl Into<AppError>) -> (StatusCode, String) {
        let response = err.into().into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, body["error"].as_str().unwrap().to_owned())
    }

    #[tokio::test]
    async fn test_unknown_product_is_404() {
        let (status, message) = render(CartError::NotFound(ProductId::new("9"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(message.contains('9'));
    }

    #[tokio::test]
    async fn test_client_errors_are_400() {
        let (status, _) = render(CartError::InvalidQuantity("zero".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, message) = render(AppError::BadRequest("minPrice > maxPrice".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "Bad request: minPrice > maxPrice");
    }

    #[tokio::test]
    async fn test_stale_cart_is_409() {
        let (status, message) = render(CartError::StaleCart {
            expected: 1,
            found: 2,
        })
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(message.contains("retry"));
    }

    #[tokio::test]
    async fn test_storage_failure_hides_details() {
        let err = CartError::PersistenceUnavailable(RepositoryError::Store(StoreError::Unavailable));
        let (status, message) = render(err).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(message, "Cart storage is unavailable");
    }
}
