//! Cart management commands over the file-backed cart store.
//!
//! The storefront reads the same files, so a change made here is visible
//! to the running server on its next cart call.
//!
//! # Usage
//!
//! ```bash
//! ec-cli cart add 1 -q 2
//! ec-cli cart update 1 5
//! ec-cli cart remove 1
//! ec-cli cart --data-dir /var/lib/ethereal-cart show
//! ```

use serde::Serialize;

use ethereal_cart_core::ProductId;
use ethereal_cart_storefront::services::CartService;

use super::{CommandError, print_json};

#[derive(Debug, Serialize)]
struct Count {
    count: u64,
}

/// Print the cart with order totals.
pub async fn show(cart: &CartService) -> Result<(), CommandError> {
    let view = cart.view().await;
    tracing::info!(
        items = view.totals.item_count,
        total = %view.totals.total_price(),
        "Cart loaded"
    );
    print_json(&view)
}

/// Add `quantity` of product `id`.
pub async fn add(cart: &CartService, id: &str, quantity: u32) -> Result<(), CommandError> {
    let lines = cart.add_to_cart(&ProductId::new(id), quantity).await?;
    tracing::info!(product_id = id, quantity, "Added to cart");
    print_json(&lines)
}

/// Set product `id` to `quantity`; zero or less removes it.
pub async fn update(cart: &CartService, id: &str, quantity: i64) -> Result<(), CommandError> {
    let lines = cart.update_cart_item(&ProductId::new(id), quantity).await?;
    print_json(&lines)
}

/// Remove product `id`.
pub async fn remove(cart: &CartService, id: &str) -> Result<(), CommandError> {
    let lines = cart.remove_from_cart(&ProductId::new(id)).await?;
    print_json(&lines)
}

/// Remove every line.
pub async fn clear(cart: &CartService) -> Result<(), CommandError> {
    let lines = cart.clear_cart().await?;
    tracing::info!("Cart cleared");
    print_json(&lines)
}

/// Print the total item count.
pub async fn count(cart: &CartService) -> Result<(), CommandError> {
    print_json(&Count {
        count: cart.item_count().await,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use ethereal_cart_storefront::config::StorefrontConfig;
    use ethereal_cart_storefront::services::Catalog;

    use super::*;
    use crate::commands::Context;

    fn context() -> Context {
        Context {
            config: StorefrontConfig::default(),
            catalog: Arc::new(Catalog::embedded().unwrap()),
        }
    }

    #[tokio::test]
    async fn test_cart_commands_share_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context();

        let cart = ctx.cart_service(Some(dir.path().to_path_buf()));
        add(&cart, "1", 2).await.unwrap();
        update(&cart, "1", 3).await.unwrap();

        let reopened = ctx.cart_service(Some(dir.path().to_path_buf()));
        assert_eq!(reopened.item_count().await, 3);

        clear(&reopened).await.unwrap();
        assert_eq!(cart.item_count().await, 0);
    }

    #[tokio::test]
    async fn test_add_unknown_product_fails() {
        let dir = tempfile::tempdir().unwrap();
        let cart = context().cart_service(Some(dir.path().to_path_buf()));

        let err = add(&cart, "does-not-exist", 1).await.unwrap_err();
        assert!(matches!(err, CommandError::Cart(_)));
    }
}
