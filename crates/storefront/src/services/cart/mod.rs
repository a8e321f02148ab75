//! Cart service: the shopper's cart lines over an injected repository.
//!
//! Every mutation runs as load, apply, save under a single writer lock, and
//! the save carries the version that was loaded. Another writer sharing the
//! same storage (a second process, the CLI) that saved in between causes
//! [`CartError::StaleCart`] instead of a silent overwrite.
//!
//! Subscribers receive the full line list after each successful change.

pub mod repository;
pub mod store;
pub mod totals;

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Mutex, watch};
use tracing::instrument;

use ethereal_cart_core::{CartLine, ProductId, total_quantity};

use crate::config::PricingConfig;
use crate::services::catalog::Catalog;
use crate::services::latency::Latency;

use repository::{CartRepository, RepositoryError, StoredCart};
pub use totals::{CartItem, CartView, OrderTotals};

/// Errors returned by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("product not found: {0}")]
    NotFound(ProductId),

    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("cart storage unavailable: {0}")]
    PersistenceUnavailable(#[source] RepositoryError),

    #[error("cart changed concurrently (expected version {expected}, found {found})")]
    StaleCart { expected: u64, found: u64 },
}

impl From<RepositoryError> for CartError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::VersionConflict { expected, found } => {
                Self::StaleCart { expected, found }
            }
            other => Self::PersistenceUnavailable(other),
        }
    }
}

/// The shopper's cart.
pub struct CartService {
    catalog: Arc<Catalog>,
    repository: Arc<dyn CartRepository>,
    pricing: PricingConfig,
    latency: Latency,
    write_lock: Mutex<()>,
    changes: watch::Sender<Vec<CartLine>>,
}

impl std::fmt::Debug for CartService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartService")
            .field("pricing", &self.pricing)
            .field("latency", &self.latency)
            .finish_non_exhaustive()
    }
}

impl CartService {
    /// Create a cart service. Call [`CartService::rehydrate`] once after
    /// construction to publish the persisted cart to subscribers.
    #[must_use]
    pub fn new(
        catalog: Arc<Catalog>,
        repository: Arc<dyn CartRepository>,
        pricing: PricingConfig,
        latency: Latency,
    ) -> Self {
        let (changes, _) = watch::channel(Vec::new());
        Self {
            catalog,
            repository,
            pricing,
            latency,
            write_lock: Mutex::new(()),
            changes,
        }
    }

    /// Load the persisted cart and publish it to subscribers.
    ///
    /// Unreadable storage is logged and leaves the published cart empty.
    pub async fn rehydrate(&self) -> Vec<CartLine> {
        let lines = self.get_cart().await;
        tracing::info!(lines = lines.len(), "Cart rehydrated");
        self.changes.send_replace(lines.clone());
        lines
    }

    /// Receive the line list after each successful mutation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<CartLine>> {
        self.changes.subscribe()
    }

    /// Current cart lines.
    ///
    /// Never fails: unavailable or corrupt storage yields an empty cart.
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Vec<CartLine> {
        self.latency.simulate().await;
        match self.repository.load().await {
            Ok(cart) => cart.lines,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load cart, using empty cart");
                Vec::new()
            }
        }
    }

    /// Add `quantity` of a product, merging into an existing line.
    ///
    /// # Errors
    ///
    /// - [`CartError::NotFound`] if the product is not in the catalog
    /// - [`CartError::InvalidQuantity`] for a zero quantity or a line
    ///   quantity that would overflow
    /// - [`CartError::PersistenceUnavailable`] or [`CartError::StaleCart`]
    ///   if the change could not be saved
    #[instrument(skip(self))]
    pub async fn add_to_cart(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Vec<CartLine>, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(
                "quantity must be at least 1".to_string(),
            ));
        }
        self.ensure_product(product_id)?;

        self.mutate(|lines| {
            match lines.iter_mut().find(|l| &l.product_id == product_id) {
                Some(line) => {
                    line.quantity = line.quantity.checked_add(quantity).ok_or_else(|| {
                        CartError::InvalidQuantity(format!(
                            "line quantity would exceed {}",
                            u32::MAX
                        ))
                    })?;
                }
                None => lines.push(CartLine::new(product_id.clone(), quantity)),
            }
            Ok(true)
        })
        .await
    }

    /// Set a line's quantity. A quantity of zero or less removes the line;
    /// updating a product that is not in the cart is a no-op.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`] for a quantity above `u32::MAX`
    /// - [`CartError::PersistenceUnavailable`] or [`CartError::StaleCart`]
    ///   if the change could not be saved
    #[instrument(skip(self))]
    pub async fn update_cart_item(
        &self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<Vec<CartLine>, CartError> {
        if quantity <= 0 {
            return self.remove_from_cart(product_id).await;
        }
        let quantity = u32::try_from(quantity).map_err(|_| {
            CartError::InvalidQuantity(format!("quantity must not exceed {}", u32::MAX))
        })?;

        self.mutate(|lines| {
            Ok(match lines.iter_mut().find(|l| &l.product_id == product_id) {
                Some(line) if line.quantity != quantity => {
                    line.quantity = quantity;
                    true
                }
                _ => false,
            })
        })
        .await
    }

    /// Remove a product's line. Removing an absent product is a no-op.
    ///
    /// # Errors
    ///
    /// [`CartError::PersistenceUnavailable`] or [`CartError::StaleCart`] if
    /// the change could not be saved.
    #[instrument(skip(self))]
    pub async fn remove_from_cart(&self, product_id: &ProductId) -> Result<Vec<CartLine>, CartError> {
        self.mutate(|lines| {
            let before = lines.len();
            lines.retain(|l| &l.product_id != product_id);
            Ok(lines.len() != before)
        })
        .await
    }

    /// Remove every line.
    ///
    /// # Errors
    ///
    /// [`CartError::PersistenceUnavailable`] or [`CartError::StaleCart`] if
    /// the change could not be saved.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<Vec<CartLine>, CartError> {
        self.mutate(|lines| {
            let changed = !lines.is_empty();
            lines.clear();
            Ok(changed)
        })
        .await
    }

    /// Sum of all line quantities.
    pub async fn item_count(&self) -> u64 {
        total_quantity(&self.get_cart().await)
    }

    /// The cart joined with the catalog, with order totals.
    pub async fn view(&self) -> CartView {
        let lines = self.get_cart().await;
        CartView::build(&lines, &self.catalog, &self.pricing)
    }

    /// Pricing used for order totals.
    #[must_use]
    pub const fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }

    fn ensure_product(&self, product_id: &ProductId) -> Result<(), CartError> {
        if self.catalog.contains(product_id.as_str()) {
            Ok(())
        } else {
            Err(CartError::NotFound(product_id.clone()))
        }
    }

    /// Load, apply `change`, and save if it reports a modification.
    async fn mutate<F>(&self, change: F) -> Result<Vec<CartLine>, CartError>
    where
        F: FnOnce(&mut Vec<CartLine>) -> Result<bool, CartError> + Send,
    {
        let _guard = self.write_lock.lock().await;
        self.latency.simulate().await;

        let mut cart = self.load_for_write().await?;
        if !change(&mut cart.lines)? {
            return Ok(cart.lines);
        }

        let saved = self.repository.save(cart.version, cart.lines).await?;
        tracing::debug!(
            version = saved.version,
            items = total_quantity(&saved.lines),
            "Cart saved"
        );
        self.changes.send_replace(saved.lines.clone());
        Ok(saved.lines)
    }

    /// Corrupt data is replaced by an empty cart; storage failures abort.
    async fn load_for_write(&self) -> Result<StoredCart, CartError> {
        match self.repository.load().await {
            Ok(cart) => Ok(cart),
            Err(RepositoryError::Corrupt(e)) => {
                tracing::warn!(error = %e, "Discarding corrupt cart data");
                Ok(StoredCart::empty())
            }
            Err(e) => Err(e.into()),
        }
    }
}
