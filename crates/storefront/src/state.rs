//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::{CartStoreKind, StorefrontConfig};
use crate::services::cart::repository::{CartRepository, KeyValueCartRepository};
use crate::services::cart::store::{FileStore, KeyValueStore, MemoryStore};
use crate::services::{CartService, Catalog, CatalogError, Latency};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// catalog and the cart service.
#[derive(Clone, Debug)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

#[derive(Debug)]
struct AppStateInner {
    catalog: Arc<Catalog>,
    cart: CartService,
    latency: Latency,
}

impl AppState {
    /// Create application state from already constructed parts.
    ///
    /// The cart is not rehydrated; see [`AppState::from_config`].
    #[must_use]
    pub fn new(
        config: &StorefrontConfig,
        catalog: Arc<Catalog>,
        repository: Arc<dyn CartRepository>,
    ) -> Self {
        let latency = Latency::new(config.simulated_latency);
        let cart = CartService::new(catalog.clone(), repository, config.pricing, latency);

        Self {
            inner: Arc::new(AppStateInner {
                catalog,
                cart,
                latency,
            }),
        }
    }

    /// Load the catalog, open the configured cart store and rehydrate the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog file cannot be read or is invalid.
    pub async fn from_config(config: StorefrontConfig) -> Result<Self, CatalogError> {
        let catalog = match &config.catalog_path {
            Some(path) => Catalog::load(path).await?,
            None => Catalog::embedded()?,
        };

        let store: Arc<dyn KeyValueStore> = match config.cart_store {
            CartStoreKind::Memory => Arc::new(MemoryStore::new()),
            CartStoreKind::File => Arc::new(FileStore::new(&config.data_dir)),
        };
        tracing::info!(backend = ?config.cart_store, "Cart store opened");

        let repository = Arc::new(KeyValueCartRepository::new(store));
        let state = Self::new(&config, Arc::new(catalog), repository);
        state.cart().rehydrate().await;
        Ok(state)
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the cart service.
    #[must_use]
    pub fn cart(&self) -> &CartService {
        &self.inner.cart
    }

    /// Delay applied to catalog calls.
    #[must_use]
    pub fn latency(&self) -> Latency {
        self.inner.latency
    }
}
