//! CLI command implementations.

pub mod cart;
pub mod catalog;

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use ethereal_cart_storefront::config::{ConfigError, StorefrontConfig};
use ethereal_cart_storefront::services::cart::repository::KeyValueCartRepository;
use ethereal_cart_storefront::services::cart::store::FileStore;
use ethereal_cart_storefront::services::{CartError, CartService, Catalog, CatalogError, Latency};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    #[error("Output error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Configuration and catalog shared by every command.
pub struct Context {
    pub config: StorefrontConfig,
    pub catalog: Arc<Catalog>,
}

impl Context {
    /// Load configuration from the environment and the catalog from
    /// `catalog_path`, the configured path, or the embedded document.
    pub async fn load(catalog_path: Option<PathBuf>) -> Result<Self, CommandError> {
        let mut config = StorefrontConfig::from_env()?;
        if catalog_path.is_some() {
            config.catalog_path = catalog_path;
        }

        let catalog = match &config.catalog_path {
            Some(path) => Catalog::load(path).await?,
            None => Catalog::embedded()?,
        };

        Ok(Self {
            config,
            catalog: Arc::new(catalog),
        })
    }

    /// Cart service over the file store in `data_dir`, or the configured
    /// data directory.
    pub fn cart_service(&self, data_dir: Option<PathBuf>) -> CartService {
        let dir = data_dir.unwrap_or_else(|| self.config.data_dir.clone());
        tracing::debug!(dir = %dir.display(), "Opening cart store");

        let repository = Arc::new(KeyValueCartRepository::new(Arc::new(FileStore::new(dir))));
        CartService::new(
            self.catalog.clone(),
            repository,
            self.config.pricing,
            Latency::none(),
        )
    }
}

/// Write a value to stdout as pretty JSON.
#[allow(clippy::print_stdout)]
pub fn print_json<T: Serialize>(value: &T) -> Result<(), CommandError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
