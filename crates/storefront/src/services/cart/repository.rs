//! Versioned cart persistence.
//!
//! The cart is stored as one JSON document under [`CART_STORAGE_KEY`]:
//!
//! ```json
//! {"version": 3, "updatedAt": "2026-01-01T00:00:00Z",
//!  "lines": [{"productId": "1", "quantity": 2}]}
//! ```
//!
//! A bare array of lines (the unversioned layout) is still accepted on read
//! and treated as version 0. Every successful save bumps the version by one;
//! a save whose expected version does not match the stored one is rejected.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ethereal_cart_core::CartLine;

use super::store::{KeyValueStore, StoreError};

/// Storage key holding the serialized cart.
pub const CART_STORAGE_KEY: &str = "ethereal-cart";

/// Errors raised by a [`CartRepository`].
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("cart storage error: {0}")]
    Store(#[from] StoreError),

    #[error("corrupt cart data: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("stale cart: expected version {expected}, found {found}")]
    VersionConflict { expected: u64, found: u64 },
}

/// A persisted cart snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCart {
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub lines: Vec<CartLine>,
}

impl StoredCart {
    /// A cart that has never been saved.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            version: 0,
            updated_at: None,
            lines: Vec::new(),
        }
    }

    /// Restore the cart invariants on data read from storage: zero-quantity
    /// lines are dropped and duplicate product lines are merged into the
    /// first occurrence.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        let mut merged: Vec<CartLine> = Vec::with_capacity(self.lines.len());
        for line in self.lines.drain(..) {
            if line.quantity == 0 {
                continue;
            }
            match merged.iter_mut().find(|l| l.product_id == line.product_id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
                None => merged.push(line),
            }
        }
        self.lines = merged;
        self
    }
}

/// Accepted on-disk layouts.
#[derive(Deserialize)]
#[serde(untagged)]
enum PersistedCart {
    Versioned(StoredCart),
    Unversioned(Vec<CartLine>),
}

impl From<PersistedCart> for StoredCart {
    fn from(persisted: PersistedCart) -> Self {
        match persisted {
            PersistedCart::Versioned(cart) => cart,
            PersistedCart::Unversioned(lines) => Self {
                version: 0,
                updated_at: None,
                lines,
            },
        }
    }
}

/// Persistence port for the cart.
///
/// Implementations are injected into the cart service once per process.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Load the current cart. A missing cart is an empty version-0 cart.
    async fn load(&self) -> Result<StoredCart, RepositoryError>;

    /// Replace the cart's lines if the stored version equals
    /// `expected_version`, returning the newly stored snapshot.
    async fn save(
        &self,
        expected_version: u64,
        lines: Vec<CartLine>,
    ) -> Result<StoredCart, RepositoryError>;
}

/// [`CartRepository`] over any [`KeyValueStore`].
#[derive(Clone)]
pub struct KeyValueCartRepository {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl std::fmt::Debug for KeyValueCartRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyValueCartRepository")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl KeyValueCartRepository {
    /// Create a repository storing the cart under [`CART_STORAGE_KEY`].
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            key: CART_STORAGE_KEY.to_owned(),
        }
    }

    /// Version of a raw stored value. Corrupt data counts as version 0 so a
    /// fresh cart can replace it.
    fn version_of(&self, raw: Option<&str>) -> u64 {
        let Some(json) = raw else {
            return 0;
        };
        match serde_json::from_str::<PersistedCart>(json) {
            Ok(persisted) => StoredCart::from(persisted).version,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Overwriting corrupt cart data");
                0
            }
        }
    }
}

#[async_trait]
impl CartRepository for KeyValueCartRepository {
    async fn load(&self) -> Result<StoredCart, RepositoryError> {
        let Some(json) = self.store.get(&self.key).await? else {
            return Ok(StoredCart::empty());
        };
        let persisted: PersistedCart = serde_json::from_str(&json)?;
        Ok(StoredCart::from(persisted).normalized())
    }

    async fn save(
        &self,
        expected_version: u64,
        lines: Vec<CartLine>,
    ) -> Result<StoredCart, RepositoryError> {
        let current = self.store.get(&self.key).await?;
        let found = self.version_of(current.as_deref());
        if found != expected_version {
            return Err(RepositoryError::VersionConflict {
                expected: expected_version,
                found,
            });
        }

        let cart = StoredCart {
            version: found + 1,
            updated_at: Some(Utc::now()),
            lines,
        };
        let json = serde_json::to_string(&cart)?;

        // Another writer got in between the read and the write
        if !self
            .store
            .compare_and_set(&self.key, current.as_deref(), &json)
            .await?
        {
            let latest = self.store.get(&self.key).await?;
            return Err(RepositoryError::VersionConflict {
                expected: expected_version,
                found: self.version_of(latest.as_deref()),
            });
        }
        Ok(cart)
    }
}
