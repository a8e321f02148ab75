//! Client-scoped key-value storage backends.
//!
//! The cart is persisted as a single JSON value under a fixed key, the same
//! shape a browser's local storage would hold. Two backends are provided:
//!
//! - [`MemoryStore`] - process-local, lost on restart (tests, demos)
//! - [`FileStore`] - one file per key under a data directory, shareable
//!   between processes

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors raised by a [`KeyValueStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("storage unavailable")]
    Unavailable,
}

/// Durable string storage scoped to a single client.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key` only if the stored value still equals
    /// `expected` (`None` meaning absent).
    ///
    /// The comparison and the write happen as one step with respect to every
    /// other writer of the same store. Returns `false`, leaving storage
    /// untouched, when the stored value differs.
    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
    ) -> Result<bool, StoreError>;
}

// =============================================================================
// Memory Store
// =============================================================================

/// In-memory store.
///
/// Can be switched to unavailable to mimic storage that has been disabled
/// by the client (every call then fails with [`StoreError::Unavailable`]).
#[derive(Debug)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty, available store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Toggle availability.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable)
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check_available()?;
        Ok(self.entries.read().get(key).cloned())
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
    ) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut entries = self.entries.write();
        if entries.get(key).map(String::as_str) != expected {
            return Ok(false);
        }
        entries.insert(key.to_owned(), value.to_owned());
        Ok(true)
    }
}

// =============================================================================
// File Store
// =============================================================================

/// File-backed store: each key maps to `<root>/<key>.json`.
///
/// A conditional write holds an exclusive lock on `<root>/<key>.lock` while
/// it reads, compares and replaces the value, so writers in other processes
/// (the storefront and `ec-cli` sharing a data directory) are serialized.
/// New values are written to a uniquely named temporary file which is then
/// renamed over the target; readers never observe a half-written value.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`. The directory is created on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn validate_key(key: &str) -> Result<(), StoreError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if valid {
            Ok(())
        } else {
            Err(StoreError::InvalidKey(key.to_owned()))
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        Self::validate_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }
}

fn read_optional(path: &Path) -> std::io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Blocking half of [`FileStore::compare_and_set`].
fn locked_compare_and_set(
    root: &Path,
    key: &str,
    expected: Option<&str>,
    value: &str,
) -> Result<bool, StoreError> {
    fs::create_dir_all(root)?;

    let lock_file: File = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(root.join(format!("{key}.lock")))?;
    let mut lock = fd_lock::RwLock::new(lock_file);
    let _guard = lock.write()?;

    let path = root.join(format!("{key}.json"));
    if read_optional(&path)?.as_deref() != expected {
        return Ok(false);
    }

    let mut tmp = NamedTempFile::new_in(root)?;
    tmp.write_all(value.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(&path).map_err(|e| e.error)?;
    Ok(true)
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
    ) -> Result<bool, StoreError> {
        Self::validate_key(key)?;

        let root = self.root.clone();
        let key = key.to_owned();
        let expected = expected.map(str::to_owned);
        let value = value.to_owned();

        tokio::task::spawn_blocking(move || {
            locked_compare_and_set(&root, &key, expected.as_deref(), &value)
        })
        .await
        .map_err(|e| StoreError::Io(std::io::Error::other(e)))?
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn test_memory_store_compare_and_set() {
        let store = MemoryStore::new();
        assert_eq!(store.get("cart").await.unwrap(), None);

        assert!(store.compare_and_set("cart", None, "[]").await.unwrap());
        assert_eq!(store.get("cart").await.unwrap().as_deref(), Some("[]"));

        // Stale expectation leaves the value alone
        assert!(!store.compare_and_set("cart", None, "[1]").await.unwrap());
        assert!(!store.compare_and_set("cart", Some("[9]"), "[1]").await.unwrap());
        assert_eq!(store.get("cart").await.unwrap().as_deref(), Some("[]"));

        assert!(store.compare_and_set("cart", Some("[]"), "[1]").await.unwrap());
        assert_eq!(store.get("cart").await.unwrap().as_deref(), Some("[1]"));
    }

    #[tokio::test]
    async fn test_memory_store_unavailable() {
        let store = MemoryStore::new();
        store.set_available(false);
        assert!(matches!(
            store.get("cart").await,
            Err(StoreError::Unavailable)
        ));
        assert!(matches!(
            store.compare_and_set("cart", None, "[]").await,
            Err(StoreError::Unavailable)
        ));

        store.set_available(true);
        assert!(store.get("cart").await.is_ok());
    }

    #[tokio::test]
    async fn test_file_store_compare_and_set() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        assert_eq!(store.get("ethereal-cart").await.unwrap(), None);

        let v1 = r#"{"version":1}"#;
        assert!(store.compare_and_set("ethereal-cart", None, v1).await.unwrap());
        assert_eq!(store.get("ethereal-cart").await.unwrap().as_deref(), Some(v1));
        assert!(dir.path().join("nested/ethereal-cart.json").exists());

        assert!(
            !store
                .compare_and_set("ethereal-cart", None, r#"{"version":9}"#)
                .await
                .unwrap()
        );
        assert_eq!(store.get("ethereal-cart").await.unwrap().as_deref(), Some(v1));

        // Only the value and its lock file are left behind
        let mut names: Vec<_> = fs::read_dir(dir.path().join("nested"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, vec!["ethereal-cart.json", "ethereal-cart.lock"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_file_store_racing_writers_have_one_winner() {
        let dir = tempfile::tempdir().unwrap();

        for round in 0..20 {
            let key = format!("cart-{round}");
            let mut writers = tokio::task::JoinSet::new();
            for writer in 0..8 {
                let store = FileStore::new(dir.path());
                let key = key.clone();
                writers.spawn(async move {
                    store
                        .compare_and_set(&key, None, &format!("writer-{writer}"))
                        .await
                        .unwrap()
                });
            }

            let mut winners = 0;
            while let Some(won) = writers.join_next().await {
                if won.unwrap() {
                    winners += 1;
                }
            }
            assert_eq!(winners, 1, "round {round}");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_memory_store_racing_writers_have_one_winner() {
        let store = Arc::new(MemoryStore::new());
        let mut writers = tokio::task::JoinSet::new();
        for writer in 0..8 {
            let store = store.clone();
            writers.spawn(async move {
                store
                    .compare_and_set("cart", None, &format!("writer-{writer}"))
                    .await
                    .unwrap()
            });
        }

        let mut winners = 0;
        while let Some(won) = writers.join_next().await {
            if won.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_file_store_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        for key in ["../escape", "a/b", "", ".hidden"] {
            assert!(matches!(
                store.compare_and_set(key, None, "x").await,
                Err(StoreError::InvalidKey(_))
            ));
            assert!(matches!(store.get(key).await, Err(StoreError::InvalidKey(_))));
        }
    }
}
