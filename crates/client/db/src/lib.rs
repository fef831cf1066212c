//! walletd database
//!
//! The wallet keeps everything it caches or owns (accounts, settings, chain metadata,
//! balances, NFTs, staking positions, history) in a column-oriented key-value store.
//! Keys are UTF-8 strings and values are JSON documents, except in [`META_COLUMN`]
//! which holds raw single-value records such as the stored application version.
//!
//! [`WalletBackend`] is the entry point. It wraps any [`WalletStorage`]: [`RocksDBStorage`]
//! on disk, or [`InMemoryStorage`] for tests.
//!
//! Every time a new application version starts, [`migration::MigrationRunner`] reshapes the
//! data written by older versions before the rest of the wallet reads it.

use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use std::sync::Arc;

mod column;
mod error;
mod in_memory;
mod storage;

pub mod migration;
pub mod rocksdb;

#[cfg(test)]
mod tests;

pub use column::*;
pub use error::WalletStorageError;
pub use in_memory::InMemoryStorage;
pub use crate::rocksdb::{RocksDBConfig, RocksDBStorage};
pub use storage::{BatchOp, StorageBatch, VersionStore, WalletStorage};

/// Key of the stored application version in [`META_COLUMN`].
pub const APP_VERSION_KEY: &str = "APP_VERSION";

/// walletd database backend.
#[derive(Debug, Clone)]
pub struct WalletBackend {
    db: Arc<dyn WalletStorage>,

    /// Keep the TempDir instance around so that the directory is not deleted until the last backend clone is dropped.
    #[cfg(any(test, feature = "testing"))]
    _temp_dir: Option<Arc<tempfile::TempDir>>,
}

impl WalletBackend {
    pub fn from_storage(db: Arc<dyn WalletStorage>) -> Self {
        Self {
            db,
            #[cfg(any(test, feature = "testing"))]
            _temp_dir: None,
        }
    }

    /// Open the db.
    pub fn open_rocksdb(base_path: &Path, config: &RocksDBConfig) -> Result<Self, WalletStorageError> {
        tracing::info!("💾 Opening wallet database at {}", base_path.display());
        let db = RocksDBStorage::open(base_path, config)?;
        Ok(Self::from_storage(Arc::new(db)))
    }

    /// Open an existing db without writing to it.
    pub fn open_rocksdb_read_only(base_path: &Path, config: &RocksDBConfig) -> Result<Self, WalletStorageError> {
        tracing::info!("💾 Opening wallet database at {} (read-only)", base_path.display());
        let db = RocksDBStorage::open_read_only(base_path, config)?;
        Ok(Self::from_storage(Arc::new(db)))
    }

    pub fn open_in_memory() -> Self {
        Self::from_storage(Arc::new(InMemoryStorage::new()))
    }

    #[cfg(any(test, feature = "testing"))]
    pub fn open_for_testing() -> Self {
        let temp_dir = tempfile::TempDir::with_prefix("walletd-test").expect("Creating temporary directory");
        let mut backend = Self::open_rocksdb(temp_dir.path(), &RocksDBConfig::default()).expect("Opening test database");
        backend._temp_dir = Some(Arc::new(temp_dir));
        backend
    }

    pub fn storage(&self) -> &Arc<dyn WalletStorage> {
        &self.db
    }

    pub fn get_json<T: DeserializeOwned>(&self, column: Column, key: &str) -> Result<Option<T>, WalletStorageError> {
        let Some(bytes) = self.db.get(column, key.as_bytes())? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes).map(Some).map_err(|err| WalletStorageError::json(column, key, err))
    }

    pub fn put_json<T: Serialize + ?Sized>(&self, column: Column, key: &str, value: &T) -> Result<(), WalletStorageError> {
        let bytes = serde_json::to_vec(value).map_err(|err| WalletStorageError::json(column, key, err))?;
        self.db.put(column, key.as_bytes(), &bytes)
    }

    pub fn delete(&self, column: Column, key: &str) -> Result<(), WalletStorageError> {
        self.db.delete(column, key.as_bytes())
    }

    pub fn keys(&self, column: Column) -> Result<Vec<String>, WalletStorageError> {
        self.db
            .entries(column)?
            .into_iter()
            .map(|(key, _)| String::from_utf8(key).map_err(|_| WalletStorageError::InvalidKey(column)))
            .collect()
    }

    /// Decoded entries of a column, sorted by key.
    pub fn json_entries<T: DeserializeOwned>(&self, column: Column) -> Result<Vec<(String, T)>, WalletStorageError> {
        self.db
            .entries(column)?
            .into_iter()
            .map(|(key, value)| {
                let key = String::from_utf8(key).map_err(|_| WalletStorageError::InvalidKey(column))?;
                let value = serde_json::from_slice(&value).map_err(|err| WalletStorageError::json(column, &key, err))?;
                Ok::<_, WalletStorageError>((key, value))
            })
            .collect()
    }

    /// Delete every entry of a column in one batch. Returns the number of deleted entries.
    pub fn clear_column(&self, column: Column) -> Result<usize, WalletStorageError> {
        let mut batch = StorageBatch::default();
        for (key, _) in self.db.entries(column)? {
            batch.delete(column, key);
        }
        let count = batch.len();
        if count > 0 {
            self.db.write_batch(batch)?;
        }
        Ok(count)
    }

    #[tracing::instrument(skip(self))]
    pub fn get_stored_version(&self) -> Result<Option<String>, WalletStorageError> {
        let Some(bytes) = self.db.get(META_COLUMN, APP_VERSION_KEY.as_bytes())? else {
            return Ok(None);
        };
        String::from_utf8(bytes).map(Some).map_err(WalletStorageError::InvalidVersionRecord)
    }

    #[tracing::instrument(skip(self))]
    pub fn write_stored_version(&self, version: &str) -> Result<(), WalletStorageError> {
        self.db.put(META_COLUMN, APP_VERSION_KEY.as_bytes(), version.as_bytes())?;
        self.db.flush()
    }
}

#[async_trait::async_trait]
impl VersionStore for WalletBackend {
    async fn get_version(&self) -> Result<Option<String>, WalletStorageError> {
        self.get_stored_version()
    }

    async fn set_version(&self, version: &str) -> Result<(), WalletStorageError> {
        self.write_stored_version(version)
    }
}
