use crate::{Column, WalletStorageError};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Put { column: Column, key: Vec<u8>, value: Vec<u8> },
    Delete { column: Column, key: Vec<u8> },
}

/// Writes applied atomically by [`WalletStorage::write_batch`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageBatch {
    ops: Vec<BatchOp>,
}

impl StorageBatch {
    pub fn put(&mut self, column: Column, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.ops.push(BatchOp::Put { column, key: key.into(), value: value.into() });
    }

    pub fn delete(&mut self, column: Column, key: impl Into<Vec<u8>>) {
        self.ops.push(BatchOp::Delete { column, key: key.into() });
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }
}

/// Byte-level access to the wallet store.
///
/// Implementations must support every column of [`crate::ALL_COLUMNS`] and return
/// [`WalletStorageError::MissingColumn`] for anything else.
pub trait WalletStorage: Send + Sync + fmt::Debug {
    fn get(&self, column: Column, key: &[u8]) -> Result<Option<Vec<u8>>, WalletStorageError>;
    fn put(&self, column: Column, key: &[u8], value: &[u8]) -> Result<(), WalletStorageError>;
    fn delete(&self, column: Column, key: &[u8]) -> Result<(), WalletStorageError>;
    /// All entries of a column, sorted by key.
    fn entries(&self, column: Column) -> Result<Vec<(Vec<u8>, Vec<u8>)>, WalletStorageError>;
    fn write_batch(&self, batch: StorageBatch) -> Result<(), WalletStorageError>;
    fn flush(&self) -> Result<(), WalletStorageError>;
}

/// The persisted "last fully migrated version" record.
#[async_trait::async_trait]
pub trait VersionStore: Send + Sync {
    async fn get_version(&self) -> Result<Option<String>, WalletStorageError>;
    async fn set_version(&self, version: &str) -> Result<(), WalletStorageError>;
}
