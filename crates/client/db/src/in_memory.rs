use crate::storage::{BatchOp, StorageBatch, WalletStorage};
use crate::{Column, WalletStorageError, ALL_COLUMNS};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

type ColumnData = BTreeMap<Vec<u8>, Vec<u8>>;

/// Volatile [`WalletStorage`], mostly useful for tests.
#[derive(Debug)]
pub struct InMemoryStorage {
    columns: RwLock<HashMap<&'static str, ColumnData>>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    pub fn new() -> Self {
        let columns = ALL_COLUMNS.iter().map(|col| (col.rocksdb_name, ColumnData::new())).collect();
        Self { columns: RwLock::new(columns) }
    }

    fn with_column<R>(&self, column: Column, f: impl FnOnce(&ColumnData) -> R) -> Result<R, WalletStorageError> {
        let columns = self.columns.read().map_err(|_| WalletStorageError::Poisoned)?;
        let data = columns.get(column.rocksdb_name).ok_or(WalletStorageError::MissingColumn(column))?;
        Ok(f(data))
    }

    fn with_column_mut<R>(
        &self,
        column: Column,
        f: impl FnOnce(&mut ColumnData) -> R,
    ) -> Result<R, WalletStorageError> {
        let mut columns = self.columns.write().map_err(|_| WalletStorageError::Poisoned)?;
        let data = columns.get_mut(column.rocksdb_name).ok_or(WalletStorageError::MissingColumn(column))?;
        Ok(f(data))
    }
}

impl WalletStorage for InMemoryStorage {
    fn get(&self, column: Column, key: &[u8]) -> Result<Option<Vec<u8>>, WalletStorageError> {
        self.with_column(column, |data| data.get(key).cloned())
    }

    fn put(&self, column: Column, key: &[u8], value: &[u8]) -> Result<(), WalletStorageError> {
        self.with_column_mut(column, |data| {
            data.insert(key.to_vec(), value.to_vec());
        })
    }

    fn delete(&self, column: Column, key: &[u8]) -> Result<(), WalletStorageError> {
        self.with_column_mut(column, |data| {
            data.remove(key);
        })
    }

    fn entries(&self, column: Column) -> Result<Vec<(Vec<u8>, Vec<u8>)>, WalletStorageError> {
        self.with_column(column, |data| data.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    fn write_batch(&self, batch: StorageBatch) -> Result<(), WalletStorageError> {
        let mut columns = self.columns.write().map_err(|_| WalletStorageError::Poisoned)?;
        let ops = batch.into_ops();
        // Reject the whole batch before touching anything.
        for op in &ops {
            let (BatchOp::Put { column, .. } | BatchOp::Delete { column, .. }) = op;
            if !columns.contains_key(column.rocksdb_name) {
                return Err(WalletStorageError::MissingColumn(*column));
            }
        }
        for op in ops {
            match op {
                BatchOp::Put { column, key, value } => {
                    columns.entry(column.rocksdb_name).or_default().insert(key, value);
                }
                BatchOp::Delete { column, key } => {
                    columns.entry(column.rocksdb_name).or_default().remove(&key);
                }
            }
        }
        Ok(())
    }

    fn flush(&self) -> Result<(), WalletStorageError> {
        Ok(())
    }
}
