use crate::storage::{BatchOp, StorageBatch, WalletStorage};
use crate::{Column, WalletStorageError, ALL_COLUMNS};
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, FlushOptions, IteratorMode, MultiThreaded, WriteBatch,
    WriteOptions,
};
use std::{fmt, path::Path, sync::Arc};

mod options;

pub use options::{rocksdb_global_options, RocksDBConfig};

type DB = DBWithThreadMode<MultiThreaded>;

/// [`WalletStorage`] backed by rocksdb, one column family per [`Column`].
pub struct RocksDBStorage {
    db: DB,
    writeopts: WriteOptions,
    config: RocksDBConfig,
    read_only: bool,
}

impl fmt::Debug for RocksDBStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RocksDBStorage")
            .field("path", &self.db.path())
            .field("config", &self.config)
            .field("read_only", &self.read_only)
            .finish()
    }
}

impl Drop for RocksDBStorage {
    fn drop(&mut self) {
        if self.read_only {
            return;
        }
        if let Err(err) = self.flush() {
            tracing::warn!("Error when flushing the database on close: {err:#}");
        }
        self.db.cancel_all_background_work(true);
    }
}

impl RocksDBStorage {
    pub fn open(path: &Path, config: &RocksDBConfig) -> Result<Self, WalletStorageError> {
        let opts = rocksdb_global_options(config);
        tracing::debug!("Opening db at {:?}", path.display());
        let db = DB::open_cf_descriptors(
            &opts,
            path,
            ALL_COLUMNS.iter().map(|col| ColumnFamilyDescriptor::new(col.rocksdb_name, col.rocksdb_options(config))),
        )?;

        let mut writeopts = WriteOptions::new();
        writeopts.disable_wal(!config.wal);
        Ok(Self { db, writeopts, config: config.clone(), read_only: false })
    }

    /// Open an existing database without creating or writing anything. Writes fail.
    pub fn open_read_only(path: &Path, config: &RocksDBConfig) -> Result<Self, WalletStorageError> {
        let mut opts = rocksdb_global_options(config);
        opts.create_if_missing(false);
        opts.create_missing_column_families(false);
        tracing::debug!("Opening db read-only at {:?}", path.display());
        let db = DB::open_cf_descriptors_read_only(
            &opts,
            path,
            ALL_COLUMNS.iter().map(|col| ColumnFamilyDescriptor::new(col.rocksdb_name, col.rocksdb_options(config))),
            false,
        )?;
        Ok(Self { db, writeopts: WriteOptions::new(), config: config.clone(), read_only: true })
    }

    fn get_column(&self, column: Column) -> Result<Arc<BoundColumnFamily<'_>>, WalletStorageError> {
        self.db.cf_handle(column.rocksdb_name).ok_or(WalletStorageError::MissingColumn(column))
    }
}

impl WalletStorage for RocksDBStorage {
    #[tracing::instrument(skip(self, key))]
    fn get(&self, column: Column, key: &[u8]) -> Result<Option<Vec<u8>>, WalletStorageError> {
        Ok(self.db.get_cf(&self.get_column(column)?, key)?)
    }

    #[tracing::instrument(skip(self, key, value))]
    fn put(&self, column: Column, key: &[u8], value: &[u8]) -> Result<(), WalletStorageError> {
        self.db.put_cf_opt(&self.get_column(column)?, key, value, &self.writeopts)?;
        Ok(())
    }

    #[tracing::instrument(skip(self, key))]
    fn delete(&self, column: Column, key: &[u8]) -> Result<(), WalletStorageError> {
        self.db.delete_cf_opt(&self.get_column(column)?, key, &self.writeopts)?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn entries(&self, column: Column) -> Result<Vec<(Vec<u8>, Vec<u8>)>, WalletStorageError> {
        let col = self.get_column(column)?;
        let entries = self
            .db
            .iterator_cf(&col, IteratorMode::Start)
            .map(|res| res.map(|(key, value)| (key.into_vec(), value.into_vec())).map_err(Into::into))
            .collect();
        entries
    }

    #[tracing::instrument(skip(self, batch), fields(ops = batch.len()))]
    fn write_batch(&self, batch: StorageBatch) -> Result<(), WalletStorageError> {
        let mut write_batch = WriteBatch::default();
        for op in batch.into_ops() {
            match op {
                BatchOp::Put { column, key, value } => write_batch.put_cf(&self.get_column(column)?, key, value),
                BatchOp::Delete { column, key } => write_batch.delete_cf(&self.get_column(column)?, key),
            }
        }
        self.db.write_opt(write_batch, &self.writeopts)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), WalletStorageError> {
        tracing::debug!("doing a db flush");
        let mut opts = FlushOptions::default();
        opts.set_wait(true);
        // we have to collect twice here :/
        let columns = ALL_COLUMNS.iter().map(|col| self.get_column(*col)).collect::<Result<Vec<_>, _>>()?;
        let columns = columns.iter().collect::<Vec<_>>();

        self.db.flush_cfs_opt(&columns, &opts)?;
        Ok(())
    }
}
