use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use wc_db::{RocksDBConfig, WalletBackend, WalletStorageError};

#[derive(Clone, Debug, clap::Args, Deserialize, Serialize)]
pub struct DbParams {
    /// The path where walletd stores the wallet database.
    #[clap(env = "WALLETD_BASE_PATH", long, default_value = "/tmp/walletd", value_name = "PATH")]
    pub base_path: PathBuf,

    /// Enable rocksdb statistics. This has a small performance cost for every database operation.
    /// Statistics are dumped into the `LOG` file in the rocksdb database directory.
    #[clap(env = "WALLETD_DB_ENABLE_STATISTICS", long)]
    #[serde(default)]
    pub db_enable_statistics: bool,

    /// If not zero, the rocksdb statistics will be dumped into the db LOG file with this frequency.
    /// The argument `--db-enable-statistics` is needed for this argument to have an effect.
    #[clap(env = "WALLETD_DB_STATISTICS_PERIOD_SEC", long, default_value_t = 60)]
    pub db_statistics_period_sec: u32,

    /// Maximum number of files rocksdb keeps open at the same time.
    #[clap(env = "WALLETD_DB_MAX_OPEN_FILES", long, default_value_t = 512)]
    pub db_max_open_files: i32,

    /// Block cache size of the point-lookup columns (settings, meta), in MiB.
    #[clap(env = "WALLETD_DB_POINT_LOOKUP_CACHE_MIB", long, default_value_t = 5)]
    pub db_point_lookup_cache_mib: u64,

    /// Disable the rocksdb write-ahead log. Writes are faster, but a crash may lose the latest ones.
    #[clap(env = "WALLETD_DB_DISABLE_WAL", long)]
    #[serde(default)]
    pub db_disable_wal: bool,
}

impl DbParams {
    pub fn rocksdb_config(&self) -> RocksDBConfig {
        RocksDBConfig {
            enable_statistics: self.db_enable_statistics,
            statistics_period_sec: self.db_statistics_period_sec,
            max_open_files: self.db_max_open_files,
            point_lookup_cache_mib: self.db_point_lookup_cache_mib,
            wal: !self.db_disable_wal,
        }
    }

    /// Open the wallet database. With `read_only`, nothing is created or written: a missing
    /// database reads as an empty store.
    pub fn open_backend(&self, read_only: bool) -> Result<WalletBackend, WalletStorageError> {
        if !read_only {
            return WalletBackend::open_rocksdb(&self.base_path, &self.rocksdb_config());
        }
        if !self.base_path.exists() {
            tracing::info!("💾 No wallet database at {}", self.base_path.display());
            return Ok(WalletBackend::open_in_memory());
        }
        WalletBackend::open_rocksdb_read_only(&self.base_path, &self.rocksdb_config())
    }
}
