use crate::Column;
use rocksdb::{DBCompressionType, Options};

#[derive(Debug, Clone)]
pub struct RocksDBConfig {
    /// Enable statistics. Statistics will be put in the `LOG` file in the db folder.
    pub enable_statistics: bool,
    /// Dump statistics every `statistics_period_sec`.
    pub statistics_period_sec: u32,
    pub max_open_files: i32,
    /// Block cache size for point-lookup columns, in MiB.
    pub point_lookup_cache_mib: u64,
    /// Write-ahead log. Disabling it trades crash safety for write speed.
    pub wal: bool,
}

impl Default for RocksDBConfig {
    fn default() -> Self {
        Self {
            enable_statistics: false,
            statistics_period_sec: 60,
            max_open_files: 512,
            point_lookup_cache_mib: 5,
            wal: true,
        }
    }
}

pub fn rocksdb_global_options(config: &RocksDBConfig) -> Options {
    let mut options = Options::default();
    options.create_if_missing(true);
    options.create_missing_column_families(true);
    let cores = std::thread::available_parallelism().map(|e| e.get() as i32).unwrap_or(1);
    options.increase_parallelism(cores);

    options.set_atomic_flush(true);
    options.set_max_open_files(config.max_open_files);
    options.set_keep_log_file_num(3);
    options.set_log_level(rocksdb::LogLevel::Warn);

    if config.enable_statistics {
        options.enable_statistics();
    }
    options.set_stats_dump_period_sec(config.statistics_period_sec);

    options
}

impl Column {
    pub(crate) fn rocksdb_options(&self, config: &RocksDBConfig) -> Options {
        let mut options = Options::default();
        options.set_compression_type(DBCompressionType::Zstd);
        if self.point_lookup {
            options.optimize_for_point_lookup(config.point_lookup_cache_mib);
        }
        options
    }
}
