use super::common::*;
use crate::{RocksDBConfig, WalletBackend, WalletStorage, ALL_COLUMNS, META_COLUMN, SETTINGS_COLUMN};
use serde_json::{json, Value};

#[test]
fn test_open_db() {
    let backend = temp_db::rocksdb();
    for column in ALL_COLUMNS {
        assert!(backend.keys(*column).unwrap().is_empty(), "{column} should start empty");
    }
    assert_eq!(backend.get_stored_version().unwrap(), None);
}

#[test]
fn test_reopen_keeps_version_and_data() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    {
        let backend = WalletBackend::open_rocksdb(temp_dir.path(), &RocksDBConfig::default()).unwrap();
        backend.write_stored_version("1.0.3-01").unwrap();
        backend.put_json(SETTINGS_COLUMN, "general", &json!({ "timeAutoLock": 15 })).unwrap();
    }
    let backend = WalletBackend::open_rocksdb(temp_dir.path(), &RocksDBConfig::default()).unwrap();
    assert_eq!(backend.get_stored_version().unwrap().as_deref(), Some("1.0.3-01"));
    assert_eq!(backend.get_json::<Value>(SETTINGS_COLUMN, "general").unwrap(), Some(json!({ "timeAutoLock": 15 })));
}

#[test]
fn test_invalid_version_record() {
    let backend = temp_db::in_memory();
    backend.storage().put(META_COLUMN, crate::APP_VERSION_KEY.as_bytes(), &[0xff, 0xfe]).unwrap();
    assert!(matches!(backend.get_stored_version(), Err(crate::WalletStorageError::InvalidVersionRecord(_))));
}

#[test]
fn test_clear_column_counts_entries() {
    let backend = temp_db::rocksdb();
    backend.put_json(SETTINGS_COLUMN, "a", &1).unwrap();
    backend.put_json(SETTINGS_COLUMN, "b", &2).unwrap();
    assert_eq!(backend.clear_column(SETTINGS_COLUMN).unwrap(), 2);
    assert_eq!(backend.clear_column(SETTINGS_COLUMN).unwrap(), 0);
}
