use crate::Column;

#[derive(thiserror::Error, Debug)]
pub enum WalletStorageError {
    #[error("Rocksdb error: {0:#}")]
    RocksDB(#[from] rocksdb::Error),
    #[error("Json codec error at column `{column}` key `{key}`: {source}")]
    Json {
        column: Column,
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Column `{0}` is not initialized")]
    MissingColumn(Column),
    #[error("Non utf-8 key in column `{0}`")]
    InvalidKey(Column),
    #[error("Stored version record is not valid utf-8")]
    InvalidVersionRecord(#[source] std::string::FromUtf8Error),
    #[error("Key `{key}` of column `{column}` is reserved")]
    ReservedKey { column: Column, key: String },
    #[error("Storage lock poisoned")]
    Poisoned,
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl WalletStorageError {
    pub(crate) fn json(column: Column, key: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json { column, key: key.into(), source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SETTINGS_COLUMN;

    #[test]
    fn test_error_display() {
        let err = WalletStorageError::ReservedKey { column: SETTINGS_COLUMN, key: "general".into() };
        assert_eq!(err.to_string(), "Key `general` of column `settings` is reserved");

        let source = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = WalletStorageError::json(SETTINGS_COLUMN, "general", source);
        assert!(err.to_string().starts_with("Json codec error at column `settings` key `general`"));
    }
}
