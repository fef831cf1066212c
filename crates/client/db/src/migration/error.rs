use crate::WalletStorageError;

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Application version must not be empty")]
    EmptyAppVersion,

    #[error("Invalid migration registry: {0}")]
    InvalidRegistry(String),

    #[error("A migration run is already in progress")]
    MigrationInProgress,

    #[error("Migration job #{index} '{name}' (version {version}) failed: {message}")]
    JobExecution { index: usize, version: String, name: String, message: String },

    #[error("Version record error: {0}")]
    Storage(#[from] WalletStorageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MigrationError::JobExecution {
            index: 1,
            version: "1.0.1-20".into(),
            name: "RenameStakingChainField".into(),
            message: "boom".into(),
        };
        assert_eq!(
            err.to_string(),
            "Migration job #1 'RenameStakingChainField' (version 1.0.1-20) failed: boom"
        );

        let err = MigrationError::from(WalletStorageError::Unavailable("disk gone".into()));
        assert!(err.to_string().contains("disk gone"));
    }
}
