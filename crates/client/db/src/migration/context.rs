//! Shared state handed to every migration job.

use crate::{Column, WalletBackend, WalletStorageError, APP_VERSION_KEY, META_COLUMN};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationProgress {
    pub current_step: usize,
    pub total_steps: usize,
    pub message: String,
}

impl MigrationProgress {
    pub fn new(current_step: usize, total_steps: usize, message: impl Into<String>) -> Self {
        debug_assert!(current_step <= total_steps);
        Self { current_step, total_steps, message: message.into() }
    }
}

pub type ProgressCallback = Arc<dyn Fn(MigrationProgress) + Send + Sync>;

/// Capabilities available to migration jobs.
///
/// Jobs can read and rewrite any wallet data, but the stored version record is owned by
/// the runner and cannot be written through the context.
#[derive(Clone)]
pub struct MigrationContext {
    backend: WalletBackend,
    progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for MigrationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationContext")
            .field("backend", &self.backend)
            .field("progress_callback", &self.progress_callback.is_some())
            .finish()
    }
}

impl MigrationContext {
    pub fn new(backend: WalletBackend) -> Self {
        Self { backend, progress_callback: None }
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn get_json<T: DeserializeOwned>(&self, column: Column, key: &str) -> Result<Option<T>, WalletStorageError> {
        self.backend.get_json(column, key)
    }

    pub fn put_json<T: Serialize + ?Sized>(&self, column: Column, key: &str, value: &T) -> Result<(), WalletStorageError> {
        check_writable(column, key)?;
        self.backend.put_json(column, key, value)
    }

    pub fn delete(&self, column: Column, key: &str) -> Result<(), WalletStorageError> {
        check_writable(column, key)?;
        self.backend.delete(column, key)
    }

    pub fn keys(&self, column: Column) -> Result<Vec<String>, WalletStorageError> {
        self.backend.keys(column)
    }

    pub fn json_entries<T: DeserializeOwned>(&self, column: Column) -> Result<Vec<(String, T)>, WalletStorageError> {
        self.backend.json_entries(column)
    }

    pub fn clear_column(&self, column: Column) -> Result<usize, WalletStorageError> {
        if column == META_COLUMN {
            return Err(WalletStorageError::ReservedKey { column, key: APP_VERSION_KEY.into() });
        }
        self.backend.clear_column(column)
    }

    pub fn report_progress(&self, progress: MigrationProgress) {
        if let Some(ref callback) = self.progress_callback {
            callback(progress);
        }
    }
}

fn check_writable(column: Column, key: &str) -> Result<(), WalletStorageError> {
    if column == META_COLUMN && key == APP_VERSION_KEY {
        return Err(WalletStorageError::ReservedKey { column, key: key.into() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SETTINGS_COLUMN;
    use assert_matches::assert_matches;
    use std::sync::Mutex;

    #[test]
    fn test_progress_new() {
        let progress = MigrationProgress::new(5, 10, "Processing items");
        assert_eq!(progress.current_step, 5);
        assert_eq!(progress.total_steps, 10);
        assert_eq!(progress.message, "Processing items");
    }

    #[test]
    fn test_version_record_is_reserved() {
        let ctx = MigrationContext::new(WalletBackend::open_in_memory());
        assert_matches!(
            ctx.put_json(META_COLUMN, APP_VERSION_KEY, "9.9.9"),
            Err(WalletStorageError::ReservedKey { .. })
        );
        assert_matches!(ctx.delete(META_COLUMN, APP_VERSION_KEY), Err(WalletStorageError::ReservedKey { .. }));
        assert_matches!(ctx.clear_column(META_COLUMN), Err(WalletStorageError::ReservedKey { .. }));
        ctx.put_json(META_COLUMN, "OTHER", &1u32).unwrap();
    }

    #[test]
    fn test_progress_callback_receives_reports() {
        let seen = Arc::new(Mutex::new(vec![]));
        let sink = seen.clone();
        let ctx = MigrationContext::new(WalletBackend::open_in_memory())
            .with_progress_callback(Arc::new(move |progress| sink.lock().unwrap().push(progress)));

        ctx.put_json(SETTINGS_COLUMN, "general", &serde_json::json!({ "language": "en" })).unwrap();
        ctx.report_progress(MigrationProgress::new(1, 2, "halfway"));

        assert_eq!(*seen.lock().unwrap(), vec![MigrationProgress::new(1, 2, "halfway")]);
        assert_eq!(
            ctx.get_json::<serde_json::Value>(SETTINGS_COLUMN, "general").unwrap(),
            Some(serde_json::json!({ "language": "en" }))
        );
    }
}
