//! 1.0.3-01: auto-lock becomes a timeout, and history entries carry an explicit status.

use crate::migration::{MigrationContext, MigrationJob, MigrationProgress};
use crate::{SETTINGS_COLUMN, TRANSACTIONS_COLUMN};
use anyhow::{bail, Context};
use serde_json::{Map, Value};

pub const GENERAL_SETTINGS_KEY: &str = "general";
/// Minutes of inactivity before locking, for wallets that had auto-lock enabled.
pub const DEFAULT_AUTO_LOCK_MINUTES: u64 = 15;
pub const DEFAULT_TRANSACTION_STATUS: &str = "completed";

#[derive(Debug)]
pub struct MigrateAutoLockSetting {
    ctx: MigrationContext,
}

impl MigrateAutoLockSetting {
    pub fn new(ctx: MigrationContext) -> Self {
        Self { ctx }
    }
}

#[async_trait::async_trait]
impl MigrationJob for MigrateAutoLockSetting {
    async fn run(&mut self) -> anyhow::Result<()> {
        let Some(mut settings) =
            self.ctx.get_json::<Map<String, Value>>(SETTINGS_COLUMN, GENERAL_SETTINGS_KEY).context("Reading general settings")?
        else {
            tracing::debug!("No general settings stored, nothing to migrate");
            return Ok(());
        };

        let Some(auto_lock) = settings.remove("autoLock") else {
            return Ok(());
        };
        let enabled = match auto_lock {
            Value::Bool(enabled) => enabled,
            Value::Null => false,
            other => bail!("Unexpected autoLock setting: {other}"),
        };
        settings
            .entry("timeAutoLock")
            .or_insert_with(|| if enabled { Value::from(DEFAULT_AUTO_LOCK_MINUTES) } else { Value::Null });

        self.ctx.put_json(SETTINGS_COLUMN, GENERAL_SETTINGS_KEY, &settings).context("Writing general settings")?;
        Ok(())
    }
}

#[derive(Debug)]
pub struct BackfillTransactionStatus {
    ctx: MigrationContext,
}

impl BackfillTransactionStatus {
    pub fn new(ctx: MigrationContext) -> Self {
        Self { ctx }
    }
}

#[async_trait::async_trait]
impl MigrationJob for BackfillTransactionStatus {
    async fn run(&mut self) -> anyhow::Result<()> {
        let entries: Vec<(String, Value)> = self.ctx.json_entries(TRANSACTIONS_COLUMN).context("Reading history")?;
        let total = entries.len();

        for (i, (key, mut entry)) in entries.into_iter().enumerate() {
            let Some(fields) = entry.as_object_mut() else {
                tracing::warn!("Skipping malformed history entry {key}");
                continue;
            };
            if fields.contains_key("status") {
                continue;
            }
            fields.insert("status".into(), Value::from(DEFAULT_TRANSACTION_STATUS));
            self.ctx.put_json(TRANSACTIONS_COLUMN, &key, &entry).with_context(|| format!("Updating history entry {key}"))?;

            if (i + 1) % 1000 == 0 {
                self.ctx.report_progress(MigrationProgress::new(i + 1, total, "history entries"));
            }
        }
        self.ctx.report_progress(MigrationProgress::new(total, total, "history entries"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WalletBackend;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!({ "autoLock": true, "language": "en" }), json!({ "timeAutoLock": 15, "language": "en" }))]
    #[case(json!({ "autoLock": false }), json!({ "timeAutoLock": null }))]
    #[case(json!({ "autoLock": true, "timeAutoLock": 5 }), json!({ "timeAutoLock": 5 }))]
    #[case(json!({ "timeAutoLock": 30 }), json!({ "timeAutoLock": 30 }))]
    #[tokio::test]
    async fn test_auto_lock_setting(#[case] before: Value, #[case] after: Value) {
        let backend = WalletBackend::open_in_memory();
        backend.put_json(SETTINGS_COLUMN, GENERAL_SETTINGS_KEY, &before).unwrap();

        let mut job = MigrateAutoLockSetting::new(MigrationContext::new(backend.clone()));
        job.run().await.unwrap();
        job.run().await.unwrap();

        assert_eq!(backend.get_json::<Value>(SETTINGS_COLUMN, GENERAL_SETTINGS_KEY).unwrap(), Some(after));
    }

    #[tokio::test]
    async fn test_auto_lock_without_settings() {
        let backend = WalletBackend::open_in_memory();
        MigrateAutoLockSetting::new(MigrationContext::new(backend.clone())).run().await.unwrap();
        assert_eq!(backend.get_json::<Value>(SETTINGS_COLUMN, GENERAL_SETTINGS_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_auto_lock_rejects_unexpected_value() {
        let backend = WalletBackend::open_in_memory();
        backend.put_json(SETTINGS_COLUMN, GENERAL_SETTINGS_KEY, &json!({ "autoLock": "yes" })).unwrap();
        assert!(MigrateAutoLockSetting::new(MigrationContext::new(backend)).run().await.is_err());
    }

    #[tokio::test]
    async fn test_backfill_transaction_status() {
        let backend = WalletBackend::open_in_memory();
        backend.put_json(TRANSACTIONS_COLUMN, "0x01", &json!({ "amount": "1" })).unwrap();
        backend.put_json(TRANSACTIONS_COLUMN, "0x02", &json!({ "amount": "2", "status": "failed" })).unwrap();

        let mut job = BackfillTransactionStatus::new(MigrationContext::new(backend.clone()));
        job.run().await.unwrap();
        job.run().await.unwrap();

        let entries: Vec<(String, Value)> = backend.json_entries(TRANSACTIONS_COLUMN).unwrap();
        assert_eq!(
            entries,
            vec![
                ("0x01".to_string(), json!({ "amount": "1", "status": "completed" })),
                ("0x02".to_string(), json!({ "amount": "2", "status": "failed" })),
            ]
        );
    }
}
