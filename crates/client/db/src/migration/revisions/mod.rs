//! Wallet data revisions.
//!
//! Files: `revision_X_Y_Z_B.rs` where `X.Y.Z-B` is the application version that introduced the
//! revision (e.g. `revision_1_0_1_20.rs` runs when upgrading past `1.0.1-20`).
//!
//! To add a new revision:
//! 1. Create `revision_X_Y_Z_B.rs` with one type per job implementing [`MigrationJob`], each built
//!    from a [`MigrationContext`](super::MigrationContext)
//! 2. Export the module here
//! 3. Register its jobs in [`default_registry`], under the version key
//!
//! Jobs may run more than once: a run aborted by a later job is retried in full on the next
//! start. They must leave already migrated data untouched.
//!
//! [`MigrationJob`]: super::MigrationJob

use super::{job, MigrationRegistry};

pub mod revision_1_0_1_11;
pub mod revision_1_0_1_20;
pub mod revision_1_0_3_01;

/// Migrations shipped with the wallet.
pub fn default_registry() -> MigrationRegistry {
    MigrationRegistry::new()
        .register("1.0.1-11", job("ClearNftCache", revision_1_0_1_11::ClearNftCache::new))
        .register("1.0.1-20", job("RenameStakingChainField", revision_1_0_1_20::RenameStakingChainField::new))
        .register_all(
            "1.0.3-01",
            vec![
                job("MigrateAutoLockSetting", revision_1_0_3_01::MigrateAutoLockSetting::new),
                job("BackfillTransactionStatus", revision_1_0_3_01::BackfillTransactionStatus::new),
            ],
        )
}
