//! walletd command line.
#![warn(missing_docs)]

mod cli;

use anyhow::Context;
use clap::Parser;
use cli::RunCmd;
use wc_analytics::AnalyticsService;
use wc_db::migration::{MigrationOutcome, MigrationStatus};

const GREET_IMPL_NAME: &str = "walletd";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let run_cmd: RunCmd = RunCmd::parse().into_figment()?.extract().context("Parsing configuration")?;

    let mut analytics = AnalyticsService::new(run_cmd.analytics_params.as_analytics_config());
    analytics.setup().context("Initializing logging")?;

    tracing::info!("👛 {}", GREET_IMPL_NAME);
    tracing::info!("✌️  Version {}", run_cmd.migration_params.app_version());
    tracing::info!("💾 Database: {}", run_cmd.db_params.base_path.display());

    let runner = run_cmd.migration_params.migration_runner().context("Setting up migrations")?;
    let backend = run_cmd
        .db_params
        .open_backend(run_cmd.migration_params.check_migrations)
        .context("Opening wallet database")?;

    if run_cmd.migration_params.check_migrations {
        match runner.check_status(&backend).await.context("Checking migration status")? {
            MigrationStatus::UpToDate { stored } => tracing::info!("✅ Wallet data is up to date ({stored})"),
            MigrationStatus::StoredNewer { stored, app } => {
                tracing::warn!("Wallet data was written by {stored}, which is newer than {app}. Nothing would run.")
            }
            MigrationStatus::MigrationRequired { from, to, versions, job_count } => {
                tracing::info!("🔄 {job_count} migration job(s) would run from {from} to {to}: {}", versions.join(", "))
            }
        }
        return Ok(());
    }

    let outcome = runner.run_migrations(&backend).await.context("Running migrations")?;
    match outcome {
        MigrationOutcome::Aborted(ref abort) if !run_cmd.migration_params.strict_migrations => {
            tracing::warn!(
                "Starting on partially migrated data, migrations from {} will be attempted again on the next start",
                abort.from
            );
        }
        outcome => {
            outcome.into_result().context("Migrating wallet data")?;
        }
    }

    tracing::info!("🏁 Wallet data ready");
    Ok(())
}
