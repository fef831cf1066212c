//! Data migrations between application versions.
//!
//! Every start of the wallet compares the running application version with the version
//! stored in the database by the last complete migration run, and applies the jobs
//! introduced in between:
//!
//! - Version comparison, with a configurable [`VersionOrdering`]
//! - Strictly sequential job execution
//! - The stored version only moves forward once every selected job succeeded
//! - Progress reporting for long-running jobs
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MigrationRunner                            │
//! │  - Compares app version against the stored version              │
//! │  - Selects the registry entries in (stored, app]                │
//! │  - Runs their jobs one after the other                          │
//! │  - Commits the app version, or aborts and leaves it untouched   │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MigrationRegistry                          │
//! │  - Maps version keys to job descriptors                         │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Individual jobs                            │
//! │  - revision_1_0_1_11.rs, revision_1_0_1_20.rs, ...              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed job never prevents the wallet from starting: the run returns
//! [`MigrationOutcome::Aborted`] and the whole remaining batch is attempted again on the next
//! start. Only failures to read or write the version record itself are returned as errors.
//!
//! # Usage
//!
//! ```ignore
//! let backend = WalletBackend::open_rocksdb(path, &RocksDBConfig::default())?;
//! let runner = MigrationRunner::new(env!("CARGO_PKG_VERSION"), default_registry())?;
//! runner.run_migrations(&backend).await?;
//! ```
//!
//! # Adding a New Migration
//!
//! See the documentation in [`revisions`] module for instructions.

mod context;
mod error;
mod registry;
pub mod revisions;

pub use context::{MigrationContext, MigrationProgress, ProgressCallback};
pub use error::MigrationError;
pub use registry::{job, JobDescriptor, JobFactory, Migration, MigrationJob, MigrationRegistry};
pub use revisions::default_registry;

use crate::{VersionStore, WalletBackend};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Mutex};
use wc_analytics::MIGRATION_TARGET;
use wp_version::{AppVersion, VersionOrdering};

/// Where a migration run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationPhase {
    NotStarted,
    Comparing,
    /// Nothing to migrate.
    Idle,
    Running {
        /// Zero-based position in the flattened job list.
        job_index: usize,
        total: usize,
    },
    Committed,
    Aborted,
}

impl MigrationPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Idle | Self::Committed | Self::Aborted)
    }
}

/// Result of checking migration status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationStatus {
    /// The stored version equals the application version.
    UpToDate { stored: AppVersion },

    /// The stored version is ahead of the application version, e.g. after a downgrade.
    /// Nothing runs and the stored version is kept.
    StoredNewer { stored: AppVersion, app: AppVersion },

    MigrationRequired {
        from: AppVersion,
        to: AppVersion,
        /// Registry keys that will run, in order.
        versions: Vec<String>,
        job_count: usize,
    },
}

/// A job that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub index: usize,
    pub version: String,
    pub name: &'static str,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub from: AppVersion,
    pub to: AppVersion,
    pub jobs: Vec<JobRecord>,
}

/// A run stopped by a failing job.
#[derive(Debug)]
pub struct MigrationAbort {
    pub from: AppVersion,
    pub to: AppVersion,
    pub job_index: usize,
    pub version: String,
    pub job_name: &'static str,
    pub error: anyhow::Error,
    /// Jobs that completed before the failure. Their changes are not rolled back.
    pub completed: Vec<JobRecord>,
}

impl MigrationAbort {
    pub fn to_error(&self) -> MigrationError {
        MigrationError::JobExecution {
            index: self.job_index,
            version: self.version.clone(),
            name: self.job_name.into(),
            message: format!("{:#}", self.error),
        }
    }
}

#[derive(Debug)]
pub enum MigrationOutcome {
    /// No job selected and nothing written, the application version is not newer.
    UpToDate,
    Committed(MigrationReport),
    Aborted(MigrationAbort),
}

impl MigrationOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted(_))
    }

    /// Turn an aborted run into an error, for callers that cannot start on partially migrated data.
    pub fn into_result(self) -> Result<Option<MigrationReport>, MigrationError> {
        match self {
            Self::UpToDate => Ok(None),
            Self::Committed(report) => Ok(Some(report)),
            Self::Aborted(abort) => Err(abort.to_error()),
        }
    }
}

/// Main migration orchestrator.
pub struct MigrationRunner {
    app_version: AppVersion,
    registry: MigrationRegistry,
    ordering: VersionOrdering,
    phase: watch::Sender<MigrationPhase>,
    /// Held for the whole duration of a run.
    run_guard: Mutex<()>,
}

impl MigrationRunner {
    pub fn new(app_version: impl Into<String>, registry: MigrationRegistry) -> Result<Self, MigrationError> {
        let app_version = AppVersion::new(app_version).map_err(|_| MigrationError::EmptyAppVersion)?;
        registry.validate()?;
        let (phase, _) = watch::channel(MigrationPhase::NotStarted);
        Ok(Self { app_version, registry, ordering: VersionOrdering::default(), phase, run_guard: Mutex::new(()) })
    }

    pub fn with_ordering(mut self, ordering: VersionOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn app_version(&self) -> &AppVersion {
        &self.app_version
    }

    pub fn ordering(&self) -> VersionOrdering {
        self.ordering
    }

    pub fn registry(&self) -> &MigrationRegistry {
        &self.registry
    }

    pub fn subscribe(&self) -> watch::Receiver<MigrationPhase> {
        self.phase.subscribe()
    }

    pub fn phase(&self) -> MigrationPhase {
        *self.phase.borrow()
    }

    fn set_phase(&self, phase: MigrationPhase) {
        self.phase.send_replace(phase);
    }

    /// Check migration status without running anything.
    pub async fn check_status(&self, store: &dyn VersionStore) -> Result<MigrationStatus, MigrationError> {
        let stored = read_stored_version(store).await?;
        Ok(self.status_for(stored))
    }

    fn status_for(&self, stored: AppVersion) -> MigrationStatus {
        match self.app_version.cmp_with(&stored, self.ordering) {
            std::cmp::Ordering::Equal => MigrationStatus::UpToDate { stored },
            std::cmp::Ordering::Less => MigrationStatus::StoredNewer { stored, app: self.app_version.clone() },
            std::cmp::Ordering::Greater => {
                let selected = self.registry.select(&stored, &self.app_version, self.ordering);
                MigrationStatus::MigrationRequired {
                    versions: selected.iter().map(|m| m.version.clone()).collect(),
                    job_count: selected.iter().map(|m| m.jobs.len()).sum(),
                    from: stored,
                    to: self.app_version.clone(),
                }
            }
        }
    }

    /// Run migrations if needed, against the wallet database.
    pub async fn run_migrations(&self, backend: &WalletBackend) -> Result<MigrationOutcome, MigrationError> {
        let ctx = MigrationContext::new(backend.clone()).with_progress_callback(Arc::new(|progress: MigrationProgress| {
            tracing::info!(
                target: MIGRATION_TARGET,
                "   {}/{} {}",
                progress.current_step,
                progress.total_steps,
                progress.message
            );
        }));
        self.run_with(backend, ctx).await
    }

    /// Run migrations if needed.
    ///
    /// Job failures are not errors: they are logged and returned as [`MigrationOutcome::Aborted`].
    /// Errors are only returned when the version record cannot be read or written, or when
    /// another run is in progress.
    pub async fn run_with(
        &self,
        store: &dyn VersionStore,
        ctx: MigrationContext,
    ) -> Result<MigrationOutcome, MigrationError> {
        let Ok(_guard) = self.run_guard.try_lock() else {
            return Err(MigrationError::MigrationInProgress);
        };

        let res = self.run_inner(store, ctx).await;
        if res.is_err() && !self.phase().is_terminal() {
            self.set_phase(MigrationPhase::NotStarted);
        }
        res
    }

    async fn run_inner(&self, store: &dyn VersionStore, ctx: MigrationContext) -> Result<MigrationOutcome, MigrationError> {
        self.set_phase(MigrationPhase::Comparing);
        let stored = read_stored_version(store).await?;

        let (from, to, versions) = match self.status_for(stored) {
            MigrationStatus::UpToDate { stored } => {
                tracing::debug!("✅ Stored version {stored} matches the application, no migration needed");
                self.set_phase(MigrationPhase::Idle);
                return Ok(MigrationOutcome::UpToDate);
            }
            MigrationStatus::StoredNewer { stored, app } => {
                tracing::debug!("Stored version {stored} is newer than the application version {app}, skipping migrations");
                self.set_phase(MigrationPhase::Idle);
                return Ok(MigrationOutcome::UpToDate);
            }
            MigrationStatus::MigrationRequired { from, to, versions, .. } => (from, to, versions),
        };

        let jobs: Vec<(&str, &JobDescriptor)> = self
            .registry
            .select(&from, &to, self.ordering)
            .into_iter()
            .flat_map(|m| m.jobs.iter().map(move |job| (m.version.as_str(), job)))
            .collect();
        let total = jobs.len();

        tracing::info!(
            "🔄 Migrating wallet data from {from} to {to} ({total} job{}, {} ordering)",
            if total == 1 { "" } else { "s" },
            self.ordering
        );
        tracing::debug!("Selected versions: {versions:?}");

        let run_start = Instant::now();
        let mut completed = Vec::with_capacity(total);

        for (index, (version, descriptor)) in jobs.into_iter().enumerate() {
            self.set_phase(MigrationPhase::Running { job_index: index, total });
            tracing::info!(
                target: MIGRATION_TARGET,
                version,
                job = descriptor.name(),
                "📦 [{}/{}] Running {}",
                index + 1,
                total,
                descriptor.name()
            );

            let started_at = Utc::now();
            let job_start = Instant::now();
            let mut job = descriptor.build(ctx.clone());
            let res = job.run().await;
            drop(job);
            let elapsed = job_start.elapsed();

            if let Err(error) = res {
                tracing::error!(
                    target: MIGRATION_TARGET,
                    version,
                    job = descriptor.name(),
                    error = %format!("{error:#}"),
                    "❌ Migration aborted at job {}/{}, stored version stays at {from}",
                    index + 1,
                    total
                );
                self.set_phase(MigrationPhase::Aborted);
                return Ok(MigrationOutcome::Aborted(MigrationAbort {
                    from,
                    to,
                    job_index: index,
                    version: version.to_owned(),
                    job_name: descriptor.name(),
                    error,
                    completed,
                }));
            }

            tracing::info!(
                target: MIGRATION_TARGET,
                version,
                job = descriptor.name(),
                elapsed = ?elapsed,
                "✅ {} done",
                descriptor.name()
            );
            completed.push(JobRecord {
                index,
                version: version.to_owned(),
                name: descriptor.name(),
                started_at,
                finished_at: Utc::now(),
                elapsed,
            });
        }

        if let Err(err) = store.set_version(to.as_str()).await {
            tracing::error!(
                target: MIGRATION_TARGET,
                "❌ All {total} job(s) ran but the version record could not be updated, stored version stays at {from}: {err:#}"
            );
            self.set_phase(MigrationPhase::Aborted);
            return Err(err.into());
        }
        self.set_phase(MigrationPhase::Committed);
        tracing::info!("🎉 Wallet data migrated to {to} in {:?}", run_start.elapsed());

        Ok(MigrationOutcome::Committed(MigrationReport { from, to, jobs: completed }))
    }
}

async fn read_stored_version(store: &dyn VersionStore) -> Result<AppVersion, MigrationError> {
    let stored = store.get_version().await?;
    // An empty record is treated like a missing one.
    Ok(stored.and_then(|v| AppVersion::new(v).ok()).unwrap_or_else(AppVersion::baseline))
}
