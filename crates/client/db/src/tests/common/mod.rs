use crate::migration::{job, JobDescriptor, MigrationContext, MigrationJob, MigrationProgress, MigrationRegistry};
use crate::{VersionStore, WalletStorageError, STAKING_COLUMN};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub mod temp_db {
    use crate::WalletBackend;

    pub fn in_memory() -> WalletBackend {
        WalletBackend::open_in_memory()
    }

    pub fn rocksdb() -> WalletBackend {
        WalletBackend::open_for_testing()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Start,
    End,
}

#[derive(Debug, Clone)]
pub struct JobEvent {
    pub job: &'static str,
    pub kind: EventKind,
    pub at: Instant,
}

/// Start and end events of every instrumented job, in the order they happened.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<JobEvent>>>);

impl EventLog {
    fn push(&self, job: &'static str, kind: EventKind) {
        self.0.lock().unwrap().push(JobEvent { job, kind, at: Instant::now() });
    }

    pub fn events(&self) -> Vec<JobEvent> {
        self.0.lock().unwrap().clone()
    }

    /// Names of the jobs that started, in order.
    pub fn started(&self) -> Vec<&'static str> {
        self.events().into_iter().filter(|e| e.kind == EventKind::Start).map(|e| e.job).collect()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

/// Records its start and end, sleeps a bit in between, and writes a marker to the staking column.
pub struct RecordingJob {
    ctx: MigrationContext,
    name: &'static str,
    log: EventLog,
    delay: Duration,
    fail: bool,
}

#[async_trait::async_trait]
impl MigrationJob for RecordingJob {
    async fn run(&mut self) -> anyhow::Result<()> {
        self.log.push(self.name, EventKind::Start);
        tokio::time::sleep(self.delay).await;
        self.ctx.report_progress(MigrationProgress::new(1, 1, self.name));
        self.log.push(self.name, EventKind::End);
        if self.fail {
            anyhow::bail!("{} exploded", self.name);
        }
        self.ctx.put_json(STAKING_COLUMN, self.name, &true)?;
        Ok(())
    }
}

pub fn recording(name: &'static str, log: &EventLog) -> JobDescriptor {
    recording_with(name, log, Duration::from_millis(5), false)
}

pub fn failing(name: &'static str, log: &EventLog) -> JobDescriptor {
    recording_with(name, log, Duration::from_millis(5), true)
}

pub fn recording_with(name: &'static str, log: &EventLog, delay: Duration, fail: bool) -> JobDescriptor {
    let log = log.clone();
    job(name, move |ctx| RecordingJob { ctx, name, log: log.clone(), delay, fail })
}

/// `{"1.0.1-11": A, "1.0.1-20": B, "1.0.3-01": C}`
pub fn abc_registry(log: &EventLog) -> MigrationRegistry {
    MigrationRegistry::new()
        .register("1.0.1-11", recording("A", log))
        .register("1.0.1-20", recording("B", log))
        .register("1.0.3-01", recording("C", log))
}

/// Same as [`abc_registry`], but `B` fails.
pub fn abc_registry_failing_b(log: &EventLog) -> MigrationRegistry {
    MigrationRegistry::new()
        .register("1.0.1-11", recording("A", log))
        .register("1.0.1-20", failing("B", log))
        .register("1.0.3-01", recording("C", log))
}

/// Version record whose reads or writes fail.
#[derive(Debug, Default)]
pub struct BrokenVersionStore {
    pub fail_get: bool,
    pub fail_set: bool,
    pub stored: Mutex<Option<String>>,
}

#[async_trait::async_trait]
impl VersionStore for BrokenVersionStore {
    async fn get_version(&self) -> Result<Option<String>, WalletStorageError> {
        if self.fail_get {
            return Err(WalletStorageError::Unavailable("version record unreadable".into()));
        }
        Ok(self.stored.lock().unwrap().clone())
    }

    async fn set_version(&self, version: &str) -> Result<(), WalletStorageError> {
        if self.fail_set {
            return Err(WalletStorageError::Unavailable("version record read-only".into()));
        }
        *self.stored.lock().unwrap() = Some(version.to_owned());
        Ok(())
    }
}
