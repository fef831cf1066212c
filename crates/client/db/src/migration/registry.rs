//! Static table mapping version keys to the jobs introduced at that version.

use super::{MigrationContext, MigrationError};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use wp_version::{AppVersion, VersionOrdering};

/// A one-time transformation of persisted wallet data.
///
/// Jobs are constructed right before they run, with the shared [`MigrationContext`], and are
/// dropped once their run settles.
#[async_trait::async_trait]
pub trait MigrationJob: Send {
    async fn run(&mut self) -> anyhow::Result<()>;
}

pub type JobFactory = Arc<dyn Fn(MigrationContext) -> Box<dyn MigrationJob> + Send + Sync>;

/// Name and constructor of a job.
#[derive(Clone)]
pub struct JobDescriptor {
    name: &'static str,
    factory: JobFactory,
}

impl fmt::Debug for JobDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobDescriptor").field("name", &self.name).finish_non_exhaustive()
    }
}

impl JobDescriptor {
    pub fn new(name: &'static str, factory: JobFactory) -> Self {
        Self { name, factory }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn build(&self, ctx: MigrationContext) -> Box<dyn MigrationJob> {
        (self.factory)(ctx)
    }
}

/// Shorthand for a descriptor whose job is built by a plain constructor.
pub fn job<J, F>(name: &'static str, ctor: F) -> JobDescriptor
where
    J: MigrationJob + 'static,
    F: Fn(MigrationContext) -> J + Send + Sync + 'static,
{
    JobDescriptor::new(name, Arc::new(move |ctx| Box::new(ctor(ctx)) as Box<dyn MigrationJob>))
}

/// Jobs introduced at one application version. They run in listed order.
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: String,
    pub jobs: Vec<JobDescriptor>,
}

#[derive(Debug, Clone, Default)]
pub struct MigrationRegistry {
    migrations: Vec<Migration>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(self, version: impl Into<String>, job: JobDescriptor) -> Self {
        self.register_all(version, vec![job])
    }

    pub fn register_all(mut self, version: impl Into<String>, jobs: Vec<JobDescriptor>) -> Self {
        self.migrations.push(Migration { version: version.into(), jobs });
        self
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Migration> {
        self.migrations.iter()
    }

    /// Check the registry is well-formed.
    ///
    /// A registry where the two [`VersionOrdering`]s sort the keys differently is accepted, but
    /// logged: such keys are only migrated in the expected order under [`VersionOrdering::Numeric`].
    pub fn validate(&self) -> Result<(), MigrationError> {
        let mut seen = HashSet::new();
        for migration in &self.migrations {
            if migration.version.is_empty() {
                return Err(MigrationError::InvalidRegistry("empty version key".into()));
            }
            if !seen.insert(migration.version.as_str()) {
                return Err(MigrationError::InvalidRegistry(format!("duplicate version key '{}'", migration.version)));
            }
            if migration.jobs.is_empty() {
                return Err(MigrationError::InvalidRegistry(format!("version '{}' has no jobs", migration.version)));
            }
        }

        let sorted_keys = |ordering: VersionOrdering| {
            let mut keys: Vec<_> = self.migrations.iter().map(|m| m.version.as_str()).collect();
            keys.sort_by(|a, b| ordering.compare(a, b));
            keys
        };
        let lexicographic = sorted_keys(VersionOrdering::Lexicographic);
        let numeric = sorted_keys(VersionOrdering::Numeric);
        if lexicographic != numeric {
            tracing::warn!(
                "⚠️ Migration keys sort differently as strings ({lexicographic:?}) and as numbers ({numeric:?})"
            );
        }
        Ok(())
    }

    /// Migrations with `stored < version <= app`, in ascending version order.
    pub fn select(&self, stored: &AppVersion, app: &AppVersion, ordering: VersionOrdering) -> Vec<&Migration> {
        let mut selected: Vec<_> = self
            .migrations
            .iter()
            .filter(|m| ordering.in_range(&m.version, stored.as_str(), app.as_str()))
            .collect();
        selected.sort_by(|a, b| ordering.compare(&a.version, &b.version));
        selected
    }
}
