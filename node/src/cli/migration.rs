use serde::{Deserialize, Serialize};
use wc_db::migration::{default_registry, MigrationRunner};
use wp_version::VersionOrdering;

/// Version of this build, used as the application version unless overridden.
pub const BUILD_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionOrderingArg {
    /// Compare versions as plain strings, like previous releases did.
    #[default]
    Lexicographic,
    /// Compare versions component by component, numerically where possible.
    Numeric,
}

impl From<VersionOrderingArg> for VersionOrdering {
    fn from(value: VersionOrderingArg) -> Self {
        match value {
            VersionOrderingArg::Lexicographic => Self::Lexicographic,
            VersionOrderingArg::Numeric => Self::Numeric,
        }
    }
}

#[derive(Clone, Debug, clap::Args, Deserialize, Serialize)]
pub struct MigrationParams {
    /// Application version to migrate the wallet data to. Defaults to the version of this build.
    #[clap(env = "WALLETD_APP_VERSION", long, value_name = "VERSION")]
    pub app_version: Option<String>,

    /// How the application version and the stored version are compared.
    /// `lexicographic` keeps the ordering of versions stored by previous releases.
    #[clap(env = "WALLETD_VERSION_ORDERING", long, value_enum, default_value_t = VersionOrderingArg::Lexicographic)]
    #[serde(default)]
    pub version_ordering: VersionOrderingArg,

    /// Only report which migrations would run, then exit. The database is opened read-only and
    /// is not created when missing.
    #[clap(env = "WALLETD_CHECK_MIGRATIONS", long)]
    #[serde(default)]
    pub check_migrations: bool,

    /// Exit with an error when a migration job fails, instead of starting on the unmigrated data.
    #[clap(env = "WALLETD_STRICT_MIGRATIONS", long)]
    #[serde(default)]
    pub strict_migrations: bool,
}

impl MigrationParams {
    pub fn app_version(&self) -> &str {
        self.app_version.as_deref().unwrap_or(BUILD_VERSION)
    }

    pub fn migration_runner(&self) -> anyhow::Result<MigrationRunner> {
        Ok(MigrationRunner::new(self.app_version(), default_registry())?.with_ordering(self.version_ordering.into()))
    }
}
