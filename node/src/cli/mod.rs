pub mod analytics;
pub mod db;
pub mod migration;

use analytics::AnalyticsParams;
use anyhow::bail;
use db::DbParams;
use figment::{
    providers::{Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use migration::MigrationParams;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// walletd: opens the wallet database and migrates its data to the running version.
#[derive(Clone, Debug, clap::Parser, Deserialize, Serialize)]
pub struct RunCmd {
    /// Load the configuration from a file (toml, json or yaml). Values in the file take
    /// precedence over the command line.
    #[clap(env = "WALLETD_CONFIG", long, value_name = "PATH")]
    #[serde(skip)]
    pub config_file: Option<PathBuf>,

    #[allow(missing_docs)]
    #[clap(flatten)]
    pub db_params: DbParams,

    #[allow(missing_docs)]
    #[clap(flatten)]
    pub analytics_params: AnalyticsParams,

    #[allow(missing_docs)]
    #[clap(flatten)]
    pub migration_params: MigrationParams,
}

impl RunCmd {
    /// Merge the command line with the config file, if any.
    pub fn into_figment(self) -> anyhow::Result<Figment> {
        let config_path = self.config_file.clone();
        let config = Figment::new().merge(Serialized::defaults(self));
        let Some(config_path) = config_path else {
            return Ok(config);
        };
        Ok(match config_path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => config.merge(Toml::file(config_path)),
            Some("json") => config.merge(Json::file(config_path)),
            Some("yaml") | Some("yml") => config.merge(Yaml::file(config_path)),
            _ => bail!("Unsupported file type for config file: {}", config_path.display()),
        })
    }
}
