use clap::Args;
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;
use wc_analytics::AnalyticsConfig;

#[derive(Debug, Clone, Copy, clap::ValueEnum, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}

/// Parameters used to config logging.
#[derive(Debug, Clone, Args, Deserialize, Serialize)]
pub struct AnalyticsParams {
    /// Name of the service.
    #[arg(env = "WALLETD_ANALYTICS_SERVICE_NAME", long, alias = "analytics", default_value = "walletd")]
    pub analytics_service_name: String,

    /// Log level used when `RUST_LOG` is not set.
    #[arg(env = "WALLETD_LOG_LEVEL", long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

impl AnalyticsParams {
    pub fn as_analytics_config(&self) -> AnalyticsConfig {
        AnalyticsConfig { service_name: self.analytics_service_name.clone(), default_level: self.log_level.into() }
    }
}
