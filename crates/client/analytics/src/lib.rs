//! Logging setup for walletd.
//!
//! Installs a global `tracing` subscriber made of a `fmt` layer using [`CustomFormatter`] and an
//! [`EnvFilter`]. `RUST_LOG` takes precedence over [`AnalyticsConfig::default_level`].

use formatter::CustomFormatter;
use tracing_core::LevelFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::EnvFilter;

mod formatter;

pub use formatter::MIGRATION_TARGET;

#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    pub service_name: String,
    pub default_level: LevelFilter,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self { service_name: "walletd".into(), default_level: LevelFilter::INFO }
    }
}

pub struct AnalyticsService {
    config: AnalyticsConfig,
    initialized: bool,
}

impl AnalyticsService {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self { config, initialized: false }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Install the global subscriber. Calling this more than once is a no-op.
    pub fn setup(&mut self) -> anyhow::Result<()> {
        if self.initialized {
            return Ok(());
        }
        let filter = EnvFilter::builder().with_default_directive(self.config.default_level.into()).from_env()?;
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().event_format(CustomFormatter::new()))
            .with(filter)
            .try_init()?;
        self.initialized = true;
        tracing::debug!("Logging initialized for {}", self.config.service_name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_logs_at_info() {
        let service = AnalyticsService::new(AnalyticsConfig::default());
        assert_eq!(service.config().default_level, LevelFilter::INFO);
        assert_eq!(service.config().service_name, "walletd");
    }
}
