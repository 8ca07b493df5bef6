// Monitoring with Sentry integration
use std::env;
use tracing::info;

#[derive(Debug, Clone)]
pub struct MonitoringConfig {
    pub sentry_dsn: Option<String>,
    pub environment: String,
    pub enable_performance_monitoring: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            sentry_dsn: None,
            environment: "development".to_string(),
            enable_performance_monitoring: false,
        }
    }
}

impl MonitoringConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.sentry_dsn = env::var("SENTRY_DSN")
            .ok()
            .map(|dsn| dsn.trim().to_string())
            .filter(|dsn| !dsn.is_empty());

        if let Ok(environment) = env::var("ENVIRONMENT") {
            config.environment = environment;
        }

        config.enable_performance_monitoring = env::var("SENTRY_PERFORMANCE_MONITORING")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        config
    }
}

/// Initialize the Sentry client when a DSN is configured
///
/// The returned guard flushes pending events on drop and must live as long as
/// the server does.
pub fn init_sentry(config: &MonitoringConfig) -> Option<sentry::ClientInitGuard> {
    let Some(dsn) = &config.sentry_dsn else {
        info!("Sentry DSN not configured");
        return None;
    };

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some(config.environment.clone().into()),
            traces_sample_rate: if config.enable_performance_monitoring {
                0.1
            } else {
                0.0
            },
            ..Default::default()
        },
    ));

    info!("Sentry initialized successfully");
    Some(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MonitoringConfig::default();
        assert!(config.sentry_dsn.is_none());
        assert_eq!(config.environment, "development");
        assert!(!config.enable_performance_monitoring);
    }

    #[test]
    fn test_no_dsn_means_no_guard() {
        assert!(init_sentry(&MonitoringConfig::default()).is_none());
    }
}
