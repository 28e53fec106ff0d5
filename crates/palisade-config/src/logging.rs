use serde::Deserialize;
use tracing_subscriber::EnvFilter;

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default log level, overridable via `RUST_LOG`
    #[serde(default = "default_level")]
    pub level: String,
    /// When true, upstream error detail is kept out of log events
    #[serde(default = "crate::default_true")]
    pub sanitize: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            sanitize: true,
        }
    }
}

impl LoggingConfig {
    /// Install the global tracing subscriber
    ///
    /// Call once per process; subsequent calls are ignored so embedding
    /// applications and tests can both initialize safely.
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.clone()));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .ok();
    }
}

fn default_level() -> String {
    "info".to_owned()
}
