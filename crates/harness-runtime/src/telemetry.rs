//! Logging setup for the runner.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `HARNESS_LOG_LEVEL` or `RUST_LOG` | `info` | Filter directive |
//! | `HARNESS_JSON_LOGS` | `false` | JSON lines instead of text |

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Telemetry initialization errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter {directive:?}: {reason}")]
    Filter { directive: String, reason: String },

    #[error("failed to install subscriber: {0}")]
    Install(String),
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive, e.g. `info` or `ch_02_rpc_client=debug,info`.
    pub log_level: String,
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Read the settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read the settings through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            log_level: lookup("HARNESS_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| "info".to_string()),
            json_logs: lookup("HARNESS_JSON_LOGS")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false),
        }
    }

    /// Build the filter for `log_level`.
    pub fn filter(&self) -> Result<EnvFilter, TelemetryError> {
        EnvFilter::try_new(&self.log_level).map_err(|e| TelemetryError::Filter {
            directive: self.log_level.clone(),
            reason: e.to_string(),
        })
    }
}

/// Install the global subscriber. Logs go to stderr so reports on stdout stay
/// readable.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = config.filter()?;

    let output = if config.json_logs {
        fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(output)
        .try_init()
        .map_err(|e| TelemetryError::Install(e.to_string()))
}
