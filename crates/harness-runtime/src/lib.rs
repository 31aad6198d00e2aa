//! # Harness Runtime
//!
//! Configuration, logging and suite orchestration behind the
//! `harness-runner` binary.
//!
//! ## Startup Sequence
//!
//! 1. Initialise logging from the environment
//! 2. Load the TOML config, apply environment then CLI overrides
//! 3. Validate; a missing `MNEMONIC`/`INFURA_KEY` on `rinkeby` stops here
//! 4. For each selected suite: build a fresh fixture, run the steps, report
//! 5. Exit non-zero if any suite failed

pub mod config;
pub mod runtime;
pub mod telemetry;

pub use config::{ConfigError, HarnessConfig, Network};
pub use runtime::{Backend, HarnessRuntime, RuntimeError};
pub use telemetry::{init_telemetry, TelemetryConfig, TelemetryError};
