//! # Suite Orchestration
//!
//! Builds a fresh fixture for each suite on the selected backend and runs
//! the suites one after another.

use crate::config::{ConfigError, HarnessConfig};
use ch_02_rpc_client::{RpcClient, RpcError};
use ch_04_fixture::{
    FixtureError, FixtureProvider, InMemoryFixtureProvider, RpcFixtureProvider, TestFixture,
    REQUIRED_ACCOUNTS,
};
use ch_05_scenarios::{ScenarioReport, Suite};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// Errors that stop a run before or between suites.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("fixture error: {0}")]
    Fixture(#[from] FixtureError),

    #[error("node error: {0}")]
    Rpc(#[from] RpcError),

    /// The node is on a different chain than the profile expects.
    #[error("connected to chain {actual}, but the profile expects network id {expected}")]
    ChainMismatch { expected: String, actual: u64 },
}

/// Where the contracts under test live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Deployed contracts reached over JSON-RPC.
    Rpc,
    /// Fresh in-memory deployments, no node needed.
    InMemory,
}

/// Runs suites against one configuration.
pub struct HarnessRuntime {
    config: HarnessConfig,
    backend: Backend,
}

impl HarnessRuntime {
    /// Validate `config` and prepare a runtime.
    pub fn new(config: HarnessConfig, backend: Backend) -> Result<Self, RuntimeError> {
        config.validate()?;
        Ok(Self { config, backend })
    }

    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Build the fixture for one suite.
    ///
    /// The providers log the fixture summary themselves.
    pub async fn fixture(&self) -> Result<TestFixture, RuntimeError> {
        let fixture = match self.backend {
            Backend::InMemory => {
                let accounts = InMemoryFixtureProvider::dev_accounts(REQUIRED_ACCOUNTS)?;
                InMemoryFixtureProvider::new(self.config.fixture.clone())
                    .config(&accounts)
                    .await?
            }
            Backend::Rpc => {
                let provider = self.rpc_provider().await?;
                let accounts = provider.accounts().await?;
                provider.config(&accounts).await?
            }
        };
        Ok(fixture)
    }

    async fn rpc_provider(&self) -> Result<RpcFixtureProvider, RuntimeError> {
        let client = RpcClient::new(self.config.endpoint()?, self.config.request_timeout())?;

        let chain_id = client.chain_id().await?;
        let network_id = self.config.network_id();
        if !network_id.accepts(chain_id) {
            return Err(RuntimeError::ChainMismatch {
                expected: network_id.0.clone(),
                actual: chain_id,
            });
        }
        info!(network = %self.config.network, chain_id, "Connected to node");

        Ok(RpcFixtureProvider::new(
            Arc::new(client),
            self.config.signer()?,
            self.config.fixture.clone(),
            self.config.contracts.clone(),
            self.config.receipt_policy(),
        ))
    }

    /// Run `suites` in order, each on a fresh fixture.
    ///
    /// A failing suite does not stop the next one; a fixture that cannot be
    /// built does.
    pub async fn run(&self, suites: &[Suite]) -> Result<Vec<ScenarioReport>, RuntimeError> {
        let timeout = self.config.suite_timeout();
        let mut reports = Vec::with_capacity(suites.len());

        for suite in suites {
            info!(suite = %suite, backend = ?self.backend, "Preparing suite");
            let fixture = self.fixture().await?;
            let report = suite.run(&fixture, timeout).await;

            if let Some(failure) = report.first_failure() {
                error!(suite = %suite, step = failure.ordinal, title = %failure.title, "Suite failed");
            }
            reports.push(report);
        }

        Ok(reports)
    }
}
