//! # Harness Configuration
//!
//! Network profiles, compiler settings, suite limits, deployed contract
//! addresses and fixture literals.
//!
//! Layering, lowest to highest precedence:
//!
//! 1. built-in defaults
//! 2. TOML file (`--config`)
//! 3. environment (`HARNESS_NETWORK`, `MNEMONIC`, `INFURA_KEY`)
//! 4. command-line flags
//!
//! ## Security Requirements
//!
//! - Selecting `rinkeby` without `MNEMONIC` and `INFURA_KEY` is a
//!   configuration error, reported before any suite starts. So is a
//!   mnemonic that does not derive a wallet, or fewer than two accounts.
//! - Secrets are never logged.

use ch_02_rpc_client::{HdWallet, Signer, WalletError};
use ch_03_contracts::ReceiptPolicy;
use ch_04_fixture::{ContractAddresses, FixtureError, FixtureParams, REQUIRED_ACCOUNTS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Environment variable selecting the network profile.
pub const ENV_NETWORK: &str = "HARNESS_NETWORK";
/// Environment variable holding the wallet mnemonic for `rinkeby`.
pub const ENV_MNEMONIC: &str = "MNEMONIC";
/// Environment variable holding the Infura project key for `rinkeby`.
pub const ENV_INFURA_KEY: &str = "INFURA_KEY";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A variable the selected profile needs is unset or empty.
    #[error("{var} must be set to use the {network} network")]
    MissingVariable { var: &'static str, network: Network },

    /// Unknown network profile name.
    #[error("unknown network: {0} (expected development or rinkeby)")]
    UnknownNetwork(String),

    #[error("invalid suite settings: {0}")]
    InvalidSuite(String),

    #[error("invalid fixture parameters: {0}")]
    Fixture(#[from] FixtureError),

    #[error("invalid wallet: {0}")]
    Wallet(#[from] WalletError),
}

// =============================================================================
// NETWORKS
// =============================================================================

/// Network profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Local node with unlocked accounts.
    #[default]
    Development,
    /// Public test network through Infura, signing with an HD wallet.
    Rinkeby,
}

impl Network {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Rinkeby => "rinkeby",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "rinkeby" => Ok(Self::Rinkeby),
            other => Err(ConfigError::UnknownNetwork(other.to_string())),
        }
    }
}

/// Expected chain id: `"*"` accepts any, otherwise a decimal id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(pub String);

impl NetworkId {
    /// True if a node reporting `chain_id` is acceptable.
    #[must_use]
    pub fn accepts(&self, chain_id: u64) -> bool {
        self.0 == "*" || self.0.parse::<u64>().is_ok_and(|id| id == chain_id)
    }
}

impl Default for NetworkId {
    fn default() -> Self {
        Self("*".to_string())
    }
}

/// Local development node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevelopmentNetwork {
    pub host: String,
    pub port: u16,
    pub network_id: NetworkId,
    /// The node also serves websockets. Events are read from receipts, so
    /// this is informational.
    pub websockets: bool,
}

impl Default for DevelopmentNetwork {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8545,
            network_id: NetworkId::default(),
            websockets: true,
        }
    }
}

/// Public network reached through a hosted RPC provider.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicNetwork {
    /// Provider URL; the Infura key is appended.
    pub url_prefix: String,
    pub network_id: NetworkId,
    /// Number of wallet accounts to derive.
    pub accounts: usize,
    /// Normally supplied through `MNEMONIC`.
    #[serde(skip_serializing)]
    pub mnemonic: Option<String>,
    /// Normally supplied through `INFURA_KEY`.
    #[serde(skip_serializing)]
    pub infura_key: Option<String>,
}

impl Default for PublicNetwork {
    fn default() -> Self {
        Self {
            url_prefix: "https://rinkeby.infura.io/v3/".to_string(),
            network_id: NetworkId::default(),
            accounts: 10,
            mnemonic: None,
            infura_key: None,
        }
    }
}

impl fmt::Debug for PublicNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicNetwork")
            .field("url_prefix", &self.url_prefix)
            .field("network_id", &self.network_id)
            .field("accounts", &self.accounts)
            .field("mnemonic", &self.mnemonic.as_ref().map(|_| "<redacted>"))
            .field("infura_key", &self.infura_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// All network profiles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworksConfig {
    pub development: DevelopmentNetwork,
    pub rinkeby: PublicNetwork,
}

// =============================================================================
// COMPILER / SUITE
// =============================================================================

/// Solidity optimizer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub enabled: bool,
    pub runs: u32,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            runs: 200,
        }
    }
}

/// Settings the contracts under test were compiled with.
///
/// The harness does not compile; these are recorded so a run can be matched
/// against the artifacts it exercised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub solc_version: String,
    pub docker: bool,
    pub optimizer: OptimizerConfig,
    pub evm_version: String,
    pub build_directory: PathBuf,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            solc_version: "0.5.2".to_string(),
            docker: true,
            optimizer: OptimizerConfig::default(),
            evm_version: "byzantium".to_string(),
            build_directory: PathBuf::from("./build/contracts"),
        }
    }
}

/// Limits applied while suites run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Bound on every step, call and event wait.
    pub timeout_ms: u64,
    /// JSON-RPC request timeout.
    pub request_timeout_ms: u64,
    /// Receipt polling interval.
    pub receipt_poll_ms: u64,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 100_000,
            request_timeout_ms: 30_000,
            receipt_poll_ms: 500,
        }
    }
}

// =============================================================================
// HARNESS CONFIG
// =============================================================================

/// Complete harness configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Selected profile.
    pub network: Network,
    pub networks: NetworksConfig,
    pub compiler: CompilerConfig,
    pub suite: SuiteConfig,
    pub contracts: ContractAddresses,
    pub fixture: FixtureParams,
}

impl HarnessConfig {
    /// Parse a TOML document.
    pub fn from_toml(source: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path`, or use the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&source, path)?;
        info!(path = %path.display(), network = %config.network, "Configuration loaded");
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(network) = lookup(ENV_NETWORK).filter(|v| !v.trim().is_empty()) {
            self.network = network.parse()?;
        }
        if let Some(mnemonic) = lookup(ENV_MNEMONIC) {
            self.networks.rinkeby.mnemonic = Some(mnemonic);
        }
        if let Some(key) = lookup(ENV_INFURA_KEY) {
            self.networks.rinkeby.infura_key = Some(key);
        }
        Ok(())
    }

    /// Check the configuration before any suite starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.suite.timeout_ms == 0 {
            return Err(ConfigError::InvalidSuite("timeout_ms cannot be 0".into()));
        }
        if self.suite.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidSuite(
                "request_timeout_ms cannot be 0".into(),
            ));
        }
        if self.suite.receipt_poll_ms == 0 {
            return Err(ConfigError::InvalidSuite(
                "receipt_poll_ms cannot be 0".into(),
            ));
        }

        self.fixture.validate()?;

        if self.network == Network::Rinkeby {
            let rinkeby = &self.networks.rinkeby;
            if !is_set(&rinkeby.mnemonic) {
                return Err(ConfigError::MissingVariable {
                    var: ENV_MNEMONIC,
                    network: self.network,
                });
            }
            if !is_set(&rinkeby.infura_key) {
                return Err(ConfigError::MissingVariable {
                    var: ENV_INFURA_KEY,
                    network: self.network,
                });
            }
            if rinkeby.accounts < REQUIRED_ACCOUNTS {
                return Err(FixtureError::NotEnoughAccounts {
                    needed: REQUIRED_ACCOUNTS,
                    found: rinkeby.accounts,
                }
                .into());
            }
            // Derive the wallet now so a bad phrase fails before any suite
            self.signer()?;
        }

        Ok(())
    }

    /// JSON-RPC endpoint of the selected profile.
    pub fn endpoint(&self) -> Result<String, ConfigError> {
        match self.network {
            Network::Development => {
                let dev = &self.networks.development;
                Ok(format!("http://{}:{}", dev.host, dev.port))
            }
            Network::Rinkeby => {
                let rinkeby = &self.networks.rinkeby;
                let key = rinkeby
                    .infura_key
                    .as_deref()
                    .filter(|k| !k.trim().is_empty())
                    .ok_or(ConfigError::MissingVariable {
                        var: ENV_INFURA_KEY,
                        network: self.network,
                    })?;
                Ok(format!("{}{}", rinkeby.url_prefix, key.trim()))
            }
        }
    }

    /// Chain ids the selected profile accepts.
    #[must_use]
    pub fn network_id(&self) -> &NetworkId {
        match self.network {
            Network::Development => &self.networks.development.network_id,
            Network::Rinkeby => &self.networks.rinkeby.network_id,
        }
    }

    /// Transaction signer for the selected profile.
    pub fn signer(&self) -> Result<Signer, ConfigError> {
        match self.network {
            Network::Development => Ok(Signer::NodeManaged),
            Network::Rinkeby => {
                let rinkeby = &self.networks.rinkeby;
                let mnemonic = rinkeby
                    .mnemonic
                    .as_deref()
                    .filter(|m| !m.trim().is_empty())
                    .ok_or(ConfigError::MissingVariable {
                        var: ENV_MNEMONIC,
                        network: self.network,
                    })?;
                let wallet = HdWallet::from_mnemonic(mnemonic, rinkeby.accounts)?;
                Ok(Signer::Local(Arc::new(wallet)))
            }
        }
    }

    #[must_use]
    pub fn suite_timeout(&self) -> Duration {
        Duration::from_millis(self.suite.timeout_ms)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.suite.request_timeout_ms)
    }

    /// Receipt polling derived from the suite settings.
    #[must_use]
    pub fn receipt_policy(&self) -> ReceiptPolicy {
        ReceiptPolicy {
            poll_interval: Duration::from_millis(self.suite.receipt_poll_ms),
            timeout: self.suite_timeout(),
        }
    }

    /// Log the effective settings, without secrets.
    pub fn log_summary(&self) {
        info!(
            network = %self.network,
            network_id = %self.network_id().0,
            timeout_ms = self.suite.timeout_ms,
            "Harness configuration"
        );
        info!(
            solc = %self.compiler.solc_version,
            docker = self.compiler.docker,
            optimizer = self.compiler.optimizer.enabled,
            runs = self.compiler.optimizer.runs,
            evm_version = %self.compiler.evm_version,
            build_directory = %self.compiler.build_directory.display(),
            "Compiler settings"
        );
    }
}

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}
