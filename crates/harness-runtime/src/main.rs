//! `harness-runner`: run the deed contract suites.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{error, info};

use ch_05_scenarios::Suite;
use harness_runtime::{init_telemetry, Backend, HarnessConfig, HarnessRuntime, Network, TelemetryConfig};

/// Which suites to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SuiteArg {
    Erc721,
    Verifier,
    All,
}

impl SuiteArg {
    fn suites(self) -> Vec<Suite> {
        match self {
            Self::Erc721 => vec![Suite::Erc721],
            Self::Verifier => vec![Suite::Verifier],
            Self::All => Suite::ALL.to_vec(),
        }
    }
}

/// Integration suites for the ERC721Mintable deed token and its
/// SolnSquareVerifier extension.
#[derive(Parser, Debug)]
#[command(name = "harness-runner", version)]
struct Args {
    /// Network profile (development, rinkeby); overrides HARNESS_NETWORK
    #[arg(short, long)]
    network: Option<Network>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Suite to run
    #[arg(short, long, value_enum, default_value = "all")]
    suite: SuiteArg,

    /// Run against fresh in-memory contracts instead of a node
    #[arg(long)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    init_telemetry(&TelemetryConfig::from_env()).context("failed to initialise logging")?;

    let mut config = HarnessConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    config.apply_env().context("invalid environment")?;
    if let Some(network) = args.network {
        config.network = network;
    }

    let backend = if args.in_memory {
        Backend::InMemory
    } else {
        Backend::Rpc
    };

    let runtime = HarnessRuntime::new(config, backend).context("invalid configuration")?;
    runtime.config().log_summary();

    let reports = runtime
        .run(&args.suite.suites())
        .await
        .context("suite setup failed")?;

    let mut failed = 0;
    for report in &reports {
        println!("{report}\n");
        if !report.passed() {
            failed += 1;
        }
    }

    if failed == 0 {
        info!(suites = reports.len(), "All suites passed");
        Ok(ExitCode::SUCCESS)
    } else {
        error!(failed, suites = reports.len(), "Suites failed");
        Ok(ExitCode::FAILURE)
    }
}
