//! # Deed Contract Scenarios
//!
//! The two assertion suites the harness runs, and the runner that orders
//! their steps.
//!
//! ## Execution model
//!
//! One scenario runs its steps strictly in order over a shared
//! [`TestFixture`](ch_04_fixture::TestFixture). Every call and event wait is
//! bounded by the suite timeout. The first failing step halts the scenario
//! and the remaining steps are reported as skipped.

mod common;
pub mod erc721;
pub mod runner;
pub mod verifier;

pub use runner::{
    expect_eq, Scenario, ScenarioReport, StepContext, StepFailure, StepOutcome, StepStatus,
};

use ch_04_fixture::TestFixture;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// A runnable suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suite {
    /// Checks against `ERC721Mintable`.
    Erc721,
    /// Checks against `SolnSquareVerifier`.
    Verifier,
}

impl Suite {
    /// Every suite, in the order they run.
    pub const ALL: [Suite; 2] = [Suite::Erc721, Suite::Verifier];

    /// Run this suite against `fixture`.
    pub async fn run(self, fixture: &TestFixture, timeout: Duration) -> ScenarioReport {
        match self {
            Self::Erc721 => erc721::run(fixture, timeout).await,
            Self::Verifier => verifier::run(fixture, timeout).await,
        }
    }

    /// Command-line name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Erc721 => "erc721",
            Self::Verifier => "verifier",
        }
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Suite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "erc721" => Ok(Self::Erc721),
            "verifier" => Ok(Self::Verifier),
            other => Err(format!("unknown suite: {other}")),
        }
    }
}
