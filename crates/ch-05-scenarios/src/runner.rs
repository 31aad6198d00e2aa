//! # Scenario Runner
//!
//! A scenario is a fixed, ordered list of steps over one fixture. Later
//! steps depend on the chain state earlier steps leave behind, so the first
//! failure halts the scenario and every remaining step is recorded as
//! skipped.

use ch_03_contracts::ContractError;
use ch_04_fixture::TestFixture;
use shared_bus::{Subscription, SubscriptionError};
use shared_types::EmittedEvent;
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

/// Why a step failed.
#[derive(Debug, Error)]
pub enum StepFailure {
    /// A value differed from the expected literal.
    #[error("{what}: expected {expected}, got {actual}")]
    Mismatch {
        what: String,
        expected: String,
        actual: String,
    },

    /// A query or transaction failed.
    #[error("{what}: {source}")]
    Contract {
        what: String,
        #[source]
        source: ContractError,
    },

    /// An awaited event did not arrive.
    #[error("{what}: {source}")]
    Event {
        what: String,
        #[source]
        source: SubscriptionError,
    },

    /// A call or the whole step exceeded the suite timeout.
    #[error("{what}: timed out after {waited_ms}ms")]
    Timeout { what: String, waited_ms: u64 },

    /// A transaction that must be rejected went through.
    #[error("{what}: expected the transaction to be rejected, but it succeeded")]
    UnexpectedSuccess { what: String },
}

/// Compare `actual` against `expected`.
pub fn expect_eq<T>(what: &str, expected: T, actual: T) -> Result<(), StepFailure>
where
    T: PartialEq + fmt::Debug,
{
    if expected == actual {
        Ok(())
    } else {
        Err(StepFailure::Mismatch {
            what: what.to_string(),
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        })
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// What a step body gets to work with.
#[derive(Clone, Copy)]
pub struct StepContext<'f> {
    pub fixture: &'f TestFixture,
    /// Bound on every call and every event wait.
    pub timeout: Duration,
}

impl StepContext<'_> {
    /// Await a contract call, bounded by the suite timeout.
    pub async fn call<T, Fut>(&self, what: &str, call: Fut) -> Result<T, StepFailure>
    where
        Fut: Future<Output = Result<T, ContractError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => Err(StepFailure::Contract {
                what: what.to_string(),
                source,
            }),
            Err(_) => Err(StepFailure::Timeout {
                what: what.to_string(),
                waited_ms: millis(self.timeout),
            }),
        }
    }

    /// Await the first event on `subscription` that satisfies `predicate`.
    pub async fn event<P>(
        &self,
        what: &str,
        subscription: &mut Subscription,
        predicate: P,
    ) -> Result<EmittedEvent, StepFailure>
    where
        P: FnMut(&EmittedEvent) -> bool + Send,
    {
        subscription
            .wait_for(self.timeout, predicate)
            .await
            .map_err(|source| StepFailure::Event {
                what: what.to_string(),
                source,
            })
    }
}

/// Result of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Passed,
    Failed(String),
    Skipped,
}

/// One recorded step.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// 1-based position in the scenario.
    pub ordinal: usize,
    pub title: String,
    pub status: StepStatus,
    pub elapsed: Duration,
}

/// Outcome of a whole scenario.
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub run_id: Uuid,
    pub suite: String,
    pub steps: Vec<StepOutcome>,
    pub elapsed: Duration,
}

impl ScenarioReport {
    fn count(&self, pred: impl Fn(&StepStatus) -> bool) -> usize {
        self.steps.iter().filter(|s| pred(&s.status)).count()
    }

    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.count(|s| *s == StepStatus::Passed)
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(|s| matches!(s, StepStatus::Failed(_)))
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(|s| *s == StepStatus::Skipped)
    }

    /// True when every step passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        !self.steps.is_empty() && self.passed_count() == self.steps.len()
    }

    /// The step that halted the scenario.
    #[must_use]
    pub fn first_failure(&self) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|s| matches!(s.status, StepStatus::Failed(_)))
    }
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.suite, self.run_id)?;
        for step in &self.steps {
            let mark = match &step.status {
                StepStatus::Passed => "ok  ".to_string(),
                StepStatus::Failed(_) => "FAIL".to_string(),
                StepStatus::Skipped => "skip".to_string(),
            };
            writeln!(
                f,
                "  [{mark}] {:>2}. {} ({} ms)",
                step.ordinal,
                step.title,
                step.elapsed.as_millis()
            )?;
            if let StepStatus::Failed(reason) = &step.status {
                writeln!(f, "         {reason}")?;
            }
        }
        write!(
            f,
            "  {} passed, {} failed, {} skipped in {} ms",
            self.passed_count(),
            self.failed_count(),
            self.skipped_count(),
            self.elapsed.as_millis()
        )
    }
}

/// Runs the steps of one scenario in order.
pub struct Scenario<'f> {
    ctx: StepContext<'f>,
    report: ScenarioReport,
    started: Instant,
    halted: bool,
}

impl<'f> Scenario<'f> {
    #[must_use]
    pub fn new(suite: &str, fixture: &'f TestFixture, timeout: Duration) -> Self {
        let run_id = Uuid::new_v4();
        info!(suite, run_id = %run_id, timeout_ms = millis(timeout), "Scenario started");
        Self {
            ctx: StepContext { fixture, timeout },
            report: ScenarioReport {
                run_id,
                suite: suite.to_string(),
                steps: Vec::new(),
                elapsed: Duration::ZERO,
            },
            started: Instant::now(),
            halted: false,
        }
    }

    /// Run one step, or record it as skipped once the scenario has halted.
    pub async fn step<F, Fut>(&mut self, title: &str, body: F)
    where
        F: FnOnce(StepContext<'f>) -> Fut,
        Fut: Future<Output = Result<(), StepFailure>>,
    {
        let ordinal = self.report.steps.len() + 1;

        if self.halted {
            self.report.steps.push(StepOutcome {
                ordinal,
                title: title.to_string(),
                status: StepStatus::Skipped,
                elapsed: Duration::ZERO,
            });
            return;
        }

        let started = Instant::now();
        let result = match tokio::time::timeout(self.ctx.timeout, body(self.ctx)).await {
            Ok(result) => result,
            Err(_) => Err(StepFailure::Timeout {
                what: title.to_string(),
                waited_ms: millis(self.ctx.timeout),
            }),
        };
        let elapsed = started.elapsed();

        let status = match result {
            Ok(()) => {
                info!(suite = %self.report.suite, ordinal, step = title, elapsed_ms = millis(elapsed), "Step passed");
                StepStatus::Passed
            }
            Err(failure) => {
                error!(suite = %self.report.suite, ordinal, step = title, error = %failure, "Step failed, halting scenario");
                self.halted = true;
                StepStatus::Failed(failure.to_string())
            }
        };

        self.report.steps.push(StepOutcome {
            ordinal,
            title: title.to_string(),
            status,
            elapsed,
        });
    }

    /// Finish and return the report.
    #[must_use]
    pub fn finish(mut self) -> ScenarioReport {
        self.report.elapsed = self.started.elapsed();
        info!(
            suite = %self.report.suite,
            run_id = %self.report.run_id,
            passed = self.report.passed_count(),
            failed = self.report.failed_count(),
            skipped = self.report.skipped_count(),
            "Scenario finished"
        );
        self.report
    }
}
