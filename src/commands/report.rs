//! # Per-command reports.
//!
//! Reports keep every machine a command touched; a failure or cancellation is listed next
//! to the successes, never folded away.

use std::fmt;

use crate::error::CommandError;
use crate::model::{IntentError, OperationResult, Outcome, ProviderInstance, TerminationMode};

/// Aggregated results of one teardown batch, ordered by machine id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    results: Vec<OperationResult>,
}

impl BatchReport {
    /// Builds a report from drained results.
    pub fn new(mut results: Vec<OperationResult>) -> Self {
        results.sort_by(|a, b| a.machine_id().cmp(b.machine_id()));
        Self { results }
    }

    /// Returns every result.
    pub fn results(&self) -> &[OperationResult] {
        &self.results
    }

    /// Consumes the report, returning the results.
    pub fn into_results(self) -> Vec<OperationResult> {
        self.results
    }

    /// Number of machines in the batch.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns `true` if the batch was empty.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Machines whose intent succeeded.
    pub fn succeeded(&self) -> impl Iterator<Item = &str> {
        self.results
            .iter()
            .filter(|r| r.is_succeeded())
            .map(OperationResult::machine_id)
    }

    /// Machines whose intent failed, with the reason.
    pub fn failed(&self) -> impl Iterator<Item = (&str, &IntentError)> {
        self.results
            .iter()
            .filter_map(|r| r.error().map(|e| (r.machine_id(), e)))
    }

    /// Machines that were never started.
    pub fn cancelled(&self) -> impl Iterator<Item = &str> {
        self.results
            .iter()
            .filter(|r| r.is_cancelled())
            .map(OperationResult::machine_id)
    }

    /// Returns `true` if every intent succeeded.
    pub fn is_clean(&self) -> bool {
        self.results.iter().all(OperationResult::is_succeeded)
    }
}

impl From<Vec<OperationResult>> for BatchReport {
    fn from(results: Vec<OperationResult>) -> Self {
        Self::new(results)
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in &self.results {
            write!(f, "machine {}: ", r.machine_id())?;
            match (&r.outcome, r.intent.mode) {
                (Outcome::Succeeded, TerminationMode::EnvOnly) => match r.intent.ambiguity() {
                    Some(why) => writeln!(f, "removed from environment only ({why})")?,
                    None => writeln!(f, "removed from environment only")?,
                },
                (Outcome::Succeeded, TerminationMode::ProviderOnly) => {
                    writeln!(f, "instance destroyed")?
                }
                (Outcome::Succeeded, TerminationMode::Full) => writeln!(f, "terminated")?,
                (Outcome::Failed(e), _) => writeln!(f, "failed: {e}")?,
                (Outcome::Cancelled, _) => writeln!(f, "cancelled")?,
            }
        }
        write!(
            f,
            "{} machines: {} succeeded, {} failed, {} cancelled",
            self.len(),
            self.succeeded().count(),
            self.failed().count(),
            self.cancelled().count()
        )
    }
}

/// What happened to the state-server instance during environment teardown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StateServerOutcome {
    /// A provider-only intent ran against the resolved instance.
    Terminated(OperationResult),
    /// Machine `0` had no record or its address matched no instance.
    Unresolved,
    /// Machine teardown was not clean; the environment and its state server were kept.
    Kept,
    /// Force teardown: the state server was part of the naming-convention batch.
    InBatch,
}

/// Result of [`DestroyEnvironment`](crate::DestroyEnvironment).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TeardownReport {
    /// Every machine except the state server (force mode: every matching instance).
    pub machines: BatchReport,
    /// The orchestrator environment was destroyed (or discarded in force mode).
    pub environment_destroyed: bool,
    /// The state-server step.
    pub state_server: StateServerOutcome,
}

impl TeardownReport {
    /// Returns `true` if nothing of the environment is left behind.
    pub fn is_complete(&self) -> bool {
        let server_gone = match &self.state_server {
            StateServerOutcome::Terminated(r) => r.is_succeeded(),
            StateServerOutcome::InBatch => true,
            StateServerOutcome::Unresolved | StateServerOutcome::Kept => false,
        };
        self.machines.is_clean() && self.environment_destroyed && server_gone
    }
}

/// A machine that could not be provisioned.
#[derive(Debug)]
pub struct ProvisionFailure {
    /// Instance name that was attempted.
    pub name: String,
    /// Why it failed. Any instance already created was destroyed.
    pub error: CommandError,
}

/// Result of [`AddMachines`](crate::AddMachines).
#[derive(Debug, Default)]
pub struct ProvisionReport {
    /// Machines created and registered with the orchestrator.
    pub launched: Vec<ProviderInstance>,
    /// Machines that failed.
    pub failed: Vec<ProvisionFailure>,
}

impl ProvisionReport {
    /// Returns `true` if every requested machine was added.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}
