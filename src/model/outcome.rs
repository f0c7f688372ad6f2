//! # Per-intent results produced by the operation runner.
//!
//! Exactly one [`OperationResult`] is produced per submitted intent. A failed or
//! cancelled result never hides the machine it belongs to.

use thiserror::Error;

use crate::error::{OrchestratorError, ProviderError};
use crate::model::TerminationIntent;

/// Why a single intent failed.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntentError {
    /// Provider destroy (or its confirmation wait) failed; the orchestrator record was kept.
    #[error(transparent)]
    Provider(ProviderError),

    /// Orchestrator removal failed for an orchestrator-only intent.
    #[error(transparent)]
    Orchestrator(OrchestratorError),

    /// The provider instance is gone but the orchestrator record is stale.
    /// Retrying only the orchestrator removal is enough.
    #[error("provider destroyed, orchestrator record stale: {0}")]
    StaleRecord(OrchestratorError),

    /// The worker executing the intent panicked.
    #[error("worker panicked: {0}")]
    WorkerPanicked(String),
}

impl IntentError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            IntentError::Provider(e) => e.as_label(),
            IntentError::Orchestrator(e) => e.as_label(),
            IntentError::StaleRecord(_) => "orchestrator_record_stale",
            IntentError::WorkerPanicked(_) => "worker_panicked",
        }
    }
}

/// What happened to an intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Everything the intent touches was updated.
    Succeeded,
    /// The intent failed; see the error for which half.
    Failed(IntentError),
    /// The batch was cancelled before this intent started.
    Cancelled,
}

/// Result of one intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationResult {
    /// The intent this result belongs to.
    pub intent: TerminationIntent,
    /// What happened.
    pub outcome: Outcome,
}

impl OperationResult {
    /// A successful result.
    pub fn succeeded(intent: TerminationIntent) -> Self {
        Self {
            intent,
            outcome: Outcome::Succeeded,
        }
    }

    /// A failed result.
    pub fn failed(intent: TerminationIntent, error: IntentError) -> Self {
        Self {
            intent,
            outcome: Outcome::Failed(error),
        }
    }

    /// A result for an intent that never started.
    pub fn cancelled(intent: TerminationIntent) -> Self {
        Self {
            intent,
            outcome: Outcome::Cancelled,
        }
    }

    /// Returns the machine id of the intent.
    pub fn machine_id(&self) -> &str {
        &self.intent.machine_id
    }

    #[inline]
    pub fn is_succeeded(&self) -> bool {
        matches!(self.outcome, Outcome::Succeeded)
    }

    #[inline]
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(_))
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self.outcome, Outcome::Cancelled)
    }

    /// Returns the failure, if any.
    pub fn error(&self) -> Option<&IntentError> {
        match &self.outcome {
            Outcome::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Returns `true` if only the orchestrator removal needs to be retried.
    pub fn is_stale_record(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(IntentError::StaleRecord(_)))
    }
}
