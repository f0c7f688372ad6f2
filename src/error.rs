//! Error types used by the reconciliation core and the commands built on it.
//!
//! The taxonomy mirrors how failures are handled:
//!
//! - [`ConfigurationError`] — caller contract violations; fatal, never retried.
//! - [`ProviderError`] — cloud API failures and wait-loop timeouts; reported per intent.
//! - [`OrchestratorError`] — orchestration-state mutation failures; reported per intent.
//! - [`RunnerError`] — the only error [`OperationRunner::drain`](crate::OperationRunner::drain) returns.
//! - [`CommandError`] — aborts a whole command (preconditions, configuration, fatal calls).
//!
//! Ambiguous reconciliation is *not* an error; see [`Ambiguity`](crate::Ambiguity).
//!
//! Every enum provides `as_label()`, a short stable snake_case label for logs.

use std::time::Duration;
use thiserror::Error;

/// # Caller contract violations.
///
/// Raised before any provider or orchestrator mutation is attempted.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A machine record carried neither an address nor an instance id.
    #[error("machine {machine_id} has neither an address nor an instance id")]
    MalformedRecord {
        /// Orchestrator machine id of the offending record.
        machine_id: String,
    },

    /// A required setting is missing or empty.
    #[error("missing setting {name}: {hint}")]
    MissingSetting {
        /// Name of the setting (usually an environment variable).
        name: &'static str,
        /// What the operator should do about it.
        hint: &'static str,
    },

    /// The worker pool must have at least one slot and fit a semaphore.
    #[error("worker pool size must be between 1 and {max}, got {size}", max = tokio::sync::Semaphore::MAX_PERMITS)]
    InvalidPoolSize {
        /// The configured size.
        size: usize,
    },

    /// An intent that touches the provider was queued without an instance id.
    #[error("intent for machine {machine_id} needs an instance id to reach the provider")]
    MissingInstanceId {
        /// Orchestrator machine id of the intent.
        machine_id: String,
    },

    /// A gateway the operation needs was not configured.
    #[error("no {name} gateway configured")]
    MissingGateway {
        /// Which gateway.
        name: &'static str,
    },

    /// The environment name is empty.
    #[error("invalid environment name {name:?}")]
    InvalidEnvironment {
        /// The rejected name.
        name: String,
    },

    /// The state-server machine cannot be targeted directly.
    #[error("machine {machine_id} is the state server and cannot be terminated directly")]
    ReservedMachine {
        /// The reserved machine id.
        machine_id: String,
    },
}

impl ConfigurationError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigurationError::MalformedRecord { .. } => "config_malformed_record",
            ConfigurationError::MissingSetting { .. } => "config_missing_setting",
            ConfigurationError::InvalidPoolSize { .. } => "config_invalid_pool_size",
            ConfigurationError::MissingInstanceId { .. } => "config_missing_instance_id",
            ConfigurationError::MissingGateway { .. } => "config_missing_gateway",
            ConfigurationError::InvalidEnvironment { .. } => "config_invalid_environment",
            ConfigurationError::ReservedMachine { .. } => "config_reserved_machine",
        }
    }
}

/// # Cloud provider failures.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// A provider API call failed.
    #[error("provider call {op} failed: {reason}")]
    Api {
        /// Operation name (e.g. `destroy_instance`).
        op: &'static str,
        /// Underlying error message.
        reason: String,
    },

    /// The provider does not know the requested resource.
    #[error("provider resource not found: {what}")]
    NotFound {
        /// Description of the missing resource.
        what: String,
    },

    /// A wait loop exhausted its hard limit.
    #[error("timed out waiting for {what} after {ticks} checks ({elapsed:?}); last state: {diagnostic}")]
    Timeout {
        /// What was being awaited.
        what: String,
        /// Number of checks performed.
        ticks: u32,
        /// Approximate time spent waiting.
        elapsed: Duration,
        /// Debug rendering of the last diagnostic value.
        diagnostic: String,
    },
}

impl ProviderError {
    /// Shorthand for [`ProviderError::Api`].
    pub fn api(op: &'static str, reason: impl Into<String>) -> Self {
        ProviderError::Api {
            op,
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ProviderError::Api { .. } => "provider_api",
            ProviderError::NotFound { .. } => "provider_not_found",
            ProviderError::Timeout { .. } => "provider_timeout",
        }
    }

    /// Returns `true` if the error came from a wait-loop hard timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProviderError::Timeout { .. })
    }
}

/// # Orchestration-state failures.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    /// An orchestrator call failed.
    #[error("orchestrator call {op} failed: {reason}")]
    Api {
        /// Operation name (e.g. `remove_machine`).
        op: &'static str,
        /// Underlying error message.
        reason: String,
    },
}

impl OrchestratorError {
    /// Shorthand for [`OrchestratorError::Api`].
    pub fn api(op: &'static str, reason: impl Into<String>) -> Self {
        OrchestratorError::Api {
            op,
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            OrchestratorError::Api { .. } => "orchestrator_api",
        }
    }
}

/// # Fatal errors of the operation runner.
///
/// Per-intent failures never surface here; they become
/// [`Outcome::Failed`](crate::Outcome::Failed) results.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunnerError {
    /// The batch cannot make progress with the current configuration.
    #[error("runner cannot start: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl RunnerError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RunnerError::Configuration(e) => e.as_label(),
        }
    }
}

/// # Errors that abort a whole command.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CommandError {
    /// A precondition did not hold; nothing was mutated.
    #[error("precondition failed: {0}")]
    Precheck(String),

    /// Caller contract violation.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A provider call the command depends on failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// An orchestrator call the command depends on failed.
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    /// The operation runner refused the batch.
    #[error(transparent)]
    Runner(#[from] RunnerError),
}

impl CommandError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            CommandError::Precheck(_) => "command_precheck",
            CommandError::Configuration(e) => e.as_label(),
            CommandError::Provider(e) => e.as_label(),
            CommandError::Orchestrator(e) => e.as_label(),
            CommandError::Runner(e) => e.as_label(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        let err = ProviderError::Timeout {
            what: "server vm-1".into(),
            ticks: 25,
            elapsed: Duration::from_secs(200),
            diagnostic: "Building".into(),
        };
        assert_eq!(err.as_label(), "provider_timeout");
        assert!(err.is_timeout());
        assert!(!ProviderError::api("list_instances", "503").is_timeout());

        let cmd: CommandError = ConfigurationError::InvalidPoolSize { size: 0 }.into();
        assert_eq!(cmd.as_label(), "config_invalid_pool_size");
    }

    #[test]
    fn timeout_message_carries_diagnostic() {
        let err = ProviderError::Timeout {
            what: "port p-1".into(),
            ticks: 3,
            elapsed: Duration::from_secs(24),
            diagnostic: "\"DOWN\"".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("port p-1"));
        assert!(msg.contains("3 checks"));
        assert!(msg.contains("DOWN"));
    }
}
