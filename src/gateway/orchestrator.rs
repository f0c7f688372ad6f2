//! # Orchestrator capabilities.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::OrchestratorError;
use crate::model::MachineRecord;

/// Machine inventory calls against the orchestration environment.
///
/// Removal calls must be safe to repeat: callers retry stale records.
#[async_trait]
pub trait OrchestratorGateway: Send + Sync + 'static {
    /// Returns the current machine inventory keyed by machine id.
    async fn status(&self) -> Result<BTreeMap<String, MachineRecord>, OrchestratorError>;

    /// Removes a machine from orchestrator state.
    async fn remove_machine(&self, machine_id: &str) -> Result<(), OrchestratorError>;

    /// Destroys the environment. Machines other than the state server must be gone.
    async fn destroy_environment(&self) -> Result<(), OrchestratorError>;
}

/// Environment administration used by the provisioning and force-teardown commands.
#[async_trait]
pub trait EnvironmentAdmin: Send + Sync + 'static {
    /// Returns `true` if the environment already has a running state server.
    async fn is_bootstrapped(&self) -> Result<bool, OrchestratorError>;

    /// Bootstraps the environment on the machine at `address`.
    async fn bootstrap(&self, address: &str) -> Result<(), OrchestratorError>;

    /// Registers an existing machine, e.g. `ssh:root@10.0.0.5`.
    async fn add_machine(&self, spec: &str) -> Result<(), OrchestratorError>;

    /// Forgets the local environment cache without talking to the state server.
    async fn discard_environment(&self) -> Result<(), OrchestratorError>;
}
