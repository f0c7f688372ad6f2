//! # Execute a single termination intent.
//!
//! Runs one [`TerminationIntent`] against the gateways and publishes its lifecycle to the
//! [`Bus`].
//!
//! ## Event flow
//! ```text
//! Full:
//!   IntentStarting → destroy_instance → [wait gone] → InstanceDestroyed
//!                  → remove_machine → IntentSucceeded
//!
//! EnvOnly:
//!   IntentStarting → remove_machine → IntentSucceeded
//!
//! ProviderOnly:
//!   IntentStarting → destroy_instance → [wait gone] → InstanceDestroyed → IntentSucceeded
//!
//! Any failure or panic:
//!   ... → IntentFailed
//! ```
//!
//! ## Rules
//! - Always publishes **exactly one** terminal event: `IntentSucceeded` or `IntentFailed`
//! - A provider failure skips the orchestrator removal; the record stays for a retry
//! - An orchestrator failure after a successful destroy is a
//!   [`IntentError::StaleRecord`]
//! - A panic inside the intent becomes [`IntentError::WorkerPanicked`]; the batch goes on

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use crate::core::wait::{Probe, WaitLoop};
use crate::error::ProviderError;
use crate::events::{Bus, Event, EventKind};
use crate::gateway::{OrchestratorGateway, ProviderGateway};
use crate::model::{
    InstanceStatus, IntentError, OperationResult, Outcome, TerminationIntent, TerminationMode,
};
use crate::subscribers::panic_message;

/// Shared by every worker of a batch.
pub(crate) struct Executor {
    pub(crate) provider: Arc<dyn ProviderGateway>,
    pub(crate) orchestrator: Arc<dyn OrchestratorGateway>,
    pub(crate) waiter: WaitLoop,
    pub(crate) confirm_destroy: bool,
    pub(crate) bus: Bus,
}

impl Executor {
    /// Executes `intent` and returns its result. Never panics.
    pub(crate) async fn run(&self, intent: TerminationIntent) -> OperationResult {
        self.publish(EventKind::IntentStarting, &intent);

        let outcome = match AssertUnwindSafe(self.execute(&intent))
            .catch_unwind()
            .await
        {
            Ok(Ok(())) => Outcome::Succeeded,
            Ok(Err(e)) => Outcome::Failed(e),
            Err(panic) => Outcome::Failed(IntentError::WorkerPanicked(panic_message(&*panic))),
        };

        match &outcome {
            Outcome::Failed(e) => {
                self.bus.publish(
                    intent_event(EventKind::IntentFailed, &intent).with_reason(e.to_string()),
                );
            }
            _ => self.publish(EventKind::IntentSucceeded, &intent),
        }
        OperationResult { intent, outcome }
    }

    async fn execute(&self, intent: &TerminationIntent) -> Result<(), IntentError> {
        match intent.mode {
            TerminationMode::EnvOnly => self
                .orchestrator
                .remove_machine(&intent.machine_id)
                .await
                .map_err(IntentError::Orchestrator),
            TerminationMode::ProviderOnly => {
                self.destroy(intent).await.map_err(IntentError::Provider)
            }
            TerminationMode::Full => {
                self.destroy(intent).await.map_err(IntentError::Provider)?;
                self.orchestrator
                    .remove_machine(&intent.machine_id)
                    .await
                    .map_err(IntentError::StaleRecord)
            }
        }
    }

    async fn destroy(&self, intent: &TerminationIntent) -> Result<(), ProviderError> {
        let instance_id =
            intent
                .instance_id
                .as_deref()
                .ok_or_else(|| ProviderError::NotFound {
                    what: format!("instance of machine {}", intent.machine_id),
                })?;

        self.provider.destroy_instance(instance_id).await?;
        if self.confirm_destroy {
            self.await_gone(instance_id).await?;
        }
        self.publish(EventKind::InstanceDestroyed, intent);
        Ok(())
    }

    /// Polls the provider until the instance is no longer listed or reports deleted.
    async fn await_gone(&self, instance_id: &str) -> Result<(), ProviderError> {
        let provider = &self.provider;
        self.waiter
            .wait(&format!("deletion of instance {instance_id}"), || async move {
                let listed = provider.list_instances().await?;
                Ok(match listed.into_iter().find(|i| i.id == instance_id) {
                    None => Probe::Ready(InstanceStatus::Deleted),
                    Some(i) if i.status == InstanceStatus::Deleted => Probe::Ready(i.status),
                    Some(i) => Probe::Pending(i.status),
                })
            })
            .await
            .map(|_| ())
    }

    fn publish(&self, kind: EventKind, intent: &TerminationIntent) {
        self.bus.publish(intent_event(kind, intent));
    }
}

fn intent_event(kind: EventKind, intent: &TerminationIntent) -> Event {
    let ev = Event::new(kind).with_machine(intent.machine_id.as_str());
    match &intent.instance_id {
        Some(id) => ev.with_instance(id.as_str()),
        None => ev,
    }
}
