//! # DestroyEnvironment: tear down every machine, the environment, then the state server.
//!
//! ## Normal
//! ```text
//! status() + list_instances()          (one snapshot for the whole command)
//!   ──► plan(all except "0") ──► drain ──► BatchReport
//!   ──► not clean? ──► stop: environment and state server kept
//!   ──► sleep(settle) ──► destroy_environment()
//!   ──► state server resolved in the snapshot ──► provider-only intent
//! ```
//!
//! ## Force
//! ```text
//! list_instances() ──► every `<env>-*` instance ──► provider-only intents ──► drain
//!   ──► discard_environment()
//! ```
//! Force never reads orchestrator state, so it works when the state server is gone.

use tokio::time;

use super::report::{BatchReport, StateServerOutcome, TeardownReport};
use crate::core::Provisor;
use crate::error::CommandError;
use crate::events::{Event, EventKind};
use crate::model::{STATE_SERVER_ID, TerminationIntent};

/// Destroys a whole environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct DestroyEnvironment {
    /// Skip the orchestrator and destroy by naming convention.
    pub force: bool,
}

impl DestroyEnvironment {
    /// Normal teardown through the orchestrator.
    pub fn new() -> Self {
        Self { force: false }
    }

    /// Teardown by naming convention, for environments whose state server is unreachable.
    pub fn forced() -> Self {
        Self { force: true }
    }

    /// Runs the command.
    pub async fn run(&self, p: &Provisor) -> Result<TeardownReport, CommandError> {
        if self.force {
            self.force_destroy(p).await
        } else {
            self.destroy(p).await
        }
    }

    async fn destroy(&self, p: &Provisor) -> Result<TeardownReport, CommandError> {
        let status = p.orchestrator().status().await?;
        let instances = p.provider().list_instances().await?;
        let reconciler = p.reconciler();

        let intents = reconciler.plan(status.values(), &instances, &[STATE_SERVER_ID])?;
        let mut runner = p.runner();
        runner.submit_all(intents);
        let machines = BatchReport::new(runner.drain().await?);

        if !machines.is_clean() {
            tracing::warn!(
                environment = p.environment(),
                failed = machines.failed().count(),
                cancelled = machines.cancelled().count(),
                "machine teardown incomplete; keeping the environment"
            );
            return Ok(TeardownReport {
                machines,
                environment_destroyed: false,
                state_server: StateServerOutcome::Kept,
            });
        }

        if let Some(settle) = p.config().settle_delay().filter(|_| !machines.is_empty()) {
            time::sleep(settle).await;
        }
        p.orchestrator().destroy_environment().await?;
        p.bus().publish(Event::new(EventKind::EnvironmentDestroyed));

        let server_record = status.values().find(|r| r.is_state_server());
        let state_server = match reconciler.state_server(server_record, &instances) {
            Some(server) => {
                runner.submit(TerminationIntent::provider_only(&server.name, &server.id));
                match runner.drain().await?.pop() {
                    Some(result) => StateServerOutcome::Terminated(result),
                    None => StateServerOutcome::Unresolved,
                }
            }
            None => {
                tracing::warn!(
                    environment = p.environment(),
                    "state server instance not found; nothing left to destroy"
                );
                StateServerOutcome::Unresolved
            }
        };

        Ok(TeardownReport {
            machines,
            environment_destroyed: true,
            state_server,
        })
    }

    async fn force_destroy(&self, p: &Provisor) -> Result<TeardownReport, CommandError> {
        let admin = p.admin()?;
        let instances = p.provider().list_instances().await?;

        let mut runner = p.runner();
        runner.submit_all(p.reconciler().by_naming_convention(&instances));
        let machines = BatchReport::new(runner.drain().await?);

        admin.discard_environment().await?;
        p.bus().publish(Event::new(EventKind::EnvironmentDestroyed));

        Ok(TeardownReport {
            machines,
            environment_destroyed: true,
            state_server: StateServerOutcome::InBatch,
        })
    }
}
