//! # provisor
//!
//! **Provisor** provisions and tears down cloud virtual machines for a cluster
//! orchestrator, keeping the orchestrator's machine inventory and the cloud provider's
//! instance inventory consistent.
//!
//! The two inventories drift: addresses change, the orchestrator sometimes reports an
//! instance *name* where an id is expected, and deletions complete asynchronously. The
//! core reconciles both views into explicit teardown work and executes it with bounded
//! parallelism, reporting every machine's fate.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   OrchestratorGateway::status()        ProviderGateway::list_instances()
//!          │ MachineRecord                         │ ProviderInstance
//!          └───────────────┬───────────────────────┘
//!                          ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Reconciler (pure)                                                │
//! │  - address index, name fallback                                   │
//! │  - Full / EnvOnly / ProviderOnly intents, Ambiguity on misses     │
//! └─────────────────────────────┬─────────────────────────────────────┘
//!                               ▼ Vec<TerminationIntent>
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  OperationRunner                                                  │
//! │  - semaphore (max_concurrent), cancellation token                 │
//! │  - one worker per intent: destroy ─► WaitLoop ─► remove record    │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!   OperationResult    OperationResult    OperationResult   (Drain stream)
//!
//!   Reconciler / workers / WaitLoop / commands
//!        │ publish(Event)
//!        ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                   Bus (broadcast channel)                         │
//! │                  (capacity: Config::bus_capacity)                 │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │   listener (Provisor)  │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                        ┌──────────┼──────────┐
//!                        ▼          ▼          ▼
//!                    LogWriter   Recorder    custom
//!                    (tracing)  (in-memory)
//! ```
//!
//! ### Intent lifecycle
//! ```text
//! Full:         destroy_instance ─► [WaitLoop: gone?] ─► remove_machine
//!                 └─ Err ─► Failed(Provider), record kept
//!                                                   └─ Err ─► Failed(StaleRecord)
//! EnvOnly:      remove_machine ─► Err ─► Failed(Orchestrator)
//! ProviderOnly: destroy_instance ─► [WaitLoop: gone?]
//! not started:  Cancelled
//! ```
//!
//! ## Features
//! | Area               | Description                                                   | Key types / traits                              |
//! |--------------------|---------------------------------------------------------------|-------------------------------------------------|
//! | **Reconciliation** | Map machine records to provider instances.                    | [`Reconciler`], [`TerminationIntent`]           |
//! | **Execution**      | Bounded-parallel teardown, one result per intent.             | [`OperationRunner`], [`Drain`], [`OperationResult`] |
//! | **Polling**        | Bounded waits for eventual consistency.                       | [`WaitLoop`], [`WaitPolicy`], [`JitterPolicy`]  |
//! | **Commands**       | Bootstrap, add, terminate, destroy, list.                     | [`Bootstrap`], [`DestroyEnvironment`], ...      |
//! | **Gateways**       | Narrow async interfaces to the provider and the orchestrator. | [`ProviderGateway`], [`OrchestratorGateway`]    |
//! | **Subscriber API** | Hook into runtime events (logging, progress, audit).          | [`Subscribe`], [`LogWriter`], [`Recorder`]      |
//! | **Errors**         | Typed errors with stable log labels.                          | [`ConfigurationError`], [`CommandError`], ...   |
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use provisor::{
//!     Config, DestroyEnvironment, LogWriter, OrchestratorGateway, ProviderGateway,
//!     ProvisorBuilder, Subscribe,
//! };
//!
//! async fn teardown(
//!     provider: Arc<dyn ProviderGateway>,
//!     orchestrator: Arc<dyn OrchestratorGateway>,
//! ) -> Result<(), Box<dyn std::error::Error>> {
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
//!     let provisor = ProvisorBuilder::new(Config::default(), "lab", provider, orchestrator)
//!         .with_subscribers(subs)
//!         .build()?;
//!
//!     let report = DestroyEnvironment::new().run(&provisor).await?;
//!     println!("{}", report.machines);
//!
//!     provisor.shutdown().await;
//!     Ok(())
//! }
//! ```
mod commands;
mod config;
mod core;
mod error;
mod events;
mod gateway;
mod model;
mod policies;
mod subscribers;

#[cfg(test)]
mod testing;

// ---- Public re-exports ----

pub use commands::{
    AddMachines, BatchReport, Bootstrap, DestroyEnvironment, ListMachines, ProvisionFailure,
    ProvisionReport, StateServerOutcome, TeardownReport, TerminateMachines, render_table,
};
pub use config::{Catalog, Config, FlavorConstraints, NetworkSpec, ProviderSettings};
pub use core::{
    Drain, OperationRunner, Probe, Provisor, ProvisorBuilder, Reconciler, WaitLoop, WaitOutcome,
};
pub use error::{CommandError, ConfigurationError, OrchestratorError, ProviderError, RunnerError};
pub use events::{Bus, Event, EventKind};
pub use gateway::{EnvironmentAdmin, NetworkGateway, OrchestratorGateway, ProviderGateway};
pub use model::{
    Ambiguity, InstanceParams, InstanceStatus, IntentError, MachineRecord, Network,
    OperationResult, Outcome, Port, PortStatus, ProviderInstance, Resolution, STATE_SERVER_ID,
    TerminationIntent, TerminationMode,
};
pub use policies::{JitterPolicy, WaitPolicy};
pub use subscribers::{LogWriter, Recorder, Subscribe, SubscriberSet};
