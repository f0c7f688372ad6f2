//! # Data model shared by the reconciler, the runner and the commands.
//!
//! - [`MachineRecord`] - the orchestrator's view of a machine
//! - [`ProviderInstance`] / [`InstanceStatus`] - the provider's view of a virtual machine
//! - [`TerminationIntent`] / [`TerminationMode`] / [`Resolution`] / [`Ambiguity`] - planned work
//! - [`OperationResult`] / [`Outcome`] / [`IntentError`] - what happened to it

mod instance;
mod intent;
mod machine;
mod outcome;

pub use instance::{InstanceParams, InstanceStatus, Network, Port, PortStatus, ProviderInstance};
pub use intent::{Ambiguity, Resolution, TerminationIntent, TerminationMode};
pub use machine::{MachineRecord, STATE_SERVER_ID};
pub use outcome::{IntentError, OperationResult, Outcome};
