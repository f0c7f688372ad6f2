//! Reconciliation core: planning, bounded execution and polling.
//!
//! - [`reconciler`]: maps orchestrator records to provider instances, producing intents;
//! - [`runner`]: executes intents on a bounded worker pool, one result per intent;
//! - [`executor`]: runs one intent against the gateways and publishes its lifecycle;
//! - [`wait`]: bounded polling of asynchronous provider operations;
//! - [`provisor`] / [`builder`]: the shared context commands run against.

mod builder;
mod executor;
mod provisor;
mod reconciler;
mod runner;
mod wait;

pub use builder::ProvisorBuilder;
pub use provisor::Provisor;
pub use reconciler::Reconciler;
pub use runner::{Drain, OperationRunner};
pub use wait::{Probe, WaitLoop, WaitOutcome};
