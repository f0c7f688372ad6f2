//! # LogWriter — structured event logging.
//!
//! A subscriber that turns every [`Event`] into a `tracing` record. Install any
//! `tracing` subscriber in the binary to see them.
//!
//! ## Levels
//! - `warn`: unresolved machines, failed intents, wait timeouts, subscriber trouble
//! - `info`: successful intents, launched instances, batch and environment teardown
//! - `debug`: intent start, provider-side destroy, overdue waits, wait completion
//!
//! ## Example output (fmt subscriber)
//! ```text
//! WARN provisor: machine unresolved machine="4" reason="no provider instance at address 10.0.0.9"
//! DEBUG provisor: wait overdue subject="server vm-7" tick=9 diagnostic="Building"
//! INFO provisor: intent succeeded machine="2" instance="vm-2"
//! WARN provisor: intent failed machine="3" instance="vm-3" error="provider call destroy_instance failed: 503"
//! INFO provisor: batch drained results=3
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let machine = e.machine.as_deref().unwrap_or("-");
        let instance = e.instance.as_deref().unwrap_or("-");
        let subject = e.subject.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("");

        match e.kind {
            EventKind::MachineUnresolved => {
                tracing::warn!(machine, reason, "machine unresolved");
            }
            EventKind::IntentStarting => {
                tracing::debug!(machine, instance, "intent starting");
            }
            EventKind::InstanceDestroyed => {
                tracing::debug!(machine, instance, "instance destroyed");
            }
            EventKind::IntentSucceeded => {
                tracing::info!(machine, instance, "intent succeeded");
            }
            EventKind::IntentFailed => {
                tracing::warn!(machine, instance, error = reason, "intent failed");
            }
            EventKind::IntentCancelled => {
                tracing::warn!(machine, "intent cancelled before start");
            }
            EventKind::BatchDrained => {
                tracing::info!(results = e.count.unwrap_or(0), "batch drained");
            }
            EventKind::WaitOverdue => {
                tracing::debug!(subject, tick = e.tick, diagnostic = reason, "wait overdue");
            }
            EventKind::WaitCompleted => {
                tracing::debug!(subject, tick = e.tick, "wait completed");
            }
            EventKind::WaitTimedOut => {
                tracing::warn!(subject, tick = e.tick, diagnostic = reason, "wait timed out");
            }
            EventKind::InstanceLaunched => {
                tracing::info!(machine, instance, "instance launched");
            }
            EventKind::EnvironmentDestroyed => {
                tracing::info!("environment destroyed");
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(subscriber = subject, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                tracing::error!(subscriber = subject, info = reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
