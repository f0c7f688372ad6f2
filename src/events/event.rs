//! # Runtime events emitted by the reconciler, the operation runner and wait loops.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Reconciliation events**: mapping outcomes worth an operator's attention
//! - **Intent events**: per-machine execution flow (starting, destroyed, succeeded, failed)
//! - **Wait events**: polling progress of asynchronous provider operations
//! - **Subscriber events**: delivery problems of the fan-out itself
//!
//! The [`Event`] struct carries additional metadata such as timestamps, machine and
//! instance ids, reasons, and tick counts.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use provisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::IntentFailed)
//!     .with_machine("3")
//!     .with_instance("vm-42")
//!     .with_reason("provider call destroy_instance failed: 503");
//!
//! assert_eq!(ev.kind, EventKind::IntentFailed);
//! assert_eq!(ev.machine.as_deref(), Some("3"));
//! assert_eq!(ev.instance.as_deref(), Some("vm-42"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `subject`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `subject`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Reconciliation events ===
    /// A machine record could not be mapped to a provider instance; it will be
    /// removed from orchestrator state only.
    ///
    /// Sets:
    /// - `machine`: orchestrator machine id
    /// - `reason`: ambiguity description
    MachineUnresolved,

    // === Intent lifecycle events ===
    /// A worker picked up an intent.
    ///
    /// Sets:
    /// - `machine`: orchestrator machine id (or instance name for provider-only intents)
    /// - `instance`: provider instance id, if any
    IntentStarting,

    /// The provider accepted the destroy (and, if confirmation is on, the instance is gone).
    ///
    /// Sets:
    /// - `machine`, `instance`
    InstanceDestroyed,

    /// The intent completed successfully.
    ///
    /// Sets:
    /// - `machine`, `instance`
    IntentSucceeded,

    /// The intent failed.
    ///
    /// Sets:
    /// - `machine`, `instance`
    /// - `reason`: failure message
    IntentFailed,

    /// The intent was never started because the batch was cancelled.
    ///
    /// Sets:
    /// - `machine`
    IntentCancelled,

    /// Every submitted intent has a result.
    ///
    /// Sets:
    /// - `count`: number of results delivered
    BatchDrained,

    // === Wait events ===
    /// A wait is past its soft threshold; carries the latest diagnostic.
    ///
    /// Sets:
    /// - `subject`: what is awaited
    /// - `tick`: checks performed so far
    /// - `reason`: debug rendering of the diagnostic
    WaitOverdue,

    /// A wait finished successfully.
    ///
    /// Sets:
    /// - `subject`, `tick`
    WaitCompleted,

    /// A wait hit its hard limit.
    ///
    /// Sets:
    /// - `subject`, `tick`
    /// - `reason`: debug rendering of the last diagnostic
    WaitTimedOut,

    // === Provisioning events ===
    /// A machine was created and reported active.
    ///
    /// Sets:
    /// - `machine`: instance name
    /// - `instance`: provider instance id
    InstanceLaunched,

    /// The orchestrator environment was destroyed.
    EnvironmentDestroyed,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Orchestrator machine id (or instance name for provider-only work).
    pub machine: Option<Arc<str>>,
    /// Provider instance id.
    pub instance: Option<Arc<str>>,
    /// What a wait loop is awaiting, or a subscriber name.
    pub subject: Option<Arc<str>>,
    /// Human-readable reason (errors, diagnostics, overflow details).
    pub reason: Option<Arc<str>>,
    /// Wait-loop check count (starting from 1).
    pub tick: Option<u32>,
    /// Result count for batch-level events.
    pub count: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            machine: None,
            instance: None,
            subject: None,
            reason: None,
            tick: None,
            count: None,
        }
    }

    /// Attaches a machine id.
    #[inline]
    pub fn with_machine(mut self, machine: impl Into<Arc<str>>) -> Self {
        self.machine = Some(machine.into());
        self
    }

    /// Attaches an instance id if present.
    #[inline]
    pub fn with_instance(mut self, instance: impl Into<Arc<str>>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    /// Attaches the subject of a wait (or a subscriber name).
    #[inline]
    pub fn with_subject(mut self, subject: impl Into<Arc<str>>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a wait-loop tick count.
    #[inline]
    pub fn with_tick(mut self, tick: u32) -> Self {
        self.tick = Some(tick);
        self
    }

    /// Attaches a result count (saturating at `u32::MAX`).
    #[inline]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(u32::try_from(count).unwrap_or(u32::MAX));
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_subject(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_subject(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}
