//! # Event subscriber trait.
//!
//! Provides [`Subscribe`], the extension point for plugging event handlers (logging,
//! audit trails, progress bars) into the runtime.
//!
//! Each subscriber gets a dedicated worker task, a bounded queue
//! (capacity via [`Subscribe::queue_capacity`]) and panic isolation
//! (panics are caught and reported as `EventKind::SubscriberPanicked`).
//!
//! A slow subscriber only fills its own queue: once full, further events are dropped
//! for that subscriber alone and `EventKind::SubscriberOverflow` is published. Each
//! subscriber sees events one at a time, in the order the listener received them.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use provisor::{Event, EventKind, Subscribe};
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if matches!(ev.kind, EventKind::IntentFailed) {
//!             // bump a counter, page someone, ...
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "failures" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Consumer of runtime events.
///
/// `on_event` runs on the subscriber's own worker, so it may await freely; blocking
/// calls still stall that worker and fill its queue.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event. Errors should be dealt with here; a panic is caught and reported.
    async fn on_event(&self, event: &Event);

    /// Label used in overflow and panic reports. Defaults to the type name.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Events buffered for this subscriber before new ones are dropped.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
