//! # Broadcast bus for runtime events.
//!
//! Workers, wait loops and commands publish into one [`Bus`]; the listener owned by
//! [`Provisor`](crate::Provisor) is the only long-lived receiver and forwards each event
//! to the [`SubscriberSet`](crate::SubscriberSet).
//!
//! ```text
//!   worker ───┐
//!   worker ───┤
//!   WaitLoop ─┼──► Bus ──► listener ──► SubscriberSet
//!   command ──┘
//! ```
//!
//! Delivery is best effort. Publishing never waits, events sent while nobody listens
//! are gone, and a receiver that falls more than `capacity` events behind gets
//! `RecvError::Lagged(n)` and resumes from the oldest retained event.

use tokio::sync::broadcast;

use super::event::Event;

/// Many-producer, many-consumer channel of [`Event`]s.
///
/// Cloning is cheap and every clone publishes into the same ring buffer.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus retaining at most `capacity` undelivered events (at least one).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Sends `ev` to every current receiver. A bus without receivers drops it.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Opens a receiver that sees events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
