//! # Recorder — keeps every event in memory.
//!
//! Useful for command-line front ends that print a summary after a batch and for tests
//! that assert on the event stream. Events are kept in arrival order; sort by
//! [`Event::seq`](crate::Event::seq) to restore publication order.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// In-memory event sink.
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<Event>>,
}

impl Recorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every recorded event, ordered by sequence number.
    pub fn events(&self) -> Vec<Event> {
        let mut events = match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        events.sort_by_key(|e| e.seq);
        events
    }

    /// Returns the kinds of every recorded event, ordered by sequence number.
    pub fn kinds(&self) -> Vec<EventKind> {
        self.events().into_iter().map(|e| e.kind).collect()
    }

    /// Returns the recorded events of one kind.
    pub fn of_kind(&self, kind: EventKind) -> Vec<Event> {
        self.events().into_iter().filter(|e| e.kind == kind).collect()
    }

    /// Records an event synchronously.
    pub fn record(&self, event: &Event) {
        match self.events.lock() {
            Ok(mut guard) => guard.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}

#[async_trait]
impl Subscribe for Recorder {
    async fn on_event(&self, event: &Event) {
        self.record(event);
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}
