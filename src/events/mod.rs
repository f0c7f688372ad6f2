//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the reconciler, the operation runner,
//! wait loops, commands and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `OperationRunner` workers, `WaitLoop`, commands,
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the listener spawned by `ProvisorBuilder::build`, which fans out to
//!   `SubscriberSet`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
