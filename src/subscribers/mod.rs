//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait and built-in implementations
//! for handling events broadcast through the [`Bus`](crate::events::Bus).
//!
//! ```text
//! Worker ── publish(Event) ──► Bus ──► listener ──► SubscriberSet
//!                                                      ├──► LogWriter (tracing)
//!                                                      ├──► Recorder  (in-memory)
//!                                                      └──► custom ...
//! ```
//!
//! ## Built-in subscribers
//! - [`LogWriter`] forwards events to `tracing` at a level matching their severity
//! - [`Recorder`] keeps every event for later inspection

mod log;
mod recorder;
mod set;
mod subscriber;

pub use log::LogWriter;
pub use recorder::Recorder;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;

pub(crate) use set::panic_message;
