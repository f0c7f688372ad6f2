//! Polling policies.
//!
//! This module groups the knobs that control **how often** and **how long** a
//! [`WaitLoop`](crate::WaitLoop) polls the provider while awaiting an asynchronous operation.
//!
//! ## Contents
//! - [`WaitPolicy`] interval, diagnostic threshold and hard limit
//! - [`JitterPolicy`] randomization of the interval so concurrent workers do not poll in lockstep
//!
//! ## Defaults
//! - `WaitPolicy::default()` → interval=8s, soft_ticks=8 (~64s), hard_ticks=25 (~200s), jitter=None.

mod jitter;
mod wait;

pub use jitter::JitterPolicy;
pub use wait::WaitPolicy;
