//! # WaitLoop: bounded polling of an asynchronous provider operation.
//!
//! Awaits eventual consistency (server boot, port attachment, server deletion) by
//! calling a check function once per interval until it reports ready or a hard limit
//! of checks is reached.
//!
//! ## States
//! ```text
//!            ┌──────── Pending (ticks <= hard) ────────┐
//!            ▼                                          │
//!  start ─► Polling ── sleep(interval) ── check() ──────┤
//!                                                       ├── Ready ─────────────► Done
//!                                                       └── Pending, ticks = hard ► TimedOut
//! ```
//!
//! ## Rules
//! - `check` is called exactly `n` times if it first reports ready on call `n`
//! - `check` is called exactly `hard_ticks` times if it never reports ready
//! - once `ticks > soft_ticks`, every pending check publishes `WaitOverdue` with the
//!   diagnostic (observability only)
//! - an `Err` from `check` ends the wait immediately with that error
//! - the loop ignores cancellation: an in-flight wait always runs to its own end so
//!   the provider is never left half-mutated by an abandoned caller
//!
//! Sleeping goes through `tokio::time`, so tests drive it with a paused clock.

use std::fmt::Debug;
use std::future::Future;

use tokio::time::{self, Instant};

use crate::error::ProviderError;
use crate::events::{Bus, Event, EventKind};
use crate::policies::WaitPolicy;

/// Result of one check.
///
/// Both variants carry the diagnostic value; a pending value is reported once the wait is
/// overdue and embedded in the timeout error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Probe<T> {
    /// The awaited condition holds.
    Ready(T),
    /// Not yet; keep polling.
    Pending(T),
}

/// Successful end of a wait.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WaitOutcome<T> {
    /// Number of checks performed, including the successful one.
    pub ticks: u32,
    /// Diagnostic value returned by the successful check.
    pub value: T,
}

/// What the loop does after a check.
#[derive(Debug, PartialEq, Eq)]
enum Transition<T> {
    Done(T),
    Continue { overdue: bool, diagnostic: T },
    TimedOut(T),
}

/// Tick accounting, separated from sleeping so it can be tested without a clock.
#[derive(Debug)]
struct Progress {
    ticks: u32,
    policy: WaitPolicy,
}

impl Progress {
    fn new(policy: &WaitPolicy) -> Self {
        Self {
            ticks: 0,
            policy: *policy,
        }
    }

    fn observe<T>(&mut self, probe: Probe<T>) -> Transition<T> {
        self.ticks += 1;
        match probe {
            Probe::Ready(value) => Transition::Done(value),
            Probe::Pending(diagnostic) if self.ticks >= self.policy.hard_limit() => {
                Transition::TimedOut(diagnostic)
            }
            Probe::Pending(diagnostic) => Transition::Continue {
                overdue: self.policy.is_overdue(self.ticks),
                diagnostic,
            },
        }
    }
}

/// Reusable bounded polling loop.
///
/// Cheap to clone; every clone publishes to the same bus.
#[derive(Clone, Debug)]
pub struct WaitLoop {
    policy: WaitPolicy,
    bus: Bus,
}

impl WaitLoop {
    /// Creates a wait loop with the given policy.
    pub fn new(policy: WaitPolicy, bus: Bus) -> Self {
        Self { policy, bus }
    }

    /// Returns the polling policy.
    pub fn policy(&self) -> &WaitPolicy {
        &self.policy
    }

    /// Polls `check` until it reports [`Probe::Ready`] or the hard limit is reached.
    ///
    /// `what` names the awaited thing in events and in the timeout error
    /// (e.g. `"server lab-0"`).
    ///
    /// # Errors
    /// - [`ProviderError::Timeout`] after `hard_ticks` pending checks, carrying the last
    ///   diagnostic
    /// - any error returned by `check`
    pub async fn wait<T, F, Fut>(
        &self,
        what: &str,
        mut check: F,
    ) -> Result<WaitOutcome<T>, ProviderError>
    where
        T: Debug,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Probe<T>, ProviderError>>,
    {
        let started = Instant::now();
        let mut progress = Progress::new(&self.policy);

        loop {
            time::sleep(self.policy.delay()).await;

            match progress.observe(check().await?) {
                Transition::Done(value) => {
                    tracing::debug!(what, ticks = progress.ticks, "wait completed");
                    self.bus.publish(
                        Event::new(EventKind::WaitCompleted)
                            .with_subject(what)
                            .with_tick(progress.ticks),
                    );
                    return Ok(WaitOutcome {
                        ticks: progress.ticks,
                        value,
                    });
                }
                Transition::Continue {
                    overdue: true,
                    diagnostic,
                } => {
                    let rendered = format!("{diagnostic:?}");
                    tracing::debug!(what, ticks = progress.ticks, diagnostic = %rendered, "still waiting");
                    self.bus.publish(
                        Event::new(EventKind::WaitOverdue)
                            .with_subject(what)
                            .with_tick(progress.ticks)
                            .with_reason(rendered),
                    );
                }
                Transition::Continue { overdue: false, .. } => {}
                Transition::TimedOut(diagnostic) => {
                    let diagnostic = format!("{diagnostic:?}");
                    self.bus.publish(
                        Event::new(EventKind::WaitTimedOut)
                            .with_subject(what)
                            .with_tick(progress.ticks)
                            .with_reason(diagnostic.clone()),
                    );
                    return Err(ProviderError::Timeout {
                        what: what.to_string(),
                        ticks: progress.ticks,
                        elapsed: started.elapsed(),
                        diagnostic,
                    });
                }
            }
        }
    }
}
