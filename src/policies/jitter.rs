//! # Jitter policy for polling intervals.
//!
//! [`JitterPolicy`] adds randomness to wait intervals so that workers polling the same
//! provider concurrently do not hit its API in lockstep.
//!
//! - [`JitterPolicy::None`] — no randomization, predictable intervals
//! - [`JitterPolicy::Full`] — random interval in [0, interval]
//! - [`JitterPolicy::Equal`] — interval/2 + random[0, interval/2]

use rand::Rng;
use std::time::Duration;

/// Policy controlling randomization of polling intervals.
///
/// ## Trade-offs
/// - **None**: Predictable; tick counts map directly to elapsed time
/// - **Full**: Maximum spread, but a wait may finish its ticks much sooner
/// - **Equal**: Balanced; keeps at least half of every interval
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// No jitter: use the exact interval.
    #[default]
    None,

    /// Full jitter: random interval in [0, interval].
    Full,

    /// Equal jitter: interval/2 + random[0, interval/2].
    Equal,
}

impl JitterPolicy {
    /// Applies jitter to the given interval.
    pub fn apply(&self, interval: Duration) -> Duration {
        match self {
            JitterPolicy::None => interval,
            JitterPolicy::Full => full_jitter(interval),
            JitterPolicy::Equal => equal_jitter(interval),
        }
    }
}

/// Full jitter: random[0, interval]
fn full_jitter(interval: Duration) -> Duration {
    let ms = interval.as_millis() as u64;
    if ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::rng().random_range(0..=ms))
}

/// Equal jitter: interval/2 + random[0, interval/2]
fn equal_jitter(interval: Duration) -> Duration {
    let ms = interval.as_millis() as u64;
    if ms == 0 {
        return Duration::ZERO;
    }
    let half = ms / 2;
    let jitter = if half == 0 {
        0
    } else {
        rand::rng().random_range(0..=half)
    };
    Duration::from_millis(half + jitter)
}
