//! # Wait policy for eventual-consistency polling.
//!
//! [`WaitPolicy`] describes a bounded polling schedule:
//! - [`WaitPolicy::interval`] the delay before every check;
//! - [`WaitPolicy::soft_ticks`] after this many pending checks, every further check logs
//!   the last diagnostic value;
//! - [`WaitPolicy::hard_ticks`] the number of checks after which the wait fails.
//!
//! The soft threshold only changes observability, never behavior.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use provisor::{JitterPolicy, WaitPolicy};
//!
//! let policy = WaitPolicy {
//!     interval: Duration::from_secs(2),
//!     soft_ticks: 3,
//!     hard_ticks: 10,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(policy.delay(), Duration::from_secs(2));
//! assert!(!policy.is_overdue(3));
//! assert!(policy.is_overdue(4));
//! assert_eq!(policy.budget(), Duration::from_secs(20));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Bounded polling schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Delay before each check.
    pub interval: Duration,
    /// Pending checks tolerated before diagnostics are logged on every check.
    pub soft_ticks: u32,
    /// Checks after which the wait fails with a provider timeout (min 1).
    pub hard_ticks: u32,
    /// Randomization applied to each interval.
    pub jitter: JitterPolicy,
}

impl Default for WaitPolicy {
    /// Returns a policy with:
    /// - `interval = 8s` (server boot averages about a minute);
    /// - `soft_ticks = 8` (~64s before diagnostics);
    /// - `hard_ticks = 25` (~200s before giving up);
    /// - `jitter = None`.
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(8),
            soft_ticks: 8,
            hard_ticks: 25,
            jitter: JitterPolicy::None,
        }
    }
}

impl WaitPolicy {
    /// Returns the delay before the next check, with jitter applied.
    pub fn delay(&self) -> Duration {
        self.jitter.apply(self.interval)
    }

    /// Returns `true` once `ticks` pending checks exceed the soft threshold.
    #[inline]
    pub fn is_overdue(&self, ticks: u32) -> bool {
        ticks > self.soft_ticks
    }

    /// Returns the hard limit clamped to a minimum of 1.
    #[inline]
    pub fn hard_limit(&self) -> u32 {
        self.hard_ticks.max(1)
    }

    /// Returns the nominal time budget (`interval × hard_limit`), ignoring jitter.
    pub fn budget(&self) -> Duration {
        self.interval.saturating_mul(self.hard_limit())
    }
}
