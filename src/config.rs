//! # Runtime configuration.
//!
//! Provides [`Config`], the centralized settings for the reconciliation core and commands,
//! and [`Catalog`], the read-only provider tables (flavor constraints, image, private network)
//! threaded into commands at construction time.
//!
//! ## Sentinel values
//! - `settle = 0s` → no pause between machine teardown and environment destroy
//!
//! `max_concurrent = 0` is rejected by the runner: an unbounded destroy batch against a
//! cloud API is throttled into failure.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use provisor::Config;
//!
//! let mut cfg = Config::default();
//! cfg.max_concurrent = 8;
//! cfg.wait.interval = Duration::from_secs(4);
//!
//! assert_eq!(cfg.max_concurrent, 8);
//! assert_eq!(cfg.wait.hard_ticks, 25);
//! ```

use std::time::Duration;

use tokio::sync::Semaphore;

use crate::error::ConfigurationError;
use crate::policies::WaitPolicy;

/// Global configuration for the runner, wait loops and commands.
///
/// ## Field semantics
/// - `max_concurrent`: worker pool size for the operation runner
///   (`1..=Semaphore::MAX_PERMITS`)
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
/// - `wait`: polling policy for every asynchronous provider operation
/// - `confirm_destroy`: await instance disappearance before removing the orchestrator record
/// - `settle`: pause between draining machine teardown and destroying the environment
/// - `catalog`: provider tables used when creating machines
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum number of intents executing at once.
    pub max_concurrent: usize,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages will
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,

    /// Polling policy used by [`WaitLoop`](crate::WaitLoop).
    pub wait: WaitPolicy,

    /// Poll the provider after a destroy until the instance is gone.
    pub confirm_destroy: bool,

    /// The orchestrator marks machines dead asynchronously; environment destroy
    /// waits this long after the last machine removal.
    pub settle: Duration,

    /// Read-only provider tables.
    pub catalog: Catalog,
}

impl Config {
    /// Returns the worker pool size, rejecting `0` and sizes a semaphore cannot hold.
    pub fn pool_size(&self) -> Result<usize, ConfigurationError> {
        match self.max_concurrent {
            n if (1..=Semaphore::MAX_PERMITS).contains(&n) => Ok(n),
            n => Err(ConfigurationError::InvalidPoolSize { size: n }),
        }
    }

    /// Returns the settle delay as an `Option` (`None` for `0s`).
    #[inline]
    pub fn settle_delay(&self) -> Option<Duration> {
        if self.settle == Duration::ZERO {
            None
        } else {
            Some(self.settle)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `max_concurrent = 4`
    /// - `bus_capacity = 1024`
    /// - `wait = WaitPolicy::default()` (8s interval, diagnostics after 8, timeout after 25)
    /// - `confirm_destroy = true`
    /// - `settle = 10s`
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            bus_capacity: 1024,
            wait: WaitPolicy::default(),
            confirm_destroy: true,
            settle: Duration::from_secs(10),
            catalog: Catalog::default(),
        }
    }
}

/// Hardware constraints a flavor must satisfy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlavorConstraints {
    /// Exact RAM in MiB.
    pub ram_mb: u32,
    /// Exact virtual CPU count.
    pub vcpus: u32,
    /// Minimum disk in GiB (inclusive).
    pub min_disk_gb: u32,
    /// Maximum disk in GiB (inclusive).
    pub max_disk_gb: u32,
}

impl FlavorConstraints {
    /// Returns `true` if a flavor with the given shape satisfies the constraints.
    pub fn matches(&self, ram_mb: u32, vcpus: u32, disk_gb: u32) -> bool {
        ram_mb == self.ram_mb
            && vcpus == self.vcpus
            && (self.min_disk_gb..=self.max_disk_gb).contains(&disk_gb)
    }
}

impl Default for FlavorConstraints {
    fn default() -> Self {
        Self {
            ram_mb: 2048,
            vcpus: 1,
            min_disk_gb: 1,
            max_disk_gb: 10,
        }
    }
}

/// Private network every machine of an environment is attached to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkSpec {
    /// Network name; used to find an existing network before creating one.
    pub name: String,
    /// Subnet in CIDR notation.
    pub cidr: String,
}

impl Default for NetworkSpec {
    fn default() -> Self {
        Self {
            name: "provisor private network".to_string(),
            cidr: "192.168.1.0/24".to_string(),
        }
    }
}

/// Read-only provider tables used when creating machines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
    /// Flavor every machine is created with.
    pub flavor: FlavorConstraints,
    /// Substring an image name must contain to be selected.
    pub image_pattern: String,
    /// Private network shared by the environment.
    pub network: NetworkSpec,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            flavor: FlavorConstraints::default(),
            image_pattern: "Ubuntu Server LTS".to_string(),
            network: NetworkSpec::default(),
        }
    }
}

/// Operator-provided settings read from the process environment.
///
/// Gateway implementations use these to authenticate and inject keys; the core never
/// reads the environment itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderSettings {
    /// Path to the public SSH key injected into new machines.
    pub ssh_key_path: String,
    /// Path to the provider client configuration file (optional).
    pub client_config_path: Option<String>,
    /// Name of the provider project machines are billed to.
    pub project: String,
}

impl ProviderSettings {
    /// SSH public key path.
    pub const SSH_KEY_VAR: &'static str = "OKEANOS_SSH_KEY";
    /// Client configuration path.
    pub const CLIENT_CONFIG_VAR: &'static str = "OKEANOS_KAMAKIRC";
    /// Project name.
    pub const PROJECT_VAR: &'static str = "OKEANOS_PROJECT";

    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through an arbitrary lookup (environment, test map, ...).
    ///
    /// Empty values are treated as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let ssh_key_path = get(Self::SSH_KEY_VAR).ok_or(ConfigurationError::MissingSetting {
            name: Self::SSH_KEY_VAR,
            hint: "set it to the path of your public ssh key",
        })?;
        let project = get(Self::PROJECT_VAR).ok_or(ConfigurationError::MissingSetting {
            name: Self::PROJECT_VAR,
            hint: "set it to the provider project new machines belong to",
        })?;

        Ok(Self {
            ssh_key_path,
            client_config_path: get(Self::CLIENT_CONFIG_VAR),
            project,
        })
    }
}
