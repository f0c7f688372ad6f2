//! # Termination intents: planned, not-yet-executed teardown work.
//!
//! An intent is created by the [`Reconciler`](crate::Reconciler), consumed exactly once by
//! the [`OperationRunner`](crate::OperationRunner) and then discarded.

use std::fmt;

/// What an intent is allowed to touch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminationMode {
    /// Destroy the provider instance, then remove the orchestrator record.
    Full,
    /// Remove the orchestrator record only; no provider instance could be identified.
    EnvOnly,
    /// Destroy the provider instance only; no orchestrator record is involved.
    ProviderOnly,
}

/// Why a record could not be mapped to exactly one provider instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ambiguity {
    /// The address hint matched no instance and there was no usable instance id.
    AddressNotFound {
        /// The stale address.
        address: String,
    },
    /// No instance carries the hinted name.
    NoNameMatch {
        /// The instance id hint used as a name.
        name: String,
    },
    /// Several instances carry the hinted name; none is picked.
    MultipleNameMatches {
        /// The instance id hint used as a name.
        name: String,
        /// Number of candidates.
        count: usize,
    },
}

impl fmt::Display for Ambiguity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ambiguity::AddressNotFound { address } => {
                write!(f, "no provider instance at address {address}")
            }
            Ambiguity::NoNameMatch { name } => write!(f, "no provider instance named {name}"),
            Ambiguity::MultipleNameMatches { name, count } => {
                write!(f, "{count} provider instances named {name}")
            }
        }
    }
}

/// How the target instance of an intent was identified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The record's address matched an instance's address.
    Address,
    /// The record's instance id matched exactly one instance name.
    Name,
    /// The instance name follows the `<environment>-<suffix>` convention.
    NamingConvention,
    /// Nothing matched; the intent is orchestrator-only.
    Unresolved(Ambiguity),
}

/// One unit of teardown work.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerminationIntent {
    /// Orchestrator machine id; the instance name for provider-only intents.
    pub machine_id: String,
    /// Provider instance to destroy, if any.
    pub instance_id: Option<String>,
    /// What the intent touches.
    pub mode: TerminationMode,
    /// How the instance was identified.
    pub resolution: Resolution,
}

impl TerminationIntent {
    /// Destroy `instance_id` at the provider, then remove `machine_id` from the orchestrator.
    pub fn destroy(
        machine_id: impl Into<String>,
        instance_id: impl Into<String>,
        resolution: Resolution,
    ) -> Self {
        Self {
            machine_id: machine_id.into(),
            instance_id: Some(instance_id.into()),
            mode: TerminationMode::Full,
            resolution,
        }
    }

    /// Remove `machine_id` from the orchestrator without touching the provider.
    pub fn env_only(machine_id: impl Into<String>, why: Ambiguity) -> Self {
        Self {
            machine_id: machine_id.into(),
            instance_id: None,
            mode: TerminationMode::EnvOnly,
            resolution: Resolution::Unresolved(why),
        }
    }

    /// Destroy an instance found by naming convention; the orchestrator is not consulted.
    pub fn provider_only(name: impl Into<String>, instance_id: impl Into<String>) -> Self {
        Self {
            machine_id: name.into(),
            instance_id: Some(instance_id.into()),
            mode: TerminationMode::ProviderOnly,
            resolution: Resolution::NamingConvention,
        }
    }

    /// Returns `true` if only orchestrator state is updated.
    #[inline]
    pub fn is_env_only(&self) -> bool {
        self.mode == TerminationMode::EnvOnly
    }

    /// Returns `true` if the provider is called.
    #[inline]
    pub fn touches_provider(&self) -> bool {
        matches!(
            self.mode,
            TerminationMode::Full | TerminationMode::ProviderOnly
        )
    }

    /// Returns `true` if the orchestrator record is removed.
    #[inline]
    pub fn touches_orchestrator(&self) -> bool {
        matches!(self.mode, TerminationMode::Full | TerminationMode::EnvOnly)
    }

    /// Returns the ambiguity that made this intent orchestrator-only, if any.
    pub fn ambiguity(&self) -> Option<&Ambiguity> {
        match &self.resolution {
            Resolution::Unresolved(why) => Some(why),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_map_to_touched_systems() {
        let full = TerminationIntent::destroy("1", "vm-1", Resolution::Address);
        assert!(full.touches_provider() && full.touches_orchestrator());
        assert!(!full.is_env_only());

        let env = TerminationIntent::env_only(
            "2",
            Ambiguity::NoNameMatch {
                name: "vm-2".into(),
            },
        );
        assert!(env.is_env_only());
        assert!(!env.touches_provider());
        assert_eq!(env.instance_id, None);
        assert!(env.ambiguity().is_some());

        let forced = TerminationIntent::provider_only("lab-3", "vm-3");
        assert!(forced.touches_provider());
        assert!(!forced.touches_orchestrator());
    }

    #[test]
    fn ambiguity_reads_well() {
        let why = Ambiguity::MultipleNameMatches {
            name: "lab-7".into(),
            count: 2,
        };
        assert_eq!(why.to_string(), "2 provider instances named lab-7");
    }
}
