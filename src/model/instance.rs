//! # Provider-side instances and the parameters used to create them.

use std::fmt;

use crate::config::FlavorConstraints;

/// Lifecycle state reported by the provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InstanceStatus {
    /// Running and reachable.
    Active,
    /// Still being created.
    Building,
    /// Creation or operation failed at the provider.
    Error,
    /// Deleted (some providers keep deleted servers listed for a while).
    Deleted,
    /// Anything else, kept verbatim.
    Unknown(String),
}

impl InstanceStatus {
    /// Parses a provider status string (case-insensitive).
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => InstanceStatus::Active,
            "BUILD" | "BUILDING" => InstanceStatus::Building,
            "ERROR" => InstanceStatus::Error,
            "DELETED" => InstanceStatus::Deleted,
            _ => InstanceStatus::Unknown(raw.to_string()),
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceStatus::Active => f.write_str("active"),
            InstanceStatus::Building => f.write_str("building"),
            InstanceStatus::Error => f.write_str("error"),
            InstanceStatus::Deleted => f.write_str("deleted"),
            InstanceStatus::Unknown(raw) => f.write_str(raw),
        }
    }
}

/// Snapshot of one provider instance. Never a live reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderInstance {
    /// Provider id.
    pub id: String,
    /// Instance name (`<environment>-<suffix>` for machines this crate created).
    pub name: String,
    /// Public address.
    pub ip_address: String,
    /// Lifecycle state.
    pub status: InstanceStatus,
}

impl ProviderInstance {
    /// Creates a snapshot.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        ip_address: impl Into<String>,
        status: InstanceStatus,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ip_address: ip_address.into(),
            status,
        }
    }

    /// Returns `true` if the instance belongs to `environment` by naming convention.
    pub fn belongs_to(&self, environment: &str) -> bool {
        self.name
            .strip_prefix(environment)
            .is_some_and(|rest| rest.starts_with('-'))
    }
}

/// Parameters for [`ProviderGateway::create_instance`](crate::ProviderGateway::create_instance).
///
/// The gateway picks the first flavor satisfying `flavor` and the first public image
/// whose name contains `image_pattern`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceParams {
    /// Instance name.
    pub name: String,
    /// Hardware constraints.
    pub flavor: FlavorConstraints,
    /// Image name pattern.
    pub image_pattern: String,
    /// Networks to attach at creation time.
    pub networks: Vec<String>,
}

impl InstanceParams {
    /// Creates parameters for an instance with the given name and catalog entries.
    pub fn new(
        name: impl Into<String>,
        flavor: FlavorConstraints,
        image_pattern: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            flavor,
            image_pattern: image_pattern.into(),
            networks: Vec::new(),
        }
    }

    /// Attaches a network at creation time.
    pub fn with_network(mut self, network_id: impl Into<String>) -> Self {
        self.networks.push(network_id.into());
        self
    }
}

/// State of a network port.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PortStatus {
    /// Attached and forwarding.
    Active,
    /// Still being attached.
    Down,
    /// Anything else, kept verbatim.
    Other(String),
}

/// A network port attached to an instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Port {
    /// Provider port id.
    pub id: String,
    /// Current state.
    pub status: PortStatus,
    /// Address assigned to the port, if any.
    pub ip_address: Option<String>,
}

/// A provider network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Network {
    /// Provider network id.
    pub id: String,
    /// Network name.
    pub name: String,
}
