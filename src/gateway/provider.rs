//! # Cloud provider capabilities.

use async_trait::async_trait;

use crate::config::NetworkSpec;
use crate::error::ProviderError;
use crate::model::{InstanceParams, Network, Port, ProviderInstance};

/// Instance lifecycle calls against the cloud control plane.
///
/// Returned instances are snapshots; callers re-list to observe changes.
#[async_trait]
pub trait ProviderGateway: Send + Sync + 'static {
    /// Lists every instance visible to the configured project.
    async fn list_instances(&self) -> Result<Vec<ProviderInstance>, ProviderError>;

    /// Requests deletion of an instance. Deletion completes asynchronously.
    async fn destroy_instance(&self, instance_id: &str) -> Result<(), ProviderError>;

    /// Requests a new instance. The returned status is usually `Building`;
    /// callers await `Active` with a [`WaitLoop`](crate::WaitLoop).
    async fn create_instance(
        &self,
        params: &InstanceParams,
    ) -> Result<ProviderInstance, ProviderError>;
}

/// Networking calls used while provisioning machines.
#[async_trait]
pub trait NetworkGateway: Send + Sync + 'static {
    /// Finds a private network by name.
    async fn find_network(&self, name: &str) -> Result<Option<Network>, ProviderError>;

    /// Creates a private network with one subnet.
    async fn create_network(&self, spec: &NetworkSpec) -> Result<Network, ProviderError>;

    /// Reserves a floating IP and attaches it to the instance through a new port.
    async fn attach_public_ip(&self, instance_id: &str) -> Result<Port, ProviderError>;

    /// Attaches the instance to a network through a new port.
    async fn attach_port(&self, network_id: &str, instance_id: &str)
    -> Result<Port, ProviderError>;

    /// Returns the current state of a port.
    async fn port(&self, port_id: &str) -> Result<Port, ProviderError>;
}
