//! Steps shared by the provisioning commands.
//!
//! Every instance created here is destroyed again if a later step of the same command
//! fails; the caller gets the original error.

use crate::config::NetworkSpec;
use crate::core::{Probe, Provisor};
use crate::error::{CommandError, ProviderError};
use crate::events::{Event, EventKind};
use crate::gateway::NetworkGateway;
use crate::model::{InstanceParams, InstanceStatus, Network, Port, PortStatus, ProviderInstance};

/// Returns the private network named by `spec`, creating it if needed.
pub(crate) async fn ensure_network(
    network: &dyn NetworkGateway,
    spec: &NetworkSpec,
) -> Result<Network, ProviderError> {
    if let Some(existing) = network.find_network(&spec.name).await? {
        tracing::debug!(network = %existing.id, "reusing private network");
        return Ok(existing);
    }
    let created = network.create_network(spec).await?;
    tracing::info!(network = %created.id, cidr = %spec.cidr, "created private network");
    Ok(created)
}

/// Creates an instance and waits until it is active.
///
/// On a failed wait the instance is destroyed before the error is returned.
pub(crate) async fn launch(
    p: &Provisor,
    params: InstanceParams,
) -> Result<ProviderInstance, CommandError> {
    let created = p.provider().create_instance(&params).await?;
    tracing::debug!(instance = %created.id, name = %created.name, "instance requested");

    match await_active(p, &created).await {
        Ok(active) => {
            p.bus().publish(
                Event::new(EventKind::InstanceLaunched)
                    .with_machine(active.name.as_str())
                    .with_instance(active.id.as_str()),
            );
            Ok(active)
        }
        Err(e) => {
            cleanup(p, &created.id).await;
            Err(e.into())
        }
    }
}

async fn await_active(
    p: &Provisor,
    created: &ProviderInstance,
) -> Result<ProviderInstance, ProviderError> {
    let provider = p.provider();
    p.waiter()
        .wait(&format!("server {}", created.name), || async move {
            let listed = provider.list_instances().await?;
            match listed.into_iter().find(|i| i.id == created.id) {
                Some(i) if i.status == InstanceStatus::Active => Ok(Probe::Ready(i)),
                Some(i) if i.status == InstanceStatus::Error => Err(ProviderError::api(
                    "create_instance",
                    format!("server {} entered error state", i.name),
                )),
                Some(i) => Ok(Probe::Pending(i)),
                // listing may lag behind creation
                None => Ok(Probe::Pending(created.clone())),
            }
        })
        .await
        .map(|outcome| outcome.value)
}

/// Waits until a freshly attached port is active.
pub(crate) async fn await_port(
    p: &Provisor,
    network: &dyn NetworkGateway,
    port: &Port,
) -> Result<Port, ProviderError> {
    p.waiter()
        .wait(&format!("port {}", port.id), || async move {
            let current = network.port(&port.id).await?;
            Ok(if current.status == PortStatus::Active {
                Probe::Ready(current)
            } else {
                Probe::Pending(current)
            })
        })
        .await
        .map(|outcome| outcome.value)
}

/// Best-effort removal of an instance created by a failed command.
pub(crate) async fn cleanup(p: &Provisor, instance_id: &str) {
    match p.provider().destroy_instance(instance_id).await {
        Ok(()) => tracing::info!(instance = instance_id, "destroyed instance of failed provisioning"),
        Err(e) => tracing::error!(
            instance = instance_id,
            error = %e,
            "could not destroy instance of failed provisioning; remove it manually"
        ),
    }
}
