//! # Bootstrap: create the state server and hand it to the orchestrator.
//!
//! ```text
//! is_bootstrapped? ── yes ──► Precheck error (nothing created)
//!   │ no
//!   ▼
//! ensure private network ──► create <env>-0 ──► wait active
//!   ──► attach public ip ──► wait port ──► attach private port ──► wait port
//!   ──► admin.bootstrap(public address)
//!
//! any failure after the instance exists ──► destroy <env>-0, return the error
//! ```

use std::sync::Arc;

use super::provision::{await_port, cleanup, ensure_network, launch};
use crate::core::Provisor;
use crate::error::CommandError;
use crate::gateway::{EnvironmentAdmin, NetworkGateway};
use crate::model::{InstanceParams, Network, ProviderInstance, STATE_SERVER_ID};

/// Creates and bootstraps the state server of an environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Runs the command and returns the state-server instance with its public address.
    pub async fn run(&self, p: &Provisor) -> Result<ProviderInstance, CommandError> {
        let admin = p.admin()?;
        let network = p.network()?;

        if admin.is_bootstrapped().await? {
            return Err(CommandError::Precheck(format!(
                "environment {} is already bootstrapped",
                p.environment()
            )));
        }

        let catalog = &p.config().catalog;
        let private = ensure_network(network.as_ref(), &catalog.network).await?;
        let params = InstanceParams::new(
            format!("{}-{STATE_SERVER_ID}", p.environment()),
            catalog.flavor.clone(),
            catalog.image_pattern.as_str(),
        );
        let server = launch(p, params).await?;

        match wire(p, network, admin, &server, &private).await {
            Ok(address) => {
                tracing::info!(
                    environment = p.environment(),
                    instance = %server.id,
                    address = %address,
                    "environment bootstrapped"
                );
                Ok(ProviderInstance {
                    ip_address: address,
                    ..server
                })
            }
            Err(e) => {
                cleanup(p, &server.id).await;
                Err(e)
            }
        }
    }
}

async fn wire(
    p: &Provisor,
    network: &Arc<dyn NetworkGateway>,
    admin: &Arc<dyn EnvironmentAdmin>,
    server: &ProviderInstance,
    private: &Network,
) -> Result<String, CommandError> {
    let public = network.attach_public_ip(&server.id).await?;
    let public = await_port(p, network.as_ref(), &public).await?;

    let port = network.attach_port(&private.id, &server.id).await?;
    await_port(p, network.as_ref(), &port).await?;

    let address = public
        .ip_address
        .unwrap_or_else(|| server.ip_address.clone());
    admin.bootstrap(&address).await?;
    Ok(address)
}
