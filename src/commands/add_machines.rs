//! # AddMachines: provision workers and register them with the orchestrator.
//!
//! Each machine is named `<env>-<uuid hex>`, created on the private network, awaited until
//! active and registered as `ssh:root@<address>`. Machines are provisioned concurrently,
//! at most `max_concurrent` at a time; one failure does not stop the others.

use futures::{StreamExt, stream};
use uuid::Uuid;

use super::provision::{cleanup, launch};
use super::report::{ProvisionFailure, ProvisionReport};
use crate::core::Provisor;
use crate::error::{CommandError, ProviderError};
use crate::gateway::EnvironmentAdmin;
use crate::model::{InstanceParams, Network, ProviderInstance};

/// Adds `count` machines to a bootstrapped environment.
#[derive(Clone, Copy, Debug)]
pub struct AddMachines {
    /// Number of machines to add.
    pub count: usize,
}

impl AddMachines {
    /// Creates the command.
    pub fn new(count: usize) -> Self {
        Self { count }
    }

    /// Runs the command.
    ///
    /// # Errors
    /// Only precondition and configuration problems abort the command; per-machine
    /// failures are listed in the report.
    pub async fn run(&self, p: &Provisor) -> Result<ProvisionReport, CommandError> {
        let admin = p.admin()?;
        let network = p.network()?;
        let pool = p.config().pool_size()?;

        if !admin.is_bootstrapped().await? {
            return Err(CommandError::Precheck(format!(
                "environment {} is not bootstrapped",
                p.environment()
            )));
        }
        let spec = &p.config().catalog.network;
        let private = network.find_network(&spec.name).await?.ok_or_else(|| {
            CommandError::Precheck(format!(
                "private network {:?} not found; bootstrap the environment first",
                spec.name
            ))
        })?;

        let admin = admin.as_ref();
        let private = &private;
        let names = (0..self.count).map(|_| machine_name(p.environment()));
        let outcomes: Vec<(String, Result<ProviderInstance, CommandError>)> = stream::iter(names)
            .map(move |name| async move {
                let res = provision_one(p, admin, private, &name).await;
                (name, res)
            })
            .buffer_unordered(pool)
            .collect()
            .await;

        let mut report = ProvisionReport::default();
        for (name, res) in outcomes {
            match res {
                Ok(instance) => report.launched.push(instance),
                Err(error) => {
                    tracing::warn!(machine = %name, error = %error, "could not add machine");
                    report.failed.push(ProvisionFailure { name, error });
                }
            }
        }
        report.launched.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(report)
    }
}

fn machine_name(environment: &str) -> String {
    format!("{environment}-{}", Uuid::new_v4().simple())
}

async fn provision_one(
    p: &Provisor,
    admin: &dyn EnvironmentAdmin,
    private: &Network,
    name: &str,
) -> Result<ProviderInstance, CommandError> {
    let catalog = &p.config().catalog;
    let params = InstanceParams::new(name, catalog.flavor.clone(), catalog.image_pattern.as_str())
        .with_network(private.id.as_str());
    let instance = launch(p, params).await?;

    if instance.ip_address.trim().is_empty() {
        cleanup(p, &instance.id).await;
        return Err(ProviderError::NotFound {
            what: format!("address of instance {}", instance.id),
        }
        .into());
    }
    if let Err(e) = admin
        .add_machine(&format!("ssh:root@{}", instance.ip_address))
        .await
    {
        cleanup(p, &instance.id).await;
        return Err(e.into());
    }
    tracing::info!(machine = %instance.name, address = %instance.ip_address, "machine added");
    Ok(instance)
}
