//! # Reconciler: map orchestrator machines to provider instances.
//!
//! Turns a snapshot of both inventories into [`TerminationIntent`]s. Pure and synchronous:
//! it never calls a gateway, so the same snapshot always yields the same plan.
//!
//! ## Resolution order
//! ```text
//! record ──► address hint matches an instance address?  ── yes ──► Full (Address)
//!              │ no
//!              ▼
//!            instance id hint matches exactly one name?  ── yes ──► Full (Name)
//!              │ no (zero or several)
//!              ▼
//!            EnvOnly (Unresolved) + warning
//! ```
//!
//! ## Rules
//! - Exactly one intent per non-excluded record, in input order
//! - An address match always wins over a name match
//! - Several instances with the hinted name are never guessed between
//! - A record with neither hint fails the whole plan; nothing is emitted

use std::collections::HashMap;

use crate::error::ConfigurationError;
use crate::events::{Bus, Event, EventKind};
use crate::model::{Ambiguity, MachineRecord, ProviderInstance, Resolution, TerminationIntent};

/// Builds termination plans for one environment.
#[derive(Clone, Debug)]
pub struct Reconciler {
    environment: String,
    bus: Option<Bus>,
}

impl Reconciler {
    /// Creates a reconciler for `environment` (used by the naming convention).
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            bus: None,
        }
    }

    /// Publishes `MachineUnresolved` for every orchestrator-only intent.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Returns the environment name.
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Plans one intent per record whose machine id is not in `exclude`.
    ///
    /// # Errors
    /// [`ConfigurationError::MalformedRecord`] if a considered record has neither an
    /// address nor an instance id.
    pub fn plan<'a, I>(
        &self,
        records: I,
        instances: &[ProviderInstance],
        exclude: &[&str],
    ) -> Result<Vec<TerminationIntent>, ConfigurationError>
    where
        I: IntoIterator<Item = &'a MachineRecord>,
    {
        let records: Vec<&MachineRecord> = records
            .into_iter()
            .filter(|r| !exclude.contains(&r.machine_id.as_str()))
            .collect();

        if let Some(bad) = records
            .iter()
            .find(|r| r.address.is_none() && r.instance_id.is_none())
        {
            return Err(ConfigurationError::MalformedRecord {
                machine_id: bad.machine_id.clone(),
            });
        }

        let index = Index::new(instances);
        let plan = records
            .into_iter()
            .map(|record| match index.resolve(record) {
                Ok((inst, how)) => TerminationIntent::destroy(&record.machine_id, &inst.id, how),
                Err(why) => {
                    tracing::warn!(
                        machine = %record.machine_id,
                        reason = %why,
                        "machine cannot be mapped to a provider instance; removing from orchestrator only"
                    );
                    if let Some(bus) = &self.bus {
                        bus.publish(
                            Event::new(EventKind::MachineUnresolved)
                                .with_machine(record.machine_id.as_str())
                                .with_reason(why.to_string()),
                        );
                    }
                    TerminationIntent::env_only(&record.machine_id, why)
                }
            })
            .collect();
        Ok(plan)
    }

    /// Plans a provider-only intent for every instance named `<environment>-<suffix>`.
    ///
    /// Used when orchestrator state is unreachable.
    pub fn by_naming_convention(&self, instances: &[ProviderInstance]) -> Vec<TerminationIntent> {
        instances
            .iter()
            .filter(|i| i.belongs_to(&self.environment))
            .map(|i| TerminationIntent::provider_only(&i.name, &i.id))
            .collect()
    }

    /// Finds the provider instance backing the state-server record.
    ///
    /// Returns `None` if there is no record or it cannot be resolved unambiguously.
    pub fn state_server<'a>(
        &self,
        record: Option<&MachineRecord>,
        instances: &'a [ProviderInstance],
    ) -> Option<&'a ProviderInstance> {
        let record = record?;
        Index::new(instances).resolve(record).ok().map(|(i, _)| i)
    }
}

/// Address lookup over one instance snapshot.
struct Index<'a> {
    instances: &'a [ProviderInstance],
    by_address: HashMap<&'a str, &'a ProviderInstance>,
}

impl<'a> Index<'a> {
    fn new(instances: &'a [ProviderInstance]) -> Self {
        // addresses are unique at the provider; on a duplicate the last listed wins
        let by_address = instances
            .iter()
            .filter(|i| !i.ip_address.is_empty())
            .map(|i| (i.ip_address.as_str(), i))
            .collect();
        Self {
            instances,
            by_address,
        }
    }

    fn resolve(
        &self,
        record: &MachineRecord,
    ) -> Result<(&'a ProviderInstance, Resolution), Ambiguity> {
        if let Some(inst) = record
            .address
            .as_deref()
            .and_then(|a| self.by_address.get(a).copied())
        {
            return Ok((inst, Resolution::Address));
        }

        let Some(name) = record.instance_id.as_deref() else {
            return Err(Ambiguity::AddressNotFound {
                address: record.address.clone().unwrap_or_default(),
            });
        };

        let mut matches = self.instances.iter().filter(|i| i.name == name);
        match (matches.next(), matches.count()) {
            (Some(inst), 0) => Ok((inst, Resolution::Name)),
            (None, _) => Err(Ambiguity::NoNameMatch {
                name: name.to_string(),
            }),
            (Some(_), more) => Err(Ambiguity::MultipleNameMatches {
                name: name.to_string(),
                count: more + 1,
            }),
        }
    }
}
