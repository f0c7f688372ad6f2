//! In-memory gateways for unit tests.
//!
//! Each fake records the calls it receives into a shared [`Journal`] so tests can assert
//! ordering across both systems, and offers switches to inject failures.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::NetworkSpec;
use crate::error::{OrchestratorError, ProviderError};
use crate::gateway::{EnvironmentAdmin, NetworkGateway, OrchestratorGateway, ProviderGateway};
use crate::model::{
    InstanceParams, InstanceStatus, MachineRecord, Network, Port, PortStatus, ProviderInstance,
};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|p| p.into_inner())
}

/// Ordered log of mutating calls across every fake.
#[derive(Clone, Default)]
pub(crate) struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub(crate) fn push(&self, entry: impl Into<String>) {
        lock(&self.0).push(entry.into());
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        lock(&self.0).clone()
    }

    pub(crate) fn position(&self, entry: &str) -> Option<usize> {
        lock(&self.0).iter().position(|e| e == entry)
    }
}

pub(crate) fn instance(id: &str, name: &str, ip: &str) -> ProviderInstance {
    ProviderInstance::new(id, name, ip, InstanceStatus::Active)
}

pub(crate) fn record(machine_id: &str, instance_id: &str, address: &str) -> MachineRecord {
    MachineRecord::new(machine_id)
        .with_instance_id(instance_id)
        .with_address(address)
}

#[derive(Default)]
struct ProviderState {
    instances: Vec<ProviderInstance>,
    fail_destroy: HashSet<String>,
    panic_destroy: HashSet<String>,
    /// Destroys accepted without the instance ever leaving the listing.
    sticky_destroy: HashSet<String>,
    fail_create: bool,
    blank_addresses: bool,
    next_id: usize,
    /// Remaining `list_instances` calls before a building instance turns active.
    booting: HashMap<String, u32>,
}

/// Provider fake holding a mutable instance list.
pub(crate) struct FakeProvider {
    state: Mutex<ProviderState>,
    journal: Journal,
    destroy_delay: Duration,
    boot_ticks: u32,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl FakeProvider {
    pub(crate) fn new(journal: Journal, instances: Vec<ProviderInstance>) -> Self {
        Self {
            state: Mutex::new(ProviderState {
                instances,
                ..ProviderState::default()
            }),
            journal,
            destroy_delay: Duration::ZERO,
            boot_ticks: 1,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Every destroy call takes this long (use with a paused clock).
    pub(crate) fn with_destroy_delay(mut self, delay: Duration) -> Self {
        self.destroy_delay = delay;
        self
    }

    /// Created instances report active after this many listings.
    pub(crate) fn with_boot_ticks(mut self, ticks: u32) -> Self {
        self.boot_ticks = ticks;
        self
    }

    pub(crate) fn fail_destroy_of(&self, instance_id: &str) {
        lock(&self.state).fail_destroy.insert(instance_id.to_string());
    }

    pub(crate) fn panic_on_destroy_of(&self, instance_id: &str) {
        lock(&self.state).panic_destroy.insert(instance_id.to_string());
    }

    pub(crate) fn sticky_destroy_of(&self, instance_id: &str) {
        lock(&self.state).sticky_destroy.insert(instance_id.to_string());
    }

    /// Created instances come up without an address.
    pub(crate) fn blank_addresses(&self) {
        lock(&self.state).blank_addresses = true;
    }

    pub(crate) fn fail_create(&self) {
        lock(&self.state).fail_create = true;
    }

    pub(crate) fn instances(&self) -> Vec<ProviderInstance> {
        lock(&self.state).instances.clone()
    }

    pub(crate) fn ids(&self) -> Vec<String> {
        self.instances().into_iter().map(|i| i.id).collect()
    }

    /// Highest number of destroy calls observed running at once.
    pub(crate) fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderGateway for FakeProvider {
    async fn list_instances(&self) -> Result<Vec<ProviderInstance>, ProviderError> {
        let mut state = lock(&self.state);
        let ProviderState {
            instances, booting, ..
        } = &mut *state;
        for inst in instances.iter_mut() {
            if let Some(left) = booting.get_mut(&inst.id) {
                *left = left.saturating_sub(1);
                if *left == 0 {
                    booting.remove(&inst.id);
                    inst.status = InstanceStatus::Active;
                }
            }
        }
        Ok(instances.clone())
    }

    async fn destroy_instance(&self, instance_id: &str) -> Result<(), ProviderError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.destroy_delay.is_zero() {
            tokio::time::sleep(self.destroy_delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let mut state = lock(&self.state);
        if state.panic_destroy.contains(instance_id) {
            drop(state);
            panic!("destroy of {instance_id} exploded");
        }
        if state.fail_destroy.contains(instance_id) {
            return Err(ProviderError::api("destroy_instance", "503 service unavailable"));
        }
        if !state.sticky_destroy.contains(instance_id) {
            state.instances.retain(|i| i.id != instance_id);
        }
        self.journal.push(format!("destroy {instance_id}"));
        Ok(())
    }

    async fn create_instance(
        &self,
        params: &InstanceParams,
    ) -> Result<ProviderInstance, ProviderError> {
        let mut state = lock(&self.state);
        if state.fail_create {
            return Err(ProviderError::api("create_instance", "quota exceeded"));
        }
        state.next_id += 1;
        let n = state.next_id;
        let ip = if state.blank_addresses {
            String::new()
        } else {
            format!("10.9.0.{n}")
        };
        let inst = ProviderInstance::new(
            format!("new-{n}"),
            params.name.clone(),
            ip,
            InstanceStatus::Building,
        );
        state.booting.insert(inst.id.clone(), self.boot_ticks.max(1));
        state.instances.push(inst.clone());
        self.journal.push(format!("create {}", params.name));
        Ok(inst)
    }
}

#[derive(Default)]
struct OrchestratorState {
    machines: BTreeMap<String, MachineRecord>,
    fail_remove: HashSet<String>,
    remove_attempts: HashMap<String, usize>,
    fail_destroy: bool,
}

/// Orchestrator fake holding a machine map.
pub(crate) struct FakeOrchestrator {
    state: Mutex<OrchestratorState>,
    journal: Journal,
}

impl FakeOrchestrator {
    pub(crate) fn new(journal: Journal, records: Vec<MachineRecord>) -> Self {
        Self {
            state: Mutex::new(OrchestratorState {
                machines: records
                    .into_iter()
                    .map(|r| (r.machine_id.clone(), r))
                    .collect(),
                ..OrchestratorState::default()
            }),
            journal,
        }
    }

    pub(crate) fn fail_remove_of(&self, machine_id: &str) {
        lock(&self.state).fail_remove.insert(machine_id.to_string());
    }

    pub(crate) fn fail_destroy_environment(&self) {
        lock(&self.state).fail_destroy = true;
    }

    pub(crate) fn remove_attempts(&self, machine_id: &str) -> usize {
        lock(&self.state)
            .remove_attempts
            .get(machine_id)
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn machine_ids(&self) -> Vec<String> {
        lock(&self.state).machines.keys().cloned().collect()
    }
}

#[async_trait]
impl OrchestratorGateway for FakeOrchestrator {
    async fn status(&self) -> Result<BTreeMap<String, MachineRecord>, OrchestratorError> {
        Ok(lock(&self.state).machines.clone())
    }

    async fn remove_machine(&self, machine_id: &str) -> Result<(), OrchestratorError> {
        let mut state = lock(&self.state);
        *state
            .remove_attempts
            .entry(machine_id.to_string())
            .or_default() += 1;
        if state.fail_remove.contains(machine_id) {
            return Err(OrchestratorError::api("remove_machine", "machine has units"));
        }
        state.machines.remove(machine_id);
        self.journal.push(format!("remove {machine_id}"));
        Ok(())
    }

    async fn destroy_environment(&self) -> Result<(), OrchestratorError> {
        let mut state = lock(&self.state);
        if state.fail_destroy {
            return Err(OrchestratorError::api(
                "destroy_environment",
                "machines still allocated",
            ));
        }
        state.machines.clear();
        self.journal.push("destroy-environment");
        Ok(())
    }
}

#[derive(Default)]
struct NetworkState {
    networks: Vec<Network>,
    ports: HashMap<String, (Port, u32)>,
    next_port: usize,
    fail_public_ip: bool,
}

/// Network fake; ports come up after a fixed number of polls.
pub(crate) struct FakeNetwork {
    state: Mutex<NetworkState>,
    journal: Journal,
    port_ticks: u32,
}

impl FakeNetwork {
    pub(crate) fn new(journal: Journal) -> Self {
        Self {
            state: Mutex::new(NetworkState::default()),
            journal,
            port_ticks: 1,
        }
    }

    pub(crate) fn with_network(self, id: &str, name: &str) -> Self {
        lock(&self.state).networks.push(Network {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub(crate) fn fail_public_ip(&self) {
        lock(&self.state).fail_public_ip = true;
    }

    pub(crate) fn networks(&self) -> Vec<Network> {
        lock(&self.state).networks.clone()
    }

    fn new_port(&self, ip: Option<String>) -> Port {
        let mut state = lock(&self.state);
        state.next_port += 1;
        let port = Port {
            id: format!("port-{}", state.next_port),
            status: PortStatus::Down,
            ip_address: ip,
        };
        state
            .ports
            .insert(port.id.clone(), (port.clone(), self.port_ticks.max(1)));
        port
    }
}

#[async_trait]
impl NetworkGateway for FakeNetwork {
    async fn find_network(&self, name: &str) -> Result<Option<Network>, ProviderError> {
        Ok(lock(&self.state)
            .networks
            .iter()
            .find(|n| n.name == name)
            .cloned())
    }

    async fn create_network(&self, spec: &NetworkSpec) -> Result<Network, ProviderError> {
        let mut state = lock(&self.state);
        let net = Network {
            id: format!("net-{}", state.networks.len() + 1),
            name: spec.name.clone(),
        };
        state.networks.push(net.clone());
        self.journal.push(format!("create-network {}", spec.cidr));
        Ok(net)
    }

    async fn attach_public_ip(&self, instance_id: &str) -> Result<Port, ProviderError> {
        if lock(&self.state).fail_public_ip {
            return Err(ProviderError::api("attach_public_ip", "no floating ips left"));
        }
        self.journal.push(format!("public-ip {instance_id}"));
        Ok(self.new_port(Some("83.212.0.10".to_string())))
    }

    async fn attach_port(
        &self,
        network_id: &str,
        instance_id: &str,
    ) -> Result<Port, ProviderError> {
        self.journal
            .push(format!("attach {network_id} {instance_id}"));
        Ok(self.new_port(None))
    }

    async fn port(&self, port_id: &str) -> Result<Port, ProviderError> {
        let mut state = lock(&self.state);
        let (port, left) = state
            .ports
            .get_mut(port_id)
            .ok_or_else(|| ProviderError::NotFound {
                what: format!("port {port_id}"),
            })?;
        *left = left.saturating_sub(1);
        if *left == 0 {
            port.status = PortStatus::Active;
        }
        Ok(port.clone())
    }
}

#[derive(Default)]
struct AdminState {
    bootstrapped: bool,
    fail_bootstrap: bool,
    fail_add: bool,
    added: Vec<String>,
    discarded: bool,
}

/// Environment administration fake.
pub(crate) struct FakeAdmin {
    state: Mutex<AdminState>,
    journal: Journal,
}

impl FakeAdmin {
    pub(crate) fn new(journal: Journal) -> Self {
        Self {
            state: Mutex::new(AdminState::default()),
            journal,
        }
    }

    pub(crate) fn bootstrapped(self) -> Self {
        lock(&self.state).bootstrapped = true;
        self
    }

    pub(crate) fn fail_bootstrap(&self) {
        lock(&self.state).fail_bootstrap = true;
    }

    pub(crate) fn fail_add(&self) {
        lock(&self.state).fail_add = true;
    }

    pub(crate) fn added(&self) -> Vec<String> {
        lock(&self.state).added.clone()
    }

    pub(crate) fn is_discarded(&self) -> bool {
        lock(&self.state).discarded
    }
}

#[async_trait]
impl EnvironmentAdmin for FakeAdmin {
    async fn is_bootstrapped(&self) -> Result<bool, OrchestratorError> {
        Ok(lock(&self.state).bootstrapped)
    }

    async fn bootstrap(&self, address: &str) -> Result<(), OrchestratorError> {
        let mut state = lock(&self.state);
        if state.fail_bootstrap {
            return Err(OrchestratorError::api("bootstrap", "ssh handshake failed"));
        }
        state.bootstrapped = true;
        self.journal.push(format!("bootstrap {address}"));
        Ok(())
    }

    async fn add_machine(&self, spec: &str) -> Result<(), OrchestratorError> {
        let mut state = lock(&self.state);
        if state.fail_add {
            return Err(OrchestratorError::api("add_machine", "ssh handshake failed"));
        }
        state.added.push(spec.to_string());
        self.journal.push(format!("add-machine {spec}"));
        Ok(())
    }

    async fn discard_environment(&self) -> Result<(), OrchestratorError> {
        lock(&self.state).discarded = true;
        self.journal.push("discard-environment");
        Ok(())
    }
}
