//! # Orchestrator-side machine records.

/// Machine id of the control/state server. It is never part of a regular
/// reconciliation pass and is terminated last during environment teardown.
pub const STATE_SERVER_ID: &str = "0";

/// The orchestrator's view of one machine.
///
/// `machine_id` is stable and orchestrator-assigned. `instance_id` and `address` are
/// best-effort hints toward the provider instance; either may be stale or absent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MachineRecord {
    /// Orchestrator-assigned id.
    pub machine_id: String,
    /// Provider id hint; some backends report the instance *name* here.
    pub instance_id: Option<String>,
    /// Public address hint.
    pub address: Option<String>,
}

impl MachineRecord {
    /// Creates a record with no hints.
    pub fn new(machine_id: impl Into<String>) -> Self {
        Self {
            machine_id: machine_id.into(),
            instance_id: None,
            address: None,
        }
    }

    /// Sets the address hint. Blank addresses are treated as absent.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = non_blank(address.into());
        self
    }

    /// Sets the instance id hint. Blank ids are treated as absent.
    pub fn with_instance_id(mut self, instance_id: impl Into<String>) -> Self {
        self.instance_id = non_blank(instance_id.into());
        self
    }

    /// Returns `true` for the state-server machine.
    pub fn is_state_server(&self) -> bool {
        self.machine_id == STATE_SERVER_ID
    }
}

fn non_blank(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_hints_are_absent() {
        let rec = MachineRecord::new("5").with_address("").with_instance_id("  ");
        assert_eq!(rec.address, None);
        assert_eq!(rec.instance_id, None);
        assert!(!rec.is_state_server());
        assert!(MachineRecord::new("0").is_state_server());
    }
}
