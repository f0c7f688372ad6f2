//! # TerminateMachines: tear down selected machines.
//!
//! ```text
//! ids ──► reject "0" ──► status() + list_instances() ──► plan ──► drain ──► BatchReport
//! ```

use std::collections::BTreeSet;

use super::report::BatchReport;
use crate::core::Provisor;
use crate::error::{CommandError, ConfigurationError};
use crate::model::STATE_SERVER_ID;

/// Terminates the given machines (never the state server).
#[derive(Clone, Debug)]
pub struct TerminateMachines {
    machine_ids: Vec<String>,
}

impl TerminateMachines {
    /// Creates the command for the given orchestrator machine ids.
    pub fn new<I, S>(machine_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            machine_ids: machine_ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Runs the command.
    ///
    /// Ids unknown to the orchestrator are skipped with a warning, so repeating a
    /// termination is harmless.
    ///
    /// # Errors
    /// - [`ConfigurationError::ReservedMachine`] if machine `0` is requested; nothing runs
    /// - gateway errors while taking the inventory snapshot
    pub async fn run(&self, p: &Provisor) -> Result<BatchReport, CommandError> {
        if self.machine_ids.iter().any(|id| id == STATE_SERVER_ID) {
            return Err(ConfigurationError::ReservedMachine {
                machine_id: STATE_SERVER_ID.to_string(),
            }
            .into());
        }
        let wanted: BTreeSet<&str> = self.machine_ids.iter().map(String::as_str).collect();

        let status = p.orchestrator().status().await?;
        for unknown in wanted.iter().filter(|id| !status.contains_key(**id)) {
            tracing::warn!(machine = unknown, "machine not known to the orchestrator; skipping");
        }
        let selected = status
            .values()
            .filter(|r| wanted.contains(r.machine_id.as_str()));

        let instances = p.provider().list_instances().await?;
        let intents = p
            .reconciler()
            .plan(selected, &instances, &[STATE_SERVER_ID])?;

        let mut runner = p.runner();
        runner.submit_all(intents);
        Ok(BatchReport::new(runner.drain().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::config::Config;
    use crate::core::ProvisorBuilder;
    use crate::model::{MachineRecord, ProviderInstance, TerminationMode};
    use crate::testing::{FakeOrchestrator, FakeProvider, Journal, instance, record};

    struct Fixture {
        journal: Journal,
        provider: Arc<FakeProvider>,
        orchestrator: Arc<FakeOrchestrator>,
        provisor: Provisor,
    }

    fn fixture(instances: Vec<ProviderInstance>, records: Vec<MachineRecord>) -> Fixture {
        let journal = Journal::default();
        let provider = Arc::new(FakeProvider::new(journal.clone(), instances));
        let orchestrator = Arc::new(FakeOrchestrator::new(journal.clone(), records));
        let mut cfg = Config::default();
        cfg.wait.interval = Duration::from_secs(1);
        let provisor = ProvisorBuilder::new(cfg, "lab", provider.clone(), orchestrator.clone())
            .build()
            .unwrap();
        Fixture {
            journal,
            provider,
            orchestrator,
            provisor,
        }
    }

    fn two_machines(with_i2: bool) -> Fixture {
        let mut instances = vec![instance("i1", "lab-a", "10.0.0.1")];
        if with_i2 {
            instances.push(instance("i2", "lab-b", "10.0.0.2"));
        }
        fixture(
            instances,
            vec![
                record("0", "lab-0", "10.0.0.100"),
                record("1", "lab-a", "10.0.0.1"),
                record("2", "lab-b", "10.0.0.2"),
            ],
        )
    }

    #[tokio::test(start_paused = true)]
    async fn both_machines_are_fully_terminated() {
        let fx = two_machines(true);

        let report = TerminateMachines::new(["1", "2"])
            .run(&fx.provisor)
            .await
            .unwrap();

        assert!(report.is_clean());
        assert!(
            report
                .results()
                .iter()
                .all(|r| r.intent.mode == TerminationMode::Full)
        );
        assert!(fx.provider.ids().is_empty());
        assert_eq!(fx.orchestrator.machine_ids(), vec!["0".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_instance_only_affects_its_machine() {
        let fx = two_machines(false);

        let report = TerminateMachines::new(["1", "2"])
            .run(&fx.provisor)
            .await
            .unwrap();

        let results = report.results();
        assert_eq!(results[0].intent.mode, TerminationMode::Full);
        assert!(results[0].is_succeeded());
        assert!(results[1].intent.is_env_only());
        assert!(results[1].is_succeeded());
        assert_eq!(fx.journal.entries().len(), 3);
    }

    #[tokio::test]
    async fn state_server_is_rejected() {
        let fx = two_machines(true);

        let err = TerminateMachines::new(["1", "0"])
            .run(&fx.provisor)
            .await
            .unwrap_err();

        assert_eq!(err.as_label(), "config_reserved_machine");
        assert!(fx.journal.entries().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_and_repeated_ids_are_harmless() {
        let fx = two_machines(true);

        let report = TerminateMachines::new(["1", "1", "9"])
            .run(&fx.provisor)
            .await
            .unwrap();
        assert_eq!(report.len(), 1);

        let again = TerminateMachines::new(["1"])
            .run(&fx.provisor)
            .await
            .unwrap();
        assert!(again.is_empty());
    }

    #[tokio::test]
    async fn empty_inventory_is_idempotent() {
        let fx = fixture(vec![], vec![]);

        for _ in 0..2 {
            let report = TerminateMachines::new(Vec::<String>::new())
                .run(&fx.provisor)
                .await
                .unwrap();
            assert!(report.is_empty());
        }
        assert!(fx.journal.entries().is_empty());
    }

    #[tokio::test]
    async fn malformed_record_aborts_before_any_mutation() {
        let fx = fixture(
            vec![instance("i1", "lab-a", "10.0.0.1")],
            vec![record("1", "lab-a", "10.0.0.1"), MachineRecord::new("2")],
        );

        let err = TerminateMachines::new(["1", "2"])
            .run(&fx.provisor)
            .await
            .unwrap_err();

        assert_eq!(err.as_label(), "config_malformed_record");
        assert!(fx.journal.entries().is_empty());
    }
}
