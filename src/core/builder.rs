use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::provisor::{Provisor, spawn_listener};
use crate::{
    config::Config,
    error::ConfigurationError,
    events::Bus,
    gateway::{EnvironmentAdmin, NetworkGateway, OrchestratorGateway, ProviderGateway},
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for a [`Provisor`] context.
///
/// The provider and orchestrator gateways are required; the network and admin gateways
/// are only needed by the provisioning and force-teardown commands.
pub struct ProvisorBuilder {
    cfg: Config,
    environment: String,
    provider: Arc<dyn ProviderGateway>,
    orchestrator: Arc<dyn OrchestratorGateway>,
    network: Option<Arc<dyn NetworkGateway>>,
    admin: Option<Arc<dyn EnvironmentAdmin>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl ProvisorBuilder {
    /// Creates a builder for `environment` with the two core gateways.
    pub fn new(
        cfg: Config,
        environment: impl Into<String>,
        provider: Arc<dyn ProviderGateway>,
        orchestrator: Arc<dyn OrchestratorGateway>,
    ) -> Self {
        Self {
            cfg,
            environment: environment.into(),
            provider,
            orchestrator,
            network: None,
            admin: None,
            subscribers: Vec::new(),
        }
    }

    /// Sets the network gateway.
    pub fn with_network(mut self, network: Arc<dyn NetworkGateway>) -> Self {
        self.network = Some(network);
        self
    }

    /// Sets the environment administration gateway.
    pub fn with_admin(mut self, admin: Arc<dyn EnvironmentAdmin>) -> Self {
        self.admin = Some(admin);
        self
    }

    /// Sets event subscribers.
    ///
    /// Subscribers receive every runtime event through dedicated workers with bounded
    /// queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Validates the configuration and starts the event listener.
    ///
    /// Must be called inside a tokio runtime.
    pub fn build(self) -> Result<Provisor, ConfigurationError> {
        if self.environment.trim().is_empty() {
            return Err(ConfigurationError::InvalidEnvironment {
                name: self.environment,
            });
        }
        self.cfg.pool_size()?;

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers, bus.clone());
        let stop = CancellationToken::new();
        let listener = spawn_listener(&bus, subs, stop.clone());

        Ok(Provisor {
            cfg: self.cfg,
            environment: self.environment,
            provider: self.provider,
            orchestrator: self.orchestrator,
            network: self.network,
            admin: self.admin,
            bus,
            stop,
            listener,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Event, EventKind};
    use crate::subscribers::Recorder;
    use crate::testing::{FakeOrchestrator, FakeProvider, Journal};

    fn builder(cfg: Config, environment: &str) -> ProvisorBuilder {
        let journal = Journal::default();
        ProvisorBuilder::new(
            cfg,
            environment,
            Arc::new(FakeProvider::new(journal.clone(), vec![])),
            Arc::new(FakeOrchestrator::new(journal, vec![])),
        )
    }

    #[tokio::test]
    async fn blank_environment_is_rejected() {
        let err = builder(Config::default(), " ").build().err();
        assert!(matches!(
            err,
            Some(ConfigurationError::InvalidEnvironment { .. })
        ));
    }

    #[tokio::test]
    async fn zero_pool_is_rejected_up_front() {
        let cfg = Config {
            max_concurrent: 0,
            ..Config::default()
        };
        assert_eq!(
            builder(cfg, "lab").build().err(),
            Some(ConfigurationError::InvalidPoolSize { size: 0 })
        );
    }

    #[tokio::test]
    async fn optional_gateways_are_reported_missing() {
        let provisor = builder(Config::default(), "lab").build().unwrap();
        assert_eq!(
            provisor.admin().err(),
            Some(ConfigurationError::MissingGateway { name: "admin" })
        );
        assert!(provisor.network().is_err());
        provisor.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_flushes_events_to_subscribers() {
        let recorder = Arc::new(Recorder::new());
        let provisor = builder(Config::default(), "lab")
            .with_subscribers(vec![recorder.clone()])
            .build()
            .unwrap();

        provisor.bus().publish(Event::new(EventKind::EnvironmentDestroyed));
        provisor.shutdown().await;

        assert_eq!(recorder.kinds(), vec![EventKind::EnvironmentDestroyed]);
    }
}
