//! # Provisor: the context every command runs against.
//!
//! Owns the configuration, the gateways, the event bus and the subscriber fan-out, and
//! hands out the three core components wired to them.
//!
//! ## Architecture
//! ```text
//! ProvisorBuilder::build()
//!   ├─► Bus::new(cfg.bus_capacity)
//!   ├─► SubscriberSet::new(subscribers)
//!   └─► listener task: Bus.subscribe() ─► SubscriberSet::emit(&Event)
//!
//! Provisor
//!   ├─► reconciler()  ─► Reconciler   (environment name, bus)
//!   ├─► runner()      ─► OperationRunner (cfg, provider, orchestrator, bus)
//!   └─► waiter()      ─► WaitLoop     (cfg.wait, bus)
//!
//! Event flow:
//!   Reconciler / Executor / WaitLoop / commands
//!       ── publish(Event) ──► Bus ──► listener ──► SubscriberSet
//!                                                   ├─► [queue S1] ─► worker S1
//!                                                   └─► [queue SN] ─► worker SN
//!
//! Shutdown:
//!   shutdown() ─► stop token ─► listener forwards what is buffered
//!              ─► SubscriberSet::shutdown() (workers drain their queues)
//! ```

use std::sync::Arc;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::{OperationRunner, Reconciler, WaitLoop};
use crate::error::ConfigurationError;
use crate::events::Bus;
use crate::gateway::{EnvironmentAdmin, NetworkGateway, OrchestratorGateway, ProviderGateway};
use crate::subscribers::SubscriberSet;

/// Shared context for one environment.
pub struct Provisor {
    pub(crate) cfg: Config,
    pub(crate) environment: String,
    pub(crate) provider: Arc<dyn ProviderGateway>,
    pub(crate) orchestrator: Arc<dyn OrchestratorGateway>,
    pub(crate) network: Option<Arc<dyn NetworkGateway>>,
    pub(crate) admin: Option<Arc<dyn EnvironmentAdmin>>,
    pub(crate) bus: Bus,
    pub(crate) stop: CancellationToken,
    pub(crate) listener: JoinHandle<()>,
}

impl Provisor {
    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Returns the environment name.
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Returns the event bus.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Returns the provider gateway.
    pub fn provider(&self) -> &Arc<dyn ProviderGateway> {
        &self.provider
    }

    /// Returns the orchestrator gateway.
    pub fn orchestrator(&self) -> &Arc<dyn OrchestratorGateway> {
        &self.orchestrator
    }

    /// Returns the network gateway, required by provisioning commands.
    pub fn network(&self) -> Result<&Arc<dyn NetworkGateway>, ConfigurationError> {
        self.network
            .as_ref()
            .ok_or(ConfigurationError::MissingGateway { name: "network" })
    }

    /// Returns the environment administration gateway.
    pub fn admin(&self) -> Result<&Arc<dyn EnvironmentAdmin>, ConfigurationError> {
        self.admin
            .as_ref()
            .ok_or(ConfigurationError::MissingGateway { name: "admin" })
    }

    /// Creates a reconciler for this environment.
    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(self.environment.as_str()).with_bus(self.bus.clone())
    }

    /// Creates an empty operation runner.
    pub fn runner(&self) -> OperationRunner {
        OperationRunner::new(
            &self.cfg,
            Arc::clone(&self.provider),
            Arc::clone(&self.orchestrator),
            self.bus.clone(),
        )
    }

    /// Creates a wait loop with the configured policy.
    pub fn waiter(&self) -> WaitLoop {
        WaitLoop::new(self.cfg.wait, self.bus.clone())
    }

    /// Stops forwarding events once everything published so far reached the subscribers.
    pub async fn shutdown(self) {
        self.stop.cancel();
        let _ = self.listener.await;
    }
}

/// Forwards bus events to the subscriber set until `stop` fires, then flushes.
pub(crate) fn spawn_listener(
    bus: &Bus,
    set: SubscriberSet,
    stop: CancellationToken,
) -> JoinHandle<()> {
    let mut rx = bus.subscribe();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                msg = rx.recv() => match msg {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "event listener lagged behind the bus");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = stop.cancelled() => {
                    loop {
                        match rx.try_recv() {
                            Ok(ev) => set.emit(&ev),
                            Err(TryRecvError::Lagged(_)) => continue,
                            Err(_) => break,
                        }
                    }
                    break;
                }
            }
        }
        set.shutdown().await;
    })
}
