//! # OperationRunner: bounded-concurrency execution of termination intents.
//!
//! Accepts a batch of [`TerminationIntent`]s, executes them on a fixed-size worker pool
//! and yields exactly one [`OperationResult`] per intent.
//!
//! ## Architecture
//! ```text
//! submit(intent) ──► queue
//!
//! drain_with(cancel):
//!   validate (pool size, instance ids)  ──► Err(RunnerError) before any side effect
//!   dispatcher task:
//!     for intent in queue {
//!       ├─► acquire permit   (select! with cancel)
//!       │     └─ cancelled → every remaining intent ──► Cancelled result
//!       └─► spawn worker: Executor::run(intent) ──► result ──► channel
//!     }
//!     join workers ──► publish BatchDrained
//!
//! Drain (Stream) ◄── channel (completion order)
//! ```
//!
//! ## Rules
//! - At most `max_concurrent` intents execute at once
//! - Results arrive in completion order, not submission order
//! - Cancellation stops new starts only; in-flight intents run to their end
//! - A worker panic becomes a failed result for that intent; the batch goes on
//! - Only an invalid pool size or a provider-touching intent without an instance id
//!   fail the whole drain

use std::iter;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use tokio::{
    select,
    sync::{Semaphore, mpsc},
    task::JoinSet,
};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::executor::Executor;
use crate::core::wait::WaitLoop;
use crate::error::{ConfigurationError, RunnerError};
use crate::events::{Bus, Event, EventKind};
use crate::gateway::{OrchestratorGateway, ProviderGateway};
use crate::model::{OperationResult, TerminationIntent};

/// Executes termination intents with bounded concurrency.
///
/// ```text
/// let mut runner = provisor.runner();
/// runner.submit_all(intents);
/// for result in runner.drain().await? { ... }
/// ```
pub struct OperationRunner {
    pool: Result<usize, ConfigurationError>,
    executor: Arc<Executor>,
    bus: Bus,
    queue: Vec<TerminationIntent>,
}

impl OperationRunner {
    /// Creates a runner over the given gateways.
    pub fn new(
        cfg: &Config,
        provider: Arc<dyn ProviderGateway>,
        orchestrator: Arc<dyn OrchestratorGateway>,
        bus: Bus,
    ) -> Self {
        let executor = Executor {
            provider,
            orchestrator,
            waiter: WaitLoop::new(cfg.wait, bus.clone()),
            confirm_destroy: cfg.confirm_destroy,
            bus: bus.clone(),
        };
        Self {
            pool: cfg.pool_size(),
            executor: Arc::new(executor),
            bus,
            queue: Vec::new(),
        }
    }

    /// Queues an intent for the next drain.
    pub fn submit(&mut self, intent: TerminationIntent) {
        self.queue.push(intent);
    }

    /// Queues several intents, preserving their order.
    pub fn submit_all(&mut self, intents: impl IntoIterator<Item = TerminationIntent>) {
        self.queue.extend(intents);
    }

    /// Returns the number of queued intents.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Executes every queued intent and returns all results.
    ///
    /// # Errors
    /// [`RunnerError::Configuration`] if the batch cannot start; nothing was executed.
    pub async fn drain(&mut self) -> Result<Vec<OperationResult>, RunnerError> {
        Ok(self
            .drain_with(CancellationToken::new())?
            .collect::<Vec<_>>()
            .await)
    }

    /// Starts executing the queued intents and returns a stream of their results.
    ///
    /// Cancelling `cancel` prevents further starts; every intent that has not started
    /// yields an [`Outcome::Cancelled`](crate::Outcome::Cancelled) result. The stream
    /// ends once every intent has a result.
    ///
    /// Must be called inside a tokio runtime. On error the queue is left untouched.
    pub fn drain_with(&mut self, cancel: CancellationToken) -> Result<Drain, RunnerError> {
        let pool = self.pool.clone()?;
        if let Some(bad) = self
            .queue
            .iter()
            .find(|i| i.touches_provider() && i.instance_id.is_none())
        {
            return Err(ConfigurationError::MissingInstanceId {
                machine_id: bad.machine_id.clone(),
            }
            .into());
        }

        let queue = std::mem::take(&mut self.queue);
        let expected = queue.len();
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(dispatch(
            Arc::clone(&self.executor),
            queue,
            Arc::new(Semaphore::new(pool)),
            cancel,
            tx,
            self.bus.clone(),
        ));

        Ok(Drain {
            rx,
            expected,
            received: 0,
        })
    }
}

async fn dispatch(
    executor: Arc<Executor>,
    queue: Vec<TerminationIntent>,
    permits: Arc<Semaphore>,
    cancel: CancellationToken,
    tx: mpsc::UnboundedSender<OperationResult>,
    bus: Bus,
) {
    let total = queue.len();
    let mut workers = JoinSet::new();
    let mut pending = queue.into_iter();

    while let Some(intent) = pending.next() {
        let permit = select! {
            biased;
            _ = cancel.cancelled() => None,
            res = Arc::clone(&permits).acquire_owned() => res.ok(),
        };
        let Some(permit) = permit else {
            for intent in iter::once(intent).chain(pending.by_ref()) {
                bus.publish(
                    Event::new(EventKind::IntentCancelled).with_machine(intent.machine_id.as_str()),
                );
                let _ = tx.send(OperationResult::cancelled(intent));
            }
            break;
        };

        let executor = Arc::clone(&executor);
        let tx = tx.clone();
        workers.spawn(async move {
            let result = executor.run(intent).await;
            drop(permit);
            let _ = tx.send(result);
        });
    }

    while workers.join_next().await.is_some() {}
    bus.publish(Event::new(EventKind::BatchDrained).with_count(total));
}

/// Stream of results of one batch, in completion order.
///
/// Dropping the stream does not stop the batch; in-flight and queued intents keep
/// running in the background. Cancel the token passed to
/// [`OperationRunner::drain_with`] to stop new starts.
pub struct Drain {
    rx: mpsc::UnboundedReceiver<OperationResult>,
    expected: usize,
    received: usize,
}

impl Drain {
    /// Number of results the stream yields in total.
    pub fn expected(&self) -> usize {
        self.expected
    }
}

impl Stream for Drain {
    type Item = OperationResult;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let polled = self.rx.poll_recv(cx);
        if let Poll::Ready(Some(_)) = &polled {
            self.received += 1;
        }
        polled
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.expected.saturating_sub(self.received);
        (left, Some(left))
    }
}
