use crate::application::router::{self, PendingEntry};
use crate::domain::completion::{CompletionHandle, completion_pair};
use crate::domain::order::OrderRequest;
use crate::domain::ports::{OrderBackendRef, OrderSubmitter};
use crate::error::{GatewayError, OrderError, Result};
use std::mem;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Settings fixed for the lifetime of a [`BatchEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Number of orders per dispatched batch, also the queue capacity.
    pub batch_size: usize,
    /// When set, a non-empty partial batch is dispatched on every tick.
    pub partial_flush_interval: Option<Duration>,
}

impl EngineConfig {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            partial_flush_interval: None,
        }
    }

    pub fn with_partial_flush(mut self, interval: Duration) -> Self {
        self.partial_flush_interval = Some(interval);
        self
    }
}

/// Bridges single-order submissions to a backend that only accepts batches.
///
/// Orders flow through a bounded queue into one worker task, which groups
/// them into batches of `batch_size`, dispatches each batch, and routes the
/// verdicts back to the waiting submitters. Only one batch is in flight at a
/// time.
pub struct BatchEngine {
    config: EngineConfig,
    backend: OrderBackendRef,
    submitter: Submitter,
    queue_rx: Option<mpsc::Receiver<PendingEntry>>,
    stop_tx: Option<oneshot::Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl BatchEngine {
    /// Creates a stopped engine. Orders submitted before [`start`](Self::start)
    /// wait in the queue.
    pub fn new(config: EngineConfig, backend: OrderBackendRef) -> Result<Self> {
        if config.batch_size == 0 {
            return Err(GatewayError::InvalidConfig(
                "batch size must be at least 1".to_string(),
            ));
        }
        if config.partial_flush_interval == Some(Duration::ZERO) {
            return Err(GatewayError::InvalidConfig(
                "partial flush interval must be positive".to_string(),
            ));
        }

        let (queue_tx, queue_rx) = mpsc::channel(config.batch_size);
        Ok(Self {
            config,
            backend,
            submitter: Submitter { queue_tx },
            queue_rx: Some(queue_rx),
            stop_tx: None,
            worker: None,
        })
    }

    /// A cloneable submission endpoint for the gateway.
    pub fn submitter(&self) -> Submitter {
        self.submitter.clone()
    }

    pub fn submit(&self, order: OrderRequest) -> CompletionHandle {
        self.submitter.submit(order)
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.is_finished())
    }

    /// Spawns the worker task. An engine can only be started once.
    pub fn start(&mut self) -> Result<()> {
        let queue_rx = self.queue_rx.take().ok_or_else(|| {
            GatewayError::EngineError("order engine can only be started once".to_string())
        })?;
        let (stop_tx, stop_rx) = oneshot::channel();

        let worker = BatchWorker {
            batch_size: self.config.batch_size,
            flush: self.config.partial_flush_interval.map(flush_timer),
            backend: self.backend.clone(),
            queue_rx,
            stop_rx,
        };
        self.worker = Some(tokio::spawn(worker.run()));
        self.stop_tx = Some(stop_tx);

        info!(
            batch_size = self.config.batch_size,
            partial_flush = ?self.config.partial_flush_interval,
            "order engine started"
        );
        Ok(())
    }

    /// Stops the worker and waits for it to finish.
    ///
    /// A batch already being dispatched completes normally. Every order not
    /// yet dispatched, and every order submitted afterwards, resolves with
    /// [`OrderError::Shutdown`]. Calling `stop` again is a no-op.
    pub async fn stop(&mut self) {
        // never started: dropping the queue fails everything waiting on it
        self.queue_rx.take();

        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(worker) = self.worker.take()
            && let Err(e) = worker.await
        {
            error!(error = %e, "order engine worker terminated abnormally");
        }
    }
}

/// Cloneable handle that feeds orders into the engine's queue.
#[derive(Debug, Clone)]
pub struct Submitter {
    queue_tx: mpsc::Sender<PendingEntry>,
}

impl OrderSubmitter for Submitter {
    /// Returns immediately. While the queue has room the order is enqueued
    /// in place, which keeps submission order; otherwise a background task
    /// waits for room. Must be called from within a tokio runtime.
    fn submit(&self, order: OrderRequest) -> CompletionHandle {
        let (completer, handle) = completion_pair();

        match self.queue_tx.try_send(PendingEntry::new(order, completer)) {
            Ok(()) => {}
            Err(TrySendError::Full(entry)) => {
                debug!("order queue is full, enqueueing in background");
                let queue_tx = self.queue_tx.clone();
                tokio::spawn(async move {
                    if let Err(rejected) = queue_tx.send(entry).await {
                        rejected.0.completer.fail(OrderError::Shutdown);
                    }
                });
            }
            Err(TrySendError::Closed(entry)) => entry.completer.fail(OrderError::Shutdown),
        }

        handle
    }
}

struct BatchWorker {
    batch_size: usize,
    flush: Option<Interval>,
    backend: OrderBackendRef,
    queue_rx: mpsc::Receiver<PendingEntry>,
    stop_rx: oneshot::Receiver<()>,
}

impl BatchWorker {
    async fn run(mut self) {
        let mut pending: Vec<PendingEntry> = Vec::with_capacity(self.batch_size);

        loop {
            tokio::select! {
                biased;
                _ = &mut self.stop_rx => {
                    info!("order engine was stopped");
                    break;
                }
                received = self.queue_rx.recv() => {
                    let Some(entry) = received else {
                        info!("all submitters are gone, stopping order engine");
                        break;
                    };
                    pending.push(entry);
                    if pending.len() == self.batch_size {
                        let batch = mem::replace(&mut pending, Vec::with_capacity(self.batch_size));
                        self.dispatch(batch).await;
                    }
                }
                _ = next_flush(&mut self.flush), if !pending.is_empty() => {
                    debug!(size = pending.len(), "flushing partial batch");
                    let batch = mem::replace(&mut pending, Vec::with_capacity(self.batch_size));
                    self.dispatch(batch).await;
                }
            }
        }

        self.drain(pending).await;
    }

    async fn dispatch(&self, batch: Vec<PendingEntry>) {
        let orders: Vec<OrderRequest> = batch.iter().map(|entry| entry.request.clone()).collect();
        info!(size = orders.len(), "fulfilling orders");

        match self.backend.fulfill_orders(&orders).await {
            Ok(responses) => {
                let summary = router::route_responses(batch, responses);
                if summary.protocol_errors > 0 || summary.unmatched_entries > 0 {
                    warn!(?summary, "batch resolved with protocol errors");
                } else {
                    debug!(?summary, "batch resolved");
                }
            }
            Err(e) => {
                error!(error = %e, size = orders.len(), "can't fulfill orders");
                router::fail_batch(batch, e);
            }
        }
    }

    async fn drain(mut self, pending: Vec<PendingEntry>) {
        let accumulated = pending.len();
        router::fail_batch(pending, OrderError::Shutdown);

        self.queue_rx.close();
        let mut queued = 0usize;
        while let Some(entry) = self.queue_rx.recv().await {
            entry.completer.fail(OrderError::Shutdown);
            queued += 1;
        }

        info!(accumulated, queued, "order engine drained");
    }
}

fn flush_timer(period: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn next_flush(flush: &mut Option<Interval>) {
    match flush {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
