//! Cloneable facade for interacting with the valuation worker.
//!
//! Clients submit batches, read cached metrics, and subscribe to events
//! through this handle.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{broadcast, mpsc, oneshot};

use appraiser_core::{ArtifactId, BuildId};

use super::{BatchId, BatchOutcome, BatchRequest, CancellationFlag, Result, RuntimeError};
use crate::cache::MetricResult;
use crate::events::{Event, EventBus, Topic};
use crate::workers::{Command, Invalidation, MetricsSnapshot, ValuationMetrics};

/// Client-facing handle to interact with the runtime.
#[derive(Clone)]
pub struct ValuationHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
    metrics: Arc<ValuationMetrics>,
    next_batch: Arc<AtomicU64>,
}

impl ValuationHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<Command>,
        event_bus: EventBus,
        metrics: Arc<ValuationMetrics>,
    ) -> Self {
        Self {
            command_tx,
            event_bus,
            metrics,
            next_batch: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Queue a batch and return a ticket for cancelling or awaiting it.
    pub async fn submit(&self, request: BatchRequest) -> Result<BatchTicket> {
        let batch = BatchId(self.next_batch.fetch_add(1, Ordering::Relaxed));
        let cancellation = request.cancellation.clone();
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Submit {
                batch,
                request,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        Ok(BatchTicket {
            batch,
            cancellation,
            outcome: reply_rx,
        })
    }

    /// Submit a batch and wait for its outcome.
    pub async fn valuate(&self, request: BatchRequest) -> Result<BatchOutcome> {
        self.submit(request).await?.outcome().await
    }

    /// Read the cached metric for a pair, fresh or not.
    pub async fn cached_metric(
        &self,
        artifact: ArtifactId,
        build: BuildId,
    ) -> Result<Option<MetricResult>> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::QueryMetric {
                artifact,
                build,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Drop cached metrics for an artifact or a build.
    pub async fn invalidate(&self, target: Invalidation) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Invalidate {
                target,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Subscribe to a specific event topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple event topics.
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus.
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

/// A submitted batch.
pub struct BatchTicket {
    batch: BatchId,
    cancellation: CancellationFlag,
    outcome: oneshot::Receiver<Result<BatchOutcome>>,
}

impl BatchTicket {
    pub fn batch(&self) -> BatchId {
        self.batch
    }

    /// Stop the batch before its next pair.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub fn cancellation(&self) -> &CancellationFlag {
        &self.cancellation
    }

    /// Wait for the batch to finish.
    pub async fn outcome(self) -> Result<BatchOutcome> {
        self.outcome.await.map_err(RuntimeError::ReplyChannelClosed)?
    }
}
