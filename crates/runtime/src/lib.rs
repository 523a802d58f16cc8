//! Batch valuation runtime for the artifact appraiser.
//!
//! This crate runs [`appraiser_core`] valuations over many (artifact, build)
//! pairs on tokio. Consumers embed [`ValuationRuntime`] to submit batches,
//! follow progress, cancel, and read cached metrics through
//! [`ValuationHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for progress and results
//! - [`cache`] stores metrics and decides their freshness
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod cache;
pub mod events;
pub mod runtime;

mod workers;

pub use api::{
    BatchId, BatchOutcome, BatchRequest, BatchTicket, CancellationFlag, PairValuation,
    ProgressControl, ProgressSink, ProgressThrottle, Result, RuntimeError, ValuationHandle,
    ValuationPair,
};
pub use cache::{CacheError, FileMetricCache, InMemoryMetricCache, MetricCache, MetricResult};
pub use events::{Event, EventBus, ProgressEvent, Topic, ValuationEvent};
pub use runtime::{RuntimeBuilder, RuntimeConfig, ValuationRuntime};
pub use workers::{Invalidation, MetricsSnapshot, ValuationMetrics};
