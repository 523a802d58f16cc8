//! High-level runtime orchestrator.
//!
//! The runtime owns the valuation worker, wires up command/event channels,
//! and exposes a builder-based API for clients to drive batch valuations.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use appraiser_content::ContentFactory;
use appraiser_core::{CatalogOracle, OddsTables, ValuationConfig};

use crate::api::{Result, RuntimeError, ValuationHandle};
use crate::cache::{InMemoryMetricCache, MetricCache};
use crate::events::EventBus;
use crate::workers::{ValuationEnv, ValuationMetrics, ValuationWorker, WorkerSettings};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Blocking chunks each pair's trials are split into.
    pub workers: usize,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Minimum time between two progress reports.
    pub progress_interval: Duration,
    /// Seeds every chunk's generator when set, making batches reproducible.
    pub seed: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            event_buffer_size: 100,
            command_buffer_size: 32,
            progress_interval: Duration::from_millis(100),
            seed: None,
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `APPRAISER_WORKERS` - Trial chunks per pair (default: available parallelism)
    /// - `APPRAISER_EVENT_BUFFER` - Event capacity per topic (default: 100)
    /// - `APPRAISER_COMMAND_BUFFER` - Command queue size (default: 32)
    /// - `APPRAISER_PROGRESS_INTERVAL_MS` - Minimum ms between progress reports (default: 100)
    /// - `APPRAISER_SEED` - Fixed RNG seed (default: entropy)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(workers) = read_env::<usize>("APPRAISER_WORKERS") {
            config.workers = workers.max(1);
        }
        if let Some(capacity) = read_env::<usize>("APPRAISER_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }
        if let Some(capacity) = read_env::<usize>("APPRAISER_COMMAND_BUFFER") {
            config.command_buffer_size = capacity.max(1);
        }
        if let Some(millis) = read_env::<u64>("APPRAISER_PROGRESS_INTERVAL_MS") {
            config.progress_interval = Duration::from_millis(millis);
        }
        config.seed = read_env::<u64>("APPRAISER_SEED");

        config
    }

    fn settings(&self) -> WorkerSettings {
        WorkerSettings {
            workers: self.workers.max(1),
            progress_interval: self.progress_interval,
            seed: self.seed,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

/// Main runtime that orchestrates batch valuation.
///
/// Runtime owns the worker task; [`ValuationHandle`] provides a cloneable
/// facade for clients.
pub struct ValuationRuntime {
    handle: ValuationHandle,
    worker_handle: JoinHandle<()>,
}

impl ValuationRuntime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> ValuationHandle {
        self.handle.clone()
    }

    /// Shutdown the runtime gracefully
    ///
    /// Waits for running batches once every outstanding handle is dropped.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);
        self.worker_handle.await.map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`ValuationRuntime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    tables: Option<OddsTables>,
    catalog: Option<Arc<dyn CatalogOracle>>,
    valuation: ValuationConfig,
    cache: Option<Arc<dyn MetricCache>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            tables: None,
            catalog: None,
            valuation: ValuationConfig::default(),
            cache: None,
        }
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Odds tables; the standard tables when not set.
    pub fn tables(mut self, tables: OddsTables) -> Self {
        self.tables = Some(tables);
        self
    }

    pub fn catalog(mut self, catalog: impl CatalogOracle + 'static) -> Self {
        self.catalog = Some(Arc::new(catalog));
        self
    }

    pub fn valuation_config(mut self, config: ValuationConfig) -> Self {
        self.valuation = config;
        self
    }

    /// Metric cache; an in-memory cache when not set.
    pub fn cache(mut self, cache: impl MetricCache + 'static) -> Self {
        self.cache = Some(Arc::new(cache));
        self
    }

    /// Load tables, catalog and valuation config from a content directory.
    pub fn content(self, factory: &ContentFactory) -> Result<Self> {
        let content = |err: anyhow::Error| RuntimeError::Content(format!("{err:#}"));
        let tables = factory.load_tables_or_standard().map_err(content)?;
        let catalog = factory.load_catalog().map_err(content)?;
        let valuation = factory.load_config().map_err(content)?;
        Ok(self.tables(tables).catalog(catalog).valuation_config(valuation))
    }

    /// Spawn the worker and return the running runtime.
    ///
    /// Must be called within a tokio runtime.
    pub async fn build(self) -> Result<ValuationRuntime> {
        let catalog = self
            .catalog
            .ok_or(RuntimeError::MissingComponent("a character/weapon catalog"))?;
        let env = Arc::new(ValuationEnv {
            tables: self.tables.unwrap_or_default(),
            catalog,
            config: self.valuation,
        });
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(InMemoryMetricCache::new()));

        let bus = EventBus::with_capacity(self.config.event_buffer_size);
        let metrics = Arc::new(ValuationMetrics::new());
        let (command_tx, command_rx) = mpsc::channel(self.config.command_buffer_size.max(1));

        let worker = ValuationWorker::new(
            env,
            cache,
            bus.clone(),
            Arc::clone(&metrics),
            self.config.settings(),
            command_rx,
        );
        let worker_handle = tokio::spawn(worker.run());

        tracing::debug!(
            target: "runtime",
            workers = self.config.workers,
            "Valuation runtime started"
        );

        Ok(ValuationRuntime {
            handle: ValuationHandle::new(command_tx, bus, metrics),
            worker_handle,
        })
    }
}
