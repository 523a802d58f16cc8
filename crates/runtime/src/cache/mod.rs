//! Cached valuation metrics.
//!
//! A batch consults the cache before valuing a pair and skips pairs whose
//! metric is still fresh (see [`MetricResult::is_fresh`]).
mod file;
mod memory;

pub use file::FileMetricCache;
pub use memory::InMemoryMetricCache;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use appraiser_core::{Artifact, ArtifactId, Build, BuildId, Timestamp, ValuationReport};

/// Errors surfaced by cache implementations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("metric cache lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CacheError>;

/// A stored valuation for one (artifact, build) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    pub calculated_on: Timestamp,
    pub iterations: u32,
    pub report: ValuationReport,
}

impl MetricResult {
    /// A metric is fresh when it was computed no earlier than either record's
    /// last modification and with at least `iterations` trials.
    pub fn is_fresh(&self, artifact: &Artifact, build: &Build, iterations: u32) -> bool {
        self.calculated_on >= artifact.last_modified
            && self.calculated_on >= build.last_modified
            && self.iterations >= iterations
    }
}

/// Storage for valuation metrics keyed by (artifact, build).
pub trait MetricCache: Send + Sync {
    fn get(&self, artifact: ArtifactId, build: BuildId) -> Result<Option<MetricResult>>;

    fn put(&self, artifact: ArtifactId, build: BuildId, metric: MetricResult) -> Result<()>;

    /// Drops every metric involving `artifact`.
    fn invalidate_artifact(&self, artifact: ArtifactId) -> Result<()>;

    /// Drops every metric involving `build`.
    fn invalidate_build(&self, build: BuildId) -> Result<()>;
}
