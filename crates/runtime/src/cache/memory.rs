//! In-memory MetricCache implementation for tests and local runs.

use std::collections::HashMap;
use std::sync::RwLock;

use appraiser_core::{ArtifactId, BuildId};

use super::{CacheError, MetricCache, MetricResult, Result};

/// In-memory implementation of MetricCache.
#[derive(Default)]
pub struct InMemoryMetricCache {
    metrics: RwLock<HashMap<(ArtifactId, BuildId), MetricResult>>,
}

impl InMemoryMetricCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored metrics.
    pub fn len(&self) -> usize {
        self.metrics.read().map(|metrics| metrics.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MetricCache for InMemoryMetricCache {
    fn get(&self, artifact: ArtifactId, build: BuildId) -> Result<Option<MetricResult>> {
        let metrics = self.metrics.read().map_err(|_| CacheError::LockPoisoned)?;
        Ok(metrics.get(&(artifact, build)).copied())
    }

    fn put(&self, artifact: ArtifactId, build: BuildId, metric: MetricResult) -> Result<()> {
        let mut metrics = self.metrics.write().map_err(|_| CacheError::LockPoisoned)?;
        metrics.insert((artifact, build), metric);
        Ok(())
    }

    fn invalidate_artifact(&self, artifact: ArtifactId) -> Result<()> {
        let mut metrics = self.metrics.write().map_err(|_| CacheError::LockPoisoned)?;
        metrics.retain(|(id, _), _| *id != artifact);
        Ok(())
    }

    fn invalidate_build(&self, build: BuildId) -> Result<()> {
        let mut metrics = self.metrics.write().map_err(|_| CacheError::LockPoisoned)?;
        metrics.retain(|(_, id), _| *id != build);
        Ok(())
    }
}
