//! Event payloads published by the valuation worker.

use serde::{Deserialize, Serialize};

use appraiser_core::{ArtifactId, BuildId, ValuationReport};

use crate::api::BatchId;

/// Batch progress, published at the throttled cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub batch: BatchId,
    pub completed: usize,
    pub total: usize,
    pub progress: f64,
}

/// Per-pair and per-batch valuation results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ValuationEvent {
    /// A pair was valued or served from the cache.
    PairValued {
        batch: BatchId,
        artifact: ArtifactId,
        build: BuildId,
        report: ValuationReport,
        cached: bool,
    },

    /// A pair failed and aborted its batch.
    PairFailed {
        batch: BatchId,
        artifact: ArtifactId,
        build: BuildId,
        error: String,
    },

    BatchFinished {
        batch: BatchId,
        valued: usize,
        skipped: usize,
        cancelled: bool,
    },
}

impl ValuationEvent {
    pub fn batch(&self) -> BatchId {
        match self {
            ValuationEvent::PairValued { batch, .. }
            | ValuationEvent::PairFailed { batch, .. }
            | ValuationEvent::BatchFinished { batch, .. } => *batch,
        }
    }
}
