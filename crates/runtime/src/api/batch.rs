//! Batch requests and outcomes.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use appraiser_core::{Artifact, ArtifactId, ArtifactSet, Build, BuildId};

use super::errors::{Result, RuntimeError};
use super::progress::{CancellationFlag, ProgressSink};
use crate::cache::MetricResult;

/// Identifier assigned to a submitted batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(pub u64);

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "batch#{}", self.0)
    }
}

/// One candidate artifact valued against one build.
///
/// `loadout` holds the artifacts the build currently equips.
#[derive(Debug, Clone)]
pub struct ValuationPair {
    pub artifact: Arc<Artifact>,
    pub build: Arc<Build>,
    pub loadout: Arc<ArtifactSet>,
}

impl ValuationPair {
    pub fn key(&self) -> (ArtifactId, BuildId) {
        (self.artifact.id, self.build.id)
    }
}

/// A batch of pairs plus the knobs for running it.
pub struct BatchRequest {
    pub pairs: Vec<ValuationPair>,
    /// Trials per pair; the valuation config's default when `None`.
    pub iterations: Option<u32>,
    /// Revalue pairs even when the cache holds a fresh metric.
    pub force: bool,
    pub progress: Option<Arc<dyn ProgressSink>>,
    pub cancellation: CancellationFlag,
}

impl BatchRequest {
    pub fn new(pairs: Vec<ValuationPair>) -> Self {
        Self {
            pairs,
            iterations: None,
            force: false,
            progress: None,
            cancellation: CancellationFlag::new(),
        }
    }

    /// Every candidate against every build.
    ///
    /// Each build's loadout is resolved from its equipped ids against
    /// `inventory`.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::UnknownArtifact`] when a build equips an id
    /// missing from `inventory`.
    pub fn cross(candidates: &[Artifact], builds: &[Build], inventory: &[Artifact]) -> Result<Self> {
        let by_id: HashMap<ArtifactId, &Artifact> =
            inventory.iter().map(|artifact| (artifact.id, artifact)).collect();

        let mut resolved = Vec::with_capacity(builds.len());
        for build in builds {
            let mut loadout = ArtifactSet::new();
            for id in build.equipped.values() {
                let artifact = by_id.get(id).ok_or(RuntimeError::UnknownArtifact {
                    build: build.id,
                    artifact: *id,
                })?;
                loadout.insert((*artifact).clone());
            }
            resolved.push((Arc::new(build.clone()), Arc::new(loadout)));
        }

        let pairs = candidates
            .iter()
            .map(|candidate| Arc::new(candidate.clone()))
            .flat_map(|artifact| {
                resolved.iter().map(move |(build, loadout)| ValuationPair {
                    artifact: Arc::clone(&artifact),
                    build: Arc::clone(build),
                    loadout: Arc::clone(loadout),
                })
            })
            .collect();

        Ok(Self::new(pairs))
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = Some(iterations);
        self
    }

    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    pub fn with_progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress = Some(Arc::new(sink));
        self
    }

    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = flag;
        self
    }
}

impl fmt::Debug for BatchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchRequest")
            .field("pairs", &self.pairs.len())
            .field("iterations", &self.iterations)
            .field("force", &self.force)
            .field("progress", &self.progress.is_some())
            .field("cancellation", &self.cancellation)
            .finish()
    }
}

/// The metric for one pair in a finished batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairValuation {
    pub artifact: ArtifactId,
    pub build: BuildId,
    pub metric: MetricResult,
    /// True when the metric came from the cache.
    pub cached: bool,
}

/// Result of a batch. Pairs after a cancellation are absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub batch: BatchId,
    pub results: Vec<PairValuation>,
    pub cancelled: bool,
}

impl BatchOutcome {
    pub fn get(&self, artifact: ArtifactId, build: BuildId) -> Option<&PairValuation> {
        self.results
            .iter()
            .find(|result| result.artifact == artifact && result.build == build)
    }

    pub fn valued(&self) -> usize {
        self.results.iter().filter(|result| !result.cached).count()
    }

    pub fn skipped(&self) -> usize {
        self.results.iter().filter(|result| result.cached).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appraiser_core::{ArtifactSlot, Rarity, StatKey};

    fn flower(id: u64) -> Artifact {
        Artifact::new(ArtifactId(id), ArtifactSlot::Flower, Rarity::FIVE, StatKey::Hp, "gladiator")
    }

    #[test]
    fn cross_pairs_every_candidate_with_every_build() {
        let inventory = vec![flower(1)];
        let builds = vec![
            Build::new(BuildId(1), "hu_tao").with_equipped(ArtifactSlot::Flower, ArtifactId(1)),
            Build::new(BuildId(2), "xiangling"),
        ];
        let candidates = vec![flower(2), flower(3)];

        let request = BatchRequest::cross(&candidates, &builds, &inventory).expect("resolves");
        assert_eq!(request.pairs.len(), 4);
        assert_eq!(request.pairs[0].key(), (ArtifactId(2), BuildId(1)));
        assert_eq!(request.pairs[0].loadout.len(), 1);
        assert!(request.pairs[1].loadout.is_empty());
    }

    #[test]
    fn cross_rejects_unknown_equipped_ids() {
        let builds =
            vec![Build::new(BuildId(7), "hu_tao").with_equipped(ArtifactSlot::Flower, ArtifactId(9))];
        let err = BatchRequest::cross(&[flower(1)], &builds, &[]).expect_err("unknown id");
        assert!(matches!(
            err,
            RuntimeError::UnknownArtifact { build: BuildId(7), artifact: ArtifactId(9) }
        ));
    }
}
