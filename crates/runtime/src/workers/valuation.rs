//! Valuation worker that runs batches of (artifact, build) pairs.
//!
//! Receives commands from [`ValuationHandle`](crate::api::ValuationHandle),
//! splits each pair's trials across blocking chunks, and publishes
//! [`ProgressEvent`] and [`ValuationEvent`] notifications.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use appraiser_core::{
    ArtifactId, BuildId, CatalogOracle, OddsTables, Timestamp, TrialTotals, ValuationConfig,
    ValuationContext, ValuationError, Valuator,
};

use crate::api::{
    BatchId, BatchOutcome, BatchRequest, PairValuation, ProgressControl, ProgressThrottle, Result,
    RuntimeError, ValuationPair,
};
use crate::cache::{MetricCache, MetricResult};
use crate::events::{Event, EventBus, ProgressEvent, ValuationEvent};
use crate::workers::ValuationMetrics;

/// Static valuation inputs shared by every batch and chunk.
pub struct ValuationEnv {
    pub tables: OddsTables,
    pub catalog: Arc<dyn CatalogOracle>,
    pub config: ValuationConfig,
}

impl ValuationEnv {
    fn context(&self) -> ValuationContext<'_> {
        ValuationContext::new(&self.tables, self.catalog.as_ref(), &self.config)
    }
}

/// Worker knobs taken from [`RuntimeConfig`](crate::RuntimeConfig).
#[derive(Debug, Clone, Copy)]
pub struct WorkerSettings {
    pub workers: usize,
    pub progress_interval: Duration,
    pub seed: Option<u64>,
}

/// Which cached metrics to drop.
#[derive(Debug, Clone, Copy)]
pub enum Invalidation {
    Artifact(ArtifactId),
    Build(BuildId),
}

/// Commands that can be sent to the valuation worker
pub enum Command {
    /// Run a batch; the reply is sent when the batch finishes or fails.
    Submit {
        batch: BatchId,
        request: BatchRequest,
        reply: oneshot::Sender<Result<BatchOutcome>>,
    },
    /// Read a cached metric without checking freshness.
    QueryMetric {
        artifact: ArtifactId,
        build: BuildId,
        reply: oneshot::Sender<Result<Option<MetricResult>>>,
    },
    Invalidate {
        target: Invalidation,
        reply: oneshot::Sender<Result<()>>,
    },
}

/// Background task that processes valuation commands.
///
/// Each submitted batch runs as its own task, so queries are answered while
/// a long batch is in progress.
pub struct ValuationWorker {
    env: Arc<ValuationEnv>,
    cache: Arc<dyn MetricCache>,
    bus: EventBus,
    metrics: Arc<ValuationMetrics>,
    settings: WorkerSettings,
    command_rx: mpsc::Receiver<Command>,
    batches: JoinSet<()>,
}

impl ValuationWorker {
    pub fn new(
        env: Arc<ValuationEnv>,
        cache: Arc<dyn MetricCache>,
        bus: EventBus,
        metrics: Arc<ValuationMetrics>,
        settings: WorkerSettings,
        command_rx: mpsc::Receiver<Command>,
    ) -> Self {
        Self {
            env,
            cache,
            bus,
            metrics,
            settings,
            command_rx,
            batches: JoinSet::new(),
        }
    }

    /// Main worker loop. Returns once every handle is dropped and running
    /// batches have finished.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    self.handle_command(cmd);
                }
                Some(joined) = self.batches.join_next(), if !self.batches.is_empty() => {
                    if let Err(err) = joined {
                        warn!(target: "runtime::worker", error = %err, "Batch task aborted");
                    }
                }
                else => break,
            }
        }

        while let Some(joined) = self.batches.join_next().await {
            if let Err(err) = joined {
                warn!(target: "runtime::worker", error = %err, "Batch task aborted");
            }
        }
        debug!(target: "runtime::worker", "Valuation worker stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Submit {
                batch,
                request,
                reply,
            } => {
                let job = BatchJob {
                    batch,
                    request,
                    env: Arc::clone(&self.env),
                    cache: Arc::clone(&self.cache),
                    bus: self.bus.clone(),
                    metrics: Arc::clone(&self.metrics),
                    settings: self.settings,
                };
                self.batches.spawn(async move {
                    let _ = reply.send(job.run().await);
                });
            }
            Command::QueryMetric {
                artifact,
                build,
                reply,
            } => {
                let result = self.cache.get(artifact, build).map_err(RuntimeError::from);
                let _ = reply.send(result);
            }
            Command::Invalidate { target, reply } => {
                let result = match target {
                    Invalidation::Artifact(id) => self.cache.invalidate_artifact(id),
                    Invalidation::Build(id) => self.cache.invalidate_build(id),
                };
                let _ = reply.send(result.map_err(RuntimeError::from));
            }
        }
    }
}

struct BatchJob {
    batch: BatchId,
    request: BatchRequest,
    env: Arc<ValuationEnv>,
    cache: Arc<dyn MetricCache>,
    bus: EventBus,
    metrics: Arc<ValuationMetrics>,
    settings: WorkerSettings,
}

impl BatchJob {
    async fn run(self) -> Result<BatchOutcome> {
        let iterations = self
            .request
            .iterations
            .unwrap_or(self.env.config.default_iterations);
        if iterations == 0 {
            return Err(ValuationError::ZeroIterations.into());
        }

        let total = self.request.pairs.len();
        info!(
            target: "runtime::worker",
            batch = %self.batch,
            pairs = total,
            iterations,
            "Batch started"
        );

        let mut throttle = ProgressThrottle::new(self.settings.progress_interval);
        let mut results = Vec::with_capacity(total);
        let mut cancelled = false;

        for (index, pair) in self.request.pairs.iter().enumerate() {
            if self.request.cancellation.is_cancelled() {
                cancelled = true;
                break;
            }

            let result = match self.value_pair(index, pair, iterations).await {
                Ok(result) => result,
                Err(err) => {
                    let (artifact, build) = pair.key();
                    warn!(
                        target: "runtime::worker",
                        batch = %self.batch,
                        %artifact,
                        %build,
                        error = %err,
                        "Pair valuation failed"
                    );
                    self.bus.publish(Event::Valuation(ValuationEvent::PairFailed {
                        batch: self.batch,
                        artifact,
                        build,
                        error: err.to_string(),
                    }));
                    return Err(err);
                }
            };

            self.bus.publish(Event::Valuation(ValuationEvent::PairValued {
                batch: self.batch,
                artifact: result.artifact,
                build: result.build,
                report: result.metric.report,
                cached: result.cached,
            }));
            results.push(result);
            self.report_progress(&mut throttle, index + 1, total);
        }

        if total == 0 {
            self.report_progress(&mut throttle, 0, 0);
        }
        if cancelled {
            self.metrics.record_cancelled();
        }

        let outcome = BatchOutcome {
            batch: self.batch,
            results,
            cancelled,
        };
        info!(
            target: "runtime::worker",
            batch = %self.batch,
            valued = outcome.valued(),
            skipped = outcome.skipped(),
            cancelled,
            "Batch finished"
        );
        self.bus.publish(Event::Valuation(ValuationEvent::BatchFinished {
            batch: self.batch,
            valued: outcome.valued(),
            skipped: outcome.skipped(),
            cancelled,
        }));
        Ok(outcome)
    }

    async fn value_pair(
        &self,
        index: usize,
        pair: &ValuationPair,
        iterations: u32,
    ) -> Result<PairValuation> {
        let (artifact, build) = pair.key();

        if !self.request.force
            && let Some(metric) = self.cache.get(artifact, build)?
            && metric.is_fresh(&pair.artifact, &pair.build, iterations)
        {
            debug!(target: "runtime::worker", %artifact, %build, "Cached metric is fresh");
            self.metrics.record_skipped();
            return Ok(PairValuation {
                artifact,
                build,
                metric,
                cached: true,
            });
        }

        let started = Instant::now();
        let valuator =
            Valuator::new(self.env.context(), &pair.artifact, &pair.build, &pair.loadout)?;
        let totals = if valuator.is_short_circuited() {
            TrialTotals {
                trials: u64::from(iterations),
                ..TrialTotals::default()
            }
        } else {
            self.run_chunks(index, pair, iterations).await?
        };
        let report = valuator.finish(totals)?;

        let metric = MetricResult {
            calculated_on: now(),
            iterations,
            report,
        };
        self.cache.put(artifact, build, metric)?;
        self.metrics.record_valued(totals.trials, started.elapsed());

        debug!(
            target: "runtime::worker",
            %artifact,
            %build,
            rating = report.rating,
            plus_minus = report.plus_minus,
            "Pair valued"
        );
        Ok(PairValuation {
            artifact,
            build,
            metric,
            cached: false,
        })
    }

    /// Runs the pair's trials on blocking threads and sums the chunk totals.
    ///
    /// Chunks are awaited in spawn order so the floating-point sums do not
    /// depend on completion order.
    async fn run_chunks(
        &self,
        index: usize,
        pair: &ValuationPair,
        iterations: u32,
    ) -> Result<TrialTotals> {
        let handles: Vec<_> = chunk_sizes(iterations, self.settings.workers)
            .into_iter()
            .enumerate()
            .map(|(chunk, trials)| {
                let env = Arc::clone(&self.env);
                let pair = pair.clone();
                let seed = self.settings.seed.map(|seed| chunk_seed(seed, index, chunk));
                tokio::task::spawn_blocking(move || run_chunk(&env, &pair, trials, seed))
            })
            .collect();

        let mut totals = TrialTotals::default();
        for handle in handles {
            let (artifact, build) = pair.key();
            totals += handle.await.map_err(|source| RuntimeError::ChunkJoin {
                artifact,
                build,
                source,
            })??;
        }
        Ok(totals)
    }

    fn report_progress(&self, throttle: &mut ProgressThrottle, completed: usize, total: usize) {
        let progress = if total == 0 {
            1.0
        } else {
            completed as f64 / total as f64
        };
        if !throttle.should_report(progress, Instant::now()) {
            return;
        }

        self.bus.publish(Event::Progress(ProgressEvent {
            batch: self.batch,
            completed,
            total,
            progress,
        }));
        if let Some(sink) = &self.request.progress
            && sink.report(progress) == ProgressControl::Cancel
        {
            debug!(target: "runtime::worker", batch = %self.batch, progress, "Cancellation requested");
            self.request.cancellation.cancel();
        }
    }
}

fn run_chunk(
    env: &ValuationEnv,
    pair: &ValuationPair,
    trials: u32,
    seed: Option<u64>,
) -> std::result::Result<TrialTotals, ValuationError> {
    let valuator = Valuator::new(env.context(), &pair.artifact, &pair.build, &pair.loadout)?;
    let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
    Ok(valuator.run_trials(trials, &mut rng)?)
}

/// Splits `iterations` into at most `workers` near-equal non-empty chunks.
fn chunk_sizes(iterations: u32, workers: usize) -> Vec<u32> {
    let chunks = u32::try_from(workers.max(1))
        .unwrap_or(u32::MAX)
        .min(iterations.max(1));
    let base = iterations / chunks;
    let extra = iterations % chunks;
    (0..chunks)
        .map(|chunk| base + u32::from(chunk < extra))
        .filter(|&trials| trials > 0)
        .collect()
}

fn chunk_seed(seed: u64, pair: usize, chunk: usize) -> u64 {
    seed ^ (pair as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ (chunk as u64).rotate_left(32)
}

fn now() -> Timestamp {
    Timestamp::from_millis(u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::CancellationFlag;
    use crate::cache::InMemoryMetricCache;
    use appraiser_core::{
        Artifact, ArtifactSet, ArtifactSlot, BaseStats, Build, Catalog, Character, CharacterId,
        OverallStatKey, Rarity, StatBonus, StatKey, StatPriority, ValuationReport,
    };

    fn job(cache: Arc<InMemoryMetricCache>, metrics: Arc<ValuationMetrics>) -> BatchJob {
        let catalog = Catalog::from_parts(
            [Character {
                id: CharacterId::new("ganyu"),
                base: BaseStats::new(9797.0, 335.0, 630.0),
                ascension: StatBonus::new(StatKey::CritDamage, 38.4),
            }],
            [],
        );
        BatchJob {
            batch: BatchId(1),
            request: BatchRequest::new(Vec::new()).with_cancellation(CancellationFlag::new()),
            env: Arc::new(ValuationEnv {
                tables: OddsTables::standard(),
                catalog: Arc::new(catalog),
                config: ValuationConfig::default(),
            }),
            cache,
            bus: EventBus::new(),
            metrics,
            settings: WorkerSettings {
                workers: 2,
                progress_interval: Duration::ZERO,
                seed: Some(3),
            },
        }
    }

    fn sands_pair(main: StatKey) -> ValuationPair {
        let artifact =
            Artifact::new(ArtifactId(1), ArtifactSlot::Sands, Rarity::FIVE, main, "wanderers_troupe")
                .with_substat(StatKey::CritRate, 3.89)
                .expect("legal sub-stat");
        let build = Build::new(BuildId(1), "ganyu")
            .with_main_stats(ArtifactSlot::Sands, [StatKey::AtkPercent])
            .with_desired_stat(OverallStatKey::CritRate, 60.0, StatPriority::High);
        ValuationPair {
            artifact: Arc::new(artifact),
            build: Arc::new(build),
            loadout: Arc::new(ArtifactSet::new()),
        }
    }

    #[tokio::test]
    async fn short_circuited_pair_counts_trials_without_rolling() {
        let cache = Arc::new(InMemoryMetricCache::new());
        let metrics = Arc::new(ValuationMetrics::new());
        let job = job(Arc::clone(&cache), Arc::clone(&metrics));

        let valued = job
            .value_pair(0, &sands_pair(StatKey::DefPercent), 40)
            .await
            .expect("valid pair");
        assert!(!valued.cached);
        assert_eq!(valued.metric.report, ValuationReport::default());
        assert_eq!(metrics.trials_run(), 40);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn valued_pair_is_finished_and_cached() {
        let cache = Arc::new(InMemoryMetricCache::new());
        let metrics = Arc::new(ValuationMetrics::new());
        let job = job(Arc::clone(&cache), Arc::clone(&metrics));
        let pair = sands_pair(StatKey::AtkPercent);

        let valued = job.value_pair(0, &pair, 50).await.expect("valid pair");
        assert!(valued.metric.report.rating > 0.0);
        assert_eq!(valued.metric.report.positive_plus_minus_odds, 1.0);
        assert_eq!(metrics.trials_run(), 50);

        let again = job.value_pair(0, &pair, 50).await.expect("cached pair");
        assert!(again.cached);
        assert_eq!(again.metric, valued.metric);
    }

    #[test]
    fn chunks_cover_every_iteration() {
        assert_eq!(chunk_sizes(10, 4), vec![3, 3, 2, 2]);
        assert_eq!(chunk_sizes(1000, 1), vec![1000]);
        assert_eq!(chunk_sizes(3, 8), vec![1, 1, 1]);
        assert_eq!(chunk_sizes(7, 0), vec![7]);
    }

    #[test]
    fn chunk_seeds_differ_across_pairs_and_chunks() {
        let seeds = [
            chunk_seed(7, 0, 0),
            chunk_seed(7, 0, 1),
            chunk_seed(7, 1, 0),
            chunk_seed(7, 1, 1),
        ];
        for (i, a) in seeds.iter().enumerate() {
            for b in &seeds[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn now_is_after_the_epoch() {
        assert!(now() > Timestamp::EPOCH);
    }
}
