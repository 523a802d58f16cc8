use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use appraiser_content::ContentFactory;
use appraiser_core::{
    Artifact, ArtifactId, ArtifactSet, ArtifactSlot, BaseStats, Build, BuildId, Catalog, Character,
    CharacterId, OverallStatKey, Rarity, StatBonus, StatKey, StatPriority, Timestamp,
    ValuationError, ValuationReport,
};
use appraiser_runtime::{
    BatchRequest, CancellationFlag, Event, FileMetricCache, Invalidation, ProgressControl,
    RuntimeConfig, RuntimeError, Topic, ValuationEvent, ValuationPair, ValuationRuntime,
};

fn catalog() -> Catalog {
    Catalog::from_parts(
        [Character {
            id: CharacterId::new("ganyu"),
            base: BaseStats::new(9797.0, 335.0, 630.0),
            ascension: StatBonus::new(StatKey::CritDamage, 38.4),
        }],
        [],
    )
}

fn config() -> RuntimeConfig {
    RuntimeConfig {
        workers: 3,
        progress_interval: Duration::ZERO,
        seed: Some(17),
        ..RuntimeConfig::default()
    }
}

async fn start() -> ValuationRuntime {
    ValuationRuntime::builder()
        .config(config())
        .catalog(catalog())
        .build()
        .await
        .expect("runtime should start")
}

fn crit_build() -> Build {
    Build::new(BuildId(1), "ganyu")
        .with_main_stats(ArtifactSlot::Sands, [StatKey::AtkPercent])
        .with_desired_stat(OverallStatKey::CritRate, 60.0, StatPriority::High)
        .with_desired_stat(OverallStatKey::CritDamage, 180.0, StatPriority::High)
}

fn sands(id: u64, main: StatKey) -> Artifact {
    Artifact::new(ArtifactId(id), ArtifactSlot::Sands, Rarity::FIVE, main, "wanderers_troupe")
        .with_substat(StatKey::CritRate, 3.89)
        .and_then(|a| a.with_substat(StatKey::CritDamage, 7.77))
        .and_then(|a| a.with_substat(StatKey::Hp, 298.75))
        .expect("legal sub-stats")
}

fn pair(artifact: Artifact, build: Build, loadout: ArtifactSet) -> ValuationPair {
    ValuationPair {
        artifact: Arc::new(artifact),
        build: Arc::new(build),
        loadout: Arc::new(loadout),
    }
}

fn three_pairs() -> Vec<ValuationPair> {
    (1..=3)
        .map(|id| pair(sands(id, StatKey::AtkPercent), crit_build(), ArtifactSet::new()))
        .collect()
}

#[tokio::test]
async fn batch_values_every_pair_then_serves_from_cache() {
    let runtime = start().await;
    let handle = runtime.handle();

    let first = handle
        .valuate(BatchRequest::new(three_pairs()).with_iterations(200))
        .await
        .expect("first batch");
    assert!(!first.cancelled);
    assert_eq!(first.valued(), 3);
    for result in &first.results {
        assert!(!result.cached);
        assert_eq!(result.metric.iterations, 200);
        assert!(result.metric.report.rating > 0.0);
        // empty slot: every rolled candidate beats nothing
        assert_eq!(result.metric.report.positive_plus_minus_odds, 1.0);
    }

    let second = handle
        .valuate(BatchRequest::new(three_pairs()).with_iterations(200))
        .await
        .expect("second batch");
    assert_eq!(second.skipped(), 3);
    assert_eq!(second.results, {
        let mut expected = first.results.clone();
        expected.iter_mut().for_each(|result| result.cached = true);
        expected
    });

    let metrics = handle.metrics();
    assert_eq!(metrics.pairs_valued, 3);
    assert_eq!(metrics.pairs_skipped, 3);
    assert_eq!(metrics.trials_run, 600);

    drop(handle);
    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn stale_or_under_sampled_metrics_are_recomputed() {
    let runtime = start().await;
    let handle = runtime.handle();
    let build = crit_build();

    handle
        .valuate(
            BatchRequest::new(vec![pair(sands(1, StatKey::AtkPercent), build.clone(), ArtifactSet::new())])
                .with_iterations(100),
        )
        .await
        .expect("initial batch");

    // more trials than cached
    let more = handle
        .valuate(
            BatchRequest::new(vec![pair(sands(1, StatKey::AtkPercent), build.clone(), ArtifactSet::new())])
                .with_iterations(150),
        )
        .await
        .expect("larger batch");
    assert_eq!(more.valued(), 1);

    // artifact edited after the metric was computed
    let edited = sands(1, StatKey::AtkPercent).touched(Timestamp::from_millis(u64::MAX));
    let after_edit = handle
        .valuate(BatchRequest::new(vec![pair(edited, build, ArtifactSet::new())]).with_iterations(100))
        .await
        .expect("edited batch");
    assert_eq!(after_edit.valued(), 1);

    let cached = handle
        .cached_metric(ArtifactId(1), BuildId(1))
        .await
        .expect("query")
        .expect("metric stored");
    assert_eq!(cached.iterations, 100);

    handle
        .invalidate(Invalidation::Build(BuildId(1)))
        .await
        .expect("invalidate");
    assert!(handle
        .cached_metric(ArtifactId(1), BuildId(1))
        .await
        .expect("query")
        .is_none());
}

#[tokio::test]
async fn seeded_runtimes_reproduce_results() {
    let a = start().await;
    let b = start().await;

    let first = a
        .handle()
        .valuate(BatchRequest::new(three_pairs()).with_iterations(300))
        .await
        .expect("batch a");
    let second = b
        .handle()
        .valuate(BatchRequest::new(three_pairs()).with_iterations(300))
        .await
        .expect("batch b");

    let reports = |outcome: &appraiser_runtime::BatchOutcome| -> Vec<ValuationReport> {
        outcome.results.iter().map(|result| result.metric.report).collect()
    };
    assert_eq!(reports(&first), reports(&second));
}

#[tokio::test]
async fn progress_sink_can_cancel_between_pairs() {
    let runtime = start().await;
    let reports = Arc::new(AtomicUsize::new(0));

    let sink = {
        let reports = Arc::clone(&reports);
        move |_progress: f64| {
            reports.fetch_add(1, Ordering::SeqCst);
            ProgressControl::Cancel
        }
    };
    let outcome = runtime
        .handle()
        .valuate(
            BatchRequest::new(three_pairs())
                .with_iterations(50)
                .with_progress(sink),
        )
        .await
        .expect("cancelled batch still returns an outcome");

    assert!(outcome.cancelled);
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(reports.load(Ordering::SeqCst), 1);
    assert_eq!(runtime.handle().metrics().batches_cancelled, 1);
}

#[tokio::test]
async fn pre_cancelled_batch_values_nothing() {
    let runtime = start().await;
    let flag = CancellationFlag::new();
    flag.cancel();

    let ticket = runtime
        .handle()
        .submit(BatchRequest::new(three_pairs()).with_cancellation(flag))
        .await
        .expect("submit");
    assert!(ticket.cancellation().is_cancelled());

    let outcome = ticket.outcome().await.expect("outcome");
    assert!(outcome.cancelled);
    assert!(outcome.results.is_empty());
}

#[tokio::test]
async fn progress_and_completion_events_are_published() {
    let runtime = start().await;
    let handle = runtime.handle();
    let mut progress_rx = handle.subscribe(Topic::Progress);
    let mut valuation_rx = handle.subscribe(Topic::Valuation);

    let ticket = handle
        .submit(BatchRequest::new(three_pairs()).with_iterations(20))
        .await
        .expect("submit");
    let batch = ticket.batch();
    ticket.outcome().await.expect("outcome");

    let mut last_progress = 0.0;
    while let Ok(Event::Progress(event)) = progress_rx.try_recv() {
        assert_eq!(event.batch, batch);
        assert!(event.progress >= last_progress);
        last_progress = event.progress;
    }
    assert_eq!(last_progress, 1.0);

    let mut valued = 0;
    let mut finished = false;
    while let Ok(Event::Valuation(event)) = valuation_rx.try_recv() {
        assert_eq!(event.batch(), batch);
        match event {
            ValuationEvent::PairValued { cached, .. } => {
                assert!(!cached);
                valued += 1;
            }
            ValuationEvent::BatchFinished { valued: count, cancelled, .. } => {
                assert_eq!(count, 3);
                assert!(!cancelled);
                finished = true;
            }
            ValuationEvent::PairFailed { error, .. } => panic!("unexpected failure: {error}"),
        }
    }
    assert_eq!(valued, 3);
    assert!(finished);
}

#[tokio::test]
async fn empty_batch_reports_completion() {
    let runtime = start().await;
    let mut progress_rx = runtime.handle().subscribe(Topic::Progress);

    let outcome = runtime
        .handle()
        .valuate(BatchRequest::new(Vec::new()))
        .await
        .expect("empty batch");
    assert!(outcome.results.is_empty());

    match progress_rx.try_recv() {
        Ok(Event::Progress(event)) => assert_eq!(event.progress, 1.0),
        other => panic!("expected a completion report, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_batches_fail_with_valuation_errors() {
    let runtime = start().await;
    let handle = runtime.handle();

    let err = handle
        .valuate(BatchRequest::new(three_pairs()).with_iterations(0))
        .await
        .expect_err("zero iterations");
    assert!(matches!(
        err,
        RuntimeError::Valuation(ValuationError::ZeroIterations)
    ));

    let mut valuation_rx = handle.subscribe(Topic::Valuation);
    let stranger = Build::new(BuildId(9), "nobody");
    let err = handle
        .valuate(BatchRequest::new(vec![pair(
            sands(1, StatKey::AtkPercent),
            stranger,
            ArtifactSet::new(),
        )]))
        .await
        .expect_err("unknown character");
    assert!(matches!(err, RuntimeError::Valuation(ValuationError::Catalog(_))));
    assert!(matches!(
        valuation_rx.try_recv(),
        Ok(Event::Valuation(ValuationEvent::PairFailed { build: BuildId(9), .. }))
    ));
}

#[tokio::test]
async fn wrong_main_stat_and_equipped_candidate_edge_cases() {
    let runtime = start().await;
    let equipped = sands(1, StatKey::AtkPercent);
    let build = crit_build().with_equipped(ArtifactSlot::Sands, equipped.id);
    let loadout = ArtifactSet::from_artifacts([equipped.clone()]);

    let outcome = runtime
        .handle()
        .valuate(
            BatchRequest::new(vec![
                pair(sands(2, StatKey::DefPercent), build.clone(), loadout.clone()),
                pair(equipped, build, loadout),
            ])
            .with_iterations(100),
        )
        .await
        .expect("batch");

    let wrong = outcome.get(ArtifactId(2), BuildId(1)).expect("wrong main stat pair");
    assert_eq!(wrong.metric.report, ValuationReport::default());

    let same = outcome.get(ArtifactId(1), BuildId(1)).expect("equipped pair");
    assert_eq!(same.metric.report.plus_minus, 0.0);
    assert_eq!(same.metric.report.positive_plus_minus_odds, 0.0);
    assert!(same.metric.report.rating > 0.0);
}

#[tokio::test]
async fn file_cache_persists_across_runtimes() {
    let dir = tempfile::tempdir().expect("temp dir");

    let first = ValuationRuntime::builder()
        .config(config())
        .catalog(catalog())
        .cache(FileMetricCache::new(dir.path()).expect("open cache"))
        .build()
        .await
        .expect("first runtime");
    let valued = first
        .handle()
        .valuate(BatchRequest::new(three_pairs()).with_iterations(50))
        .await
        .expect("first batch");
    assert_eq!(valued.valued(), 3);
    first.shutdown().await.expect("shutdown");

    let second = ValuationRuntime::builder()
        .config(config())
        .catalog(catalog())
        .cache(FileMetricCache::new(dir.path()).expect("reopen cache"))
        .build()
        .await
        .expect("second runtime");
    let reused = second
        .handle()
        .valuate(BatchRequest::new(three_pairs()).with_iterations(50))
        .await
        .expect("second batch");
    assert_eq!(reused.skipped(), 3);

    let forced = second
        .handle()
        .valuate(BatchRequest::new(three_pairs()).with_iterations(50).forced())
        .await
        .expect("forced batch");
    assert_eq!(forced.valued(), 3);
}

#[tokio::test]
async fn bundled_content_drives_a_cross_batch() {
    let factory = ContentFactory::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../appraiser/content/data"));
    let runtime = ValuationRuntime::builder()
        .config(config())
        .content(&factory)
        .expect("bundled content")
        .build()
        .await
        .expect("runtime");

    let inventory = vec![
        Artifact::new(ArtifactId(10), ArtifactSlot::Goblet, Rarity::FIVE, StatKey::PyroDamage, "crimson_witch")
            .with_substat(StatKey::CritRate, 3.5)
            .expect("legal sub-stat"),
    ];
    let builds = vec![
        Build::new(BuildId(1), "hu_tao")
            .with_weapon("staff_of_homa")
            .with_main_stats(ArtifactSlot::Goblet, [StatKey::PyroDamage])
            .with_desired_stat(OverallStatKey::CritRate, 70.0, StatPriority::High)
            .with_equipped(ArtifactSlot::Goblet, ArtifactId(10)),
        Build::new(BuildId(2), "xiangling")
            .with_weapon("the_catch")
            .with_desired_stat(OverallStatKey::EnergyRecharge, 200.0, StatPriority::Medium),
    ];
    let candidates = vec![
        Artifact::new(ArtifactId(11), ArtifactSlot::Goblet, Rarity::FIVE, StatKey::PyroDamage, "crimson_witch")
            .with_substat(StatKey::CritRate, 3.9)
            .expect("legal sub-stat"),
    ];

    let request = BatchRequest::cross(&candidates, &builds, &inventory)
        .expect("loadouts resolve")
        .with_iterations(100);
    let outcome = runtime.handle().valuate(request).await.expect("batch");

    assert_eq!(outcome.results.len(), 2);
    assert!(outcome.get(ArtifactId(11), BuildId(1)).is_some());
    assert!(outcome.get(ArtifactId(11), BuildId(2)).is_some());
}
