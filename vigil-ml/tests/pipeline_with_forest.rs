//! End-to-end tests: detection pipeline driven by the Isolation Forest

use std::num::NonZeroUsize;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vigil_core::{
    AnomalyScorer, DetectionPipeline, FeatureRecord, Phase, PipelineConfig, PipelineError,
    Presence, TrainedScorer,
};
use vigil_ml::{ForestConfig, IsolationForestScorer};

/// Value clustered around `center`, spread at most `spread` either side
fn around(rng: &mut StdRng, center: i32, spread: i32) -> i32 {
    let sum: i32 = (0..3).map(|_| rng.gen_range(-spread..=spread)).sum();
    center + sum / 3
}

fn calm_record(rng: &mut StdRng) -> FeatureRecord {
    let presence = if rng.gen_bool(0.2) {
        Presence::Detected
    } else {
        Presence::Clear
    };
    FeatureRecord::new(
        around(rng, 50, 5),
        around(rng, 4, 4),
        presence,
        [around(rng, 510, 20), around(rng, 305, 15), around(rng, 1010, 10)],
    )
}

fn violent_record(rng: &mut StdRng) -> FeatureRecord {
    FeatureRecord::new(
        rng.gen_range(85..99),
        rng.gen_range(600..1000),
        Presence::Detected,
        [rng.gen_range(0..50), rng.gen_range(900..1023), rng.gen_range(0..50)],
    )
}

#[test]
fn test_untrainable_forest_never_scores() {
    let mut rng = StdRng::seed_from_u64(3);
    let treeless = IsolationForestScorer::new(ForestConfig {
        num_trees: 0,
        ..ForestConfig::default()
    });
    let config = PipelineConfig::default()
        .with_calibration_samples(NonZeroUsize::new(10).unwrap());
    let mut pipeline = DetectionPipeline::new(treeless, config);

    for _ in 0..9 {
        assert_eq!(pipeline.ingest(&calm_record(&mut rng)).unwrap(), 0.0);
    }
    assert!(matches!(
        pipeline.ingest(&calm_record(&mut rng)),
        Err(PipelineError::TrainingFailed { samples: 10, .. })
    ));
    assert_eq!(pipeline.phase(), Phase::Faulted);

    // An extreme record is refused rather than scored as benign
    assert!(matches!(
        pipeline.ingest(&violent_record(&mut rng)),
        Err(PipelineError::ModelUnavailable)
    ));
}

#[test]
fn test_forest_pipeline_detects_sustained_fault() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut pipeline =
        DetectionPipeline::new(IsolationForestScorer::default(), PipelineConfig::default());

    for _ in 0..100 {
        assert_eq!(pipeline.ingest(&calm_record(&mut rng)).unwrap(), 0.0);
    }
    assert_eq!(pipeline.phase(), Phase::Detecting);

    let mut probability = 0.0;
    for _ in 0..50 {
        probability = pipeline.ingest(&violent_record(&mut rng)).unwrap();
    }
    assert_eq!(probability, 1.0);
}

#[test]
fn test_forest_pipeline_stays_mostly_quiet_on_calm_data() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut pipeline =
        DetectionPipeline::new(IsolationForestScorer::default(), PipelineConfig::default());

    for _ in 0..100 {
        pipeline.ingest(&calm_record(&mut rng)).unwrap();
    }
    let mut probability = 0.0;
    for _ in 0..50 {
        probability = pipeline.ingest(&calm_record(&mut rng)).unwrap();
    }
    assert!(probability < 0.5, "calm data flagged at {}", probability);
}

#[test]
fn test_identical_calibration_scores_on_boundary() {
    let record = FeatureRecord::new(48, 2, Presence::Detected, [512, 300, 1020]);
    let config = PipelineConfig::default()
        .with_window_capacity(NonZeroUsize::new(10).unwrap());
    let mut pipeline = DetectionPipeline::new(IsolationForestScorer::default(), config);

    for _ in 0..100 {
        pipeline.ingest(&record).unwrap();
    }
    // Every point sits in a single leaf, so nothing is below the boundary
    for _ in 0..10 {
        assert_eq!(pipeline.ingest(&record).unwrap(), 0.0);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn decision_is_reproducible_and_bounded(
        seed in any::<u64>(),
        probe in prop::array::uniform6(-1000.0f64..2000.0),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let batch: Vec<_> = (0..100).map(|_| calm_record(&mut rng).features()).collect();
        let scorer = IsolationForestScorer::new(ForestConfig {
            num_trees: 20,
            ..ForestConfig::default()
        });

        let a = scorer.fit(&batch).unwrap();
        let b = scorer.fit(&batch).unwrap();
        let d = a.score(&probe);

        prop_assert_eq!(d, b.score(&probe));
        prop_assert!((-0.5..0.5).contains(&d));
    }
}
