//! Property tests for the anomaly window and the line parser

mod common;

use proptest::prelude::*;
use vigil_core::{AnomalyWindow, FeatureRecord, Presence, SampleParser};

use common::{generators::to_line, nz};

proptest! {
    #[test]
    fn window_never_exceeds_capacity(
        capacity in 1usize..80,
        flags in prop::collection::vec(any::<bool>(), 0..400),
    ) {
        let mut window = AnomalyWindow::new(nz(capacity));
        for flag in &flags {
            window.push(*flag);
            prop_assert!(window.len() <= capacity);
            prop_assert!(window.anomaly_count() <= window.len());
            let p = window.failure_probability();
            prop_assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn window_count_matches_recent_flags(
        capacity in 1usize..80,
        flags in prop::collection::vec(any::<bool>(), 0..400),
    ) {
        let mut window = AnomalyWindow::new(nz(capacity));
        for flag in &flags {
            window.push(*flag);
        }

        let start = flags.len().saturating_sub(capacity);
        let recent = &flags[start..];
        let expected = recent.iter().filter(|f| **f).count();
        prop_assert_eq!(window.anomaly_count(), expected);
        prop_assert_eq!(window.iter().collect::<Vec<_>>(), recent.to_vec());
        prop_assert_eq!(window.failure_probability(), expected as f64 / capacity as f64);
    }

    #[test]
    fn anomaly_never_lowers_and_benign_never_raises(
        capacity in 1usize..60,
        prefix in prop::collection::vec(any::<bool>(), 0..200),
        next in any::<bool>(),
    ) {
        let mut window = AnomalyWindow::new(nz(capacity));
        for flag in &prefix {
            window.push(*flag);
        }
        let before = window.failure_probability();
        window.push(next);
        let after = window.failure_probability();

        if next {
            prop_assert!(after >= before);
        } else {
            prop_assert!(after <= before);
        }
    }

    #[test]
    fn rendered_records_parse_back(
        humidity in -1000i32..1000,
        vibration in 0i32..5000,
        detected in any::<bool>(),
        pots in prop::array::uniform3(0i32..1024),
    ) {
        let presence = if detected { Presence::Detected } else { Presence::Clear };
        let record = FeatureRecord::new(humidity, vibration, presence, pots);
        let parsed = SampleParser::default().parse(&to_line(&record));
        prop_assert_eq!(parsed, Some(record));
    }

    #[test]
    fn parser_never_panics(line in ".{0,80}") {
        let _ = SampleParser::default().try_parse(&line);
    }
}
