//! Anomaly score calculation
//!
//! Converts the mean path length across trees into the normalised score
//! `s(x)` in `(0, 1]` and into the signed decision value the pipeline
//! consumes.

use crate::average_path_length;

/// Anomaly score result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyScore {
    /// Normalised score; 0.5 is the boundary, higher is more anomalous
    pub score: f64,
    /// Average path length across trees
    pub avg_path_length: f64,
    /// Number of trees used
    pub num_trees: usize,
}

impl AnomalyScore {
    /// Create a new anomaly score
    pub fn new(score: f64, avg_path_length: f64, num_trees: usize) -> Self {
        Self {
            score,
            avg_path_length,
            num_trees,
        }
    }

    /// Check if score indicates an anomaly
    pub fn is_anomaly(&self, threshold: f64) -> bool {
        self.score > threshold
    }

    /// Signed decision value, negative when anomalous
    pub fn decision(&self, threshold: f64) -> f64 {
        threshold - self.score
    }
}

/// Calculate anomaly score from path lengths
///
/// Uses the formula: score = 2^(-E(h(x))/c(ψ))
/// where E(h(x)) is the mean path length and ψ the per-tree sub-sample size
pub fn calculate_anomaly_score(avg_path_length: f64, sample_size: usize) -> f64 {
    let expected_path = average_path_length(sample_size);
    if expected_path == 0.0 {
        return 0.5; // Neutral score
    }

    libm::exp2(-avg_path_length / expected_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anomaly_score() {
        let score = AnomalyScore::new(0.7, 3.5, 100);
        assert!(score.is_anomaly(0.5));
        assert!(!score.is_anomaly(0.8));
        assert!((score.decision(0.5) + 0.2).abs() < 1e-12);

        let normal = AnomalyScore::new(0.4, 9.0, 100);
        assert!(!normal.is_anomaly(0.5));
        assert!(normal.decision(0.5) > 0.0);
    }

    #[test]
    fn test_calculate_anomaly_score() {
        // Short path = anomaly (high score)
        assert!(calculate_anomaly_score(2.0, 256) > 0.8);

        // Expected path length sits exactly on the boundary
        let expected = average_path_length(256);
        assert!((calculate_anomaly_score(expected, 256) - 0.5).abs() < 1e-12);

        // Longer than expected = more normal
        assert!(calculate_anomaly_score(expected * 1.2, 256) < 0.5);

        // Edge cases
        assert_eq!(calculate_anomaly_score(0.0, 0), 0.5);
        assert_eq!(calculate_anomaly_score(0.0, 1), 0.5);
    }
}
