//! Isolation Forest implementation
//!
//! This module provides the main Isolation Forest algorithm that combines
//! multiple isolation trees for robust anomaly detection.
//!
//! Every tree is trained on its own sub-sample drawn without replacement
//! from the batch. Tree seeds are drawn from the forest's generator, so a
//! forest is fully determined by its configuration and its batch.

use log::debug;

use crate::{
    calculate_anomaly_score, AnomalyScore, IsolationTree, MLError, MLResult, Rng, Sample,
    TreeConfig, DEFAULT_ANOMALY_THRESHOLD, DEFAULT_NUM_TREES, DEFAULT_SAMPLE_SIZE, DEFAULT_SEED,
};

/// Configuration for Isolation Forest
#[derive(Debug, Clone, PartialEq)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub num_trees: usize,
    /// Upper bound on the sub-sample each tree is trained on
    pub sample_size: usize,
    /// Maximum tree depth; `None` uses `ceil(log2(sub-sample))`
    pub max_depth: Option<usize>,
    /// Random seed
    pub seed: u64,
    /// Anomaly threshold on the normalised score
    pub anomaly_threshold: f64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            num_trees: DEFAULT_NUM_TREES,
            sample_size: DEFAULT_SAMPLE_SIZE,
            max_depth: None,
            seed: DEFAULT_SEED,
            anomaly_threshold: DEFAULT_ANOMALY_THRESHOLD,
        }
    }
}

impl ForestConfig {
    fn validate(&self) -> MLResult<()> {
        if self.num_trees == 0 {
            return Err(MLError::InvalidConfig("forest needs at least one tree"));
        }
        if self.sample_size == 0 {
            return Err(MLError::InvalidConfig("sample size must be non-zero"));
        }
        if self.max_depth == Some(0) {
            return Err(MLError::InvalidConfig("max depth must be non-zero"));
        }
        Ok(())
    }
}

/// Trained Isolation Forest
///
/// The only way to obtain one is [`IsolationForest::fit`], so every forest
/// holds at least one tree and can be scored.
pub struct IsolationForest {
    /// Individual trees
    trees: Vec<IsolationTree>,
    /// Configuration
    config: ForestConfig,
    /// Sub-sample size the trees were trained on
    sample_size: usize,
    /// Number of samples in the training batch
    num_samples: usize,
    /// Width of the training samples
    num_features: usize,
}

impl IsolationForest {
    /// Train a forest on `samples`
    ///
    /// The generator starts from `config.seed`, so the result depends only on
    /// the configuration and `samples`.
    pub fn fit(config: ForestConfig, samples: &[Sample]) -> MLResult<Self> {
        config.validate()?;
        let first = samples.first().ok_or(MLError::InsufficientData)?;
        let num_features = first.num_features;
        if num_features == 0 {
            return Err(MLError::InvalidFeature);
        }
        if let Some(other) = samples.iter().find(|s| s.num_features != num_features) {
            return Err(MLError::FeatureMismatch {
                expected: num_features,
                found: other.num_features,
            });
        }

        let sample_size = config.sample_size.min(samples.len());
        let max_depth = config
            .max_depth
            .unwrap_or_else(|| default_max_depth(sample_size));

        let mut rng = Rng::new(config.seed);
        let mut trees = Vec::with_capacity(config.num_trees);

        for _ in 0..config.num_trees {
            let tree_config = TreeConfig {
                max_depth,
                seed: rng.next_u64(),
            };
            let subset = sample_subset(&mut rng, samples, sample_size);

            let mut tree = IsolationTree::new(tree_config);
            tree.fit(&subset)?;
            trees.push(tree);
        }

        debug!(
            "Isolation forest trained: {} trees, sub-sample {}, depth limit {}",
            trees.len(),
            sample_size,
            max_depth
        );
        Ok(Self {
            trees,
            config,
            sample_size,
            num_samples: samples.len(),
            num_features,
        })
    }

    /// Calculate anomaly score for a sample
    pub fn anomaly_score(&self, sample: &Sample) -> AnomalyScore {
        // Average path length across all trees
        let total_path_length: f64 = self.trees.iter().map(|tree| tree.path_length(sample)).sum();
        let avg_path_length = total_path_length / self.trees.len() as f64;

        let score = calculate_anomaly_score(avg_path_length, self.sample_size);
        AnomalyScore::new(score, avg_path_length, self.trees.len())
    }

    /// Signed decision value, negative when anomalous
    pub fn decision_function(&self, sample: &Sample) -> f64 {
        self.anomaly_score(sample)
            .decision(self.config.anomaly_threshold)
    }

    /// Check if a sample is an anomaly
    pub fn is_anomaly(&self, sample: &Sample) -> bool {
        self.anomaly_score(sample)
            .is_anomaly(self.config.anomaly_threshold)
    }

    /// Configuration
    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Get forest statistics
    pub fn stats(&self) -> ForestStats {
        let total_nodes: usize = self.trees.iter().map(|t| t.node_count()).sum();

        let max_depth = self.trees.iter().map(|t| t.depth()).max().unwrap_or(0);

        ForestStats {
            num_trees: self.trees.len(),
            total_nodes,
            max_depth,
            num_samples: self.num_samples,
            sample_size: self.sample_size,
            num_features: self.num_features,
            threshold: self.config.anomaly_threshold,
        }
    }
}

/// Sample a subset of data for tree training, without replacement
fn sample_subset(rng: &mut Rng, samples: &[Sample], sample_size: usize) -> Vec<Sample> {
    if sample_size >= samples.len() {
        return samples.to_vec();
    }

    let mut indices: Vec<usize> = (0..samples.len()).collect();

    // Partial Fisher-Yates shuffle
    for i in 0..sample_size {
        let j = i + rng.next_range(samples.len() - i);
        indices.swap(i, j);
    }

    indices[..sample_size].iter().map(|&i| samples[i]).collect()
}

/// `ceil(log2(n))`, at least 1
fn default_max_depth(sample_size: usize) -> usize {
    let n = sample_size.max(2);
    (usize::BITS - (n - 1).leading_zeros()) as usize
}

/// Forest statistics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestStats {
    /// Number of trees
    pub num_trees: usize,
    /// Total nodes across all trees
    pub total_nodes: usize,
    /// Maximum tree depth
    pub max_depth: usize,
    /// Number of training samples
    pub num_samples: usize,
    /// Sub-sample size per tree
    pub sample_size: usize,
    /// Width of the training samples
    pub num_features: usize,
    /// Anomaly threshold
    pub threshold: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_data() -> Vec<Sample> {
        let mut samples = Vec::new();

        // Normal data cluster
        for i in 0..15 {
            let temp = 20.0 + (i as f64 * 0.1);
            let humidity = 50.0 + (i as f64 * 0.2);
            samples.push(Sample::new(&[temp, humidity]).unwrap());
        }

        // Anomalies
        samples.push(Sample::new(&[35.0, 90.0]).unwrap());
        samples.push(Sample::new(&[5.0, 20.0]).unwrap());

        samples
    }

    fn small_config() -> ForestConfig {
        ForestConfig {
            num_trees: 5,
            sample_size: 10,
            max_depth: Some(6),
            seed: 123,
            anomaly_threshold: 0.5,
        }
    }

    #[test]
    fn test_default_max_depth() {
        assert_eq!(default_max_depth(1), 1);
        assert_eq!(default_max_depth(2), 1);
        assert_eq!(default_max_depth(3), 2);
        assert_eq!(default_max_depth(100), 7);
        assert_eq!(default_max_depth(256), 8);
    }

    #[test]
    fn test_forest_fit() {
        let forest = IsolationForest::fit(small_config(), &create_test_data()).unwrap();

        let stats = forest.stats();
        assert_eq!(stats.num_trees, 5);
        assert_eq!(stats.sample_size, 10);
        assert_eq!(stats.num_samples, 17);
        assert_eq!(stats.num_features, 2);
        assert!(stats.total_nodes > 0);
        assert!(stats.max_depth <= 6);
    }

    #[test]
    fn test_anomaly_detection() {
        let forest = IsolationForest::fit(ForestConfig::default(), &create_test_data()).unwrap();

        let normal = Sample::new(&[20.7, 51.4]).unwrap();
        let anomaly = Sample::new(&[35.0, 90.0]).unwrap();
        let normal_score = forest.anomaly_score(&normal);
        let anomaly_score = forest.anomaly_score(&anomaly);

        assert!(anomaly_score.score > normal_score.score);
        assert!(forest.is_anomaly(&anomaly));
        assert!(forest.decision_function(&anomaly) < 0.0);
    }

    #[test]
    fn test_fit_is_reproducible() {
        let samples = create_test_data();
        let probe = Sample::new(&[30.0, 70.0]).unwrap();

        let a = IsolationForest::fit(small_config(), &samples).unwrap();
        let b = IsolationForest::fit(small_config(), &samples).unwrap();
        assert_eq!(a.anomaly_score(&probe), b.anomaly_score(&probe));

        let reseeded = IsolationForest::fit(
            ForestConfig {
                seed: 7,
                ..small_config()
            },
            &samples,
        )
        .unwrap();
        assert_eq!(reseeded.stats().num_trees, a.stats().num_trees);
    }

    #[test]
    fn test_failed_fit_yields_no_forest() {
        assert!(matches!(
            IsolationForest::fit(ForestConfig::default(), &[]),
            Err(MLError::InsufficientData)
        ));

        let mixed = vec![
            Sample::new(&[1.0, 2.0]).unwrap(),
            Sample::new(&[1.0]).unwrap(),
        ];
        assert!(matches!(
            IsolationForest::fit(ForestConfig::default(), &mixed),
            Err(MLError::FeatureMismatch { expected: 2, found: 1 })
        ));

        let treeless = ForestConfig {
            num_trees: 0,
            ..ForestConfig::default()
        };
        assert!(matches!(
            IsolationForest::fit(treeless, &create_test_data()),
            Err(MLError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_every_forest_has_trees() {
        let samples = create_test_data();
        let config = ForestConfig {
            num_trees: 3,
            ..ForestConfig::default()
        };
        let forest = IsolationForest::fit(config, &samples).unwrap();

        assert_eq!(forest.stats().num_trees, 3);
        assert_eq!(forest.anomaly_score(&samples[0]).num_trees, 3);
    }

    #[test]
    fn test_identical_batch_scores_neutral() {
        let samples = vec![Sample::new(&[48.0, 2.0, 1.0, 512.0, 300.0, 1020.0]).unwrap(); 100];
        let forest = IsolationForest::fit(ForestConfig::default(), &samples).unwrap();

        let score = forest.anomaly_score(&samples[0]);
        assert!((score.score - 0.5).abs() < 1e-12);
        assert!(!forest.is_anomaly(&samples[0]));
    }
}
