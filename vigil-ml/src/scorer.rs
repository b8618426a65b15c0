//! Pipeline adapter for the Isolation Forest
//!
//! [`IsolationForestScorer`] holds the forest configuration and implements
//! the untrained half of the model capability; fitting yields an
//! [`IsolationForest`], which implements the trained half.

use log::info;
use vigil_core::{AnomalyScorer, FeatureVector, ScorerError, ScorerResult, TrainedScorer};

use crate::{ForestConfig, IsolationForest, MLError, Sample};

/// Untrained Isolation Forest model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IsolationForestScorer {
    config: ForestConfig,
}

impl IsolationForestScorer {
    /// Scorer with a custom forest configuration
    pub fn new(config: ForestConfig) -> Self {
        Self { config }
    }

    /// Forest configuration
    pub fn config(&self) -> &ForestConfig {
        &self.config
    }
}

impl AnomalyScorer for IsolationForestScorer {
    type Trained = IsolationForest;

    fn fit(&self, batch: &[FeatureVector]) -> ScorerResult<IsolationForest> {
        if batch.is_empty() {
            return Err(ScorerError::EmptyBatch);
        }

        let samples = batch
            .iter()
            .map(|features| Sample::new(features))
            .collect::<Result<Vec<_>, _>>()
            .map_err(training_error)?;

        let forest =
            IsolationForest::fit(self.config.clone(), &samples).map_err(training_error)?;

        let stats = forest.stats();
        info!(
            "Isolation forest fitted on {} samples ({} trees, {} nodes)",
            stats.num_samples, stats.num_trees, stats.total_nodes
        );
        Ok(forest)
    }
}

impl TrainedScorer for IsolationForest {
    fn score(&self, features: &FeatureVector) -> f64 {
        match Sample::new(features) {
            Ok(sample) => self.decision_function(&sample),
            // Non-finite input cannot be placed in any tree
            Err(_) => f64::NEG_INFINITY,
        }
    }
}

fn training_error(e: MLError) -> ScorerError {
    match e {
        MLError::InsufficientData => ScorerError::EmptyBatch,
        other => ScorerError::Training(other.to_string()),
    }
}
