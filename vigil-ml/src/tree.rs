//! Isolation tree implementation
//!
//! Trees are built by recursively partitioning a sub-sample on a random
//! feature at a random value between that feature's minimum and maximum,
//! until a point is isolated, all remaining points are identical, or the
//! depth limit is reached.

use crate::{MLError, MLResult, Node, NodeType, Rng, Sample};

/// Configuration for isolation tree
#[derive(Debug, Clone, Copy)]
pub struct TreeConfig {
    /// Maximum depth of tree
    pub max_depth: usize,
    /// Random seed for this tree
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            seed: 42,
        }
    }
}

/// Isolation tree structure
pub struct IsolationTree {
    /// Tree nodes in array representation, root first
    pub nodes: Vec<Node>,
    /// Configuration
    pub config: TreeConfig,
    rng: Rng,
}

impl IsolationTree {
    /// Create a new isolation tree
    pub fn new(config: TreeConfig) -> Self {
        Self {
            nodes: Vec::new(),
            config,
            rng: Rng::new(config.seed),
        }
    }

    /// Train the tree on samples
    pub fn fit(&mut self, samples: &[Sample]) -> MLResult<()> {
        if samples.is_empty() {
            return Err(MLError::InsufficientData);
        }
        if samples.len() > u16::MAX as usize {
            return Err(MLError::InvalidConfig("sub-sample too large for a tree"));
        }
        if self.config.max_depth > u8::MAX as usize {
            return Err(MLError::InvalidConfig("max depth too large"));
        }

        self.nodes.clear();
        self.build_tree(samples, 0)?;
        Ok(())
    }

    /// Build tree recursively, returning the index of the subtree root
    fn build_tree(&mut self, samples: &[Sample], depth: u8) -> MLResult<u16> {
        let node_index = self.nodes.len();
        if node_index >= u16::MAX as usize {
            return Err(MLError::InvalidConfig("tree exceeds node capacity"));
        }
        let node_index = node_index as u16;
        let leaf = Node::external(samples.len() as u16, depth);

        if depth as usize >= self.config.max_depth || samples.len() <= 1 {
            self.nodes.push(leaf);
            return Ok(node_index);
        }

        let Some((feature, split_value)) = self.select_split(samples)? else {
            // All samples identical
            self.nodes.push(leaf);
            return Ok(node_index);
        };

        let (left_samples, right_samples) = partition(samples, feature, split_value);
        if left_samples.is_empty() || right_samples.is_empty() {
            self.nodes.push(leaf);
            return Ok(node_index);
        }

        // Reserve the slot, children follow it
        self.nodes.push(leaf);
        let left = self.build_tree(&left_samples, depth + 1)?;
        let right = self.build_tree(&right_samples, depth + 1)?;
        self.nodes[node_index as usize] = Node::internal(feature, split_value, left, right, depth);

        Ok(node_index)
    }

    /// Pick a random non-constant feature and a split inside its range
    fn select_split(&mut self, samples: &[Sample]) -> MLResult<Option<(u8, f64)>> {
        let num_features = samples[0].num_features;
        if num_features == 0 {
            return Err(MLError::InvalidFeature);
        }

        let mut candidates: Vec<(u8, f64, f64)> = Vec::with_capacity(num_features);
        for feature in 0..num_features {
            let (min_val, max_val) = feature_range(samples, feature)?;
            if max_val > min_val {
                candidates.push((feature as u8, min_val, max_val));
            }
        }

        if candidates.is_empty() {
            return Ok(None);
        }

        let (feature, min_val, max_val) = candidates[self.rng.next_range(candidates.len())];
        let split_value = self.rng.next_f64_range(min_val, max_val);
        Ok(Some((feature, split_value)))
    }

    /// Calculate path length for a sample
    pub fn path_length(&self, sample: &Sample) -> f64 {
        let mut current_index = 0;

        while let Some(node) = self.nodes.get(current_index) {
            match node.node_type {
                NodeType::External { .. } => return node.path_length(),
                NodeType::Internal { .. } => match node.traverse(sample) {
                    Ok(next_index) => current_index = next_index as usize,
                    // Narrower sample than the training data
                    Err(_) => return node.path_length(),
                },
            }
        }

        0.0
    }

    /// Get the number of nodes in the tree
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get tree depth
    pub fn depth(&self) -> usize {
        self.nodes
            .iter()
            .map(|n| n.depth as usize)
            .max()
            .unwrap_or(0)
    }
}

/// Get min/max range for a feature
fn feature_range(samples: &[Sample], feature: usize) -> MLResult<(f64, f64)> {
    let mut min_val = f64::INFINITY;
    let mut max_val = f64::NEG_INFINITY;

    for sample in samples {
        let val = sample.get_feature(feature).ok_or(MLError::InvalidFeature)?;
        min_val = min_val.min(val);
        max_val = max_val.max(val);
    }

    Ok((min_val, max_val))
}

/// Partition samples based on split
fn partition(samples: &[Sample], feature: u8, split_value: f64) -> (Vec<Sample>, Vec<Sample>) {
    samples.iter().copied().partition(|sample| {
        sample
            .get_feature(feature as usize)
            .is_some_and(|val| val < split_value)
    })
}
