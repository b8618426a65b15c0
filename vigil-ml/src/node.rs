//! Isolation tree node implementation
//!
//! This module provides a compact node representation for isolation trees.
//! Nodes live in a flat array and refer to their children by index, which
//! keeps traversal free of pointer chasing.

use crate::{average_path_length, MLError, MLResult, Sample};

/// Node type in the isolation tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeType {
    /// Internal node with split condition
    Internal {
        /// Feature index to split on
        feature: u8,
        /// Split value
        split_value: f64,
        /// Left child index
        left: u16,
        /// Right child index
        right: u16,
    },
    /// Leaf node (external)
    External {
        /// Number of samples that reached this leaf
        size: u16,
    },
}

/// Compact node representation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    /// Node type and data
    pub node_type: NodeType,
    /// Path length from root
    pub depth: u8,
}

impl Node {
    /// Create an internal node
    pub fn internal(feature: u8, split_value: f64, left: u16, right: u16, depth: u8) -> Self {
        Self {
            node_type: NodeType::Internal {
                feature,
                split_value,
                left,
                right,
            },
            depth,
        }
    }

    /// Create an external (leaf) node
    pub fn external(size: u16, depth: u8) -> Self {
        Self {
            node_type: NodeType::External { size },
            depth,
        }
    }

    /// Check if node is a leaf
    pub fn is_leaf(&self) -> bool {
        matches!(self.node_type, NodeType::External { .. })
    }

    /// Path length credited to a sample ending at this node
    ///
    /// Leaves add `c(size)` to account for the subtree that was never built
    /// below them.
    pub fn path_length(&self) -> f64 {
        match self.node_type {
            NodeType::External { size } => self.depth as f64 + c_factor(size as usize),
            NodeType::Internal { .. } => self.depth as f64,
        }
    }

    /// Child index to visit next
    pub fn traverse(&self, sample: &Sample) -> MLResult<u16> {
        match self.node_type {
            NodeType::Internal {
                feature,
                split_value,
                left,
                right,
            } => {
                let value = sample
                    .get_feature(feature as usize)
                    .ok_or(MLError::InvalidFeature)?;

                if value < split_value {
                    Ok(left)
                } else {
                    Ok(right)
                }
            }
            NodeType::External { .. } => Err(MLError::InvalidConfig("cannot traverse from a leaf")),
        }
    }
}

/// Path length adjustment for a leaf holding `n` samples
pub fn c_factor(n: usize) -> f64 {
    average_path_length(n)
}
