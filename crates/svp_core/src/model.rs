//! Immutable layered sound-velocity model.
//!
//! A model is built once per profile and shared read-only by any number of
//! ray traces, including traces running on other threads.

use serde::{Deserialize, Serialize};
use svp_math::DepthSpan;
use thiserror::Error;

use crate::layer::Layer;

/// A (depth, velocity) pair of a sound-velocity profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityNode {
    /// Depth in metres, positive down
    pub depth: f64,
    /// Sound speed in m/s
    pub velocity: f64,
}

impl VelocityNode {
    pub fn new(depth: f64, velocity: f64) -> Self {
        Self { depth, velocity }
    }
}

/// Errors that can occur while building a velocity model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Velocity model needs at least 2 nodes, got {0}")]
    TooFewNodes(usize),

    #[error("Depth and velocity arrays differ in length ({depths} depths, {velocities} velocities)")]
    LengthMismatch { depths: usize, velocities: usize },

    #[error("Node {index} depth {depth} is not below previous depth {previous}")]
    NonIncreasingDepth { index: usize, depth: f64, previous: f64 },

    #[error("Node {index} velocity {velocity} is not positive")]
    NonPositiveVelocity { index: usize, velocity: f64 },

    #[error("Node {index} has a non-finite value")]
    NonFiniteValue { index: usize },
}

/// A depth-layered sound-velocity model.
#[derive(Debug, Clone)]
pub struct VelocityModel {
    nodes: Vec<VelocityNode>,
    layers: Vec<Layer>,
}

impl VelocityModel {
    /// Build a model from an ordered node list.
    ///
    /// Depths must be strictly increasing and velocities positive.
    pub fn new(nodes: Vec<VelocityNode>) -> Result<Self, ModelError> {
        if nodes.len() < 2 {
            return Err(ModelError::TooFewNodes(nodes.len()));
        }

        for (index, node) in nodes.iter().enumerate() {
            if !node.depth.is_finite() || !node.velocity.is_finite() {
                return Err(ModelError::NonFiniteValue { index });
            }
            if node.velocity <= 0.0 {
                return Err(ModelError::NonPositiveVelocity {
                    index,
                    velocity: node.velocity,
                });
            }
            if index > 0 && node.depth <= nodes[index - 1].depth {
                return Err(ModelError::NonIncreasingDepth {
                    index,
                    depth: node.depth,
                    previous: nodes[index - 1].depth,
                });
            }
        }

        let layers: Vec<Layer> = nodes
            .windows(2)
            .map(|pair| Layer::new(pair[0].depth, pair[1].depth, pair[0].velocity, pair[1].velocity))
            .collect();

        log::debug!(
            "Built velocity model: {} nodes, {} layers, {} gradient layers, depth {}..{}",
            nodes.len(),
            layers.len(),
            layers.iter().filter(|l| l.is_gradient()).count(),
            nodes[0].depth,
            nodes[nodes.len() - 1].depth
        );

        Ok(Self { nodes, layers })
    }

    /// Build a model from parallel depth and velocity arrays.
    pub fn from_profile(depths: &[f64], velocities: &[f64]) -> Result<Self, ModelError> {
        if depths.len() != velocities.len() {
            return Err(ModelError::LengthMismatch {
                depths: depths.len(),
                velocities: velocities.len(),
            });
        }

        let nodes = depths
            .iter()
            .zip(velocities)
            .map(|(&depth, &velocity)| VelocityNode::new(depth, velocity))
            .collect();
        Self::new(nodes)
    }

    /// Profile nodes, shallowest first.
    pub fn nodes(&self) -> &[VelocityNode] {
        &self.nodes
    }

    /// Layers, shallowest first.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Number of layers (nodes - 1).
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Get the layer at `index`.
    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// Depth range covered by the model.
    pub fn depth_range(&self) -> DepthSpan {
        DepthSpan::new(self.nodes[0].depth, self.nodes[self.nodes.len() - 1].depth)
    }

    /// Index of the layer containing `depth`.
    ///
    /// A depth exactly on an interior node belongs to the deeper of the two
    /// layers sharing it. Returns `None` outside the model.
    pub fn find_layer_containing(&self, depth: f64) -> Option<usize> {
        self.layers.iter().rposition(|layer| layer.span.contains(depth))
    }

    /// Sound speed at `depth`, or `None` outside the model.
    pub fn velocity_at(&self, depth: f64) -> Option<f64> {
        self.find_layer_containing(depth)
            .map(|index| self.layers[index].velocity_at(depth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LayerKind;

    fn two_layer_model() -> VelocityModel {
        VelocityModel::from_profile(&[0.0, 100.0, 1000.0], &[1500.0, 1550.0, 1600.0]).unwrap()
    }

    #[test]
    fn test_build_layers() {
        let model = two_layer_model();

        assert_eq!(model.nodes().len(), 3);
        assert_eq!(model.layer_count(), 2);

        let upper = model.layer(0).unwrap();
        assert_eq!(upper.kind, LayerKind::Gradient);
        assert!((upper.gradient - 0.5).abs() < 1e-12);

        let lower = model.layer(1).unwrap();
        assert!((lower.gradient - 1.0 / 18.0).abs() < 1e-12);
        assert_eq!(lower.top_depth(), 100.0);
        assert_eq!(lower.bottom_depth(), 1000.0);

        assert!(model.layer(2).is_none());
        assert_eq!(model.depth_range(), DepthSpan::new(0.0, 1000.0));
    }

    #[test]
    fn test_too_few_nodes() {
        assert_eq!(
            VelocityModel::from_profile(&[0.0], &[1500.0]).unwrap_err(),
            ModelError::TooFewNodes(1)
        );
        assert_eq!(
            VelocityModel::new(Vec::new()).unwrap_err(),
            ModelError::TooFewNodes(0)
        );
    }

    #[test]
    fn test_non_increasing_depth() {
        let err = VelocityModel::from_profile(&[0.0, 50.0, 50.0], &[1500.0, 1510.0, 1520.0]).unwrap_err();
        assert_eq!(
            err,
            ModelError::NonIncreasingDepth { index: 2, depth: 50.0, previous: 50.0 }
        );

        let err = VelocityModel::from_profile(&[10.0, 0.0], &[1500.0, 1510.0]).unwrap_err();
        assert!(matches!(err, ModelError::NonIncreasingDepth { index: 1, .. }));
    }

    #[test]
    fn test_bad_values() {
        assert_eq!(
            VelocityModel::from_profile(&[0.0, 10.0], &[1500.0]).unwrap_err(),
            ModelError::LengthMismatch { depths: 2, velocities: 1 }
        );
        assert_eq!(
            VelocityModel::from_profile(&[0.0, 10.0], &[1500.0, 0.0]).unwrap_err(),
            ModelError::NonPositiveVelocity { index: 1, velocity: 0.0 }
        );
        assert_eq!(
            VelocityModel::from_profile(&[0.0, f64::NAN], &[1500.0, 1500.0]).unwrap_err(),
            ModelError::NonFiniteValue { index: 1 }
        );
    }

    #[test]
    fn test_find_layer_containing() {
        let model = two_layer_model();

        assert_eq!(model.find_layer_containing(0.0), Some(0));
        assert_eq!(model.find_layer_containing(50.0), Some(0));
        // Shared node goes to the deeper layer
        assert_eq!(model.find_layer_containing(100.0), Some(1));
        assert_eq!(model.find_layer_containing(1000.0), Some(1));

        assert_eq!(model.find_layer_containing(-0.01), None);
        assert_eq!(model.find_layer_containing(1000.01), None);
    }

    #[test]
    fn test_velocity_at() {
        let model = two_layer_model();

        assert!((model.velocity_at(50.0).unwrap() - 1525.0).abs() < 1e-9);
        assert!((model.velocity_at(100.0).unwrap() - 1550.0).abs() < 1e-9);
        assert!((model.velocity_at(550.0).unwrap() - 1575.0).abs() < 1e-9);
        assert_eq!(model.velocity_at(2000.0), None);
    }

    #[test]
    fn test_model_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<VelocityModel>();
    }
}
