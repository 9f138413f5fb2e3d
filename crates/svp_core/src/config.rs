//! Per-trace configuration.
//!
//! `TraceConfig` carries everything about a trace that is not the ray
//! itself: how the launch angle is corrected for a surface sound velocity
//! that differs from the profile, and whether and how the path is sampled.

use serde::{Deserialize, Serialize};

/// Launch-angle correction applied when a surface sound velocity is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SsvMode {
    /// Use the launch angle as given.
    Off,
    /// Treat the surface velocity as correct and refract the angle across a
    /// horizontal interface into the profile velocity at the source. The
    /// null angle is ignored.
    Horizontal,
    /// Treat the surface velocity as wrong: refract in a frame rotated by
    /// the null angle so the receive array geometry is respected.
    #[default]
    Rotated,
}

/// What the path sampler records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathMode {
    /// Subdivide each circular arc for plotting.
    #[default]
    Full,
    /// Record only the end point of each layer segment.
    RangeTable,
}

/// Trace configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Sound speed at the transducer used to form the launch angle (m/s).
    /// Zero or negative disables launch-angle correction.
    pub surface_velocity: f64,
    /// Reference angle of the receive array in degrees
    pub null_angle: f64,
    /// Launch-angle correction mode
    pub ssv_mode: SsvMode,
    /// Path sampling mode
    pub path_mode: PathMode,
    /// Maximum number of path samples (0 disables the path)
    pub max_path_points: usize,
    /// Segments allowed between turning points; `None` uses 4 per layer plus 4
    pub max_iterations: Option<usize>,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            surface_velocity: 0.0,
            null_angle: 0.0,
            ssv_mode: SsvMode::Rotated,
            path_mode: PathMode::Full,
            max_path_points: 0,
            max_iterations: None,
        }
    }
}

impl TraceConfig {
    /// Create a configuration with no correction and no path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the surface sound velocity and array null angle.
    pub fn with_surface_velocity(mut self, surface_velocity: f64, null_angle: f64) -> Self {
        self.surface_velocity = surface_velocity;
        self.null_angle = null_angle;
        self
    }

    /// Set the launch-angle correction mode.
    pub fn with_ssv_mode(mut self, mode: SsvMode) -> Self {
        self.ssv_mode = mode;
        self
    }

    /// Enable path sampling with up to `max_points` samples.
    pub fn with_path(mut self, mode: PathMode, max_points: usize) -> Self {
        self.path_mode = mode;
        self.max_path_points = max_points;
        self
    }

    /// Override the number of segments allowed between turning points.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// True when the launch angle will be corrected before tracing.
    pub fn corrects_launch_angle(&self) -> bool {
        self.surface_velocity > 0.0 && self.ssv_mode != SsvMode::Off
    }

    /// Segments allowed between turning points in a model with
    /// `layer_count` layers. The count restarts at every turn.
    pub fn iteration_limit(&self, layer_count: usize) -> usize {
        self.max_iterations.unwrap_or(4 * layer_count + 4)
    }
}
