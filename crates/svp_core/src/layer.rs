//! Layer records derived from consecutive velocity nodes.
//!
//! Sound speed varies linearly with depth inside each layer, so a ray in a
//! layer with a non-zero gradient follows a circular arc whose centre lies
//! at the depth where the velocity law extrapolates to zero.

use svp_math::DepthSpan;

/// Gradients at or below this magnitude (1/s) are treated as homogeneous.
pub const GRADIENT_TOLERANCE: f64 = 0.00001;

/// How rays propagate through a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    /// Constant velocity: rays are straight lines.
    Homogeneous,
    /// Constant non-zero gradient: rays are circular arcs.
    Gradient,
}

/// One layer of a velocity model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layer {
    /// Depth interval covered by the layer
    pub span: DepthSpan,
    /// Sound speed at the top of the layer (m/s)
    pub top_velocity: f64,
    /// Sound speed at the bottom of the layer (m/s)
    pub bottom_velocity: f64,
    /// Velocity gradient dv/dz (1/s)
    pub gradient: f64,
    /// Propagation regime
    pub kind: LayerKind,
    /// Depth at which the velocity law reaches zero (0.0 for homogeneous layers)
    center_depth: f64,
}

impl Layer {
    /// Build a layer between two nodes. `top_depth < bottom_depth` is the
    /// caller's responsibility.
    pub fn new(top_depth: f64, bottom_depth: f64, top_velocity: f64, bottom_velocity: f64) -> Self {
        let gradient = (bottom_velocity - top_velocity) / (bottom_depth - top_depth);
        let (kind, center_depth) = if gradient.abs() > GRADIENT_TOLERANCE {
            (LayerKind::Gradient, top_depth - top_velocity / gradient)
        } else {
            (LayerKind::Homogeneous, 0.0)
        };

        Self {
            span: DepthSpan::new(top_depth, bottom_depth),
            top_velocity,
            bottom_velocity,
            gradient,
            kind,
            center_depth,
        }
    }

    #[inline]
    pub fn top_depth(&self) -> f64 {
        self.span.top
    }

    #[inline]
    pub fn bottom_depth(&self) -> f64 {
        self.span.bottom
    }

    #[inline]
    pub fn thickness(&self) -> f64 {
        self.span.thickness()
    }

    #[inline]
    pub fn is_gradient(&self) -> bool {
        self.kind == LayerKind::Gradient
    }

    /// Depth of the arc centres for rays in this layer.
    ///
    /// Only meaningful for gradient layers; `None` for homogeneous ones.
    pub fn center_depth(&self) -> Option<f64> {
        match self.kind {
            LayerKind::Gradient => Some(self.center_depth),
            LayerKind::Homogeneous => None,
        }
    }

    /// Sound speed at `depth` following the layer's linear law.
    ///
    /// Depths outside the layer are extrapolated.
    #[inline]
    pub fn velocity_at(&self, depth: f64) -> f64 {
        self.top_velocity + (depth - self.span.top) * self.gradient
    }
}
