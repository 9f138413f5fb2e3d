use bytemuck::{Pod, Zeroable};
use glam::DVec2;

/// One vertex of a sampled ray path.
///
/// `x` is horizontal range from the source, `z` is depth (positive down)
/// and `t` is the one-way travel time at which the ray reaches the vertex.
/// The layout is `#[repr(C)]` so a path can be handed to a renderer as raw
/// bytes via [`bytemuck::cast_slice`].
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Default, Pod, Zeroable)]
pub struct PathSample {
    pub x: f64,
    pub z: f64,
    pub t: f64,
}

impl PathSample {
    /// Create a new sample.
    pub fn new(x: f64, z: f64, t: f64) -> Self {
        Self { x, z, t }
    }

    /// The (x, z) position as a vector.
    #[inline]
    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.z)
    }

    /// The same sample with its range multiplied by `sign`.
    ///
    /// Rays are traced in a frame where range only grows; the caller's
    /// launch-angle sign is applied on the way out.
    #[inline]
    pub fn with_range_sign(&self, sign: f64) -> Self {
        Self::new(self.x * sign, self.z, self.t)
    }
}
