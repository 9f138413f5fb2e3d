//! Trace state and the per-layer solver seam.
//!
//! Each solver advances a ray through one layer (or until the travel-time
//! budget runs out inside it) and reports the result as a [`Segment`]. The
//! trace loop owns the [`TraceState`] and applies segments to it.

use svp_core::{Layer, LayerKind};
use svp_math::DVec2;

use crate::gradient::GradientSegment;
use crate::linear::LinearSegment;
use crate::vertical::VerticalSegment;

/// Vertical direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Moving to greater depth
    Down,
    /// Moving to shallower depth
    Up,
}

impl Direction {
    /// Direction for a takeoff angle measured from the downward vertical.
    pub fn from_takeoff_angle(angle_deg: f64) -> Self {
        if angle_deg.abs() < 90.0 {
            Direction::Down
        } else {
            Direction::Up
        }
    }

    /// Layer index step for a boundary exit in this direction.
    #[inline]
    pub fn layer_step(self) -> isize {
        match self {
            Direction::Down => 1,
            Direction::Up => -1,
        }
    }

    /// Sign of dz/dt.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Direction::Down => 1.0,
            Direction::Up => -1.0,
        }
    }

    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Direction::Down => Direction::Up,
            Direction::Up => Direction::Down,
        }
    }
}

/// Mutable state of one ray trace.
///
/// Created fresh by every trace call and never shared. Range `x` is kept in
/// a frame where it only grows; the launch-angle sign is applied to results.
#[derive(Debug, Clone)]
pub struct TraceState {
    /// Ray parameter sin(angle)/velocity, constant for the whole ray
    pub p: f64,
    /// Horizontal range from the source
    pub x: f64,
    /// Depth
    pub z: f64,
    /// Elapsed travel time
    pub t: f64,
    /// Remaining travel-time budget
    pub tt_left: f64,
    /// Current layer; -1 or `layer_count` once the ray has left the model
    pub layer: isize,
    /// Current vertical direction
    pub direction: Direction,
    /// Set once the ray has passed a turning point
    pub turned: bool,
    /// Incidence angle from the vertical at the current point, in [0, PI/2]
    pub incidence: f64,
    /// Number of segments traced so far
    pub segments: usize,
}

impl TraceState {
    /// Apply a solved segment.
    pub fn advance(&mut self, segment: &Segment) {
        self.x = segment.end.x;
        self.z = segment.end.y;
        self.t += segment.dt;
        self.tt_left = segment.tt_left;
        self.layer += segment.layer_step;
        self.direction = segment.direction;
        self.turned |= segment.turned;
        self.incidence = segment.incidence;
        self.segments += 1;
    }

    #[inline]
    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.z)
    }
}

/// Circle followed by a ray inside a gradient layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcGeometry {
    /// Circle centre as (x, z)
    pub center: DVec2,
    pub radius: f64,
    /// Velocity gradient of the layer
    pub gradient: f64,
}

/// Outcome of propagating a ray through (part of) one layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// End point as (x, z)
    pub end: DVec2,
    /// Time spent in this segment
    pub dt: f64,
    /// Budget remaining after the segment (0 when exhausted inside the layer)
    pub tt_left: f64,
    /// -1, 0 or +1 layer index change
    pub layer_step: isize,
    /// Vertical direction at the end point
    pub direction: Direction,
    /// True if the ray passed a turning point in this segment
    pub turned: bool,
    /// Incidence angle from the vertical at the end point, in [0, PI/2]
    pub incidence: f64,
    /// Circle geometry when the segment is an arc
    pub arc: Option<ArcGeometry>,
}

impl Segment {
    /// True if the budget ran out inside the layer.
    pub fn exhausted(&self) -> bool {
        self.tt_left <= 0.0
    }
}

/// Closed-form propagation of a ray through a single layer.
pub trait SegmentSolver: Send + Sync {
    /// Propagate from the state's position until the ray leaves the layer
    /// or the remaining budget is spent.
    fn solve(&self, layer: &Layer, state: &TraceState) -> Segment;

    /// Short name for logging.
    fn name(&self) -> &'static str;
}

static LINEAR: LinearSegment = LinearSegment;
static VERTICAL: VerticalSegment = VerticalSegment;
static GRADIENT: GradientSegment = GradientSegment;

/// Pick the solver for a layer and ray parameter.
pub fn select_solver(layer: &Layer, p: f64) -> &'static dyn SegmentSolver {
    match layer.kind {
        LayerKind::Gradient if p > 0.0 => &GRADIENT,
        LayerKind::Gradient => &VERTICAL,
        LayerKind::Homogeneous => &LINEAR,
    }
}

#[cfg(test)]
impl TraceState {
    /// State at range 0 in layer 0, for solver tests.
    pub(crate) fn at_depth(p: f64, z: f64, tt_left: f64, direction: Direction) -> Self {
        Self {
            p,
            x: 0.0,
            z,
            t: 0.0,
            tt_left,
            layer: 0,
            direction,
            turned: false,
            incidence: 0.0,
            segments: 0,
        }
    }
}
