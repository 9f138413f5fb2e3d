//! Straight-line propagation through a homogeneous layer.

use svp_core::Layer;
use svp_math::DVec2;

use crate::segment::{Direction, Segment, SegmentSolver, TraceState};

/// Vertical speed below this fraction of the sound speed counts as horizontal.
const HORIZONTAL_TOLERANCE: f64 = 1e-12;

/// Solver for layers whose gradient is below the homogeneous tolerance.
///
/// The whole layer uses its top velocity, so the ray keeps one incidence
/// angle `asin(p * v_top)` until it reaches a boundary or runs out of time.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearSegment;

impl SegmentSolver for LinearSegment {
    fn solve(&self, layer: &Layer, state: &TraceState) -> Segment {
        let velocity = layer.top_velocity;
        let theta = (state.p * velocity).min(1.0).asin();
        let direction = state.direction;

        let boundary = match direction {
            Direction::Down => layer.bottom_depth(),
            Direction::Up => layer.top_depth(),
        };
        let x_speed = velocity * theta.sin();
        let z_speed = direction.sign() * velocity * theta.cos();

        // A horizontal ray never reaches a boundary
        let dt_exit = if z_speed.abs() > HORIZONTAL_TOLERANCE * velocity {
            (boundary - state.z) / z_speed
        } else {
            f64::INFINITY
        };

        if dt_exit >= state.tt_left {
            let dt = state.tt_left;
            Segment {
                end: DVec2::new(state.x + x_speed * dt, state.z + z_speed * dt),
                dt,
                tt_left: 0.0,
                layer_step: 0,
                direction,
                turned: false,
                incidence: theta,
                arc: None,
            }
        } else {
            Segment {
                end: DVec2::new(state.x + x_speed * dt_exit, boundary),
                dt: dt_exit,
                tt_left: state.tt_left - dt_exit,
                layer_step: direction.layer_step(),
                direction,
                turned: false,
                incidence: theta,
                arc: None,
            }
        }
    }

    fn name(&self) -> &'static str {
        "linear"
    }
}
