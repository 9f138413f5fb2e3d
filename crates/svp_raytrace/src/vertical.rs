//! Vertical propagation through a gradient layer.
//!
//! With zero ray parameter the arc formulas are undefined. Travelling
//! straight down, dz/dt = v and dv/dz = g, so v(t) = v0 * exp(g t); going
//! up the exponent changes sign.

use svp_core::Layer;
use svp_math::DVec2;

use crate::segment::{Direction, Segment, SegmentSolver, TraceState};

/// Solver for vertical rays (p = 0) in gradient layers.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerticalSegment;

impl SegmentSolver for VerticalSegment {
    fn solve(&self, layer: &Layer, state: &TraceState) -> Segment {
        let gradient = layer.gradient;
        let direction = state.direction;
        let v_start = layer.velocity_at(state.z);

        let (boundary, v_boundary) = match direction {
            Direction::Down => (layer.bottom_depth(), layer.bottom_velocity),
            Direction::Up => (layer.top_depth(), layer.top_velocity),
        };
        let dt_exit = ((v_boundary / v_start).ln() / gradient).abs();

        let (end_z, dt, tt_left, layer_step) = if dt_exit >= state.tt_left {
            let growth = (state.tt_left * gradient).exp();
            let v_end = match direction {
                Direction::Down => v_start * growth,
                Direction::Up => v_start / growth,
            };
            let end_z = layer.top_depth() + (v_end - layer.top_velocity) / gradient;
            (end_z, state.tt_left, 0.0, 0)
        } else {
            (boundary, dt_exit, state.tt_left - dt_exit, direction.layer_step())
        };

        Segment {
            end: DVec2::new(state.x, end_z),
            dt,
            tt_left,
            layer_step,
            direction,
            turned: false,
            incidence: 0.0,
            arc: None,
        }
    }

    fn name(&self) -> &'static str {
        "vertical"
    }
}
