//! Circular-arc propagation through a constant-gradient layer.
//!
//! With v(z) = g (z - z_c) a ray of parameter p follows a circle of radius
//! `r = 1 / |p g|` centred at depth z_c. Writing the local incidence angle
//! as `beta = acosh(1 / (p v))`, travel time along the arc is linear in
//! beta: `dt = |beta_1 - beta_0| / |g|`, and beta is zero exactly at the
//! turning point where the ray runs horizontal. Every event time in a
//! layer (boundary exit, turning, budget exhaustion) follows in closed form.

use svp_core::Layer;
use svp_math::{safe_sqrt, DVec2};

use crate::segment::{ArcGeometry, Direction, Segment, SegmentSolver, TraceState};

/// Time slack (s) within which a budget that ends at the turning point
/// counts as reaching it.
const TURN_TIME_TOLERANCE: f64 = 1e-9;

/// The four arc cases, by vertical direction and gradient sign.
///
/// Rays heading into faster water bend toward the horizontal and may turn
/// inside the layer; rays heading into slower water bend toward the
/// vertical and always leave through the boundary ahead of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    /// Descending, gradient > 0, solved by `into_faster`. Arc centre above.
    /// Turns at the arc's lowest point and leaves through the top, or
    /// leaves through the bottom first.
    DownFaster,
    /// Ascending, gradient > 0, solved by `into_slower`. Leaves through the top.
    UpSlower,
    /// Descending, gradient < 0, solved by `into_slower`. Leaves through the bottom.
    DownSlower,
    /// Ascending, gradient < 0, solved by `into_faster`. Arc centre below.
    /// Turns at the arc's highest point and leaves through the bottom, or
    /// leaves through the top first.
    UpFaster,
}

impl Quadrant {
    pub fn classify(direction: Direction, gradient: f64) -> Self {
        match (direction, gradient > 0.0) {
            (Direction::Down, true) => Quadrant::DownFaster,
            (Direction::Up, true) => Quadrant::UpSlower,
            (Direction::Down, false) => Quadrant::DownSlower,
            (Direction::Up, false) => Quadrant::UpFaster,
        }
    }

    /// True if the ray can reach a turning point in this case.
    pub fn can_turn(self) -> bool {
        matches!(self, Quadrant::DownFaster | Quadrant::UpFaster)
    }
}

/// `acosh(1 / (p v))` with the argument clamped at 1.
///
/// A ray entering a layer at grazing incidence can carry `p v` a hair
/// above 1 after rounding; it is then at its turning point.
#[inline]
pub fn arc_beta(p: f64, velocity: f64) -> f64 {
    let ratio = (1.0 / (p * velocity)).max(1.0);
    (ratio + safe_sqrt(ratio * ratio - 1.0)).ln()
}

/// Circle of one ray in one layer, with the ray's start on it.
struct RayCircle<'a> {
    layer: &'a Layer,
    p: f64,
    radius: f64,
    center: DVec2,
    beta: f64,
    abs_gradient: f64,
    /// Where the ray enters this circle
    start: DVec2,
    /// Horizontal distance from the start to the centre's vertical
    start_half_chord: f64,
    /// The centre's vertical lies ahead of the start
    center_ahead: bool,
}

impl<'a> RayCircle<'a> {
    fn new(layer: &'a Layer, state: &TraceState, quadrant: Quadrant) -> Self {
        let p = state.p;
        let radius = (1.0 / (p * layer.gradient)).abs();
        let center_z = layer.center_depth().unwrap_or_default();
        let half_chord = safe_sqrt(radius * radius - (state.z - center_z).powi(2));

        // Rays heading into faster water approach the centre's vertical
        let center_ahead = quadrant.can_turn();
        let center_x = if center_ahead {
            state.x + half_chord
        } else {
            state.x - half_chord
        };

        Self {
            layer,
            p,
            radius,
            center: DVec2::new(center_x, center_z),
            beta: arc_beta(p, layer.velocity_at(state.z)),
            abs_gradient: layer.gradient.abs(),
            start: state.position(),
            start_half_chord: half_chord,
            center_ahead,
        }
    }

    /// Depth of the turning point, where the circle runs horizontal.
    fn turning_depth(&self) -> f64 {
        if self.layer.gradient > 0.0 {
            self.center.y + self.radius
        } else {
            self.center.y - self.radius
        }
    }

    /// Time along the arc between two values of beta.
    fn time_between(&self, beta_a: f64, beta_b: f64) -> f64 {
        (beta_a - beta_b).abs() / self.abs_gradient
    }

    /// Depth at which the ray's beta takes the given value.
    fn depth_at_beta(&self, beta: f64) -> f64 {
        let velocity = 1.0 / (self.p * beta.cosh());
        self.layer.top_depth() + (velocity - self.layer.top_velocity) / self.layer.gradient
    }

    /// Point on the circle at `depth`, before (`false`) or past (`true`)
    /// the centre's vertical.
    ///
    /// Range is measured from the start, not the centre: a near-vertical
    /// ray sits on a circle so large that `center.x +- half_chord` would
    /// round its offset away.
    fn point_at(&self, depth: f64, past_center: bool) -> DVec2 {
        let half_chord = safe_sqrt(self.radius * self.radius - (depth - self.center.y).powi(2));
        let chords = self.start_half_chord + half_chord;

        // start_half_chord - half_chord via the difference of squares
        let shrink = if chords > 0.0 {
            (depth - self.start.y) * (depth + self.start.y - 2.0 * self.center.y) / chords
        } else {
            0.0
        };

        let offset = match (self.center_ahead, past_center) {
            (true, false) => shrink,
            (true, true) => chords,
            (false, true) => -shrink,
            (false, false) => -chords,
        };
        DVec2::new(self.start.x + offset, depth)
    }

    /// Incidence angle from the vertical at a point on the circle.
    fn incidence_at(&self, depth: f64) -> f64 {
        ((depth - self.center.y).abs() / self.radius).min(1.0).asin()
    }

    fn geometry(&self) -> ArcGeometry {
        ArcGeometry {
            center: self.center,
            radius: self.radius,
            gradient: self.layer.gradient,
        }
    }

    /// Segment ending at `end` after `dt`, still inside or leaving the layer.
    fn segment(&self, state: &TraceState, end: DVec2, dt: f64, layer_step: isize, direction: Direction) -> Segment {
        let tt_left = if layer_step == 0 { 0.0 } else { state.tt_left - dt };
        Segment {
            end,
            dt,
            tt_left,
            layer_step,
            direction,
            turned: direction != state.direction,
            incidence: self.incidence_at(end.y),
            arc: Some(self.geometry()),
        }
    }
}

/// Solver for oblique rays (p > 0) in gradient layers.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientSegment;

impl GradientSegment {
    /// A ray heading into faster water: turns inside the layer if the
    /// turning point lies before the boundary ahead.
    fn into_faster(arc: &RayCircle, state: &TraceState) -> Segment {
        let layer = arc.layer;
        let direction = state.direction;
        let tt_left = state.tt_left;
        let turning_depth = arc.turning_depth();

        let (ahead_depth, ahead_velocity, behind_depth, behind_velocity) = match direction {
            Direction::Down => (layer.bottom_depth(), layer.bottom_velocity, layer.top_depth(), layer.top_velocity),
            Direction::Up => (layer.top_depth(), layer.top_velocity, layer.bottom_depth(), layer.bottom_velocity),
        };
        let turns_in_layer = match direction {
            Direction::Down => turning_depth < ahead_depth,
            Direction::Up => turning_depth > ahead_depth,
        };

        if !turns_in_layer {
            let dt = arc.time_between(arc.beta, arc_beta(arc.p, ahead_velocity));
            if dt <= tt_left {
                let end = arc.point_at(ahead_depth, false);
                return arc.segment(state, end, dt, direction.layer_step(), direction);
            }
            let depth = arc.depth_at_beta(arc.beta - tt_left * arc.abs_gradient);
            return arc.segment(state, arc.point_at(depth, false), tt_left, 0, direction);
        }

        let dt_turn = arc.beta / arc.abs_gradient;
        if dt_turn > tt_left + TURN_TIME_TOLERANCE {
            // Budget runs out before the turning point
            let depth = arc.depth_at_beta(arc.beta - tt_left * arc.abs_gradient);
            return arc.segment(state, arc.point_at(depth, false), tt_left, 0, direction);
        }

        // Turns, then heads back out through the boundary behind it
        let reversed = direction.reversed();
        let dt = (arc.beta + arc_beta(arc.p, behind_velocity)) / arc.abs_gradient;
        if dt <= tt_left {
            let end = arc.point_at(behind_depth, true);
            return arc.segment(state, end, dt, reversed.layer_step(), reversed);
        }
        let depth = arc.depth_at_beta(tt_left * arc.abs_gradient - arc.beta);
        arc.segment(state, arc.point_at(depth, true), tt_left, 0, reversed)
    }

    /// A ray heading into slower water: leaves through the boundary ahead
    /// or runs out of time on the way.
    fn into_slower(arc: &RayCircle, state: &TraceState) -> Segment {
        let layer = arc.layer;
        let direction = state.direction;

        let (ahead_depth, ahead_velocity) = match direction {
            Direction::Down => (layer.bottom_depth(), layer.bottom_velocity),
            Direction::Up => (layer.top_depth(), layer.top_velocity),
        };

        let dt = arc.time_between(arc_beta(arc.p, ahead_velocity), arc.beta);
        if dt <= state.tt_left {
            let end = arc.point_at(ahead_depth, true);
            return arc.segment(state, end, dt, direction.layer_step(), direction);
        }
        let depth = arc.depth_at_beta(arc.beta + state.tt_left * arc.abs_gradient);
        arc.segment(state, arc.point_at(depth, true), state.tt_left, 0, direction)
    }
}

impl SegmentSolver for GradientSegment {
    fn solve(&self, layer: &Layer, state: &TraceState) -> Segment {
        let quadrant = Quadrant::classify(state.direction, layer.gradient);
        let arc = RayCircle::new(layer, state, quadrant);

        log::trace!(
            "Arc {:?}: radius {:.3}, centre ({:.3}, {:.3}), beta {:.6}",
            quadrant,
            arc.radius,
            arc.center.x,
            arc.center.y,
            arc.beta
        );

        match quadrant {
            Quadrant::DownFaster | Quadrant::UpFaster => Self::into_faster(&arc, state),
            Quadrant::UpSlower | Quadrant::DownSlower => Self::into_slower(&arc, state),
        }
    }

    fn name(&self) -> &'static str {
        "gradient"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positive_layer() -> Layer {
        // g = 0.5 1/s, centre at -3000 m
        Layer::new(0.0, 100.0, 1500.0, 1550.0)
    }

    fn negative_layer() -> Layer {
        // g = -0.5 1/s, centre at 3200 m
        Layer::new(100.0, 200.0, 1550.0, 1500.0)
    }

    fn on_circle(segment: &Segment) -> bool {
        let arc = segment.arc.unwrap();
        ((segment.end - arc.center).length() - arc.radius).abs() < 1e-6 * arc.radius
    }

    #[test]
    fn test_classify() {
        assert_eq!(Quadrant::classify(Direction::Down, 0.5), Quadrant::DownFaster);
        assert_eq!(Quadrant::classify(Direction::Up, 0.5), Quadrant::UpSlower);
        assert_eq!(Quadrant::classify(Direction::Down, -0.5), Quadrant::DownSlower);
        assert_eq!(Quadrant::classify(Direction::Up, -0.5), Quadrant::UpFaster);
        assert!(Quadrant::DownFaster.can_turn());
        assert!(!Quadrant::DownSlower.can_turn());
    }

    #[test]
    fn test_near_vertical_ray_keeps_its_range() {
        // Radius 3e13 m; the range across each layer is p times the
        // integral of v dz, 152500 p.
        let p = 1e-10 / 1500.0;
        let expected = 152_500.0 * p;

        let down = GradientSegment.solve(&positive_layer(), &TraceState::at_depth(p, 0.0, 10.0, Direction::Down));
        assert_eq!(down.layer_step, 1);
        assert!(((down.end.x - expected) / expected).abs() < 1e-6);

        let up = GradientSegment.solve(&positive_layer(), &TraceState::at_depth(p, 100.0, 10.0, Direction::Up));
        assert_eq!(up.layer_step, -1);
        assert!(((up.end.x - expected) / expected).abs() < 1e-6);

        let down = GradientSegment.solve(&negative_layer(), &TraceState::at_depth(p, 100.0, 10.0, Direction::Down));
        assert_eq!(down.layer_step, 1);
        assert!(((down.end.x - expected) / expected).abs() < 1e-6);
    }

    #[test]
    fn test_beta_zero_at_turning_velocity() {
        assert!(arc_beta(1.0 / 1500.0, 1500.0).abs() < 1e-12);
        // acosh(2)
        assert!((arc_beta(1.0 / 3000.0, 1500.0) - 2f64.acosh()).abs() < 1e-12);
    }

    #[test]
    fn test_down_faster_exits_bottom() {
        let layer = positive_layer();
        let p = 20f64.to_radians().sin() / 1500.0;
        let state = TraceState::at_depth(p, 0.0, 1.0, Direction::Down);
        let segment = GradientSegment.solve(&layer, &state);

        assert_eq!(segment.layer_step, 1);
        assert_eq!(segment.end.y, 100.0);
        assert!(segment.end.x > 0.0);
        assert!(!segment.turned);
        assert!(on_circle(&segment));

        // Snell's law holds at the exit
        assert!((segment.incidence.sin() / 1550.0 - p).abs() < 1e-9 * p);

        // Time agrees with the closed form ln(tan(theta/2)) difference
        let theta0 = 20f64.to_radians();
        let theta1 = (p * 1550.0).asin();
        let expected = ((theta1 / 2.0).tan().ln() - (theta0 / 2.0).tan().ln()).abs() / 0.5;
        assert!((segment.dt - expected).abs() < 1e-12);
    }

    #[test]
    fn test_down_faster_turns_and_exits_top() {
        let layer = positive_layer();
        // Turns where v = 1520 m/s, at 40 m
        let p = 1.0 / 1520.0;
        let state = TraceState::at_depth(p, 0.0, 10.0, Direction::Down);
        let segment = GradientSegment.solve(&layer, &state);

        assert!(segment.turned);
        assert_eq!(segment.direction, Direction::Up);
        assert_eq!(segment.layer_step, -1);
        assert_eq!(segment.end.y, 0.0);
        assert!(on_circle(&segment));

        // Symmetric arc: range is twice the distance to the turning point
        let arc = segment.arc.unwrap();
        assert!((segment.end.x - 2.0 * arc.center.x).abs() < 1e-6);

        let beta = arc_beta(p, 1500.0);
        assert!((segment.dt - 2.0 * beta / 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_down_faster_stops_at_turning_point() {
        let layer = positive_layer();
        let p = 1.0 / 1520.0;
        let dt_turn = (1520.0f64 / 1500.0).acosh() / 0.5;
        let state = TraceState::at_depth(p, 0.0, dt_turn, Direction::Down);
        let segment = GradientSegment.solve(&layer, &state);

        assert!(segment.exhausted());
        assert!(segment.turned);
        assert_eq!(segment.direction, Direction::Up);
        assert!((segment.end.y - 40.0).abs() < 1e-6);
        assert!((segment.incidence - std::f64::consts::FRAC_PI_2).abs() < 1e-3);
    }

    #[test]
    fn test_down_faster_exhausts_before_turning() {
        let layer = positive_layer();
        let p = 1.0 / 1520.0;
        let dt_turn = (1520.0f64 / 1500.0).acosh() / 0.5;
        let state = TraceState::at_depth(p, 0.0, 0.5 * dt_turn, Direction::Down);
        let segment = GradientSegment.solve(&layer, &state);

        assert!(segment.exhausted());
        assert!(!segment.turned);
        assert!(segment.end.y > 0.0 && segment.end.y < 40.0);
        assert!(on_circle(&segment));

        // The depth reached must need exactly the budget
        let beta_end = arc_beta(p, layer.velocity_at(segment.end.y));
        assert!(((arc_beta(p, 1500.0) - beta_end) / 0.5 - 0.5 * dt_turn).abs() < 1e-9);
    }

    #[test]
    fn test_up_slower_exits_top() {
        let layer = positive_layer();
        let p = 30f64.to_radians().sin() / 1550.0;
        let state = TraceState::at_depth(p, 100.0, 1.0, Direction::Up);
        let segment = GradientSegment.solve(&layer, &state);

        assert_eq!(segment.layer_step, -1);
        assert_eq!(segment.end.y, 0.0);
        assert!(segment.end.x > 0.0);
        assert!(!segment.turned);
        assert!(on_circle(&segment));
        assert!((segment.incidence.sin() / 1500.0 - p).abs() < 1e-9 * p);
    }

    #[test]
    fn test_down_slower_partial() {
        let layer = negative_layer();
        let p = 40f64.to_radians().sin() / 1550.0;
        let state = TraceState::at_depth(p, 100.0, 0.01, Direction::Down);
        let segment = GradientSegment.solve(&layer, &state);

        assert!(segment.exhausted());
        assert!(segment.end.y > 100.0 && segment.end.y < 200.0);
        assert!(segment.end.x > 0.0);
        assert!(on_circle(&segment));

        let beta_end = arc_beta(p, layer.velocity_at(segment.end.y));
        assert!(((beta_end - arc_beta(p, 1550.0)) / 0.5 - 0.01).abs() < 1e-9);
    }

    #[test]
    fn test_up_faster_turns_and_exits_bottom() {
        let layer = negative_layer();
        // Turns where v = 1530 m/s, at 140 m
        let p = 1.0 / 1530.0;
        let state = TraceState::at_depth(p, 200.0, 10.0, Direction::Up);
        let segment = GradientSegment.solve(&layer, &state);

        assert!(segment.turned);
        assert_eq!(segment.direction, Direction::Down);
        assert_eq!(segment.layer_step, 1);
        assert_eq!(segment.end.y, 200.0);
        assert!(on_circle(&segment));
        assert!(segment.end.x > 0.0);
    }

    #[test]
    fn test_up_faster_cannot_turn_exits_top() {
        let layer = negative_layer();
        let p = 10f64.to_radians().sin() / 1500.0;
        let state = TraceState::at_depth(p, 200.0, 10.0, Direction::Up);
        let segment = GradientSegment.solve(&layer, &state);

        assert!(!segment.turned);
        assert_eq!(segment.layer_step, -1);
        assert_eq!(segment.end.y, 100.0);
        assert!(on_circle(&segment));
        assert!((segment.incidence.sin() / 1550.0 - p).abs() < 1e-9 * p);
    }
}
