//! The trace loop.
//!
//! A trace walks the ray from layer to layer. Each iteration hands the
//! current layer to its solver, applies the returned segment and checks
//! whether the ray has run out of time or left the model:
//!
//! ```text
//! Descending <-> Ascending   (turning points)
//!     |              |
//!     +--> ExitedBottom, ExitedTop, TimeExhausted
//! ```

use svp_core::{TraceConfig, VelocityModel};
use thiserror::Error;

use crate::launch::Launch;
use crate::path::{PathSampler, RayPath};
use crate::segment::{select_solver, Direction, TraceState};

/// Errors that abort a trace.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TraceError {
    #[error("Source depth {depth} outside model range [{top}, {bottom}]")]
    OutOfModel { depth: f64, top: f64, bottom: f64 },

    #[error("Invalid launch angle: {angle} degrees")]
    InvalidAngle { angle: f64 },

    #[error("Trace crossed {limit} segments without turning or ending")]
    IterationLimitExceeded { limit: usize },

    #[error("Invalid travel time budget: {0}")]
    InvalidTimeBudget(f64),
}

/// How a successful trace ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceStatus {
    /// Left through the top of the model
    ExitedTop,
    /// Left through the bottom of the model
    ExitedBottom,
    /// Travel-time budget spent inside the model
    TimeExhausted,
}

/// Final state of a traced ray.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceResult {
    /// Horizontal range, signed like the launch angle
    pub x: f64,
    /// Depth
    pub z: f64,
    /// Elapsed travel time
    pub travel_time: f64,
    pub status: TraceStatus,
    /// Vertical direction at the end point
    pub direction: Direction,
    /// True if the ray passed a turning point
    pub turned: bool,
    /// Ray parameter |sin(angle)| / v_source
    pub ray_parameter: f64,
    /// Angle from the downward vertical at the end point in degrees,
    /// above 90 when ascending and signed like the launch angle
    pub final_angle: f64,
    /// Number of layer segments traced
    pub segments: usize,
    /// Sampled path, when enabled in the config
    pub path: Option<RayPath>,
}

/// Traces rays through one shared velocity model.
///
/// Holds only a borrowed model and a config, so a single tracer can be
/// used from many threads at once.
#[derive(Debug, Clone)]
pub struct RayTracer<'m> {
    model: &'m VelocityModel,
    config: TraceConfig,
}

impl<'m> RayTracer<'m> {
    /// Tracer with the default config (no correction, no path).
    pub fn new(model: &'m VelocityModel) -> Self {
        Self {
            model,
            config: TraceConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TraceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn model(&self) -> &'m VelocityModel {
        self.model
    }

    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Trace one ray from `source_depth` at `angle_deg` for at most
    /// `time_budget` seconds.
    pub fn trace(&self, source_depth: f64, angle_deg: f64, time_budget: f64) -> Result<TraceResult, TraceError> {
        trace(self.model, source_depth, angle_deg, time_budget, &self.config)
    }
}

/// Trace one ray through `model`.
///
/// `angle_deg` is measured from the downward vertical: |angle| < 90 starts
/// descending, anything else ascending, and negative angles give negative
/// range. A finite budget of zero or less ends immediately at the source.
pub fn trace(
    model: &VelocityModel,
    source_depth: f64,
    angle_deg: f64,
    time_budget: f64,
    config: &TraceConfig,
) -> Result<TraceResult, TraceError> {
    if !time_budget.is_finite() {
        return Err(TraceError::InvalidTimeBudget(time_budget));
    }

    let start_layer = model.find_layer_containing(source_depth).ok_or_else(|| {
        let range = model.depth_range();
        TraceError::OutOfModel {
            depth: source_depth,
            top: range.top,
            bottom: range.bottom,
        }
    })?;
    let source_velocity = model.layers()[start_layer].velocity_at(source_depth);
    let launch = Launch::new(angle_deg, source_velocity, config)?;

    log::debug!(
        "Tracing from {:.2} m in layer {}: angle {:.3}, p = {:.6e}, v = {:.2}",
        source_depth,
        start_layer,
        launch.angle,
        launch.p,
        source_velocity
    );

    let mut state = TraceState {
        p: launch.p,
        x: 0.0,
        z: source_depth,
        t: 0.0,
        tt_left: time_budget,
        layer: start_layer as isize,
        direction: launch.direction,
        turned: false,
        incidence: launch.incidence,
        segments: 0,
    };

    let mut sampler = PathSampler::new(config.path_mode, config.max_path_points, launch.range_sign);
    sampler.record_source(state.position());

    let layer_count = model.layer_count() as isize;
    let limit = config.iteration_limit(model.layer_count());
    // Segments since the last turning point that took time
    let mut leg_segments = 0;

    let status = loop {
        if state.tt_left <= 0.0 {
            break TraceStatus::TimeExhausted;
        }
        if state.layer < 0 {
            break TraceStatus::ExitedTop;
        }
        if state.layer >= layer_count {
            break TraceStatus::ExitedBottom;
        }
        if leg_segments >= limit {
            log::warn!(
                "Ray at {:.3} deg crossed {} segments without turning at depth {:.2}",
                launch.angle,
                limit,
                state.z
            );
            return Err(TraceError::IterationLimitExceeded { limit });
        }

        let layer = &model.layers()[state.layer as usize];
        let solver = select_solver(layer, state.p);
        let segment = solver.solve(layer, &state);
        log::trace!(
            "{} segment in layer {}: ({:.3}, {:.3}) -> ({:.3}, {:.3}), dt = {:.6}",
            solver.name(),
            state.layer,
            state.x,
            state.z,
            segment.end.x,
            segment.end.y,
            segment.dt
        );

        sampler.record_segment(state.position(), state.t, &segment);
        state.advance(&segment);
        if segment.turned && segment.dt > 0.0 {
            leg_segments = 0;
        } else {
            leg_segments += 1;
        }
    };

    let mut final_angle = state.incidence.to_degrees();
    if state.direction == Direction::Up {
        final_angle = 180.0 - final_angle;
    }

    Ok(TraceResult {
        x: launch.range_sign * state.x,
        z: state.z,
        travel_time: state.t,
        status,
        direction: state.direction,
        turned: state.turned,
        ray_parameter: state.p,
        final_angle: launch.range_sign * final_angle,
        segments: state.segments,
        path: sampler.finish(),
    })
}
