//! Beam fans: one ping's worth of beams traced against a shared model.
//!
//! Beams are independent, so a fan is traced in parallel with rayon. Each
//! ray endpoint becomes a sounding relative to the transducer.

use rayon::prelude::*;
use svp_core::TraceConfig;

use crate::tracer::{trace, RayTracer, TraceError, TraceStatus};

/// One beam of a multibeam ping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beam {
    /// Takeoff angle from the downward vertical in degrees, positive to
    /// starboard
    pub angle: f64,
    /// Azimuth of the beam plane relative to the acrosstrack axis in
    /// degrees
    pub forward_angle: f64,
    /// Two-way travel time in seconds
    pub two_way_travel_time: f64,
    /// Receive array null angle for this beam; the tracer's config value
    /// is used when `None`
    pub null_angle: Option<f64>,
}

impl Beam {
    /// Create a beam that uses the tracer's null angle.
    pub fn new(angle: f64, forward_angle: f64, two_way_travel_time: f64) -> Self {
        Self {
            angle,
            forward_angle,
            two_way_travel_time,
            null_angle: None,
        }
    }

    pub fn with_null_angle(mut self, null_angle: f64) -> Self {
        self.null_angle = Some(null_angle);
        self
    }
}

/// Position of a beam's bottom return relative to the transducer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sounding {
    pub acrosstrack: f64,
    pub alongtrack: f64,
    /// Depth below the model's depth datum
    pub depth: f64,
    /// One-way travel time actually traced
    pub travel_time: f64,
    pub status: TraceStatus,
}

impl<'m> RayTracer<'m> {
    /// Trace one beam from a transducer at `transducer_depth`.
    ///
    /// A transducer above the top of the model is moved down to the top
    /// and the sounding depth shifted back by the same amount.
    pub fn trace_beam(&self, transducer_depth: f64, beam: &Beam) -> Result<Sounding, TraceError> {
        let top = self.model().depth_range().top;
        let (source_depth, static_shift) = if transducer_depth < top {
            (top, transducer_depth - top)
        } else {
            (transducer_depth, 0.0)
        };

        let config = TraceConfig {
            null_angle: beam.null_angle.unwrap_or(self.config().null_angle),
            max_path_points: 0,
            ..self.config().clone()
        };
        let result = trace(
            self.model(),
            source_depth,
            beam.angle,
            0.5 * beam.two_way_travel_time,
            &config,
        )?;

        let forward = beam.forward_angle.to_radians();
        Ok(Sounding {
            acrosstrack: result.x * forward.cos(),
            alongtrack: result.x * forward.sin(),
            depth: result.z + static_shift,
            travel_time: result.travel_time,
            status: result.status,
        })
    }
}

/// Trace every beam of a ping in parallel.
///
/// Results are in beam order; a failed beam does not affect the others.
pub fn trace_beams(tracer: &RayTracer<'_>, transducer_depth: f64, beams: &[Beam]) -> Vec<Result<Sounding, TraceError>> {
    let top = tracer.model().depth_range().top;
    if transducer_depth < top {
        log::warn!(
            "Transducer at {:.2} m is above the profile top at {:.2} m, applying a {:.2} m static shift",
            transducer_depth,
            top,
            transducer_depth - top
        );
    }

    let start = std::time::Instant::now();
    let soundings: Vec<_> = beams
        .par_iter()
        .map(|beam| tracer.trace_beam(transducer_depth, beam))
        .collect();

    let failed = soundings.iter().filter(|sounding| sounding.is_err()).count();
    log::info!(
        "Traced {} beams ({} failed) in {:?}",
        beams.len(),
        failed,
        start.elapsed()
    );

    soundings
}
