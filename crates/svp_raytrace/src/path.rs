//! Bounded polyline approximation of a traced ray.

use svp_core::PathMode;
use svp_math::{wrap_angle, DVec2, PathSample};

use crate::segment::Segment;

/// Number of chords used to approximate each circular arc.
pub const ARC_SUBDIVISIONS: usize = 5;

/// A sampled ray path, source first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RayPath {
    samples: Vec<PathSample>,
}

impl RayPath {
    pub fn samples(&self) -> &[PathSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Last recorded sample.
    pub fn last(&self) -> Option<&PathSample> {
        self.samples.last()
    }

    /// Samples as raw bytes (x, z, t triples of native-endian f64).
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.samples)
    }

    pub fn into_samples(self) -> Vec<PathSample> {
        self.samples
    }
}

/// Collects path samples during a trace, up to a fixed count.
///
/// Once the cap is reached further samples are dropped silently.
#[derive(Debug, Clone)]
pub struct PathSampler {
    mode: PathMode,
    max_points: usize,
    range_sign: f64,
    samples: Vec<PathSample>,
}

impl PathSampler {
    /// Create a sampler. `max_points == 0` disables sampling.
    pub fn new(mode: PathMode, max_points: usize, range_sign: f64) -> Self {
        Self {
            mode,
            max_points,
            range_sign,
            samples: Vec::with_capacity(max_points.min(1024)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.max_points > 0
    }

    /// Record the ray's starting point.
    pub fn record_source(&mut self, position: DVec2) {
        self.push(position, 0.0);
    }

    /// Record one solved segment that started at `start` at time `start_time`.
    pub fn record_segment(&mut self, start: DVec2, start_time: f64, segment: &Segment) {
        if !self.is_enabled() {
            return;
        }

        let end_time = start_time + segment.dt;
        match (self.mode, segment.arc) {
            (PathMode::Full, Some(arc)) => {
                // Angular position on the circle, measured from +z toward +x
                let from = start - arc.center;
                let to = segment.end - arc.center;
                let angle_start = from.x.atan2(from.y);
                let sweep = wrap_angle(to.x.atan2(to.y) - angle_start);
                let step = sweep / ARC_SUBDIVISIONS as f64;

                let mut time = start_time;
                let mut previous = angle_start;
                for i in 1..ARC_SUBDIVISIONS {
                    let angle = angle_start + i as f64 * step;
                    // dt = R dphi / v with v = g R cos(phi)
                    time += (angle.sin().atanh() - previous.sin().atanh()).abs() / arc.gradient.abs();
                    previous = angle;
                    let position = arc.center + arc.radius * DVec2::new(angle.sin(), angle.cos());
                    self.push(position, time.min(end_time));
                }
                // Last sample lands exactly on the segment end
                self.push(segment.end, end_time);
            }
            _ => self.push(segment.end, end_time),
        }
    }

    fn push(&mut self, position: DVec2, time: f64) {
        if self.samples.len() < self.max_points {
            self.samples
                .push(PathSample::new(position.x, position.y, time).with_range_sign(self.range_sign));
        }
    }

    /// Finish sampling; `None` when sampling was disabled.
    pub fn finish(self) -> Option<RayPath> {
        self.is_enabled().then_some(RayPath {
            samples: self.samples,
        })
    }
}
