// Scalar helpers shared by the segment solvers.

use std::f64::consts::{PI, TAU};

/// Square root that treats small negative arguments as zero.
///
/// Arc offsets are computed as `sqrt(r^2 - dz^2)`, which rounds slightly
/// below zero when a ray sits on the turning point of its circle.
#[inline]
pub fn safe_sqrt(x: f64) -> f64 {
    if x > 0.0 {
        x.sqrt()
    } else {
        0.0
    }
}

/// Wrap an angle difference into (-PI, PI].
#[inline]
pub fn wrap_angle(angle: f64) -> f64 {
    let mut a = angle % TAU;
    if a > PI {
        a -= TAU;
    } else if a <= -PI {
        a += TAU;
    }
    a
}
