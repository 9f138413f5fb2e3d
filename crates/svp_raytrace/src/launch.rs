//! Launch-angle handling: surface sound velocity correction, ray parameter
//! and initial direction.

use svp_core::{SsvMode, TraceConfig};

use crate::segment::Direction;
use crate::tracer::TraceError;

/// Sines below this are treated as an exactly vertical launch.
const VERTICAL_SINE_TOLERANCE: f64 = 1e-12;

/// Everything the trace loop needs to know about how the ray leaves the
/// source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Launch {
    /// Takeoff angle after correction, degrees from the downward vertical
    pub angle: f64,
    /// Ray parameter |sin(angle)| / v_source
    pub p: f64,
    pub direction: Direction,
    /// +1 for non-negative angles, -1 otherwise
    pub range_sign: f64,
    /// Incidence from the vertical at the source, in [0, PI/2]
    pub incidence: f64,
}

impl Launch {
    /// Resolve a launch angle at a source with sound speed `source_velocity`.
    pub fn new(angle_deg: f64, source_velocity: f64, config: &TraceConfig) -> Result<Self, TraceError> {
        if !angle_deg.is_finite() || angle_deg.abs() > 180.0 {
            log::warn!("Rejected launch angle {}", angle_deg);
            return Err(TraceError::InvalidAngle { angle: angle_deg });
        }

        let angle = corrected_angle(angle_deg, source_velocity, config)?;
        let sine = angle.to_radians().sin();
        let p = if sine.abs() < VERTICAL_SINE_TOLERANCE {
            0.0
        } else {
            sine.abs() / source_velocity
        };

        Ok(Self {
            angle,
            p,
            direction: Direction::from_takeoff_angle(angle),
            range_sign: if angle >= 0.0 { 1.0 } else { -1.0 },
            incidence: (p * source_velocity).min(1.0).asin(),
        })
    }
}

/// Apply the configured surface sound velocity correction to a launch angle.
///
/// The angle was formed by a transducer that assumed `surface_velocity`;
/// Snell's law carries it into the profile velocity at the source. The
/// corrected angle stays on the same side of the horizontal as the input.
pub fn corrected_angle(angle_deg: f64, source_velocity: f64, config: &TraceConfig) -> Result<f64, TraceError> {
    if !config.corrects_launch_angle() {
        return Ok(angle_deg);
    }

    let reference = match config.ssv_mode {
        SsvMode::Rotated => config.null_angle,
        SsvMode::Horizontal | SsvMode::Off => 0.0,
    };

    let relative = wrap_degrees(angle_deg - reference);
    let sine = relative.to_radians().sin() / config.surface_velocity * source_velocity;
    if !(-1.0..=1.0).contains(&sine) {
        log::warn!(
            "Launch angle {} cannot be refracted from {} m/s into {} m/s",
            angle_deg,
            config.surface_velocity,
            source_velocity
        );
        return Err(TraceError::InvalidAngle { angle: angle_deg });
    }

    let mut corrected = sine.asin().to_degrees();
    if relative.abs() > 90.0 {
        corrected = corrected.signum() * 180.0 - corrected;
    }
    Ok(wrap_degrees(reference + corrected))
}

/// Wrap an angle into (-180, 180] degrees.
fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corrected(angle: f64, sv: f64, null: f64, mode: SsvMode) -> Result<f64, TraceError> {
        let config = TraceConfig::new().with_surface_velocity(sv, null).with_ssv_mode(mode);
        corrected_angle(angle, 1500.0, &config)
    }

    #[test]
    fn test_no_correction() {
        assert_eq!(corrected_angle(33.0, 1500.0, &TraceConfig::default()).unwrap(), 33.0);
        assert_eq!(corrected(33.0, 1480.0, 0.0, SsvMode::Off).unwrap(), 33.0);
        assert_eq!(corrected(33.0, 0.0, 10.0, SsvMode::Rotated).unwrap(), 33.0);
    }

    #[test]
    fn test_horizontal_correction_obeys_snell() {
        let angle = corrected(40.0, 1480.0, 25.0, SsvMode::Horizontal).unwrap();

        let expected = 40f64.to_radians().sin() / 1480.0;
        assert!((angle.to_radians().sin() / 1500.0 - expected).abs() < 1e-15);
        assert!(angle > 40.0);
    }

    #[test]
    fn test_rotated_correction_about_null() {
        let angle = corrected(30.0, 1520.0, 10.0, SsvMode::Rotated).unwrap();

        let expected = 20f64.to_radians().sin() / 1520.0;
        assert!(((angle - 10.0).to_radians().sin() / 1500.0 - expected).abs() < 1e-15);

        // A beam along the null axis is unchanged
        assert!((corrected(10.0, 1520.0, 10.0, SsvMode::Rotated).unwrap() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_correction_keeps_upgoing_rays_upgoing() {
        let angle = corrected(120.0, 1520.0, 0.0, SsvMode::Horizontal).unwrap();
        assert!(angle > 90.0);
        assert!((angle.to_radians().sin() / 1500.0 - 120f64.to_radians().sin() / 1520.0).abs() < 1e-15);

        let angle = corrected(-120.0, 1520.0, 0.0, SsvMode::Horizontal).unwrap();
        assert!(angle < -90.0);
    }

    #[test]
    fn test_rotated_correction_wraps_past_vertical() {
        // 170 deg about a -30 deg null axis is 200 deg off axis
        let angle = corrected(170.0, 1500.0, -30.0, SsvMode::Rotated).unwrap();
        assert!((angle - 170.0).abs() < 1e-9);

        // Matching velocities leave every angle where it was
        for null in [-30.0, -130.0, 45.0] {
            for input in [170.0, -170.0, 30.0, -60.0, 120.0] {
                let angle = corrected(input, 1500.0, null, SsvMode::Rotated).unwrap();
                assert!((angle - input).abs() < 1e-9, "{input} about {null} gave {angle}");
            }
        }
    }

    #[test]
    fn test_wrap_degrees() {
        assert_eq!(wrap_degrees(-190.0), 170.0);
        assert_eq!(wrap_degrees(180.0), 180.0);
        assert_eq!(wrap_degrees(-180.0), 180.0);
        assert_eq!(wrap_degrees(270.0), -90.0);
        assert_eq!(wrap_degrees(45.0), 45.0);
    }

    #[test]
    fn test_correction_out_of_domain() {
        // sin(80) * 1500 / 1400 > 1
        let result = corrected(80.0, 1400.0, 0.0, SsvMode::Horizontal);
        assert!(matches!(result, Err(TraceError::InvalidAngle { .. })));
    }

    #[test]
    fn test_launch_parameters() {
        let config = TraceConfig::default();

        let launch = Launch::new(-30.0, 1500.0, &config).unwrap();
        assert_eq!(launch.direction, Direction::Down);
        assert_eq!(launch.range_sign, -1.0);
        assert!((launch.p - 0.5 / 1500.0).abs() < 1e-15);
        assert!((launch.incidence - 30f64.to_radians()).abs() < 1e-12);

        let launch = Launch::new(150.0, 1500.0, &config).unwrap();
        assert_eq!(launch.direction, Direction::Up);
        assert_eq!(launch.range_sign, 1.0);
        assert!((launch.p - 0.5 / 1500.0).abs() < 1e-15);
    }

    #[test]
    fn test_vertical_launch_snaps_ray_parameter() {
        let config = TraceConfig::default();

        assert_eq!(Launch::new(0.0, 1500.0, &config).unwrap().p, 0.0);
        let up = Launch::new(180.0, 1500.0, &config).unwrap();
        assert_eq!(up.p, 0.0);
        assert_eq!(up.direction, Direction::Up);
        assert_eq!(up.incidence, 0.0);
    }

    #[test]
    fn test_rejects_bad_angles() {
        let config = TraceConfig::default();

        for angle in [f64::NAN, f64::INFINITY, 181.0, -200.0] {
            assert!(matches!(
                Launch::new(angle, 1500.0, &config),
                Err(TraceError::InvalidAngle { .. })
            ));
        }
    }
}
