//! svptrace ray tracer - acoustic rays through layered sound-velocity models.
//!
//! Rays are traced layer by layer in closed form: straight lines through
//! homogeneous layers, circular arcs through constant-gradient layers and
//! vertical runs where the ray parameter is zero. Results carry the range,
//! depth and travel time at the end of the ray, plus an optional sampled
//! path for plotting.
//!
//! # Example
//!
//! ```
//! use svp_core::VelocityModel;
//! use svp_raytrace::{RayTracer, TraceStatus};
//!
//! let model = VelocityModel::from_profile(&[0.0, 100.0, 1000.0], &[1500.0, 1550.0, 1600.0])?;
//! let result = RayTracer::new(&model).trace(0.0, 20.0, 0.5)?;
//!
//! assert_eq!(result.status, TraceStatus::TimeExhausted);
//! assert!(result.x > 0.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod beam;
pub mod gradient;
pub mod launch;
pub mod linear;
pub mod path;
pub mod segment;
pub mod tracer;
pub mod vertical;

pub use beam::{trace_beams, Beam, Sounding};
pub use gradient::{GradientSegment, Quadrant};
pub use launch::{corrected_angle, Launch};
pub use linear::LinearSegment;
pub use path::{PathSampler, RayPath, ARC_SUBDIVISIONS};
pub use segment::{select_solver, Direction, Segment, SegmentSolver, TraceState};
pub use tracer::{trace, RayTracer, TraceError, TraceResult, TraceStatus};
pub use vertical::VerticalSegment;

// Re-export the model types callers need alongside the tracer
pub use svp_core::{PathMode, SsvMode, TraceConfig, VelocityModel};
