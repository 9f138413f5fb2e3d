//! svptrace core - layered sound-velocity models.
//!
//! This crate provides:
//!
//! - **Model types**: `VelocityNode`, `Layer`, `VelocityModel`
//! - **Trace configuration**: `TraceConfig` with surface sound velocity
//!   correction and path sampling settings
//! - **Profile parsing**: JSON sound-velocity profiles read from strings
//!
//! # Example
//!
//! ```
//! use svp_core::VelocityModel;
//!
//! let model = VelocityModel::from_profile(&[0.0, 100.0, 1000.0], &[1500.0, 1550.0, 1600.0])?;
//! assert_eq!(model.layer_count(), 2);
//! assert!(model.layer(0).unwrap().is_gradient());
//! # Ok::<(), svp_core::ModelError>(())
//! ```

pub mod config;
pub mod layer;
pub mod model;
pub mod profile;

// Re-export commonly used types
pub use config::{PathMode, SsvMode, TraceConfig};
pub use layer::{Layer, LayerKind, GRADIENT_TOLERANCE};
pub use model::{ModelError, VelocityModel, VelocityNode};
pub use profile::{parse_profile_json, ProfileDocument, ProfileError};
