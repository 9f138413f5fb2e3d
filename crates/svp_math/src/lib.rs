// Re-export glam for convenience
pub use glam::*;

// svptrace math types
mod numeric;
mod sample;
mod span;

pub use numeric::{safe_sqrt, wrap_angle};
pub use sample::PathSample;
pub use span::DepthSpan;
