/// A closed depth interval `[top, bottom]`, with depth increasing downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthSpan {
    pub top: f64,
    pub bottom: f64,
}

impl DepthSpan {
    /// Create a new span given top and bottom depths.
    pub fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    /// Returns the thickness of the span (bottom - top).
    pub fn thickness(&self) -> f64 {
        self.bottom - self.top
    }

    /// Returns true if depth is within the span [top, bottom] (inclusive).
    pub fn contains(&self, depth: f64) -> bool {
        self.top <= depth && depth <= self.bottom
    }
}
