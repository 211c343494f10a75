//! Planar coordinate type and the vector helpers used by driver movement.
//!
//! The road network lives in a flat 2-D plane: node coordinates, edge lengths
//! and driver speeds all share one distance unit.  `f64` keeps accumulated
//! odometer sums exact enough over long runs.

/// Floor applied to the step denominator so a zero-length edge cannot
/// produce a division by zero.
pub const MIN_STEP_DENOMINATOR: f64 = 0.01;

/// A point in the simulation plane.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// The displacement of length `speed` from `self` toward `target`.
    ///
    /// The direction is normalised by `max(|target - self|, MIN_STEP_DENOMINATOR)`;
    /// callers snap onto `target` instead of stepping whenever the remaining
    /// distance is `<= speed`, so the floor only matters for degenerate edges.
    #[inline]
    pub fn unit_step(self, target: Point, speed: f64) -> Point {
        let len = self.distance(target).max(MIN_STEP_DENOMINATOR);
        Point {
            x: (target.x - self.x) * speed / len,
            y: (target.y - self.y) * speed / len,
        }
    }

    /// Component-wise translation.
    #[inline]
    pub fn offset(self, by: Point) -> Point {
        Point { x: self.x + by.x, y: self.y + by.y }
    }

    /// `[x, y]` for spatial-index lookups.
    #[inline]
    pub fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}
