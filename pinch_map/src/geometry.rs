//! Pixel-space points and the thumb/index finger pair.

// ════════════════════════════════════════════════════════════════════════════
// Point
// ════════════════════════════════════════════════════════════════════════════

/// A 2D coordinate in frame pixel space (origin top-left, y down).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Multiply both coordinates by the given factors.
    pub fn scaled(&self, sx: f64, sy: f64) -> Point {
        Point { x: self.x * sx, y: self.y * sy }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point { x, y }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FingerPair
// ════════════════════════════════════════════════════════════════════════════

/// Thumb tip and index fingertip of one detected hand in a single frame.
///
/// Produced fresh every frame and discarded once the brightness for that
/// frame has been computed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FingerPair {
    pub thumb_tip: Point,
    pub index_tip: Point,
}

impl FingerPair {
    pub const fn new(thumb_tip: Point, index_tip: Point) -> Self {
        FingerPair { thumb_tip, index_tip }
    }
}

/// Euclidean pixel distance between the thumb tip and the index tip.
///
/// Always non-negative for finite input.
pub fn pinch_distance(pair: &FingerPair) -> f64 {
    pair.thumb_tip.distance_to(&pair.index_tip)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
