use serde::{Deserialize, Serialize};

/// Axis-aligned detection rectangle in pixel units, origin top-left.
///
/// Well-formed detections have positive width and height. Anything else is
/// treated as zero-area by every geometric query below.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rectangle {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_well_formed(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn area(&self) -> f64 {
        if !self.is_well_formed() {
            return 0.0;
        }
        self.width as f64 * self.height as f64
    }

    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    pub fn intersection_area(&self, other: &Rectangle) -> f64 {
        if !self.is_well_formed() || !other.is_well_formed() {
            return 0.0;
        }
        // Edges in i64: x + width can exceed i32::MAX.
        let ix1 = i64::from(self.x).max(i64::from(other.x));
        let iy1 = i64::from(self.y).max(i64::from(other.y));
        let ix2 = self.right().min(other.right());
        let iy2 = self.bottom().min(other.bottom());

        (ix2 - ix1).max(0) as f64 * (iy2 - iy1).max(0) as f64
    }

    fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }

    /// Intersection area over the smaller of the two areas.
    ///
    /// A rectangle nested inside another scores 1.0 regardless of the size
    /// difference. Zero-area operands score 0.0.
    pub fn overlap_ratio(&self, other: &Rectangle) -> f64 {
        let smaller = self.area().min(other.area());
        if smaller <= 0.0 {
            return 0.0;
        }
        self.intersection_area(other) / smaller
    }
}
