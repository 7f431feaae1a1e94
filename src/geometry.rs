use serde::{Deserialize, Serialize};

/// A point in arena-relative pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// The bounded play surface. All coordinates handed to the engine are relative to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f64,
    pub height: f64,
}

impl Arena {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn min_side(&self) -> f64 {
        self.width.min(self.height)
    }

    /// Clamp a point into [0, width] x [0, height]
    pub fn clamp(&self, p: Point) -> Point {
        Point::new(p.x.clamp(0.0, self.width), p.y.clamp(0.0, self.height))
    }

    /// Clamp the top-left corner of a `size` square so the square stays inside the arena.
    pub fn clamp_box(&self, top_left: Point, size: f64) -> Point {
        let max_x = (self.width - size).max(0.0);
        let max_y = (self.height - size).max(0.0);
        Point::new(top_left.x.clamp(0.0, max_x), top_left.y.clamp(0.0, max_y))
    }
}
