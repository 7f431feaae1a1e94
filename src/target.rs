use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Diameter of targets in click modes (standard, quickscope, moving, flick)
pub const TARGET_SIZE: f64 = 48.0;
/// Diameter of the persistent tracking target
pub const TRACKING_TARGET_SIZE: f64 = 64.0;

/// Unit direction a target travels in; scaled by speed and time scale
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity {
    pub dx: f64,
    pub dy: f64,
}

impl Velocity {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

/// A live target. `position` is the top-left corner of its bounding square.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub position: Point,
    pub size: f64,
    pub velocity: Option<Velocity>,
    /// Waypoints still to visit (random / zigzag tracking paths)
    pub path: VecDeque<Point>,
    /// Orbit angle in radians (circular tracking path)
    pub angle: f64,
    /// Engine clock when the target appeared
    pub spawned_at_ms: f64,
    /// Lifetime before the target counts as a miss
    pub ttl_ms: Option<f64>,
}

impl Target {
    pub fn new(position: Point, size: f64, spawned_at_ms: f64) -> Self {
        Self {
            position,
            size,
            velocity: None,
            path: VecDeque::new(),
            angle: 0.0,
            spawned_at_ms,
            ttl_ms: None,
        }
    }

    pub fn with_velocity(mut self, velocity: Velocity) -> Self {
        self.velocity = Some(velocity);
        self
    }

    pub fn with_ttl(mut self, ttl_ms: Option<f64>) -> Self {
        self.ttl_ms = ttl_ms;
        self
    }

    pub fn radius(&self) -> f64 {
        self.size / 2.0
    }

    pub fn center(&self) -> Point {
        Point::new(self.position.x + self.radius(), self.position.y + self.radius())
    }

    /// Move the target so its center lands on `center`
    pub fn set_center(&mut self, center: Point) {
        self.position = Point::new(center.x - self.radius(), center.y - self.radius());
    }

    pub fn geometry(&self) -> TargetGeometry {
        TargetGeometry {
            x: self.position.x,
            y: self.position.y,
            width: self.size,
            height: self.size,
        }
    }
}

/// Render record handed to the presentation layer whenever a target is placed or moves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl TargetGeometry {
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}
