// Per-tick target motion.
//
// Every step is scaled by `delta_ms / 16` so a target covers the same
// distance per second whether the host ticks at 30 Hz or 144 Hz.

use std::collections::VecDeque;
use std::f64::consts::TAU;

use rand::Rng;

use crate::{
    geometry::{Arena, Point},
    mode::TrackingPattern,
    target::{Target, Velocity},
};

/// Reference frame length the speeds below are expressed in
pub const REFERENCE_FRAME_MS: f64 = 16.0;
/// Tracking target speed, pixels per reference frame
pub const TRACKING_SPEED: f64 = 3.0;
/// Circular path angular speed, radians per reference frame
pub const ORBIT_ANGULAR_SPEED: f64 = 0.02;
pub const ORBIT_RADIUS_RATIO: f64 = 0.35;
/// A waypoint counts as reached once the target center is this close
pub const WAYPOINT_ARRIVAL_PX: f64 = 5.0;
pub const WAYPOINT_PADDING: f64 = 50.0;
pub const RANDOM_WAYPOINTS: usize = 5;
pub const ZIGZAG_WAYPOINTS: usize = 6;

pub fn time_scale(delta_ms: f64) -> f64 {
    delta_ms / REFERENCE_FRAME_MS
}

/// Advances targets for the moving and tracking modes
#[derive(Debug, Clone, Copy)]
pub struct MotionSimulator {
    /// Linear speed in pixels per reference frame
    pub speed: f64,
    pub angular_speed: f64,
}

impl Default for MotionSimulator {
    fn default() -> Self {
        Self {
            speed: TRACKING_SPEED,
            angular_speed: ORBIT_ANGULAR_SPEED,
        }
    }
}

impl MotionSimulator {
    pub fn with_speed(speed: f64) -> Self {
        Self {
            speed,
            ..Self::default()
        }
    }

    /// A random unit heading for a freshly spawned moving target
    pub fn random_heading<R: Rng + ?Sized>(rng: &mut R) -> Velocity {
        let angle = rng.gen::<f64>() * TAU;
        Velocity::new(angle.cos(), angle.sin())
    }

    /// Moving mode: straight-line travel with axis-aligned elastic reflection.
    pub fn bounce(&self, target: &mut Target, arena: &Arena, time_scale: f64) {
        let Some(mut v) = target.velocity else {
            return;
        };
        let max_x = (arena.width - target.size).max(0.0);
        let max_y = (arena.height - target.size).max(0.0);

        let mut x = target.position.x + v.dx * self.speed * time_scale;
        let mut y = target.position.y + v.dy * self.speed * time_scale;

        if x <= 0.0 {
            v.dx = v.dx.abs();
            x = 0.0;
        } else if x >= max_x {
            v.dx = -v.dx.abs();
            x = max_x;
        }
        if y <= 0.0 {
            v.dy = v.dy.abs();
            y = 0.0;
        } else if y >= max_y {
            v.dy = -v.dy.abs();
            y = max_y;
        }

        target.position = Point::new(x, y);
        target.velocity = Some(v);
    }

    /// Put a tracking target at the start of its path
    pub fn prepare<R: Rng + ?Sized>(
        &self,
        target: &mut Target,
        arena: &Arena,
        pattern: TrackingPattern,
        rng: &mut R,
    ) {
        match pattern {
            TrackingPattern::Linear => {
                target.velocity = Some(Velocity::new(1.0, 0.0));
                let center = arena.center();
                target.set_center(center);
            }
            TrackingPattern::Circular => {
                target.angle = 0.0;
                target.set_center(orbit_point(arena, target.angle));
            }
            TrackingPattern::Random | TrackingPattern::Zigzag => {
                target.path = waypoints(pattern, arena, rng);
            }
        }
        target.position = arena.clamp_box(target.position, target.size);
    }

    /// Keep a tracking target going after the arena changed size. Waypoints
    /// laid out for the old bounds may be out of reach, so paths start over.
    pub fn refit<R: Rng + ?Sized>(
        &self,
        target: &mut Target,
        arena: &Arena,
        pattern: TrackingPattern,
        rng: &mut R,
    ) {
        if matches!(pattern, TrackingPattern::Random | TrackingPattern::Zigzag) {
            target.path = waypoints(pattern, arena, rng);
        }
        target.position = arena.clamp_box(target.position, target.size);
    }

    /// Tracking mode: follow `pattern` for one tick
    pub fn track<R: Rng + ?Sized>(
        &self,
        target: &mut Target,
        arena: &Arena,
        pattern: TrackingPattern,
        rng: &mut R,
        time_scale: f64,
    ) {
        match pattern {
            TrackingPattern::Linear => self.oscillate(target, arena, time_scale),
            TrackingPattern::Circular => self.orbit(target, arena, time_scale),
            TrackingPattern::Random | TrackingPattern::Zigzag => {
                self.follow_path(target, arena, pattern, rng, time_scale)
            }
        }
    }

    fn oscillate(&self, target: &mut Target, arena: &Arena, time_scale: f64) {
        let mut v = target.velocity.unwrap_or(Velocity::new(1.0, 0.0));
        let max_x = (arena.width - target.size).max(0.0);
        let mut x = target.position.x + v.dx * self.speed * time_scale;

        if x <= 0.0 || x >= max_x {
            v.dx *= -1.0;
            x = x.clamp(0.0, max_x);
        }

        target.position.x = x;
        target.velocity = Some(v);
    }

    fn orbit(&self, target: &mut Target, arena: &Arena, time_scale: f64) {
        target.angle = (target.angle + self.angular_speed * time_scale) % TAU;
        target.set_center(orbit_point(arena, target.angle));
        target.position = arena.clamp_box(target.position, target.size);
    }

    fn follow_path<R: Rng + ?Sized>(
        &self,
        target: &mut Target,
        arena: &Arena,
        pattern: TrackingPattern,
        rng: &mut R,
        time_scale: f64,
    ) {
        if target.path.is_empty() {
            target.path = waypoints(pattern, arena, rng);
        }
        let Some(&next) = target.path.front() else {
            return;
        };

        let center = target.center();
        let distance = center.distance(next);
        if distance < WAYPOINT_ARRIVAL_PX {
            target.path.pop_front();
            if target.path.is_empty() {
                target.path = waypoints(pattern, arena, rng);
            }
            return;
        }

        // never step past the waypoint
        let step = (self.speed * time_scale).min(distance);
        let moved = Point::new(
            center.x + (next.x - center.x) / distance * step,
            center.y + (next.y - center.y) / distance * step,
        );
        target.set_center(moved);
        target.position = arena.clamp_box(target.position, target.size);
    }
}

fn orbit_point(arena: &Arena, angle: f64) -> Point {
    let c = arena.center();
    let radius = ORBIT_RADIUS_RATIO * arena.min_side();
    Point::new(c.x + radius * angle.cos(), c.y + radius * angle.sin())
}

/// A fresh queue of target-center waypoints for the random or zigzag path
pub fn waypoints<R: Rng + ?Sized>(
    pattern: TrackingPattern,
    arena: &Arena,
    rng: &mut R,
) -> VecDeque<Point> {
    let pad_x = WAYPOINT_PADDING.min(arena.width / 2.0);
    let pad_y = WAYPOINT_PADDING.min(arena.height / 2.0);
    let span_x = arena.width - 2.0 * pad_x;
    let span_y = arena.height - 2.0 * pad_y;

    match pattern {
        TrackingPattern::Zigzag => (0..ZIGZAG_WAYPOINTS)
            .map(|i| {
                let x = (if i % 2 == 0 { 0.2 } else { 0.8 }) * arena.width;
                let y = pad_y + span_y * i as f64 / (ZIGZAG_WAYPOINTS - 1) as f64;
                Point::new(x, y)
            })
            .collect(),
        _ => (0..RANDOM_WAYPOINTS)
            .map(|_| {
                Point::new(
                    pad_x + rng.gen::<f64>() * span_x,
                    pad_y + rng.gen::<f64>() * span_y,
                )
            })
            .collect(),
    }
}
