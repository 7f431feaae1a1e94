use log::debug;
use rand::Rng;

use crate::{
    geometry::{Arena, Point},
    mode::{FlickDifficulty, GameMode},
};

/// Inset from the arena edge for flick corner/edge placements
pub const FLICK_PADDING: f64 = 40.0;
/// Hard flicks must land farther than this fraction of the arena's shorter side
pub const FLICK_HARD_MIN_DISTANCE_RATIO: f64 = 0.6;
pub const FLICK_HARD_ATTEMPTS: usize = 20;

/// Outcome of a hard-flick placement search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FarPlacement {
    pub position: Point,
    pub distance: f64,
    /// false when every attempt was too close and the farthest candidate was reused
    pub satisfied: bool,
    pub attempts: usize,
}

/// Chooses where the next target goes. Stateless: the engine hands in the
/// arena, the previous target and a random source.
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetSpawner;

impl TargetSpawner {
    /// Top-left position for a new `size` target in `mode`
    pub fn spawn<R: Rng + ?Sized>(
        &self,
        mode: GameMode,
        difficulty: FlickDifficulty,
        previous_center: Option<Point>,
        arena: &Arena,
        size: f64,
        rng: &mut R,
    ) -> Point {
        let position = match mode {
            GameMode::Standard | GameMode::Quickscope | GameMode::Moving => {
                self.random_position(arena, size, rng)
            }
            GameMode::Flick => match difficulty {
                FlickDifficulty::Easy => self.flick_corner(arena, size, rng),
                FlickDifficulty::Medium => self.flick_edge(arena, size, rng),
                FlickDifficulty::Hard => match previous_center {
                    Some(prev) => self.flick_far(arena, size, prev, rng).position,
                    None => self.random_position(arena, size, rng),
                },
            },
            GameMode::Tracking | GameMode::Reflex => {
                let c = arena.center();
                Point::new(c.x - size / 2.0, c.y - size / 2.0)
            }
        };
        debug!("spawned {mode} target at ({:.1}, {:.1})", position.x, position.y);
        arena.clamp_box(position, size)
    }

    /// Uniform position such that the whole target fits inside the arena
    pub fn random_position<R: Rng + ?Sized>(&self, arena: &Arena, size: f64, rng: &mut R) -> Point {
        let max_x = (arena.width - size).max(0.0);
        let max_y = (arena.height - size).max(0.0);
        Point::new(rng.gen::<f64>() * max_x, rng.gen::<f64>() * max_y)
    }

    pub fn flick_corner<R: Rng + ?Sized>(&self, arena: &Arena, size: f64, rng: &mut R) -> Point {
        let (left, top, right, bottom) = padded_extent(arena, size);
        match rng.gen_range(0..4) {
            0 => Point::new(left, top),
            1 => Point::new(right, top),
            2 => Point::new(left, bottom),
            _ => Point::new(right, bottom),
        }
    }

    pub fn flick_edge<R: Rng + ?Sized>(&self, arena: &Arena, size: f64, rng: &mut R) -> Point {
        let (left, top, right, bottom) = padded_extent(arena, size);
        let along_x = left + rng.gen::<f64>() * (right - left);
        let along_y = top + rng.gen::<f64>() * (bottom - top);
        match rng.gen_range(0..4) {
            0 => Point::new(along_x, top),
            1 => Point::new(along_x, bottom),
            2 => Point::new(left, along_y),
            _ => Point::new(right, along_y),
        }
    }

    /// Sample interior positions until one lands far enough from the previous
    /// target. Falls back to the farthest candidate seen after the last attempt.
    pub fn flick_far<R: Rng + ?Sized>(
        &self,
        arena: &Arena,
        size: f64,
        previous_center: Point,
        rng: &mut R,
    ) -> FarPlacement {
        let min_distance = FLICK_HARD_MIN_DISTANCE_RATIO * arena.min_side();
        let mut best: Option<FarPlacement> = None;

        for attempt in 1..=FLICK_HARD_ATTEMPTS {
            let position = self.random_position(arena, size, rng);
            let center = Point::new(position.x + size / 2.0, position.y + size / 2.0);
            let distance = center.distance(previous_center);

            if distance > min_distance {
                return FarPlacement {
                    position,
                    distance,
                    satisfied: true,
                    attempts: attempt,
                };
            }

            if best.map_or(true, |b| distance > b.distance) {
                best = Some(FarPlacement {
                    position,
                    distance,
                    satisfied: false,
                    attempts: attempt,
                });
            }
        }

        let fallback = best.unwrap_or(FarPlacement {
            position: self.random_position(arena, size, rng),
            distance: 0.0,
            satisfied: false,
            attempts: FLICK_HARD_ATTEMPTS,
        });
        debug!(
            "hard flick placement exhausted {} attempts, reusing farthest candidate ({:.1}px)",
            FLICK_HARD_ATTEMPTS, fallback.distance
        );
        FarPlacement {
            attempts: FLICK_HARD_ATTEMPTS,
            ..fallback
        }
    }
}

/// (left, top, right, bottom) top-left extents for a padded placement,
/// collapsing toward the middle when the arena is too small for the padding.
fn padded_extent(arena: &Arena, size: f64) -> (f64, f64, f64, f64) {
    let max_x = (arena.width - size).max(0.0);
    let max_y = (arena.height - size).max(0.0);
    let left = FLICK_PADDING.min(max_x / 2.0);
    let top = FLICK_PADDING.min(max_y / 2.0);
    (left, top, max_x - left, max_y - top)
}
