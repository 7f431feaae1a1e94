use crate::{geometry::Point, session::Session, target::Target};

/// Result of resolving one shot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shot {
    Hit,
    Miss,
}

/// Closed-disk hit test: a point exactly on the rim counts.
pub fn is_hit(point: Point, target: &Target) -> bool {
    point.distance(target.center()) <= target.radius()
}

/// Hit percentage rounded to the nearest integer; 0 when nothing was fired.
pub fn accuracy(hits: u32, shots: u32) -> u32 {
    if shots == 0 {
        return 0;
    }
    ((hits as f64 / shots as f64) * 100.0).round() as u32
}

/// Updates the shot/hit counters of a session
#[derive(Debug, Clone, Copy, Default)]
pub struct HitResolver;

impl HitResolver {
    /// Test a click against the live target (if any). Misses are booked here;
    /// hits are booked by the caller once it knows the bonus.
    pub fn resolve(
        &self,
        session: &mut Session,
        target: Option<&Target>,
        point: Point,
    ) -> Shot {
        match target {
            Some(t) if is_hit(point, t) => Shot::Hit,
            _ => {
                self.miss(session);
                Shot::Miss
            }
        }
    }

    pub fn hit(&self, session: &mut Session, bonus: u32) {
        session.hits_landed += 1;
        session.shots_taken += 1;
        session.score += 1 + bonus;
    }

    /// Off-target click or a target that timed out
    pub fn miss(&self, session: &mut Session) {
        session.shots_taken += 1;
    }
}
