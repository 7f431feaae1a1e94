// Score escalation for the tracking (streak) and flick (combo) modes.

/// How often the tracking scorer samples cursor-vs-target distance
pub const TRACKING_POLL_MS: f64 = 100.0;
pub const MAX_MULTIPLIER: u32 = 5;
const STREAK_PER_LEVEL: u32 = 10;
pub const MAX_COMBO_BONUS: u32 = 4;

/// 1 for streaks 0..9, 2 for 10..19, ... capped at 5 from 40 onward
pub fn multiplier(streak: u32) -> u32 {
    1 + (streak / STREAK_PER_LEVEL).min(MAX_MULTIPLIER - 1)
}

/// Tracking-mode progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackingProgress {
    pub streak: u32,
    pub max_streak: u32,
    pub multiplier: u32,
    pub cumulative_score: u32,
}

impl Default for TrackingProgress {
    fn default() -> Self {
        Self {
            streak: 0,
            max_streak: 0,
            multiplier: 1,
            cumulative_score: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StreakScorer {
    progress: TrackingProgress,
}

impl StreakScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn progress(&self) -> TrackingProgress {
        self.progress
    }

    /// Record one polling interval. Returns the points earned by it.
    pub fn poll(&mut self, on_target: bool) -> u32 {
        let p = &mut self.progress;
        if on_target {
            p.streak += 1;
            p.max_streak = p.max_streak.max(p.streak);
            p.multiplier = multiplier(p.streak);
            p.cumulative_score += p.multiplier;
            p.multiplier
        } else {
            p.streak = 0;
            p.multiplier = 1;
            0
        }
    }
}

/// Flick-mode consecutive-hit counter
#[derive(Debug, Clone, Default)]
pub struct ComboScorer {
    combo: u32,
}

impl ComboScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    /// Register a hit and return the bonus on top of the base point
    pub fn hit(&mut self) -> u32 {
        self.combo += 1;
        self.combo.saturating_sub(1).min(MAX_COMBO_BONUS)
    }

    pub fn miss(&mut self) {
        self.combo = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplier_steps_every_ten() {
        for streak in 0..10 {
            assert_eq!(multiplier(streak), 1);
        }
        for streak in 10..20 {
            assert_eq!(multiplier(streak), 2);
        }
        assert_eq!(multiplier(29), 3);
        assert_eq!(multiplier(39), 4);
        assert_eq!(multiplier(40), 5);
        assert_eq!(multiplier(1000), 5);
    }

    #[test]
    fn test_streak_scoring_accumulates_with_multiplier() {
        let mut scorer = StreakScorer::new();
        for _ in 0..12 {
            scorer.poll(true);
        }
        let p = scorer.progress();
        assert_eq!(p.streak, 12);
        assert_eq!(p.multiplier, 2);
        // 9 polls at x1, then streaks 10, 11, 12 at x2
        assert_eq!(p.cumulative_score, 9 + 3 * 2);
    }

    #[test]
    fn test_leaving_target_resets_streak_but_keeps_score() {
        let mut scorer = StreakScorer::new();
        for _ in 0..15 {
            scorer.poll(true);
        }
        let earned = scorer.progress().cumulative_score;
        assert_eq!(scorer.poll(false), 0);

        let p = scorer.progress();
        assert_eq!(p.streak, 0);
        assert_eq!(p.multiplier, 1);
        assert_eq!(p.max_streak, 15);
        assert_eq!(p.cumulative_score, earned);
    }

    #[test]
    fn test_combo_bonus_sequence_is_capped() {
        let mut combo = ComboScorer::new();
        let bonuses: Vec<u32> = (0..6).map(|_| combo.hit()).collect();
        assert_eq!(bonuses, vec![0, 1, 2, 3, 4, 4]);
    }

    #[test]
    fn test_miss_resets_combo() {
        let mut combo = ComboScorer::new();
        combo.hit();
        combo.hit();
        combo.miss();
        assert_eq!(combo.combo(), 0);
        assert_eq!(combo.hit(), 0);
    }
}
