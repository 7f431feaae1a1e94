// Per-mode rules.
//
// Each game mode is one `ModeBehavior`. The engine calls the hooks in a
// fixed order and owns all shared state (`Core`); a behavior only keeps what
// is private to its mode (combo, streak, reflex rounds).

use log::debug;

use crate::{
    engine::{Core, EngineEvent},
    error::{EngineError, Result},
    geometry::Point,
    hit::{is_hit, Shot},
    mode::{GameMode, TrackingPattern},
    motion::MotionSimulator,
    reflex::{ReflexInput, ReflexTimer},
    scheduler::{Due, Task},
    scoring::{ComboScorer, StreakScorer, TRACKING_POLL_MS},
    session::{EndReason, HudStat, SessionSettings, SummaryDetail},
    target::{Target, TRACKING_TARGET_SIZE},
    util::std_dev,
};

/// Quickscope pause between a hit and the next target
pub const QUICKSCOPE_RESPAWN_MS: f64 = 300.0;
/// Tracking polls further behind than this are skipped rather than replayed
pub const POLL_CATCH_UP_MS: f64 = 1000.0;

/// Why a shot was booked as a miss
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Miss {
    /// the target outlived its lifetime
    Timeout,
    OffTarget,
}

pub trait ModeBehavior {
    fn mode(&self) -> GameMode;

    /// Put the first (or next) target in play
    fn on_spawn(&mut self, core: &mut Core) -> Result<()>;

    /// One simulation frame, for modes that registered motion
    fn on_tick(&mut self, _core: &mut Core, _time_scale: f64) -> Result<()> {
        Ok(())
    }

    /// Resolve a click at `point`. Misses are booked before `on_miss` runs.
    fn on_click(&mut self, core: &mut Core, point: Point) -> Result<()> {
        shoot(self, core, point)
    }

    /// The live target was hit; the behavior books the hit with its bonus
    fn on_hit(&mut self, core: &mut Core) -> Result<()>;

    fn on_miss(&mut self, core: &mut Core, miss: Miss) -> Result<()>;

    /// The arena changed size. The live target has already been clamped into it.
    fn on_resize(&mut self, _core: &mut Core) -> Result<()> {
        Ok(())
    }

    fn on_timer(&mut self, core: &mut Core, due: Due) -> Result<()> {
        match due.task {
            Task::TargetExpired => {
                core.book_miss();
                self.on_miss(core, Miss::Timeout)
            }
            Task::RespawnTarget => self.on_spawn(core),
            Task::TrackingPoll | Task::ReflexArm => {
                debug!("{} has no use for {:?}", self.mode(), due.task);
                Ok(())
            }
        }
    }

    fn hud_stat(&self, core: &Core) -> HudStat {
        HudStat::Accuracy(core.session.accuracy())
    }

    fn summary_detail(&self, core: &Core) -> SummaryDetail {
        SummaryDetail::Accuracy {
            accuracy: core.session.accuracy(),
            hits: core.session.hits_landed,
            shots: core.session.shots_taken,
        }
    }

    /// Whether the 1 Hz countdown applies
    fn is_timed(&self) -> bool {
        true
    }

    fn uses_pointer_lock(&self) -> bool {
        false
    }
}

/// Test `point` against the live target and route the result to the hooks
fn shoot<B: ModeBehavior + ?Sized>(behavior: &mut B, core: &mut Core, point: Point) -> Result<()> {
    let shot = core
        .resolver
        .resolve(&mut core.session, core.target.as_ref(), point);
    match shot {
        Shot::Hit => behavior.on_hit(core),
        Shot::Miss => behavior.on_miss(core, Miss::OffTarget),
    }
}

pub fn behavior_for(settings: &SessionSettings, calibration_ms: f64) -> Box<dyn ModeBehavior> {
    let config = &settings.mode_config;
    match settings.mode {
        GameMode::Standard => Box::new(StandardBehavior),
        GameMode::Quickscope => Box::new(QuickscopeBehavior),
        GameMode::Moving => Box::new(MovingBehavior::new(config.moving_speed)),
        GameMode::Flick => Box::new(FlickBehavior::default()),
        GameMode::Tracking => Box::new(TrackingBehavior::new(config.tracking_pattern)),
        GameMode::Reflex => Box::new(ReflexBehavior::new(calibration_ms)),
    }
}

/// Static targets at random positions
#[derive(Debug, Default)]
pub struct StandardBehavior;

impl ModeBehavior for StandardBehavior {
    fn mode(&self) -> GameMode {
        GameMode::Standard
    }

    fn on_spawn(&mut self, core: &mut Core) -> Result<()> {
        core.remove_target();
        let target = core.new_target(None);
        core.place_target(target);
        Ok(())
    }

    fn on_hit(&mut self, core: &mut Core) -> Result<()> {
        core.book_hit(0);
        self.on_spawn(core)
    }

    fn on_miss(&mut self, core: &mut Core, miss: Miss) -> Result<()> {
        match miss {
            Miss::Timeout => self.on_spawn(core),
            Miss::OffTarget => Ok(()),
        }
    }
}

/// Locked-pointer shots: every hit recenters the crosshair
#[derive(Debug, Default)]
pub struct QuickscopeBehavior;

impl ModeBehavior for QuickscopeBehavior {
    fn mode(&self) -> GameMode {
        GameMode::Quickscope
    }

    fn on_spawn(&mut self, core: &mut Core) -> Result<()> {
        core.remove_target();
        let target = core.new_target(None);
        core.place_target(target);
        Ok(())
    }

    fn on_click(&mut self, core: &mut Core, point: Point) -> Result<()> {
        if !core.cursor.is_relative() {
            core.emit(EngineEvent::LockRequested);
        }
        shoot(self, core, point)
    }

    fn on_hit(&mut self, core: &mut Core) -> Result<()> {
        core.book_hit(0);
        core.remove_target();
        core.reset_cursor_position();
        core.schedule(Task::RespawnTarget, QUICKSCOPE_RESPAWN_MS);
        Ok(())
    }

    fn on_miss(&mut self, core: &mut Core, miss: Miss) -> Result<()> {
        match miss {
            Miss::Timeout => self.on_spawn(core),
            Miss::OffTarget => Ok(()),
        }
    }

    fn uses_pointer_lock(&self) -> bool {
        true
    }
}

/// Targets that drift and bounce off the arena walls
#[derive(Debug)]
pub struct MovingBehavior {
    motion: MotionSimulator,
}

impl MovingBehavior {
    pub fn new(speed: f64) -> Self {
        Self {
            motion: MotionSimulator::with_speed(speed),
        }
    }
}

impl ModeBehavior for MovingBehavior {
    fn mode(&self) -> GameMode {
        GameMode::Moving
    }

    fn on_spawn(&mut self, core: &mut Core) -> Result<()> {
        core.remove_target();
        let heading = MotionSimulator::random_heading(&mut core.rng);
        let target = core.new_target(None).with_velocity(heading);
        core.place_target(target);
        core.start_motion();
        Ok(())
    }

    fn on_tick(&mut self, core: &mut Core, time_scale: f64) -> Result<()> {
        // between a removal and the next spawn there is nothing to move
        let Some(target) = core.target.as_mut() else {
            return Ok(());
        };
        self.motion.bounce(target, &core.arena, time_scale);
        let geometry = target.geometry();
        core.emit(EngineEvent::Target(geometry));
        Ok(())
    }

    fn on_hit(&mut self, core: &mut Core) -> Result<()> {
        core.book_hit(0);
        self.on_spawn(core)
    }

    fn on_miss(&mut self, core: &mut Core, miss: Miss) -> Result<()> {
        match miss {
            Miss::Timeout => self.on_spawn(core),
            Miss::OffTarget => Ok(()),
        }
    }
}

/// Far-apart placements with a combo bonus for consecutive hits
#[derive(Debug, Default)]
pub struct FlickBehavior {
    combo: ComboScorer,
    last_center: Option<Point>,
}

impl ModeBehavior for FlickBehavior {
    fn mode(&self) -> GameMode {
        GameMode::Flick
    }

    fn on_spawn(&mut self, core: &mut Core) -> Result<()> {
        let previous = core.remove_target().map(|t| t.center()).or(self.last_center);
        let target = core.new_target(previous);
        self.last_center = Some(target.center());
        core.place_target(target);
        Ok(())
    }

    fn on_hit(&mut self, core: &mut Core) -> Result<()> {
        let bonus = self.combo.hit();
        core.book_hit(bonus);
        self.on_spawn(core)
    }

    fn on_miss(&mut self, core: &mut Core, miss: Miss) -> Result<()> {
        self.combo.miss();
        match miss {
            Miss::Timeout => self.on_spawn(core),
            Miss::OffTarget => Ok(()),
        }
    }
}

/// One persistent target; score accrues while the cursor stays on it
#[derive(Debug)]
pub struct TrackingBehavior {
    pattern: TrackingPattern,
    motion: MotionSimulator,
    scorer: StreakScorer,
}

impl TrackingBehavior {
    pub fn new(pattern: TrackingPattern) -> Self {
        Self {
            pattern,
            motion: MotionSimulator::default(),
            scorer: StreakScorer::new(),
        }
    }

    fn poll(&mut self, core: &mut Core, due: Due) -> Result<()> {
        let target = core
            .target
            .as_ref()
            .ok_or(EngineError::MissingTarget("tracking"))?;
        let on_target = is_hit(core.cursor.position(), target);
        self.scorer.poll(on_target);
        core.session.score = self.scorer.progress().cumulative_score;

        let mut next = due.at_ms + TRACKING_POLL_MS;
        let lag = core.now_ms() - next;
        if lag > POLL_CATCH_UP_MS {
            let missed = (lag / TRACKING_POLL_MS).floor();
            debug!("tracking skipped {missed} polls");
            next += missed * TRACKING_POLL_MS;
        }
        core.schedule_at(Task::TrackingPoll, next);
        Ok(())
    }
}

impl ModeBehavior for TrackingBehavior {
    fn mode(&self) -> GameMode {
        GameMode::Tracking
    }

    fn on_spawn(&mut self, core: &mut Core) -> Result<()> {
        core.remove_target();
        let mut target = Target::new(core.arena.center(), TRACKING_TARGET_SIZE, core.now_ms());
        target.set_center(core.arena.center());
        self.motion
            .prepare(&mut target, &core.arena, self.pattern, &mut core.rng);
        core.place_target(target);
        core.start_motion();
        core.schedule(Task::TrackingPoll, TRACKING_POLL_MS);
        Ok(())
    }

    fn on_tick(&mut self, core: &mut Core, time_scale: f64) -> Result<()> {
        let pattern = self.pattern;
        let motion = self.motion;
        let arena = core.arena;
        let target = core
            .target
            .as_mut()
            .ok_or(EngineError::MissingTarget("tracking"))?;
        motion.track(target, &arena, pattern, &mut core.rng, time_scale);
        let geometry = target.geometry();
        core.emit(EngineEvent::Target(geometry));
        Ok(())
    }

    fn on_resize(&mut self, core: &mut Core) -> Result<()> {
        let arena = core.arena;
        if let Some(target) = core.target.as_mut() {
            self.motion
                .refit(target, &arena, self.pattern, &mut core.rng);
        }
        Ok(())
    }

    /// Clicks do nothing here
    fn on_click(&mut self, _core: &mut Core, _point: Point) -> Result<()> {
        Ok(())
    }

    fn on_hit(&mut self, _core: &mut Core) -> Result<()> {
        Ok(())
    }

    fn on_miss(&mut self, _core: &mut Core, _miss: Miss) -> Result<()> {
        Ok(())
    }

    fn on_timer(&mut self, core: &mut Core, due: Due) -> Result<()> {
        match due.task {
            Task::TrackingPoll => self.poll(core, due),
            _ => Ok(()),
        }
    }

    fn hud_stat(&self, _core: &Core) -> HudStat {
        let p = self.scorer.progress();
        HudStat::Streak {
            streak: p.streak,
            max_streak: p.max_streak,
            multiplier: p.multiplier,
        }
    }

    fn summary_detail(&self, _core: &Core) -> SummaryDetail {
        SummaryDetail::Tracking {
            max_streak: self.scorer.progress().max_streak,
        }
    }
}

/// Five-round reaction drill; not bound by the session clock
#[derive(Debug)]
pub struct ReflexBehavior {
    timer: ReflexTimer,
}

impl ReflexBehavior {
    pub fn new(calibration_ms: f64) -> Self {
        Self {
            timer: ReflexTimer::new(calibration_ms),
        }
    }
}

impl ModeBehavior for ReflexBehavior {
    fn mode(&self) -> GameMode {
        GameMode::Reflex
    }

    /// No target; the first click starts round one
    fn on_spawn(&mut self, _core: &mut Core) -> Result<()> {
        Ok(())
    }

    fn on_click(&mut self, core: &mut Core, _point: Point) -> Result<()> {
        let now = core.now_ms();
        match self.timer.on_input(now, &mut core.rng) {
            ReflexInput::Started { delay_ms } => core.schedule(Task::ReflexArm, delay_ms),
            ReflexInput::Early => core.cancel(Task::ReflexArm),
            ReflexInput::Recorded(_) => {
                core.session.score = self.timer.rounds().len() as u32;
            }
            ReflexInput::Completed(_) => {
                core.session.score = self.timer.rounds().len() as u32;
                core.request_finish(EndReason::Completed);
            }
            ReflexInput::Ignored => {}
        }
        Ok(())
    }

    fn on_hit(&mut self, _core: &mut Core) -> Result<()> {
        Ok(())
    }

    fn on_miss(&mut self, _core: &mut Core, _miss: Miss) -> Result<()> {
        Ok(())
    }

    fn on_timer(&mut self, _core: &mut Core, due: Due) -> Result<()> {
        if due.task == Task::ReflexArm {
            self.timer.arm(due.at_ms);
        }
        Ok(())
    }

    fn hud_stat(&self, _core: &Core) -> HudStat {
        HudStat::Reflex {
            round: self.timer.round(),
            state: self.timer.state().into(),
        }
    }

    fn summary_detail(&self, _core: &Core) -> SummaryDetail {
        let rounds_ms = self.timer.samples();
        SummaryDetail::Reflex {
            mean_ms: self.timer.mean_ms(),
            std_dev_ms: std_dev(&rounds_ms),
            rounds_ms,
            calibration_ms: self.timer.calibration_ms(),
        }
    }

    fn is_timed(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::TAU;

    use crate::{
        engine::{Engine, EngineEvent},
        geometry::{Arena, Point},
        hit::is_hit,
        mode::{FlickDifficulty, GameMode, ModeConfig, TrackingPattern},
        motion::{ORBIT_ANGULAR_SPEED, ORBIT_RADIUS_RATIO},
        reflex::FixedCalibration,
        session::{EndReason, HudStat, ReflexStateView, SessionSettings, SummaryDetail},
    };

    fn engine() -> Engine {
        Engine::new(Arena::new(800.0, 600.0))
            .with_seed(7)
            .with_calibrator(FixedCalibration(0.0))
    }

    fn start(e: &mut Engine, mode: GameMode, config: ModeConfig) {
        e.start_session(SessionSettings::new(mode, 60, config)).unwrap();
    }

    fn hit(e: &mut Engine) {
        let c = e.target().expect("target").center();
        e.on_click(c.x, c.y);
    }

    fn summary(e: &mut Engine) -> crate::session::Summary {
        e.drain_events()
            .into_iter()
            .find_map(|ev| match ev {
                EngineEvent::SessionEnded(s) => Some(s),
                _ => None,
            })
            .expect("session ended")
    }

    #[test]
    fn test_quickscope_first_click_requests_lock() {
        let mut e = engine();
        start(&mut e, GameMode::Quickscope, ModeConfig::default());
        e.drain_events();
        e.on_click(1.0, 1.0);
        assert!(e.drain_events().contains(&EngineEvent::LockRequested));
        assert_eq!(e.session().shots_taken, 1);

        e.on_lock_acquired();
        assert!(e.cursor().input_mode == crate::cursor::InputMode::Relative);
        e.on_click(1.0, 1.0);
        assert!(!e.drain_events().contains(&EngineEvent::LockRequested));
    }

    #[test]
    fn test_quickscope_hit_recenters_and_respawns_after_pause() {
        let mut e = engine();
        start(&mut e, GameMode::Quickscope, ModeConfig::default());
        e.on_lock_acquired();

        // walk the locked cursor onto the target
        let center = e.target().unwrap().center();
        let cursor = e.cursor().position;
        e.on_pointer_delta(center.x - cursor.x, center.y - cursor.y);
        e.on_click(0.0, 0.0);

        assert_eq!(e.session().hits_landed, 1);
        assert!(e.target().is_none());
        assert_eq!(e.cursor().position, Point::new(400.0, 300.0));

        e.tick(299.0);
        assert!(e.target().is_none());
        e.tick(1.0);
        assert!(e.target().is_some());
    }

    #[test]
    fn test_quickscope_click_without_target_is_a_miss() {
        let mut e = engine();
        start(&mut e, GameMode::Quickscope, ModeConfig::default());
        hit(&mut e);
        assert!(e.target().is_none());
        e.on_click(400.0, 300.0);
        assert_eq!(e.session().shots_taken, 2);
        assert_eq!(e.session().hits_landed, 1);
    }

    #[test]
    fn test_moving_target_stays_in_bounds() {
        let mut e = engine();
        let config = ModeConfig {
            moving_speed: 40.0,
            target_lifetime_secs: 0.0,
            ..ModeConfig::default()
        };
        start(&mut e, GameMode::Moving, config);
        for _ in 0..2000 {
            e.tick(16.0);
            let t = e.target().unwrap();
            assert!(t.position.x >= 0.0 && t.position.x + t.size <= 800.0);
            assert!(t.position.y >= 0.0 && t.position.y + t.size <= 600.0);
        }
    }

    #[test]
    fn test_moving_target_emits_geometry_each_frame() {
        let mut e = engine();
        start(&mut e, GameMode::Moving, ModeConfig::default());
        e.drain_events();
        e.tick(16.0);
        assert!(e
            .drain_events()
            .iter()
            .any(|ev| matches!(ev, EngineEvent::Target(_))));
    }

    #[test]
    fn test_flick_combo_scoring() {
        let mut e = engine();
        let config = ModeConfig {
            flick_difficulty: FlickDifficulty::Easy,
            ..ModeConfig::default()
        };
        start(&mut e, GameMode::Flick, config);

        let mut scores = Vec::new();
        for _ in 0..6 {
            hit(&mut e);
            scores.push(e.session().score);
        }
        // bonuses 0, 1, 2, 3, 4, 4 on top of one point each
        assert_eq!(scores, vec![1, 3, 6, 10, 15, 20]);

        e.on_click(-1.0, -1.0);
        hit(&mut e);
        assert_eq!(e.session().score, 21);
    }

    #[test]
    fn test_flick_stray_click_keeps_target_but_breaks_combo() {
        let mut e = engine();
        start(&mut e, GameMode::Flick, ModeConfig::default());
        hit(&mut e);
        hit(&mut e);
        assert_eq!(e.session().score, 3);

        let before = e.target().unwrap().clone();
        e.on_click(-1.0, -1.0);
        assert_eq!(e.target(), Some(&before));
        assert_eq!(e.session().shots_taken, 3);

        // combo starts over: one point, no bonus
        hit(&mut e);
        assert_eq!(e.session().score, 4);
    }

    #[test]
    fn test_flick_timeout_respawns() {
        let mut e = engine();
        start(&mut e, GameMode::Flick, ModeConfig::default());
        let before = e.target().unwrap().clone();
        e.tick(1000.0);
        assert_eq!(e.session().shots_taken, 1);
        assert_ne!(e.target(), Some(&before));
    }

    #[test]
    fn test_tracking_clicks_do_nothing() {
        let mut e = engine();
        start(&mut e, GameMode::Tracking, ModeConfig::default());
        hit(&mut e);
        e.on_click(0.0, 0.0);
        assert_eq!(e.session().shots_taken, 0);
        assert_eq!(e.session().score, 0);
    }

    #[test]
    fn test_tracking_streak_builds_while_on_target() {
        let mut e = engine();
        let config = ModeConfig {
            tracking_pattern: TrackingPattern::Circular,
            ..ModeConfig::default()
        };
        start(&mut e, GameMode::Tracking, config);

        for _ in 0..120 {
            let c = e.target().unwrap().center();
            e.on_pointer_move(c.x, c.y);
            e.tick(10.0);
        }
        // 1200ms of ticks, polled every 100ms; the cursor lags one tick behind
        match e.hud().stat {
            HudStat::Streak { streak, max_streak, multiplier } => {
                assert_eq!(streak, 12);
                assert_eq!(max_streak, 12);
                assert_eq!(multiplier, 2);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(e.session().score, 9 + 3 * 2);

        e.on_pointer_move(0.0, 0.0);
        e.tick(100.0);
        match e.hud().stat {
            HudStat::Streak { streak, max_streak, multiplier } => {
                assert_eq!((streak, max_streak, multiplier), (0, 12, 1));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(e.session().score, 15);
    }

    #[test]
    fn test_tracking_target_follows_every_pattern() {
        for pattern in [
            TrackingPattern::Linear,
            TrackingPattern::Circular,
            TrackingPattern::Random,
            TrackingPattern::Zigzag,
        ] {
            let mut e = engine();
            let config = ModeConfig {
                tracking_pattern: pattern,
                ..ModeConfig::default()
            };
            start(&mut e, GameMode::Tracking, config);
            let before = e.target().unwrap().position;
            for _ in 0..30 {
                e.tick(16.0);
            }
            let t = e.target().unwrap();
            assert_ne!(t.position, before, "{pattern:?} did not move");
            assert!(t.position.x >= 0.0 && t.position.x + t.size <= 800.0);
            assert!(t.position.y >= 0.0 && t.position.y + t.size <= 600.0);
        }
    }

    #[test]
    fn test_tracking_paths_survive_a_shrinking_arena() {
        for pattern in [TrackingPattern::Zigzag, TrackingPattern::Random] {
            let mut e = engine();
            let config = ModeConfig {
                tracking_pattern: pattern,
                ..ModeConfig::default()
            };
            start(&mut e, GameMode::Tracking, config);
            for _ in 0..400 {
                e.tick(16.0);
            }

            e.resize(Arena::new(800.0, 200.0));
            let mut last = e.target().unwrap().center();
            for _ in 0..10 {
                for _ in 0..300 {
                    e.tick(16.0);
                }
                let t = e.target().unwrap();
                assert_ne!(t.center(), last, "{pattern:?} target stalled");
                assert!(t.position.y >= 0.0 && t.position.y + t.size <= 200.0);
                last = t.center();
            }
        }
    }

    #[test]
    fn test_tracking_long_stall_polls_once_more() {
        let mut e = engine();
        let config = ModeConfig {
            tracking_pattern: TrackingPattern::Circular,
            ..ModeConfig::default()
        };
        start(&mut e, GameMode::Tracking, config);

        // park the cursor where the orbit will be after one 60s frame
        let angle = (ORBIT_ANGULAR_SPEED * (60_000.0 / 16.0)) % TAU;
        let radius = ORBIT_RADIUS_RATIO * 600.0;
        e.on_pointer_move(400.0 + radius * angle.cos(), 300.0 + radius * angle.sin());
        e.tick(60_000.0);

        // the first poll and one resynchronised poll, not six hundred
        match e.hud().stat {
            HudStat::Streak { streak, max_streak, .. } => {
                assert_eq!((streak, max_streak), (2, 2));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(e.session().score, 2);

        e.tick(100.0);
        assert_eq!(e.session().score, 3);
    }

    #[test]
    fn test_tracking_summary_reports_max_streak() {
        let mut e = engine();
        start(&mut e, GameMode::Tracking, ModeConfig::default());
        let t = e.target().unwrap().clone();
        e.on_pointer_move(t.center().x, t.center().y);
        e.tick(100.0);
        let on = is_hit(e.cursor().position, e.target().unwrap());
        let s = e.stop_session().unwrap();
        assert_eq!(
            s.detail,
            SummaryDetail::Tracking {
                max_streak: u32::from(on)
            }
        );
    }

    #[test]
    fn test_reflex_drill_records_five_rounds() {
        let mut e = engine();
        start(&mut e, GameMode::Reflex, ModeConfig::default());
        assert!(e.target().is_none());

        for round in 1..=5u8 {
            e.on_click(0.0, 0.0);
            assert_eq!(
                e.hud().stat,
                HudStat::Reflex {
                    round,
                    state: ReflexStateView::Waiting
                }
            );
            // the longest possible wait always arms the signal
            e.tick(7000.0);
            assert_matches::assert_matches!(
                e.hud().stat,
                HudStat::Reflex {
                    state: ReflexStateView::Go,
                    ..
                }
            );
            e.tick(1.0);
            e.on_click(0.0, 0.0);
        }

        assert!(!e.is_active());
        let s = summary(&mut e);
        assert_eq!(s.reason, EndReason::Completed);
        match s.detail {
            SummaryDetail::Reflex { rounds_ms, mean_ms, std_dev_ms, calibration_ms } => {
                assert_eq!(rounds_ms.len(), 5);
                assert!(rounds_ms.iter().all(|r| *r >= 1.0));
                assert!(mean_ms.is_some());
                assert!(std_dev_ms.is_some());
                assert_eq!(calibration_ms, 0.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_reflex_early_click_records_nothing() {
        let mut e = engine();
        start(&mut e, GameMode::Reflex, ModeConfig::default());
        e.on_click(0.0, 0.0);
        e.tick(500.0);
        e.on_click(0.0, 0.0);
        assert_eq!(
            e.hud().stat,
            HudStat::Reflex {
                round: 1,
                state: ReflexStateView::Early
            }
        );
        // the cancelled go signal never fires
        e.tick(8000.0);
        assert_eq!(
            e.hud().stat,
            HudStat::Reflex {
                round: 1,
                state: ReflexStateView::Early
            }
        );
        assert_eq!(e.session().score, 0);
    }

    #[test]
    fn test_reflex_ignores_the_countdown() {
        let mut e = engine();
        e.start_session(SessionSettings::new(GameMode::Reflex, 1, ModeConfig::default()))
            .unwrap();
        e.second_tick();
        e.second_tick();
        assert!(e.is_active());
    }
}
