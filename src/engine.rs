// Session controller.
//
// `Engine` owns every piece of session state and is driven entirely from
// the outside: input events, `tick(delta_ms)` per frame and `second_tick()`
// for the countdown. Per-mode rules live behind `ModeBehavior`; the
// engine only orders the work and reports results through `EngineEvent`s.

use log::{debug, error, info, warn};
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    behavior::{behavior_for, ModeBehavior},
    cursor::{CursorState, CursorTracker},
    error::{ConfigError, EngineError},
    geometry::{Arena, Point},
    hit::HitResolver,
    mode::GameMode,
    motion::time_scale,
    reflex::{Calibrator, FixedCalibration},
    scheduler::{Due, FrameHandle, FrameScheduler, FrameTask, Scheduler, Task, TimerHandle},
    session::{EndReason, Hud, HudStat, Session, SessionSettings, Summary, SummaryDetail},
    spawner::TargetSpawner,
    target::{Target, TargetGeometry, TARGET_SIZE},
};

/// Arenas narrower or shorter than this cannot host the padded placements
pub const MIN_ARENA_SIDE: f64 = 160.0;

/// Records produced for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Hud(Hud),
    /// a target was placed or moved
    Target(TargetGeometry),
    TargetRemoved,
    /// the engine wants a locked (relative) pointer
    LockRequested,
    /// the engine no longer needs the locked pointer
    LockReleased,
    SessionEnded(Summary),
    Fault(String),
}

/// Handles of the per-mode callbacks currently pending
#[derive(Debug, Default)]
pub(crate) struct Timers {
    target_expired: Option<TimerHandle>,
    respawn: Option<TimerHandle>,
    tracking_poll: Option<TimerHandle>,
    reflex_arm: Option<TimerHandle>,
    motion: Option<FrameHandle>,
}

impl Timers {
    fn slot(&mut self, task: Task) -> &mut Option<TimerHandle> {
        match task {
            Task::TargetExpired => &mut self.target_expired,
            Task::RespawnTarget => &mut self.respawn,
            Task::TrackingPoll => &mut self.tracking_poll,
            Task::ReflexArm => &mut self.reflex_arm,
        }
    }

    fn is_current(&mut self, due: &Due) -> bool {
        *self.slot(due.task) == Some(due.handle)
    }
}

/// Session state shared with the mode behaviors
pub struct Core {
    pub(crate) session: Session,
    pub(crate) settings: SessionSettings,
    pub(crate) arena: Arena,
    pub(crate) cursor: CursorTracker,
    pub(crate) target: Option<Target>,
    pub(crate) rng: StdRng,
    pub(crate) spawner: TargetSpawner,
    pub(crate) resolver: HitResolver,
    scheduler: Box<dyn Scheduler>,
    timers: Timers,
    events: Vec<EngineEvent>,
    finish: Option<EndReason>,
}

impl Core {
    pub fn now_ms(&self) -> f64 {
        self.scheduler.now_ms()
    }

    pub(crate) fn emit(&mut self, event: EngineEvent) {
        self.events.push(event);
    }

    /// Ask the engine to end the session once the current callback returns
    pub(crate) fn request_finish(&mut self, reason: EndReason) {
        self.finish.get_or_insert(reason);
    }

    pub(crate) fn schedule(&mut self, task: Task, delay_ms: f64) {
        self.cancel(task);
        let handle = self.scheduler.schedule(task, delay_ms);
        *self.timers.slot(task) = Some(handle);
    }

    pub(crate) fn schedule_at(&mut self, task: Task, at_ms: f64) {
        self.cancel(task);
        let handle = self.scheduler.schedule_at(task, at_ms);
        *self.timers.slot(task) = Some(handle);
    }

    pub(crate) fn cancel(&mut self, task: Task) {
        if let Some(handle) = self.timers.slot(task).take() {
            self.scheduler.cancel(handle);
        }
    }

    pub(crate) fn start_motion(&mut self) {
        if self.timers.motion.is_none() {
            self.timers.motion = Some(self.scheduler.on_frame(FrameTask::Motion));
        }
    }

    fn cancel_all(&mut self) {
        self.scheduler.cancel_all();
        self.timers = Timers::default();
    }

    /// A fresh click-mode target at a position chosen for the active mode
    pub(crate) fn new_target(&mut self, previous_center: Option<Point>) -> Target {
        let position = self.spawner.spawn(
            self.settings.mode,
            self.settings.mode_config.flick_difficulty,
            previous_center,
            &self.arena,
            TARGET_SIZE,
            &mut self.rng,
        );
        Target::new(position, TARGET_SIZE, self.now_ms())
            .with_ttl(self.settings.mode_config.lifetime_ms())
    }

    /// Make `target` the live target, arming its timeout if it has one
    pub(crate) fn place_target(&mut self, target: Target) {
        self.cancel(Task::TargetExpired);
        if let Some(ttl) = target.ttl_ms {
            self.schedule(Task::TargetExpired, ttl);
        }
        self.emit(EngineEvent::Target(target.geometry()));
        self.target = Some(target);
    }

    pub(crate) fn remove_target(&mut self) -> Option<Target> {
        self.cancel(Task::TargetExpired);
        let removed = self.target.take();
        if removed.is_some() {
            self.emit(EngineEvent::TargetRemoved);
        }
        removed
    }

    /// Center the cursor; quickscope also asks for the pointer lock back
    pub(crate) fn reset_cursor_position(&mut self) {
        self.cursor.recenter();
        if self.settings.mode == GameMode::Quickscope && !self.cursor.is_relative() {
            self.emit(EngineEvent::LockRequested);
        }
    }

    pub(crate) fn book_hit(&mut self, bonus: u32) {
        self.resolver.hit(&mut self.session, bonus);
    }

    pub(crate) fn book_miss(&mut self) {
        self.resolver.miss(&mut self.session);
    }
}

pub struct Engine {
    core: Core,
    behavior: Option<Box<dyn ModeBehavior>>,
    calibrator: Box<dyn Calibrator>,
}

impl Engine {
    pub fn new(arena: Arena) -> Self {
        Self {
            core: Core {
                session: Session::idle(),
                settings: SessionSettings::default(),
                arena,
                cursor: CursorTracker::new(arena),
                target: None,
                rng: StdRng::from_entropy(),
                spawner: TargetSpawner,
                resolver: HitResolver,
                scheduler: Box::new(FrameScheduler::new()),
                timers: Timers::default(),
                events: Vec::new(),
                finish: None,
            },
            behavior: None,
            calibrator: Box::new(FixedCalibration(0.0)),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.core.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Source of the reflex calibration offset, read at every reflex start.
    /// Defaults to no offset.
    pub fn with_calibrator<C: Calibrator + 'static>(mut self, calibrator: C) -> Self {
        self.calibrator = Box::new(calibrator);
        self
    }

    pub fn with_scheduler<S: Scheduler + 'static>(mut self, scheduler: S) -> Self {
        self.core.scheduler = Box::new(scheduler);
        self.core.timers = Timers::default();
        self
    }

    pub fn session(&self) -> &Session {
        &self.core.session
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.core.settings
    }

    pub fn arena(&self) -> Arena {
        self.core.arena
    }

    pub fn cursor(&self) -> CursorState {
        self.core.cursor.state()
    }

    pub fn target(&self) -> Option<&Target> {
        self.core.target.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.core.session.active
    }

    pub fn now_ms(&self) -> f64 {
        self.core.now_ms()
    }

    pub fn hud(&self) -> Hud {
        let stat = match &self.behavior {
            Some(b) => b.hud_stat(&self.core),
            None => HudStat::Accuracy(self.core.session.accuracy()),
        };
        Hud {
            score: self.core.session.score,
            time_left: self.core.session.time_left,
            stat,
        }
    }

    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.core.events)
    }

    pub fn start_session(&mut self, settings: SessionSettings) -> Result<(), ConfigError> {
        settings.validate()?;
        let arena = self.core.arena;
        if arena.width < MIN_ARENA_SIDE || arena.height < MIN_ARENA_SIDE {
            return Err(ConfigError::ArenaTooSmall {
                width: arena.width,
                height: arena.height,
            });
        }

        if self.is_active() {
            self.stop_session();
        }

        let core = &mut self.core;
        core.cancel_all();
        core.target = None;
        core.finish = None;
        core.settings = settings;
        core.session = Session::new(settings.mode, settings.duration_secs);
        core.cursor.unlock();
        if settings.mode == GameMode::Quickscope {
            core.cursor.recenter();
        }

        let calibration_ms = if settings.mode == GameMode::Reflex {
            self.calibrator.measure()
        } else {
            0.0
        };
        self.behavior = Some(behavior_for(&settings, calibration_ms));
        info!(
            "started {} session ({}s, {:?})",
            settings.mode, settings.duration_secs, settings.mode_config
        );

        self.dispatch(|b, core| b.on_spawn(core));
        self.settle();
        Ok(())
    }

    /// End the running session. A second call is a no-op returning None.
    pub fn stop_session(&mut self) -> Option<Summary> {
        if !self.is_active() {
            return None;
        }
        Some(self.finish(EndReason::Stopped))
    }

    pub fn tick(&mut self, delta_ms: f64) {
        if !self.is_active() {
            return;
        }
        if !delta_ms.is_finite() || delta_ms <= 0.0 {
            warn!("{}", EngineError::InvalidDelta(delta_ms));
            return;
        }

        self.core.scheduler.advance(delta_ms);
        self.core.session.elapsed_ms += delta_ms;
        let scale = time_scale(delta_ms);

        // motion first so timers and scoring see this frame's positions
        for task in self.core.scheduler.frames() {
            match task {
                FrameTask::Motion => self.dispatch(|b, core| b.on_tick(core, scale)),
            }
            if self.core.finish.is_some() {
                self.settle();
                return;
            }
        }

        let mut fired = false;
        while let Some(due) = self.core.scheduler.next_due() {
            if !self.core.timers.is_current(&due) {
                debug!("dropping stale {:?}", due.task);
                continue;
            }
            *self.core.timers.slot(due.task) = None;
            self.dispatch(|b, core| b.on_timer(core, due));
            fired = true;
            if self.core.finish.is_some() {
                break;
            }
        }

        if fired || self.core.finish.is_some() {
            self.settle();
        }
    }

    /// 1 Hz countdown
    pub fn second_tick(&mut self) {
        if !self.is_active() {
            return;
        }
        if !self.behavior.as_ref().is_some_and(|b| b.is_timed()) {
            return;
        }
        let session = &mut self.core.session;
        session.time_left = session.time_left.saturating_sub(1);
        if session.time_left == 0 {
            info!("{} session timed out", session.mode);
            self.finish(EndReason::TimeUp);
        } else {
            self.emit_hud();
        }
    }

    pub fn on_pointer_move(&mut self, x: f64, y: f64) {
        self.core.cursor.move_to(Point::new(x, y));
    }

    pub fn on_pointer_delta(&mut self, dx: f64, dy: f64) {
        self.core.cursor.move_by(dx, dy);
    }

    pub fn on_click(&mut self, x: f64, y: f64) {
        if !self.is_active() {
            return;
        }
        let point = if self.core.cursor.is_relative() {
            self.core.cursor.position()
        } else {
            let p = self.core.arena.clamp(Point::new(x, y));
            self.core.cursor.move_to(p);
            p
        };
        self.dispatch(|b, core| b.on_click(core, point));
        self.settle();
    }

    pub fn on_lock_acquired(&mut self) {
        let wants_lock = self.is_active()
            && self.behavior.as_ref().is_some_and(|b| b.uses_pointer_lock());
        if wants_lock {
            self.core.cursor.lock();
        } else {
            debug!("ignoring pointer lock outside quickscope");
        }
    }

    pub fn on_lock_released(&mut self) {
        self.core.cursor.unlock();
    }

    /// The play area changed size; keep cursor and target inside it
    pub fn resize(&mut self, arena: Arena) {
        let core = &mut self.core;
        core.arena = arena;
        core.cursor.set_arena(arena);
        let Some(target) = core.target.as_mut() else {
            return;
        };
        target.position = arena.clamp_box(target.position, target.size);

        self.dispatch(|b, core| b.on_resize(core));
        if let Some(geometry) = self.core.target.as_ref().map(Target::geometry) {
            self.core.emit(EngineEvent::Target(geometry));
        }
    }

    /// Run a behavior hook; a fault aborts the session instead of unwinding.
    fn dispatch<F>(&mut self, f: F)
    where
        F: FnOnce(&mut dyn ModeBehavior, &mut Core) -> crate::error::Result<()>,
    {
        let Some(behavior) = self.behavior.as_deref_mut() else {
            return;
        };
        if let Err(e) = f(behavior, &mut self.core) {
            error!("aborting {} session: {e}", self.core.session.mode);
            self.core.emit(EngineEvent::Fault(e.to_string()));
            self.core.request_finish(EndReason::Aborted);
        }
    }

    /// Apply any pending finish request, otherwise publish the HUD
    fn settle(&mut self) {
        match self.core.finish.take() {
            Some(reason) if self.is_active() => {
                self.finish(reason);
            }
            _ => self.emit_hud(),
        }
    }

    fn emit_hud(&mut self) {
        let hud = self.hud();
        self.core.emit(EngineEvent::Hud(hud));
    }

    fn finish(&mut self, reason: EndReason) -> Summary {
        let summary = Summary {
            mode: self.core.session.mode,
            reason,
            score: self.core.session.score,
            detail: match &self.behavior {
                Some(b) => b.summary_detail(&self.core),
                None => SummaryDetail::Accuracy {
                    accuracy: self.core.session.accuracy(),
                    hits: self.core.session.hits_landed,
                    shots: self.core.session.shots_taken,
                },
            },
        };

        let core = &mut self.core;
        core.cancel_all();
        core.finish = None;
        core.remove_target();
        if core.cursor.is_relative() {
            core.cursor.unlock();
            core.emit(EngineEvent::LockReleased);
        }
        core.session.active = false;
        info!(
            "{} session ended ({reason:?}): score {}",
            core.session.mode, core.session.score
        );

        let hud = self.hud();
        self.core.emit(EngineEvent::Hud(hud));
        self.core.emit(EngineEvent::SessionEnded(summary.clone()));
        summary
    }
}
