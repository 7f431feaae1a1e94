// Deferred work for the engine.
//
// Callbacks are plain data rather than closures: the scheduler hands due
// tasks back to the engine, which dispatches them on its own thread. The
// engine keeps the handle of every pending task so it can cancel them on
// stop or mode switch and drop anything it no longer recognises.

/// Work scheduled to run once after a delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// the live target outlived its lifetime
    TargetExpired,
    /// spawn the next target after a pause (quickscope)
    RespawnTarget,
    /// tracking-mode proximity sample
    TrackingPoll,
    /// reflex go signal
    ReflexArm,
}

/// Work run on every simulation frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameTask {
    Motion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

/// A timer whose deadline has passed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Due {
    pub handle: TimerHandle,
    pub task: Task,
    /// the deadline the task was scheduled for
    pub at_ms: f64,
}

pub trait Scheduler {
    fn now_ms(&self) -> f64;
    fn schedule(&mut self, task: Task, delay_ms: f64) -> TimerHandle {
        let at = self.now_ms() + delay_ms.max(0.0);
        self.schedule_at(task, at)
    }
    fn schedule_at(&mut self, task: Task, at_ms: f64) -> TimerHandle;
    /// Returns false when the handle already fired or was cancelled
    fn cancel(&mut self, handle: TimerHandle) -> bool;
    fn on_frame(&mut self, task: FrameTask) -> FrameHandle;
    /// Frame tasks currently registered, in registration order
    fn frames(&self) -> Vec<FrameTask>;
    fn advance(&mut self, delta_ms: f64);
    /// Pop the earliest timer whose deadline is at or before `now_ms`
    fn next_due(&mut self) -> Option<Due>;
    fn pending(&self) -> usize;
    fn cancel_all(&mut self);
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    handle: TimerHandle,
    task: Task,
    at_ms: f64,
}

/// Virtual-clock scheduler: time only moves when the host calls `advance`,
/// which keeps sessions deterministic under test.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    now_ms: f64,
    next_id: u64,
    timers: Vec<Pending>,
    frames: Vec<(FrameHandle, FrameTask)>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl Scheduler for FrameScheduler {
    fn now_ms(&self) -> f64 {
        self.now_ms
    }

    fn schedule_at(&mut self, task: Task, at_ms: f64) -> TimerHandle {
        let handle = TimerHandle(self.next_id());
        self.timers.push(Pending {
            handle,
            task,
            at_ms,
        });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|p| p.handle != handle);
        self.timers.len() != before
    }

    fn on_frame(&mut self, task: FrameTask) -> FrameHandle {
        let handle = FrameHandle(self.next_id());
        self.frames.push((handle, task));
        handle
    }

    fn frames(&self) -> Vec<FrameTask> {
        self.frames.iter().map(|(_, t)| *t).collect()
    }

    fn advance(&mut self, delta_ms: f64) {
        if delta_ms.is_finite() && delta_ms > 0.0 {
            self.now_ms += delta_ms;
        }
    }

    fn next_due(&mut self) -> Option<Due> {
        // earliest deadline first, ties broken by scheduling order
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, p)| p.at_ms <= self.now_ms)
            .min_by(|(_, a), (_, b)| {
                a.at_ms
                    .partial_cmp(&b.at_ms)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.handle.0.cmp(&b.handle.0))
            })
            .map(|(i, _)| i)?;
        let p = self.timers.remove(idx);
        Some(Due {
            handle: p.handle,
            task: p.task,
            at_ms: p.at_ms,
        })
    }

    fn pending(&self) -> usize {
        self.timers.len()
    }

    fn cancel_all(&mut self) {
        self.timers.clear();
        self.frames.clear();
    }
}
