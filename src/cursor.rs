use log::debug;

use crate::geometry::{Arena, Point};

/// Which kind of input source currently drives the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// pointer reports absolute arena coordinates
    #[default]
    Absolute,
    /// a locked pointer reports movement deltas
    Relative,
}

/// Cursor position as seen by the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorState {
    pub position: Point,
    pub input_mode: InputMode,
}

/// Owns the cursor. The position is always inside [0, width] x [0, height].
#[derive(Debug, Clone)]
pub struct CursorTracker {
    state: CursorState,
    arena: Arena,
}

impl CursorTracker {
    pub fn new(arena: Arena) -> Self {
        Self {
            state: CursorState {
                position: arena.center(),
                input_mode: InputMode::Absolute,
            },
            arena,
        }
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn position(&self) -> Point {
        self.state.position
    }

    pub fn input_mode(&self) -> InputMode {
        self.state.input_mode
    }

    pub fn is_relative(&self) -> bool {
        self.state.input_mode == InputMode::Relative
    }

    /// Absolute pointer event. Ignored while the pointer is locked.
    pub fn move_to(&mut self, p: Point) -> bool {
        if self.is_relative() {
            return false;
        }
        self.state.position = self.arena.clamp(p);
        true
    }

    /// Relative pointer event, applied 1:1 with no acceleration. Ignored while unlocked.
    pub fn move_by(&mut self, dx: f64, dy: f64) -> bool {
        if !self.is_relative() {
            return false;
        }
        let p = self.state.position;
        self.state.position = self.arena.clamp(Point::new(p.x + dx, p.y + dy));
        true
    }

    /// Switch to delta accumulation, keeping the last known position as the base
    pub fn lock(&mut self) {
        if !self.is_relative() {
            debug!("cursor locked at {:?}", self.state.position);
        }
        self.state.input_mode = InputMode::Relative;
    }

    /// Back to absolute input; the next absolute event re-synchronizes the position
    pub fn unlock(&mut self) {
        if self.is_relative() {
            debug!("cursor unlocked");
        }
        self.state.input_mode = InputMode::Absolute;
    }

    pub fn recenter(&mut self) {
        self.state.position = self.arena.center();
    }

    pub fn set_arena(&mut self, arena: Arena) {
        self.arena = arena;
        self.state.position = arena.clamp(self.state.position);
    }
}
