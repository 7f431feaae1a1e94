use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigError,
    hit::accuracy,
    mode::{GameMode, ModeConfig},
    reflex::ReflexState,
};

pub const DEFAULT_DURATION_SECS: u32 = 30;

/// Everything `start_session` needs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    pub mode: GameMode,
    pub duration_secs: u32,
    pub mode_config: ModeConfig,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            mode: GameMode::Standard,
            duration_secs: DEFAULT_DURATION_SECS,
            mode_config: ModeConfig::default(),
        }
    }
}

impl SessionSettings {
    pub fn new(mode: GameMode, duration_secs: u32, mode_config: ModeConfig) -> Self {
        Self {
            mode,
            duration_secs,
            mode_config,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duration_secs == 0 {
            return Err(ConfigError::InvalidDuration);
        }
        self.mode_config.validate()
    }
}

/// Live counters for one session. Kept (inactive) after the session ends so
/// the last result stays readable; replaced on the next start.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub mode: GameMode,
    pub duration_secs: u32,
    pub time_left: u32,
    pub active: bool,
    pub score: u32,
    pub shots_taken: u32,
    pub hits_landed: u32,
    pub elapsed_ms: f64,
}

impl Session {
    pub fn new(mode: GameMode, duration_secs: u32) -> Self {
        Self {
            mode,
            duration_secs,
            time_left: duration_secs,
            active: true,
            score: 0,
            shots_taken: 0,
            hits_landed: 0,
            elapsed_ms: 0.0,
        }
    }

    /// An inactive placeholder before the first start
    pub fn idle() -> Self {
        Self {
            active: false,
            ..Self::new(GameMode::Standard, DEFAULT_DURATION_SECS)
        }
    }

    pub fn accuracy(&self) -> u32 {
        accuracy(self.hits_landed, self.shots_taken)
    }
}

/// Mode-specific HUD field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HudStat {
    Accuracy(u32),
    Streak { streak: u32, max_streak: u32, multiplier: u32 },
    Reflex { round: u8, state: ReflexStateView },
}

/// Serializable mirror of the reflex state for the HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReflexStateView {
    Idle,
    Waiting,
    Go,
    Early,
}

impl From<ReflexState> for ReflexStateView {
    fn from(s: ReflexState) -> Self {
        match s {
            ReflexState::Idle => ReflexStateView::Idle,
            ReflexState::Waiting => ReflexStateView::Waiting,
            ReflexState::Go => ReflexStateView::Go,
            ReflexState::Early => ReflexStateView::Early,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    pub score: u32,
    pub time_left: u32,
    pub stat: HudStat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum EndReason {
    #[strum(serialize = "Time's up!")]
    TimeUp,
    #[strum(serialize = "Session stopped")]
    Stopped,
    #[strum(serialize = "Drill complete")]
    Completed,
    #[strum(serialize = "Session aborted")]
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SummaryDetail {
    Accuracy {
        accuracy: u32,
        hits: u32,
        shots: u32,
    },
    Tracking {
        max_streak: u32,
    },
    Reflex {
        rounds_ms: Vec<f64>,
        mean_ms: Option<f64>,
        std_dev_ms: Option<f64>,
        calibration_ms: f64,
    },
}

/// End-of-session record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub mode: GameMode,
    pub reason: EndReason,
    pub score: u32,
    pub detail: SummaryDetail,
}
