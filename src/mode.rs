use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The drill a session runs
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameMode {
    Standard,
    Quickscope,
    Moving,
    Reflex,
    Flick,
    Tracking,
}

impl GameMode {
    pub const ALL: [GameMode; 6] = [
        GameMode::Standard,
        GameMode::Quickscope,
        GameMode::Moving,
        GameMode::Reflex,
        GameMode::Flick,
        GameMode::Tracking,
    ];

    /// Human readable title used in summaries
    pub fn title(&self) -> &'static str {
        match self {
            GameMode::Standard => "Standard",
            GameMode::Quickscope => "Quick Scope",
            GameMode::Moving => "Moving Target",
            GameMode::Reflex => "Reflex",
            GameMode::Flick => "Flick",
            GameMode::Tracking => "Tracking",
        }
    }

    /// Next mode in menu order, wrapping around
    pub fn next(&self) -> GameMode {
        let idx = Self::ALL.iter().position(|m| m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl FromStr for GameMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(GameMode::Standard),
            "quickscope" | "quick-scope" => Ok(GameMode::Quickscope),
            "moving" => Ok(GameMode::Moving),
            "reflex" => Ok(GameMode::Reflex),
            "flick" => Ok(GameMode::Flick),
            "tracking" => Ok(GameMode::Tracking),
            _ => Err(ConfigError::UnknownMode(s.to_string())),
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FlickDifficulty {
    /// corners only
    Easy,
    /// anywhere along the edges
    #[default]
    Medium,
    /// far jumps across the interior
    Hard,
}

impl FromStr for FlickDifficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(FlickDifficulty::Easy),
            "medium" => Ok(FlickDifficulty::Medium),
            "hard" => Ok(FlickDifficulty::Hard),
            _ => Err(ConfigError::UnknownDifficulty(s.to_string())),
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TrackingPattern {
    #[default]
    Linear,
    Circular,
    Random,
    Zigzag,
}

impl FromStr for TrackingPattern {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linear" => Ok(TrackingPattern::Linear),
            "circular" => Ok(TrackingPattern::Circular),
            "random" => Ok(TrackingPattern::Random),
            "zigzag" => Ok(TrackingPattern::Zigzag),
            _ => Err(ConfigError::UnknownPattern(s.to_string())),
        }
    }
}

/// Per-mode knobs carried into `start_session`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeConfig {
    /// Seconds a target lives before it counts as a miss. 0 disables the timeout.
    pub target_lifetime_secs: f64,
    /// Moving-mode speed in pixels per 16 ms reference frame
    pub moving_speed: f64,
    pub flick_difficulty: FlickDifficulty,
    pub tracking_pattern: TrackingPattern,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            target_lifetime_secs: 1.0,
            moving_speed: 3.0,
            flick_difficulty: FlickDifficulty::default(),
            tracking_pattern: TrackingPattern::default(),
        }
    }
}

impl ModeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.target_lifetime_secs.is_finite() || self.target_lifetime_secs < 0.0 {
            return Err(ConfigError::InvalidTargetLifetime(self.target_lifetime_secs));
        }
        if !self.moving_speed.is_finite() || self.moving_speed <= 0.0 {
            return Err(ConfigError::InvalidSpeed(self.moving_speed));
        }
        Ok(())
    }

    /// Target lifetime in milliseconds, or None when timeouts are disabled
    pub fn lifetime_ms(&self) -> Option<f64> {
        (self.target_lifetime_secs > 0.0).then(|| self.target_lifetime_secs * 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing_accepts_known_names() {
        assert_eq!("standard".parse::<GameMode>(), Ok(GameMode::Standard));
        assert_eq!("QuickScope".parse::<GameMode>(), Ok(GameMode::Quickscope));
        assert_eq!(" tracking ".parse::<GameMode>(), Ok(GameMode::Tracking));
    }

    #[test]
    fn test_unknown_identifiers_are_rejected() {
        assert_eq!(
            "sniper".parse::<GameMode>(),
            Err(ConfigError::UnknownMode("sniper".into()))
        );
        assert_eq!(
            "insane".parse::<FlickDifficulty>(),
            Err(ConfigError::UnknownDifficulty("insane".into()))
        );
        assert_eq!(
            "spiral".parse::<TrackingPattern>(),
            Err(ConfigError::UnknownPattern("spiral".into()))
        );
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for mode in GameMode::ALL {
            assert_eq!(mode.to_string().parse::<GameMode>(), Ok(mode));
        }
        assert_eq!(FlickDifficulty::Hard.to_string(), "hard");
        assert_eq!(TrackingPattern::Zigzag.to_string(), "zigzag");
    }

    #[test]
    fn test_next_cycles_through_all_modes() {
        let mut mode = GameMode::Standard;
        for _ in 0..GameMode::ALL.len() {
            mode = mode.next();
        }
        assert_eq!(mode, GameMode::Standard);
        assert_eq!(GameMode::Tracking.next(), GameMode::Standard);
    }

    #[test]
    fn test_mode_config_validation() {
        assert!(ModeConfig::default().validate().is_ok());

        let bad_lifetime = ModeConfig {
            target_lifetime_secs: -1.0,
            ..ModeConfig::default()
        };
        assert_eq!(
            bad_lifetime.validate(),
            Err(ConfigError::InvalidTargetLifetime(-1.0))
        );

        let bad_speed = ModeConfig {
            moving_speed: 0.0,
            ..ModeConfig::default()
        };
        assert_eq!(bad_speed.validate(), Err(ConfigError::InvalidSpeed(0.0)));
    }

    #[test]
    fn test_zero_lifetime_disables_timeout() {
        let cfg = ModeConfig {
            target_lifetime_secs: 0.0,
            ..ModeConfig::default()
        };
        assert_eq!(cfg.lifetime_ms(), None);
        assert_eq!(ModeConfig::default().lifetime_ms(), Some(1000.0));
    }
}
