use directories::ProjectDirs;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{
    error::ConfigError,
    mode::{FlickDifficulty, GameMode, ModeConfig, TrackingPattern},
    session::SessionSettings,
};

/// Last-used session settings. Identifiers are kept as plain strings so a
/// hand-edited file with a typo is reported instead of silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub mode: String,
    pub duration_secs: u32,
    pub target_lifetime_secs: f64,
    pub moving_speed: f64,
    pub flick_difficulty: String,
    pub tracking_pattern: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from(&SessionSettings::default())
    }
}

impl From<&SessionSettings> for Config {
    fn from(s: &SessionSettings) -> Self {
        Self {
            mode: s.mode.to_string(),
            duration_secs: s.duration_secs,
            target_lifetime_secs: s.mode_config.target_lifetime_secs,
            moving_speed: s.mode_config.moving_speed,
            flick_difficulty: s.mode_config.flick_difficulty.to_string(),
            tracking_pattern: s.mode_config.tracking_pattern.to_string(),
        }
    }
}

impl Config {
    pub fn to_settings(&self) -> Result<SessionSettings, ConfigError> {
        let settings = SessionSettings {
            mode: self.mode.parse::<GameMode>()?,
            duration_secs: self.duration_secs,
            mode_config: ModeConfig {
                target_lifetime_secs: self.target_lifetime_secs,
                moving_speed: self.moving_speed,
                flick_difficulty: self.flick_difficulty.parse::<FlickDifficulty>()?,
                tracking_pattern: self.tracking_pattern.parse::<TrackingPattern>()?,
            },
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Stored settings, or the defaults when they no longer parse
    pub fn to_settings_or_default(&self) -> SessionSettings {
        self.to_settings().unwrap_or_else(|e| {
            warn!("ignoring stored settings: {e}");
            SessionSettings::default()
        })
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "aimr") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("aimr_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("unreadable config at {}: {e}", self.path.display());
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::DEFAULT_DURATION_SECS;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            mode: "tracking".into(),
            duration_secs: 90,
            target_lifetime_secs: 0.0,
            moving_speed: 5.5,
            flick_difficulty: "hard".into(),
            tracking_pattern: "zigzag".into(),
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);

        let settings = loaded.to_settings().unwrap();
        assert_eq!(settings.mode, GameMode::Tracking);
        assert_eq!(settings.mode_config.tracking_pattern, TrackingPattern::Zigzag);
        assert_eq!(settings.mode_config.lifetime_ms(), None);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{ "mode": "flick" }"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.mode, "flick");
        assert_eq!(cfg.duration_secs, DEFAULT_DURATION_SECS);
    }

    #[test]
    fn unknown_identifiers_are_rejected() {
        let cfg = Config {
            mode: "sniper".into(),
            ..Config::default()
        };
        assert_eq!(
            cfg.to_settings(),
            Err(ConfigError::UnknownMode("sniper".into()))
        );

        let cfg = Config {
            tracking_pattern: "spiral".into(),
            ..Config::default()
        };
        assert!(matches!(
            cfg.to_settings(),
            Err(ConfigError::UnknownPattern(_))
        ));
        assert_eq!(cfg.to_settings_or_default(), SessionSettings::default());
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let cfg = Config {
            moving_speed: -1.0,
            ..Config::default()
        };
        assert_eq!(cfg.to_settings(), Err(ConfigError::InvalidSpeed(-1.0)));
    }
}
