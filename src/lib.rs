// Library surface for the engine, headless/integration tests and reuse.
// Keep this lean: the terminal front-end (App, ui) lives in main.rs.
pub mod behavior;
pub mod config;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod hit;
pub mod mode;
pub mod motion;
pub mod reflex;
pub mod runtime;
pub mod scheduler;
pub mod scoring;
pub mod session;
pub mod spawner;
pub mod target;
pub mod util;

pub use engine::{Engine, EngineEvent};
pub use geometry::{Arena, Point};
pub use mode::{FlickDifficulty, GameMode, ModeConfig, TrackingPattern};
pub use session::{SessionSettings, Summary};
