//! Run configuration
//!
//! Loaded from an optional JSON file; command-line flags override it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::consts::{DISPLAY_FPS, DISPLAY_TICK_RATE, HEADLESS_TICK_RATE};
use crate::input::InputKind;

/// Fatal configuration problems, reported before the episode loop starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnknownInput(String),
    UnknownMode(String),
    ZeroTickRate,
    ZeroFrameRate,
    MissingKeySource,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownInput(name) => {
                write!(f, "unknown control input \"{name}\" (expected user, ai or hardcoded)")
            }
            ConfigError::UnknownMode(name) => {
                write!(f, "unknown run mode \"{name}\" (expected display or headless)")
            }
            ConfigError::ZeroTickRate => write!(f, "tick rate must be at least 1 Hz"),
            ConfigError::ZeroFrameRate => write!(f, "display frame rate must be at least 1 Hz"),
            ConfigError::MissingKeySource => {
                write!(f, "user input selected but no key source is attached")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Whether a presentation layer consumes the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RunMode {
    #[default]
    Display,
    Headless,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Display => "display",
            RunMode::Headless => "headless",
        }
    }

    /// Tick loop rate used when no override is configured
    pub fn default_tick_rate(&self) -> u32 {
        match self {
            RunMode::Display => DISPLAY_TICK_RATE,
            RunMode::Headless => HEADLESS_TICK_RATE,
        }
    }
}

impl FromStr for RunMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "display" | "draw" => Ok(RunMode::Display),
            "headless" | "train" | "cli" => Ok(RunMode::Headless),
            _ => Err(ConfigError::UnknownMode(s.to_string())),
        }
    }
}

/// Everything needed to start a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Control input flying the rocket after the ascent
    pub input: InputKind,
    pub mode: RunMode,
    /// Tick loop rate override (Hz)
    pub tick_rate: Option<u32>,
    /// Ascent seed; a fresh one is drawn per episode when unset
    pub seed: Option<i64>,
    /// Presentation frame rate (Hz)
    pub display_fps: u32,
    /// Landing log location
    pub log_path: PathBuf,
    /// Stop after this many finished episodes
    pub max_episodes: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: InputKind::Ai,
            mode: RunMode::Display,
            tick_rate: None,
            seed: None,
            display_fps: DISPLAY_FPS,
            log_path: PathBuf::from("logs/landing_logs.json"),
            max_episodes: None,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file, falling back to defaults if it is missing
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                let settings = serde_json::from_str(&json)
                    .with_context(|| format!("failed to parse {}", path.display()))?;
                log::info!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    /// Tick loop rate after applying the override
    pub fn effective_tick_rate(&self) -> u32 {
        self.tick_rate.unwrap_or_else(|| self.mode.default_tick_rate())
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.effective_tick_rate() == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if self.mode == RunMode::Display && self.display_fps == 0 {
            return Err(ConfigError::ZeroFrameRate);
        }
        Ok(())
    }
}
