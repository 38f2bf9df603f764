//! Control input strategies
//!
//! Every strategy gets one call per simulation tick to adjust the rocket's
//! control surfaces (thrust level and RCS jets). The strategy is picked once at
//! startup and reused for every episode.

pub mod ai;
pub mod hardcoded;
pub mod user;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::settings::ConfigError;
use crate::sim::Rocket;

pub use ai::AiInput;
pub use hardcoded::HardcodedInput;
pub use user::UserInput;

/// Which control strategy flies the rocket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputKind {
    User,
    Ai,
    Hardcoded,
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::User => "User",
            InputKind::Ai => "AI",
            InputKind::Hardcoded => "Hardcoded",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(InputKind::User),
            "ai" => Ok(InputKind::Ai),
            "hardcoded" => Ok(InputKind::Hardcoded),
            _ => Err(ConfigError::UnknownInput(s.to_string())),
        }
    }
}

/// A per-tick controller for the rocket
pub trait ControlInput: Send {
    /// Adjust thrust and jets for the coming physics step
    fn update(&mut self, rocket: &mut Rocket);

    fn kind(&self) -> InputKind;

    /// Forget any state carried over from the previous episode
    fn reset(&mut self) {}
}

/// Logical controls a human can hold down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    IncreaseThrust,
    DecreaseThrust,
    JetLeft,
    JetRight,
}

impl Control {
    pub const ALL: [Control; 4] = [
        Control::IncreaseThrust,
        Control::DecreaseThrust,
        Control::JetLeft,
        Control::JetRight,
    ];

    fn index(self) -> usize {
        match self {
            Control::IncreaseThrust => 0,
            Control::DecreaseThrust => 1,
            Control::JetLeft => 2,
            Control::JetRight => 3,
        }
    }
}

/// Current pressed state of the logical controls
pub trait KeySource: Send {
    fn is_pressed(&self, control: Control) -> bool;
}

/// Key state shared between an input device and the simulation thread
///
/// Clones share the same flags. The device side calls [`KeyboardState::set`];
/// the simulation samples it once per tick.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    keys: Arc<[AtomicBool; 4]>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, control: Control, pressed: bool) {
        self.keys[control.index()].store(pressed, Ordering::Relaxed);
    }

    pub fn release_all(&self) {
        for control in Control::ALL {
            self.set(control, false);
        }
    }
}

impl KeySource for KeyboardState {
    fn is_pressed(&self, control: Control) -> bool {
        self.keys[control.index()].load(Ordering::Relaxed)
    }
}

/// Build the configured strategy
///
/// `User` needs a key source; asking for it without one is a startup error.
pub fn create_input(
    kind: InputKind,
    keys: Option<Box<dyn KeySource>>,
) -> Result<Box<dyn ControlInput>, ConfigError> {
    match kind {
        InputKind::User => {
            let keys = keys.ok_or(ConfigError::MissingKeySource)?;
            Ok(Box::new(UserInput::new(keys)))
        }
        InputKind::Ai => Ok(Box::new(AiInput)),
        InputKind::Hardcoded => Ok(Box::new(HardcodedInput)),
    }
}
