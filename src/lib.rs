//! Rocket Lander - a vertical-landing rocket simulation
//!
//! Core modules:
//! - `sim`: Fixed-timestep rocket physics, ground collision and landing score
//! - `input`: Interchangeable control strategies (user, hardcoded, AI)
//! - `driver`: Episode state machine, tick loop thread and snapshot pipeline
//! - `landing_log`: Per-episode landing records persisted as JSON
//! - `settings`: Run configuration
//! - `seed`: Seed providers for the ascent program
//! - `terminal`: Line-based terminal controls for user input

pub mod driver;
pub mod input;
pub mod landing_log;
pub mod seed;
pub mod settings;
pub mod sim;
pub mod terminal;

pub use landing_log::{LandingLog, LandingRecord};
pub use settings::{ConfigError, RunMode, Settings};

/// Simulation configuration constants
pub mod consts {
    /// Fixed physics timestep (60 Hz), independent of the tick loop rate
    pub const PHYSICS_DT: f32 = 1.0 / 60.0;

    /// Rocket body length in meters (Falcon 9)
    pub const ROCKET_LENGTH: f32 = 70.0;
    /// Rocket body width in meters
    pub const ROCKET_WIDTH: f32 = ROCKET_LENGTH / 10.0;

    /// Merlin 1D cluster thrust at 100% (newtons)
    pub const MAX_ENGINE_THRUST: f32 = 5_885_000.0;
    /// Empty mass in kilograms
    pub const DRY_MASS: f32 = 28_000.0;
    /// Fully fuelled mass in kilograms
    pub const WET_MASS: f32 = 439_000.0;
    /// Propellant capacity in kilograms
    pub const FUEL_CAPACITY: f32 = WET_MASS - DRY_MASS;
    /// Seconds of full thrust a full tank sustains
    pub const MAX_ENGINE_ON_TIME: f32 = 100.0;
    /// Fuel burned per second at full thrust (kg)
    pub const FUEL_BURN_PER_SECOND: f32 = FUEL_CAPACITY / MAX_ENGINE_ON_TIME;
    /// Merlin 1D can relight at least three times
    pub const ENGINE_STARTS: u32 = 3;

    /// Angular momentum added per jet firing
    pub const JET_TORQUE_STEP: f32 = 0.001;
    /// Per-tick angular momentum retention (synthetic aerodynamic damping)
    pub const ANGULAR_DAMPING: f32 = 0.99;

    /// Gravitational acceleration (m/s²), constant with altitude
    pub const GRAVITY: f32 = 9.8;

    /// Nominal ascent length in seconds
    pub const ASCENT_TIME: f32 = 5.0;
    /// Nominal ascent length in physics frames
    pub const ASCENT_FRAMES: f32 = ASCENT_TIME * 60.0;

    /// Touchdown speed at which the landing score crosses zero (m/s)
    pub const MAX_LANDING_VELOCITY: f32 = 10.0;
    /// Tilt from upright at which the landing score crosses zero (radians, 15°)
    pub const MAX_ANGLE_DEVIATION: f32 = std::f32::consts::PI / 12.0;
    /// Steepness of the logistic landing penalty
    pub const LANDING_SCORE_STEEPNESS: f32 = 20.0;

    /// Default tick loop rate with a display attached (one physics step per frame)
    pub const DISPLAY_TICK_RATE: u32 = 60;
    /// Default tick loop rate without a display
    pub const HEADLESS_TICK_RATE: u32 = 1000;
    /// Default presentation frame rate
    pub const DISPLAY_FPS: u32 = 60;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}
