//! Deterministic rocket simulation
//!
//! Everything physical lives here:
//! - Fixed timestep only (`consts::PHYSICS_DT`)
//! - Seeded ascent program, no wall-clock input
//! - No threading, rendering or input-device dependencies

pub mod collision;
pub mod geometry;
pub mod rocket;
pub mod snapshot;

pub use collision::{detect_ground_collision, is_grounded, landing_score, tilt};
pub use geometry::{Point, Vector};
pub use rocket::{Rocket, ThrustError};
pub use snapshot::{EpisodePhase, Outcome, RocketSnapshot};
