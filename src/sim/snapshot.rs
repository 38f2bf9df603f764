//! Episode phases and the immutable rocket snapshot handed to presentation

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rocket::Rocket;
use crate::normalize_angle;

/// How a finished episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Landed,
    Crashed,
}

impl Outcome {
    /// Classify a landing score
    pub fn from_score(score: f32) -> Self {
        if score >= 0.0 {
            Outcome::Landed
        } else {
            Outcome::Crashed
        }
    }
}

/// Where an episode is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodePhase {
    /// Scripted ascent program is flying the rocket
    Ascending,
    /// The configured control input is flying the rocket
    Controlled,
    /// Ground contact after hand-off; the episode is over
    Terminal(Outcome),
}

impl EpisodePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, EpisodePhase::Terminal(_))
    }
}

/// Point-in-time copy of a rocket, safe to send across threads
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RocketSnapshot {
    pub episode: u64,
    pub seed: i64,
    pub phase: EpisodePhase,
    pub position: Vec2,
    pub direction: f32,
    pub speed: Vec2,
    pub angular_momentum: f32,
    pub fuel_mass: f32,
    pub fuel_percentage: f32,
    pub thrust: f32,
    pub thrust_percentage: f32,
    pub engine_starts_remaining: u32,
    pub frames: u64,
    pub flight_time: f32,
}

impl RocketSnapshot {
    pub fn capture(rocket: &Rocket, episode: u64, seed: i64, phase: EpisodePhase) -> Self {
        Self {
            episode,
            seed,
            phase,
            position: rocket.position,
            direction: rocket.direction,
            speed: rocket.speed,
            angular_momentum: rocket.angular_momentum,
            fuel_mass: rocket.fuel_mass(),
            fuel_percentage: rocket.fuel_percentage(),
            thrust: rocket.thrust(),
            thrust_percentage: rocket.thrust_percentage(),
            engine_starts_remaining: rocket.engine_starts_remaining,
            frames: rocket.frames(),
            flight_time: rocket.flight_time(),
        }
    }

    /// Signed deviation from upright in [-π, π)
    pub fn tilt(&self) -> f32 {
        normalize_angle(self.direction - FRAC_PI_2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_sign_convention() {
        assert_eq!(Outcome::from_score(0.0), Outcome::Landed);
        assert_eq!(Outcome::from_score(1.3), Outcome::Landed);
        assert_eq!(Outcome::from_score(-0.001), Outcome::Crashed);
    }

    #[test]
    fn test_snapshot_is_detached_from_rocket() {
        let mut rocket = Rocket::new();
        let snap = RocketSnapshot::capture(&rocket, 3, 1, EpisodePhase::Ascending);
        rocket.set_thrust(1.0).unwrap();
        rocket.update();
        assert_eq!(snap.frames, 0);
        assert_eq!(snap.thrust, 0.0);
        assert_eq!(snap.episode, 3);
        assert_ne!(snap.frames, rocket.frames());
    }

    #[test]
    fn test_snapshot_serializes() {
        let rocket = Rocket::new();
        let snap = RocketSnapshot::capture(
            &rocket,
            0,
            -12,
            EpisodePhase::Terminal(Outcome::Crashed),
        );
        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("Crashed"));
        let back: RocketSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }
}
