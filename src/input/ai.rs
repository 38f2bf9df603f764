//! Scripted landing autopilot
//!
//! Holds the rocket upright with the RCS jets and tracks a descent-rate profile
//! that slows down as the ground gets closer. While the engine burns, the hold
//! leans slightly against horizontal drift so thrust cancels it. The engine is
//! lit at most once per descent: relights are scarce, so once burning it never
//! drops below idle.

use super::{ControlInput, InputKind};
use crate::consts::{GRAVITY, MAX_ENGINE_THRUST, PHYSICS_DT, ROCKET_LENGTH};
use crate::sim::geometry::sinf;
use crate::sim::{Rocket, tilt};

/// Remaining rotation of the current angular momentum once jets stop (seconds)
const ATTITUDE_LOOKAHEAD: f32 = PHYSICS_DT / (1.0 - crate::consts::ANGULAR_DAMPING);
const ATTITUDE_DEADBAND: f32 = 0.001;

/// Lean per m/s of horizontal speed (rad)
const LATERAL_GAIN: f32 = 0.02;
const MAX_LATERAL_TILT: f32 = 0.15;
/// Below this altitude the rocket is held upright for touchdown (m)
const UPRIGHT_ALTITUDE: f32 = 20.0;

/// Descent rate near the ground (m/s)
const MIN_DESCENT_RATE: f32 = 1.5;
/// Extra descent rate allowed per meter of altitude
const DESCENT_RATE_PER_METER: f32 = 0.1;
const MAX_DESCENT_RATE: f32 = 60.0;
/// Acceleration demanded per m/s of descent-rate error
const VELOCITY_GAIN: f32 = 1.2;

/// Commanded throttle needed before spending an engine start
const IGNITION_THROTTLE: f32 = 0.35;
const IDLE_THROTTLE: f32 = 0.02;

#[derive(Debug, Clone, Copy, Default)]
pub struct AiInput;

impl AiInput {
    pub fn new() -> Self {
        Self
    }

    /// Tilt that points thrust against horizontal speed
    fn target_tilt(&self, rocket: &Rocket) -> f32 {
        if rocket.thrust() <= 0.0 || altitude(rocket) < UPRIGHT_ALTITUDE {
            return 0.0;
        }
        (LATERAL_GAIN * rocket.speed.x).clamp(-MAX_LATERAL_TILT, MAX_LATERAL_TILT)
    }

    fn hold_attitude(&self, rocket: &mut Rocket) {
        let error = tilt(rocket) - self.target_tilt(rocket);
        let predicted = error + rocket.angular_momentum * ATTITUDE_LOOKAHEAD;
        if predicted > ATTITUDE_DEADBAND {
            rocket.jet_left();
        } else if predicted < -ATTITUDE_DEADBAND {
            rocket.jet_right();
        }
    }

    /// Throttle that brings vertical speed toward the descent profile
    fn throttle_for(&self, rocket: &Rocket) -> f32 {
        let target_vy =
            -(MIN_DESCENT_RATE + DESCENT_RATE_PER_METER * altitude(rocket)).min(MAX_DESCENT_RATE);
        let wanted_accel = GRAVITY + VELOCITY_GAIN * (target_vy - rocket.speed.y);

        let max_accel = MAX_ENGINE_THRUST / rocket.mass();
        let lift = sinf(rocket.direction).max(0.1);
        (wanted_accel / (max_accel * lift)).clamp(0.0, 1.0)
    }
}

fn altitude(rocket: &Rocket) -> f32 {
    (rocket.position.y - ROCKET_LENGTH / 2.0).max(0.0)
}

impl ControlInput for AiInput {
    fn update(&mut self, rocket: &mut Rocket) {
        self.hold_attitude(rocket);

        let throttle = self.throttle_for(rocket);
        if rocket.thrust() > 0.0 {
            let _ = rocket.set_thrust(throttle.max(IDLE_THROTTLE));
        } else if throttle >= IGNITION_THROTTLE {
            let _ = rocket.set_thrust(throttle);
        }
    }

    fn kind(&self) -> InputKind {
        InputKind::Ai
    }
}
