//! Human control through held keys
//!
//! Thrust keys ramp an internal throttle while held; jet keys fire every tick
//! they are down.

use super::{Control, ControlInput, InputKind, KeySource};
use crate::sim::Rocket;

/// Throttle change per tick while a thrust key is held
pub const THROTTLE_STEP_PER_TICK: f32 = 0.015;

pub struct UserInput {
    keys: Box<dyn KeySource>,
    throttle: f32,
}

impl UserInput {
    pub fn new(keys: Box<dyn KeySource>) -> Self {
        Self {
            keys,
            throttle: 0.0,
        }
    }

    /// Throttle the user is currently commanding
    pub fn throttle(&self) -> f32 {
        self.throttle
    }
}

impl ControlInput for UserInput {
    fn update(&mut self, rocket: &mut Rocket) {
        if self.keys.is_pressed(Control::IncreaseThrust) {
            self.throttle = (self.throttle + THROTTLE_STEP_PER_TICK).min(1.0);
            let _ = rocket.set_thrust(self.throttle);
        }
        if self.keys.is_pressed(Control::DecreaseThrust) {
            self.throttle = (self.throttle - THROTTLE_STEP_PER_TICK).max(0.0);
            let _ = rocket.set_thrust(self.throttle);
        }
        if self.keys.is_pressed(Control::JetLeft) {
            rocket.jet_left();
        }
        if self.keys.is_pressed(Control::JetRight) {
            rocket.jet_right();
        }
    }

    fn kind(&self) -> InputKind {
        InputKind::User
    }

    fn reset(&mut self) {
        self.throttle = 0.0;
    }
}
