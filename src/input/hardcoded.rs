//! Fixed full-thrust policy, useful for determinism checks and demos

use super::{ControlInput, InputKind};
use crate::sim::Rocket;

#[derive(Debug, Clone, Copy, Default)]
pub struct HardcodedInput;

impl ControlInput for HardcodedInput {
    fn update(&mut self, rocket: &mut Rocket) {
        let _ = rocket.set_thrust(1.0);
    }

    fn kind(&self) -> InputKind {
        InputKind::Hardcoded
    }
}
