//! Rocket entity and fixed-timestep physics stepper
//!
//! Mass and thrust figures follow the Falcon 9 v1.1 data sheet. One call to
//! [`Rocket::update`] advances the rocket by exactly [`PHYSICS_DT`], no matter
//! how fast the driver loop runs.

use std::f32::consts::{FRAC_PI_2, PI};
use std::fmt;

use glam::Vec2;

use super::collision::is_grounded;
use super::geometry::{Point, Vector, cosf, heading, sinf};
use crate::consts::*;

// Must stay pairwise coprime: they are what makes different seeds look random.
// Changing any of them changes the trajectory of every existing seed.
const SEED_THRUST_COEFF: f32 = 5.0;
const SEED_ANGLE_COEFF: f32 = 3.0;
const SEED_DURATION_COEFF: f32 = 2.0;

/// Why a thrust request was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrustError {
    /// No engine starts left and the engine is not running
    EngineDead,
    /// Propellant tank is empty
    FuelExhausted,
}

impl fmt::Display for ThrustError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThrustError::EngineDead => write!(f, "no engine starts remaining"),
            ThrustError::FuelExhausted => write!(f, "fuel exhausted"),
        }
    }
}

impl std::error::Error for ThrustError {}

/// The simulated rocket
///
/// `direction` is in radians with 0 pointing right; upright is π/2.
/// `position` is the centre of the body in meters.
#[derive(Debug, Clone)]
pub struct Rocket {
    pub position: Point,
    pub direction: f32,
    pub speed: Vector,
    pub angular_momentum: f32,
    pub engine_starts_remaining: u32,
    fuel: f32,
    thrust: f32,
    /// Jet torque requested since the last step
    jet_torque: f32,
    frames: u64,
    ascending: bool,
}

impl Default for Rocket {
    fn default() -> Self {
        Self::new()
    }
}

impl Rocket {
    /// A fuelled rocket standing upright on the pad
    pub fn new() -> Self {
        Self {
            position: Vec2::new(0.0, ROCKET_LENGTH / 2.0),
            direction: FRAC_PI_2,
            speed: Vec2::ZERO,
            angular_momentum: 0.0,
            engine_starts_remaining: ENGINE_STARTS,
            fuel: FUEL_CAPACITY,
            thrust: 0.0,
            jet_torque: 0.0,
            frames: 0,
            ascending: true,
        }
    }

    /// Advance one physics step
    pub fn update(&mut self) {
        self.frames += 1;

        // Orientation
        self.apply_jets();
        self.angular_momentum *= ANGULAR_DAMPING;
        self.direction += self.angular_momentum * PHYSICS_DT;

        // Translation
        self.apply_gravity();
        self.apply_thrust();
        self.integrate_position();

        self.burn_fuel();
    }

    /// Scripted ascent program
    ///
    /// Seed 1 flies straight up at full thrust. Any other seed produces a
    /// pseudo-random but fully repeatable thrust level and pitch target. Once the
    /// seed-dependent duration elapses the engine is cut and control is handed over.
    pub fn ascend(&mut self, seed: f32) {
        let duration = (sinf(SEED_DURATION_COEFF * seed * seed) + 1.0) * ASCENT_FRAMES / 5.0
            + ASCENT_FRAMES;
        if self.frames > duration as u64 {
            let _ = self.set_thrust(0.0);
            self.ascending = false;
            return;
        }

        if seed == 1.0 {
            let _ = self.set_thrust(1.0);
            return;
        }

        // Thrust varies within [0.9, 1.0]
        let thrust = (sinf(SEED_THRUST_COEFF * seed * self.thrust_percentage()) + 1.0) / 20.0 + 0.9;
        let _ = self.set_thrust(thrust.clamp(0.0, 1.0));

        // Pitch target varies within [67.5°, 112.5°]
        let target = FRAC_PI_2 + cosf(SEED_ANGLE_COEFF * seed) * PI / 8.0;
        if self.direction > target {
            self.jet_left();
        } else if self.direction < target {
            self.jet_right();
        }
    }

    pub fn is_ascending(&self) -> bool {
        self.ascending
    }

    /// Fire the top-left RCS jet (rotates clockwise)
    pub fn jet_left(&mut self) {
        self.jet_torque -= JET_TORQUE_STEP;
    }

    /// Fire the top-right RCS jet (rotates counter-clockwise)
    pub fn jet_right(&mut self) {
        self.jet_torque += JET_TORQUE_STEP;
    }

    /// Set engine thrust as a fraction of maximum
    ///
    /// # Panics
    ///
    /// Panics if `percentage` is outside `[0, 1]`. Callers must clamp.
    pub fn set_thrust(&mut self, percentage: f32) -> Result<(), ThrustError> {
        assert!(
            (0.0..=1.0).contains(&percentage),
            "thrust percentage out of bounds: {percentage}"
        );
        if self.fuel <= 0.0 {
            return Err(ThrustError::FuelExhausted);
        }
        if self.engine_starts_remaining == 0 && self.thrust <= 0.0 {
            return Err(ThrustError::EngineDead);
        }
        if self.thrust == 0.0 && percentage > 0.0 {
            self.engine_starts_remaining -= 1;
        }
        self.thrust = MAX_ENGINE_THRUST * percentage;
        Ok(())
    }

    /// Current thrust in newtons
    pub fn thrust(&self) -> f32 {
        self.thrust
    }

    /// Current thrust as a fraction of maximum
    pub fn thrust_percentage(&self) -> f32 {
        self.thrust / MAX_ENGINE_THRUST
    }

    /// Remaining propellant in kilograms
    pub fn fuel_mass(&self) -> f32 {
        self.fuel
    }

    /// Remaining propellant as a fraction of a full tank
    pub fn fuel_percentage(&self) -> f32 {
        self.fuel / FUEL_CAPACITY
    }

    /// Total mass in kilograms
    pub fn mass(&self) -> f32 {
        self.fuel + DRY_MASS
    }

    /// Speed magnitude in m/s
    pub fn velocity(&self) -> f32 {
        self.speed.length()
    }

    /// Physics steps taken since creation
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Simulated seconds since liftoff
    pub fn flight_time(&self) -> f32 {
        self.frames as f32 * PHYSICS_DT
    }

    /// The four corners of the rocket's body rectangle
    pub fn bounding_box(&self) -> [Point; 4] {
        let axis = heading(self.direction) * (ROCKET_LENGTH / 2.0);
        let side = Vec2::new(-axis.y, axis.x) * (ROCKET_WIDTH / ROCKET_LENGTH);
        let p = self.position;
        [
            p + axis + side,
            p + axis - side,
            p - axis + side,
            p - axis - side,
        ]
    }

    fn apply_jets(&mut self) {
        self.angular_momentum += self.jet_torque;
        self.jet_torque = 0.0;
    }

    /// Gravity is suppressed while resting on the ground
    fn apply_gravity(&mut self) {
        if is_grounded(self) {
            self.speed.y = 0.0;
            return;
        }
        self.speed.y -= GRAVITY * PHYSICS_DT;
    }

    fn apply_thrust(&mut self) {
        let dv = self.thrust * PHYSICS_DT / self.mass();
        self.speed += heading(self.direction) * dv;
    }

    fn integrate_position(&mut self) {
        self.position += self.speed * PHYSICS_DT;
        if self.position.y < 0.0 {
            self.position.y = 0.0;
        }
    }

    fn burn_fuel(&mut self) {
        if self.fuel <= 0.0 {
            self.fuel = 0.0;
            return;
        }
        self.fuel -= self.thrust_percentage() * FUEL_BURN_PER_SECOND * PHYSICS_DT;
        if self.fuel <= 0.0 {
            self.fuel = 0.0;
            self.engine_starts_remaining = 0;
            self.thrust = 0.0;
        }
    }
}
