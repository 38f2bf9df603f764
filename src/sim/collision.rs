//! Ground contact and landing quality
//!
//! Both functions are pure reads of rocket state. The landing score is a sum of
//! two logistic terms, one for touchdown speed and one for tilt. Exceeding
//! either limit fails the landing on its own; within the limits a gentle
//! touchdown makes up for some tilt and vice versa.

use std::f32::consts::FRAC_PI_2;

use super::rocket::Rocket;
use crate::consts::*;
use crate::normalize_angle;

/// Logistic weight per term; a term past its limit drops below -1
const PENALTY_WEIGHT: f64 = 4.0;

/// Number of bounding-box corners at or below ground level (0-4)
pub fn detect_ground_collision(rocket: &Rocket) -> usize {
    rocket
        .bounding_box()
        .iter()
        .filter(|corner| corner.y <= 0.0)
        .count()
}

/// Two or more corners down means the rocket rests on the ground
pub fn is_grounded(rocket: &Rocket) -> bool {
    detect_ground_collision(rocket) >= 2
}

/// Signed deviation from upright in [-π, π)
pub fn tilt(rocket: &Rocket) -> f32 {
    normalize_angle(rocket.direction - FRAC_PI_2)
}

/// Continuous landing score; `>= 0` is a landing, `< 0` a crash
pub fn landing_score(rocket: &Rocket) -> f32 {
    let speed_term = logistic_credit((rocket.velocity() / MAX_LANDING_VELOCITY) as f64);
    let angle_term = logistic_credit((tilt(rocket).abs() / MAX_ANGLE_DEVIATION) as f64);
    (speed_term + angle_term) as f32
}

/// Maps a ratio to its limit onto (-3, 1)
///
/// Equals -1 at exactly 1.0, so the score is zero when one term sits on its
/// limit and the other earns full credit. Ratios below 0.8 earn over 0.9.
fn logistic_credit(ratio: f64) -> f64 {
    let steepness = LANDING_SCORE_STEEPNESS as f64;
    let sigmoid = 1.0 / (1.0 + (-steepness * (ratio - 1.0)).exp());
    1.0 - PENALTY_WEIGHT * sigmoid
}
