//! 2-D primitives shared by the simulation
//!
//! Positions and velocities are plain `glam::Vec2` values. The trig wrappers
//! evaluate in `f64` and round back to `f32`, which keeps seed-driven code paths
//! reproducible regardless of the platform's `f32` intrinsics.

use glam::Vec2;

/// A point in meters (x to the right, y up, ground at y = 0)
pub type Point = Vec2;

/// A free vector (velocities, offsets)
pub type Vector = Vec2;

/// Sine of an `f32` angle in radians
#[inline]
pub fn sinf(rad: f32) -> f32 {
    (rad as f64).sin() as f32
}

/// Cosine of an `f32` angle in radians
#[inline]
pub fn cosf(rad: f32) -> f32 {
    (rad as f64).cos() as f32
}

/// Unit vector pointing along `direction`
#[inline]
pub fn heading(direction: f32) -> Vector {
    Vec2::new(cosf(direction), sinf(direction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_heading_cardinal_directions() {
        let right = heading(0.0);
        assert!((right.x - 1.0).abs() < 1e-6);
        assert!(right.y.abs() < 1e-6);

        let up = heading(FRAC_PI_2);
        assert!(up.x.abs() < 1e-6);
        assert!((up.y - 1.0).abs() < 1e-6);

        let left = heading(PI);
        assert!((left.x + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_trig_wrappers_are_repeatable() {
        for seed in [1.0f32, -7.5, 12345.0, 4.2e6] {
            assert_eq!(sinf(seed).to_bits(), sinf(seed).to_bits());
            assert_eq!(cosf(seed).to_bits(), cosf(seed).to_bits());
        }
    }
}
