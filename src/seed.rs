//! Seed providers for the ascent program
//!
//! Keeps clock-derived entropy out of the simulation so deterministic runs never
//! touch wall time.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Bound on generated seeds (exclusive, symmetric around zero)
pub const SEED_RANGE: i64 = 50_000_000;

/// Supplies one ascent seed per episode
pub trait SeedProvider: Send {
    fn next_seed(&mut self) -> i64;
}

/// The same seed every episode, for reproducing a run
#[derive(Debug, Clone, Copy)]
pub struct FixedSeed(pub i64);

impl SeedProvider for FixedSeed {
    fn next_seed(&mut self) -> i64 {
        self.0
    }
}

/// Fresh pseudo-random seed per episode
#[derive(Debug, Clone)]
pub struct EntropySeed {
    rng: Pcg32,
}

impl EntropySeed {
    /// Seeded from the system clock
    pub fn from_clock() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self::from_u64(nanos)
    }

    pub fn from_u64(state: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(state),
        }
    }
}

impl SeedProvider for EntropySeed {
    fn next_seed(&mut self) -> i64 {
        self.rng.random_range(-SEED_RANGE..SEED_RANGE)
    }
}

/// Provider for an optional configured seed
pub fn seed_provider(seed: Option<i64>) -> Box<dyn SeedProvider> {
    match seed {
        Some(seed) => Box::new(FixedSeed(seed)),
        None => Box::new(EntropySeed::from_clock()),
    }
}
