//! Episode state machine
//!
//! A [`Simulation`] owns the rocket, the control input and the seed provider.
//! Each [`Simulation::tick`] runs one step of the current episode:
//! ascent program or control input, then physics, then the terminal check.

use crate::input::ControlInput;
use crate::landing_log::LandingRecord;
use crate::seed::SeedProvider;
use crate::sim::{
    EpisodePhase, Outcome, Rocket, RocketSnapshot, detect_ground_collision, landing_score,
};

pub struct Simulation {
    input: Box<dyn ControlInput>,
    seeds: Box<dyn SeedProvider>,
    tick_rate: u32,
    rocket: Rocket,
    seed: i64,
    phase: EpisodePhase,
    /// 1-based id of the current episode
    episode: u64,
    score: Option<f32>,
}

impl Simulation {
    /// Create a session and start its first episode
    pub fn new(input: Box<dyn ControlInput>, seeds: Box<dyn SeedProvider>, tick_rate: u32) -> Self {
        let mut sim = Self {
            input,
            seeds,
            tick_rate,
            rocket: Rocket::new(),
            seed: 0,
            phase: EpisodePhase::Ascending,
            episode: 0,
            score: None,
        };
        sim.start_episode();
        sim
    }

    /// Discard the current rocket and launch a fresh one
    pub fn start_episode(&mut self) {
        self.episode += 1;
        self.seed = self.seeds.next_seed();
        self.rocket = Rocket::new();
        self.phase = EpisodePhase::Ascending;
        self.score = None;
        self.input.reset();
        log::info!(
            "Episode {} starting (seed {}, input {})",
            self.episode,
            self.seed,
            self.input.kind()
        );
    }

    /// Advance the episode by one physics step
    ///
    /// Terminal episodes stay put until [`Simulation::start_episode`] is called.
    pub fn tick(&mut self) -> EpisodePhase {
        if self.phase.is_terminal() {
            return self.phase;
        }

        if self.rocket.is_ascending() {
            self.rocket.ascend(self.seed as f32);
        } else {
            self.input.update(&mut self.rocket);
        }
        self.rocket.update();

        if !self.rocket.is_ascending() {
            self.phase = EpisodePhase::Controlled;
            if detect_ground_collision(&self.rocket) >= 1 {
                let score = landing_score(&self.rocket);
                let outcome = Outcome::from_score(score);
                self.phase = EpisodePhase::Terminal(outcome);
                self.score = Some(score);
                log::info!(
                    "Episode {} {:?} after {:.1}s: score {:.3}, speed {:.2} m/s",
                    self.episode,
                    outcome,
                    self.rocket.flight_time(),
                    score,
                    self.rocket.velocity()
                );
            }
        }

        self.phase
    }

    pub fn snapshot(&self) -> RocketSnapshot {
        RocketSnapshot::capture(&self.rocket, self.episode, self.seed, self.phase)
    }

    /// Record for the landing log, once the episode is over
    pub fn landing_record(&self) -> Option<LandingRecord> {
        self.phase.is_terminal().then(|| {
            LandingRecord::from_rocket(&self.rocket, self.input.kind(), self.seed, self.tick_rate)
        })
    }

    pub fn rocket(&self) -> &Rocket {
        &self.rocket
    }

    pub fn phase(&self) -> EpisodePhase {
        self.phase
    }

    pub fn episode(&self) -> u64 {
        self.episode
    }

    pub fn seed(&self) -> i64 {
        self.seed
    }

    /// Landing score of the finished episode
    pub fn score(&self) -> Option<f32> {
        self.score
    }
}
