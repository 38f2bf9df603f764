//! Simulation thread
//!
//! Runs [`Simulation`] ticks at a fixed rate on a dedicated thread. Commands
//! arrive over an `mpsc` channel and are drained once per iteration; snapshots
//! leave through the single-slot channel and never block the loop.

use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::anyhow;

use crate::consts::PHYSICS_DT;
use crate::landing_log::LandingRecord;
use crate::settings::{RunMode, Settings};
use crate::sim::EpisodePhase;

use super::channel::SnapshotPublisher;
use super::session::Simulation;

/// Simulated seconds between tick-count diagnostics
const DIAGNOSTIC_INTERVAL_SECS: f32 = 5.0;

/// Requests from the presentation or input side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverCommand {
    /// Release a display mode hold: launch the rocket on the pad, or leave a
    /// finished episode for the next one
    Continue,
    /// Throw away the running episode and put a new one on the pad
    AbortEpisode,
    Shutdown,
}

/// What a display mode loop is waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hold {
    /// Fresh rocket on the pad
    Launch,
    /// Finished episode still on screen
    Continue,
}

/// Every display mode episode waits on the pad for Continue
fn launch_hold(mode: RunMode) -> Option<Hold> {
    match mode {
        RunMode::Display => Some(Hold::Launch),
        RunMode::Headless => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverConfig {
    pub tick_rate: u32,
    pub mode: RunMode,
    /// Cadence for re-publishing the held snapshot while waiting to continue
    pub display_fps: u32,
    pub max_episodes: Option<u64>,
    /// Sleep between ticks to hold `tick_rate`; off runs as fast as possible
    pub paced: bool,
}

impl DriverConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            tick_rate: settings.effective_tick_rate(),
            mode: settings.mode,
            display_fps: settings.display_fps,
            max_episodes: settings.max_episodes,
            paced: true,
        }
    }

    fn tick_duration(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.tick_rate.max(1)))
    }

    fn hold_duration(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.display_fps.max(1)))
    }
}

/// Owner's side of a running simulation thread
pub struct SimulationHandle {
    commands: mpsc::Sender<DriverCommand>,
    thread: JoinHandle<u64>,
}

impl SimulationHandle {
    /// Extra command sender, e.g. for an input device thread
    pub fn commands(&self) -> mpsc::Sender<DriverCommand> {
        self.commands.clone()
    }

    /// Queue a command; false once the loop has stopped
    pub fn send(&self, command: DriverCommand) -> bool {
        self.commands.send(command).is_ok()
    }

    /// Wait for the loop to stop on its own, returning the finished episode count
    pub fn join(self) -> anyhow::Result<u64> {
        self.thread
            .join()
            .map_err(|_| anyhow!("simulation thread panicked"))
    }

    /// Ask the loop to stop and wait for it
    pub fn shutdown(self) -> anyhow::Result<u64> {
        self.send(DriverCommand::Shutdown);
        self.join()
    }
}

/// Move `sim` onto a new thread and start ticking
pub fn spawn_simulation(
    sim: Simulation,
    config: DriverConfig,
    publisher: Option<SnapshotPublisher>,
    landings: Option<mpsc::Sender<LandingRecord>>,
) -> std::io::Result<SimulationHandle> {
    let (commands, command_rx) = mpsc::channel::<DriverCommand>();

    let thread = std::thread::Builder::new()
        .name("rocket-sim".into())
        .spawn(move || {
            run_simulation_loop(sim, config, command_rx, publisher.as_ref(), landings.as_ref())
        })?;

    Ok(SimulationHandle { commands, thread })
}

/// The tick loop. Runs until Shutdown, command channel disconnect, or the
/// episode limit; returns how many episodes finished.
pub fn run_simulation_loop(
    mut sim: Simulation,
    config: DriverConfig,
    command_rx: mpsc::Receiver<DriverCommand>,
    publisher: Option<&SnapshotPublisher>,
    landings: Option<&mpsc::Sender<LandingRecord>>,
) -> u64 {
    let tick_duration = config.tick_duration();
    let hold_duration = config.hold_duration();
    let diagnostic_frames = (DIAGNOSTIC_INTERVAL_SECS / PHYSICS_DT).round() as u64;

    let started = Instant::now();
    let mut next_tick_time = started;
    let mut total_ticks: u64 = 0;
    let mut finished: u64 = 0;
    let mut hold = launch_hold(config.mode);

    log::info!(
        "Simulation running: {} mode, {} Hz{}",
        config.mode.as_str(),
        config.tick_rate,
        if config.paced { "" } else { " (unpaced)" }
    );

    loop {
        let mut continue_requested = false;
        loop {
            match command_rx.try_recv() {
                Ok(DriverCommand::Continue) => continue_requested = true,
                Ok(DriverCommand::AbortEpisode) => {
                    log::info!("Episode {} aborted", sim.episode());
                    sim.start_episode();
                    hold = launch_hold(config.mode);
                }
                Ok(DriverCommand::Shutdown) => return finished,
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return finished,
            }
        }

        if let Some(waiting) = hold {
            if continue_requested {
                match waiting {
                    Hold::Launch => {
                        log::info!("Episode {} launching", sim.episode());
                        hold = None;
                        next_tick_time = Instant::now();
                    }
                    Hold::Continue => {
                        sim.start_episode();
                        hold = Some(Hold::Launch);
                    }
                }
            }
            if hold.is_some() {
                if let Some(publisher) = publisher {
                    publisher.publish(sim.snapshot());
                }
                std::thread::sleep(hold_duration);
                continue;
            }
        }

        let phase = sim.tick();
        total_ticks += 1;
        if let Some(publisher) = publisher {
            publisher.publish(sim.snapshot());
        }

        let frames = sim.rocket().frames();
        if frames > 0 && frames % diagnostic_frames == 0 && !phase.is_terminal() {
            let elapsed = started.elapsed().as_secs_f32();
            log::debug!(
                "Episode {}: {} frames, {} ticks total ({:.0} ticks/s)",
                sim.episode(),
                frames,
                total_ticks,
                total_ticks as f32 / elapsed.max(f32::EPSILON)
            );
        }

        if let EpisodePhase::Terminal(_) = phase {
            finished += 1;
            if let (Some(landings), Some(record)) = (landings, sim.landing_record()) {
                if landings.send(record).is_err() {
                    log::warn!(
                        "Landing log writer is gone, episode {} not recorded",
                        sim.episode()
                    );
                }
            }

            if config.max_episodes.is_some_and(|max| finished >= max) {
                log::info!("Episode limit reached after {finished} episodes");
                return finished;
            }

            match config.mode {
                RunMode::Display => hold = Some(Hold::Continue),
                RunMode::Headless => sim.start_episode(),
            }
        }

        if config.paced {
            next_tick_time += tick_duration;
            let now = Instant::now();
            if next_tick_time > now {
                std::thread::sleep(next_tick_time - now);
            } else if now - next_tick_time > tick_duration * 2 {
                // Too far behind; drop the backlog instead of bursting
                next_tick_time = now;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::channel::{Take, snapshot_channel};
    use crate::input::{AiInput, HardcodedInput, InputKind};
    use crate::seed::FixedSeed;
    use crate::sim::{Outcome, RocketSnapshot};

    fn hardcoded_sim() -> Simulation {
        Simulation::new(Box::new(HardcodedInput), Box::new(FixedSeed(1)), 1000)
    }

    fn unpaced(mode: RunMode, max_episodes: Option<u64>) -> DriverConfig {
        DriverConfig {
            tick_rate: 1000,
            mode,
            display_fps: 1000,
            max_episodes,
            paced: false,
        }
    }

    /// Poll the receiver until `pred` matches a snapshot
    fn wait_for(
        receiver: &crate::driver::SnapshotReceiver,
        pred: impl Fn(&RocketSnapshot) -> bool,
    ) -> RocketSnapshot {
        let deadline = Instant::now() + Duration::from_secs(60);
        while Instant::now() < deadline {
            match receiver.take() {
                Take::Fresh(snapshot) if pred(&snapshot) => return snapshot,
                Take::Closed => panic!("simulation stopped early"),
                _ => std::thread::sleep(Duration::from_micros(200)),
            }
        }
        panic!("timed out waiting for snapshot");
    }

    #[test]
    fn test_config_from_settings() {
        let settings = Settings {
            mode: RunMode::Headless,
            max_episodes: Some(3),
            ..Settings::default()
        };
        let config = DriverConfig::from_settings(&settings);
        assert_eq!(config.tick_rate, 1000);
        assert_eq!(config.max_episodes, Some(3));
        assert!(config.paced);
        assert_eq!(config.tick_duration(), Duration::from_millis(1));
    }

    #[test]
    fn test_headless_runs_episodes_back_to_back() {
        let (landing_tx, landing_rx) = mpsc::channel();
        let (_command_tx, command_rx) = mpsc::channel();

        let finished = run_simulation_loop(
            hardcoded_sim(),
            unpaced(RunMode::Headless, Some(2)),
            command_rx,
            None,
            Some(&landing_tx),
        );
        assert_eq!(finished, 2);

        let records: Vec<_> = landing_rx.try_iter().collect();
        assert_eq!(records.len(), 2);
        for record in records {
            assert_eq!(record.input, InputKind::Hardcoded);
            assert!(record.score < 0.0);
        }
    }

    #[test]
    fn test_shutdown_before_first_tick() {
        let (command_tx, command_rx) = mpsc::channel();
        command_tx.send(DriverCommand::Shutdown).unwrap();
        let finished = run_simulation_loop(
            hardcoded_sim(),
            unpaced(RunMode::Headless, None),
            command_rx,
            None,
            None,
        );
        assert_eq!(finished, 0);
    }

    #[test]
    fn test_dropped_command_sender_stops_loop() {
        let (command_tx, command_rx) = mpsc::channel::<DriverCommand>();
        drop(command_tx);
        let finished = run_simulation_loop(
            hardcoded_sim(),
            unpaced(RunMode::Headless, None),
            command_rx,
            None,
            None,
        );
        assert_eq!(finished, 0);
    }

    #[test]
    fn test_display_mode_holds_first_launch() {
        let (publisher, receiver) = snapshot_channel();
        let handle = spawn_simulation(
            hardcoded_sim(),
            unpaced(RunMode::Display, None),
            Some(publisher),
            None,
        )
        .unwrap();

        let pad = wait_for(&receiver, |_| true);
        assert_eq!(pad.episode, 1);
        assert_eq!(pad.frames, 0);
        assert_eq!(pad.phase, EpisodePhase::Ascending);

        // Nothing moves until Continue, however long the hold lasts
        std::thread::sleep(Duration::from_millis(30));
        let still = wait_for(&receiver, |_| true);
        assert_eq!(still, pad);

        assert!(handle.send(DriverCommand::Continue));
        let flying = wait_for(&receiver, |s| s.frames > 0);
        assert_eq!(flying.episode, 1);

        assert_eq!(handle.shutdown().unwrap(), 0);
    }

    #[test]
    fn test_display_mode_waits_for_continue() {
        let (publisher, receiver) = snapshot_channel();
        let handle = spawn_simulation(
            hardcoded_sim(),
            unpaced(RunMode::Display, None),
            Some(publisher),
            None,
        )
        .unwrap();

        assert!(handle.send(DriverCommand::Continue));
        let last = wait_for(&receiver, |s| s.phase.is_terminal());
        assert_eq!(last.episode, 1);
        assert_eq!(last.phase, EpisodePhase::Terminal(Outcome::Crashed));

        // The final state keeps being offered until Continue
        std::thread::sleep(Duration::from_millis(20));
        let held = wait_for(&receiver, |_| true);
        assert_eq!(held, last);

        // Continue puts the next rocket on the pad and holds it there
        assert!(handle.send(DriverCommand::Continue));
        let next = wait_for(&receiver, |s| s.episode == 2);
        assert_eq!(next.seed, 1);
        assert_eq!(next.frames, 0);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(wait_for(&receiver, |_| true).frames, 0);

        assert!(handle.send(DriverCommand::Continue));
        let flying = wait_for(&receiver, |s| s.frames > 0);
        assert_eq!(flying.episode, 2);

        assert_eq!(handle.shutdown().unwrap(), 1);
    }

    #[test]
    fn test_abort_episode_is_not_recorded() {
        let (publisher, receiver) = snapshot_channel();
        let (landing_tx, landing_rx) = mpsc::channel();
        let config = DriverConfig {
            tick_rate: 60,
            mode: RunMode::Display,
            display_fps: 60,
            max_episodes: None,
            paced: true,
        };
        let sim = Simulation::new(Box::new(AiInput), Box::new(FixedSeed(3)), 60);
        let handle = spawn_simulation(sim, config, Some(publisher), Some(landing_tx)).unwrap();

        assert!(handle.send(DriverCommand::Continue));
        wait_for(&receiver, |s| s.episode == 1 && s.frames > 0);
        assert!(handle.send(DriverCommand::AbortEpisode));
        let fresh = wait_for(&receiver, |s| s.episode == 2);
        assert_eq!(fresh.phase, EpisodePhase::Ascending);
        assert_eq!(fresh.frames, 0);

        assert_eq!(handle.shutdown().unwrap(), 0);
        assert_eq!(landing_rx.try_iter().count(), 0);
    }

    #[test]
    fn test_paced_loop_holds_tick_rate() {
        let (publisher, receiver) = snapshot_channel();
        let config = DriverConfig {
            tick_rate: 100,
            mode: RunMode::Headless,
            display_fps: 60,
            max_episodes: None,
            paced: true,
        };
        let handle = spawn_simulation(hardcoded_sim(), config, Some(publisher), None).unwrap();

        std::thread::sleep(Duration::from_millis(300));
        // The slot still holds the first snapshot; the next one is current
        let stale = wait_for(&receiver, |_| true).frames;
        let frames = wait_for(&receiver, |s| s.frames > stale).frames;
        handle.shutdown().unwrap();

        // ~30 ticks expected; generous bounds for loaded machines
        assert!(frames >= 5, "only {frames} ticks in 300ms");
        assert!(frames <= 60, "{frames} ticks in 300ms at 100 Hz");
    }
}
