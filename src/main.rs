//! Rocket Lander entry point
//!
//! Builds the run configuration, then drives the simulation thread either with
//! the terminal telemetry presenter (display mode) or on its own (headless).

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

use anyhow::{Context, Result};
use clap::Parser;

use rocket_lander::driver::{
    self, DriverCommand, DriverConfig, Simulation, SimulationHandle, TelemetryPresenter,
};
use rocket_lander::input::{self, InputKind, KeySource, KeyboardState};
use rocket_lander::landing_log::{LandingLog, LandingLogger};
use rocket_lander::seed::seed_provider;
use rocket_lander::settings::{RunMode, Settings};
use rocket_lander::terminal::{self, TerminalBridge, TerminalCommand};

#[derive(Parser, Debug)]
#[command(name = "rocket-lander")]
#[command(about = "Vertical rocket landing simulation with interchangeable control inputs")]
struct Cli {
    /// JSON settings file; the flags below override its values
    #[arg(long, default_value = "settings.json")]
    settings: PathBuf,
    /// Control input: user, ai or hardcoded
    #[arg(long)]
    input: Option<String>,
    /// Run mode: display or headless
    #[arg(long)]
    mode: Option<String>,
    /// Tick loop rate in Hz
    #[arg(long)]
    tick_rate: Option<u32>,
    /// Fixed ascent seed for every episode
    #[arg(long, allow_hyphen_values = true)]
    seed: Option<i64>,
    /// Presentation frame rate in Hz
    #[arg(long)]
    fps: Option<u32>,
    /// Landing log file
    #[arg(long)]
    log_path: Option<PathBuf>,
    /// Stop after this many finished episodes
    #[arg(long)]
    episodes: Option<u64>,
    /// Tick as fast as possible instead of holding the tick rate
    #[arg(long, default_value_t = false)]
    unpaced: bool,
}

impl Cli {
    fn apply(&self, settings: &mut Settings) -> Result<()> {
        if let Some(input) = &self.input {
            settings.input = input.parse()?;
        }
        if let Some(mode) = &self.mode {
            settings.mode = mode.parse()?;
        }
        if self.tick_rate.is_some() {
            settings.tick_rate = self.tick_rate;
        }
        if self.seed.is_some() {
            settings.seed = self.seed;
        }
        if let Some(fps) = self.fps {
            settings.display_fps = fps;
        }
        if let Some(path) = &self.log_path {
            settings.log_path = path.clone();
        }
        if self.episodes.is_some() {
            settings.max_episodes = self.episodes;
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut settings = Settings::load(&cli.settings)?;
    cli.apply(&mut settings)?;
    settings.validate()?;

    log::info!(
        "Rocket Lander starting: {} input, {} mode",
        settings.input,
        settings.mode.as_str()
    );

    // Only display mode has a terminal to read keys from
    let keys = KeyboardState::new();
    let key_source: Option<Box<dyn KeySource>> = match (settings.input, settings.mode) {
        (InputKind::User, RunMode::Display) => Some(Box::new(keys.clone())),
        _ => None,
    };
    let control = input::create_input(settings.input, key_source)?;

    let sim = Simulation::new(
        control,
        seed_provider(settings.seed),
        settings.effective_tick_rate(),
    );
    let mut config = DriverConfig::from_settings(&settings);
    config.paced = !cli.unpaced;

    let logger = LandingLogger::spawn(settings.log_path.clone())
        .context("failed to start landing log writer")?;

    let finished = match settings.mode {
        RunMode::Headless => {
            let handle = driver::spawn_simulation(sim, config, None, Some(logger.sender()))
                .context("failed to spawn simulation thread")?;
            handle.join()?
        }
        RunMode::Display => run_display(sim, config, &settings, keys, &logger)?,
    };

    log::info!("{finished} episodes finished");
    logger.finish();
    report_success_rate(&settings);
    Ok(())
}

/// Log the landing rate recorded so far for the configured input
fn report_success_rate(settings: &Settings) {
    match LandingLog::load(&settings.log_path) {
        Ok(history) => match history.success_rate(settings.input) {
            Some(rate) => log::info!(
                "{} input landed {:.1}% of {} recorded episodes",
                settings.input,
                rate * 100.0,
                history.records(settings.input).len()
            ),
            None => log::info!("No recorded episodes for {} input", settings.input),
        },
        Err(e) => log::warn!("Could not read landing log: {e:#}"),
    }
}

fn run_display(
    sim: Simulation,
    config: DriverConfig,
    settings: &Settings,
    keys: KeyboardState,
    logger: &LandingLogger,
) -> Result<u64> {
    let (publisher, receiver) = driver::snapshot_channel();
    let handle = driver::spawn_simulation(sim, config, Some(publisher), Some(logger.sender()))
        .context("failed to spawn simulation thread")?;

    let stop = Arc::new(AtomicBool::new(false));
    spawn_terminal_bridge(keys, &handle, Arc::clone(&stop))?;
    log::info!("Controls: {}", terminal::HELP);

    let mut presenter = TelemetryPresenter::new(std::io::stdout().lock());
    driver::run_presenter(&receiver, settings.display_fps, &mut presenter, &stop);

    handle.shutdown()
}

/// Read terminal commands on a background thread
fn spawn_terminal_bridge(
    keys: KeyboardState,
    handle: &SimulationHandle,
    stop: Arc<AtomicBool>,
) -> Result<()> {
    let commands: mpsc::Sender<DriverCommand> = handle.commands();
    let bridge = TerminalBridge::new(keys);

    std::thread::Builder::new()
        .name("terminal-input".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                let Some(command) = terminal::parse_line(&line) else {
                    log::warn!("Unknown command {line:?} ({})", terminal::HELP);
                    continue;
                };
                if command == TerminalCommand::Quit {
                    stop.store(true, Ordering::Relaxed);
                }
                if let Some(driver_command) = bridge.apply(command) {
                    if commands.send(driver_command).is_err() {
                        break;
                    }
                }
            }
        })
        .context("failed to spawn terminal input thread")?;

    Ok(())
}
