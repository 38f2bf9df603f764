//! Landing log
//!
//! One record per finished episode, grouped by the control input that flew it
//! and persisted as a single JSON document. Writes happen on a dedicated thread
//! so a slow or failing disk never stalls the simulation.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::input::InputKind;
use crate::sim::{Rocket, landing_score};

/// A single landing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandingRecord {
    /// Sequential id, assigned when the record is stored
    pub id: u64,
    /// Unix timestamp (ms) of touchdown
    pub timestamp_ms: u64,
    pub seed: i64,
    /// Tick loop rate the episode ran at (Hz)
    pub tick_rate: u32,
    /// Simulated seconds from liftoff to touchdown
    pub flight_time: f32,
    pub score: f32,
    pub x: f32,
    pub y: f32,
    pub vertical_speed: f32,
    pub horizontal_speed: f32,
    /// Fuel left as a fraction of a full tank
    pub fuel: f32,
    pub direction: f32,
    /// Thrust fraction at touchdown
    pub landing_thrust: f32,
    pub input: InputKind,
}

impl LandingRecord {
    /// Describe a rocket at touchdown; `id` is filled in by [`LandingLog::push`]
    pub fn from_rocket(rocket: &Rocket, input: InputKind, seed: i64, tick_rate: u32) -> Self {
        Self {
            id: 0,
            timestamp_ms: now_ms(),
            seed,
            tick_rate,
            flight_time: rocket.flight_time(),
            score: landing_score(rocket),
            x: rocket.position.x,
            y: rocket.position.y,
            vertical_speed: rocket.speed.y,
            horizontal_speed: rocket.speed.x,
            fuel: rocket.fuel_percentage(),
            direction: rocket.direction,
            landing_thrust: rocket.thrust_percentage(),
            input,
        }
    }
}

/// All recorded landings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandingLog {
    pub next_id: u64,
    pub ai_input: Vec<LandingRecord>,
    pub hardcoded_input: Vec<LandingRecord>,
    pub user_input: Vec<LandingRecord>,
}

impl LandingLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record under its input kind, returning the id it was given
    pub fn push(&mut self, mut record: LandingRecord) -> u64 {
        record.id = self.next_id;
        self.next_id += 1;
        let id = record.id;
        self.records_mut(record.input).push(record);
        id
    }

    pub fn records(&self, input: InputKind) -> &[LandingRecord] {
        match input {
            InputKind::Ai => &self.ai_input,
            InputKind::Hardcoded => &self.hardcoded_input,
            InputKind::User => &self.user_input,
        }
    }

    fn records_mut(&mut self, input: InputKind) -> &mut Vec<LandingRecord> {
        match input {
            InputKind::Ai => &mut self.ai_input,
            InputKind::Hardcoded => &mut self.hardcoded_input,
            InputKind::User => &mut self.user_input,
        }
    }

    pub fn len(&self) -> usize {
        self.ai_input.len() + self.hardcoded_input.len() + self.user_input.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fraction of successful landings for one input kind
    pub fn success_rate(&self, input: InputKind) -> Option<f32> {
        let records = self.records(input);
        if records.is_empty() {
            return None;
        }
        let landed = records.iter().filter(|r| r.score >= 0.0).count();
        Some(landed as f32 / records.len() as f32)
    }

    /// Load the log, or an empty one if the file doesn't exist yet
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json)
                .with_context(|| format!("landing log {} could not be parsed", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No landing log at {}, starting fresh", path.display());
                Ok(Self::new())
            }
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    /// Replace the log file; an interrupted save leaves the previous file intact
    pub fn save(&self, path: &Path) -> Result<()> {
        write_replacing(path, |file| {
            serde_json::to_writer_pretty(&mut *file, self)?;
            file.flush()
        })
    }

    /// Append one record to the log file
    ///
    /// A log that exists but can't be parsed is left untouched.
    pub fn append(path: &Path, record: LandingRecord) -> Result<u64> {
        let mut log = Self::load(path)?;
        let id = log.push(record);
        log.save(path)?;
        Ok(id)
    }
}

/// Background writer for landing records
pub struct LandingLogger {
    sender: mpsc::Sender<LandingRecord>,
    handle: JoinHandle<()>,
}

impl LandingLogger {
    /// Start the writer thread for the log at `path`
    pub fn spawn(path: PathBuf) -> std::io::Result<Self> {
        let (sender, receiver) = mpsc::channel::<LandingRecord>();
        let handle = std::thread::Builder::new()
            .name("landing-log".into())
            .spawn(move || {
                for record in receiver {
                    match LandingLog::append(&path, record) {
                        Ok(id) => log::debug!("Landing #{id} written to {}", path.display()),
                        Err(e) => log::warn!("Landing not logged: {e:#}"),
                    }
                }
            })?;
        Ok(Self { sender, handle })
    }

    /// Handle the simulation uses to submit records
    pub fn sender(&self) -> mpsc::Sender<LandingRecord> {
        self.sender.clone()
    }

    /// Flush pending records and stop the writer
    ///
    /// Other senders handed out by [`LandingLogger::sender`] must be dropped first.
    pub fn finish(self) {
        drop(self.sender);
        if self.handle.join().is_err() {
            log::error!("Landing log writer panicked");
        }
    }
}

/// Write a sibling temp file, then rename it over `path`
fn write_replacing(path: &Path, write: impl FnOnce(&mut File) -> io::Result<()>) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    write(tmp.as_file_mut()).with_context(|| format!("failed to write {}", path.display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("failed to sync {}", path.display()))?;
    tmp.persist(path)
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(input: InputKind, score: f32) -> LandingRecord {
        let mut record = LandingRecord::from_rocket(&Rocket::new(), input, 1, 60);
        record.score = score;
        record
    }

    #[test]
    fn test_push_assigns_sequential_ids() {
        let mut log = LandingLog::new();
        assert_eq!(log.push(record(InputKind::Ai, 1.0)), 0);
        assert_eq!(log.push(record(InputKind::User, -1.0)), 1);
        assert_eq!(log.push(record(InputKind::Ai, 0.5)), 2);

        assert_eq!(log.records(InputKind::Ai).len(), 2);
        assert_eq!(log.records(InputKind::User)[0].id, 1);
        assert!(log.records(InputKind::Hardcoded).is_empty());
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_success_rate() {
        let mut log = LandingLog::new();
        assert_eq!(log.success_rate(InputKind::Ai), None);
        log.push(record(InputKind::Ai, 1.0));
        log.push(record(InputKind::Ai, -0.2));
        assert_eq!(log.success_rate(InputKind::Ai), Some(0.5));
    }

    #[test]
    fn test_record_captures_touchdown_state() {
        let mut rocket = Rocket::new();
        rocket.speed = glam::Vec2::new(1.5, -3.0);
        let record = LandingRecord::from_rocket(&rocket, InputKind::Hardcoded, -99, 1000);
        assert_eq!(record.seed, -99);
        assert_eq!(record.tick_rate, 1000);
        assert_eq!(record.horizontal_speed, 1.5);
        assert_eq!(record.vertical_speed, -3.0);
        assert_eq!(record.fuel, 1.0);
        assert!(record.score > 0.0);
        assert!(record.timestamp_ms > 0);
    }

    #[test]
    fn test_append_creates_and_extends_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("landing_logs.json");

        assert_eq!(LandingLog::append(&path, record(InputKind::Ai, 1.0)).unwrap(), 0);
        assert_eq!(LandingLog::append(&path, record(InputKind::User, -1.0)).unwrap(), 1);

        let log = LandingLog::load(&path).unwrap();
        assert_eq!(log.next_id, 2);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_corrupt_log_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("landing_logs.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(LandingLog::append(&path, record(InputKind::Ai, 1.0)).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn test_interrupted_save_keeps_previous_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("landing_logs.json");
        LandingLog::append(&path, record(InputKind::Ai, 1.0)).unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        let result = write_replacing(&path, |file| {
            file.write_all(b"{ \"next_id\": 4, \"ai_in")?;
            Err(io::Error::other("disk full"))
        });
        assert!(result.is_err());

        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
        // No temp file left behind next to the log
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
        assert_eq!(LandingLog::append(&path, record(InputKind::Ai, 0.5)).unwrap(), 1);
    }

    #[test]
    fn test_save_in_current_directory_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("log.json");
        let mut log = LandingLog::new();
        log.push(record(InputKind::User, 0.1));
        log.save(&path).unwrap();
        assert_eq!(LandingLog::load(&path).unwrap(), log);
    }

    #[test]
    fn test_logger_thread_writes_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("landing_logs.json");

        let logger = LandingLogger::spawn(path.clone()).unwrap();
        let sender = logger.sender();
        sender.send(record(InputKind::Hardcoded, 0.3)).unwrap();
        sender.send(record(InputKind::Hardcoded, -0.3)).unwrap();
        drop(sender);
        logger.finish();

        let log = LandingLog::load(&path).unwrap();
        assert_eq!(log.records(InputKind::Hardcoded).len(), 2);
    }

    #[test]
    fn test_logger_survives_write_failures() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes every write fail
        let path = dir.path().join("blocked");
        std::fs::create_dir(&path).unwrap();

        let logger = LandingLogger::spawn(path).unwrap();
        let sender = logger.sender();
        assert!(sender.send(record(InputKind::Ai, 1.0)).is_ok());
        drop(sender);
        logger.finish();
    }
}
