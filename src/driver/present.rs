//! Presentation loop
//!
//! Pulls the newest snapshot from the single-slot channel at its own frame
//! rate. When the simulation hasn't produced a new one since the last frame,
//! the previous snapshot is presented again.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::sim::{EpisodePhase, Outcome, RocketSnapshot};

use super::channel::{SnapshotReceiver, Take};

/// Anything that can show a rocket snapshot
pub trait Presenter {
    fn present(&mut self, snapshot: &RocketSnapshot);
}

/// Writes one telemetry line per changed snapshot
pub struct TelemetryPresenter<W: Write> {
    out: W,
    last: Option<(u64, u64, EpisodePhase)>,
    failed: bool,
}

impl<W: Write> TelemetryPresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last: None,
            failed: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Presenter for TelemetryPresenter<W> {
    fn present(&mut self, snapshot: &RocketSnapshot) {
        let key = (snapshot.episode, snapshot.frames, snapshot.phase);
        if self.failed || self.last == Some(key) {
            return;
        }
        self.last = Some(key);

        if let Err(e) = writeln!(self.out, "{}", telemetry_line(snapshot)) {
            log::error!("Telemetry output failed, presenter disabled: {e}");
            self.failed = true;
        }
    }
}

/// Compact one-line description of a snapshot
pub fn telemetry_line(s: &RocketSnapshot) -> String {
    let status = match s.phase {
        EpisodePhase::Ascending => "ASCENT",
        EpisodePhase::Controlled => "FLIGHT",
        EpisodePhase::Terminal(Outcome::Landed) => "LANDED",
        EpisodePhase::Terminal(Outcome::Crashed) => "CRASHED",
    };
    let mut line = format!(
        "#{:<3} {:<7} t={:6.1}s alt={:8.1}m x={:8.1}m vx={:7.1} vy={:7.1} tilt={:6.1}° thrust={:3.0}% fuel={:5.1}% starts={}",
        s.episode,
        status,
        s.flight_time,
        s.position.y,
        s.position.x,
        s.speed.x,
        s.speed.y,
        s.tilt().to_degrees(),
        s.thrust_percentage * 100.0,
        s.fuel_percentage * 100.0,
        s.engine_starts_remaining
    );
    if s.phase.is_terminal() {
        line.push_str("  [enter: next episode, r: restart, q: quit]");
    }
    line
}

/// Present snapshots at `fps` until the simulation side closes or `stop` is set
///
/// Returns the number of frames presented.
pub fn run_presenter(
    receiver: &SnapshotReceiver,
    fps: u32,
    presenter: &mut dyn Presenter,
    stop: &AtomicBool,
) -> u64 {
    let frame_duration = Duration::from_nanos(1_000_000_000 / u64::from(fps.max(1)));
    let mut next_frame_time = Instant::now();
    let mut latest: Option<RocketSnapshot> = None;
    let mut frames: u64 = 0;

    while !stop.load(Ordering::Relaxed) {
        match receiver.take() {
            Take::Fresh(snapshot) => latest = Some(snapshot),
            Take::Empty => {}
            Take::Closed => break,
        }
        if let Some(snapshot) = &latest {
            presenter.present(snapshot);
            frames += 1;
        }

        next_frame_time += frame_duration;
        let now = Instant::now();
        if next_frame_time > now {
            std::thread::sleep(next_frame_time - now);
        } else {
            next_frame_time = now;
        }
    }

    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::channel::snapshot_channel;
    use crate::sim::Rocket;

    #[derive(Default)]
    struct Recorder {
        seen: Vec<RocketSnapshot>,
    }

    impl Presenter for Recorder {
        fn present(&mut self, snapshot: &RocketSnapshot) {
            self.seen.push(*snapshot);
        }
    }

    fn snapshot(episode: u64, phase: EpisodePhase) -> RocketSnapshot {
        RocketSnapshot::capture(&Rocket::new(), episode, 42, phase)
    }

    #[test]
    fn test_presenter_stops_when_simulation_closes() {
        let (publisher, receiver) = snapshot_channel();
        publisher.publish(snapshot(1, EpisodePhase::Ascending));
        drop(publisher);

        let mut recorder = Recorder::default();
        let frames = run_presenter(&receiver, 1000, &mut recorder, &AtomicBool::new(false));
        assert_eq!(frames, 1);
        assert_eq!(recorder.seen[0].episode, 1);
    }

    #[test]
    fn test_presenter_repeats_stale_snapshot() {
        let (publisher, receiver) = snapshot_channel();
        publisher.publish(snapshot(7, EpisodePhase::Controlled));
        let stop = AtomicBool::new(false);

        let mut recorder = Recorder::default();
        std::thread::scope(|scope| {
            scope.spawn(|| {
                std::thread::sleep(Duration::from_millis(50));
                stop.store(true, Ordering::Relaxed);
            });
            run_presenter(&receiver, 500, &mut recorder, &stop);
        });
        drop(publisher);

        assert!(recorder.seen.len() > 1);
        assert!(recorder.seen.iter().all(|s| s.episode == 7));
    }

    #[test]
    fn test_stop_flag_set_before_start() {
        let (_publisher, receiver) = snapshot_channel();
        let mut recorder = Recorder::default();
        let frames = run_presenter(&receiver, 60, &mut recorder, &AtomicBool::new(true));
        assert_eq!(frames, 0);
    }

    #[test]
    fn test_telemetry_skips_repeated_snapshots() {
        let mut presenter = TelemetryPresenter::new(Vec::new());
        let s = snapshot(1, EpisodePhase::Ascending);
        presenter.present(&s);
        presenter.present(&s);
        presenter.present(&snapshot(1, EpisodePhase::Terminal(Outcome::Landed)));

        let out = String::from_utf8(presenter.into_inner()).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("ASCENT"));
        assert!(lines[1].contains("LANDED"));
        assert!(lines[1].contains("next episode"));
    }

    #[test]
    fn test_telemetry_line_fields() {
        let line = telemetry_line(&snapshot(12, EpisodePhase::Controlled));
        assert!(line.starts_with("#12"));
        assert!(line.contains("FLIGHT"));
        assert!(line.contains("tilt=   0.0°"));
        assert!(line.contains("fuel=100.0%"));
        assert!(line.contains("starts=3"));
    }
}
