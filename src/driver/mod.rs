//! Simulation driver
//!
//! Episode state machine, the paced tick thread, the single-slot snapshot
//! channel and the presentation loop that drains it.

pub mod channel;
pub mod present;
pub mod runner;
pub mod session;

pub use channel::{Publish, SnapshotPublisher, SnapshotReceiver, Take, snapshot_channel};
pub use present::{Presenter, TelemetryPresenter, run_presenter, telemetry_line};
pub use runner::{
    DriverCommand, DriverConfig, SimulationHandle, run_simulation_loop, spawn_simulation,
};
pub use session::Simulation;
