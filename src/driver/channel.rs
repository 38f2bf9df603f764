//! Single-slot snapshot channel between simulation and presentation
//!
//! The simulation publishes without ever blocking: when the presenter hasn't
//! taken the previous snapshot yet, the new one is dropped. The presenter thus
//! sees either the latest state or one that's slightly stale, never a backlog.

use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError, TrySendError};

use crate::sim::RocketSnapshot;

/// What happened to a published snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publish {
    Sent,
    /// Slot still occupied by an undrained snapshot
    Dropped,
    /// Presenter has gone away
    Disconnected,
}

/// Producer half, owned by the simulation thread
#[derive(Debug, Clone)]
pub struct SnapshotPublisher {
    sender: SyncSender<RocketSnapshot>,
}

impl SnapshotPublisher {
    pub fn publish(&self, snapshot: RocketSnapshot) -> Publish {
        match self.sender.try_send(snapshot) {
            Ok(()) => Publish::Sent,
            Err(TrySendError::Full(_)) => Publish::Dropped,
            Err(TrySendError::Disconnected(_)) => Publish::Disconnected,
        }
    }
}

/// Result of polling the slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Take {
    Fresh(RocketSnapshot),
    Empty,
    /// Simulation side shut down and the slot is drained
    Closed,
}

/// Consumer half, owned by the presentation loop
#[derive(Debug)]
pub struct SnapshotReceiver {
    receiver: Receiver<RocketSnapshot>,
}

impl SnapshotReceiver {
    /// Take the waiting snapshot without blocking
    pub fn take(&self) -> Take {
        match self.receiver.try_recv() {
            Ok(snapshot) => Take::Fresh(snapshot),
            Err(TryRecvError::Empty) => Take::Empty,
            Err(TryRecvError::Disconnected) => Take::Closed,
        }
    }
}

/// Create a connected capacity-1 publisher/receiver pair
pub fn snapshot_channel() -> (SnapshotPublisher, SnapshotReceiver) {
    let (sender, receiver) = mpsc::sync_channel(1);
    (SnapshotPublisher { sender }, SnapshotReceiver { receiver })
}
