//! Line-based terminal controls
//!
//! A terminal can't report key releases, so each command latches a control
//! until the opposite control or `x` replaces it.

use crate::driver::DriverCommand;
use crate::input::{Control, KeyboardState};

/// One-line help for the terminal controls
pub const HELP: &str =
    "w/s: throttle up/down, a/d: jets, x: release, enter: launch/next, r: restart, q: quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalCommand {
    Hold(Control),
    Release,
    Continue,
    Restart,
    Quit,
}

/// Parse one input line
pub fn parse_line(line: &str) -> Option<TerminalCommand> {
    let command = match line.trim().to_lowercase().as_str() {
        "w" | "up" | "+" => TerminalCommand::Hold(Control::IncreaseThrust),
        "s" | "down" | "-" => TerminalCommand::Hold(Control::DecreaseThrust),
        "a" | "left" => TerminalCommand::Hold(Control::JetLeft),
        "d" | "right" => TerminalCommand::Hold(Control::JetRight),
        "x" | "release" => TerminalCommand::Release,
        "" | "c" | "continue" => TerminalCommand::Continue,
        "r" | "restart" => TerminalCommand::Restart,
        "q" | "quit" | "exit" => TerminalCommand::Quit,
        _ => return None,
    };
    Some(command)
}

/// Opposing control on the same axis
fn opposite(control: Control) -> Control {
    match control {
        Control::IncreaseThrust => Control::DecreaseThrust,
        Control::DecreaseThrust => Control::IncreaseThrust,
        Control::JetLeft => Control::JetRight,
        Control::JetRight => Control::JetLeft,
    }
}

/// Feeds terminal commands into a shared [`KeyboardState`]
#[derive(Debug, Clone)]
pub struct TerminalBridge {
    keys: KeyboardState,
}

impl TerminalBridge {
    pub fn new(keys: KeyboardState) -> Self {
        Self { keys }
    }

    /// Update key state; returns a command for the driver when one is due
    pub fn apply(&self, command: TerminalCommand) -> Option<DriverCommand> {
        match command {
            TerminalCommand::Hold(control) => {
                self.keys.set(opposite(control), false);
                self.keys.set(control, true);
                None
            }
            TerminalCommand::Release => {
                self.keys.release_all();
                None
            }
            TerminalCommand::Continue => {
                self.keys.release_all();
                Some(DriverCommand::Continue)
            }
            TerminalCommand::Restart => {
                self.keys.release_all();
                Some(DriverCommand::AbortEpisode)
            }
            TerminalCommand::Quit => Some(DriverCommand::Shutdown),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeySource;

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("w"), Some(TerminalCommand::Hold(Control::IncreaseThrust)));
        assert_eq!(parse_line("  LEFT \n"), Some(TerminalCommand::Hold(Control::JetLeft)));
        assert_eq!(parse_line(""), Some(TerminalCommand::Continue));
        assert_eq!(parse_line("r"), Some(TerminalCommand::Restart));
        assert_eq!(parse_line("q"), Some(TerminalCommand::Quit));
        assert_eq!(parse_line("jump"), None);
    }

    #[test]
    fn test_hold_replaces_opposite_control() {
        let keys = KeyboardState::new();
        let bridge = TerminalBridge::new(keys.clone());

        assert_eq!(bridge.apply(TerminalCommand::Hold(Control::JetLeft)), None);
        assert!(keys.is_pressed(Control::JetLeft));

        bridge.apply(TerminalCommand::Hold(Control::JetRight));
        assert!(keys.is_pressed(Control::JetRight));
        assert!(!keys.is_pressed(Control::JetLeft));

        bridge.apply(TerminalCommand::Hold(Control::IncreaseThrust));
        assert!(keys.is_pressed(Control::JetRight));
        assert!(keys.is_pressed(Control::IncreaseThrust));

        bridge.apply(TerminalCommand::Release);
        assert!(Control::ALL.iter().all(|&c| !keys.is_pressed(c)));
    }

    #[test]
    fn test_driver_commands() {
        let keys = KeyboardState::new();
        let bridge = TerminalBridge::new(keys.clone());
        bridge.apply(TerminalCommand::Hold(Control::DecreaseThrust));

        assert_eq!(bridge.apply(TerminalCommand::Restart), Some(DriverCommand::AbortEpisode));
        assert!(!keys.is_pressed(Control::DecreaseThrust));
        assert_eq!(bridge.apply(TerminalCommand::Continue), Some(DriverCommand::Continue));
        assert_eq!(bridge.apply(TerminalCommand::Quit), Some(DriverCommand::Shutdown));
    }
}
