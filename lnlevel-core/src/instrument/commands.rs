//! Command table
//!
//! ```text
//! (root)
//! ├── DISTance
//! │   └── MEASure?          distance in cm
//! ├── LEVel
//! │   ├── MEASure?          level fraction
//! │   └── SETup
//! │       ├── EMPty  / ?    empty calibration distance
//! │       └── FULL   / ?    full calibration distance
//! └── *IDN?                 identification
//! ```

use lnlevel_protocol::{CommandSpec, CommandTree, Dispatcher, TreeError};

use crate::config::CalibrationPoint;

/// Handlers bound in the command tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    DistanceMeasure,
    LevelMeasure,
    EmptyQuery,
    EmptySet,
    FullQuery,
    FullSet,
    Identify,
}

impl Command {
    /// Calibration point a setup command reads or writes
    pub const fn calibration_point(self) -> Option<CalibrationPoint> {
        match self {
            Command::EmptyQuery | Command::EmptySet => Some(CalibrationPoint::Empty),
            Command::FullQuery | Command::FullSet => Some(CalibrationPoint::Full),
            _ => None,
        }
    }
}

/// Every path the meter answers to
pub const COMMAND_TABLE: &[CommandSpec<Command>] = &[
    CommandSpec::new(":DISTance:MEASure?", Command::DistanceMeasure),
    CommandSpec::new(":LEVel:MEASure?", Command::LevelMeasure),
    CommandSpec::new(":LEVel:SETup:EMPty?", Command::EmptyQuery),
    CommandSpec::new(":LEVel:SETup:EMPty", Command::EmptySet),
    CommandSpec::new(":LEVel:SETup:FULL?", Command::FullQuery),
    CommandSpec::new(":LEVel:SETup:FULL", Command::FullSet),
    CommandSpec::new("*IDN?", Command::Identify),
];

/// Build the meter's command tree
pub fn command_tree() -> Result<CommandTree<Command>, TreeError> {
    CommandTree::from_table(COMMAND_TABLE)
}

/// Dispatcher over the meter's command tree
pub fn dispatcher() -> Result<Dispatcher<Command>, TreeError> {
    command_tree().map(Dispatcher::new)
}
