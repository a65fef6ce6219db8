//! The level meter as a protocol instrument
//!
//! [`commands`] declares which paths exist; [`meter`] implements them on top
//! of the sensor gateway, the calibration store and the level engine.

pub mod commands;
pub mod meter;

pub use commands::{command_tree, dispatcher, Command, COMMAND_TABLE};
pub use meter::{CommandError, LevelMeter};
