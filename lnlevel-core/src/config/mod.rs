//! Configuration types
//!
//! Board-agnostic configuration structures, the calibration store, and the
//! parser for the embedded `meter.toml`.

pub mod calibration;
pub mod parse;
pub mod types;

pub use calibration::{
    clamp_distance, Calibration, CalibrationPoint, CalibrationStore, MAX_DISTANCE,
};
pub use parse::{parse_config, ParseError};
pub use types::*;
