//! Board-agnostic core logic for the level meter firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Ranging sensor trait and the median-of-N sensor gateway
//! - Calibration store (empty/full distances, persisted per write)
//! - Level computation
//! - The SCPI command set and its handlers
//! - Configuration types and the embedded config parser

#![no_std]
#![deny(unsafe_code)]

// proptest's assertion macros expand to `format!`
#[cfg(test)]
#[macro_use]
extern crate std;

pub mod config;
pub mod instrument;
pub mod level;
pub mod sensor;
pub mod traits;

#[cfg(test)]
pub(crate) mod mock;
