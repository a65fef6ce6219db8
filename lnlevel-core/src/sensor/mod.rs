//! Distance sensing
//!
//! The gateway turns raw echo timings from a [`crate::traits::RangingSensor`]
//! into a single robust centimeter reading.

pub mod gateway;

pub use gateway::{median, round_trip_to_cm, SensorGateway, NO_READING};
