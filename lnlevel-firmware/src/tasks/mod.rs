//! Embassy async tasks
//!
//! The meter runs as a single task: one line in, its responses out.

pub mod scpi;

pub use scpi::{scpi_task, Meter};
