//! Ultrasonic ranging sensor trait

/// Errors from a single ranging ping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RangingError {
    /// No echo within the timeout (nothing in range)
    NoEcho,
    /// Echo line never went low after the previous ping
    EchoStuck,
    /// Trigger or echo pin could not be driven/read
    Pin,
}

/// Trait for time-of-flight ranging sensors
///
/// Implementations drive the hardware for one ping and report the echo
/// round-trip time. Pacing between pings (so echoes from the previous
/// ping have died out) is the implementation's job.
pub trait RangingSensor {
    /// Fire one ping and return the echo round-trip time in microseconds
    fn ping_us(&mut self) -> Result<u32, RangingError>;
}

impl<T: RangingSensor + ?Sized> RangingSensor for &mut T {
    fn ping_us(&mut self) -> Result<u32, RangingError> {
        (**self).ping_us()
    }
}
