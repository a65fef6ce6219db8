//! Monotonic time source
//!
//! Echo timing needs microsecond resolution. Chip HALs back this with
//! their hardware timer.

/// Free-running microsecond clock
pub trait Monotonic {
    /// Microseconds since an arbitrary, fixed epoch (usually boot)
    fn now_us(&self) -> u64;

    /// Microseconds elapsed since `since_us`
    fn elapsed_us(&self, since_us: u64) -> u64 {
        self.now_us().saturating_sub(since_us)
    }
}
