//! Microsecond clock backed by the embassy time driver

use embassy_time::Instant;
use lnlevel_hal::Monotonic;

/// [`Monotonic`] over `embassy_time::Instant`
///
/// Resolution is that of the time driver tick (1 MHz on RP2040).
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Monotonic for EmbassyClock {
    fn now_us(&self) -> u64 {
        Instant::now().as_micros()
    }
}
