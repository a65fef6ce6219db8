//! Sensor gateway (median-of-N ranging)
//!
//! Single ultrasonic pings are noisy: stray echoes off the dewar neck and
//! boil-off turbulence give occasional outliers. Each measurement takes
//! several pings and reports the median of the ones that returned an echo.

use heapless::Vec;

use crate::config::{SamplingConfig, MAX_SAMPLES};
use crate::traits::RangingSensor;

/// Distance reported when no ping returned an echo
pub const NO_READING: u8 = 0;

/// Median of the samples (upper median for even counts)
///
/// Sorts `samples` in place. Returns `None` for an empty slice.
pub fn median(samples: &mut [u32]) -> Option<u32> {
    if samples.is_empty() {
        return None;
    }
    samples.sort_unstable();
    Some(samples[samples.len() / 2])
}

/// Convert an echo round-trip time to whole centimeters
///
/// The sound travels there and back, so the one-way distance is half the
/// round trip. Truncates; distances beyond 255 cm saturate.
pub fn round_trip_to_cm(round_trip_us: u32, speed_of_sound_cm_per_us: f32) -> u8 {
    (round_trip_us as f32 * speed_of_sound_cm_per_us / 2.0) as u8
}

/// Wraps a ranging sensor and produces centimeter readings
pub struct SensorGateway<R> {
    sensor: R,
    sample_count: u8,
    speed_of_sound_cm_per_us: f32,
}

impl<R: RangingSensor> SensorGateway<R> {
    /// Create a gateway; the sample count is clamped to `1..=MAX_SAMPLES`
    pub fn new(sensor: R, sampling: &SamplingConfig) -> Self {
        Self {
            sensor,
            sample_count: sampling.sample_count.clamp(1, MAX_SAMPLES),
            speed_of_sound_cm_per_us: sampling.speed_of_sound_cm_per_us,
        }
    }

    /// Pings taken per measurement
    pub fn sample_count(&self) -> u8 {
        self.sample_count
    }

    /// Median round-trip time of the pings that returned an echo
    pub fn median_round_trip_us(&mut self) -> Option<u32> {
        let mut samples = Vec::<u32, { MAX_SAMPLES as usize }>::new();
        for _ in 0..self.sample_count {
            if let Ok(us) = self.sensor.ping_us() {
                // Capacity equals the clamped sample count
                let _ = samples.push(us);
            }
        }
        median(&mut samples)
    }

    /// Measure the distance to the surface in centimeters
    ///
    /// Returns [`NO_READING`] (0) when no ping returned an echo.
    pub fn measure_distance(&mut self) -> u8 {
        self.median_round_trip_us()
            .map(|us| round_trip_to_cm(us, self.speed_of_sound_cm_per_us))
            .unwrap_or(NO_READING)
    }

    /// Access the wrapped sensor
    pub fn sensor_mut(&mut self) -> &mut R {
        &mut self.sensor
    }
}
