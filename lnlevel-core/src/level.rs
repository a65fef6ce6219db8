//! Level computation
//!
//! The level is the position of the surface within the calibrated span:
//!
//! ```text
//! level = (empty_distance - distance) / (empty_distance - full_distance)
//! ```
//!
//! 0.0 is an empty vessel and 1.0 a full one. Readings outside the span
//! are reported as-is (below 0 or above 1), not clamped. NaN means there is
//! no level: either no echo came back, or both calibration points are equal.

use lnlevel_hal::ByteStore;

use crate::config::{Calibration, CalibrationStore};
use crate::sensor::{SensorGateway, NO_READING};
use crate::traits::RangingSensor;

/// Compute the level for a distance reading
pub fn compute_level(distance: u8, calibration: Calibration) -> f32 {
    if distance == NO_READING || calibration.is_degenerate() {
        return f32::NAN;
    }

    let empty = calibration.empty_distance as f32;
    let full = calibration.full_distance as f32;
    (empty - distance as f32) / (empty - full)
}

/// Take a distance measurement and compute the level
pub fn measure_level<R, S>(gateway: &mut SensorGateway<R>, calibration: &CalibrationStore<S>) -> f32
where
    R: RangingSensor,
    S: ByteStore,
{
    let distance = gateway.measure_distance();
    compute_level(distance, calibration.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CalibrationPoint, SamplingConfig};
    use crate::mock::{RamStore, ScriptedSensor};
    use proptest::prelude::*;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_level_formula() {
        let level = compute_level(125, Calibration::new(200, 50));
        assert!((level - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_level_endpoints() {
        let cal = Calibration::new(200, 50);
        assert!((compute_level(200, cal) - 0.0).abs() < EPSILON);
        assert!((compute_level(50, cal) - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_level_above_full_is_not_clamped() {
        let cal = Calibration::new(200, 50);
        assert!((compute_level(20, cal) - 1.2).abs() < EPSILON);
        // (200 - 10) / 150
        assert!((compute_level(10, cal) - 190.0 / 150.0).abs() < EPSILON);
    }

    #[test]
    fn test_level_below_empty_is_negative() {
        let level = compute_level(230, Calibration::new(200, 50));
        assert!((level + 0.2).abs() < EPSILON);
    }

    #[test]
    fn test_inverted_calibration() {
        // Full further away than empty still yields a consistent fraction
        let level = compute_level(100, Calibration::new(50, 150));
        assert!((level - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_no_echo_is_nan() {
        assert!(compute_level(NO_READING, Calibration::new(200, 50)).is_nan());
    }

    #[test]
    fn test_measure_level() {
        let mut store = CalibrationStore::load(RamStore::new());
        store.set(CalibrationPoint::Empty, 200).unwrap();
        store.set(CalibrationPoint::Full, 50).unwrap();
        let mut gateway = SensorGateway::new(ScriptedSensor::at_cm(125), &SamplingConfig::default());

        let level = measure_level(&mut gateway, &store);
        assert!((level - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_measure_level_uncalibrated() {
        let store = CalibrationStore::load(RamStore::new());
        let mut gateway = SensorGateway::new(ScriptedSensor::at_cm(125), &SamplingConfig::default());
        assert!(measure_level(&mut gateway, &store).is_nan());
    }

    proptest! {
        #[test]
        fn degenerate_calibration_is_always_nan(point in any::<u8>(), distance in any::<u8>()) {
            prop_assert!(compute_level(distance, Calibration::new(point, point)).is_nan());
        }

        #[test]
        fn calibrated_reading_is_finite(
            empty in any::<u8>(),
            full in any::<u8>(),
            distance in 1u8..,
        ) {
            prop_assume!(empty != full);
            prop_assert!(compute_level(distance, Calibration::new(empty, full)).is_finite());
        }
    }
}
