//! Calibration store
//!
//! Holds the two calibration distances (empty and full vessel). Both are
//! read from storage once at startup, cached, and written back on every
//! set. There is no header, checksum or factory default: an unwritten slot
//! loads as whatever the storage returns, [`ERASED_BYTE`] on erased flash.

use lnlevel_hal::{ByteStore, StorageError, StorageSlot, ERASED_BYTE};

/// Largest storable distance in centimeters
pub const MAX_DISTANCE: u8 = u8::MAX;

/// Which calibration point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationPoint {
    /// Distance to the bottom of the empty vessel
    Empty,
    /// Distance to the surface of a full vessel
    Full,
}

impl CalibrationPoint {
    /// Storage slot backing this point
    pub const fn slot(self) -> StorageSlot {
        match self {
            CalibrationPoint::Empty => StorageSlot::EmptyDistance,
            CalibrationPoint::Full => StorageSlot::FullDistance,
        }
    }
}

/// Clamp a raw distance to the storable range
pub fn clamp_distance(raw: i32) -> u8 {
    raw.clamp(0, MAX_DISTANCE as i32) as u8
}

/// Snapshot of both calibration distances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    pub empty_distance: u8,
    pub full_distance: u8,
}

impl Calibration {
    /// Create a calibration snapshot
    pub const fn new(empty_distance: u8, full_distance: u8) -> Self {
        Self {
            empty_distance,
            full_distance,
        }
    }

    /// Equal points give no usable span (also the "never calibrated" state)
    pub const fn is_degenerate(&self) -> bool {
        self.empty_distance == self.full_distance
    }

    /// Value for one point
    pub const fn get(&self, point: CalibrationPoint) -> u8 {
        match point {
            CalibrationPoint::Empty => self.empty_distance,
            CalibrationPoint::Full => self.full_distance,
        }
    }

    fn set(&mut self, point: CalibrationPoint, value: u8) {
        match point {
            CalibrationPoint::Empty => self.empty_distance = value,
            CalibrationPoint::Full => self.full_distance = value,
        }
    }
}

/// Cached, persisted calibration distances
pub struct CalibrationStore<S> {
    storage: S,
    cache: Calibration,
}

impl<S: ByteStore> CalibrationStore<S> {
    /// Read both points from storage
    ///
    /// A slot that cannot be read loads as [`ERASED_BYTE`], the same value
    /// an erased cell would return.
    pub fn load(mut storage: S) -> Self {
        let mut read = |slot| storage.read_byte(slot).unwrap_or(ERASED_BYTE);
        let cache = Calibration::new(
            read(StorageSlot::EmptyDistance),
            read(StorageSlot::FullDistance),
        );

        Self { storage, cache }
    }

    /// Cached value of one point
    pub fn get(&self, point: CalibrationPoint) -> u8 {
        self.cache.get(point)
    }

    /// Both points
    pub fn snapshot(&self) -> Calibration {
        self.cache
    }

    /// Clamp, cache and persist a new value
    ///
    /// Returns the stored (clamped) value. The cache is updated even when
    /// the write fails; the error is only reported.
    pub fn set(&mut self, point: CalibrationPoint, raw: i32) -> Result<u8, StorageError> {
        let value = clamp_distance(raw);
        self.cache.set(point, value);
        self.storage.write_byte(point.slot(), value)?;
        Ok(value)
    }

    /// Access the backing storage
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::RamStore;

    #[test]
    fn test_round_trip() {
        let mut store = CalibrationStore::load(RamStore::new());
        assert_eq!(store.set(CalibrationPoint::Empty, 200), Ok(200));
        assert_eq!(store.get(CalibrationPoint::Empty), 200);
    }

    #[test]
    fn test_clamping() {
        let mut store = CalibrationStore::load(RamStore::new());
        assert_eq!(store.set(CalibrationPoint::Empty, 300), Ok(255));
        assert_eq!(store.set(CalibrationPoint::Full, -5), Ok(0));
        assert_eq!(store.get(CalibrationPoint::Empty), 255);
        assert_eq!(store.get(CalibrationPoint::Full), 0);
    }

    #[test]
    fn test_set_persists_to_fixed_slot() {
        let mut store = CalibrationStore::load(RamStore::new());
        store.set(CalibrationPoint::Full, 42).unwrap();
        store.set(CalibrationPoint::Empty, 180).unwrap();

        let ram = store.storage_mut();
        assert_eq!(ram.cells, [180, 42]);
        assert_eq!(ram.writes, 2);

        // Reload sees persisted values
        let reloaded = CalibrationStore::load(ram.clone());
        assert_eq!(reloaded.snapshot(), Calibration::new(180, 42));
    }

    #[test]
    fn test_unwritten_store_loads_erased_and_degenerate() {
        let store = CalibrationStore::load(RamStore::new());
        assert_eq!(store.snapshot(), Calibration::new(ERASED_BYTE, ERASED_BYTE));
        assert!(store.snapshot().is_degenerate());
    }

    #[test]
    fn test_read_failure_loads_erased() {
        let mut ram = RamStore::with_cells([10, 20]);
        ram.fail_reads = true;
        let store = CalibrationStore::load(ram);
        assert_eq!(store.snapshot(), Calibration::new(ERASED_BYTE, ERASED_BYTE));
    }

    #[test]
    fn test_write_failure_still_updates_cache() {
        let mut ram = RamStore::new();
        ram.fail_writes = true;
        let mut store = CalibrationStore::load(ram);

        assert_eq!(store.set(CalibrationPoint::Empty, 120), Err(StorageError::Flash));
        assert_eq!(store.get(CalibrationPoint::Empty), 120);
    }

    #[test]
    fn test_equal_points_are_legal() {
        let mut store = CalibrationStore::load(RamStore::new());
        store.set(CalibrationPoint::Empty, 50).unwrap();
        store.set(CalibrationPoint::Full, 50).unwrap();
        assert!(store.snapshot().is_degenerate());
    }
}
