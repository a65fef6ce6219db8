//! Persistent storage abstractions
//!
//! The meter persists exactly two bytes: the empty and full calibration
//! distances. Each lives in its own fixed slot with no header, version tag
//! or checksum, like a pair of EEPROM cells.

/// Value an unwritten cell reads back as (erased flash / EEPROM)
pub const ERASED_BYTE: u8 = 0xFF;

/// Fixed storage slots
///
/// The discriminant is the slot address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageSlot {
    /// Distance reading with an empty vessel
    EmptyDistance = 0,
    /// Distance reading with a full vessel
    FullDistance = 1,
}

impl StorageSlot {
    /// Every slot, in address order
    pub const ALL: [StorageSlot; 2] = [StorageSlot::EmptyDistance, StorageSlot::FullDistance];

    /// Get the slot address
    pub fn address(self) -> u8 {
        self as u8
    }

    /// Look up a slot by address
    pub fn from_address(address: u8) -> Option<Self> {
        match address {
            0 => Some(StorageSlot::EmptyDistance),
            1 => Some(StorageSlot::FullDistance),
            _ => None,
        }
    }
}

/// Errors from storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Flash operation failed
    Flash,
    /// Storage layer (wear leveling, map) failed
    Storage,
    /// Slot has never been written
    NotFound,
    /// Stored data has an unexpected shape
    Corrupted,
    /// Storage is full
    Full,
}

/// Byte-addressable persistent storage
///
/// Reads and writes complete before returning. Implementations on flash are
/// expected to handle wear leveling themselves.
pub trait ByteStore {
    /// Read the byte stored in `slot`
    fn read_byte(&mut self, slot: StorageSlot) -> Result<u8, StorageError>;

    /// Write `value` to `slot`
    fn write_byte(&mut self, slot: StorageSlot, value: u8) -> Result<(), StorageError>;
}

impl<T: ByteStore + ?Sized> ByteStore for &mut T {
    fn read_byte(&mut self, slot: StorageSlot) -> Result<u8, StorageError> {
        (**self).read_byte(slot)
    }

    fn write_byte(&mut self, slot: StorageSlot, value: u8) -> Result<(), StorageError> {
        (**self).write_byte(slot, value)
    }
}

// Implement the sequential-storage Key trait when the feature is enabled
#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for StorageSlot {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        buffer[0] = self.address();
        Ok(1)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        match StorageSlot::from_address(buffer[0]) {
            Some(slot) => Ok((slot, 1)),
            None => Err(sequential_storage::map::SerializationError::InvalidFormat),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_addresses_are_fixed() {
        assert_eq!(StorageSlot::EmptyDistance.address(), 0);
        assert_eq!(StorageSlot::FullDistance.address(), 1);
    }

    #[test]
    fn test_slot_from_address() {
        for slot in StorageSlot::ALL {
            assert_eq!(StorageSlot::from_address(slot.address()), Some(slot));
        }
        assert_eq!(StorageSlot::from_address(2), None);
    }
}
