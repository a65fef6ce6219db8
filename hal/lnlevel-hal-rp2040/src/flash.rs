//! Flash byte store for RP2040
//!
//! Each calibration slot is a sequential-storage map item in the last 64KB
//! of flash. Writes append a new item, so wear is spread over the partition
//! instead of erasing a sector per calibration change.
//!
//! The flash driver is async (DMA); calls are driven to completion with
//! `embassy_futures::block_on` so the byte store stays synchronous.

use embassy_futures::block_on;
use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use lnlevel_hal::{ByteStore, StorageError, StorageSlot};
use sequential_storage::cache::NoCache;
use sequential_storage::map;

/// Flash storage configuration
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB on the Pico
pub const STORE_PARTITION_SIZE: usize = 64 * 1024;
pub const STORE_PARTITION_START: usize = FLASH_SIZE - STORE_PARTITION_SIZE;

/// Flash range for the byte store partition
pub const STORE_RANGE: core::ops::Range<u32> =
    (STORE_PARTITION_START as u32)..(FLASH_SIZE as u32);

/// Scratch space for one serialized map item (key + value + header)
const ITEM_BUFFER_LEN: usize = 32;

fn map_error<E>(e: sequential_storage::Error<E>) -> StorageError {
    match e {
        sequential_storage::Error::Storage { .. } => StorageError::Flash,
        sequential_storage::Error::FullStorage => StorageError::Full,
        sequential_storage::Error::Corrupted { .. } => StorageError::Corrupted,
        _ => StorageError::Storage,
    }
}

/// RP2040 flash-backed [`ByteStore`]
pub struct Rp2040ByteStore<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> Rp2040ByteStore<'d> {
    /// Create a new byte store
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }
}

impl<'d> ByteStore for Rp2040ByteStore<'d> {
    fn read_byte(&mut self, slot: StorageSlot) -> Result<u8, StorageError> {
        let mut buffer = [0u8; ITEM_BUFFER_LEN];

        let result = block_on(map::fetch_item::<StorageSlot, u8, _>(
            &mut self.flash,
            STORE_RANGE,
            &mut NoCache::new(),
            &mut buffer,
            &slot,
        ));

        match result {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(StorageError::NotFound),
            Err(e) => Err(map_error(e)),
        }
    }

    fn write_byte(&mut self, slot: StorageSlot, value: u8) -> Result<(), StorageError> {
        let mut buffer = [0u8; ITEM_BUFFER_LEN];

        block_on(map::store_item(
            &mut self.flash,
            STORE_RANGE,
            &mut NoCache::new(),
            &mut buffer,
            &slot,
            &value,
        ))
        .map_err(map_error)
    }
}
