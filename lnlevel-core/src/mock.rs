//! Test doubles for the hardware capabilities

use heapless::Vec;
use lnlevel_hal::{ByteStore, StorageError, StorageSlot, ERASED_BYTE};

use crate::config::DEFAULT_SPEED_OF_SOUND_CM_PER_US;
use crate::traits::{RangingError, RangingSensor};

/// Two-cell in-memory byte store
#[derive(Debug, Clone)]
pub struct RamStore {
    pub cells: [u8; 2],
    pub writes: u32,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

impl RamStore {
    /// Erased store
    pub fn new() -> Self {
        Self::with_cells([ERASED_BYTE; 2])
    }

    pub fn with_cells(cells: [u8; 2]) -> Self {
        Self {
            cells,
            writes: 0,
            fail_reads: false,
            fail_writes: false,
        }
    }
}

impl ByteStore for RamStore {
    fn read_byte(&mut self, slot: StorageSlot) -> Result<u8, StorageError> {
        if self.fail_reads {
            return Err(StorageError::NotFound);
        }
        Ok(self.cells[slot.address() as usize])
    }

    fn write_byte(&mut self, slot: StorageSlot, value: u8) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Flash);
        }
        self.cells[slot.address() as usize] = value;
        self.writes += 1;
        Ok(())
    }
}

/// Echo time that converts back to exactly `cm` at the default speed of sound
pub fn echo_us_for_cm(cm: u8) -> u32 {
    // Aim for the middle of the centimeter so truncation lands on `cm`
    ((cm as f32 + 0.5) * 2.0 / DEFAULT_SPEED_OF_SOUND_CM_PER_US) as u32
}

/// Ranging sensor that replays a fixed script, repeating the last entry
#[derive(Debug, Clone)]
pub struct ScriptedSensor {
    script: Vec<Result<u32, RangingError>, 16>,
    next: usize,
    pub pings: u32,
}

impl ScriptedSensor {
    pub fn new(script: &[Result<u32, RangingError>]) -> Self {
        Self {
            script: Vec::from_slice(script).unwrap(),
            next: 0,
            pings: 0,
        }
    }

    /// Every ping sees a surface at `cm`
    pub fn at_cm(cm: u8) -> Self {
        Self::new(&[Ok(echo_us_for_cm(cm))])
    }

    /// Every ping times out
    pub fn silent() -> Self {
        Self::new(&[Err(RangingError::NoEcho)])
    }
}

impl RangingSensor for ScriptedSensor {
    fn ping_us(&mut self) -> Result<u32, RangingError> {
        self.pings += 1;
        let result = self.script[self.next.min(self.script.len() - 1)];
        self.next += 1;
        result
    }
}
