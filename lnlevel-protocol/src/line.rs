//! Line assembly for the serial command stream
//!
//! Bytes arrive one at a time from the UART. A line is complete when the
//! terminator arrives:
//! - `\n` ends a line
//! - `\r` is dropped, so `\r\n` terminals work too
//! - Lines longer than [`MAX_LINE_LEN`] are discarded up to the next `\n`

use heapless::Vec;

/// Line terminator
pub const LINE_TERMINATOR: u8 = b'\n';

/// Maximum line length in bytes (excluding the terminator)
pub const MAX_LINE_LEN: usize = 128;

/// Errors while assembling a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Line exceeded [`MAX_LINE_LEN`]; the rest of it is dropped
    Overflow,
    /// Line is not valid UTF-8
    InvalidUtf8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineState {
    /// Accumulating bytes
    Collecting,
    /// Previous call returned a line; clear before the next byte
    Complete,
    /// Overflowed; dropping bytes until the terminator
    Discarding,
}

/// Accumulates bytes into lines
#[derive(Debug, Clone)]
pub struct LineBuffer {
    buffer: Vec<u8, MAX_LINE_LEN>,
    state: LineState,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineBuffer {
    /// Create an empty line buffer
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            state: LineState::Collecting,
        }
    }

    /// Drop any partial line
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.state = LineState::Collecting;
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(line))` when the terminator completes a line,
    /// `Ok(None)` when more bytes are needed. An overflow is reported once,
    /// on the byte that overflowed.
    pub fn feed(&mut self, byte: u8) -> Result<Option<&str>, LineError> {
        if self.state == LineState::Complete {
            self.reset();
        }

        match byte {
            LINE_TERMINATOR => {
                if self.state == LineState::Discarding {
                    self.reset();
                    return Ok(None);
                }
                self.state = LineState::Complete;
                core::str::from_utf8(&self.buffer)
                    .map(Some)
                    .map_err(|_| LineError::InvalidUtf8)
            }
            b'\r' => Ok(None),
            _ if self.state == LineState::Discarding => Ok(None),
            _ => {
                if self.buffer.push(byte).is_err() {
                    self.buffer.clear();
                    self.state = LineState::Discarding;
                    return Err(LineError::Overflow);
                }
                Ok(None)
            }
        }
    }
}
