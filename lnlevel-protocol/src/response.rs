//! Response output
//!
//! Handlers never touch the transport. They write whole lines to a
//! [`ResponseWriter`]; the firmware drains a [`LineResponses`] buffer to the
//! UART once the input line has been processed, appending the terminator.

use core::fmt;

use heapless::{String, Vec};

use crate::line::MAX_LINE_LEN;

/// Maximum length of one response line (excluding the terminator)
pub const MAX_RESPONSE_LEN: usize = 128;

/// Shortest query plus separator, e.g. `A?;`
const MIN_QUERY_LEN: usize = 3;

/// Maximum response lines produced by one input line
///
/// Each query answers with at most one line, so a full input line of the
/// shortest possible queries still fits.
pub const MAX_RESPONSES: usize = (MAX_LINE_LEN + 1) / MIN_QUERY_LEN;

/// A single response line
pub type ResponseLine = String<MAX_RESPONSE_LEN>;

/// Errors while writing a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResponseError {
    /// Line longer than [`MAX_RESPONSE_LEN`]
    LineTooLong,
    /// More than [`MAX_RESPONSES`] lines queued
    TooManyLines,
}

/// Sink for response lines
pub trait ResponseWriter {
    /// Queue one complete response line (without terminator)
    fn write_line(&mut self, line: &str) -> Result<(), ResponseError>;

    /// Format and queue one response line
    fn write_fmt_line(&mut self, args: fmt::Arguments<'_>) -> Result<(), ResponseError> {
        let mut line = ResponseLine::new();
        fmt::Write::write_fmt(&mut line, args).map_err(|_| ResponseError::LineTooLong)?;
        self.write_line(&line)
    }
}

impl<T: ResponseWriter + ?Sized> ResponseWriter for &mut T {
    fn write_line(&mut self, line: &str) -> Result<(), ResponseError> {
        (**self).write_line(line)
    }
}

/// Responses collected while processing one input line
#[derive(Debug, Clone, Default)]
pub struct LineResponses {
    lines: Vec<ResponseLine, MAX_RESPONSES>,
}

impl LineResponses {
    /// Create an empty response buffer
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Drop all queued lines
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Number of queued lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Queued lines, in the order they were written
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|l| l.as_str())
    }
}

impl ResponseWriter for LineResponses {
    fn write_line(&mut self, line: &str) -> Result<(), ResponseError> {
        let line = ResponseLine::try_from(line).map_err(|_| ResponseError::LineTooLong)?;
        self.lines
            .push(line)
            .map_err(|_| ResponseError::TooManyLines)
    }
}
