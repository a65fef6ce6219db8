//! Invocation parsing
//!
//! A line holds one or more invocations separated by `;`. Each invocation
//! is a path, optionally followed by whitespace and a `,`-separated
//! parameter list:
//!
//! ```text
//! :LEVel:SETup:EMPty 200
//! └───────┬────────┘ └┬┘
//!        path       params
//! ```

use heapless::Vec;

use crate::tree::QUERY_MARKER;

/// Separator between invocations on one line
pub const INVOCATION_SEPARATOR: char = ';';

/// Separator between parameters
pub const PARAMETER_SEPARATOR: char = ',';

/// Maximum parameters per invocation
pub const MAX_PARAMS: usize = 8;

/// Errors while parsing an invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invocation has no path
    EmptyPath,
    /// More than [`MAX_PARAMS`] parameters
    TooManyParameters,
}

/// Errors while reading a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParamError {
    /// Parameter is not a number
    NotNumeric,
}

/// Split a line into its non-empty invocations
pub fn split_invocations(line: &str) -> impl Iterator<Item = &str> {
    line.split(INVOCATION_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Ordered parameter list of one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params<'a> {
    items: Vec<&'a str, MAX_PARAMS>,
}

impl<'a> Params<'a> {
    /// Parse a raw parameter list (the text after the path)
    pub fn parse(text: &'a str) -> Result<Self, ParseError> {
        let mut items = Vec::new();
        let text = text.trim();
        if !text.is_empty() {
            for item in text.split(PARAMETER_SEPARATOR) {
                items
                    .push(item.trim())
                    .map_err(|_| ParseError::TooManyParameters)?;
            }
        }
        Ok(Self { items })
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if there are no parameters
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Raw text of the parameter at `index`
    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.items.get(index).copied()
    }

    /// Iterate over raw parameters in order
    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.items.iter().copied()
    }

    /// Parameter at `index` as an integer
    ///
    /// Returns `Ok(None)` when the parameter is absent. Decimal input is
    /// truncated toward zero (`"200.7"` -> 200), so values typed by hand or
    /// produced by float formatting are still accepted.
    pub fn int(&self, index: usize) -> Result<Option<i32>, ParamError> {
        let Some(raw) = self.get(index) else {
            return Ok(None);
        };

        if let Ok(value) = raw.parse::<i32>() {
            return Ok(Some(value));
        }

        match raw.parse::<f32>() {
            Ok(value) if value.is_finite() => Ok(Some(value as i32)),
            _ => Err(ParamError::NotNumeric),
        }
    }
}

/// One parsed invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation<'a> {
    /// Path without the query marker, e.g. `:LEV:SET:EMP`
    pub path: &'a str,
    /// Whether the path ended with `?`
    pub is_query: bool,
    /// Parameters in order
    pub params: Params<'a>,
}

impl<'a> Invocation<'a> {
    /// Parse one invocation (no `;` inside)
    pub fn parse(text: &'a str) -> Result<Self, ParseError> {
        let text = text.trim();
        let (path, rest) = match text.find(char::is_whitespace) {
            Some(pos) => (&text[..pos], &text[pos..]),
            None => (text, ""),
        };

        let (is_query, path) = match path.strip_suffix(QUERY_MARKER) {
            Some(stripped) => (true, stripped),
            None => (false, path),
        };

        if path.is_empty() {
            return Err(ParseError::EmptyPath);
        }

        Ok(Self {
            path,
            is_query,
            params: Params::parse(rest)?,
        })
    }
}
