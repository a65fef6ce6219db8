//! SCPI-style instrument protocol
//!
//! This crate implements the text protocol the level meter speaks over its
//! serial link. It is independent of the meter itself: the instrument plugs
//! in through the [`Instrument`] trait and a table of command paths.
//!
//! # Protocol Overview
//!
//! ```text
//! :LEV:SET:EMP 200;:LEVel:MEASure?;*IDN?\n
//! └──────┬───────┘ └──────┬───────┘ └─┬─┘
//!   set + param         query       common query
//! ```
//!
//! - Lines end with `\n` (`\r` is ignored)
//! - Invocations within a line are separated by `;`
//! - A path is a `:`-separated list of mnemonics, followed by parameters
//!   separated by `,`
//! - A trailing `?` marks a query, which writes one response line
//! - Mnemonics match case-insensitively on any prefix at least as long as
//!   their upper-case short form (`MEASure` accepts `MEAS`, `meas`, `Measu`)
//!
//! Unknown commands are dropped without a response.

#![no_std]
#![deny(unsafe_code)]

// proptest's assertion macros expand to `format!`
#[cfg(test)]
#[macro_use]
extern crate std;

pub mod command;
pub mod dispatch;
pub mod line;
pub mod mnemonic;
pub mod response;
pub mod tree;

pub use command::{Invocation, ParamError, Params, ParseError, MAX_PARAMS};
pub use dispatch::{DispatchReport, Dispatcher, Instrument, Request};
pub use line::{LineBuffer, LineError, LINE_TERMINATOR, MAX_LINE_LEN};
pub use response::{
    LineResponses, ResponseError, ResponseLine, ResponseWriter, MAX_RESPONSES, MAX_RESPONSE_LEN,
};
pub use tree::{CommandSpec, CommandTree, ResolveError, Resolved, TreeBuilder, TreeError};
