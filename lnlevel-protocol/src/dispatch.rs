//! Line dispatcher
//!
//! Runs every invocation of a line to completion, left to right, so
//! responses come out in invocation order. Invocations that fail to parse
//! or resolve are dropped without writing anything; the returned
//! [`DispatchReport`] is the only trace of them.

use heapless::Vec;

use crate::command::{split_invocations, Invocation, Params};
use crate::response::ResponseWriter;
use crate::tree::{CommandTree, MAX_DEPTH};

/// Structured request handed to an instrument
#[derive(Debug, Clone)]
pub struct Request<'a> {
    /// Canonical mnemonics of the resolved path, root first
    pub path: Vec<&'static str, MAX_DEPTH>,
    /// Whether the invocation was a query
    pub is_query: bool,
    /// Parameters in order
    pub params: Params<'a>,
}

/// Something that executes resolved commands
///
/// `Command` is whatever the instrument binds in its command tree,
/// typically a fieldless enum.
pub trait Instrument {
    /// Handler identifier stored in the tree
    type Command: Copy;
    /// Handler failure
    type Error: Copy;

    /// Execute one resolved command, writing at most one response line
    fn execute<W: ResponseWriter>(
        &mut self,
        command: Self::Command,
        request: &Request<'_>,
        out: &mut W,
    ) -> Result<(), Self::Error>;
}

/// Summary of one processed line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DispatchReport<E> {
    /// Invocations that reached a handler
    pub executed: u8,
    /// Invocations whose path matched nothing
    pub unresolved: u8,
    /// Invocations that could not be parsed
    pub malformed: u8,
    /// Handlers that returned an error
    pub failed: u8,
    /// Most recent handler error
    pub last_error: Option<E>,
}

impl<E> Default for DispatchReport<E> {
    fn default() -> Self {
        Self {
            executed: 0,
            unresolved: 0,
            malformed: 0,
            failed: 0,
            last_error: None,
        }
    }
}

impl<E> DispatchReport<E> {
    /// True when every invocation resolved and succeeded
    pub fn is_clean(&self) -> bool {
        self.unresolved == 0 && self.malformed == 0 && self.failed == 0
    }
}

/// Routes lines through a command tree to an instrument
#[derive(Debug, Clone)]
pub struct Dispatcher<C> {
    tree: CommandTree<C>,
}

impl<C: Copy> Dispatcher<C> {
    /// Create a dispatcher over a built tree
    pub fn new(tree: CommandTree<C>) -> Self {
        Self { tree }
    }

    /// Process one complete input line (without terminator)
    pub fn process_line<I, W>(
        &self,
        line: &str,
        instrument: &mut I,
        out: &mut W,
    ) -> DispatchReport<I::Error>
    where
        I: Instrument<Command = C>,
        W: ResponseWriter,
    {
        let mut report = DispatchReport::default();

        for text in split_invocations(line) {
            let invocation = match Invocation::parse(text) {
                Ok(invocation) => invocation,
                Err(_) => {
                    report.malformed = report.malformed.saturating_add(1);
                    continue;
                }
            };

            let resolved = match self.tree.resolve(invocation.path, invocation.is_query) {
                Ok(resolved) => resolved,
                Err(_) => {
                    report.unresolved = report.unresolved.saturating_add(1);
                    continue;
                }
            };

            let request = Request {
                path: resolved.path,
                is_query: invocation.is_query,
                params: invocation.params,
            };

            report.executed = report.executed.saturating_add(1);
            if let Err(e) = instrument.execute(resolved.handler, &request, out) {
                report.failed = report.failed.saturating_add(1);
                report.last_error = Some(e);
            }
        }

        report
    }
}
