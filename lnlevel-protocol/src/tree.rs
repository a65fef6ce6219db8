//! Command tree (hierarchical command namespace)
//!
//! Nodes live in a fixed-capacity arena with parent links. Each node can
//! carry one "set" binding and one "query" binding, so `:LEVel:SETup:FULL`
//! and `:LEVel:SETup:FULL?` share a node but map to different handlers.
//!
//! Trees are assembled once with a [`TreeBuilder`] (or declaratively with
//! [`CommandTree::from_table`]). The builder's base path only affects
//! registrations made through it; a built tree always resolves from the root.

use heapless::Vec;

use crate::mnemonic;

/// Maximum number of nodes in a tree
pub const MAX_NODES: usize = 32;

/// Maximum number of segments in a path
pub const MAX_DEPTH: usize = 8;

/// Separator between path segments
pub const PATH_SEPARATOR: char = ':';

/// Suffix marking a query path
pub const QUERY_MARKER: char = '?';

/// Prefix of IEEE 488.2 common commands (`*IDN?`), always rooted
pub const COMMON_PREFIX: char = '*';

/// Errors while building a tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TreeError {
    /// Node arena is full
    TooManyNodes,
    /// Path has more than [`MAX_DEPTH`] segments
    PathTooDeep,
    /// Path contains an empty segment (`:A::B`) or is empty
    EmptySegment,
    /// A binding of the same kind already exists at this path
    DuplicateBinding,
}

/// Errors while resolving an input path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResolveError {
    /// No node or binding matches the path
    NotFound,
    /// Path has more than [`MAX_DEPTH`] segments
    PathTooDeep,
}

/// A declarative (path, handler) table entry
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec<H> {
    /// Full path, e.g. `:LEVel:SETup:EMPty?`
    pub path: &'static str,
    /// Handler bound at that path
    pub handler: H,
}

impl<H> CommandSpec<H> {
    /// Create a table entry
    pub const fn new(path: &'static str, handler: H) -> Self {
        Self { path, handler }
    }
}

/// Result of resolving a path
#[derive(Debug, Clone)]
pub struct Resolved<H> {
    /// Bound handler
    pub handler: H,
    /// Canonical mnemonics of the matched nodes, root first
    pub path: Vec<&'static str, MAX_DEPTH>,
}

#[derive(Debug, Clone)]
struct Node<H> {
    mnemonic: &'static str,
    /// Index of the parent node, `None` for children of the root
    parent: Option<u8>,
    set: Option<H>,
    query: Option<H>,
}

/// Split a path into segments, reporting whether it was rooted
fn segments(path: &str) -> (bool, core::str::Split<'_, char>) {
    match path.strip_prefix(PATH_SEPARATOR) {
        Some(rest) => (true, rest.split(PATH_SEPARATOR)),
        None => (path.starts_with(COMMON_PREFIX), path.split(PATH_SEPARATOR)),
    }
}

/// Incremental tree builder
#[derive(Debug, Clone)]
pub struct TreeBuilder<H> {
    nodes: Vec<Node<H>, MAX_NODES>,
    base: Vec<&'static str, MAX_DEPTH>,
}

impl<H: Copy> Default for TreeBuilder<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Copy> TreeBuilder<H> {
    /// Create an empty builder with the root as base
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            base: Vec::new(),
        }
    }

    /// Set the prefix for subsequent relative registrations
    ///
    /// An empty path (or `:`) resets the base to the root.
    pub fn set_base(&mut self, path: &'static str) -> Result<(), TreeError> {
        self.base.clear();
        let (_, parts) = segments(path);
        for segment in parts {
            if segment.is_empty() {
                if path.trim_start_matches(PATH_SEPARATOR).is_empty() {
                    break;
                }
                return Err(TreeError::EmptySegment);
            }
            self.base.push(segment).map_err(|_| TreeError::PathTooDeep)?;
        }
        Ok(())
    }

    /// Bind `handler` at `base + path`
    ///
    /// Rooted paths (leading `:` or a `*` common command) ignore the base.
    /// A trailing `?` binds the query form.
    pub fn register(&mut self, path: &'static str, handler: H) -> Result<(), TreeError> {
        let (is_query, path) = match path.strip_suffix(QUERY_MARKER) {
            Some(stripped) => (true, stripped),
            None => (false, path),
        };

        let (rooted, parts) = segments(path);
        let mut current: Option<u8> = None;
        let mut depth = 0;

        if !rooted {
            let base = self.base.clone();
            for segment in base {
                current = Some(self.child_or_insert(current, segment)?);
                depth += 1;
            }
        }

        for segment in parts {
            if segment.is_empty() {
                return Err(TreeError::EmptySegment);
            }
            depth += 1;
            if depth > MAX_DEPTH {
                return Err(TreeError::PathTooDeep);
            }
            current = Some(self.child_or_insert(current, segment)?);
        }

        // A bare base with an empty path would bind the root
        let index = current.ok_or(TreeError::EmptySegment)? as usize;
        let node = &mut self.nodes[index];
        let slot = if is_query { &mut node.query } else { &mut node.set };
        if slot.is_some() {
            return Err(TreeError::DuplicateBinding);
        }
        *slot = Some(handler);

        Ok(())
    }

    /// Freeze the tree
    pub fn build(self) -> CommandTree<H> {
        CommandTree { nodes: self.nodes }
    }

    fn child_or_insert(
        &mut self,
        parent: Option<u8>,
        mnemonic: &'static str,
    ) -> Result<u8, TreeError> {
        if let Some(index) = self
            .nodes
            .iter()
            .position(|n| n.parent == parent && mnemonic::same_node(n.mnemonic, mnemonic))
        {
            return Ok(index as u8);
        }

        let index = self.nodes.len() as u8;
        self.nodes
            .push(Node {
                mnemonic,
                parent,
                set: None,
                query: None,
            })
            .map_err(|_| TreeError::TooManyNodes)?;
        Ok(index)
    }
}

/// A built, immutable command tree
#[derive(Debug, Clone)]
pub struct CommandTree<H> {
    nodes: Vec<Node<H>, MAX_NODES>,
}

impl<H: Copy> CommandTree<H> {
    /// Build a tree from a declarative table of full paths
    pub fn from_table(table: &[CommandSpec<H>]) -> Result<Self, TreeError> {
        let mut builder = TreeBuilder::new();
        for spec in table {
            builder.register(spec.path, spec.handler)?;
        }
        Ok(builder.build())
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if nothing has been registered
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Resolve an input path (without the `?` marker) to a handler
    ///
    /// Every segment is matched with the abbreviation rule. The leading `:`
    /// is optional; resolution always starts at the root.
    pub fn resolve(&self, path: &str, is_query: bool) -> Result<Resolved<H>, ResolveError> {
        let (_, parts) = segments(path);
        let mut current: Option<u8> = None;
        let mut matched = Vec::<&'static str, MAX_DEPTH>::new();

        for token in parts {
            let index = self
                .nodes
                .iter()
                .position(|n| n.parent == current && mnemonic::matches(n.mnemonic, token))
                .ok_or(ResolveError::NotFound)?;
            matched
                .push(self.nodes[index].mnemonic)
                .map_err(|_| ResolveError::PathTooDeep)?;
            current = Some(index as u8);
        }

        let node = &self.nodes[current.ok_or(ResolveError::NotFound)? as usize];
        let handler = if is_query { node.query } else { node.set };

        handler
            .map(|handler| Resolved {
                handler,
                path: matched,
            })
            .ok_or(ResolveError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Cmd {
        LevelMeasure,
        EmptySet,
        EmptyQuery,
        Identify,
    }

    fn tree() -> CommandTree<Cmd> {
        CommandTree::from_table(&[
            CommandSpec::new(":LEVel:MEASure?", Cmd::LevelMeasure),
            CommandSpec::new(":LEVel:SETup:EMPty", Cmd::EmptySet),
            CommandSpec::new(":LEVel:SETup:EMPty?", Cmd::EmptyQuery),
            CommandSpec::new("*IDN?", Cmd::Identify),
        ])
        .unwrap()
    }

    #[test]
    fn test_resolve_full_and_short_forms() {
        let tree = tree();
        let full = tree.resolve(":LEVel:MEASure", true).unwrap();
        let short = tree.resolve(":LEV:MEAS", true).unwrap();
        assert_eq!(full.handler, Cmd::LevelMeasure);
        assert_eq!(short.handler, Cmd::LevelMeasure);
        assert_eq!(short.path.as_slice(), &["LEVel", "MEASure"]);
    }

    #[test]
    fn test_resolve_case_insensitive() {
        let tree = tree();
        assert_eq!(tree.resolve(":level:measure", true).unwrap().handler, Cmd::LevelMeasure);
        assert_eq!(tree.resolve("lev:meas", true).unwrap().handler, Cmd::LevelMeasure);
    }

    #[test]
    fn test_resolve_too_short() {
        let tree = tree();
        assert_eq!(tree.resolve(":LE:MEAS", true).unwrap_err(), ResolveError::NotFound);
    }

    #[test]
    fn test_set_and_query_are_distinct() {
        let tree = tree();
        assert_eq!(tree.resolve(":LEV:SET:EMP", false).unwrap().handler, Cmd::EmptySet);
        assert_eq!(tree.resolve(":LEV:SET:EMP", true).unwrap().handler, Cmd::EmptyQuery);
        // Only a query form exists for MEASure
        assert_eq!(tree.resolve(":LEV:MEAS", false).unwrap_err(), ResolveError::NotFound);
    }

    #[test]
    fn test_intermediate_node_has_no_binding() {
        let tree = tree();
        assert_eq!(tree.resolve(":LEV:SET", true).unwrap_err(), ResolveError::NotFound);
        assert_eq!(tree.resolve(":LEV", false).unwrap_err(), ResolveError::NotFound);
    }

    #[test]
    fn test_common_command() {
        let tree = tree();
        assert_eq!(tree.resolve("*idn", true).unwrap().handler, Cmd::Identify);
    }

    #[test]
    fn test_empty_segment_is_not_found() {
        let tree = tree();
        assert!(tree.resolve(":LEV::MEAS", true).is_err());
        assert!(tree.resolve("", true).is_err());
    }

    #[test]
    fn test_builder_base_applies_to_later_registrations_only() {
        let mut builder = TreeBuilder::new();
        builder.register(":LEVel:MEASure?", Cmd::LevelMeasure).unwrap();
        builder.set_base(":LEVel:SETup").unwrap();
        builder.register("EMPty", Cmd::EmptySet).unwrap();
        builder.register("EMPty?", Cmd::EmptyQuery).unwrap();
        builder.register("*IDN?", Cmd::Identify).unwrap();
        let tree = builder.build();

        assert_eq!(tree.resolve(":LEV:SET:EMP", false).unwrap().handler, Cmd::EmptySet);
        assert_eq!(tree.resolve(":LEV:SET:EMP", true).unwrap().handler, Cmd::EmptyQuery);
        assert_eq!(tree.resolve("*IDN", true).unwrap().handler, Cmd::Identify);
        // The base never leaks into resolution
        assert!(tree.resolve("EMP", true).is_err());
        // Shared prefix nodes are reused
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_duplicate_binding_rejected() {
        let mut builder = TreeBuilder::new();
        builder.register(":LEVel:MEASure?", Cmd::LevelMeasure).unwrap();
        assert_eq!(
            builder.register(":LEVEL:MEASURE?", Cmd::Identify),
            Err(TreeError::DuplicateBinding)
        );
    }

    #[test]
    fn test_empty_segment_rejected() {
        let mut builder = TreeBuilder::<Cmd>::new();
        assert_eq!(
            builder.register(":LEVel::MEASure?", Cmd::LevelMeasure),
            Err(TreeError::EmptySegment)
        );
    }
}
