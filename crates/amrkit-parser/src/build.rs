//! Arena form of a graph and its construction from the syntax tree.
//!
//! Nodes live in a flat table and refer to each other by index only, so a
//! re-entrant node is simply an index that appears as the target of more than
//! one edge. Both graph sources (text and `::node`/`::edge` metadata) produce
//! an [`Arena`]; the [`identify`](crate::identify) pass turns it into a
//! canonical [`Graph`](amrkit_core::graph::Graph).

use std::collections::{HashMap, hash_map::Entry};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    parser_types::{NodeSyntax, Target},
    span::{Span, Spanned},
};

/// A node of the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaNode {
    /// Name the node can be looked up by: the surface variable, or the
    /// declared id of a metadata node. Constants have none.
    pub alias: Option<String>,
    pub variable: String,
    /// `None` exactly for constants.
    pub concept: Option<String>,
    pub span: Span,
    /// Outgoing edges in textual order.
    pub children: Vec<ArenaEdge>,
}

/// An edge of the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaEdge {
    /// Role with its leading colon.
    pub role: String,
    pub target: usize,
    pub span: Span,
}

/// Index-addressed node table with a designated root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arena {
    nodes: Vec<ArenaNode>,
    root: usize,
}

impl Arena {
    /// Creates an arena. `root` must index into `nodes`.
    pub fn new(nodes: Vec<ArenaNode>, root: usize) -> Self {
        Self { nodes, root }
    }

    pub fn root(&self) -> usize {
        self.root
    }

    pub fn nodes(&self) -> &[ArenaNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&ArenaNode> {
        self.nodes.get(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// `b`, `c2`, `x10`: one ASCII lowercase letter, then digits.
pub fn is_variable_shape(symbol: &str) -> bool {
    let mut chars = symbol.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase()) && chars.all(|c| c.is_ascii_digit())
}

/// A child whose target is not known until every definition has been seen.
enum Slot<'src> {
    Node(usize),
    Symbol(Spanned<&'src str>),
}

struct PendingEdge<'src> {
    owner: usize,
    role: Spanned<&'src str>,
    slot: Slot<'src>,
}

struct ArenaBuilder<'src> {
    nodes: Vec<ArenaNode>,
    definitions: HashMap<&'src str, (usize, Span)>,
    pending: Vec<PendingEdge<'src>>,
    diagnostics: DiagnosticCollector,
}

impl<'src> ArenaBuilder<'src> {
    fn new() -> Self {
        Self {
            nodes: Vec::new(),
            definitions: HashMap::new(),
            pending: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    /// First pass: allocate every `( var / concept )` in preorder.
    fn define(&mut self, syntax: &NodeSyntax<'src>) -> usize {
        let index = self.nodes.len();
        let variable = *syntax.variable.inner();

        match self.definitions.entry(variable) {
            Entry::Occupied(first) => {
                self.diagnostics.emit(
                    Diagnostic::error(format!("variable `{variable}` is defined more than once"))
                        .with_code(ErrorCode::E104)
                        .with_label(syntax.variable.span(), "redefined here")
                        .with_secondary_label(first.get().1, "first defined here")
                        .with_help(format!(
                            "refer to the existing node by writing `{variable}` alone"
                        )),
                );
            }
            Entry::Vacant(slot) => {
                slot.insert((index, syntax.variable.span()));
            }
        }

        self.nodes.push(ArenaNode {
            alias: Some(variable.to_string()),
            variable: variable.to_string(),
            concept: Some(syntax.concept.inner().to_string()),
            span: syntax.span,
            children: Vec::new(),
        });

        for relation in &syntax.relations {
            let slot = match &relation.target {
                Target::Node(child) => Slot::Node(self.define(child)),
                Target::String(text) => Slot::Node(self.constant(*text)),
                Target::Symbol(symbol) => Slot::Symbol(*symbol),
            };
            self.pending.push(PendingEdge {
                owner: index,
                role: relation.role,
                slot,
            });
        }

        index
    }

    fn constant(&mut self, literal: Spanned<&str>) -> usize {
        self.nodes.push(ArenaNode {
            alias: None,
            variable: literal.inner().to_string(),
            concept: None,
            span: literal.span(),
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    /// Second pass: bare symbols become references or constants.
    fn link(&mut self) {
        for PendingEdge { owner, role, slot } in std::mem::take(&mut self.pending) {
            let target = match slot {
                Slot::Node(index) => index,
                Slot::Symbol(symbol) => match self.resolve(symbol) {
                    Some(index) => index,
                    None => continue,
                },
            };
            let span = role.span().union(self.nodes[target].span);
            self.nodes[owner].children.push(ArenaEdge {
                role: role.inner().to_string(),
                target,
                span,
            });
        }
    }

    fn resolve(&mut self, symbol: Spanned<&str>) -> Option<usize> {
        let name = *symbol.inner();
        if let Some((index, _)) = self.definitions.get(name) {
            return Some(*index);
        }
        if is_variable_shape(name) {
            self.diagnostics.emit(
                Diagnostic::error(format!("variable `{name}` is never defined"))
                    .with_code(ErrorCode::E103)
                    .with_label(symbol.span(), "undefined variable")
                    .with_help(format!("define it somewhere in the graph as `({name} / concept)`")),
            );
            return None;
        }
        Some(self.constant(symbol))
    }
}

/// Builds the arena of a parsed text graph.
///
/// # Errors
///
/// Returns every duplicate definition (E104) and undefined variable (E103).
pub fn build_arena(root: &NodeSyntax<'_>) -> Result<Arena, ParseError> {
    let mut builder = ArenaBuilder::new();
    let root_index = builder.define(root);
    builder.link();

    let ArenaBuilder {
        nodes, diagnostics, ..
    } = builder;
    diagnostics.finish()?;
    Ok(Arena::new(nodes, root_index))
}
