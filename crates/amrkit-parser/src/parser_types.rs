//! Syntax tree produced by the graph parser.
//!
//! The tree mirrors the text: a node is `( variable / concept relations* )`
//! and a relation target is a nested node, a quoted string, or a bare symbol.
//! Whether a bare symbol is a re-entrant reference or a constant is decided
//! later by the graph builder, once every variable definition is known.

use crate::span::{Span, Spanned};

/// `( variable / concept relations* )`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSyntax<'src> {
    pub variable: Spanned<&'src str>,
    pub concept: Spanned<&'src str>,
    pub relations: Vec<Relation<'src>>,
    /// From `(` to `)`.
    pub span: Span,
}

/// `:role target`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation<'src> {
    pub role: Spanned<&'src str>,
    pub target: Target<'src>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target<'src> {
    Node(NodeSyntax<'src>),
    /// A quoted string, quotes included. Always a constant.
    String(Spanned<&'src str>),
    /// A bare symbol: a variable reference or a constant.
    Symbol(Spanned<&'src str>),
}

impl NodeSyntax<'_> {
    /// Number of nodes written with `( ... )` in this subtree, this one included.
    pub fn instance_count(&self) -> usize {
        1 + self
            .relations
            .iter()
            .map(|relation| match &relation.target {
                Target::Node(node) => node.instance_count(),
                Target::String(_) | Target::Symbol(_) => 0,
            })
            .sum::<usize>()
    }
}
