//! Canonical AMR graph model.
//!
//! A [`Graph`] is an immutable, arena-style structure: nodes and edges live in
//! ordered tables keyed by their canonical ids, and the only cross references
//! are ids. Re-entrancy is therefore just two edges sharing a target id.
//!
//! Graphs are assembled with a [`GraphBuilder`], which checks the structural
//! invariants in [`GraphBuilder::build`]:
//! - the root node exists;
//! - every edge endpoint exists;
//! - every node is reachable from the root.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::id::{EdgeId, NodeId};

/// A node of an AMR graph.
///
/// For instance nodes `variable` is the surface variable and `concept` is set.
/// Constants (`"York"`, `-`, `5`) keep their literal text in `variable` and
/// have no concept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    id: NodeId,
    variable: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    concept: Option<String>,
}

impl Node {
    /// Create an instance node with a concept.
    pub fn new(id: NodeId, variable: impl Into<String>, concept: impl Into<String>) -> Self {
        Self {
            id,
            variable: variable.into(),
            concept: Some(concept.into()),
        }
    }

    /// Create a constant node. The literal is kept verbatim, quotes included.
    pub fn constant(id: NodeId, literal: impl Into<String>) -> Self {
        Self {
            id,
            variable: literal.into(),
            concept: None,
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn concept(&self) -> Option<&str> {
        self.concept.as_deref()
    }

    pub fn is_constant(&self) -> bool {
        self.concept.is_none()
    }

    /// The text shown for this node: its concept, or the literal for constants.
    pub fn label(&self) -> &str {
        self.concept.as_deref().unwrap_or(&self.variable)
    }
}

/// A directed, labelled edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Edge {
    id: EdgeId,
}

impl Edge {
    pub fn new(id: EdgeId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> &EdgeId {
        &self.id
    }

    pub fn source(&self) -> &NodeId {
        self.id.source()
    }

    pub fn role(&self) -> &str {
        self.id.role()
    }

    pub fn target(&self) -> &NodeId {
        self.id.target()
    }
}

/// Structural violations detected while assembling a [`Graph`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("node `{0}` is defined more than once")]
    DuplicateNode(NodeId),

    #[error("root node `{0}` does not exist")]
    MissingRoot(NodeId),

    #[error("edge `{0}` references a node that does not exist")]
    DanglingEdge(EdgeId),

    #[error("node `{0}` is not reachable from the root")]
    Unreachable(NodeId),
}

// =============================================================================
// Graph
// =============================================================================

/// An immutable AMR graph with canonical ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    root: NodeId,
    nodes: IndexMap<NodeId, Node>,
    edges: IndexMap<EdgeId, Edge>,
    /// Positional children. A repeated triple occupies every position it was
    /// written at, so the same id may appear more than once.
    outgoing: HashMap<NodeId, Vec<EdgeId>>,
    aliases: HashMap<String, NodeId>,
}

impl Graph {
    pub fn root(&self) -> &NodeId {
        &self.root
    }

    /// Returns the root node.
    pub fn root_node(&self) -> &Node {
        // `GraphBuilder::build` guarantees the root exists.
        &self.nodes[&self.root]
    }

    /// Nodes in id-assignment (preorder) order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Edges in source order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn contains_edge(&self, id: &EdgeId) -> bool {
        self.edges.contains_key(id)
    }

    /// Outgoing edges of `id` in textual order.
    pub fn outgoing(&self, id: &NodeId) -> impl Iterator<Item = &Edge> {
        self.outgoing
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|edge_id| self.edges.get(edge_id))
    }

    /// Returns the edge at 1-indexed child `position` of `id`.
    pub fn child_edge(&self, id: &NodeId, position: usize) -> Option<&Edge> {
        let index = position.checked_sub(1)?;
        let edge_id = self.outgoing.get(id)?.get(index)?;
        self.edges.get(edge_id)
    }

    /// Incoming edges of `id` in source order.
    pub fn incoming<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.values().filter(move |edge| edge.target() == id)
    }

    /// Resolves a surface variable or declared metadata id to a node id.
    pub fn lookup_alias(&self, alias: &str) -> Option<&NodeId> {
        self.aliases.get(alias)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false` for a built graph; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns a copy without the edges labelled `role`.
    ///
    /// Constant targets left without any incoming edge are removed as well.
    /// Every remaining node keeps its id, so ids may have gaps afterwards.
    pub fn without_role(&self, role: &str) -> Graph {
        let dropped: Vec<&EdgeId> = self
            .edges
            .keys()
            .filter(|edge| edge.role() == role)
            .collect();
        if dropped.is_empty() {
            return self.clone();
        }

        let orphans: HashSet<&NodeId> = dropped
            .iter()
            .map(|edge| edge.target())
            .filter(|target| {
                self.nodes.get(*target).is_some_and(Node::is_constant)
                    && self
                        .edges
                        .keys()
                        .all(|edge| edge.target() != *target || edge.role() == role)
            })
            .collect();

        let mut outgoing = self.outgoing.clone();
        for children in outgoing.values_mut() {
            children.retain(|edge| edge.role() != role);
        }

        Graph {
            root: self.root.clone(),
            nodes: self
                .nodes
                .iter()
                .filter(|(id, _)| !orphans.contains(id))
                .map(|(id, node)| (id.clone(), node.clone()))
                .collect(),
            edges: self
                .edges
                .iter()
                .filter(|(id, _)| id.role() != role)
                .map(|(id, edge)| (id.clone(), edge.clone()))
                .collect(),
            outgoing,
            aliases: self
                .aliases
                .iter()
                .filter(|(_, id)| !orphans.contains(id))
                .map(|(alias, id)| (alias.clone(), id.clone()))
                .collect(),
        }
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Assembles a [`Graph`] and validates it once complete.
#[derive(Debug)]
pub struct GraphBuilder {
    root: NodeId,
    nodes: IndexMap<NodeId, Node>,
    edges: IndexMap<EdgeId, Edge>,
    outgoing: HashMap<NodeId, Vec<EdgeId>>,
    aliases: HashMap<String, NodeId>,
}

impl GraphBuilder {
    pub fn new(root: NodeId) -> Self {
        Self {
            root,
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
            outgoing: HashMap::new(),
            aliases: HashMap::new(),
        }
    }

    /// Adds a node.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateNode`] if a node with the same id was
    /// already added.
    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.nodes.contains_key(node.id()) {
            return Err(GraphError::DuplicateNode(node.id().clone()));
        }
        self.nodes.insert(node.id().clone(), node);
        Ok(())
    }

    /// Appends an edge as the next positional child of its source.
    ///
    /// Returns `false` when the triple already exists; the position is still
    /// recorded but the edge table keeps the first occurrence.
    pub fn add_edge(&mut self, id: EdgeId) -> bool {
        self.outgoing
            .entry(id.source().clone())
            .or_default()
            .push(id.clone());

        if self.edges.contains_key(&id) {
            return false;
        }
        self.edges.insert(id.clone(), Edge::new(id));
        true
    }

    /// Registers an alias; the first registration of a name wins.
    pub fn add_alias(&mut self, alias: impl Into<String>, id: NodeId) {
        self.aliases.entry(alias.into()).or_insert(id);
    }

    /// Validates the collected nodes and edges and produces the graph.
    ///
    /// # Errors
    ///
    /// Returns the first structural violation found.
    pub fn build(self) -> Result<Graph, GraphError> {
        if !self.nodes.contains_key(&self.root) {
            return Err(GraphError::MissingRoot(self.root));
        }

        if let Some(edge) = self.edges.keys().find(|edge| {
            !self.nodes.contains_key(edge.source()) || !self.nodes.contains_key(edge.target())
        }) {
            return Err(GraphError::DanglingEdge(edge.clone()));
        }

        let mut visited: HashSet<&NodeId> = HashSet::new();
        let mut stack = vec![&self.root];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            if let Some(children) = self.outgoing.get(id) {
                stack.extend(children.iter().map(EdgeId::target));
            }
        }

        if let Some(unreachable) = self.nodes.keys().find(|id| !visited.contains(id)) {
            return Err(GraphError::Unreachable(unreachable.clone()));
        }

        Ok(Graph {
            root: self.root,
            nodes: self.nodes,
            edges: self.edges,
            outgoing: self.outgoing,
            aliases: self.aliases,
        })
    }
}
