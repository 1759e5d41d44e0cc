//! Canonical token-to-graph alignments.
//!
//! Whatever notation an alignment was written in, after normalization it is
//! an [`AlignmentRecord`]: a set of 0-indexed token positions linked to a set
//! of canonical node ids and edge ids.

use std::{cmp::Ordering, collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

use crate::{
    graph::Graph,
    id::{EdgeId, NodeId},
};

/// The notation an alignment was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Notation {
    /// `# ::alignments 0-1.1 1-1.1.r`
    Ldc,
    /// `# ::alignments 0-1|0.0` and `::node`/`::edge` span columns
    Jamr,
    /// `~e.N` markers inside the graph text
    Isi,
}

impl Notation {
    /// All notations, in sort order.
    pub const ALL: [Notation; 3] = [Notation::Ldc, Notation::Jamr, Notation::Isi];

    /// Index of the root's first segment in this notation's paths.
    ///
    /// JAMR paths are 0-indexed (`0.1` is the root's second child); LDC and
    /// ISI paths are 1-indexed.
    pub fn index_base(self) -> u32 {
        match self {
            Notation::Ldc | Notation::Isi => 1,
            Notation::Jamr => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Notation::Ldc => "ldc",
            Notation::Jamr => "jamr",
            Notation::Isi => "isi",
        }
    }
}

impl fmt::Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized alignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentRecord {
    #[serde(rename = "type")]
    notation: Notation,
    tokens: BTreeSet<usize>,
    #[serde(default)]
    nodes: BTreeSet<NodeId>,
    #[serde(default)]
    edges: BTreeSet<EdgeId>,
}

impl AlignmentRecord {
    pub fn new(
        notation: Notation,
        tokens: impl IntoIterator<Item = usize>,
        nodes: impl IntoIterator<Item = NodeId>,
        edges: impl IntoIterator<Item = EdgeId>,
    ) -> Self {
        Self {
            notation,
            tokens: tokens.into_iter().collect(),
            nodes: nodes.into_iter().collect(),
            edges: edges.into_iter().collect(),
        }
    }

    pub fn notation(&self) -> Notation {
        self.notation
    }

    /// Token positions, ascending.
    pub fn tokens(&self) -> &BTreeSet<usize> {
        &self.tokens
    }

    pub fn nodes(&self) -> &BTreeSet<NodeId> {
        &self.nodes
    }

    pub fn edges(&self) -> &BTreeSet<EdgeId> {
        &self.edges
    }

    /// Returns `true` if the record has no tokens or links to nothing.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty() || (self.nodes.is_empty() && self.edges.is_empty())
    }

    /// Returns `true` if both records point at exactly the same graph elements.
    pub fn same_targets(&self, other: &AlignmentRecord) -> bool {
        self.nodes == other.nodes && self.edges == other.edges
    }

    /// Unions `other` into this record. Nothing already present is replaced.
    pub fn merge(&mut self, other: &AlignmentRecord) {
        self.tokens.extend(other.tokens.iter().copied());
        self.nodes.extend(other.nodes.iter().cloned());
        self.edges.extend(other.edges.iter().cloned());
    }

    /// Drops node and edge ids that `graph` does not contain.
    pub fn restrict_to(&mut self, graph: &Graph) {
        self.nodes.retain(|id| graph.contains_node(id));
        self.edges.retain(|id| graph.contains_edge(id));
    }

    /// Formats the tokens in JAMR span syntax.
    ///
    /// A contiguous run is written `start-end` with an exclusive end, anything
    /// else as a comma list.
    pub fn jamr_span(&self) -> String {
        let (Some(&first), Some(&last)) = (self.tokens.first(), self.tokens.last()) else {
            return String::new();
        };
        let contiguous = last - first == self.tokens.len() - 1;
        match last.checked_add(1) {
            Some(end) if contiguous => format!("{first}-{end}"),
            _ => self
                .tokens
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Renders `tokens => targets` using the sentence tokens and graph labels.
    ///
    /// Token positions outside `sentence` are shown as `#N`.
    pub fn description(&self, graph: &Graph, sentence: &[String]) -> String {
        let tokens: Vec<String> = self
            .tokens
            .iter()
            .map(|&i| sentence.get(i).cloned().unwrap_or_else(|| format!("#{i}")))
            .collect();

        let label = |id: &NodeId| {
            graph
                .node(id)
                .map(|node| node.label().to_string())
                .unwrap_or_else(|| id.to_string())
        };

        let mut targets: Vec<String> = self.nodes.iter().map(label).collect();
        targets.extend(
            self.edges
                .iter()
                .map(|edge| format!("{} {} {}", label(edge.source()), edge.role(), label(edge.target()))),
        );

        format!("{} => {}", tokens.join(" "), targets.join(", "))
    }
}

impl Ord for AlignmentRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tokens
            .cmp(&other.tokens)
            .then_with(|| self.notation.cmp(&other.notation))
            .then_with(|| self.nodes.cmp(&other.nodes))
            .then_with(|| self.edges.cmp(&other.edges))
    }
}

impl PartialOrd for AlignmentRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
