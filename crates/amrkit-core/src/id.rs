//! Canonical identifiers for AMR nodes and edges.
//!
//! Every node of a parsed AMR is addressed by its position in the graph: the
//! root is `1` and the n-th child of node `X` (counting roles left to right,
//! starting at 1) is `X.n`. Edges are addressed by the triple of their source
//! id, role, and target id.
//!
//! These ids are the join key between graphs and alignments, and they are the
//! only id a presentation layer should use as a styling hook.
//!
//! # Example
//!
//! ```
//! # use amrkit_core::id::{EdgeId, NodeId};
//! let root = NodeId::root();
//! let dog = root.child(1);
//! assert_eq!(dog.to_string(), "1.1");
//!
//! let edge = EdgeId::new(root, ":ARG0", dog);
//! assert_eq!(edge.to_string(), "1 :ARG0 1.1");
//! ```

use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

/// Error returned when a string is not a valid dotted node id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeIdParseError {
    #[error("node id is empty")]
    Empty,

    #[error("node id `{0}` has an empty segment")]
    EmptySegment(String),

    #[error("node id `{0}` has a segment that is not a positive integer")]
    InvalidSegment(String),

    #[error("node id `{0}` does not start at the root `1`")]
    NotRooted(String),
}

/// Positional identifier of a node.
///
/// Ordering is numeric segment by segment, so `1.2` sorts before `1.10`
/// and a parent sorts before its descendants.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(Vec<u32>);

impl NodeId {
    /// The id of the root node, `1`.
    pub fn root() -> Self {
        Self(vec![1])
    }

    /// Returns the id of the `position`-th child of this node (1-indexed).
    pub fn child(&self, position: u32) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(position);
        Self(segments)
    }

    /// Returns the id of the parent position, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.0.len() <= 1 {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Number of segments; the root has depth 1.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for the root id.
    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }

    /// The raw segments of this id.
    pub fn segments(&self) -> &[u32] {
        &self.0
    }
}

impl Ord for NodeId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for NodeId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for NodeId {
    type Err = NodeIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(NodeIdParseError::Empty);
        }

        let mut segments = Vec::new();
        for part in s.split('.') {
            if part.is_empty() {
                return Err(NodeIdParseError::EmptySegment(s.to_string()));
            }
            if !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(NodeIdParseError::InvalidSegment(s.to_string()));
            }
            let value: u32 = part
                .parse()
                .map_err(|_| NodeIdParseError::InvalidSegment(s.to_string()))?;
            if value == 0 {
                return Err(NodeIdParseError::InvalidSegment(s.to_string()));
            }
            segments.push(value);
        }

        if segments[0] != 1 {
            return Err(NodeIdParseError::NotRooted(s.to_string()));
        }

        Ok(Self(segments))
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Identifier of an edge: `(source, role, target)`.
///
/// The role always carries its leading colon (`:ARG0`). Two edges with the
/// same triple are the same edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId {
    source: NodeId,
    role: String,
    target: NodeId,
}

impl EdgeId {
    /// Create an edge id. A role given without a leading `:` gets one.
    pub fn new(source: NodeId, role: impl Into<String>, target: NodeId) -> Self {
        let role = role.into();
        let role = if role.starts_with(':') {
            role
        } else {
            format!(":{role}")
        };
        Self {
            source,
            role,
            target,
        }
    }

    /// Id of the source node.
    pub fn source(&self) -> &NodeId {
        &self.source
    }

    /// The relation label, including the leading `:`.
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Id of the target node.
    pub fn target(&self) -> &NodeId {
        &self.target
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.source, self.role, self.target)
    }
}

impl Serialize for EdgeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (
            self.source.to_string(),
            self.role.as_str(),
            self.target.to_string(),
        )
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EdgeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (source, role, target) = <(String, String, String)>::deserialize(deserializer)?;
        let source = source.parse().map_err(de::Error::custom)?;
        let target = target.parse().map_err(de::Error::custom)?;
        Ok(Self::new(source, role, target))
    }
}
