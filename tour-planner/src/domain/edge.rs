//! Declared transport links between locations.

use serde::{Deserialize, Serialize};

use super::{ModeId, NodeId};

/// Whether an edge may be travelled in both directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Navigable from either endpoint
    #[default]
    Bidirectional,
    /// Navigable only from `from` to `to`
    OneWay,
}

/// An edge as declared by the caller, before it is resolved against the
/// node set and mode catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub from: NodeId,
    pub to: NodeId,
    pub mode: String,

    /// Explicit direction; `None` falls back to the builder's default
    #[serde(default)]
    pub direction: Option<Direction>,
}

impl EdgeSpec {
    /// Declare an edge that uses the builder's default direction.
    pub fn new(from: usize, to: usize, mode: impl Into<String>) -> Self {
        Self {
            from: NodeId(from),
            to: NodeId(to),
            mode: mode.into(),
            direction: None,
        }
    }

    /// Declare an edge navigable only from `from` to `to`.
    pub fn one_way(from: usize, to: usize, mode: impl Into<String>) -> Self {
        Self {
            direction: Some(Direction::OneWay),
            ..Self::new(from, to, mode)
        }
    }

    /// Declare an edge navigable in both directions regardless of the
    /// builder's default.
    pub fn bidirectional(from: usize, to: usize, mode: impl Into<String>) -> Self {
        Self {
            direction: Some(Direction::Bidirectional),
            ..Self::new(from, to, mode)
        }
    }
}

/// Index of an edge within a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub usize);

/// A validated edge inside a graph.
///
/// The distance is derived from the endpoints' coordinates once, when the
/// graph is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub mode: ModeId,
    pub direction: Direction,
    pub distance_km: f64,
}

impl Edge {
    /// Returns true if the edge may be travelled from `a` to `b`.
    pub fn allows(&self, a: NodeId, b: NodeId) -> bool {
        (self.from == a && self.to == b)
            || (self.direction == Direction::Bidirectional && self.from == b && self.to == a)
    }

    /// Returns true if both endpoints are the same node.
    pub fn is_loop(&self) -> bool {
        self.from == self.to
    }
}
