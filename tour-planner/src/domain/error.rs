//! Domain error types.
//!
//! These errors represent malformed planner input: a graph that references
//! nodes or modes that do not exist, or records whose values are out of
//! range. They are always a caller bug and are raised before any route
//! computation starts.

use super::NodeId;

/// Construction-time failures for nodes, modes and edges.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Node 0 (the tour's start and end point) was not supplied
    #[error("home node 0 is missing")]
    MissingHome,

    /// Two nodes share an identifier
    #[error("node {0} is declared more than once")]
    DuplicateNode(NodeId),

    /// Node identifiers must be the contiguous range `0..count`
    #[error("node {id} is out of range: identifiers must be 0..{count}")]
    NodeIdOutOfRange { id: NodeId, count: usize },

    /// Latitude or longitude is not a finite value within range
    #[error("node {node} has invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinates {
        node: NodeId,
        latitude: f64,
        longitude: f64,
    },

    /// An edge references a node that was not declared
    #[error("edge {edge} references unknown node {node}")]
    UnknownNode { edge: usize, node: NodeId },

    /// An edge references a mode missing from the catalog
    #[error("edge {edge} references unknown transport mode {mode:?}")]
    UnknownMode { edge: usize, mode: String },

    /// Two modes share a name
    #[error("transport mode {0:?} is declared more than once")]
    DuplicateMode(String),

    /// A mode attribute is out of range
    #[error("transport mode {mode:?} is invalid: {reason}")]
    InvalidMode { mode: String, reason: &'static str },
}
