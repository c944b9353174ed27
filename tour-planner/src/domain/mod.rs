//! Domain types for the tour planner.
//!
//! This module contains the input records the planner works on: locations,
//! transport modes and the edges that connect locations. Range checks on
//! these records happen when they enter a graph, so code that receives a
//! built graph can trust them.

mod edge;
mod error;
mod mode;
mod node;

pub use edge::{Direction, Edge, EdgeId, EdgeSpec};
pub use error::ValidationError;
pub use mode::{ModeCatalog, ModeId, TransportMode};
pub use node::{Coordinates, Node, NodeId};
