//! The transport graph: construction and connectivity validation.
//!
//! Nodes and declared edges are assembled into an immutable [`Graph`] by
//! [`GraphBuilder`], then checked for strong connectivity before any tour
//! is searched for.

mod builder;
mod connectivity;
mod distance;

pub use builder::{Graph, GraphBuilder, Link, build};
pub use connectivity::{Components, ConnectivityError, strongly_connected_components, validate};
pub use distance::DistanceMethod;
