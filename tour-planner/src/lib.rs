//! Tour planner.
//!
//! Plans the cheapest round trip from home that visits every relative
//! exactly once, over a declared network of transport links. The network
//! is first checked to be strongly connected, then searched exhaustively
//! with branch-and-bound pruning.

pub mod cache;
pub mod dataset;
pub mod domain;
pub mod graph;
pub mod planner;
pub mod web;
