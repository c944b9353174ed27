//! A planning session: validate a graph, then optimize a tour over it.

use tracing::{info, instrument};

use crate::domain::{EdgeSpec, ModeCatalog, Node, ValidationError};
use crate::graph::{self, ConnectivityError, Graph, GraphBuilder};

use super::config::{InvalidObjective, PlannerConfig};
use super::result::RouteResult;
use super::search::{NoSolutionError, OptimizeError, RouteOptimizer, SearchTimeout};

/// Any failure of a planning session.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Objective(#[from] InvalidObjective),

    #[error(transparent)]
    Connectivity(#[from] ConnectivityError),

    #[error(transparent)]
    NoSolution(#[from] NoSolutionError),

    #[error(transparent)]
    Timeout(#[from] SearchTimeout),

    /// The search task panicked or was cancelled before finishing.
    #[error("planning aborted: {0}")]
    Aborted(String),
}

impl From<OptimizeError> for PlanError {
    fn from(err: OptimizeError) -> Self {
        match err {
            OptimizeError::Objective(e) => PlanError::Objective(e),
            OptimizeError::NoSolution(e) => PlanError::NoSolution(e),
            OptimizeError::Timeout(e) => PlanError::Timeout(e),
        }
    }
}

/// A graph builder carrying the direction and distance settings of
/// `config`.
pub fn graph_builder(modes: ModeCatalog, config: &PlannerConfig) -> GraphBuilder {
    GraphBuilder::new(modes)
        .default_direction(config.default_direction)
        .distance_method(config.distance_method)
}

/// Plans tours over one graph.
pub struct Planner<'a> {
    graph: &'a Graph,
    config: &'a PlannerConfig,
}

impl<'a> Planner<'a> {
    /// Create a new planner.
    pub fn new(graph: &'a Graph, config: &'a PlannerConfig) -> Self {
        Self { graph, config }
    }

    /// Check that every node can reach and be reached from home.
    pub fn validate(&self) -> Result<(), ConnectivityError> {
        graph::validate(self.graph)
    }

    /// Search for the best tour without checking connectivity first.
    pub fn optimize(&self) -> Result<RouteResult, OptimizeError> {
        RouteOptimizer::new(self.graph, self.config).optimize()
    }

    /// Validate connectivity, then optimize.
    ///
    /// The search is never started for a graph that fails validation.
    #[instrument(skip_all, fields(nodes = self.graph.node_count(), objective = %self.config.objective))]
    pub fn plan(&self) -> Result<RouteResult, PlanError> {
        self.validate()?;
        let result = self.optimize()?;

        info!(
            stops = result.stops().len(),
            total_time_min = result.total_time_min(),
            total_cost = result.total_cost(),
            "tour planned"
        );

        Ok(result)
    }
}

/// Build a graph from declarations and plan a tour over it in one call.
pub fn plan_tour(
    nodes: Vec<Node>,
    edges: Vec<EdgeSpec>,
    modes: ModeCatalog,
    config: &PlannerConfig,
) -> Result<RouteResult, PlanError> {
    let graph = graph_builder(modes, config)
        .nodes(nodes)
        .edges(edges)
        .build()?;

    Planner::new(&graph, config).plan()
}
