//! Tour planning.
//!
//! Given a validated [`Graph`](crate::graph::Graph), finds the closed tour
//! from home that visits every other node exactly once and minimises the
//! configured objective. Costs are computed by [`CostModel`], the search
//! itself is [`RouteOptimizer`], and [`Planner`] ties connectivity
//! validation and optimization together.

mod config;
mod cost;
mod result;
mod search;
mod session;

pub use config::{InvalidObjective, Objective, PlannerConfig, TieBreak};
pub use cost::{CostModel, LegCost};
pub use result::{RouteLeg, RouteResult, SearchStats, Stop};
pub use search::{NoSolutionError, OptimizeError, RouteOptimizer, SearchTimeout};
pub use session::{PlanError, Planner, graph_builder, plan_tour};
