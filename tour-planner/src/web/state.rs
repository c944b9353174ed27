//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::CachedPlanner;
use crate::dataset::Relatives;
use crate::graph::Graph;
use crate::planner::PlannerConfig;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Transport network the tours are planned over
    pub graph: Arc<Graph>,

    /// Relatives behind nodes 1..=n
    pub relatives: Arc<Relatives>,

    /// Default planner configuration
    pub config: Arc<PlannerConfig>,

    /// Planner with route cache
    pub planner: Arc<CachedPlanner>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        graph: Graph,
        relatives: Relatives,
        config: PlannerConfig,
        planner: CachedPlanner,
    ) -> Self {
        Self {
            graph: Arc::new(graph),
            relatives: Arc::new(relatives),
            config: Arc::new(config),
            planner: Arc::new(planner),
        }
    }
}
