//! Caching layer for planned tours.
//!
//! A search over a graph is deterministic for a given objective and
//! tie-break, so its result can be reused until the graph changes. Graphs
//! are identified by their fingerprint, which covers nodes, edges, modes
//! and the distance method.
//!
//! Only successful plans are cached. Errors are returned to the caller and
//! the next request searches again.
//!
//! Searches run on tokio's blocking pool so a long search never holds an
//! async worker.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::{debug, error};

use crate::graph::Graph;
use crate::planner::{Objective, PlanError, Planner, PlannerConfig, RouteResult, TieBreak};

/// Hashable form of an objective: label plus weight bits.
type ObjectiveKey = (&'static str, u64, u64);

/// Cache key for tours: (graph fingerprint, objective, tie-break).
type RouteKey = (u64, ObjectiveKey, TieBreak);

/// Cached tour entry.
type RouteEntry = Arc<RouteResult>;

fn objective_key(objective: Objective) -> ObjectiveKey {
    match objective {
        Objective::Weighted {
            time_weight,
            cost_weight,
        } => (objective.label(), time_weight.to_bits(), cost_weight.to_bits()),
        other => (other.label(), 0, 0),
    }
}

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(600),
            max_capacity: 256,
        }
    }
}

/// Cache of planned tours.
pub struct RouteCache {
    routes: MokaCache<RouteKey, RouteEntry>,
}

impl RouteCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let routes = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { routes }
    }

    fn key(graph: &Graph, config: &PlannerConfig) -> RouteKey {
        (
            graph.fingerprint(),
            objective_key(config.objective),
            config.tie_break,
        )
    }

    /// Get a cached tour.
    pub async fn get(&self, graph: &Graph, config: &PlannerConfig) -> Option<RouteEntry> {
        self.routes.get(&Self::key(graph, config)).await
    }

    /// Insert a tour into the cache.
    pub async fn insert(&self, graph: &Graph, config: &PlannerConfig, entry: RouteEntry) {
        self.routes.insert(Self::key(graph, config), entry).await;
    }

    /// Get cache statistics (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.routes.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.routes.invalidate_all();
    }
}

/// Planner with caching.
pub struct CachedPlanner {
    cache: RouteCache,
}

impl CachedPlanner {
    /// Create a new cached planner.
    pub fn new(cache_config: &CacheConfig) -> Self {
        Self {
            cache: RouteCache::new(cache_config),
        }
    }

    /// Plan a tour, using the cache if available.
    pub async fn plan(
        &self,
        graph: &Arc<Graph>,
        config: &PlannerConfig,
    ) -> Result<RouteEntry, PlanError> {
        if let Some(cached) = self.cache.get(graph, config).await {
            debug!(objective = %config.objective, "route cache hit");
            return Ok(cached);
        }

        let search_graph = Arc::clone(graph);
        let search_config = config.clone();
        let result = tokio::task::spawn_blocking(move || {
            Planner::new(&search_graph, &search_config).plan()
        })
        .await
        .map_err(|e| {
            error!("planning task failed: {e}");
            PlanError::Aborted(e.to_string())
        })?;

        let entry = Arc::new(result?);
        self.cache.insert(graph, config, entry.clone()).await;

        Ok(entry)
    }

    /// Get cache statistics.
    pub fn cache_entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_cache(&self) {
        self.cache.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EdgeSpec, ModeCatalog, Node, TransportMode};
    use crate::graph::GraphBuilder;

    fn graph(edges: Vec<EdgeSpec>) -> Arc<Graph> {
        let modes = ModeCatalog::new(vec![
            TransportMode::new("bus", 40.0, 2.5, 5.0),
            TransportMode::new("walking", 5.0, 0.0, 0.0),
        ])
        .unwrap();
        let graph = GraphBuilder::new(modes)
            .nodes([
                Node::new(0, "Home", 59.9194, 10.7353),
                Node::new(1, "Aunt", 59.9390, 10.7450),
                Node::new(2, "Uncle", 59.9127, 10.7461),
            ])
            .edges(edges)
            .build()
            .unwrap();
        Arc::new(graph)
    }

    fn complete() -> Arc<Graph> {
        graph(vec![
            EdgeSpec::new(0, 1, "bus"),
            EdgeSpec::new(1, 2, "walking"),
            EdgeSpec::new(2, 0, "bus"),
        ])
    }

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(600));
        assert_eq!(config.max_capacity, 256);
    }

    #[test]
    fn weighted_objectives_key_on_weights() {
        let a = objective_key(Objective::weighted(1.0, 2.0).unwrap());
        let b = objective_key(Objective::weighted(2.0, 1.0).unwrap());
        assert_ne!(a, b);
        assert_ne!(objective_key(Objective::Time), objective_key(Objective::Cost));
    }

    #[tokio::test]
    async fn repeated_plans_hit_the_cache() {
        let planner = CachedPlanner::new(&CacheConfig::default());
        let g = complete();
        let config = PlannerConfig::default();

        let first = planner.plan(&g, &config).await.unwrap();
        let second = planner.plan(&g, &config).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn objectives_are_cached_separately() {
        let planner = CachedPlanner::new(&CacheConfig::default());
        let g = complete();

        let fastest = planner.plan(&g, &PlannerConfig::default()).await.unwrap();
        let cheapest = planner
            .plan(&g, &PlannerConfig::default().with_objective(Objective::Cost))
            .await
            .unwrap();

        assert!(!Arc::ptr_eq(&fastest, &cheapest));
        assert_eq!(cheapest.objective(), Objective::Cost);
    }

    #[tokio::test]
    async fn different_graphs_do_not_share_entries() {
        let planner = CachedPlanner::new(&CacheConfig::default());
        let config = PlannerConfig::default();

        let a = planner.plan(&complete(), &config).await.unwrap();
        let other = graph(vec![
            EdgeSpec::new(0, 1, "walking"),
            EdgeSpec::new(1, 2, "walking"),
            EdgeSpec::new(2, 0, "walking"),
        ]);
        let b = planner.plan(&other, &config).await.unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let planner = CachedPlanner::new(&CacheConfig::default());
        let g = graph(vec![EdgeSpec::new(0, 1, "bus")]);

        assert!(planner.plan(&g, &PlannerConfig::default()).await.is_err());
        assert!(
            planner
                .cache
                .get(&g, &PlannerConfig::default())
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn invalidate_clears_entries() {
        let planner = CachedPlanner::new(&CacheConfig::default());
        let g = complete();
        let config = PlannerConfig::default();

        let first = planner.plan(&g, &config).await.unwrap();
        planner.invalidate_cache();
        let second = planner.plan(&g, &config).await.unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn long_searches_leave_the_runtime_free() {
        let modes = ModeCatalog::new(vec![TransportMode::new("walking", 5.0, 0.0, 0.0)]).unwrap();
        let nodes = (0..11).map(|i| {
            let lat = 59.90 + 0.01 * ((i * 7) % 11) as f64;
            let lon = 10.70 + 0.01 * ((i * 3) % 11) as f64;
            Node::new(i, format!("House {i}"), lat, lon)
        });
        let g = Arc::new(
            GraphBuilder::new(modes)
                .nodes(nodes)
                .connect_all()
                .build()
                .unwrap(),
        );
        let config = PlannerConfig {
            deadline: Some(Duration::from_secs(2)),
            ..PlannerConfig::default()
        };
        let planner = CachedPlanner::new(&CacheConfig::default());

        // the timer can only fire if the search yields the worker
        let pending = tokio::time::timeout(Duration::from_millis(1), planner.plan(&g, &config));
        assert!(pending.await.is_err());
        assert_eq!(planner.cache_entry_count(), 0);
    }
}
