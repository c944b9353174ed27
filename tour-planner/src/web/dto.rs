//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::dataset::Relatives;
use crate::domain::TransportMode;
use crate::graph::Graph;
use crate::planner::{InvalidObjective, Objective, RouteLeg, RouteResult, Stop, TieBreak};

/// Query parameters for planning a route.
#[derive(Debug, Default, Deserialize)]
pub struct RouteRequest {
    /// `time`, `cost`, `weighted` or `weighted:<time>,<cost>`
    pub objective: Option<String>,

    /// Weight of minutes when `objective=weighted` (defaults to 1)
    pub time_weight: Option<f64>,

    /// Weight of money when `objective=weighted` (defaults to 1)
    pub cost_weight: Option<f64>,

    /// Tie-break policy (defaults to the server's)
    pub tie_break: Option<TieBreak>,
}

impl RouteRequest {
    /// The requested objective, or `default` if none was given.
    pub fn objective(&self, default: Objective) -> Result<Objective, InvalidObjective> {
        match self.objective.as_deref().map(str::trim) {
            None | Some("") => Ok(default),
            Some(s) if s.eq_ignore_ascii_case("weighted") => Objective::weighted(
                self.time_weight.unwrap_or(1.0),
                self.cost_weight.unwrap_or(1.0),
            ),
            Some(s) => s.parse(),
        }
    }
}

/// A location in the node list.
#[derive(Debug, Serialize)]
pub struct NodeResult {
    /// Node id (0 is home)
    pub id: usize,

    pub name: String,

    pub latitude: f64,

    pub longitude: f64,

    /// Street address, for relatives
    pub street_name: Option<String>,

    /// District, for relatives
    pub district: Option<String>,
}

impl NodeResult {
    /// List the graph's nodes with relative details where known.
    ///
    /// Node `i` (for `i >= 1`) is the `i`-th relative.
    pub fn list(graph: &Graph, relatives: &Relatives) -> Vec<Self> {
        graph
            .nodes()
            .iter()
            .map(|node| {
                let relative = node
                    .id
                    .index()
                    .checked_sub(1)
                    .and_then(|i| relatives.iter().nth(i));

                NodeResult {
                    id: node.id.index(),
                    name: node.name.clone(),
                    latitude: node.coordinates.latitude,
                    longitude: node.coordinates.longitude,
                    street_name: relative.map(|r| r.street_name.clone()),
                    district: relative.map(|r| r.district.clone()),
                }
            })
            .collect()
    }
}

/// Available transport modes.
#[derive(Debug, Serialize)]
pub struct ModesResponse {
    pub modes: Vec<TransportMode>,
}

/// A stop on the planned tour.
#[derive(Debug, Serialize, Deserialize)]
pub struct StopResult {
    pub id: usize,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl StopResult {
    pub fn from_stop(stop: &Stop) -> Self {
        Self {
            id: stop.id.index(),
            name: stop.name.clone(),
            latitude: stop.coordinates.latitude,
            longitude: stop.coordinates.longitude,
        }
    }
}

/// One leg of the planned tour.
#[derive(Debug, Serialize, Deserialize)]
pub struct LegResult {
    pub from: usize,
    pub to: usize,
    pub mode: String,
    pub distance_km: f64,
    pub time_min: f64,
    pub cost: f64,
}

impl LegResult {
    pub fn from_leg(leg: &RouteLeg) -> Self {
        Self {
            from: leg.from.index(),
            to: leg.to.index(),
            mode: leg.mode.clone(),
            distance_km: leg.distance_km,
            time_min: leg.time_min,
            cost: leg.cost,
        }
    }
}

/// Totals over the whole tour.
#[derive(Debug, Serialize, Deserialize)]
pub struct TotalsResult {
    pub distance_km: f64,
    pub time_min: f64,
    pub cost: f64,
}

/// Search counters.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResult {
    pub branches_explored: u64,
    pub branches_pruned: u64,
    pub tours_completed: u64,
}

/// A planned tour.
#[derive(Debug, Serialize, Deserialize)]
pub struct RouteResponse {
    /// The objective the tour was optimised for
    pub objective: Objective,

    /// The tour's objective value
    pub objective_value: f64,

    /// Stops in visiting order, starting and ending at home
    pub stops: Vec<StopResult>,

    pub legs: Vec<LegResult>,

    pub totals: TotalsResult,

    pub stats: StatsResult,
}

impl RouteResponse {
    pub fn from_result(result: &RouteResult) -> Self {
        let stats = result.stats();

        Self {
            objective: result.objective(),
            objective_value: result.objective_value(),
            stops: result.stops().iter().map(StopResult::from_stop).collect(),
            legs: result.legs().iter().map(LegResult::from_leg).collect(),
            totals: TotalsResult {
                distance_km: result.total_distance_km(),
                time_min: result.total_time_min(),
                cost: result.total_cost(),
            },
            stats: StatsResult {
                branches_explored: stats.branches_explored,
                branches_pruned: stats.branches_pruned,
                tours_completed: stats.tours_completed,
            },
        }
    }
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,

    /// Nodes that cannot reach or be reached from home, when connectivity
    /// failed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unreachable: Vec<usize>,
}
