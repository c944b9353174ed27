//! The outcome of an optimization run.
//!
//! A `RouteResult` owns everything it reports (stop names and coordinates
//! included), so it outlives the graph it was computed from and can be
//! handed to renderers without further lookups.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::domain::{Coordinates, NodeId};

use super::config::Objective;
use super::cost::LegCost;

/// A location on the tour, in visiting order.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub id: NodeId,
    pub name: String,
    pub coordinates: Coordinates,
}

/// One edge traversal within a tour.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteLeg {
    pub from: NodeId,
    pub to: NodeId,
    /// Name of the mode selected for this leg
    pub mode: String,
    pub distance_km: f64,
    pub time_min: f64,
    pub cost: f64,
}

/// Counters describing how much of the search space was explored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Partial tours extended by one node.
    pub branches_explored: u64,
    /// Extensions abandoned because they could not beat the best tour.
    pub branches_pruned: u64,
    /// Prefixes visiting every node that closed back to home.
    pub tours_completed: u64,
}

/// The chosen tour with per-leg and total figures.
///
/// Created once per optimization run and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    stops: Vec<Stop>,
    legs: Vec<RouteLeg>,
    totals: LegCost,
    total_distance_km: f64,
    objective: Objective,
    objective_value: f64,
    stats: SearchStats,
}

impl RouteResult {
    /// Assemble a result from its legs. Totals are summed here.
    pub(crate) fn new(
        stops: Vec<Stop>,
        legs: Vec<RouteLeg>,
        objective: Objective,
        objective_value: f64,
        stats: SearchStats,
    ) -> Self {
        let totals = legs.iter().fold(LegCost::ZERO, |acc, leg| {
            acc + LegCost {
                time_min: leg.time_min,
                money: leg.cost,
            }
        });
        let total_distance_km = legs.iter().map(|l| l.distance_km).sum();

        Self {
            stops,
            legs,
            totals,
            total_distance_km,
            objective,
            objective_value,
            stats,
        }
    }

    /// Stops in visiting order, starting and ending at home.
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Node ids in visiting order, starting and ending at home.
    pub fn order(&self) -> Vec<NodeId> {
        self.stops.iter().map(|s| s.id).collect()
    }

    /// Legs in travel order.
    pub fn legs(&self) -> &[RouteLeg] {
        &self.legs
    }

    /// Total travel time in minutes.
    pub fn total_time_min(&self) -> f64 {
        self.totals.time_min
    }

    /// Total money spent.
    pub fn total_cost(&self) -> f64 {
        self.totals.money
    }

    /// Total distance in kilometres.
    pub fn total_distance_km(&self) -> f64 {
        self.total_distance_km
    }

    /// The objective the tour was optimised for.
    pub fn objective(&self) -> Objective {
        self.objective
    }

    /// The tour's objective value.
    pub fn objective_value(&self) -> f64 {
        self.objective_value
    }

    /// Search counters for the run that produced this result.
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Coordinates of the stops in visiting order.
    pub fn coordinates(&self) -> Vec<Coordinates> {
        self.stops.iter().map(|s| s.coordinates).collect()
    }

    /// Write one `latitude,longitude` line per stop.
    pub fn write_coordinates<W: Write>(&self, mut out: W) -> io::Result<()> {
        for c in self.coordinates() {
            writeln!(out, "{},{}", c.latitude, c.longitude)?;
        }
        out.flush()
    }

    /// Save the tour's coordinates to `path`, replacing any existing file.
    pub fn save_coordinates(&self, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        self.write_coordinates(BufWriter::new(file))?;
        info!(path = %path.display(), stops = self.stops.len(), "route saved");
        Ok(())
    }
}

/// Prints a textual itinerary.
impl fmt::Display for RouteResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = |id: NodeId| {
            self.stops
                .iter()
                .find(|s| s.id == id)
                .map(|s| s.name.as_str())
                .unwrap_or("?")
        };

        writeln!(f, "Route optimised for {}:", self.objective.label())?;
        for (i, leg) in self.legs.iter().enumerate() {
            writeln!(
                f,
                "{:>3}. {} -> {} by {}: {:.2} km, {:.1} min, cost {:.2}",
                i + 1,
                name(leg.from),
                name(leg.to),
                leg.mode,
                leg.distance_km,
                leg.time_min,
                leg.cost
            )?;
        }
        write!(
            f,
            "Total: {:.2} km, {:.1} min, cost {:.2}",
            self.total_distance_km, self.totals.time_min, self.totals.money
        )
    }
}
