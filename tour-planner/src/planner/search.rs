//! Branch-and-bound tour search.
//!
//! Finds the cheapest closed tour that starts at home, visits every other
//! node exactly once and returns home. Every ordering of the non-home nodes
//! is a candidate; a partial tour is abandoned as soon as its accumulated
//! cost can no longer beat the best complete tour found so far. Leg costs
//! are never negative, so the accumulated cost of a prefix only grows.
//!
//! The search is a depth-first state machine driven by an explicit work
//! stack. Each frame is a node on the current prefix plus a cursor into
//! its successor list; advancing the cursor is a transition, popping the
//! frame is backtracking. Successors are tried in ascending id order, so
//! complete tours are met in lexicographic order and the first tour found
//! at a given cost is the lexicographically smallest one.

use std::cmp::Ordering;
use std::time::{Duration, Instant};

use fixedbitset::FixedBitSet;
use tracing::{debug, info, instrument};

use crate::domain::{EdgeId, NodeId};
use crate::graph::Graph;

use super::config::{InvalidObjective, PlannerConfig, TieBreak};
use super::cost::{CostModel, LegCost};
use super::result::{RouteLeg, RouteResult, SearchStats, Stop};

/// Relative tolerance under which two objective values count as equal.
const TIE_EPSILON: f64 = 1e-9;

/// Branches explored between deadline checks.
const DEADLINE_CHECK_INTERVAL: u64 = 1024;

/// No ordering of the nodes can be closed into a tour with the declared
/// edges.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no closed tour visits every node exactly once ({branches_explored} branches explored)")]
pub struct NoSolutionError {
    pub branches_explored: u64,
}

/// The search ran past its configured deadline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("search exceeded its {deadline:?} deadline after {branches_explored} branches")]
pub struct SearchTimeout {
    pub deadline: Duration,
    pub branches_explored: u64,
}

/// Error from tour optimization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptimizeError {
    #[error(transparent)]
    Objective(#[from] InvalidObjective),

    #[error(transparent)]
    NoSolution(#[from] NoSolutionError),

    #[error(transparent)]
    Timeout(#[from] SearchTimeout),
}

/// The cheapest edge for travelling directly from one node to another.
#[derive(Debug, Clone, Copy)]
struct Transition {
    edge: EdgeId,
    cost: LegCost,
    score: f64,
    secondary: f64,
}

/// Cheapest transition for every ordered node pair, with parallel edges
/// collapsed.
struct TransitionTable {
    n: usize,
    cells: Vec<Option<Transition>>,
    /// Reachable successors per node, ascending.
    successors: Vec<Vec<usize>>,
}

impl TransitionTable {
    fn build(graph: &Graph, model: &CostModel) -> Self {
        let n = graph.node_count();
        let mut cells: Vec<Option<Transition>> = vec![None; n * n];

        for from in 0..n {
            for link in graph.outgoing(NodeId(from)) {
                let to = link.to.index();
                if to == from {
                    continue;
                }
                let Some(edge) = graph.edge(link.edge) else {
                    continue;
                };

                let cost = CostModel::leg_cost(edge.distance_km, graph.edge_mode(edge));
                let candidate = Transition {
                    edge: link.edge,
                    cost,
                    score: model.score(&cost),
                    secondary: model.secondary(&cost),
                };

                let cell = &mut cells[from * n + to];
                let replace = match cell {
                    None => true,
                    Some(current) => Self::compare(graph, &candidate, current) == Ordering::Less,
                };
                if replace {
                    *cell = Some(candidate);
                }
            }
        }

        let successors = (0..n)
            .map(|from| {
                (0..n)
                    .filter(|&to| cells[from * n + to].is_some())
                    .collect()
            })
            .collect();

        Self {
            n,
            cells,
            successors,
        }
    }

    /// Orders parallel edges: lower score, then lower secondary metric,
    /// then mode name, then declaration order.
    fn compare(graph: &Graph, a: &Transition, b: &Transition) -> Ordering {
        let mode_name = |t: &Transition| {
            graph
                .edge(t.edge)
                .map(|e| graph.edge_mode(e).name.as_str())
        };

        a.score
            .total_cmp(&b.score)
            .then(a.secondary.total_cmp(&b.secondary))
            .then_with(|| mode_name(a).cmp(&mode_name(b)))
            .then(a.edge.cmp(&b.edge))
    }

    fn get(&self, from: usize, to: usize) -> Option<&Transition> {
        self.cells[from * self.n + to].as_ref()
    }
}

/// Best complete tour so far.
#[derive(Debug, Clone)]
struct Incumbent {
    /// Closed order: starts and ends with home.
    order: Vec<usize>,
    score: f64,
    secondary: f64,
}

/// A node on the current prefix and the next successor to try from it.
#[derive(Debug, Clone, Copy)]
struct Frame {
    node: usize,
    next: usize,
}

/// Mutable state of one search run.
struct Search<'t> {
    table: &'t TransitionTable,
    tie_break: TieBreak,
    deadline: Option<(Instant, Duration)>,
    frames: Vec<Frame>,
    prefix: Vec<usize>,
    visited: FixedBitSet,
    /// Accumulated (score, secondary) for each prefix length.
    accumulated: Vec<(f64, f64)>,
    best: Option<Incumbent>,
    stats: SearchStats,
}

impl<'t> Search<'t> {
    fn new(
        table: &'t TransitionTable,
        tie_break: TieBreak,
        deadline: Option<(Instant, Duration)>,
    ) -> Self {
        let n = table.n;
        Self {
            table,
            tie_break,
            deadline,
            frames: Vec::with_capacity(n),
            prefix: Vec::with_capacity(n + 1),
            visited: FixedBitSet::with_capacity(n),
            accumulated: Vec::with_capacity(n),
            best: None,
            stats: SearchStats::default(),
        }
    }

    fn run(&mut self) -> Result<(), SearchTimeout> {
        let n = self.table.n;
        self.push(0, (0.0, 0.0));

        while let Some(&Frame { node, next }) = self.frames.last() {
            if self.prefix.len() == n {
                self.try_close(node);
                self.backtrack();
                continue;
            }

            let Some(&succ) = self.table.successors[node].get(next) else {
                self.backtrack();
                continue;
            };
            if let Some(top) = self.frames.last_mut() {
                top.next += 1;
            }
            if self.visited.contains(succ) {
                continue;
            }

            self.stats.branches_explored += 1;
            self.check_deadline()?;

            let Some(transition) = self.table.get(node, succ) else {
                continue;
            };
            let (score, secondary) = self.current_cost();
            let extended = (score + transition.score, secondary + transition.secondary);

            if self.cannot_improve(extended.0, extended.1) {
                self.stats.branches_pruned += 1;
                continue;
            }

            self.push(succ, extended);
        }

        Ok(())
    }

    fn push(&mut self, node: usize, cost: (f64, f64)) {
        self.visited.insert(node);
        self.prefix.push(node);
        self.accumulated.push(cost);
        self.frames.push(Frame { node, next: 0 });
    }

    fn backtrack(&mut self) {
        if let Some(frame) = self.frames.pop() {
            self.visited.set(frame.node, false);
        }
        self.prefix.pop();
        self.accumulated.pop();
    }

    fn current_cost(&self) -> (f64, f64) {
        self.accumulated.last().copied().unwrap_or((0.0, 0.0))
    }

    /// Every node is on the prefix: close the tour if `last` links home.
    fn try_close(&mut self, last: usize) {
        let Some(closing) = self.table.get(last, 0) else {
            return;
        };
        self.stats.tours_completed += 1;

        let (score, secondary) = self.current_cost();
        let (score, secondary) = (score + closing.score, secondary + closing.secondary);
        if self.cannot_improve(score, secondary) {
            return;
        }

        let mut order = self.prefix.clone();
        order.push(0);
        debug!(score, ?order, "new best tour");

        self.best = Some(Incumbent {
            order,
            score,
            secondary,
        });
    }

    /// True if a tour (or any completion of a prefix) with this cost
    /// cannot replace the incumbent.
    ///
    /// Candidates are met in lexicographic order, so a tie on score loses
    /// to the incumbent unless the tie-break looks at the secondary metric.
    fn cannot_improve(&self, score: f64, secondary: f64) -> bool {
        let Some(best) = &self.best else {
            return false;
        };

        let tolerance = TIE_EPSILON * best.score.abs().max(1.0);
        if score > best.score + tolerance {
            return true;
        }
        if score < best.score - tolerance {
            return false;
        }

        match self.tie_break {
            TieBreak::Lexicographic => true,
            TieBreak::SecondaryMetric => {
                let tolerance = TIE_EPSILON * best.secondary.abs().max(1.0);
                secondary >= best.secondary - tolerance
            }
        }
    }

    fn check_deadline(&self) -> Result<(), SearchTimeout> {
        let Some((started, limit)) = self.deadline else {
            return Ok(());
        };
        if (self.stats.branches_explored - 1) % DEADLINE_CHECK_INTERVAL != 0 {
            return Ok(());
        }
        if started.elapsed() >= limit {
            return Err(SearchTimeout {
                deadline: limit,
                branches_explored: self.stats.branches_explored,
            });
        }
        Ok(())
    }
}

/// Exhaustive tour optimizer over a borrowed graph.
pub struct RouteOptimizer<'a> {
    graph: &'a Graph,
    model: CostModel,
    tie_break: TieBreak,
    deadline: Option<Duration>,
}

impl<'a> RouteOptimizer<'a> {
    /// Create an optimizer using the objective, tie-break and deadline
    /// from `config`.
    pub fn new(graph: &'a Graph, config: &PlannerConfig) -> Self {
        Self {
            graph,
            model: CostModel::new(config.objective),
            tie_break: config.tie_break,
            deadline: config.deadline,
        }
    }

    /// The cost model used for this run.
    pub fn model(&self) -> &CostModel {
        &self.model
    }

    /// Find the minimal-objective closed tour.
    ///
    /// A graph with only the home node yields an empty tour. Returns
    /// [`NoSolutionError`] when no ordering of the nodes can be closed, and
    /// [`InvalidObjective`] for weights that could make a leg score negative.
    #[instrument(skip_all, fields(nodes = self.graph.node_count(), objective = %self.model.objective()))]
    pub fn optimize(&self) -> Result<RouteResult, OptimizeError> {
        self.model.objective().validate()?;

        let started = Instant::now();
        let table = TransitionTable::build(self.graph, &self.model);

        if self.graph.node_count() == 1 {
            let home = self.stop(0);
            return Ok(RouteResult::new(
                vec![home],
                Vec::new(),
                self.model.objective(),
                0.0,
                SearchStats::default(),
            ));
        }

        let mut search = Search::new(
            &table,
            self.tie_break,
            self.deadline.map(|limit| (started, limit)),
        );
        search.run()?;

        let stats = search.stats;
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            explored = stats.branches_explored,
            pruned = stats.branches_pruned,
            "tour search finished"
        );

        let best = search.best.ok_or(NoSolutionError {
            branches_explored: stats.branches_explored,
        })?;

        Ok(self.to_result(&table, best, stats))
    }

    fn stop(&self, idx: usize) -> Stop {
        let node = &self.graph.nodes()[idx];
        Stop {
            id: node.id,
            name: node.name.clone(),
            coordinates: node.coordinates,
        }
    }

    fn to_result(&self, table: &TransitionTable, best: Incumbent, stats: SearchStats) -> RouteResult {
        let stops = best.order.iter().map(|&idx| self.stop(idx)).collect();

        let legs = best
            .order
            .windows(2)
            .filter_map(|pair| {
                let transition = table.get(pair[0], pair[1])?;
                let edge = self.graph.edge(transition.edge)?;
                Some(RouteLeg {
                    from: NodeId(pair[0]),
                    to: NodeId(pair[1]),
                    mode: self.graph.edge_mode(edge).name.clone(),
                    distance_km: edge.distance_km,
                    time_min: transition.cost.time_min,
                    cost: transition.cost.money,
                })
            })
            .collect();

        RouteResult::new(stops, legs, self.model.objective(), best.score, stats)
    }
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
