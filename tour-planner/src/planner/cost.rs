//! Cost of traversing one edge.

use std::ops::{Add, AddAssign};

use crate::domain::TransportMode;

use super::config::Objective;

/// Time and money spent on one leg, or summed over several.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LegCost {
    /// Travel time in minutes, including transfer time
    pub time_min: f64,
    /// Money spent
    pub money: f64,
}

impl LegCost {
    pub const ZERO: LegCost = LegCost {
        time_min: 0.0,
        money: 0.0,
    };
}

impl Add for LegCost {
    type Output = LegCost;

    fn add(self, rhs: LegCost) -> LegCost {
        LegCost {
            time_min: self.time_min + rhs.time_min,
            money: self.money + rhs.money,
        }
    }
}

impl AddAssign for LegCost {
    fn add_assign(&mut self, rhs: LegCost) {
        *self = *self + rhs;
    }
}

/// Maps a traversal to its cost and folds cost into the scalar the
/// optimizer minimises.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    objective: Objective,
}

impl CostModel {
    /// Create a model for the given objective.
    pub fn new(objective: Objective) -> Self {
        Self { objective }
    }

    /// The objective this model scores against.
    pub fn objective(&self) -> Objective {
        self.objective
    }

    /// Time and money for travelling `distance_km` with `mode`.
    ///
    /// Time is `distance / speed * 60 + transfer_time`; the transfer time
    /// is charged even for a zero-length leg. Money is
    /// `distance * cost_per_km`.
    pub fn leg_cost(distance_km: f64, mode: &TransportMode) -> LegCost {
        LegCost {
            time_min: distance_km / mode.speed_kmh * 60.0 + mode.transfer_time_min,
            money: distance_km * mode.cost_per_km,
        }
    }

    /// The objective value of a cost. Never negative for valid modes.
    pub fn score(&self, cost: &LegCost) -> f64 {
        match self.objective {
            Objective::Time => cost.time_min,
            Objective::Cost => cost.money,
            Objective::Weighted {
                time_weight,
                cost_weight,
            } => time_weight * cost.time_min + cost_weight * cost.money,
        }
    }

    /// The metric used to separate tours with equal score.
    pub fn secondary(&self, cost: &LegCost) -> f64 {
        match self.objective {
            Objective::Time => cost.money,
            Objective::Cost | Objective::Weighted { .. } => cost.time_min,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bus() -> TransportMode {
        TransportMode::new("bus", 40.0, 2.5, 5.0)
    }

    #[test]
    fn time_and_money() {
        let cost = CostModel::leg_cost(2.25, &bus());
        assert!((cost.time_min - (2.25 / 40.0 * 60.0 + 5.0)).abs() < 1e-9);
        assert!((cost.money - 2.25 * 2.5).abs() < 1e-9);
    }

    #[test]
    fn zero_distance_still_pays_transfer() {
        let cost = CostModel::leg_cost(0.0, &bus());
        assert_eq!(cost.time_min, 5.0);
        assert_eq!(cost.money, 0.0);
    }

    #[test]
    fn scores_follow_objective() {
        let cost = LegCost {
            time_min: 30.0,
            money: 12.0,
        };

        assert_eq!(CostModel::new(Objective::Time).score(&cost), 30.0);
        assert_eq!(CostModel::new(Objective::Cost).score(&cost), 12.0);

        let weighted = Objective::weighted(0.5, 2.0).unwrap();
        assert_eq!(CostModel::new(weighted).score(&cost), 39.0);
    }

    #[test]
    fn secondary_metric_is_the_other_one() {
        let cost = LegCost {
            time_min: 30.0,
            money: 12.0,
        };

        assert_eq!(CostModel::new(Objective::Time).secondary(&cost), 12.0);
        assert_eq!(CostModel::new(Objective::Cost).secondary(&cost), 30.0);
    }

    #[test]
    fn costs_add() {
        let mut total = LegCost::ZERO;
        total += LegCost {
            time_min: 1.5,
            money: 2.0,
        };
        total += LegCost {
            time_min: 0.5,
            money: 1.0,
        };
        assert_eq!(
            total,
            LegCost {
                time_min: 2.0,
                money: 3.0
            }
        );
    }
}
