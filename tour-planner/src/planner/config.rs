//! Planner configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::Direction;
use crate::graph::DistanceMethod;

/// What a tour is optimised for.
///
/// Fixed for a whole optimization run so that candidate tours are compared
/// consistently. Deserialized weights go through [`Objective::validate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "kind",
    rename_all = "snake_case",
    try_from = "ObjectiveRecord"
)]
pub enum Objective {
    /// Minimise total travel time in minutes
    #[default]
    Time,
    /// Minimise total money spent
    Cost,
    /// Minimise `time_weight * minutes + cost_weight * money`
    Weighted { time_weight: f64, cost_weight: f64 },
}

/// Unchecked wire form of [`Objective`].
#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ObjectiveRecord {
    Time,
    Cost,
    Weighted { time_weight: f64, cost_weight: f64 },
}

impl TryFrom<ObjectiveRecord> for Objective {
    type Error = InvalidObjective;

    fn try_from(record: ObjectiveRecord) -> Result<Self, Self::Error> {
        match record {
            ObjectiveRecord::Time => Ok(Objective::Time),
            ObjectiveRecord::Cost => Ok(Objective::Cost),
            ObjectiveRecord::Weighted {
                time_weight,
                cost_weight,
            } => Objective::weighted(time_weight, cost_weight),
        }
    }
}

/// Error returned when an objective cannot be parsed or its weights are
/// out of range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid objective: {reason}")]
pub struct InvalidObjective {
    reason: String,
}

impl InvalidObjective {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Objective {
    /// A weighted blend of time and money.
    ///
    /// Weights must be finite, non-negative and not both zero.
    pub fn weighted(time_weight: f64, cost_weight: f64) -> Result<Self, InvalidObjective> {
        let objective = Objective::Weighted {
            time_weight,
            cost_weight,
        };
        objective.validate()?;
        Ok(objective)
    }

    /// Check the weights of a weighted objective.
    ///
    /// Leg scores must stay non-negative for the search to prune soundly.
    pub fn validate(&self) -> Result<(), InvalidObjective> {
        let Objective::Weighted {
            time_weight,
            cost_weight,
        } = *self
        else {
            return Ok(());
        };

        for (name, w) in [("time", time_weight), ("cost", cost_weight)] {
            if !w.is_finite() || w < 0.0 {
                return Err(InvalidObjective::new(format!(
                    "{name} weight must be a non-negative number, got {w}"
                )));
            }
        }
        if time_weight == 0.0 && cost_weight == 0.0 {
            return Err(InvalidObjective::new("weights must not both be zero"));
        }

        Ok(())
    }

    /// Short name used in logs and responses.
    pub fn label(&self) -> &'static str {
        match self {
            Objective::Time => "time",
            Objective::Cost => "cost",
            Objective::Weighted { .. } => "weighted",
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Objective::Weighted {
                time_weight,
                cost_weight,
            } => write!(f, "weighted:{time_weight},{cost_weight}"),
            other => f.write_str(other.label()),
        }
    }
}

/// Parses `time`, `cost` or `weighted:<time_weight>,<cost_weight>`.
impl FromStr for Objective {
    type Err = InvalidObjective;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "time" => return Ok(Objective::Time),
            "cost" => return Ok(Objective::Cost),
            _ => {}
        }

        let weights = s
            .strip_prefix("weighted:")
            .ok_or_else(|| InvalidObjective::new(format!("unknown objective {s:?}")))?;
        let (time, cost) = weights
            .split_once(',')
            .ok_or_else(|| InvalidObjective::new("expected weighted:<time>,<cost>"))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<f64>()
                .map_err(|_| InvalidObjective::new(format!("weight {v:?} is not a number")))
        };

        Objective::weighted(parse(time)?, parse(cost)?)
    }
}

/// How tours with equal objective values are ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// The lexicographically smaller visiting order wins
    #[default]
    Lexicographic,
    /// The lower value of the other metric (money when optimising time,
    /// time otherwise) wins, then the lexicographically smaller order
    SecondaryMetric,
}

/// Configuration parameters for a planning session.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    /// Quantity the optimizer minimises.
    pub objective: Objective,

    /// Ordering among tours of equal objective value.
    pub tie_break: TieBreak,

    /// Direction of edges that don't declare one.
    pub default_direction: Direction,

    /// How edge distances are derived from coordinates.
    pub distance_method: DistanceMethod,

    /// Upper bound on search wall time.
    /// `None` lets the search run to completion.
    pub deadline: Option<Duration>,
}

impl PlannerConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(
        objective: Objective,
        tie_break: TieBreak,
        default_direction: Direction,
        distance_method: DistanceMethod,
        deadline: Option<Duration>,
    ) -> Self {
        Self {
            objective,
            tie_break,
            default_direction,
            distance_method,
            deadline,
        }
    }

    /// Same configuration with a different objective.
    pub fn with_objective(self, objective: Objective) -> Self {
        Self { objective, ..self }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            objective: Objective::Time,
            tie_break: TieBreak::Lexicographic,
            default_direction: Direction::Bidirectional,
            distance_method: DistanceMethod::Geodesic,
            deadline: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlannerConfig::default();

        assert_eq!(config.objective, Objective::Time);
        assert_eq!(config.tie_break, TieBreak::Lexicographic);
        assert_eq!(config.default_direction, Direction::Bidirectional);
        assert_eq!(config.distance_method, DistanceMethod::Geodesic);
        assert_eq!(config.deadline, None);
    }

    #[test]
    fn custom_config() {
        let config = PlannerConfig::new(
            Objective::Cost,
            TieBreak::SecondaryMetric,
            Direction::OneWay,
            DistanceMethod::Haversine,
            Some(Duration::from_secs(2)),
        );

        assert_eq!(config.objective, Objective::Cost);
        assert_eq!(config.tie_break, TieBreak::SecondaryMetric);
        assert_eq!(config.default_direction, Direction::OneWay);
        assert_eq!(config.distance_method, DistanceMethod::Haversine);
        assert_eq!(config.deadline, Some(Duration::from_secs(2)));

        let swapped = config.with_objective(Objective::Time);
        assert_eq!(swapped.objective, Objective::Time);
        assert_eq!(swapped.tie_break, TieBreak::SecondaryMetric);
    }

    #[test]
    fn parse_objectives() {
        assert_eq!("time".parse::<Objective>().unwrap(), Objective::Time);
        assert_eq!(" Cost ".parse::<Objective>().unwrap(), Objective::Cost);
        assert_eq!(
            "weighted:1,0.5".parse::<Objective>().unwrap(),
            Objective::Weighted {
                time_weight: 1.0,
                cost_weight: 0.5
            }
        );
    }

    #[test]
    fn reject_bad_objectives() {
        assert!("distance".parse::<Objective>().is_err());
        assert!("weighted:1".parse::<Objective>().is_err());
        assert!("weighted:a,1".parse::<Objective>().is_err());
        assert!("weighted:-1,1".parse::<Objective>().is_err());
        assert!("weighted:0,0".parse::<Objective>().is_err());
        assert!(Objective::weighted(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn display_roundtrips_through_parse() {
        for objective in [
            Objective::Time,
            Objective::Cost,
            Objective::weighted(0.25, 2.0).unwrap(),
        ] {
            let parsed: Objective = objective.to_string().parse().unwrap();
            assert_eq!(parsed, objective);
        }
    }

    #[test]
    fn objective_serde_shape() {
        let json = serde_json::to_value(Objective::weighted(1.0, 2.0).unwrap()).unwrap();
        assert_eq!(json["kind"], "weighted");
        assert_eq!(json["time_weight"], 1.0);

        let parsed: Objective = serde_json::from_str(r#"{"kind": "cost"}"#).unwrap();
        assert_eq!(parsed, Objective::Cost);

        let parsed: Objective =
            serde_json::from_str(r#"{"kind": "weighted", "time_weight": 2.0, "cost_weight": 0.5}"#)
                .unwrap();
        assert_eq!(parsed, Objective::weighted(2.0, 0.5).unwrap());
    }

    #[test]
    fn deserializing_checks_weights() {
        for json in [
            r#"{"kind": "weighted", "time_weight": -1.0, "cost_weight": 0.0}"#,
            r#"{"kind": "weighted", "time_weight": 0.0, "cost_weight": 0.0}"#,
            r#"{"kind": "weighted", "time_weight": 1.0, "cost_weight": -0.5}"#,
        ] {
            let err = serde_json::from_str::<Objective>(json).unwrap_err();
            assert!(err.to_string().contains("invalid objective"), "{err}");
        }
    }

    #[test]
    fn validate_catches_hand_built_weights() {
        assert!(Objective::Time.validate().is_ok());
        assert!(Objective::Cost.validate().is_ok());
        assert!(Objective::weighted(0.0, 1.0).unwrap().validate().is_ok());

        let negative = Objective::Weighted {
            time_weight: -1.0,
            cost_weight: 0.0,
        };
        assert!(negative.validate().is_err());

        let nan = Objective::Weighted {
            time_weight: f64::NAN,
            cost_weight: 1.0,
        };
        assert!(nan.validate().is_err());
    }
}
