//! Distance between two locations.

use geo::{Distance, Geodesic, Haversine};
use serde::{Deserialize, Serialize};

use crate::domain::Coordinates;

/// How edge lengths are derived from endpoint coordinates.
///
/// One method is applied to every edge of a graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMethod {
    /// Shortest path on the WGS84 ellipsoid
    #[default]
    Geodesic,
    /// Great-circle distance on a sphere of mean Earth radius
    Haversine,
}

impl DistanceMethod {
    /// Distance between two coordinates in kilometres.
    pub fn distance_km(self, a: &Coordinates, b: &Coordinates) -> f64 {
        let (a, b) = (a.to_point(), b.to_point());
        let metres = match self {
            DistanceMethod::Geodesic => Geodesic.distance(a, b),
            DistanceMethod::Haversine => Haversine.distance(a, b),
        };
        metres / 1000.0
    }
}
