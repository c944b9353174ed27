//! Locations visited by a tour.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of a node in the graph.
///
/// Identity is the index: nodes are numbered `0..count` and node 0 is
/// always home, the fixed start and end of every tour.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The home node.
    pub const HOME: NodeId = NodeId(0);

    /// Returns the position of this node in the graph's node list.
    pub fn index(self) -> usize {
        self.0
    }

    /// Returns true if this is the home node.
    pub fn is_home(self) -> bool {
        self == Self::HOME
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Latitude and longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Creates coordinates without range checks.
    ///
    /// Range checks happen when the node enters a graph.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns true if both values are finite and within the valid
    /// latitude (±90) and longitude (±180) ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Converts to a `geo` point (x = longitude, y = latitude).
    pub fn to_point(&self) -> geo::Point<f64> {
        geo::Point::new(self.longitude, self.latitude)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.latitude, self.longitude)
    }
}

/// A location on the tour: home or one of the relatives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub coordinates: Coordinates,
}

impl Node {
    /// Creates a node.
    pub fn new(id: usize, name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: NodeId(id),
            name: name.into(),
            coordinates: Coordinates::new(latitude, longitude),
        }
    }
}
