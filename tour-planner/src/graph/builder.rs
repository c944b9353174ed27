//! Graph construction.
//!
//! A [`Graph`] is only ever produced by [`GraphBuilder::build`], which
//! checks every reference before anything is computed. Code holding a
//! `Graph` can index nodes, edges and modes without further checks.

use std::collections::HashSet;
use std::hash::{DefaultHasher, Hash, Hasher};

use tracing::{debug, info};

use crate::domain::{
    Direction, Edge, EdgeId, EdgeSpec, ModeCatalog, Node, NodeId, TransportMode, ValidationError,
};

use super::DistanceMethod;

/// One traversable direction of an edge, as seen from its start node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub edge: EdgeId,
    pub to: NodeId,
}

/// Locations, the edges between them, and the mode catalog.
///
/// Immutable once built.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    modes: ModeCatalog,
    /// Outgoing links per node, in edge declaration order.
    outgoing: Vec<Vec<Link>>,
    distance_method: DistanceMethod,
    fingerprint: u64,
}

impl Graph {
    /// All nodes, indexed by id.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Get a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// The home node.
    pub fn home(&self) -> &Node {
        // build() rejects graphs without node 0
        &self.nodes[0]
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All edges, indexed by [`EdgeId`].
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Get an edge by id.
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0)
    }

    /// The transport mode catalog.
    pub fn modes(&self) -> &ModeCatalog {
        &self.modes
    }

    /// The mode an edge is tagged with.
    pub fn edge_mode(&self, edge: &Edge) -> &TransportMode {
        self.modes.get(edge.mode)
    }

    /// Links leaving `node`. Empty for unknown ids.
    pub fn outgoing(&self, node: NodeId) -> &[Link] {
        self.outgoing
            .get(node.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The method used to derive edge distances.
    pub fn distance_method(&self) -> DistanceMethod {
        self.distance_method
    }

    /// Stable hash of the graph's content, used as a cache key.
    ///
    /// Two graphs built from the same nodes, edges, modes and distance
    /// method share a fingerprint.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    fn compute_fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.distance_method.hash(&mut hasher);
        for node in &self.nodes {
            node.id.hash(&mut hasher);
            node.name.hash(&mut hasher);
            node.coordinates.latitude.to_bits().hash(&mut hasher);
            node.coordinates.longitude.to_bits().hash(&mut hasher);
        }
        for (_, mode) in self.modes.iter() {
            mode.name.hash(&mut hasher);
            mode.speed_kmh.to_bits().hash(&mut hasher);
            mode.cost_per_km.to_bits().hash(&mut hasher);
            mode.transfer_time_min.to_bits().hash(&mut hasher);
        }
        for edge in &self.edges {
            edge.from.hash(&mut hasher);
            edge.to.hash(&mut hasher);
            edge.mode.hash(&mut hasher);
            edge.direction.hash(&mut hasher);
        }

        hasher.finish()
    }
}

/// Builder for [`Graph`].
///
/// Provides a fluent API for declaring nodes and edges against a fixed
/// mode catalog.
#[derive(Debug)]
pub struct GraphBuilder {
    modes: ModeCatalog,
    nodes: Vec<Node>,
    edges: Vec<EdgeSpec>,
    default_direction: Direction,
    distance_method: DistanceMethod,
    connect_all: bool,
}

impl GraphBuilder {
    /// Create a builder over the given mode catalog.
    pub fn new(modes: ModeCatalog) -> Self {
        Self {
            modes,
            nodes: Vec::new(),
            edges: Vec::new(),
            default_direction: Direction::default(),
            distance_method: DistanceMethod::default(),
            connect_all: false,
        }
    }

    /// Direction for edges that don't declare one.
    pub fn default_direction(mut self, direction: Direction) -> Self {
        self.default_direction = direction;
        self
    }

    /// How edge distances are computed.
    pub fn distance_method(mut self, method: DistanceMethod) -> Self {
        self.distance_method = method;
        self
    }

    /// Add a node.
    pub fn node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    /// Add several nodes.
    pub fn nodes(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.nodes.extend(nodes);
        self
    }

    /// Declare an edge.
    pub fn edge(mut self, edge: EdgeSpec) -> Self {
        self.edges.push(edge);
        self
    }

    /// Declare several edges.
    pub fn edges(mut self, edges: impl IntoIterator<Item = EdgeSpec>) -> Self {
        self.edges.extend(edges);
        self
    }

    /// Join every pair of nodes with one bidirectional edge per mode.
    ///
    /// The generated edges follow any explicitly declared ones. The
    /// optimizer then picks the best mode for each leg.
    pub fn connect_all(mut self) -> Self {
        self.connect_all = true;
        self
    }

    /// Validate the declarations and build the graph.
    pub fn build(self) -> Result<Graph, ValidationError> {
        let nodes = Self::order_nodes(self.nodes)?;
        let count = nodes.len();

        let mut specs = self.edges;
        if self.connect_all {
            for i in 0..count {
                for j in (i + 1)..count {
                    for (_, mode) in self.modes.iter() {
                        specs.push(EdgeSpec::bidirectional(i, j, mode.name.clone()));
                    }
                }
            }
        }

        let mut edges = Vec::with_capacity(specs.len());
        let mut outgoing = vec![Vec::new(); count];

        for (idx, spec) in specs.into_iter().enumerate() {
            for node in [spec.from, spec.to] {
                if node.index() >= count {
                    return Err(ValidationError::UnknownNode { edge: idx, node });
                }
            }

            let mode = self
                .modes
                .lookup(&spec.mode)
                .ok_or_else(|| ValidationError::UnknownMode {
                    edge: idx,
                    mode: spec.mode.clone(),
                })?;

            let distance_km = self.distance_method.distance_km(
                &nodes[spec.from.index()].coordinates,
                &nodes[spec.to.index()].coordinates,
            );

            debug!(
                from = %spec.from,
                to = %spec.to,
                mode = %spec.mode,
                distance_km,
                "edge resolved"
            );

            let edge = Edge {
                from: spec.from,
                to: spec.to,
                mode,
                direction: spec.direction.unwrap_or(self.default_direction),
                distance_km,
            };

            let id = EdgeId(idx);
            outgoing[edge.from.index()].push(Link { edge: id, to: edge.to });
            if edge.direction == Direction::Bidirectional && !edge.is_loop() {
                outgoing[edge.to.index()].push(Link {
                    edge: id,
                    to: edge.from,
                });
            }

            edges.push(edge);
        }

        let mut graph = Graph {
            nodes,
            edges,
            modes: self.modes,
            outgoing,
            distance_method: self.distance_method,
            fingerprint: 0,
        };
        graph.fingerprint = graph.compute_fingerprint();

        info!(
            nodes = graph.node_count(),
            edges = graph.edges.len(),
            modes = graph.modes.len(),
            "graph has been initialized"
        );

        Ok(graph)
    }

    /// Check ids and coordinates, then sort nodes so that index == id.
    fn order_nodes(mut nodes: Vec<Node>) -> Result<Vec<Node>, ValidationError> {
        if !nodes.iter().any(|n| n.id.is_home()) {
            return Err(ValidationError::MissingHome);
        }

        let count = nodes.len();
        let mut seen = HashSet::with_capacity(count);

        for node in &nodes {
            if !seen.insert(node.id) {
                return Err(ValidationError::DuplicateNode(node.id));
            }
            if node.id.index() >= count {
                return Err(ValidationError::NodeIdOutOfRange { id: node.id, count });
            }
            if !node.coordinates.is_valid() {
                return Err(ValidationError::InvalidCoordinates {
                    node: node.id,
                    latitude: node.coordinates.latitude,
                    longitude: node.coordinates.longitude,
                });
            }
        }

        nodes.sort_by_key(|n| n.id);
        Ok(nodes)
    }
}

/// Build a graph from nodes, edge declarations and a mode catalog, using
/// bidirectional edges and geodesic distances.
pub fn build(
    nodes: Vec<Node>,
    edges: Vec<EdgeSpec>,
    modes: ModeCatalog,
) -> Result<Graph, ValidationError> {
    GraphBuilder::new(modes).nodes(nodes).edges(edges).build()
}
