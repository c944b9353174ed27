//! Strong connectivity check.
//!
//! A closed tour from home can only exist if every node can reach home and
//! be reached from it. This is checked with Tarjan's strongly connected
//! components algorithm before any route search starts, so a disconnected
//! input fails fast with the offending nodes named.
//!
//! The depth-first traversal keeps its own stack of frames instead of
//! recursing. Discovery order and component grouping match the recursive
//! formulation.

use std::fmt;

use tracing::{debug, instrument, warn};

use crate::domain::NodeId;

use super::Graph;

/// The graph is not one strongly connected component.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("graph is not strongly connected: {} cannot reach or be reached from home", NodeList(.unreachable))]
pub struct ConnectivityError {
    /// Nodes outside home's component, in ascending order
    pub unreachable: Vec<NodeId>,

    /// Every component found, in completion order
    pub components: Vec<Vec<NodeId>>,
}

struct NodeList<'a>(&'a [NodeId]);

impl fmt::Display for NodeList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = if self.0.len() == 1 { "node" } else { "nodes" };
        write!(f, "{label} ")?;
        for (i, node) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{node}")?;
        }
        Ok(())
    }
}

/// Strongly connected components of a graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Components {
    /// Component index for each node.
    component_of: Vec<usize>,

    /// Members of each component, in the order they were popped.
    components: Vec<Vec<NodeId>>,
}

impl Components {
    /// The component containing `node`.
    pub fn component_of(&self, node: NodeId) -> Option<usize> {
        self.component_of.get(node.index()).copied()
    }

    /// All components in completion order.
    pub fn components(&self) -> &[Vec<NodeId>] {
        &self.components
    }

    /// Returns the number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if there are no components (empty graph).
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns true if `a` and `b` are mutually reachable.
    pub fn same_component(&self, a: NodeId, b: NodeId) -> bool {
        match (self.component_of(a), self.component_of(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }
}

const UNDISCOVERED: usize = usize::MAX;

/// A suspended visit: the node and the next outgoing link to examine.
#[derive(Debug, Clone, Copy)]
struct Frame {
    node: usize,
    next_link: usize,
}

/// Per-node bookkeeping for Tarjan's algorithm.
struct Tarjan {
    index: Vec<usize>,
    low_link: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    next_index: usize,
    component_of: Vec<usize>,
    components: Vec<Vec<NodeId>>,
}

impl Tarjan {
    fn new(n: usize) -> Self {
        Self {
            index: vec![UNDISCOVERED; n],
            low_link: vec![0; n],
            on_stack: vec![false; n],
            stack: Vec::with_capacity(n),
            next_index: 0,
            component_of: vec![UNDISCOVERED; n],
            components: Vec::new(),
        }
    }

    fn discover(&mut self, v: usize) {
        self.index[v] = self.next_index;
        self.low_link[v] = self.next_index;
        self.next_index += 1;
        self.stack.push(v);
        self.on_stack[v] = true;
    }

    /// Pop the component rooted at `v` off the stack.
    fn emit_component(&mut self, v: usize) {
        let id = self.components.len();
        let mut members = Vec::new();

        while let Some(w) = self.stack.pop() {
            self.on_stack[w] = false;
            self.component_of[w] = id;
            members.push(NodeId(w));
            if w == v {
                break;
            }
        }

        members.sort();
        self.components.push(members);
    }

    fn visit_from(&mut self, graph: &Graph, root: usize) {
        self.discover(root);
        let mut frames = vec![Frame {
            node: root,
            next_link: 0,
        }];

        while let Some(&Frame { node: v, next_link }) = frames.last() {
            let links = graph.outgoing(NodeId(v));

            if let Some(link) = links.get(next_link) {
                if let Some(top) = frames.last_mut() {
                    top.next_link += 1;
                }

                let w = link.to.index();
                if self.index[w] == UNDISCOVERED {
                    // Tree edge: descend
                    self.discover(w);
                    frames.push(Frame {
                        node: w,
                        next_link: 0,
                    });
                } else if self.on_stack[w] {
                    // Back edge into the current component
                    self.low_link[v] = self.low_link[v].min(self.index[w]);
                }
                continue;
            }

            // All links of v examined: return to the parent
            frames.pop();
            if let Some(parent) = frames.last() {
                let p = parent.node;
                self.low_link[p] = self.low_link[p].min(self.low_link[v]);
            }

            if self.low_link[v] == self.index[v] {
                self.emit_component(v);
            }
        }
    }
}

/// Compute the strongly connected components of `graph`.
///
/// Runs in O(nodes + links). Traversal starts at home, then at each
/// undiscovered node in id order.
pub fn strongly_connected_components(graph: &Graph) -> Components {
    let n = graph.node_count();
    let mut tarjan = Tarjan::new(n);

    for root in 0..n {
        if tarjan.index[root] == UNDISCOVERED {
            tarjan.visit_from(graph, root);
        }
    }

    Components {
        component_of: tarjan.component_of,
        components: tarjan.components,
    }
}

/// Check that every node is mutually reachable with home.
///
/// On failure the error lists every node outside home's component.
#[instrument(skip_all, fields(nodes = graph.node_count()))]
pub fn validate(graph: &Graph) -> Result<(), ConnectivityError> {
    let components = strongly_connected_components(graph);
    debug!(components = components.len(), "strongly connected components computed");

    if components.len() <= 1 {
        return Ok(());
    }

    let unreachable: Vec<NodeId> = graph
        .nodes()
        .iter()
        .map(|n| n.id)
        .filter(|&id| !components.same_component(id, NodeId::HOME))
        .collect();

    warn!(?unreachable, "graph is not strongly connected");

    Err(ConnectivityError {
        unreachable,
        components: components.components,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EdgeSpec, ModeCatalog, Node, TransportMode};
    use crate::graph::GraphBuilder;

    fn modes() -> ModeCatalog {
        ModeCatalog::new(vec![TransportMode::new("walking", 5.0, 0.0, 0.0)]).unwrap()
    }

    fn graph(n: usize, edges: Vec<EdgeSpec>) -> Graph {
        let nodes = (0..n).map(|i| Node::new(i, format!("N{i}"), 59.9 + i as f64 * 0.01, 10.7));
        GraphBuilder::new(modes())
            .nodes(nodes)
            .edges(edges)
            .build()
            .unwrap()
    }

    #[test]
    fn single_node_is_connected() {
        let g = graph(1, vec![]);
        assert!(validate(&g).is_ok());
        assert_eq!(strongly_connected_components(&g).len(), 1);
    }

    #[test]
    fn path_of_bidirectional_edges_is_connected() {
        let g = graph(
            4,
            vec![
                EdgeSpec::new(0, 1, "walking"),
                EdgeSpec::new(1, 2, "walking"),
                EdgeSpec::new(2, 3, "walking"),
            ],
        );
        assert!(validate(&g).is_ok());
    }

    #[test]
    fn isolated_relative_is_reported() {
        let g = graph(
            4,
            vec![
                EdgeSpec::new(0, 1, "walking"),
                EdgeSpec::new(1, 2, "walking"),
                EdgeSpec::new(2, 0, "walking"),
            ],
        );

        let err = validate(&g).unwrap_err();
        assert_eq!(err.unreachable, vec![NodeId(3)]);
        assert_eq!(err.components.len(), 2);
        assert_eq!(
            err.to_string(),
            "graph is not strongly connected: node 3 cannot reach or be reached from home"
        );
    }

    #[test]
    fn one_way_cycle_is_strongly_connected() {
        let g = graph(
            3,
            vec![
                EdgeSpec::one_way(0, 1, "walking"),
                EdgeSpec::one_way(1, 2, "walking"),
                EdgeSpec::one_way(2, 0, "walking"),
            ],
        );
        assert!(validate(&g).is_ok());
    }

    #[test]
    fn one_way_chain_is_not_strongly_connected() {
        // Everything is reachable from home, but nothing leads back
        let g = graph(
            3,
            vec![
                EdgeSpec::one_way(0, 1, "walking"),
                EdgeSpec::one_way(1, 2, "walking"),
            ],
        );

        let err = validate(&g).unwrap_err();
        assert_eq!(err.unreachable, vec![NodeId(1), NodeId(2)]);
        assert_eq!(err.components.len(), 3);
    }

    #[test]
    fn node_that_cannot_reach_home_is_reported() {
        let g = graph(
            3,
            vec![
                EdgeSpec::new(0, 1, "walking"),
                EdgeSpec::one_way(0, 2, "walking"),
            ],
        );

        let err = validate(&g).unwrap_err();
        assert_eq!(err.unreachable, vec![NodeId(2)]);
    }

    #[test]
    fn components_group_mutually_reachable_nodes() {
        // {0,1} <-> each other, {2,3} <-> each other, one-way bridge 1 -> 2
        let g = graph(
            4,
            vec![
                EdgeSpec::new(0, 1, "walking"),
                EdgeSpec::one_way(1, 2, "walking"),
                EdgeSpec::new(2, 3, "walking"),
            ],
        );

        let components = strongly_connected_components(&g);
        assert_eq!(components.len(), 2);
        assert!(components.same_component(NodeId(0), NodeId(1)));
        assert!(components.same_component(NodeId(2), NodeId(3)));
        assert!(!components.same_component(NodeId(1), NodeId(2)));

        // The downstream component completes first
        assert_eq!(
            components.components(),
            &[vec![NodeId(2), NodeId(3)], vec![NodeId(0), NodeId(1)]]
        );
    }

    #[test]
    fn long_chain_does_not_overflow() {
        let n = 20_000;
        let edges: Vec<_> = (0..n - 1)
            .map(|i| EdgeSpec::new(i, i + 1, "walking"))
            .collect();
        let nodes = (0..n).map(|i| Node::new(i, format!("N{i}"), 0.0, 0.0));
        let g = GraphBuilder::new(modes())
            .nodes(nodes)
            .edges(edges)
            .build()
            .unwrap();

        assert!(validate(&g).is_ok());
    }
}
