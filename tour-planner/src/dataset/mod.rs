//! Loading relatives, transport modes and the transport network from a
//! data directory.
//!
//! A data directory holds three files:
//! - `mode_of_transport.json`: speed, cost per km and transfer time per mode
//! - `transport_network.json`: `"<from> <to>"` keys mapped to mode names
//! - `relatives.jsonl`: one relative per line
//!
//! Node ids in the network file refer to home (0) and relatives in file
//! order (1..=n).

mod error;
mod files;
mod relatives;

use std::fs;
use std::path::Path;

use tracing::{info, instrument};

pub use error::{LoadError, RelativeError};
pub use files::{parse_modes, parse_network};
pub use relatives::{HOME_NAME, Relative, Relatives};

use crate::domain::{Coordinates, EdgeSpec, ModeCatalog, Node, ValidationError};
use crate::graph::Graph;
use crate::planner::{PlannerConfig, graph_builder};

pub const MODES_FILE: &str = "mode_of_transport.json";
pub const NETWORK_FILE: &str = "transport_network.json";
pub const RELATIVES_FILE: &str = "relatives.jsonl";

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Everything loaded from a data directory.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub modes: ModeCatalog,
    pub network: Vec<EdgeSpec>,
    pub relatives: Relatives,
}

impl Dataset {
    /// Load the three data files from `dir`.
    #[instrument(skip_all, fields(dir = %dir.display()))]
    pub fn load(dir: &Path) -> Result<Self, LoadError> {
        let modes_path = dir.join(MODES_FILE);
        let modes = parse_modes(&read(&modes_path)?, &modes_path)?;

        let network_path = dir.join(NETWORK_FILE);
        let network = parse_network(&read(&network_path)?, &network_path, &modes)?;

        let relatives = Relatives::load(&dir.join(RELATIVES_FILE))?;

        info!(
            modes = modes.len(),
            routes = network.len(),
            relatives = relatives.len(),
            "dataset loaded"
        );

        Ok(Self {
            modes,
            network,
            relatives,
        })
    }

    /// Tour nodes with home at `home`.
    pub fn nodes(&self, home: Coordinates) -> Vec<Node> {
        self.relatives.to_nodes(home)
    }

    /// Build the declared transport network.
    pub fn graph(&self, home: Coordinates, config: &PlannerConfig) -> Result<Graph, ValidationError> {
        graph_builder(self.modes.clone(), config)
            .nodes(self.nodes(home))
            .edges(self.network.iter().cloned())
            .build()
    }

    /// Build a network joining every pair of locations by every mode,
    /// ignoring the declared routes.
    pub fn complete_graph(
        &self,
        home: Coordinates,
        config: &PlannerConfig,
    ) -> Result<Graph, ValidationError> {
        graph_builder(self.modes.clone(), config)
            .nodes(self.nodes(home))
            .connect_all()
            .build()
    }
}

/// Load a data directory as graph builder inputs: nodes, edge
/// declarations and the mode catalog.
pub fn load_dataset(
    dir: &Path,
    home: Coordinates,
) -> Result<(Vec<Node>, Vec<EdgeSpec>, ModeCatalog), LoadError> {
    let dataset = Dataset::load(dir)?;
    let nodes = dataset.nodes(home);
    Ok((nodes, dataset.network, dataset.modes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NodeId;
    use crate::planner::{Objective, plan_tour};
    use tempfile::TempDir;

    const HOME: Coordinates = Coordinates::new(59.9194, 10.7353);

    fn write_dataset(dir: &Path) {
        fs::write(
            dir.join(MODES_FILE),
            r#"{
                "bus": {"speed": 40, "cost_per_km": 2.5, "transfer_time_min": 5},
                "walking": {"speed": 5, "cost_per_km": 0, "transfer_time_min": 0}
            }"#,
        )
        .unwrap();
        fs::write(
            dir.join(NETWORK_FILE),
            r#"{"0 1": "bus", "1 2": "walking", "2 3": "bus", "3 0": "walking", "0 2": "bus"}"#,
        )
        .unwrap();
        fs::write(
            dir.join(RELATIVES_FILE),
            concat!(
                r#"{"name": "Aunt", "street_name": "Kirkeveien 1", "district": "Frogner", "latitude": 59.9390, "longitude": 10.7450}"#,
                "\n",
                r#"{"name": "Uncle", "street_name": "Storgata 2", "district": "Grunerlokka", "latitude": 59.9127, "longitude": 10.7461}"#,
                "\n",
                r#"{"name": "Cousin", "street_name": "Tollbugata 3", "district": "Sentrum", "latitude": 59.9100, "longitude": 10.7400}"#,
                "\n"
            ),
        )
        .unwrap();
    }

    fn dataset_dir() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path());
        dir
    }

    #[test]
    fn loads_all_files() {
        let dir = dataset_dir();
        let dataset = Dataset::load(dir.path()).unwrap();

        assert_eq!(dataset.modes.len(), 2);
        assert_eq!(dataset.network.len(), 5);
        assert_eq!(dataset.relatives.len(), 3);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Dataset::load(dir.path()).unwrap_err();

        match err {
            LoadError::Io { path, .. } => assert!(path.ends_with(MODES_FILE)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn builds_declared_graph() {
        let dir = dataset_dir();
        let dataset = Dataset::load(dir.path()).unwrap();
        let graph = dataset.graph(HOME, &PlannerConfig::default()).unwrap();

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.home().name, HOME_NAME);
        assert_eq!(graph.node(NodeId(3)).unwrap().name, "Cousin");
        assert_eq!(graph.edges().len(), 5);
    }

    #[test]
    fn complete_graph_has_every_pair_and_mode() {
        let dir = dataset_dir();
        let dataset = Dataset::load(dir.path()).unwrap();
        let graph = dataset
            .complete_graph(HOME, &PlannerConfig::default())
            .unwrap();

        // 6 pairs, 2 modes each
        assert_eq!(graph.edges().len(), 12);
    }

    #[test]
    fn network_referencing_missing_relative_fails_build() {
        let dir = dataset_dir();
        fs::write(dir.path().join(NETWORK_FILE), r#"{"0 7": "bus"}"#).unwrap();
        let dataset = Dataset::load(dir.path()).unwrap();

        let err = dataset.graph(HOME, &PlannerConfig::default()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownNode {
                edge: 0,
                node: NodeId(7)
            }
        );
    }

    #[test]
    fn plans_from_loaded_inputs() {
        let dir = dataset_dir();
        let (nodes, edges, modes) = load_dataset(dir.path(), HOME).unwrap();
        assert_eq!(nodes.len(), 4);

        let config = PlannerConfig::default().with_objective(Objective::Cost);
        let result = plan_tour(nodes, edges, modes, &config).unwrap();

        let order = result.order();
        assert_eq!(order.first(), Some(&NodeId::HOME));
        assert_eq!(order.last(), Some(&NodeId::HOME));
        assert_eq!(order.len(), 5);
    }
}
