//! The relatives visited on a tour.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::{Coordinates, Node};

use super::error::{LoadError, RelativeError};

/// Name of the home node in generated node lists.
pub const HOME_NAME: &str = "Home";

/// One relative and where they live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relative {
    pub name: String,
    pub street_name: String,
    pub district: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Relative {
    /// Create a new relative record.
    pub fn new(
        name: impl Into<String>,
        street_name: impl Into<String>,
        district: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            name: name.into(),
            street_name: street_name.into(),
            district: district.into(),
            latitude,
            longitude,
        }
    }

    /// Where the relative lives.
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Check that text fields are filled in and coordinates are on the
    /// globe.
    pub fn validate(&self) -> Result<(), RelativeError> {
        for (field, value) in [
            ("name", &self.name),
            ("street_name", &self.street_name),
            ("district", &self.district),
        ] {
            if value.trim().is_empty() {
                return Err(RelativeError::EmptyField(field));
            }
        }

        if !self.coordinates().is_valid() {
            return Err(RelativeError::InvalidCoordinates {
                name: self.name.clone(),
                latitude: self.latitude,
                longitude: self.longitude,
            });
        }

        Ok(())
    }
}

impl fmt::Display for Relative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}) at {}",
            self.name,
            self.street_name,
            self.district,
            self.coordinates()
        )
    }
}

/// Ordered collection of relatives with unique names.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Relatives {
    relatives: Vec<Relative>,
}

impl Relatives {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from records, validating each one.
    pub fn from_vec(relatives: Vec<Relative>) -> Result<Self, RelativeError> {
        let mut out = Self::new();
        for relative in relatives {
            out.add(relative)?;
        }
        Ok(out)
    }

    /// Add a relative. Names must be unique.
    pub fn add(&mut self, relative: Relative) -> Result<(), RelativeError> {
        relative.validate()?;
        if self.relatives.iter().any(|r| r.name == relative.name) {
            return Err(RelativeError::Duplicate(relative.name));
        }

        info!(name = %relative.name, "added relative");
        self.relatives.push(relative);
        Ok(())
    }

    /// Parse JSON lines, one relative per line. Blank lines are skipped.
    ///
    /// `path` is only used in error messages.
    pub fn parse_jsonl(text: &str, path: &Path) -> Result<Self, LoadError> {
        let mut out = Self::new();

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            if line.trim().is_empty() {
                continue;
            }

            let relative: Relative =
                serde_json::from_str(line).map_err(|source| LoadError::MalformedRelative {
                    path: path.to_path_buf(),
                    line: line_no,
                    source,
                })?;

            out.add(relative)
                .map_err(|source| LoadError::InvalidRelative {
                    path: path.to_path_buf(),
                    line: line_no,
                    source,
                })?;
        }

        Ok(out)
    }

    /// Read a JSON lines file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let text = super::read(path)?;
        Self::parse_jsonl(&text, path)
    }

    /// Look up a relative by name.
    pub fn get(&self, name: &str) -> Option<&Relative> {
        let found = self.relatives.iter().find(|r| r.name == name);
        if found.is_none() {
            warn!(name, "relative does not exist");
        }
        found
    }

    /// Iterate over relatives in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Relative> {
        self.relatives.iter()
    }

    /// Returns the number of relatives.
    pub fn len(&self) -> usize {
        self.relatives.len()
    }

    /// Returns true if there are no relatives.
    pub fn is_empty(&self) -> bool {
        self.relatives.is_empty()
    }

    /// Tour nodes: home as node 0, then each relative in order as nodes
    /// 1..=n.
    pub fn to_nodes(&self, home: Coordinates) -> Vec<Node> {
        let home = Node::new(0, HOME_NAME, home.latitude, home.longitude);

        std::iter::once(home)
            .chain(
                self.relatives
                    .iter()
                    .enumerate()
                    .map(|(i, r)| Node::new(i + 1, r.name.clone(), r.latitude, r.longitude)),
            )
            .collect()
    }
}

impl<'a> IntoIterator for &'a Relatives {
    type Item = &'a Relative;
    type IntoIter = std::slice::Iter<'a, Relative>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Relatives {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for relative in &self.relatives {
            writeln!(f, "{relative}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NodeId;

    const SAMPLE: &str = r#"{"name": "Relative_1", "street_name": "Pilestredet 35", "district": "St. Hanshaugen", "latitude": 59.9194, "longitude": 10.7353}

{"name": "Relative_2", "street_name": "Kirkeveien 1", "district": "Frogner", "latitude": 59.9390, "longitude": 10.7450}
"#;

    fn relatives() -> Relatives {
        Relatives::parse_jsonl(SAMPLE, Path::new("relatives.jsonl")).unwrap()
    }

    #[test]
    fn parses_lines_and_skips_blanks() {
        let relatives = relatives();
        assert_eq!(relatives.len(), 2);
        assert!(!relatives.is_empty());

        let names: Vec<&str> = relatives.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Relative_1", "Relative_2"]);
    }

    #[test]
    fn get_by_name() {
        let relatives = relatives();
        assert_eq!(relatives.get("Relative_2").unwrap().district, "Frogner");
        assert!(relatives.get("Nobody").is_none());
    }

    #[test]
    fn nodes_start_at_home() {
        let nodes = relatives().to_nodes(Coordinates::new(59.91, 10.75));

        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].id, NodeId::HOME);
        assert_eq!(nodes[0].name, HOME_NAME);
        assert_eq!(nodes[2].id, NodeId(2));
        assert_eq!(nodes[2].name, "Relative_2");
        assert_eq!(nodes[2].coordinates, Coordinates::new(59.9390, 10.7450));
    }

    #[test]
    fn rejects_incomplete_records() {
        let mut relatives = Relatives::new();

        let err = relatives
            .add(Relative::new("", "Pilestredet 52", "Oslo", 59.9, 10.7))
            .unwrap_err();
        assert_eq!(err, RelativeError::EmptyField("name"));

        let err = relatives
            .add(Relative::new("George", "Pilestredet 46", " ", 59.9, 10.7))
            .unwrap_err();
        assert_eq!(err, RelativeError::EmptyField("district"));

        let err = relatives
            .add(Relative::new("George", "Pilestredet 46", "Oslo", 91.0, 10.7))
            .unwrap_err();
        assert!(matches!(err, RelativeError::InvalidCoordinates { .. }));

        assert!(relatives.is_empty());
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut relatives = relatives();
        let err = relatives
            .add(Relative::new("Relative_1", "Elsewhere 1", "Oslo", 59.9, 10.7))
            .unwrap_err();

        assert_eq!(err, RelativeError::Duplicate("Relative_1".to_string()));
        assert_eq!(relatives.len(), 2);
    }

    #[test]
    fn malformed_line_reports_line_number() {
        let text = "{\"name\": \"A\", \"street_name\": \"B\", \"district\": \"C\", \"latitude\": 59.9, \"longitude\": 10.7}\n{\"name\": \"D\"}\n";
        let err = Relatives::parse_jsonl(text, Path::new("relatives.jsonl")).unwrap_err();

        match err {
            LoadError::MalformedRelative { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_numeric_latitude_is_rejected() {
        let text = r#"{"name": "A", "street_name": "B", "district": "C", "latitude": "north", "longitude": 10.7}"#;
        assert!(Relatives::parse_jsonl(text, Path::new("r.jsonl")).is_err());
    }

    #[test]
    fn serializes_as_list() {
        let json = serde_json::to_value(relatives()).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 2);
        assert_eq!(json[0]["name"], "Relative_1");
    }
}
