//! Transport modes and the catalog that holds them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// A way of travelling between two locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportMode {
    /// Unique name, used by edges to reference the mode
    pub name: String,

    /// Average speed in km/h, strictly positive
    #[serde(rename = "speed")]
    pub speed_kmh: f64,

    /// Money spent per kilometre travelled
    pub cost_per_km: f64,

    /// Boarding/alighting overhead in minutes, charged once per leg
    pub transfer_time_min: f64,
}

impl TransportMode {
    /// Create a new mode.
    pub fn new(
        name: impl Into<String>,
        speed_kmh: f64,
        cost_per_km: f64,
        transfer_time_min: f64,
    ) -> Self {
        Self {
            name: name.into(),
            speed_kmh,
            cost_per_km,
            transfer_time_min,
        }
    }

    /// Check that every attribute is within range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |reason| {
            Err(ValidationError::InvalidMode {
                mode: self.name.clone(),
                reason,
            })
        };

        if self.name.is_empty() {
            return invalid("name must not be empty");
        }
        if !self.speed_kmh.is_finite() || self.speed_kmh <= 0.0 {
            return invalid("speed must be positive");
        }
        if !self.cost_per_km.is_finite() || self.cost_per_km < 0.0 {
            return invalid("cost per km must not be negative");
        }
        if !self.transfer_time_min.is_finite() || self.transfer_time_min < 0.0 {
            return invalid("transfer time must not be negative");
        }

        Ok(())
    }
}

/// Index of a mode within a [`ModeCatalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModeId(pub usize);

/// The immutable set of transport modes available to a planning session.
///
/// Built once before any route computation and passed explicitly into the
/// graph builder.
#[derive(Debug, Clone, Default)]
pub struct ModeCatalog {
    modes: Vec<TransportMode>,
    by_name: HashMap<String, ModeId>,
}

impl ModeCatalog {
    /// Build a catalog, rejecting invalid or duplicate modes.
    pub fn new(modes: Vec<TransportMode>) -> Result<Self, ValidationError> {
        let mut by_name = HashMap::with_capacity(modes.len());

        for (idx, mode) in modes.iter().enumerate() {
            mode.validate()?;
            if by_name.insert(mode.name.clone(), ModeId(idx)).is_some() {
                return Err(ValidationError::DuplicateMode(mode.name.clone()));
            }
        }

        Ok(Self { modes, by_name })
    }

    /// Look up a mode by name.
    pub fn lookup(&self, name: &str) -> Option<ModeId> {
        self.by_name.get(name).copied()
    }

    /// Get a mode by id.
    ///
    /// Ids are only handed out by this catalog, so they are always in range.
    pub fn get(&self, id: ModeId) -> &TransportMode {
        &self.modes[id.0]
    }

    /// Iterate over `(id, mode)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (ModeId, &TransportMode)> {
        self.modes
            .iter()
            .enumerate()
            .map(|(idx, mode)| (ModeId(idx), mode))
    }

    /// Returns the number of modes.
    pub fn len(&self) -> usize {
        self.modes.len()
    }

    /// Returns true if the catalog has no modes.
    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bus() -> TransportMode {
        TransportMode::new("bus", 40.0, 2.5, 5.0)
    }

    #[test]
    fn catalog_lookup() {
        let catalog = ModeCatalog::new(vec![
            bus(),
            TransportMode::new("walking", 5.0, 0.0, 0.0),
        ])
        .unwrap();

        assert_eq!(catalog.len(), 2);
        let walking = catalog.lookup("walking").unwrap();
        assert_eq!(catalog.get(walking).speed_kmh, 5.0);
        assert!(catalog.lookup("ferry").is_none());
    }

    #[test]
    fn duplicate_mode_rejected() {
        let result = ModeCatalog::new(vec![bus(), bus()]);
        assert_eq!(result.unwrap_err(), ValidationError::DuplicateMode("bus".into()));
    }

    #[test]
    fn invalid_attributes_rejected() {
        let cases = [
            TransportMode::new("", 10.0, 0.0, 0.0),
            TransportMode::new("stalled", 0.0, 0.0, 0.0),
            TransportMode::new("reverse", -3.0, 0.0, 0.0),
            TransportMode::new("paid", 10.0, -1.0, 0.0),
            TransportMode::new("instant", 10.0, 0.0, -2.0),
            TransportMode::new("nan", f64::NAN, 0.0, 0.0),
        ];

        for mode in cases {
            assert!(
                matches!(
                    ModeCatalog::new(vec![mode.clone()]),
                    Err(ValidationError::InvalidMode { .. })
                ),
                "{mode:?} should be rejected"
            );
        }
    }

    #[test]
    fn deserializes_mode_file_fields() {
        let json = r#"{"name": "train", "speed": 80, "cost_per_km": 3.0, "transfer_time_min": 10}"#;
        let mode: TransportMode = serde_json::from_str(json).unwrap();
        assert_eq!(mode, TransportMode::new("train", 80.0, 3.0, 10.0));
    }
}
