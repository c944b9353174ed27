//! Parsers for the transport mode and network files.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::domain::{EdgeSpec, ModeCatalog, TransportMode};

use super::error::LoadError;

/// One entry of the modes file, keyed by mode name.
#[derive(Debug, Deserialize)]
struct ModeRecord {
    speed: f64,
    cost_per_km: f64,
    transfer_time_min: f64,
}

/// Parse the modes file: an object mapping mode names to speed, cost per
/// km and transfer time.
///
/// Modes are catalogued in name order.
pub fn parse_modes(text: &str, path: &Path) -> Result<ModeCatalog, LoadError> {
    let records: BTreeMap<String, ModeRecord> =
        serde_json::from_str(text).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    let modes = records
        .into_iter()
        .map(|(name, r)| TransportMode::new(name, r.speed, r.cost_per_km, r.transfer_time_min))
        .collect();

    Ok(ModeCatalog::new(modes)?)
}

/// Split a route key of the form `"<from> <to>"`.
fn parse_route(route: &str) -> Option<(usize, usize)> {
    let (from, to) = route.split_once(' ')?;
    let number = |s: &str| {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        s.parse::<usize>().ok()
    };
    Some((number(from)?, number(to)?))
}

/// Parse the network file: an object mapping `"<from> <to>"` keys to mode
/// names.
///
/// Edges take the builder's default direction. Every mode must exist in
/// `modes`.
pub fn parse_network(
    text: &str,
    path: &Path,
    modes: &ModeCatalog,
) -> Result<Vec<EdgeSpec>, LoadError> {
    let routes: BTreeMap<String, String> =
        serde_json::from_str(text).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    let mut edges = Vec::with_capacity(routes.len());
    for (route, mode) in routes {
        let Some((from, to)) = parse_route(&route) else {
            return Err(LoadError::InvalidRoute {
                path: path.to_path_buf(),
                route,
            });
        };
        if modes.lookup(&mode).is_none() {
            return Err(LoadError::UnknownMode {
                path: path.to_path_buf(),
                route,
                mode,
            });
        }

        debug!(from, to, %mode, "route loaded");
        edges.push(EdgeSpec::new(from, to, mode));
    }

    Ok(edges)
}
