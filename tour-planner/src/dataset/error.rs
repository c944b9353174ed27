//! Errors raised while loading data files.

use std::io;
use std::path::PathBuf;

use crate::domain::ValidationError;

/// A relative record with missing or unusable fields.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RelativeError {
    #[error("relative field {0:?} must not be empty")]
    EmptyField(&'static str),

    #[error("relative {name:?} has invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinates {
        name: String,
        latitude: f64,
        longitude: f64,
    },

    #[error("relative {0:?} already exists")]
    Duplicate(String),
}

/// Failure to load one of the data files.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{}: route {route:?} is not in format '<number> <number>'", path.display())]
    InvalidRoute { path: PathBuf, route: String },

    #[error("{}: route {route:?} uses unknown mode {mode:?}", path.display())]
    UnknownMode {
        path: PathBuf,
        route: String,
        mode: String,
    },

    #[error("{}:{line}: {source}", path.display())]
    MalformedRelative {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("{}:{line}: {source}", path.display())]
    InvalidRelative {
        path: PathBuf,
        line: usize,
        #[source]
        source: RelativeError,
    },

    #[error("invalid transport modes: {0}")]
    Modes(#[from] ValidationError),
}
