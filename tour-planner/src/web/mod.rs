//! Web layer for the tour planner.
//!
//! Serves the relatives, the mode catalog and planned tours over HTTP.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
