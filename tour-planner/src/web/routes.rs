//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::{error, warn};

use crate::planner::{InvalidObjective, PlanError, PlannerConfig};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/relatives", get(list_relatives))
        .route("/modes", get(list_modes))
        .route("/route", get(plan_route))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Home and relatives, by node id.
async fn list_relatives(State(state): State<AppState>) -> Json<Vec<NodeResult>> {
    Json(NodeResult::list(&state.graph, &state.relatives))
}

/// The mode catalog.
async fn list_modes(State(state): State<AppState>) -> Json<ModesResponse> {
    let modes = state
        .graph
        .modes()
        .iter()
        .map(|(_, mode)| mode.clone())
        .collect();

    Json(ModesResponse { modes })
}

/// Check if request prefers a plain-text itinerary.
fn accepts_text(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/plain"))
}

/// Plan the best tour for the requested objective.
async fn plan_route(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(req): Query<RouteRequest>,
) -> Result<Response, AppError> {
    let objective = req.objective(state.config.objective)?;
    let config = PlannerConfig {
        objective,
        tie_break: req.tie_break.unwrap_or(state.config.tie_break),
        ..PlannerConfig::clone(&state.config)
    };

    let result = state.planner.plan(&state.graph, &config).await?;

    if accepts_text(&headers) {
        let headers = [(header::CONTENT_TYPE, "text/plain; charset=utf-8")];
        return Ok((headers, result.to_string()).into_response());
    }

    Ok(Json(RouteResponse::from_result(&result)).into_response())
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest {
        message: String,
    },
    Unprocessable {
        message: String,
        unreachable: Vec<usize>,
    },
    Internal {
        message: String,
    },
}

impl From<InvalidObjective> for AppError {
    fn from(e: InvalidObjective) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        let message = e.to_string();
        match e {
            PlanError::Validation(_) | PlanError::Objective(_) => {
                AppError::BadRequest { message }
            }
            PlanError::Connectivity(err) => AppError::Unprocessable {
                message,
                unreachable: err.unreachable.iter().map(|n| n.index()).collect(),
            },
            PlanError::NoSolution(_) => AppError::Unprocessable {
                message,
                unreachable: Vec::new(),
            },
            PlanError::Timeout(_) | PlanError::Aborted(_) => AppError::Internal { message },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message, unreachable) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message, Vec::new()),
            AppError::Unprocessable {
                message,
                unreachable,
            } => (StatusCode::UNPROCESSABLE_ENTITY, message, unreachable),
            AppError::Internal { message } => {
                (StatusCode::INTERNAL_SERVER_ERROR, message, Vec::new())
            }
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse {
            error: message,
            unreachable,
        });
        (status, body).into_response()
    }
}
