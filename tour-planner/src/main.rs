use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use tour_planner::cache::{CacheConfig, CachedPlanner};
use tour_planner::dataset::Dataset;
use tour_planner::domain::Coordinates;
use tour_planner::planner::{Objective, Planner, PlannerConfig};
use tour_planner::web::{AppState, create_router};

/// Home coordinates when none are configured (central Oslo).
const DEFAULT_HOME: Coordinates = Coordinates::new(59.9194, 10.7353);

/// Longest a single `/route` search may run, in milliseconds.
const DEFAULT_SEARCH_DEADLINE_MS: u64 = 10_000;

/// Read an environment variable and parse it, falling back to `default`
/// when it is unset or invalid.
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(value) => value.parse().unwrap_or_else(|_| {
            warn!(var = name, %value, "ignoring invalid environment variable");
            default
        }),
        Err(_) => default,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let data_dir: PathBuf = env_or("TOUR_DATA_DIR", PathBuf::from("data"));
    let home = Coordinates::new(
        env_or("TOUR_HOME_LAT", DEFAULT_HOME.latitude),
        env_or("TOUR_HOME_LON", DEFAULT_HOME.longitude),
    );
    let objective: Objective = env_or("TOUR_OBJECTIVE", Objective::Time);
    let addr: SocketAddr = env_or(
        "TOUR_LISTEN_ADDR",
        SocketAddr::from(([127, 0, 0, 1], 3000)),
    );

    let deadline_ms: u64 = env_or("TOUR_SEARCH_DEADLINE_MS", DEFAULT_SEARCH_DEADLINE_MS);

    let config = PlannerConfig {
        deadline: Some(Duration::from_millis(deadline_ms)),
        ..PlannerConfig::default().with_objective(objective)
    };

    let dataset = match Dataset::load(&data_dir) {
        Ok(dataset) => dataset,
        Err(e) => {
            error!("failed to load data: {e}");
            return ExitCode::FAILURE;
        }
    };

    let graph = match dataset.graph(home, &config) {
        Ok(graph) => graph,
        Err(e) => {
            error!("invalid transport network: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Serve anyway: /route reports the unreachable nodes
    if let Err(e) = Planner::new(&graph, &config).validate() {
        warn!("{e}");
    }

    let state = AppState::new(
        graph,
        dataset.relatives,
        config,
        CachedPlanner::new(&CacheConfig::default()),
    );
    let app = create_router(state);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, "failed to bind: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!("tour planner listening on http://{addr}");
    info!("endpoints: GET /health, GET /relatives, GET /modes, GET /route");

    if let Err(e) = axum::serve(listener, app).await {
        error!("server error: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
