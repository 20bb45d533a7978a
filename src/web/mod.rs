mod sim;

use std::{convert::Infallible, net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};

use crate::{
    catalog::{self, BuildingConfig, BuildingType, VisualDescriptor},
    engine::{EngineBuilder, EngineSettings},
    grid::Tile,
    hash::{self, Variant},
    placement::{Placement, PlacementError},
    scenario::Scenario,
    systems::AutoplaySystem,
    topology::{self, Axis, RoadConnections},
};

pub use sim::{spawn as spawn_simulation, Frame, SimHandle};

pub struct WebServerConfig {
    pub scenario: Scenario,
    pub snapshot_dir: PathBuf,
    pub host: String,
    pub port: u16,
}

#[derive(Clone)]
struct AppState {
    sim: SimHandle,
    catalog: Arc<Vec<BuildingConfig>>,
}

pub async fn run(config: WebServerConfig) -> Result<()> {
    let WebServerConfig {
        scenario,
        snapshot_dir,
        host,
        port,
    } = config;

    let game = scenario.build_state()?;
    let catalog = Arc::new(game.catalog().entries().to_vec());
    let mut builder = EngineBuilder::new(EngineSettings {
        scenario_name: scenario.name.clone(),
        seed: scenario.seed,
        snapshot_interval_ticks: scenario.snapshot_interval_ticks,
        snapshot_dir,
    });
    if let Some(autoplay) = scenario.autoplay {
        builder.push_system(AutoplaySystem::new(autoplay));
    }
    let engine = builder.with_core_systems().build();

    let period = scenario.config.tick_period();
    let (sim, sim_task) = sim::spawn(scenario.name.clone(), engine, game, period);
    let router = router(sim, catalog);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid listen address {host}:{port}"))?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        scenario = %scenario.name,
        description = scenario.description.as_deref().unwrap_or(""),
        tick_ms = period.as_millis() as u64,
        "city server listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    sim_task.abort();
    Ok(())
}

fn router(sim: SimHandle, catalog: Arc<Vec<BuildingConfig>>) -> Router {
    let state = AppState { sim, catalog };
    Router::new()
        .route("/api/state", get(latest_state))
        .route("/api/catalog", get(catalog_entries))
        .route("/api/tiles/:x/:y", get(tile_view))
        .route("/api/place", post(place))
        .route("/api/events", get(stream_events))
        .with_state(state)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutting down city server");
}

async fn latest_state(State(app): State<AppState>) -> Json<Frame> {
    Json(app.sim.latest().as_ref().clone())
}

async fn catalog_entries(State(app): State<AppState>) -> Json<Vec<BuildingConfig>> {
    Json(app.catalog.as_ref().clone())
}

#[derive(Serialize)]
struct TileView {
    x: i32,
    y: i32,
    tile: Tile,
    visual: VisualDescriptor,
    variant: Variant,
    roads: RoadConnections,
    intersection: bool,
    axis: Axis,
}

async fn tile_view(
    State(app): State<AppState>,
    Path((x, y)): Path<(i32, i32)>,
) -> Result<Json<TileView>, ApiError> {
    let frame = app.sim.latest();
    let grid = &frame.grid;
    let tile = *grid
        .get(x, y)
        .map_err(|err| ApiError::from(PlacementError::from(err)))?;
    let visual = catalog::visual(tile.building());
    Ok(Json(TileView {
        x,
        y,
        tile,
        visual,
        variant: hash::variant(x, y, visual.model_count),
        roads: topology::connections(grid, x, y),
        intersection: topology::is_intersection(grid, x, y),
        axis: topology::preferred_axis(grid, x, y),
    }))
}

#[derive(Deserialize)]
struct PlaceRequest {
    x: i32,
    y: i32,
    tool: BuildingType,
}

#[derive(Serialize)]
struct PlaceResponse {
    placement: Placement,
    treasury: i64,
}

async fn place(
    State(app): State<AppState>,
    Json(request): Json<PlaceRequest>,
) -> Result<Json<PlaceResponse>, ApiError> {
    let placement = app
        .sim
        .place(request.x, request.y, request.tool)
        .await
        .map_err(|_| ApiError::Unavailable)??;
    Ok(Json(PlaceResponse {
        placement,
        treasury: app.sim.latest().treasury,
    }))
}

async fn stream_events(
    State(app): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(app.sim.subscribe()).filter_map(|frame| {
        let frame = frame.ok()?;
        let payload = serde_json::to_string(frame.as_ref()).ok()?;
        Some(Ok(Event::default().data(payload)))
    });
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(2))
            .text("keep-alive"),
    )
}

enum ApiError {
    Placement(PlacementError),
    Unavailable,
}

impl From<PlacementError> for ApiError {
    fn from(value: PlacementError) -> Self {
        ApiError::Placement(value)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Placement(err) => {
                let status = match err {
                    PlacementError::OutOfBounds(_) => StatusCode::NOT_FOUND,
                    _ => StatusCode::UNPROCESSABLE_ENTITY,
                };
                (
                    status,
                    ErrorBody {
                        error: err.kind(),
                        message: err.to_string(),
                    },
                )
            }
            ApiError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorBody {
                    error: "unavailable",
                    message: "simulation is not running".to_string(),
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}
