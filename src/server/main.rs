//! Coverage resolution server.
//!
//! Exposes the resolver's contract over HTTP for the map-rendering
//! collaborator: a direct resolve endpoint, plus debounced per-location
//! triggers with a phase the caller can render as a loading indicator.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use catchment::models::{CoverageSource, LatLng, ResolvedLocality};
use catchment::resolver::ResolvePhase;
use catchment::{Config, CoverageResolver, DebounceController};

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Service-area coverage resolution server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    listen: String,

    /// TOML config file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

struct AppState {
    resolver: Arc<CoverageResolver>,
    controller: Arc<DebounceController>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };

    info!(
        mirrors = config.boundary.mirrors.len(),
        geocoder_enabled = config.geocoder.access_token.is_some(),
        "Catchment coverage server"
    );

    let resolver = Arc::new(CoverageResolver::new(&config));
    let controller = Arc::new(DebounceController::new(
        Arc::clone(&resolver),
        Duration::from_millis(config.debounce.quiet_window_ms),
    ));

    let state = Arc::new(AppState {
        resolver,
        controller,
    });

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/coverage", get(coverage_handler))
        .route("/v1/locations/{id}/trigger", post(trigger_handler))
        .route("/v1/locations/{id}/coverage", get(location_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", args.listen);

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// One-shot resolve: localities covered by the circle at (lat, lng)
async fn coverage_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CoverageQueryParams>,
) -> Result<Json<CoverageResponse>, (StatusCode, String)> {
    let (center, radius_km) = validate(&params)?;
    let coverage = state.resolver.resolve(center, radius_km).await;

    Ok(Json(CoverageResponse {
        localities: coverage.localities,
        source: coverage.source,
    }))
}

/// Debounced resolve trigger for a location; rapid repeats coalesce
async fn trigger_handler(
    State(state): State<Arc<AppState>>,
    Path(location_id): Path<u64>,
    Query(params): Query<CoverageQueryParams>,
) -> Result<Json<TriggerResponse>, (StatusCode, String)> {
    let (center, radius_km) = validate(&params)?;
    let generation = state.controller.trigger(location_id, center, radius_km);

    Ok(Json(TriggerResponse {
        generation,
        phase: state.controller.phase(location_id),
    }))
}

/// Latest applied coverage and phase for a location
async fn location_handler(
    State(state): State<Arc<AppState>>,
    Path(location_id): Path<u64>,
) -> Json<LocationResponse> {
    let coverage = state.controller.current(location_id);
    Json(LocationResponse {
        phase: state.controller.phase(location_id),
        localities: coverage
            .as_ref()
            .map(|c| c.localities.clone())
            .unwrap_or_default(),
        source: coverage.map(|c| c.source),
    })
}

fn validate(params: &CoverageQueryParams) -> Result<(LatLng, f64), (StatusCode, String)> {
    let center = LatLng::new(params.lat, params.lng);
    if !center.is_valid() {
        return Err((
            StatusCode::BAD_REQUEST,
            "lat/lng outside WGS84 range".to_string(),
        ));
    }
    if !(params.radius_km > 0.0 && params.radius_km.is_finite()) {
        return Err((
            StatusCode::BAD_REQUEST,
            "radius_km must be a positive number".to_string(),
        ));
    }
    Ok((center, params.radius_km))
}

#[derive(Deserialize)]
struct CoverageQueryParams {
    lat: f64,
    lng: f64,
    radius_km: f64,
}

#[derive(Serialize)]
struct CoverageResponse {
    localities: Vec<ResolvedLocality>,
    source: CoverageSource,
}

#[derive(Serialize)]
struct TriggerResponse {
    generation: u64,
    phase: ResolvePhase,
}

#[derive(Serialize)]
struct LocationResponse {
    phase: ResolvePhase,
    localities: Vec<ResolvedLocality>,
    source: Option<CoverageSource>,
}
