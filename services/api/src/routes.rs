use crate::infra::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use riskalloc::engine::{allocation_router, AllocationEngine, AllocationProfile, EvaluationReport};
use riskalloc::error::AppError;
use riskalloc::readings::ReadingsImporter;
use serde::Deserialize;
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;
use tracing::info;

/// CSV snapshot posted inline, evaluated for one profile.
#[derive(Debug, Deserialize)]
pub(crate) struct ImportRequest {
    pub(crate) profile: AllocationProfile,
    pub(crate) csv: String,
}

pub(crate) fn with_service_routes(engine: Arc<AllocationEngine>) -> Router {
    let import = Router::new()
        .route("/api/v1/allocation/import", post(import_endpoint))
        .with_state(engine.clone());

    allocation_router(engine)
        .merge(import)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    if ready {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "initializing" })),
        )
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn import_endpoint(
    State(engine): State<Arc<AllocationEngine>>,
    payload: Result<Json<ImportRequest>, JsonRejection>,
) -> Result<Json<EvaluationReport>, AppError> {
    let Json(ImportRequest { profile, csv }) = payload?;
    let request = ReadingsImporter::from_reader(Cursor::new(csv.into_bytes()), profile)?;
    let report = engine.evaluate(&request);

    info!(
        profile = profile.label(),
        tier = report.composite.tier.label(),
        warnings = report.warnings.len(),
        "evaluated imported snapshot"
    );
    Ok(Json(report))
}
