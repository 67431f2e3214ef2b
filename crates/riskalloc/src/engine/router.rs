use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tracing::info;

use super::{AllocationEngine, EvaluationRequest};
use crate::error::AppError;

/// Router builder exposing the evaluation endpoint and the tier table.
pub fn allocation_router(engine: Arc<AllocationEngine>) -> Router {
    Router::new()
        .route("/api/v1/allocation/evaluate", post(evaluate_handler))
        .route("/api/v1/allocation/tiers", get(tiers_handler))
        .with_state(engine)
}

pub(crate) async fn evaluate_handler(
    State(engine): State<Arc<AllocationEngine>>,
    payload: Result<axum::Json<EvaluationRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let axum::Json(request) = payload?;
    let report = engine.evaluate(&request);
    info!(
        profile = report.profile.label(),
        tier = report.composite.tier.label(),
        adjustments = report.adjustments.len(),
        warnings = report.warnings.len(),
        "evaluated allocation request"
    );
    Ok((StatusCode::OK, axum::Json(report)).into_response())
}

pub(crate) async fn tiers_handler(State(engine): State<Arc<AllocationEngine>>) -> Response {
    let (min, max) = engine.tiers().domain();
    let payload = json!({
        "domain": { "min": min, "max": max },
        "tiers": engine.tiers().bands(),
        "unknown_fallback": engine.matrix().unknown_fallback(),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}
