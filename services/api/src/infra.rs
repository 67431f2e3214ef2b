use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use riskalloc::config::AppConfig;
use riskalloc::engine::AllocationEngine;
use riskalloc::error::AppError;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Builds the engine from the configured table source.
pub(crate) fn load_engine(config: &AppConfig) -> Result<AllocationEngine, AppError> {
    let tables = config.engine.load()?;
    let engine = AllocationEngine::new(tables)?;
    info!(source = %config.engine.describe(), "allocation engine loaded");
    Ok(engine)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
