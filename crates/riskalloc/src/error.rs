use crate::config::ConfigError;
use crate::engine::EngineConfigError;
use crate::readings::ReadingsImportError;
use crate::telemetry::TelemetryError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

/// Failures surfaced by the service and CLI entry points.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Engine(EngineConfigError),
    Readings(ReadingsImportError),
    /// Request body that could not be read as the expected JSON.
    Request(JsonRejection),
}

impl AppError {
    /// Short machine-readable tag included in HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::Telemetry(_) => "telemetry",
            AppError::Io(_) => "io",
            AppError::Engine(_) => "engine_config",
            AppError::Readings(_) => "readings",
            AppError::Request(_) => "request",
        }
    }

    /// Only malformed caller input is the client's fault.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Readings(_) => StatusCode::BAD_REQUEST,
            AppError::Request(rejection) => rejection.status(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "invalid configuration: {err}"),
            AppError::Telemetry(err) => write!(f, "could not start tracing: {err}"),
            AppError::Io(err) => write!(f, "io failure: {err}"),
            AppError::Engine(err) => write!(f, "engine tables rejected: {err}"),
            AppError::Readings(err) => write!(f, "readings rejected: {err}"),
            AppError::Request(err) => write!(f, "request rejected: {}", err.body_text()),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Engine(err) => Some(err),
            AppError::Readings(err) => Some(err),
            AppError::Request(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.to_string(), "kind": self.kind() });
        (self.status(), Json(body)).into_response()
    }
}

macro_rules! app_error_from {
    ($($source:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$source> for AppError {
                fn from(value: $source) -> Self {
                    Self::$variant(value)
                }
            }
        )+
    };
}

app_error_from! {
    ConfigError => Config,
    TelemetryError => Telemetry,
    std::io::Error => Io,
    EngineConfigError => Engine,
    ReadingsImportError => Readings,
    JsonRejection => Request,
}
