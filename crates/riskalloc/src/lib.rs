pub mod config;
pub mod engine;
pub mod error;
pub mod readings;
pub mod telemetry;
