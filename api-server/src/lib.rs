//! AltaMedica placeholder API: health checks and stub endpoints that answer
//! with canned JSON.

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod telemetry;
