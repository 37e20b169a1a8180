//! Public server status and metrics.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::AppState;
use crate::config::Configuration;
use crate::error::{Result, ServerError};

/// Structured configuration.
#[derive(Serialize)]
pub struct Status {
    name: String,
    version: String,
}

/// Public server status.
pub async fn status(State(config): State<Arc<Configuration>>) -> Json<Status> {
    Json(Status {
        name: config.name.clone(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Prometheus metrics, when the recorder is installed.
pub async fn metrics(State(state): State<AppState>) -> Result<String> {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .ok_or(ServerError::NotFound("metrics"))
}
