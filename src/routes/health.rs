//! Liveness and readiness probes for container orchestration.
//!
//! `/health` tells the orchestrator whether to restart the container; `/ready`
//! whether to route traffic to it. Both answer as long as the process can serve
//! HTTP at all.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

use super::timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Healthy,
    Ready,
}

/// Probe response body. Readiness omits `uptime` and `version`.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub status: ProbeStatus,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Liveness probe handler.
pub async fn health(State(state): State<AppState>) -> Json<ServiceStatus> {
    Json(ServiceStatus {
        status: ProbeStatus::Healthy,
        timestamp: timestamp(),
        uptime: Some(state.uptime().as_secs_f64()),
        version: Some(state.config.service.version.clone()),
    })
}

/// Readiness probe handler.
pub async fn ready() -> Json<ServiceStatus> {
    Json(ServiceStatus {
        status: ProbeStatus::Ready,
        timestamp: timestamp(),
        uptime: None,
        version: None,
    })
}
