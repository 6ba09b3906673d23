//! Memory metrics endpoint.
//!
//! Reports rounded, human-readable counters rather than a scrape format; meant
//! for eyeballing a container, not for Prometheus.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::AppError;
use crate::memory::{format_megabytes, format_seconds, MemoryUsage};
use crate::state::AppState;

use super::timestamp;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryReport {
    pub rss: String,
    pub heap_total: String,
    pub heap_used: String,
    pub external: String,
}

impl From<MemoryUsage> for MemoryReport {
    fn from(usage: MemoryUsage) -> Self {
        Self {
            rss: format_megabytes(usage.rss),
            heap_total: format_megabytes(usage.heap_total),
            heap_used: format_megabytes(usage.heap_used),
            external: format_megabytes(usage.external),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MemoryMetrics {
    pub memory: MemoryReport,
    pub uptime: String,
    pub timestamp: String,
}

pub async fn metrics(State(state): State<AppState>) -> Result<Json<MemoryMetrics>, AppError> {
    let usage = MemoryUsage::sample()?;

    Ok(Json(MemoryMetrics {
        memory: usage.into(),
        uptime: format_seconds(state.uptime()),
        timestamp: timestamp(),
    }))
}
