//! Welcome endpoint describing the running deployment.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

pub const WELCOME_MESSAGE: &str = "Welcome to the Demo Application!";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WelcomeInfo {
    pub message: String,
    pub environment: String,
    pub hostname: String,
    pub version: String,
}

pub async fn index(State(state): State<AppState>) -> Json<WelcomeInfo> {
    let service = &state.config.service;
    Json(WelcomeInfo {
        message: WELCOME_MESSAGE.to_string(),
        environment: service.environment.clone(),
        hostname: service.hostname.clone(),
        version: service.version.clone(),
    })
}
