//! Health check handlers.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

const SERVICE_NAME: &str = "Reel AI Generator API";

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Provider credential presence.
#[derive(Serialize)]
pub struct ApisStatus {
    pub openai: bool,
    pub elevenlabs: bool,
    pub pexels: bool,
}

#[derive(Serialize)]
pub struct ApiHealthResponse {
    pub status: String,
    pub version: String,
    pub apis: ApisStatus,
}

/// Service health including which providers are configured.
pub async fn api_health(State(state): State<AppState>) -> Json<ApiHealthResponse> {
    Json(ApiHealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        apis: ApisStatus {
            openai: state.providers.openai,
            elevenlabs: state.providers.elevenlabs,
            pexels: state.providers.pexels,
        },
    })
}

#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub health: String,
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        name: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        health: "/api/health".to_string(),
    })
}
