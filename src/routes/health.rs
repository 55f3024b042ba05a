use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: ServiceHealth,
}

#[derive(Serialize)]
pub struct ServiceHealth {
    pub embedding: String,
}

/// Health check endpoint - public
///
/// Extraction has no runtime dependency, so the service is never unhealthy;
/// an unreachable embedding service only degrades it.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let embedding = match &state.embeddings {
        None => "disabled",
        Some(client) => match client.health_check().await {
            Ok(()) => "ok",
            Err(e) => {
                tracing::warn!(error = %e, "Embedding service health check failed");
                "error"
            }
        },
    };

    let status = if embedding == "error" { "degraded" } else { "healthy" };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services: ServiceHealth {
            embedding: embedding.to_string(),
        },
    })
}
