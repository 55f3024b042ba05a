pub mod facts;
pub mod health;
pub mod schedules;

use axum::{routing::get, routing::post, Router};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Public routes
        .route("/health", get(health::health_check))
        // Fact extraction
        .route("/v1/facts/extract", post(facts::extract_facts))
        .route("/v1/facts/extract/batch", post(facts::extract_facts_batch))
        // Block classification
        .route("/v1/schedules/classify", post(schedules::classify_schedule))
}
