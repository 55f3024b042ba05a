use axum::Json;

use crate::api::AppJson;
use crate::domain::extraction::{ClassifyRequest, ClassifyResponse};
use crate::normalize::classify;

/// Classify schedule block metadata; `null` means the block would be skipped
pub async fn classify_schedule(AppJson(req): AppJson<ClassifyRequest>) -> Json<ClassifyResponse> {
    Json(ClassifyResponse {
        schedule_type: classify(req.kind.as_deref(), req.name.as_deref(), req.subtype.as_deref()),
    })
}
