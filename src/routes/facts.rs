//! Fact extraction routes
//!
//! Run the schedule normalizer over one or more sheet documents and return
//! the facts, together with every dropped row and malformed container.

use axum::{extract::State, http::HeaderMap};
use chrono::Utc;
use std::sync::Arc;

use crate::api::{AppJson, DataResponse};
use crate::app::AppState;
use crate::domain::extraction::*;
use crate::error::{ApiError, ApiResult};
use crate::middleware::RequestIdExt;
use crate::normalize::FactEmitter;
use crate::services::attach_embeddings;

/// Extract facts from one sheet document
pub async fn extract_facts(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    AppJson(req): AppJson<ExtractFactsRequest>,
) -> ApiResult<DataResponse<ExtractFactsResponse>> {
    ensure_document_object(&req, "document")?;

    let response = run_extraction(&state, req).await;

    tracing::info!(
        request_id = ?headers.request_id(),
        mode = ?response.mode,
        emitted = response.counts.emitted,
        dropped = response.counts.dropped,
        "Facts extracted"
    );

    Ok(DataResponse::new(response))
}

/// Extract facts from several sheets; each sheet is independent
pub async fn extract_facts_batch(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    AppJson(req): AppJson<BatchExtractRequest>,
) -> ApiResult<DataResponse<BatchExtractResponse>> {
    for (i, sheet) in req.sheets.iter().enumerate() {
        ensure_document_object(sheet, &format!("sheets[{i}].document"))?;
    }

    let mut sheets = Vec::with_capacity(req.sheets.len());
    for sheet in req.sheets {
        sheets.push(run_extraction(&state, sheet).await);
    }

    tracing::info!(
        request_id = ?headers.request_id(),
        sheets = sheets.len(),
        emitted = sheets.iter().map(|s| s.counts.emitted).sum::<usize>(),
        "Batch facts extracted"
    );

    Ok(DataResponse::new(BatchExtractResponse { sheets }))
}

fn ensure_document_object(req: &ExtractFactsRequest, field: &str) -> Result<(), ApiError> {
    if req.document.is_object() {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!("{field} must be a JSON object")))
    }
}

async fn run_extraction(state: &AppState, mut req: ExtractFactsRequest) -> ExtractFactsResponse {
    if req.sheet.tenant_id.is_none() {
        req.sheet.tenant_id = state.settings.default_tenant_id.clone();
    }

    let extraction = FactEmitter::new(req.sheet).extract(&req.document);
    let mut response = ExtractFactsResponse::new(extraction, Utc::now());

    if req.embed {
        match &state.embeddings {
            Some(client) => attach_embeddings(client, &mut response.facts).await,
            None => tracing::debug!("Embeddings requested but no embedding service is configured"),
        }
    }

    response
}
