//! Extraction request/response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::facts::{FactDocument, ScheduleType, SheetMetadata};
use crate::normalize::{DroppedRow, Extraction, ShapeIssue, SourceMode};

// ============================================================================
// Fact Extraction
// ============================================================================

/// One sheet's document plus the metadata merged into its facts.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractFactsRequest {
    #[serde(default)]
    pub sheet: SheetMetadata,
    /// Root mapping: `blocks` and/or discipline subtrees.
    pub document: Value,
    /// Attach embedding vectors when the service is configured.
    #[serde(default)]
    pub embed: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchExtractRequest {
    pub sheets: Vec<ExtractFactsRequest>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExtractionCounts {
    pub emitted: usize,
    pub dropped: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractFactsResponse {
    pub mode: SourceMode,
    pub facts: Vec<FactDocument>,
    pub dropped: Vec<DroppedRow>,
    pub issues: Vec<ShapeIssue>,
    pub counts: ExtractionCounts,
    pub extracted_at: DateTime<Utc>,
}

impl ExtractFactsResponse {
    pub fn new(extraction: Extraction, extracted_at: DateTime<Utc>) -> Self {
        let counts = ExtractionCounts {
            emitted: extraction.facts.len(),
            dropped: extraction.dropped.len(),
        };
        Self {
            mode: extraction.mode,
            facts: extraction.facts,
            dropped: extraction.dropped,
            issues: extraction.issues,
            counts,
            extracted_at,
        }
    }
}

/// Results in request order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchExtractResponse {
    pub sheets: Vec<ExtractFactsResponse>,
}

// ============================================================================
// Block Classification
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassifyRequest {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassifyResponse {
    pub schedule_type: Option<ScheduleType>,
}
