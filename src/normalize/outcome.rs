//! Explicit per-stage outcomes: why a row was dropped, which shapes were
//! malformed, and which source mode produced the facts.

use serde::Serialize;

use crate::domain::facts::{FactDocument, ScheduleType};

/// Discipline subtrees recognized at the document root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Discipline {
    Electrical,
    Mechanical,
    Plumbing,
    Architectural,
}

impl Discipline {
    pub const ALL: [Discipline; 4] = [
        Discipline::Electrical,
        Discipline::Mechanical,
        Discipline::Plumbing,
        Discipline::Architectural,
    ];

    /// Root key, matched case-insensitively.
    pub fn root_key(&self) -> &'static str {
        match self {
            Discipline::Electrical => "electrical",
            Discipline::Mechanical => "mechanical",
            Discipline::Plumbing => "plumbing",
            Discipline::Architectural => "architectural",
        }
    }
}

impl std::fmt::Display for Discipline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.root_key())
    }
}

/// Which representation a document's facts came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    /// Explicit schedule blocks; discipline subtrees were ignored.
    Blocks,
    /// Discipline subtrees searched through the collector cascade.
    Fallback,
}

/// A container that had the wrong JSON type and was treated as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShapeIssue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discipline: Option<Discipline>,
    pub path: String,
    pub expected: &'static str,
}

impl std::fmt::Display for ShapeIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} is not a {}", self.path, self.expected)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DropReason {
    /// A required identity field was missing or blank.
    NoIdentity { field: &'static str },
    /// Another row of the same document already produced this id.
    Duplicate { id: String },
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::NoIdentity { field } => write!(f, "missing identity field `{field}`"),
            DropReason::Duplicate { id } => write!(f, "duplicate of {id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedRow {
    pub schedule_type: ScheduleType,
    pub source: String,
    #[serde(flatten)]
    pub reason: DropReason,
}

/// Everything one document produced.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub mode: SourceMode,
    pub facts: Vec<FactDocument>,
    pub dropped: Vec<DroppedRow>,
    pub issues: Vec<ShapeIssue>,
}

impl Extraction {
    pub fn empty(mode: SourceMode) -> Self {
        Self {
            mode,
            facts: Vec::new(),
            dropped: Vec::new(),
            issues: Vec::new(),
        }
    }
}
