//! Schedule normalization and fact extraction.
//!
//! Turns one drawing document (explicit schedule blocks, or loosely shaped
//! discipline subtrees) into flat, deduplicated facts with reproducible ids.
//! Nothing here performs I/O.

pub mod attributes;
pub mod classify;
pub mod collectors;
pub mod emitter;
pub mod fields;
pub mod identity;
pub mod keys;
pub mod outcome;
pub mod sanitize;
pub mod summary;
pub mod tree;

pub use classify::classify;
pub use emitter::FactEmitter;
pub use outcome::{DroppedRow, Extraction, ShapeIssue, SourceMode};
