//! Domain types and DTOs
//!
//! Fact documents produced by the engine, and the request/response shapes
//! of the extraction API.

pub mod extraction;
pub mod facts;
