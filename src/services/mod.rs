//! Service layer modules for external integrations.
//!
//! Contains the client for the text-embedding service.

pub mod embeddings;

pub use embeddings::{attach_embeddings, EmbeddingClient};
