//! Client for the text-embedding service.
//!
//! Embeddings are an optional enrichment: any failure is logged and the fact
//! is returned without a vector.

use anyhow::{Context, Result};
use backoff::{future::retry, ExponentialBackoff, ExponentialBackoffBuilder};
use futures::{stream, StreamExt};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::EmbeddingSettings;
use crate::domain::facts::{AttrValue, FactDocument};
use crate::normalize::summary::FALLBACK_SUMMARY;
use crate::normalize::tree::render_f64;

const EMBEDDINGS_PATH: &str = "v1/embeddings";
const HEALTH_PATH: &str = "health";

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("embedding service returned {0}")]
    Status(StatusCode),

    #[error("embedding service returned an empty vector")]
    Empty,
}

/// Client for the embedding service.
#[derive(Clone)]
pub struct EmbeddingClient {
    client: Client,
    embeddings_url: Url,
    health_url: Url,
    token: Option<String>,
    max_retry: Duration,
    concurrency: usize,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

impl EmbeddingClient {
    pub fn new(settings: &EmbeddingSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        let embeddings_url = service_endpoint(&settings.service_url, EMBEDDINGS_PATH)?;
        let health_url = service_endpoint(&settings.service_url, HEALTH_PATH)?;

        tracing::info!(url = %embeddings_url, "Embedding client initialized");

        Ok(Self {
            client,
            embeddings_url,
            health_url,
            token: settings.service_token.clone(),
            max_retry: Duration::from_secs(settings.max_retry_seconds),
            concurrency: settings.concurrency.max(1),
        })
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Check embedding service health.
    pub async fn health_check(&self) -> Result<()> {
        self.client
            .get(self.health_url.clone())
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .context("Embedding service health check failed")?
            .error_for_status()
            .context("Embedding service unhealthy")?;

        Ok(())
    }

    /// Vector for `text`, or `None` when the service can't provide one.
    pub async fn embed(&self, text: &str) -> Option<Vec<f32>> {
        match self.try_embed(text).await {
            Ok(vector) => Some(vector),
            Err(e) => {
                warn!(error = %e, "Embedding failed, fact kept without vector");
                None
            }
        }
    }

    /// Embed with retries on transient failures.
    #[instrument(skip(self, text), fields(chars = text.len()))]
    pub async fn try_embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        retry(self.backoff(), move || self.embed_once(text)).await
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(200))
            .with_max_elapsed_time(Some(self.max_retry))
            .build()
    }

    async fn embed_once(&self, text: &str) -> Result<Vec<f32>, backoff::Error<EmbeddingError>> {
        let mut req = self
            .client
            .post(self.embeddings_url.clone())
            .json(&EmbedRequest { text });

        if let Some(token) = &self.token {
            req = req.header("X-Internal-Token", token);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                backoff::Error::transient(EmbeddingError::Transport(e))
            } else {
                backoff::Error::permanent(EmbeddingError::Transport(e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = %status, "Embedding service error");
            let err = EmbeddingError::Status(status);
            return Err(if is_transient(status) {
                backoff::Error::transient(err)
            } else {
                backoff::Error::permanent(err)
            });
        }

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| backoff::Error::permanent(EmbeddingError::Transport(e)))?;
        if body.embedding.is_empty() {
            return Err(backoff::Error::permanent(EmbeddingError::Empty));
        }
        Ok(body.embedding)
    }
}

fn is_transient(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// `base` joined with `path`, keeping any path prefix `base` already has.
fn service_endpoint(base: &Url, path: &str) -> Result<Url> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let prefixed = format!("{}/", base.path());
        base.set_path(&prefixed);
    }
    base.join(path)
        .with_context(|| format!("Invalid embedding endpoint {base}{path}"))
}

/// Text sent for embedding: the summary, or when the summary is the
/// placeholder, one rebuilt from the key, description and raw attributes.
pub fn embedding_text(fact: &FactDocument) -> String {
    if fact.content != FALLBACK_SUMMARY {
        return fact.content.clone();
    }

    let mut parts = vec![fact.schedule_type.to_string()];
    parts.extend(fact.key.iter().map(|(name, value)| format!("{name} {value}")));
    if let Some(description) = &fact.description {
        parts.push(description.clone());
    }
    parts.extend(fact.attributes.iter().filter_map(|(name, value)| match value {
        AttrValue::Number(n) => Some(format!("{name}: {}", render_f64(*n))),
        AttrValue::Text(s) if name != "description" => Some(format!("{name}: {s}")),
        AttrValue::Text(_) | AttrValue::Flag(_) => None,
    }));
    parts.join(" | ")
}

/// Attach vectors to `facts`, at most `client.concurrency()` requests in flight.
pub async fn attach_embeddings(client: &EmbeddingClient, facts: &mut [FactDocument]) {
    let texts: Vec<String> = facts.iter().map(embedding_text).collect();
    let vectors: Vec<Option<Vec<f32>>> = stream::iter(texts)
        .map(move |text| async move { client.embed(&text).await })
        .buffered(client.concurrency())
        .collect()
        .await;

    let attached = vectors.iter().filter(|v| v.is_some()).count();
    for (fact, vector) in facts.iter_mut().zip(vectors) {
        fact.embedding = vector;
    }
    debug!(facts = facts.len(), attached, "Embeddings attached");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::facts::{AttributeBag, IdentityKey, ScheduleType, SheetMetadata, DOC_TYPE};

    fn fact(content: &str) -> FactDocument {
        let mut attributes = AttributeBag::new();
        attributes.set_text("description", "Corridor lights");
        attributes.set_number("rating_a", 20.0);
        attributes.set_flag("is_spare", false);
        FactDocument {
            id: "t-p-E1-panel-circuit-001-panel-L1".into(),
            doc_type: DOC_TYPE.into(),
            schedule_type: ScheduleType::Panel,
            key: IdentityKey::new().with("panel", "L1").with("circuit", "1"),
            attributes,
            labels: Vec::new(),
            content: content.into(),
            sheet: SheetMetadata::default(),
            panel_name: Some("L1".into()),
            circuit_number: Some("1".into()),
            poles: None,
            amps: Some("20".into()),
            kva: None,
            description: Some("Corridor lights".into()),
            embedding: None,
        }
    }

    fn settings(url: &str) -> EmbeddingSettings {
        EmbeddingSettings {
            service_url: Url::parse(url).unwrap(),
            service_token: None,
            timeout_seconds: 1,
            max_retry_seconds: 0,
            concurrency: 2,
        }
    }

    #[test]
    fn summary_is_embedded_as_is() {
        let f = fact("Panel L1 — Ckt 1 — Corridor lights — 20A");
        assert_eq!(embedding_text(&f), "Panel L1 — Ckt 1 — Corridor lights — 20A");
    }

    #[test]
    fn placeholder_summary_is_rebuilt() {
        let text = embedding_text(&fact("row"));
        assert_eq!(text, "panel | panel L1 | circuit 1 | Corridor lights | rating_a: 20");
    }

    #[test]
    fn endpoints_keep_base_path() {
        let base = Url::parse("http://embed:8000/internal").unwrap();
        assert_eq!(
            service_endpoint(&base, EMBEDDINGS_PATH).unwrap().as_str(),
            "http://embed:8000/internal/v1/embeddings"
        );
        let base = Url::parse("http://embed:8000").unwrap();
        assert_eq!(
            service_endpoint(&base, HEALTH_PATH).unwrap().as_str(),
            "http://embed:8000/health"
        );
    }

    #[test]
    fn retry_classification() {
        assert!(is_transient(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_transient(StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_transient(StatusCode::BAD_REQUEST));
        assert!(!is_transient(StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn unreachable_service_leaves_facts_without_vectors() {
        let client = EmbeddingClient::new(&settings("http://127.0.0.1:9")).unwrap();
        let mut facts = vec![fact("row"), fact("Panel L1 — Ckt 1")];
        attach_embeddings(&client, &mut facts).await;
        assert!(facts.iter().all(|f| f.embedding.is_none()));
    }
}
