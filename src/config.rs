use anyhow::{Context, Result};
use std::env;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }

    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub server_addr: String,

    // CORS
    pub cors_allow_origins: Vec<String>,

    // Requests
    pub max_body_bytes: usize,
    pub default_tenant_id: Option<String>,

    // Embedding service (disabled when no URL is configured)
    pub embedding: Option<EmbeddingSettings>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingSettings {
    pub service_url: Url,
    pub service_token: Option<String>,
    pub timeout_seconds: u64,
    pub max_retry_seconds: u64,
    pub concurrency: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any key lookup. Unset and blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let parsed = |key: &str, default: u64| {
            var(key).and_then(|s| s.parse().ok()).unwrap_or(default)
        };

        let env = Environment::from_str(&var("ENV").unwrap_or_else(|| "dev".to_string()));
        let server_addr = var("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string());

        // CORS
        let cors_allow_origins = var("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Requests
        let max_body_bytes = parsed("MAX_BODY_BYTES", 10 * 1024 * 1024) as usize; // 10 MiB default
        let default_tenant_id = var("DEFAULT_TENANT_ID");

        // Embedding service
        let embedding = match var("EMBEDDING_SERVICE_URL") {
            Some(raw) => {
                let service_url = Url::parse(&raw)
                    .with_context(|| format!("EMBEDDING_SERVICE_URL is not a valid URL: {raw}"))?;
                Some(EmbeddingSettings {
                    service_url,
                    service_token: var("EMBEDDING_SERVICE_TOKEN"),
                    timeout_seconds: parsed("EMBEDDING_TIMEOUT_SECONDS", 30),
                    max_retry_seconds: parsed("EMBEDDING_MAX_RETRY_SECONDS", 10),
                    concurrency: parsed("EMBEDDING_CONCURRENCY", 4).max(1) as usize,
                })
            }
            None => None,
        };

        Ok(Settings {
            env,
            server_addr,
            cors_allow_origins,
            max_body_bytes,
            default_tenant_id,
            embedding,
        })
    }
}
