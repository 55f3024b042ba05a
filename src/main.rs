mod api;
mod app;
mod config;
mod domain;
mod error;
mod logging;
mod middleware;
mod normalize;
mod routes;
mod services;

use anyhow::Result;

use services::EmbeddingClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = config::Settings::from_env()?;

    // Initialize logging
    logging::init_logging(&settings.env);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        max_body_bytes = settings.max_body_bytes,
        "Starting schedule facts service"
    );

    // Embedding client is optional; extraction works without it
    let embeddings = match &settings.embedding {
        Some(embedding_settings) => {
            let client = EmbeddingClient::new(embedding_settings)?;

            // Check embedding service health without blocking startup
            tokio::spawn({
                let client = client.clone();
                async move {
                    match client.health_check().await {
                        Ok(()) => tracing::info!("Embedding service is healthy"),
                        Err(e) => tracing::warn!(
                            error = %e,
                            "Embedding service health check failed - facts will be returned without vectors until it recovers"
                        ),
                    }
                }
            });

            Some(client)
        }
        None => {
            tracing::info!("EMBEDDING_SERVICE_URL not set - embeddings disabled");
            None
        }
    };

    // Create application state
    let state = app::AppState::new(settings.clone(), embeddings);

    // Build application
    let app = app::create_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
