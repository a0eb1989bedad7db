mod analysis;
mod config;
mod errors;
mod pdf;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::embedding::{EmbeddingScorer, SentenceEmbedder};
use crate::analysis::model_store::ensure_embedding_model;
use crate::analysis::scoring::SimilarityScorer;
use crate::analysis::tfidf::TfIdfScorer;
use crate::config::{Config, ScorerKind};
use crate::routes::{build_router, cors_layer};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first so RUST_LOG from .env applies to logging
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Analyzer API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the similarity scorer once; it is shared read-only by all requests
    let scorer = build_scorer(&config).await?;
    info!("Similarity scorer initialized (model: {})", scorer.model_name());

    let cors = cors_layer(&config.cors_allowed_origins)?;
    info!("CORS allowed origins: {:?}", config.cors_allowed_origins);

    let state = AppState {
        config: config.clone(),
        scorer,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs the scorer selected by `SCORER`, loading the embedding model if needed.
async fn build_scorer(config: &Config) -> Result<Arc<dyn SimilarityScorer>> {
    match config.scorer {
        ScorerKind::Embedding => {
            ensure_embedding_model(&config.model_dir, config.model_auto_download).await?;
            let model_dir = config.model_dir.clone();
            let embedder =
                tokio::task::spawn_blocking(move || SentenceEmbedder::load(&model_dir)).await??;
            Ok(Arc::new(EmbeddingScorer::new(Arc::new(embedder))))
        }
        ScorerKind::TfIdf => Ok(Arc::new(TfIdfScorer::new()?)),
    }
}
