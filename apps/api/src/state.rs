use std::sync::Arc;

use crate::analysis::scoring::SimilarityScorer;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable similarity scorer, chosen at startup via `SCORER`.
    pub scorer: Arc<dyn SimilarityScorer>,
}
