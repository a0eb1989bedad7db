//! Similarity scoring — pluggable, trait-based scorer comparing two documents.
//!
//! Backends: `EmbeddingScorer` (all-MiniLM-L6-v2 via ONNX) and `TfIdfScorer`
//! (two-document TF-IDF space). `AppState` holds an `Arc<dyn SimilarityScorer>`
//! chosen at startup via `SCORER`.

use async_trait::async_trait;

use crate::errors::AppError;

/// Implement this to swap backends without touching the analyzer or handlers.
#[async_trait]
pub trait SimilarityScorer: Send + Sync {
    /// Similarity of two normalized texts, in `[0.0, 1.0]`.
    async fn score(&self, text_a: &str, text_b: &str) -> Result<f64, AppError>;

    /// Identifier reported back to callers as `model_name`.
    fn model_name(&self) -> &str;
}

/// Cosine similarity clamped to `[0, 1]`.
///
/// Mismatched lengths, empty inputs and zero vectors score 0.0.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let mag_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    let denom = mag_a * mag_b;
    if denom < f64::EPSILON {
        0.0
    } else {
        (dot / denom).clamp(0.0, 1.0)
    }
}
