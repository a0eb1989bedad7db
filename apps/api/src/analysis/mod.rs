// Resume analysis engine
// Implements: text normalization, keyword extraction, similarity scoring
// (embedding or TF-IDF), and the orchestrator that assembles the report.

pub mod analyzer;
pub mod embedding;
pub mod handlers;
pub mod keywords;
pub mod model_store;
pub mod scoring;
pub mod text;
pub mod tfidf;
