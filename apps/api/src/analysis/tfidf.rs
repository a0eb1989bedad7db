// TF-IDF similarity over a two-document corpus.
//
// Each call builds a fresh vocabulary from exactly the resume and the job
// description, weights raw term counts by smoothed IDF
// (ln((1 + n) / (1 + df)) + 1), L2-normalises, and takes the cosine.
// Terms shared by both documents get the minimum IDF of 1.0, so overlap
// still counts; distinctive terms are boosted.

use std::collections::{BTreeMap, HashMap, HashSet};

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use stop_words::{get, LANGUAGE};

use crate::analysis::scoring::{cosine_similarity, SimilarityScorer};
use crate::errors::AppError;

pub const TFIDF_MODEL_NAME: &str = "tfidf-cosine";

/// Words of two or more word characters, matching the usual vectorizer default.
const TOKEN_PATTERN: &str = r"\b\w\w+\b";

pub struct TfIdfScorer {
    token_pattern: Regex,
    stop_words: HashSet<String>,
}

impl TfIdfScorer {
    pub fn new() -> Result<Self> {
        let token_pattern = Regex::new(TOKEN_PATTERN).context("Invalid TF-IDF token pattern")?;
        let stop_words = get(LANGUAGE::English).into_iter().collect();

        Ok(Self {
            token_pattern,
            stop_words,
        })
    }

    fn terms(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        self.token_pattern
            .find_iter(&lower)
            .map(|m| m.as_str())
            .filter(|t| !self.stop_words.contains(*t))
            .map(String::from)
            .collect()
    }

    /// Cosine similarity of the TF-IDF vectors of `a` and `b`.
    /// Returns 0.0 when neither document has a usable term.
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        let docs = [term_counts(self.terms(a)), term_counts(self.terms(b))];

        // Sorted vocabulary gives both vectors the same column order
        let vocabulary: BTreeMap<&str, f64> = docs
            .iter()
            .flat_map(|counts| counts.keys())
            .map(|term| {
                let df = docs.iter().filter(|d| d.contains_key(term)).count();
                (term.as_str(), smooth_idf(docs.len(), df))
            })
            .collect();

        if vocabulary.is_empty() {
            return 0.0;
        }

        let vectors: Vec<Vec<f64>> = docs
            .iter()
            .map(|counts| {
                let raw: Vec<f64> = vocabulary
                    .iter()
                    .map(|(term, idf)| counts.get(*term).copied().unwrap_or(0) as f64 * idf)
                    .collect();
                l2_normalize(raw)
            })
            .collect();

        cosine_similarity(&vectors[0], &vectors[1])
    }
}

#[async_trait]
impl SimilarityScorer for TfIdfScorer {
    async fn score(&self, text_a: &str, text_b: &str) -> Result<f64, AppError> {
        Ok(self.similarity(text_a, text_b))
    }

    fn model_name(&self) -> &str {
        TFIDF_MODEL_NAME
    }
}

fn term_counts(terms: Vec<String>) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for term in terms {
        *counts.entry(term).or_insert(0) += 1;
    }
    counts
}

fn smooth_idf(n_docs: usize, df: usize) -> f64 {
    ((1.0 + n_docs as f64) / (1.0 + df as f64)).ln() + 1.0
}

fn l2_normalize(mut v: Vec<f64>) -> Vec<f64> {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}
