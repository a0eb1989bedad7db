// Sentence-embedding similarity using all-MiniLM-L6-v2.
//
// Both documents are embedded into 384-dimensional vectors and compared with
// cosine similarity. The model runs locally through ONNX Runtime; token
// embeddings are mean-pooled over the attention mask, matching how the model
// was trained.
//
// The embedder is loaded once in `main` and handed to the scorer as an
// `Arc<SentenceEmbedder>`. It is never reloaded while the process runs.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info};

use crate::analysis::model_store::{EMBEDDING_MODEL_FILE, EMBEDDING_TOKENIZER_FILE};
use crate::analysis::scoring::{cosine_similarity, SimilarityScorer};
use crate::errors::AppError;

pub const EMBEDDING_MODEL_NAME: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Embedding dimension for all-MiniLM-L6-v2.
pub const EMBEDDING_DIM: usize = 384;

/// Word pieces kept per document; longer text is truncated.
const MAX_SEQ_LEN: usize = 256;

/// Read-only handle to the ONNX session and tokenizer.
///
/// `ort` needs exclusive access to run a session, hence the mutex; the model
/// weights themselves are never mutated.
pub struct SentenceEmbedder {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
}

impl SentenceEmbedder {
    /// Load `model.onnx` and `tokenizer.json` from `model_dir`.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let model_path = model_dir.join(EMBEDDING_MODEL_FILE);
        let tokenizer_path = model_dir.join(EMBEDDING_TOKENIZER_FILE);

        if !model_path.exists() {
            anyhow::bail!(
                "Embedding model not found: {}\nSet MODEL_AUTO_DOWNLOAD=true or place the file manually.",
                model_path.display()
            );
        }
        if !tokenizer_path.exists() {
            anyhow::bail!(
                "Embedding tokenizer not found: {}\nSet MODEL_AUTO_DOWNLOAD=true or place the file manually.",
                tokenizer_path.display()
            );
        }

        let session = Session::builder()
            .context("Failed to create ONNX session builder")?
            .commit_from_file(&model_path)
            .with_context(|| {
                format!(
                    "Failed to load embedding model from {}",
                    model_path.display()
                )
            })?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load embedding tokenizer: {}", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQ_LEN,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Failed to configure tokenizer truncation: {}", e))?;
        tokenizer.with_padding(None);

        info!("Loaded sentence embedding model from {}", model_dir.display());

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
        })
    }

    /// Embed a batch of texts on the blocking pool.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, AppError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let session = Arc::clone(&self.session);
        let tokenizer = Arc::clone(&self.tokenizer);
        let texts = texts.to_vec();

        tokio::task::spawn_blocking(move || embed_sync(&session, &tokenizer, &texts))
            .await
            .map_err(|e| AppError::Embedding(format!("Embedding task failed: {e}")))?
            .map_err(|e| AppError::Embedding(format!("{e:#}")))
    }
}

fn embed_sync(
    session: &Mutex<Session>,
    tokenizer: &Tokenizer,
    texts: &[String],
) -> Result<Vec<Vec<f64>>> {
    let encodings: Vec<_> = texts
        .iter()
        .map(|t| {
            tokenizer
                .encode(t.as_str(), true)
                .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))
        })
        .collect::<Result<Vec<_>>>()?;

    let batch_size = encodings.len();
    let max_len = encodings
        .iter()
        .map(|e| e.get_ids().len())
        .max()
        .unwrap_or(0);

    if max_len == 0 {
        return Ok(vec![vec![0.0; EMBEDDING_DIM]; batch_size]);
    }

    // input_ids and token_type_ids pad with 0; attention_mask marks real tokens
    let mut input_ids: Vec<i64> = Vec::with_capacity(batch_size * max_len);
    let mut attention_mask: Vec<i64> = Vec::with_capacity(batch_size * max_len);

    for enc in &encodings {
        let pad_len = max_len - enc.get_ids().len();
        input_ids.extend(enc.get_ids().iter().map(|&id| id as i64));
        input_ids.extend(std::iter::repeat_n(0i64, pad_len));
        attention_mask.extend(enc.get_attention_mask().iter().map(|&m| m as i64));
        attention_mask.extend(std::iter::repeat_n(0i64, pad_len));
    }
    let token_type_ids = vec![0i64; batch_size * max_len];

    let shape = [batch_size as i64, max_len as i64];
    let input_ids_tensor =
        Tensor::from_array((shape, input_ids)).context("Failed to create input_ids tensor")?;
    let attention_mask_tensor = Tensor::from_array((shape, attention_mask.clone()))
        .context("Failed to create attention_mask tensor")?;
    let token_type_ids_tensor = Tensor::from_array((shape, token_type_ids))
        .context("Failed to create token_type_ids tensor")?;

    // last_hidden_state: [batch, seq_len, EMBEDDING_DIM]
    let hidden_states = {
        let mut session = session
            .lock()
            .map_err(|e| anyhow::anyhow!("Session lock poisoned: {}", e))?;

        let outputs = session
            .run(ort::inputs! {
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor,
                "token_type_ids" => token_type_ids_tensor
            })
            .context("Embedding ONNX inference failed")?;

        let (_shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .context("Failed to extract embedding output tensor")?;

        data.to_vec()
    };

    let embeddings = mean_pool(&hidden_states, &attention_mask, batch_size, max_len);

    debug!(
        batch_size = batch_size,
        seq_len = max_len,
        "Computed sentence embeddings"
    );

    Ok(embeddings)
}

/// Averages token embeddings per sequence, counting only unmasked tokens.
fn mean_pool(
    hidden_states: &[f32],
    attention_mask: &[i64],
    batch_size: usize,
    seq_len: usize,
) -> Vec<Vec<f64>> {
    (0..batch_size)
        .map(|i| {
            let mut sum = vec![0.0_f64; EMBEDDING_DIM];
            let mut mask_sum = 0.0_f64;

            for j in 0..seq_len {
                let mask_val = attention_mask[i * seq_len + j] as f64;
                if mask_val > 0.0 {
                    mask_sum += mask_val;
                    let offset = (i * seq_len + j) * EMBEDDING_DIM;
                    for (k, acc) in sum.iter_mut().enumerate() {
                        *acc += hidden_states[offset + k] as f64 * mask_val;
                    }
                }
            }

            if mask_sum > 0.0 {
                for val in &mut sum {
                    *val /= mask_sum;
                }
            }
            sum
        })
        .collect()
}

/// Scores two documents by the cosine of their sentence embeddings.
pub struct EmbeddingScorer {
    embedder: Arc<SentenceEmbedder>,
}

impl EmbeddingScorer {
    pub fn new(embedder: Arc<SentenceEmbedder>) -> Self {
        Self { embedder }
    }
}

#[async_trait]
impl SimilarityScorer for EmbeddingScorer {
    async fn score(&self, text_a: &str, text_b: &str) -> Result<f64, AppError> {
        let embeddings = self
            .embedder
            .embed_batch(&[text_a.to_string(), text_b.to_string()])
            .await?;

        match embeddings.as_slice() {
            [a, b] => Ok(cosine_similarity(a, b)),
            other => Err(AppError::Embedding(format!(
                "Expected 2 embeddings, got {}",
                other.len()
            ))),
        }
    }

    fn model_name(&self) -> &str {
        EMBEDDING_MODEL_NAME
    }
}
