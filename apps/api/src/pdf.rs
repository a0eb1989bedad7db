use bytes::Bytes;
use tracing::debug;

use crate::errors::AppError;

/// Characters of extracted resume text echoed back by `/analyze-pdf`.
pub const EXCERPT_CHARS: usize = 500;

/// Extracts text page by page and joins the pages with newlines.
pub async fn extract_pdf_text(data: Bytes) -> Result<String, AppError> {
    let pages = extract_pdf_pages(data).await?;
    Ok(pages.join("\n"))
}

/// Text of each page, in page order. Parsing is CPU-bound, so it runs on
/// the blocking pool.
pub async fn extract_pdf_pages(data: Bytes) -> Result<Vec<String>, AppError> {
    let pages =
        tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem_by_pages(&data))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}")))?
            .map_err(|e| {
                AppError::UnprocessableEntity(format!("Failed to extract text from PDF: {e}"))
            })?;

    debug!(pages = pages.len(), "Extracted PDF text");
    Ok(pages)
}

/// First `max_chars` characters of `text`, cut on a char boundary.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
