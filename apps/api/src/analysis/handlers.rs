//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::analyzer::{analyze_resume, AnalysisReport};
use crate::errors::AppError;
use crate::pdf::{excerpt, extract_pdf_text, EXCERPT_CHARS};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeTextRequest {
    pub resume_text: String,
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzePdfResponse {
    pub resume_text_excerpt: String,
    #[serde(flatten)]
    pub report: AnalysisReport,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /analyze-text
pub async fn handle_analyze_text(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeTextRequest>,
) -> Result<Json<AnalysisReport>, AppError> {
    let report = analyze_resume(
        state.scorer.as_ref(),
        &request.resume_text,
        &request.job_description,
    )
    .await?;

    Ok(Json(report))
}

/// POST /analyze-pdf
///
/// Multipart form with a `file` (PDF) and a `job_description` text field.
pub async fn handle_analyze_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzePdfResponse>, AppError> {
    let mut file: Option<Bytes> = None;
    let mut job_description: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => file = Some(field.bytes().await?),
            Some("job_description") => job_description = Some(field.text().await?),
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::Validation("file is required".to_string()))?;
    let job_description = job_description
        .ok_or_else(|| AppError::Validation("job_description is required".to_string()))?;

    info!(bytes = file.len(), "Received resume PDF");
    let resume_text = extract_pdf_text(file).await?;

    let report = analyze_resume(state.scorer.as_ref(), &resume_text, &job_description).await?;

    Ok(Json(AnalyzePdfResponse {
        resume_text_excerpt: excerpt(&resume_text, EXCERPT_CHARS),
        report,
    }))
}
