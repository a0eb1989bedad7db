//! Analysis orchestrator — combines similarity, keyword extraction and skill
//! matching into a single `AnalysisReport`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::keywords::{extract_keywords, JD_TOP_K};
use crate::analysis::scoring::SimilarityScorer;
use crate::analysis::text::normalize_text;
use crate::errors::AppError;

/// Missing keywords reported back to the caller.
pub const MAX_SKILLS_MISSING: usize = 15;

pub const MISSING_TEXT_SUMMARY: &str = "Please provide both resume text and a job description.";

const EXCELLENT_SUMMARY: &str = "Excellent match – your resume is highly aligned with this job.";
const GOOD_SUMMARY: &str = "Good match – with a few improvements, this resume will be strong.";
const PARTIAL_SUMMARY: &str =
    "Partial match – you are missing several key skills from the job description.";
const LOW_SUMMARY: &str =
    "Low match – consider tailoring your resume significantly to this role.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub match_score: f64, // 0 – 100, two decimals
    pub summary: String,
    pub skills_present: Vec<String>,
    pub skills_missing: Vec<String>,
    pub jd_keywords: Vec<String>,
    pub model_name: String,
}

impl AnalysisReport {
    /// Zero-score report for a resume or job description that is blank.
    pub fn missing_text(model_name: &str) -> Self {
        Self {
            match_score: 0.0,
            summary: MISSING_TEXT_SUMMARY.to_string(),
            skills_present: vec![],
            skills_missing: vec![],
            jd_keywords: vec![],
            model_name: model_name.to_string(),
        }
    }
}

/// Scores a resume against a job description.
///
/// Blank input short-circuits to [`AnalysisReport::missing_text`] without
/// calling the scorer. The only error is a failure inside the scorer itself.
pub async fn analyze_resume(
    scorer: &dyn SimilarityScorer,
    resume_text: &str,
    jd_text: &str,
) -> Result<AnalysisReport, AppError> {
    let resume_text = normalize_text(resume_text);
    let jd_text = normalize_text(jd_text);

    if resume_text.is_empty() || jd_text.is_empty() {
        return Ok(AnalysisReport::missing_text(scorer.model_name()));
    }

    let similarity = scorer.score(&resume_text, &jd_text).await?;
    let match_score = round2(similarity.clamp(0.0, 1.0) * 100.0);

    let jd_keywords = extract_keywords(&jd_text, JD_TOP_K);
    let (skills_present, mut skills_missing) = partition_skills(&resume_text, &jd_keywords);
    skills_missing.truncate(MAX_SKILLS_MISSING);

    debug!(
        match_score,
        present = skills_present.len(),
        missing = skills_missing.len(),
        model = scorer.model_name(),
        "Resume analyzed"
    );

    Ok(AnalysisReport {
        match_score,
        summary: summary_for(match_score).to_string(),
        skills_present,
        skills_missing,
        jd_keywords,
        model_name: scorer.model_name().to_string(),
    })
}

/// Splits keywords by whether they occur anywhere in the resume.
///
/// Plain substring test on the lowercased resume, so "api" also matches
/// inside "rapid".
fn partition_skills(resume_text: &str, keywords: &[String]) -> (Vec<String>, Vec<String>) {
    let resume_lower = resume_text.to_lowercase();
    keywords
        .iter()
        .cloned()
        .partition(|kw| resume_lower.contains(kw.as_str()))
}

/// Maps a 0–100 score onto one of four fixed summaries.
pub fn summary_for(match_score: f64) -> &'static str {
    if match_score >= 80.0 {
        EXCELLENT_SUMMARY
    } else if match_score >= 60.0 {
        GOOD_SUMMARY
    } else if match_score >= 40.0 {
        PARTIAL_SUMMARY
    } else {
        LOW_SUMMARY
    }
}

/// Rounds to two decimals using the exact binary value of `value`, with
/// exact halves going to the even neighbour (0.125 -> 0.12, 0.375 -> 0.38).
fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    // exact product is scaled + err
    let err = value.mul_add(100.0, -scaled);
    let lower = scaled.floor();
    // sign of (exact fraction - 0.5); the rounded sum keeps the exact sign
    let above_half = (scaled - lower - 0.5) + err;

    let n = if above_half > 0.0 {
        lower + 1.0
    } else if above_half < 0.0 {
        lower
    } else if lower % 2.0 == 0.0 {
        lower
    } else {
        lower + 1.0
    };
    n / 100.0
}
