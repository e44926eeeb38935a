//! Axum route handlers for the matching API.
//!
//! Each request walks the same pipeline: validate → extract → score → shape.
//! Nothing is persisted; the request carries all state.

use axum::extract::{Multipart, State};
use axum::{Form, Json};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::errors::AppError;
use crate::matching::ai_client::ScoreReport;
use crate::matching::extractor::extract_text;
use crate::matching::Perspective;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScoreTextRequest {
    #[serde(rename = "resumeText")]
    pub resume_text: String,
    #[serde(rename = "jobDescription")]
    pub job_description: String,
    pub perspective: String,
}

/// Perspective-specific response envelope. `score` and `suggestions` are the
/// legacy flat mirrors kept for older callers; newer callers read
/// `overall_score` / `sub_scores` / `analysis`.
#[derive(Debug, Serialize)]
pub struct MatchData {
    pub perspective: Perspective,
    pub overall_score: Option<f64>,
    pub sub_scores: BTreeMap<String, Option<f64>>,
    pub analysis: BTreeMap<String, Value>,
    pub partial: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<String>,
    pub score: Option<f64>,
    pub suggestions: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub success: bool,
    pub data: MatchData,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/matching/score-upload
///
/// Multipart: `resume` (PDF or DOCX file), `jobDescription`, `perspective`.
/// The file type is checked before any parsing or outbound call.
pub async fn handle_score_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<MatchResponse>, AppError> {
    let mut resume: Option<(String, Bytes)> = None;
    let mut job_description: Option<String> = None;
    let mut perspective_raw: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let read_err = |e| AppError::Validation(format!("Failed to read multipart field: {e}"));
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(read_err)?;
                resume = Some((filename, bytes));
            }
            "jobDescription" => job_description = Some(field.text().await.map_err(read_err)?),
            "perspective" => perspective_raw = Some(field.text().await.map_err(read_err)?),
            _ => {} // unknown fields are ignored
        }
    }

    let perspective = parse_perspective(perspective_raw.as_deref())?;
    let job_description = job_description
        .filter(|jd| !jd.trim().is_empty())
        .ok_or_else(|| AppError::Validation("jobDescription cannot be empty".to_string()))?;
    let (filename, bytes) =
        resume.ok_or_else(|| AppError::Validation("resume file is required".to_string()))?;

    let resume_text = extract_text(&bytes, &filename)?;
    if resume_text.trim().is_empty() {
        return Err(AppError::EmptyContent);
    }

    let report = state
        .ai
        .score(&job_description, &resume_text, perspective)
        .await?;

    Ok(Json(MatchResponse {
        success: true,
        data: shape_report(report),
    }))
}

/// POST /api/v1/matching/score-text
///
/// Same pipeline as score-upload, minus extraction: the resume arrives as
/// form text (`resumeText`, `jobDescription`, `perspective`).
pub async fn handle_score_text(
    State(state): State<AppState>,
    Form(request): Form<ScoreTextRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let perspective = parse_perspective(Some(&request.perspective))?;
    if request.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "jobDescription cannot be empty".to_string(),
        ));
    }
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation(
            "resumeText cannot be empty".to_string(),
        ));
    }

    let report = state
        .ai
        .score(&request.job_description, &request.resume_text, perspective)
        .await?;

    Ok(Json(MatchResponse {
        success: true,
        data: shape_report(report),
    }))
}

fn parse_perspective(raw: Option<&str>) -> Result<Perspective, AppError> {
    raw.unwrap_or_default().parse::<Perspective>().map_err(|_| {
        AppError::Validation("perspective must be 'recruiter' or 'applicant'".to_string())
    })
}

/// Reshapes a validated (possibly partial) report into the response envelope.
/// An incomplete model answer is still a success: `partial` is set and the
/// omitted keys are listed.
fn shape_report(report: ScoreReport) -> MatchData {
    let suggestions = report
        .analysis
        .get(report.perspective.summary_field())
        .or_else(|| report.analysis.values().next())
        .map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });

    let partial = report.is_partial();

    MatchData {
        perspective: report.perspective,
        score: report.overall_score,
        overall_score: report.overall_score,
        sub_scores: report.sub_scores,
        partial,
        missing_fields: report.missing_fields,
        suggestions,
        analysis: report.analysis,
    }
}
