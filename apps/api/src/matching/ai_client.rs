/// Gemini client: the single point of entry for upstream model calls.
///
/// All scoring traffic goes through this module: prompt construction,
/// the one outbound POST, fence stripping, JSON parsing, and validation
/// of the perspective-specific key set. No retries anywhere: a single
/// upstream failure surfaces immediately to the caller.
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

use super::prompts::build_prompt;
use super::Perspective;

const GEMINI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash-latest:generateContent";
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60);

/// Combined job-description + resume cap, to bound upstream request cost.
pub const MAX_COMBINED_INPUT_CHARS: usize = 100_000;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("GEMINI_API_KEY is not configured")]
    Misconfigured,

    #[error("Upstream model call timed out")]
    Timeout,

    #[error("Upstream model unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Unexpected upstream response shape: {0}")]
    UpstreamProtocol(String),

    #[error("AI response was not valid JSON: {detail}")]
    MalformedOutput {
        /// The stripped model text, preserved for operator diagnostics.
        raw: String,
        detail: String,
    },
}

// ── Gemini wire types ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Extracts the generated text from the conventional
    /// `candidates[0].content.parts[0].text` path.
    fn text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
    }
}

// ── Validated result ────────────────────────────────────────────────────────

/// Perspective-tagged scoring result, immutable after validation.
///
/// Every sub-score is either `None` or within [0, 100]; out-of-range values
/// from the model are normalized to `None`, never clamped. `missing_fields`
/// non-empty means the model omitted required keys and the result is a
/// partial success rather than a hard failure.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    pub perspective: Perspective,
    pub overall_score: Option<f64>,
    pub sub_scores: BTreeMap<String, Option<f64>>,
    pub analysis: BTreeMap<String, Value>,
    pub missing_fields: Vec<String>,
}

impl ScoreReport {
    pub fn is_partial(&self) -> bool {
        !self.missing_fields.is_empty()
    }
}

/// Wraps the Gemini generateContent API. Cheap to clone; the underlying
/// reqwest client is shared.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Scores a resume against a job description from one perspective.
    ///
    /// Preconditions are checked before any network call; a missing required
    /// key in the model's answer degrades to a partial `ScoreReport` instead
    /// of an error.
    pub async fn score(
        &self,
        job_description: &str,
        resume_text: &str,
        perspective: Perspective,
    ) -> Result<ScoreReport, AiError> {
        if job_description.trim().is_empty() {
            return Err(AiError::InvalidInput(
                "jobDescription cannot be empty".to_string(),
            ));
        }
        if resume_text.trim().is_empty() {
            return Err(AiError::InvalidInput(
                "resume text cannot be empty".to_string(),
            ));
        }
        if job_description.len() + resume_text.len() > MAX_COMBINED_INPUT_CHARS {
            return Err(AiError::InvalidInput(format!(
                "combined input exceeds {MAX_COMBINED_INPUT_CHARS} characters"
            )));
        }
        let api_key = self.api_key.as_deref().ok_or(AiError::Misconfigured)?;

        let prompt = build_prompt(job_description, resume_text, perspective);
        let request_body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: &prompt }],
            }],
        };

        let response = self
            .client
            .post(GEMINI_API_URL)
            .query(&[("key", api_key)])
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::Timeout
                } else {
                    AiError::UpstreamUnavailable(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::UpstreamUnavailable(format!(
                "upstream returned {status}: {body}"
            )));
        }

        let response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AiError::UpstreamProtocol(e.to_string()))?;

        let ai_text = response.text().ok_or_else(|| {
            AiError::UpstreamProtocol(
                "response missing candidates[0].content.parts[0].text".to_string(),
            )
        })?;

        debug!("Raw model output: {ai_text}");

        let stripped = strip_json_fences(ai_text);
        let parsed: Map<String, Value> =
            serde_json::from_str(stripped).map_err(|e| AiError::MalformedOutput {
                raw: stripped.to_string(),
                detail: e.to_string(),
            })?;

        Ok(validate_model_output(parsed, perspective))
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// A score is kept only when numeric and within [0, 100]; anything else
/// becomes `None`. Never clamped, never a request failure.
fn normalize_score(value: &Value) -> Option<f64> {
    value.as_f64().filter(|s| (0.0..=100.0).contains(s))
}

/// Checks the parsed model output against the perspective's required key set.
/// Missing keys are recorded, present keys are routed to scores or analysis,
/// and unrequested extras are dropped.
fn validate_model_output(mut map: Map<String, Value>, perspective: Perspective) -> ScoreReport {
    let mut report = ScoreReport {
        perspective,
        overall_score: None,
        sub_scores: BTreeMap::new(),
        analysis: BTreeMap::new(),
        missing_fields: Vec::new(),
    };

    for key in perspective.required_keys() {
        match map.remove(*key) {
            None => report.missing_fields.push(key.to_string()),
            Some(value) if *key == "overall_score" => {
                report.overall_score = normalize_score(&value);
            }
            Some(value) if key.ends_with("_score") => {
                report.sub_scores.insert(key.to_string(), normalize_score(&value));
            }
            Some(value) => {
                report.analysis.insert(key.to_string(), value);
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(text: &str) -> Map<String, Value> {
        serde_json::from_str(strip_json_fences(text)).unwrap()
    }

    fn full_recruiter_payload() -> Map<String, Value> {
        let value = json!({
            "overall_score": 87,
            "technical_skills_score": 90,
            "experience_score": 85,
            "education_score": 70,
            "cultural_fit_score": 80,
            "domain_expertise_score": 75,
            "critical_gaps": "No Kubernetes experience",
            "red_flags": "None observed",
            "hiring_recommendation": "yes — strong systems background",
            "interview_focus_areas": "Probe distributed systems depth",
            "risk_assessment": "Low risk"
        });
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"overall_score\": 87}\n```";
        assert_eq!(strip_json_fences(input), "{\"overall_score\": 87}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"overall_score\": 87}\n```";
        assert_eq!(strip_json_fences(input), "{\"overall_score\": 87}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"overall_score\": 87}";
        assert_eq!(strip_json_fences(input), input);
    }

    #[test]
    fn test_fenced_response_parses_to_object() {
        let map = parse("```json\n{\"overall_score\": 87, \"risk_assessment\": \"low\"}\n```");
        assert_eq!(map.get("overall_score"), Some(&json!(87)));
    }

    #[test]
    fn test_normalize_score_keeps_range_inclusive() {
        assert_eq!(normalize_score(&json!(0)), Some(0.0));
        assert_eq!(normalize_score(&json!(100)), Some(100.0));
        assert_eq!(normalize_score(&json!(87.5)), Some(87.5));
    }

    #[test]
    fn test_normalize_score_out_of_range_becomes_none() {
        // 150 and negatives are nulled, never clamped.
        assert_eq!(normalize_score(&json!(150)), None);
        assert_eq!(normalize_score(&json!(-5)), None);
        assert_eq!(normalize_score(&json!(100.1)), None);
    }

    #[test]
    fn test_normalize_score_non_numeric_becomes_none() {
        assert_eq!(normalize_score(&json!("87")), None);
        assert_eq!(normalize_score(&json!(null)), None);
        assert_eq!(normalize_score(&json!([87])), None);
    }

    #[test]
    fn test_full_recruiter_payload_is_complete() {
        let report = validate_model_output(full_recruiter_payload(), Perspective::Recruiter);
        assert!(!report.is_partial());
        assert_eq!(report.overall_score, Some(87.0));
        assert_eq!(report.sub_scores.len(), 5);
        assert_eq!(report.sub_scores["cultural_fit_score"], Some(80.0));
        assert_eq!(report.analysis.len(), 5);
        assert_eq!(report.analysis["risk_assessment"], json!("Low risk"));
    }

    #[test]
    fn test_out_of_range_sub_score_nulled_in_report() {
        let mut payload = full_recruiter_payload();
        payload.insert("experience_score".to_string(), json!(150));
        let report = validate_model_output(payload, Perspective::Recruiter);
        assert!(!report.is_partial());
        assert_eq!(report.sub_scores["experience_score"], None);
        // Siblings are untouched.
        assert_eq!(report.sub_scores["technical_skills_score"], Some(90.0));
    }

    #[test]
    fn test_missing_required_key_yields_partial_report() {
        let mut payload = full_recruiter_payload();
        payload.remove("risk_assessment");
        let report = validate_model_output(payload, Perspective::Recruiter);
        assert!(report.is_partial());
        assert_eq!(report.missing_fields, vec!["risk_assessment".to_string()]);
        // Whatever was returned is still carried, overall score included.
        assert_eq!(report.overall_score, Some(87.0));
        assert_eq!(report.analysis.len(), 4);
    }

    #[test]
    fn test_recruiter_payload_is_partial_for_applicant_perspective() {
        let report = validate_model_output(full_recruiter_payload(), Perspective::Applicant);
        assert!(report.is_partial());
        assert!(report
            .missing_fields
            .contains(&"ats_optimization_score".to_string()));
        assert!(report.missing_fields.contains(&"improvement_plan".to_string()));
        // The common core still validates.
        assert_eq!(report.overall_score, Some(87.0));
    }

    #[test]
    fn test_unrequested_extra_keys_are_dropped() {
        let mut payload = full_recruiter_payload();
        payload.insert("confidence".to_string(), json!(0.9));
        let report = validate_model_output(payload, Perspective::Recruiter);
        assert!(!report.analysis.contains_key("confidence"));
        assert!(!report.sub_scores.contains_key("confidence"));
    }

    #[test]
    fn test_non_object_model_text_is_malformed() {
        let stripped = strip_json_fences("I'm sorry, I can't help with that.");
        let result: Result<Map<String, Value>, _> = serde_json::from_str(stripped);
        assert!(result.is_err());
    }
}
