pub mod ai_client;
pub mod extractor;
pub mod handlers;
pub mod prompts;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which of the two fixed analysis templates and response shapes to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Perspective {
    Recruiter,
    Applicant,
}

impl Perspective {
    /// The exact key set the model is instructed to return for this
    /// perspective. Any key missing from the model's answer makes the
    /// result partial rather than failing the request.
    pub fn required_keys(&self) -> &'static [&'static str] {
        match self {
            Perspective::Recruiter => prompts::RECRUITER_REQUIRED_KEYS,
            Perspective::Applicant => prompts::APPLICANT_REQUIRED_KEYS,
        }
    }

    /// The single most summary-like analysis field, mirrored into the legacy
    /// flat `suggestions` response field for older callers.
    pub fn summary_field(&self) -> &'static str {
        match self {
            Perspective::Recruiter => "hiring_recommendation",
            Perspective::Applicant => "improvement_plan",
        }
    }
}

impl fmt::Display for Perspective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Perspective::Recruiter => write!(f, "recruiter"),
            Perspective::Applicant => write!(f, "applicant"),
        }
    }
}

impl FromStr for Perspective {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "recruiter" => Ok(Perspective::Recruiter),
            "applicant" => Ok(Perspective::Applicant),
            _ => Err(()),
        }
    }
}
