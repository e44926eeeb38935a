// Prompt templates for resume/JD compatibility scoring.
// One template per perspective; both demand JSON with an exact key set.

use super::Perspective;

/// Keys the recruiter-side template instructs the model to return.
pub const RECRUITER_REQUIRED_KEYS: &[&str] = &[
    "overall_score",
    "technical_skills_score",
    "experience_score",
    "education_score",
    "cultural_fit_score",
    "domain_expertise_score",
    "critical_gaps",
    "red_flags",
    "hiring_recommendation",
    "interview_focus_areas",
    "risk_assessment",
];

/// Keys the applicant-side template instructs the model to return.
pub const APPLICANT_REQUIRED_KEYS: &[&str] = &[
    "overall_score",
    "technical_skills_score",
    "experience_score",
    "education_score",
    "resume_structure_score",
    "ats_optimization_score",
    "missing_keywords",
    "skill_development_roadmap",
    "resume_rewrite_suggestions",
    "immediate_actions",
    "certification_recommendations",
    "competitive_advantages",
    "improvement_plan",
];

/// Recruiter-side template. Replace `{job_description}` and `{resume_text}`.
const RECRUITER_PROMPT_TEMPLATE: &str = r#"You are an expert technical recruiter evaluating a candidate's resume against a job description.

Assess the candidate from the HIRING side: fit, gaps, and risk.

Return a JSON object with this EXACT key set (no extra fields, no markdown):
{
  "overall_score": 0-100 number,
  "technical_skills_score": 0-100 number,
  "experience_score": 0-100 number,
  "education_score": 0-100 number,
  "cultural_fit_score": 0-100 number,
  "domain_expertise_score": 0-100 number,
  "critical_gaps": "must-have requirements the candidate does not meet",
  "red_flags": "employment gaps, job hopping, or inconsistencies worth noting",
  "hiring_recommendation": "strong yes / yes / maybe / no, with one-sentence rationale",
  "interview_focus_areas": "topics an interviewer should probe given the gaps above",
  "risk_assessment": "overall risk of a mis-hire and why"
}

Scoring rules:
- All scores are integers between 0 and 100, higher is better.
- Score ONLY against what the job description asks for.
- Do NOT invent experience that is not in the resume.

JOB DESCRIPTION:
{job_description}

RESUME:
{resume_text}"#;

/// Applicant-side template. Replace `{job_description}` and `{resume_text}`.
const APPLICANT_PROMPT_TEMPLATE: &str = r#"You are an expert career coach helping a candidate tailor their resume to a job description.

Assess the resume from the APPLICANT side: what to improve to land this role.

Return a JSON object with this EXACT key set (no extra fields, no markdown):
{
  "overall_score": 0-100 number,
  "technical_skills_score": 0-100 number,
  "experience_score": 0-100 number,
  "education_score": 0-100 number,
  "resume_structure_score": 0-100 number,
  "ats_optimization_score": 0-100 number,
  "missing_keywords": "JD keywords absent from the resume that an ATS would screen for",
  "skill_development_roadmap": "ordered plan to close the skill gaps",
  "resume_rewrite_suggestions": "concrete bullet rewrites with stronger evidence",
  "immediate_actions": "changes the candidate can make today",
  "certification_recommendations": "certifications that would strengthen this application",
  "competitive_advantages": "what already differentiates this candidate",
  "improvement_plan": "consolidated summary of the highest-impact improvements"
}

Scoring rules:
- All scores are integers between 0 and 100, higher is better.
- Be specific: quote the job description where it drives a suggestion.
- Do NOT invent experience that is not in the resume.

JOB DESCRIPTION:
{job_description}

RESUME:
{resume_text}"#;

/// Builds the scoring prompt for one perspective.
/// Pure and deterministic: identical inputs produce identical prompts.
/// Inputs are embedded verbatim; emptiness and size caps are the caller's job.
pub fn build_prompt(job_description: &str, resume_text: &str, perspective: Perspective) -> String {
    let template = match perspective {
        Perspective::Recruiter => RECRUITER_PROMPT_TEMPLATE,
        Perspective::Applicant => APPLICANT_PROMPT_TEMPLATE,
    };
    template
        .replace("{job_description}", job_description)
        .replace("{resume_text}", resume_text)
}
