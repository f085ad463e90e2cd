//! CV structuring: turns extracted CV text into a sanitized `Profile` via the LLM.

use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::ingestion::github::GithubProject;
use crate::llm_client::prompts::NO_FABRICATION_INSTRUCTION;
use crate::llm_client::{fill_template, truncate_chars, CallOptions, LlmClient};
use crate::profile::prompts::{STRUCTURE_CV_PROMPT, STRUCTURE_CV_SYSTEM};
use crate::profile::{sanitize_profile, Profile, ProfileError};

/// CV text beyond this many characters is cut before prompting.
pub const MAX_CV_CHARS: usize = 20_000;
const TRUNCATION_MARKER: &str = "\n[CV text truncated due to length.]";

const STRUCTURING_OPTIONS: CallOptions = CallOptions {
    max_tokens: 8000,
    temperature: 0.2,
};

/// Builds the structuring prompt. Projects are embedded as pretty JSON, `[]` when none.
pub fn build_structuring_prompt(cv_text: &str, projects: &[GithubProject]) -> String {
    let cv_text = cv_text.trim();
    let cv_text = if cv_text.chars().count() > MAX_CV_CHARS {
        warn!(
            "CV text exceeds {MAX_CV_CHARS} characters ({}); truncating",
            cv_text.chars().count()
        );
        format!("{}{TRUNCATION_MARKER}", truncate_chars(cv_text, MAX_CV_CHARS))
    } else {
        cv_text.to_string()
    };

    let projects_json = if projects.is_empty() {
        "[]".to_string()
    } else {
        serde_json::to_string_pretty(projects).unwrap_or_else(|_| "[]".to_string())
    };

    fill_template(
        STRUCTURE_CV_PROMPT,
        &[
            ("no_fabrication", NO_FABRICATION_INSTRUCTION),
            ("cv_text", &cv_text),
            ("github_projects", &projects_json),
        ],
    )
}

/// Sends the CV text to the LLM and returns the sanitized profile.
pub async fn structure_cv(
    llm: &LlmClient,
    cv_text: &str,
    projects: &[GithubProject],
) -> Result<Profile, AppError> {
    let prompt = build_structuring_prompt(cv_text, projects);
    info!("Structuring CV ({} prompt characters)", prompt.len());

    let raw: Value = llm
        .call_json(&prompt, STRUCTURE_CV_SYSTEM, STRUCTURING_OPTIONS)
        .await
        .map_err(|e| AppError::Llm(format!("CV structuring failed: {e}")))?;

    sanitize_profile(raw).map_err(|e| match e {
        ProfileError::Rejected(reason) => {
            AppError::UnprocessableEntity(format!("CV rejected by structuring: {reason}"))
        }
        other => AppError::UnprocessableEntity(other.to_string()),
    })
}
