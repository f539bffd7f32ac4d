//! Candidate profile: the structured view of a CV, extracted by the LLM.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::candidate::prompts::{PROFILE_EXTRACT_PROMPT, PROFILE_EXTRACT_SYSTEM};
use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_TRAILER;
use crate::llm_client::{LlmClient, SamplingParams};
use crate::models::user::User;

const EXTRACT_PARAMS: SamplingParams = SamplingParams {
    temperature: 0.2,
    top_p: None,
    max_tokens: 2000,
};

/// Skills echoed back in the upload response.
const SUMMARY_SKILLS: usize = 10;

/// Free-form record (education line, job) as the model returned it.
pub type ProfileItem = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub current_position: String,
    pub years_of_experience: f64,
    pub skills: Vec<String>,
    pub education: Vec<ProfileItem>,
    pub work_history: Vec<ProfileItem>,
    pub certifications: Vec<String>,
    pub languages: Vec<String>,
}

impl Default for CandidateProfile {
    fn default() -> Self {
        Self {
            name: "Unknown".to_string(),
            email: String::new(),
            phone: String::new(),
            current_position: String::new(),
            years_of_experience: 0.0,
            skills: Vec::new(),
            education: Vec::new(),
            work_history: Vec::new(),
            certifications: Vec::new(),
            languages: Vec::new(),
        }
    }
}

/// Short summary returned after a CV upload.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    pub name: String,
    pub current_position: String,
    pub years_of_experience: f64,
    pub skills: Vec<String>,
    pub education_count: usize,
    pub work_history_count: usize,
}

impl CandidateProfile {
    /// Renders the profile as the text block the interviewer sees.
    pub fn to_context(&self) -> String {
        let mut context = format!(
            "Candidate Profile:\n\
             - Name: {}\n\
             - Current Position: {}\n\
             - Years of Experience: {}\n\
             - Skills: {}\n\n\
             Education:\n{}\n\n\
             Work History:\n{}\n",
            self.name,
            self.current_position,
            self.years_of_experience,
            self.skills.join(", "),
            format_items(&self.education),
            format_items(&self.work_history),
        );
        if !self.certifications.is_empty() {
            context.push_str(&format!(
                "\nCertifications: {}",
                self.certifications.join(", ")
            ));
        }
        if !self.languages.is_empty() {
            context.push_str(&format!("\nLanguages: {}", self.languages.join(", ")));
        }
        context
    }

    pub fn summary(&self) -> ProfileSummary {
        ProfileSummary {
            name: self.name.clone(),
            current_position: self.current_position.clone(),
            years_of_experience: self.years_of_experience,
            skills: self.skills.iter().take(SUMMARY_SKILLS).cloned().collect(),
            education_count: self.education.len(),
            work_history_count: self.work_history.len(),
        }
    }
}

fn format_items(items: &[ProfileItem]) -> String {
    if items.is_empty() {
        return "  No information available".to_string();
    }
    items
        .iter()
        .map(|item| {
            let fields: Vec<String> = item
                .iter()
                .map(|(k, v)| match v {
                    Value::String(s) => format!("{k}: {s}"),
                    other => format!("{k}: {other}"),
                })
                .collect();
            format!("  - {}", fields.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extracts a structured profile from CV text using the LLM.
pub async fn extract_profile(cv_text: &str, llm: &LlmClient) -> Result<CandidateProfile, AppError> {
    let prompt = PROFILE_EXTRACT_PROMPT
        .replace("{cv_text}", cv_text)
        .replace("{json_trailer}", JSON_ONLY_TRAILER);
    llm.call_json::<CandidateProfile>(&prompt, PROFILE_EXTRACT_SYSTEM, EXTRACT_PARAMS)
        .await
        .map_err(|e| AppError::Llm(format!("CV profile extraction failed: {e}")))
}

/// Candidate context handed to the interviewer.
///
/// Prefers the extracted profile, then the raw CV text, then bare identity.
pub fn interview_context(user: &User) -> String {
    if let Some(profile) = user
        .profile
        .as_ref()
        .and_then(|p| serde_json::from_value::<CandidateProfile>(p.clone()).ok())
    {
        return profile.to_context();
    }
    match user.cv_text.as_deref().map(str::trim) {
        Some(cv) if !cv.is_empty() => cv.to_string(),
        _ => format!("Candidate: {}\nEmail: {}", user.name, user.email),
    }
}
