use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkMode {
    Remote,
    Hybrid,
    Onsite,
}

impl WorkMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkMode::Remote => "Remote",
            WorkMode::Hybrid => "Hybrid",
            WorkMode::Onsite => "Onsite",
        }
    }
}

impl Default for WorkMode {
    fn default() -> Self {
        WorkMode::Hybrid
    }
}

/// A job posting. Skills are stored as Postgres `TEXT[]`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub department: String,
    pub description: String,
    pub required_skills: Vec<String>,
    pub preferred_skills: Vec<String>,
    pub min_experience_years: f64,
    pub salary_range: Option<String>,
    pub work_mode: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl JobRow {
    /// The job description handed to the interviewer.
    pub fn interview_brief(&self) -> String {
        let mut brief = format!(
            "{} ({} department, {})\n\n{}",
            self.title, self.department, self.work_mode, self.description
        );
        if !self.required_skills.is_empty() {
            brief.push_str(&format!(
                "\n\nRequired skills: {}",
                self.required_skills.join(", ")
            ));
        }
        if !self.preferred_skills.is_empty() {
            brief.push_str(&format!(
                "\nPreferred skills: {}",
                self.preferred_skills.join(", ")
            ));
        }
        if self.min_experience_years > 0.0 {
            brief.push_str(&format!(
                "\nMinimum experience: {} years",
                self.min_experience_years
            ));
        }
        brief
    }
}
