use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

pub const ROLE_CANDIDATE: &str = "ROLE_CANDIDATE";
pub const ROLE_RECRUITER: &str = "ROLE_RECRUITER";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    /// Plain text extracted from the uploaded CV.
    pub cv_text: Option<String>,
    /// Structured profile extracted from the CV by the LLM.
    pub profile: Option<Value>,
}

impl User {
    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }
}
