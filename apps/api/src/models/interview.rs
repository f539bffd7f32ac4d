use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    Pending,
    InProgress,
    Completed,
}

impl InterviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewStatus::Pending => "pending",
            InterviewStatus::InProgress => "in_progress",
            InterviewStatus::Completed => "completed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(InterviewStatus::Pending),
            "in_progress" => Some(InterviewStatus::InProgress),
            "completed" => Some(InterviewStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewRow {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Posting the interview was opened against, if any.
    pub job_id: Option<Uuid>,
    pub position: String,
    pub company: Option<String>,
    pub status: String,
    pub score: i32,
    /// Conversation log (no system entries) as a JSON array of `{role, content}`.
    pub conversation: Option<Value>,
    pub assessment: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl InterviewRow {
    pub fn is_completed(&self) -> bool {
        self.status == InterviewStatus::Completed.as_str()
    }
}

/// Interview joined with the candidate who took it. Recruiter listings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewWithCandidateRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_id: Option<Uuid>,
    pub position: String,
    pub company: Option<String>,
    pub status: String,
    pub score: i32,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub candidate_name: String,
    pub candidate_email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            InterviewStatus::Pending,
            InterviewStatus::InProgress,
            InterviewStatus::Completed,
        ] {
            assert_eq!(InterviewStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(InterviewStatus::parse("archived"), None);
    }

    #[test]
    fn test_status_serde_matches_column_values() {
        let json = serde_json::to_string(&InterviewStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }
}
