//! Axum route handlers for the Recruiter API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::candidate::repository::require_recruiter;
use crate::errors::AppError;
use crate::models::interview::{InterviewStatus, InterviewWithCandidateRow};
use crate::recruiter::repository::{
    find_candidate, find_interview, list_interviews, scored_candidates, stats, RecruiterStats,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CandidatesQuery {
    pub user_id: Uuid,
    #[serde(default)]
    pub min_score: i32,
    pub job_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct InterviewsQuery {
    pub user_id: Uuid,
    pub status: Option<String>,
}

/// Identifies the recruiter making the request.
#[derive(Debug, Deserialize)]
pub struct RecruiterQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct InterviewDetailResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_id: Option<Uuid>,
    pub position: String,
    pub company: Option<String>,
    pub score: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub candidate_name: String,
    pub candidate_email: String,
    pub candidate_cv: Option<String>,
    pub candidate_profile: Option<Value>,
    pub conversation: Option<Value>,
    pub assessment: Option<Value>,
}

/// GET /api/v1/recruiter/candidates?user_id=&min_score=&job_id=
pub async fn handle_scored_candidates(
    State(state): State<AppState>,
    Query(params): Query<CandidatesQuery>,
) -> Result<Json<Vec<InterviewWithCandidateRow>>, AppError> {
    let min_score = validate_min_score(params.min_score)?;
    require_recruiter(&state.db, params.user_id).await?;
    Ok(Json(
        scored_candidates(&state.db, min_score, params.job_id).await?,
    ))
}

/// GET /api/v1/recruiter/interviews?user_id=&status=
pub async fn handle_list_interviews(
    State(state): State<AppState>,
    Query(params): Query<InterviewsQuery>,
) -> Result<Json<Vec<InterviewWithCandidateRow>>, AppError> {
    let status = parse_status_filter(params.status.as_deref())?;
    require_recruiter(&state.db, params.user_id).await?;
    Ok(Json(list_interviews(&state.db, status).await?))
}

/// GET /api/v1/recruiter/interviews/:id?user_id=
pub async fn handle_interview_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<RecruiterQuery>,
) -> Result<Json<InterviewDetailResponse>, AppError> {
    require_recruiter(&state.db, params.user_id).await?;
    let interview = find_interview(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {id} not found")))?;
    let candidate = find_candidate(&state.db, interview.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {} not found", interview.user_id)))?;

    Ok(Json(InterviewDetailResponse {
        id: interview.id,
        user_id: interview.user_id,
        job_id: interview.job_id,
        position: interview.position,
        company: interview.company,
        score: interview.score,
        status: interview.status,
        created_at: interview.created_at,
        completed_at: interview.completed_at,
        candidate_name: candidate.name,
        candidate_email: candidate.email,
        candidate_cv: candidate.cv_text,
        candidate_profile: candidate.profile,
        conversation: interview.conversation,
        assessment: interview.assessment,
    }))
}

/// GET /api/v1/recruiter/stats?user_id=
pub async fn handle_stats(
    State(state): State<AppState>,
    Query(params): Query<RecruiterQuery>,
) -> Result<Json<RecruiterStats>, AppError> {
    require_recruiter(&state.db, params.user_id).await?;
    Ok(Json(stats(&state.db).await?))
}

fn validate_min_score(min_score: i32) -> Result<i32, AppError> {
    if !(0..=100).contains(&min_score) {
        return Err(AppError::Validation(
            "min_score must be between 0 and 100".to_string(),
        ));
    }
    Ok(min_score)
}

fn parse_status_filter(raw: Option<&str>) -> Result<Option<InterviewStatus>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => InterviewStatus::parse(s)
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("Unknown interview status '{s}'"))),
    }
}
