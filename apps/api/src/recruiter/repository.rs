use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::interview::{InterviewRow, InterviewStatus, InterviewWithCandidateRow};
use crate::models::user::User;

/// Score at or above which a candidate counts as a high scorer.
pub const HIGH_SCORE_THRESHOLD: i32 = 80;

#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
pub struct RecruiterStats {
    pub total_interviews: i64,
    pub completed_interviews: i64,
    pub pending_interviews: i64,
    pub high_scorers: i64,
}

/// Interviews scoring strictly above `min_score`, best first, optionally
/// only those held against one job posting.
pub async fn scored_candidates(
    pool: &PgPool,
    min_score: i32,
    job_id: Option<Uuid>,
) -> sqlx::Result<Vec<InterviewWithCandidateRow>> {
    sqlx::query_as::<_, InterviewWithCandidateRow>(
        r#"
        SELECT i.id, i.user_id, i.job_id, i.position, i.company, i.status, i.score,
               i.created_at, i.completed_at,
               u.name AS candidate_name, u.email AS candidate_email
        FROM interviews i
        JOIN users u ON u.id = i.user_id
        WHERE i.score > $1 AND ($2::uuid IS NULL OR i.job_id = $2)
        ORDER BY i.score DESC
        "#,
    )
    .bind(min_score)
    .bind(job_id)
    .fetch_all(pool)
    .await
}

/// All interviews, optionally filtered by status, newest first.
pub async fn list_interviews(
    pool: &PgPool,
    status: Option<InterviewStatus>,
) -> sqlx::Result<Vec<InterviewWithCandidateRow>> {
    sqlx::query_as::<_, InterviewWithCandidateRow>(
        r#"
        SELECT i.id, i.user_id, i.job_id, i.position, i.company, i.status, i.score,
               i.created_at, i.completed_at,
               u.name AS candidate_name, u.email AS candidate_email
        FROM interviews i
        JOIN users u ON u.id = i.user_id
        WHERE ($1::text IS NULL OR i.status = $1)
        ORDER BY i.created_at DESC
        "#,
    )
    .bind(status.map(|s| s.as_str()))
    .fetch_all(pool)
    .await
}

pub async fn find_interview(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<InterviewRow>> {
    sqlx::query_as::<_, InterviewRow>("SELECT * FROM interviews WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_candidate(pool: &PgPool, user_id: Uuid) -> sqlx::Result<Option<User>> {
    crate::candidate::repository::find_user(pool, user_id).await
}

pub async fn stats(pool: &PgPool) -> sqlx::Result<RecruiterStats> {
    sqlx::query_as::<_, RecruiterStats>(
        r#"
        SELECT
            COUNT(*) AS total_interviews,
            COUNT(*) FILTER (WHERE status = $1) AS completed_interviews,
            COUNT(*) FILTER (WHERE status = $2) AS pending_interviews,
            COUNT(*) FILTER (WHERE score >= $3) AS high_scorers
        FROM interviews
        "#,
    )
    .bind(InterviewStatus::Completed.as_str())
    .bind(InterviewStatus::Pending.as_str())
    .bind(HIGH_SCORE_THRESHOLD)
    .fetch_one(pool)
    .await
}
