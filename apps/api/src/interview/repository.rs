//! Interview persistence. Runtime-checked sqlx queries against `interviews`.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::interview::{InterviewRow, InterviewStatus};

/// Terminal output of a finished session.
pub struct CompletionParams<'a> {
    pub interview_id: Uuid,
    pub score: i32,
    pub conversation: &'a Value,
    pub assessment: &'a Value,
}

/// Status writes made while a session runs. `PgPool` is the production store.
#[async_trait]
pub trait InterviewRecorder: Send + Sync {
    /// Marks the interview as started. Returns `false` if it is already completed.
    async fn mark_in_progress(&self, interview_id: Uuid) -> sqlx::Result<bool>;

    /// Stores the conversation log, assessment and score and closes the interview.
    async fn complete<'a>(&self, params: CompletionParams<'a>) -> sqlx::Result<()>;
}

#[async_trait]
impl InterviewRecorder for PgPool {
    async fn mark_in_progress(&self, interview_id: Uuid) -> sqlx::Result<bool> {
        let result =
            sqlx::query("UPDATE interviews SET status = $1 WHERE id = $2 AND status <> $3")
                .bind(InterviewStatus::InProgress.as_str())
                .bind(interview_id)
                .bind(InterviewStatus::Completed.as_str())
                .execute(self)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn complete<'a>(&self, params: CompletionParams<'a>) -> sqlx::Result<()> {
        let CompletionParams {
            interview_id,
            score,
            conversation,
            assessment,
        } = params;

        sqlx::query(
            r#"
            UPDATE interviews
            SET status = $1, score = $2, conversation = $3, assessment = $4, completed_at = NOW()
            WHERE id = $5
            "#,
        )
        .bind(InterviewStatus::Completed.as_str())
        .bind(score)
        .bind(conversation)
        .bind(assessment)
        .bind(interview_id)
        .execute(self)
        .await?;

        info!("Interview {interview_id} completed with score {score}");
        Ok(())
    }
}

pub async fn create_interview(
    pool: &PgPool,
    user_id: Uuid,
    position: &str,
    company: Option<&str>,
    job_id: Option<Uuid>,
) -> sqlx::Result<InterviewRow> {
    let row = sqlx::query_as::<_, InterviewRow>(
        r#"
        INSERT INTO interviews (id, user_id, job_id, position, company, status, score)
        VALUES ($1, $2, $3, $4, $5, $6, 0)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(job_id)
    .bind(position)
    .bind(company)
    .bind(InterviewStatus::Pending.as_str())
    .fetch_one(pool)
    .await?;

    info!("Created interview {} for user {user_id}", row.id);
    Ok(row)
}

/// All interviews of one candidate, newest first.
pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<InterviewRow>> {
    sqlx::query_as::<_, InterviewRow>(
        "SELECT * FROM interviews WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// One interview, only if it belongs to `user_id`.
pub async fn find_for_user(
    pool: &PgPool,
    interview_id: Uuid,
    user_id: Uuid,
) -> sqlx::Result<Option<InterviewRow>> {
    sqlx::query_as::<_, InterviewRow>("SELECT * FROM interviews WHERE id = $1 AND user_id = $2")
        .bind(interview_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}
