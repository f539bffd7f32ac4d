//! User persistence for the candidate side: lookups, role checks and CV storage.

use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{User, ROLE_CANDIDATE, ROLE_RECRUITER};

pub async fn find_user(pool: &PgPool, user_id: Uuid) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(
        "SELECT id, name, email, role, cv_text, profile FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Loads a user and checks they are a candidate.
pub async fn require_candidate(pool: &PgPool, user_id: Uuid) -> Result<User, AppError> {
    ensure_role(load_user(pool, user_id).await?, ROLE_CANDIDATE)
}

/// Loads a user and checks they are a recruiter.
pub async fn require_recruiter(pool: &PgPool, user_id: Uuid) -> Result<User, AppError> {
    ensure_role(load_user(pool, user_id).await?, ROLE_RECRUITER)
}

async fn load_user(pool: &PgPool, user_id: Uuid) -> Result<User, AppError> {
    find_user(pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))
}

pub fn ensure_role(user: User, role: &str) -> Result<User, AppError> {
    if !user.has_role(role) {
        let who = match role {
            ROLE_RECRUITER => "recruiters",
            _ => "candidates",
        };
        return Err(AppError::Forbidden(format!(
            "Only {who} can access this endpoint"
        )));
    }
    Ok(user)
}

pub async fn store_cv(
    pool: &PgPool,
    user_id: Uuid,
    cv_text: &str,
    profile: &Value,
) -> sqlx::Result<()> {
    sqlx::query("UPDATE users SET cv_text = $1, profile = $2 WHERE id = $3")
        .bind(cv_text)
        .bind(profile)
        .bind(user_id)
        .execute(pool)
        .await?;
    info!("Stored CV ({} chars) for user {user_id}", cv_text.len());
    Ok(())
}
