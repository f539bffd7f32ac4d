//! Job posting persistence against the `jobs` table.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::job::JobRow;

/// Fields of a new posting, validated by the handler.
pub struct NewJob<'a> {
    pub title: &'a str,
    pub department: &'a str,
    pub description: &'a str,
    pub required_skills: &'a [String],
    pub preferred_skills: &'a [String],
    pub min_experience_years: f64,
    pub salary_range: Option<&'a str>,
    pub work_mode: &'a str,
}

/// Partial update: `None` leaves the column as it is.
#[derive(Default)]
pub struct JobChanges<'a> {
    pub title: Option<&'a str>,
    pub department: Option<&'a str>,
    pub description: Option<&'a str>,
    pub required_skills: Option<&'a [String]>,
    pub preferred_skills: Option<&'a [String]>,
    pub min_experience_years: Option<f64>,
    pub salary_range: Option<&'a str>,
    pub work_mode: Option<&'a str>,
    pub is_active: Option<bool>,
}

/// Postings, newest first. With `active_only` closed postings are skipped.
pub async fn list_jobs(pool: &PgPool, active_only: bool) -> sqlx::Result<Vec<JobRow>> {
    sqlx::query_as::<_, JobRow>(
        "SELECT * FROM jobs WHERE ($1 = FALSE OR is_active) ORDER BY created_at DESC",
    )
    .bind(active_only)
    .fetch_all(pool)
    .await
}

pub async fn find_job(pool: &PgPool, job_id: Uuid) -> sqlx::Result<Option<JobRow>> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await
}

pub async fn create_job(pool: &PgPool, job: NewJob<'_>) -> sqlx::Result<JobRow> {
    let row = sqlx::query_as::<_, JobRow>(
        r#"
        INSERT INTO jobs
            (id, title, department, description, required_skills, preferred_skills,
             min_experience_years, salary_range, work_mode, is_active)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(job.title)
    .bind(job.department)
    .bind(job.description)
    .bind(job.required_skills)
    .bind(job.preferred_skills)
    .bind(job.min_experience_years)
    .bind(job.salary_range)
    .bind(job.work_mode)
    .fetch_one(pool)
    .await?;

    info!("Created job {} ({})", row.id, row.title);
    Ok(row)
}

/// Applies `changes` and returns the updated posting, or `None` if it does not exist.
pub async fn update_job(
    pool: &PgPool,
    job_id: Uuid,
    changes: JobChanges<'_>,
) -> sqlx::Result<Option<JobRow>> {
    sqlx::query_as::<_, JobRow>(
        r#"
        UPDATE jobs SET
            title = COALESCE($1, title),
            department = COALESCE($2, department),
            description = COALESCE($3, description),
            required_skills = COALESCE($4, required_skills),
            preferred_skills = COALESCE($5, preferred_skills),
            min_experience_years = COALESCE($6, min_experience_years),
            salary_range = COALESCE($7, salary_range),
            work_mode = COALESCE($8, work_mode),
            is_active = COALESCE($9, is_active)
        WHERE id = $10
        RETURNING *
        "#,
    )
    .bind(changes.title)
    .bind(changes.department)
    .bind(changes.description)
    .bind(changes.required_skills)
    .bind(changes.preferred_skills)
    .bind(changes.min_experience_years)
    .bind(changes.salary_range)
    .bind(changes.work_mode)
    .bind(changes.is_active)
    .bind(job_id)
    .fetch_optional(pool)
    .await
}

/// Returns `false` when no posting had that id.
pub async fn delete_job(pool: &PgPool, job_id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
        .bind(job_id)
        .execute(pool)
        .await?;
    if result.rows_affected() > 0 {
        info!("Deleted job {job_id}");
    }
    Ok(result.rows_affected() > 0)
}
