//! Axum route handlers for the Jobs API.
//!
//! Listing and reading postings is public; creating, updating and deleting
//! them is limited to recruiters.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::candidate::repository::require_recruiter;
use crate::errors::AppError;
use crate::jobs::repository::{
    create_job, delete_job, find_job, list_jobs, update_job, JobChanges, NewJob,
};
use crate::models::job::{JobRow, WorkMode};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    #[serde(default = "default_active_only")]
    pub active_only: bool,
}

fn default_active_only() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct RecruiterQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub user_id: Uuid,
    pub title: String,
    pub department: String,
    pub description: String,
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub preferred_skills: Vec<String>,
    #[serde(default)]
    pub min_experience_years: f64,
    pub salary_range: Option<String>,
    #[serde(default)]
    pub work_mode: WorkMode,
}

#[derive(Debug, Deserialize)]
pub struct UpdateJobRequest {
    pub user_id: Uuid,
    pub title: Option<String>,
    pub department: Option<String>,
    pub description: Option<String>,
    pub required_skills: Option<Vec<String>>,
    pub preferred_skills: Option<Vec<String>>,
    pub min_experience_years: Option<f64>,
    pub salary_range: Option<String>,
    pub work_mode: Option<WorkMode>,
    pub is_active: Option<bool>,
}

/// GET /api/v1/jobs?active_only=
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(params): Query<ListJobsQuery>,
) -> Result<Json<Vec<JobRow>>, AppError> {
    Ok(Json(list_jobs(&state.db, params.active_only).await?))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobRow>, AppError> {
    find_job(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| job_not_found(id))
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(req): Json<CreateJobRequest>,
) -> Result<Json<JobRow>, AppError> {
    let title = required_text("title", &req.title)?;
    let department = required_text("department", &req.department)?;
    let description = required_text("description", &req.description)?;
    let required_skills = clean_skills(&req.required_skills);
    if required_skills.is_empty() {
        return Err(AppError::Validation(
            "required_skills must list at least one skill".to_string(),
        ));
    }
    let preferred_skills = clean_skills(&req.preferred_skills);
    let min_experience_years = experience_years(req.min_experience_years)?;
    let salary_range = optional_text(req.salary_range.as_deref());

    let recruiter = require_recruiter(&state.db, req.user_id).await?;
    let job = create_job(
        &state.db,
        NewJob {
            title,
            department,
            description,
            required_skills: &required_skills,
            preferred_skills: &preferred_skills,
            min_experience_years,
            salary_range,
            work_mode: req.work_mode.as_str(),
        },
    )
    .await?;
    info!("Recruiter {} opened job {}", recruiter.id, job.id);
    Ok(Json(job))
}

/// PUT /api/v1/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateJobRequest>,
) -> Result<Json<JobRow>, AppError> {
    let title = req.title.as_deref().map(|t| required_text("title", t)).transpose()?;
    let department = req
        .department
        .as_deref()
        .map(|d| required_text("department", d))
        .transpose()?;
    let description = req
        .description
        .as_deref()
        .map(|d| required_text("description", d))
        .transpose()?;
    let required_skills = req.required_skills.as_deref().map(clean_skills);
    if required_skills.as_ref().is_some_and(Vec::is_empty) {
        return Err(AppError::Validation(
            "required_skills must list at least one skill".to_string(),
        ));
    }
    let preferred_skills = req.preferred_skills.as_deref().map(clean_skills);
    let min_experience_years = req.min_experience_years.map(experience_years).transpose()?;

    require_recruiter(&state.db, req.user_id).await?;
    let changes = JobChanges {
        title,
        department,
        description,
        required_skills: required_skills.as_deref(),
        preferred_skills: preferred_skills.as_deref(),
        min_experience_years,
        salary_range: optional_text(req.salary_range.as_deref()),
        work_mode: req.work_mode.map(|m| m.as_str()),
        is_active: req.is_active,
    };
    update_job(&state.db, id, changes)
        .await?
        .map(Json)
        .ok_or_else(|| job_not_found(id))
}

/// DELETE /api/v1/jobs/:id?user_id=
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<RecruiterQuery>,
) -> Result<Json<Value>, AppError> {
    require_recruiter(&state.db, params.user_id).await?;
    if !delete_job(&state.db, id).await? {
        return Err(job_not_found(id));
    }
    Ok(Json(json!({ "message": "Job deleted successfully" })))
}

fn job_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Job {id} not found"))
}

fn required_text<'a>(field: &str, value: &'a str) -> Result<&'a str, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(value)
}

fn optional_text(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn experience_years(years: f64) -> Result<f64, AppError> {
    if !years.is_finite() || years < 0.0 {
        return Err(AppError::Validation(
            "min_experience_years must be zero or more".to_string(),
        ));
    }
    Ok(years)
}

/// Trims skills, drops blanks and case-insensitive duplicates, keeps order.
fn clean_skills(skills: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
        .map(str::to_string)
        .collect()
}
