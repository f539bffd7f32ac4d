//! Axum route handlers for the Candidate API.

use aws_sdk_s3::primitives::ByteStream;
use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::candidate::cv::{read_cv, validate_filename};
use crate::candidate::profile::{extract_profile, ProfileSummary};
use crate::candidate::repository::{require_candidate, store_cv};
use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct CvUploadResponse {
    pub message: String,
    pub profile: ProfileSummary,
    pub s3_key: String,
}

/// GET /api/v1/candidates/:user_id/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    Ok(Json(require_candidate(&state.db, user_id).await?))
}

/// POST /api/v1/candidates/:user_id/cv
///
/// Multipart upload with a single `file` field (.pdf or .txt). Extracts the
/// text, asks the LLM for a structured profile, archives the original file
/// and stores text + profile on the user.
pub async fn handle_upload_cv(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<CvUploadResponse>, AppError> {
    let user = require_candidate(&state.db, user_id).await?;
    let (filename, content) = read_file_field(&mut multipart).await?;
    let extension = validate_filename(&filename)?;

    // PDF parsing is CPU-bound; keep it off the async workers.
    let cv_text = {
        let content = content.clone();
        let filename = filename.clone();
        tokio::task::spawn_blocking(move || read_cv(&content, &filename))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("CV extraction task failed: {e}")))??
    };

    let profile = extract_profile(&cv_text, &state.llm).await?;
    info!(
        "Extracted profile for user {}: {} skills",
        user.id,
        profile.skills.len()
    );

    let s3_key = format!("cvs/{}/{}-{}", user.id, Uuid::new_v4(), filename);
    state
        .s3
        .put_object()
        .bucket(&state.config.s3_bucket)
        .key(&s3_key)
        .body(ByteStream::from(content))
        .content_type(content_type_for(&extension))
        .send()
        .await
        .map_err(|e| AppError::S3(format!("CV upload failed: {e}")))?;
    info!("Archived CV to s3://{}/{}", state.config.s3_bucket, s3_key);

    let profile_json = serde_json::to_value(&profile)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize profile: {e}")))?;
    store_cv(&state.db, user.id, &cv_text, &profile_json).await?;

    Ok(Json(CvUploadResponse {
        message: "CV uploaded and parsed successfully".to_string(),
        profile: profile.summary(),
        s3_key,
    }))
}

async fn read_file_field(multipart: &mut Multipart) -> Result<(String, Bytes), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("Uploaded file has no filename".to_string()))?;
        let content = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        return Ok((filename, content));
    }
    Err(AppError::Validation(format!(
        "Multipart field '{FILE_FIELD}' is required"
    )))
}

fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "pdf" => "application/pdf",
        _ => "text/plain",
    }
}
