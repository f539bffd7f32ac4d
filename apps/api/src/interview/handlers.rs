//! Axum route handlers for the Interview API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::candidate::profile::interview_context;
use crate::candidate::repository::require_candidate;
use crate::errors::AppError;
use crate::interview::repository::{
    create_interview, find_for_user, list_for_user, CompletionParams, InterviewRecorder,
};
use crate::interview::session::{
    InterviewSession, InterviewTurn, JobContext, SessionError, SessionState,
};
use crate::interview::store::SessionStore;
use crate::jobs::repository::find_job;
use crate::llm_client::ChatModel;
use crate::models::interview::{InterviewRow, InterviewStatus};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CreateInterviewRequest {
    pub user_id: Uuid,
    /// Required unless `job_id` is given, in which case the posting's title is used.
    #[serde(default)]
    pub position: Option<String>,
    pub company: Option<String>,
    pub job_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct InterviewActionRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct InterviewMessageRequest {
    pub user_id: Uuid,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StartInterviewResponse {
    pub interview_id: Uuid,
    pub status: InterviewStatus,
    pub interviewer_message: String,
    pub is_complete: bool,
}

#[derive(Debug, Serialize)]
pub struct InterviewMessageResponse {
    pub interviewer_message: String,
    pub is_complete: bool,
    pub questions_asked: u32,
    /// Set once the assessment is stored.
    pub score: Option<u32>,
    /// The interview finished but its assessment could not be generated yet;
    /// retry with the finalize endpoint.
    pub assessment_pending: bool,
}

#[derive(Debug, Serialize)]
pub struct FinalizeResponse {
    pub interview_id: Uuid,
    pub score: u32,
}

#[derive(Debug, Serialize)]
pub struct InterviewResultResponse {
    pub interview_id: Uuid,
    pub job_id: Option<Uuid>,
    pub position: String,
    pub company: Option<String>,
    pub score: i32,
    pub status: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub conversation: Value,
    pub assessment: Value,
}

impl From<InterviewRow> for InterviewResultResponse {
    fn from(row: InterviewRow) -> Self {
        Self {
            interview_id: row.id,
            job_id: row.job_id,
            position: row.position,
            company: row.company,
            score: row.score,
            status: row.status,
            completed_at: row.completed_at,
            conversation: row.conversation.unwrap_or_else(|| json!([])),
            assessment: row.assessment.unwrap_or_else(|| json!({})),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interviews
pub async fn handle_create_interview(
    State(state): State<AppState>,
    Json(req): Json<CreateInterviewRequest>,
) -> Result<Json<InterviewRow>, AppError> {
    let position = req
        .position
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());
    if position.is_none() && req.job_id.is_none() {
        return Err(AppError::Validation("position cannot be empty".to_string()));
    }
    let user = require_candidate(&state.db, req.user_id).await?;

    let position = match req.job_id {
        Some(job_id) => {
            let job = find_job(&state.db, job_id)
                .await?
                .filter(|job| job.is_active)
                .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
            position.map(str::to_string).unwrap_or(job.title)
        }
        None => position.map(str::to_string).unwrap_or_default(),
    };
    let company = req
        .company
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let row = create_interview(&state.db, user.id, &position, company, req.job_id).await?;
    Ok(Json(row))
}

/// GET /api/v1/interviews?user_id=
pub async fn handle_list_interviews(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<InterviewRow>>, AppError> {
    let user = require_candidate(&state.db, params.user_id).await?;
    Ok(Json(list_for_user(&state.db, user.id).await?))
}

/// GET /api/v1/interviews/:id?user_id=
pub async fn handle_get_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<InterviewRow>, AppError> {
    Ok(Json(load_owned(&state, id, params.user_id).await?))
}

/// POST /api/v1/interviews/:id/start
///
/// Briefs a fresh session with the candidate's profile and the job, then
/// returns the interviewer's opening message. Starting again before the
/// interview completes restarts the conversation.
pub async fn handle_start_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<InterviewActionRequest>,
) -> Result<Json<StartInterviewResponse>, AppError> {
    let user = require_candidate(&state.db, req.user_id).await?;
    let interview = load_open(&state, id, user.id).await?;

    let posting = match interview.job_id {
        Some(job_id) => find_job(&state.db, job_id).await?,
        None => None,
    };
    let description = posting
        .map(|job| job.interview_brief())
        .unwrap_or_else(|| job_description(&interview.position, interview.company.as_deref()));
    let job = JobContext::new(interview.position.clone(), Some(description));

    let turn = begin_session(
        &state.db,
        &state.llm,
        &state.sessions,
        id,
        &interview_context(&user),
        job,
    )
    .await?;
    info!("Interview {id} started for user {}", user.id);

    Ok(Json(StartInterviewResponse {
        interview_id: id,
        status: InterviewStatus::InProgress,
        interviewer_message: turn.message,
        is_complete: turn.is_complete,
    }))
}

/// POST /api/v1/interviews/:id/message
///
/// Takes one candidate reply. On the final turn the assessment is generated
/// and persisted and the session is released.
pub async fn handle_send_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<InterviewMessageRequest>,
) -> Result<Json<InterviewMessageResponse>, AppError> {
    if req.message.trim().is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }
    let user = require_candidate(&state.db, req.user_id).await?;
    load_open(&state, id, user.id).await?;

    // No live session means the interview was never started (or it expired).
    let handle = state
        .sessions
        .get(id)
        .await
        .ok_or(SessionError::InvalidState {
            operation: "take a turn",
            state: SessionState::Uninitialized,
        })?;
    let mut session = handle.lock().await;

    let turn = session.next_message(&state.llm, Some(&req.message)).await?;
    let response = settle_turn(&state.db, &state.llm, &state.sessions, id, &session, turn).await;
    Ok(Json(response))
}

/// POST /api/v1/interviews/:id/finalize
///
/// Retries assessment + persistence for a session that completed but whose
/// assessment call failed.
pub async fn handle_finalize_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<InterviewActionRequest>,
) -> Result<Json<FinalizeResponse>, AppError> {
    let user = require_candidate(&state.db, req.user_id).await?;
    load_open(&state, id, user.id).await?;

    let handle = state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("No live session for interview {id}")))?;
    let session = handle.lock().await;

    let score = finalize(&state.db, &state.llm, &state.sessions, id, &session).await?;
    Ok(Json(FinalizeResponse {
        interview_id: id,
        score,
    }))
}

/// GET /api/v1/interviews/:id/result?user_id=
pub async fn handle_get_result(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<InterviewResultResponse>, AppError> {
    let interview = load_owned(&state, id, params.user_id).await?;
    if !interview.is_completed() {
        return Err(AppError::Validation(
            "Interview has not been completed yet".to_string(),
        ));
    }
    Ok(Json(interview.into()))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn load_owned(state: &AppState, id: Uuid, user_id: Uuid) -> Result<InterviewRow, AppError> {
    find_for_user(&state.db, id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {id} not found")))
}

/// Like `load_owned`, but rejects interviews that are already completed.
async fn load_open(state: &AppState, id: Uuid, user_id: Uuid) -> Result<InterviewRow, AppError> {
    let interview = load_owned(state, id, user_id).await?;
    if interview.is_completed() {
        return Err(already_completed());
    }
    Ok(interview)
}

fn already_completed() -> AppError {
    AppError::Validation("This interview has already been completed".to_string())
}

/// Marks the interview started, then briefs its session and takes the opening turn.
///
/// The status write refuses completed interviews, so a start racing the final
/// message cannot reopen one.
async fn begin_session(
    recorder: &dyn InterviewRecorder,
    model: &dyn ChatModel,
    sessions: &SessionStore,
    id: Uuid,
    candidate_context: &str,
    job: JobContext,
) -> Result<InterviewTurn, AppError> {
    if !recorder.mark_in_progress(id).await? {
        return Err(already_completed());
    }

    let handle = sessions.acquire(id).await;
    let mut session = handle.lock().await;
    session.initialize(candidate_context, job)?;
    Ok(session.next_message(model, None).await?)
}

/// Builds the turn response, finalizing the interview when the turn closed it.
/// A failed assessment leaves the session live for the finalize endpoint.
async fn settle_turn(
    recorder: &dyn InterviewRecorder,
    model: &dyn ChatModel,
    sessions: &SessionStore,
    id: Uuid,
    session: &InterviewSession,
    turn: InterviewTurn,
) -> InterviewMessageResponse {
    let score = if turn.is_complete {
        match finalize(recorder, model, sessions, id, session).await {
            Ok(score) => Some(score),
            Err(e) => {
                error!("Interview {id} finished but its assessment failed: {e}");
                None
            }
        }
    } else {
        None
    };

    InterviewMessageResponse {
        interviewer_message: turn.message,
        is_complete: turn.is_complete,
        questions_asked: turn.questions_asked,
        assessment_pending: turn.is_complete && score.is_none(),
        score,
    }
}

/// Generates the assessment, stores the terminal record and evicts the session.
async fn finalize(
    recorder: &dyn InterviewRecorder,
    model: &dyn ChatModel,
    sessions: &SessionStore,
    id: Uuid,
    session: &InterviewSession,
) -> Result<u32, AppError> {
    let outcome = session.generate_assessment(model).await?;
    if !outcome.is_parsed() {
        warn!("Interview {id}: assessment stored as raw text with fallback score");
    }

    let score = outcome.overall_score();
    info!(
        "Interview {id} ({}) assessed: score {score}",
        session.job().map(|j| j.position.as_str()).unwrap_or("unknown position")
    );
    let conversation = serde_json::to_value(session.conversation_log())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize conversation: {e}")))?;
    let assessment = outcome.to_record();

    recorder
        .complete(CompletionParams {
            interview_id: id,
            score: i32::try_from(score).unwrap_or(i32::MAX),
            conversation: &conversation,
            assessment: &assessment,
        })
        .await?;

    sessions.evict(id).await;
    Ok(score)
}

fn job_description(position: &str, company: Option<&str>) -> String {
    format!(
        "Interview for {position} position at {}",
        company.unwrap_or("our company")
    )
}
