use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::interview::store::SessionStore;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Archive for uploaded CV files.
    pub s3: S3Client,
    pub llm: LlmClient,
    pub config: Config,
    /// Live interview sessions, one per interview id.
    pub sessions: SessionStore,
}
