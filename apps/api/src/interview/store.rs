//! In-memory store of live interview sessions, keyed by interview id.
//!
//! Each session sits behind its own `tokio::sync::Mutex`: holding the guard
//! across the model call serializes turns for one interview while other
//! interviews proceed. Sessions are evicted explicitly once their assessment
//! is persisted, and a background sweep drops the ones that went idle.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::interview::session::InterviewSession;

pub type SessionHandle = Arc<Mutex<InterviewSession>>;

struct Slot {
    session: SessionHandle,
    last_touched: Instant,
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Slot>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Returns the session for `interview_id`, creating an uninitialized one on first use.
    pub async fn acquire(&self, interview_id: Uuid) -> SessionHandle {
        let mut sessions = self.sessions.write().await;
        let slot = sessions.entry(interview_id).or_insert_with(|| {
            debug!("Creating interview session {interview_id}");
            Slot {
                session: Arc::new(Mutex::new(InterviewSession::new())),
                last_touched: Instant::now(),
            }
        });
        slot.last_touched = Instant::now();
        Arc::clone(&slot.session)
    }

    /// Returns the session only if it is already live.
    pub async fn get(&self, interview_id: Uuid) -> Option<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(&interview_id).map(|slot| {
            slot.last_touched = Instant::now();
            Arc::clone(&slot.session)
        })
    }

    pub async fn evict(&self, interview_id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&interview_id).is_some();
        if removed {
            debug!("Evicted interview session {interview_id}");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops sessions idle longer than the TTL. A session whose handle is
    /// still held by a request is kept regardless of age.
    pub async fn sweep_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let ttl = self.ttl;
        sessions.retain(|_, slot| {
            Arc::strong_count(&slot.session) > 1 || slot.last_touched.elapsed() < ttl
        });
        before - sessions.len()
    }

    /// Runs `sweep_expired` every `interval` until the returned task is aborted.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = store.sweep_expired().await;
                if removed > 0 {
                    info!("Swept {removed} idle interview sessions");
                }
            }
        })
    }
}
