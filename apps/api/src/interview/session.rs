//! Interview session: the bounded, turn-based dialogue with the model.
//!
//! State machine:
//!
//! ```text
//! Uninitialized --initialize--> Active { 0 }
//! Active { n }  --next_message--> Active { n' }   (n' < MAX_TURNS)
//! Active { n }  --next_message--> Complete        (n' == MAX_TURNS)
//! Complete: terminal, only generate_assessment / conversation_log
//! ```
//!
//! A turn only counts when the candidate actually replied, so the opening
//! question is free and exactly `MAX_TURNS` replies finish the interview.
//! Every mutation is staged and committed only after the model answers:
//! an upstream failure leaves the session exactly as it was.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::interview::assessment::AssessmentOutcome;
use crate::interview::prompts::{assessment_prompt, interviewer_system_prompt, CLOSING_INSTRUCTION};
use crate::llm_client::{ChatMessage, ChatModel, LlmError, Role, SamplingParams};

/// Candidate replies needed to finish an interview.
pub const MAX_TURNS: u32 = 5;

const TURN_PARAMS: SamplingParams = SamplingParams {
    temperature: 0.7,
    top_p: Some(0.9),
    max_tokens: 500,
};

const ASSESSMENT_PARAMS: SamplingParams = SamplingParams {
    temperature: 0.3,
    top_p: None,
    max_tokens: 1000,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Active { turns_taken: u32 },
    Complete,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Uninitialized => write!(f, "uninitialized"),
            SessionState::Active { turns_taken } => write!(f, "active ({turns_taken} turns)"),
            SessionState::Complete => write!(f, "complete"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot {operation} while the session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    #[error("missing required interview context: {0}")]
    MissingContext(&'static str),

    #[error("upstream model call failed: {0}")]
    Upstream(#[from] LlmError),
}

/// What the interview is for. Immutable once the session is initialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobContext {
    pub position: String,
    pub description: String,
}

impl JobContext {
    pub fn new(position: impl Into<String>, description: Option<String>) -> Self {
        let position = position.into();
        let description = description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| format!("Interview for {position} position"));
        Self {
            position,
            description,
        }
    }
}

/// The interviewer's reply for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterviewTurn {
    pub message: String,
    pub is_complete: bool,
    pub questions_asked: u32,
}

#[derive(Debug, Clone)]
pub struct InterviewSession {
    state: SessionState,
    history: Vec<ChatMessage>,
    job: Option<JobContext>,
}

impl Default for InterviewSession {
    fn default() -> Self {
        Self::new()
    }
}

impl InterviewSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Uninitialized,
            history: Vec::new(),
            job: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn turns_taken(&self) -> u32 {
        match self.state {
            SessionState::Uninitialized => 0,
            SessionState::Active { turns_taken } => turns_taken,
            SessionState::Complete => MAX_TURNS,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.state, SessionState::Complete)
    }

    pub fn job(&self) -> Option<&JobContext> {
        self.job.as_ref()
    }

    /// Full transcript including system entries.
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Builds the interviewer system prompt and resets the conversation.
    ///
    /// Re-initializing an active session restarts it; a completed session is final.
    pub fn initialize(
        &mut self,
        candidate_context: &str,
        job: JobContext,
    ) -> Result<(), SessionError> {
        match self.state {
            SessionState::Uninitialized | SessionState::Active { .. } => {}
            state @ SessionState::Complete => {
                return Err(SessionError::InvalidState {
                    operation: "initialize",
                    state,
                })
            }
        }

        if candidate_context.trim().is_empty() {
            return Err(SessionError::MissingContext("candidate_context"));
        }
        if job.position.trim().is_empty() {
            return Err(SessionError::MissingContext("position"));
        }

        let system_prompt = interviewer_system_prompt(
            &job.position,
            candidate_context,
            &job.description,
            MAX_TURNS,
        );

        self.history = vec![ChatMessage::system(system_prompt)];
        self.job = Some(job);
        self.state = SessionState::Active { turns_taken: 0 };

        debug!("Interview session initialized");
        Ok(())
    }

    /// Records the candidate's reply (if any) and asks the model for the next
    /// interviewer message.
    ///
    /// The turn that reaches `MAX_TURNS` also carries the closing instruction,
    /// so its reply is the goodbye and `is_complete` is `true`. Calling again
    /// afterwards is an `InvalidState` error.
    pub async fn next_message(
        &mut self,
        model: &dyn ChatModel,
        candidate_reply: Option<&str>,
    ) -> Result<InterviewTurn, SessionError> {
        let turns_taken = match self.state {
            SessionState::Active { turns_taken } => turns_taken,
            state @ (SessionState::Uninitialized | SessionState::Complete) => {
                return Err(SessionError::InvalidState {
                    operation: "take a turn",
                    state,
                })
            }
        };

        let mut request = self.history.clone();
        let mut turns = turns_taken;
        if let Some(reply) = candidate_reply {
            request.push(ChatMessage::user(reply));
            turns += 1;
        }

        let is_complete = turns >= MAX_TURNS;
        if is_complete {
            request.push(ChatMessage::system(CLOSING_INSTRUCTION));
        }

        let message = model.complete(&request, TURN_PARAMS).await?;

        // Commit only after the model answered.
        request.push(ChatMessage::assistant(message.clone()));
        self.history = request;
        self.state = if is_complete {
            info!("Interview session complete after {turns} turns");
            SessionState::Complete
        } else {
            SessionState::Active { turns_taken: turns }
        };

        Ok(InterviewTurn {
            message,
            is_complete,
            questions_asked: turns,
        })
    }

    /// Asks the model to evaluate the finished conversation.
    ///
    /// The evaluation prompt is sent once and never stored in the history.
    /// Malformed model output degrades to `AssessmentOutcome::Unparsed`;
    /// only upstream failures are errors.
    pub async fn generate_assessment(
        &self,
        model: &dyn ChatModel,
    ) -> Result<AssessmentOutcome, SessionError> {
        let job = match (self.state, self.job.as_ref()) {
            (SessionState::Complete, Some(job)) => job,
            (state, _) => {
                return Err(SessionError::InvalidState {
                    operation: "generate an assessment",
                    state,
                })
            }
        };

        let mut request = self.history.clone();
        request.push(ChatMessage::user(assessment_prompt(&job.position)));

        let raw = model.complete(&request, ASSESSMENT_PARAMS).await?;
        Ok(AssessmentOutcome::parse(&raw))
    }

    /// The transcript without system entries, in order. Used for persistence and display.
    pub fn conversation_log(&self) -> Vec<ChatMessage> {
        self.history
            .iter()
            .filter(|m| m.role != Role::System)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// Replays canned completions and records every request it receives.
    pub(crate) struct ScriptedModel {
        replies: Mutex<VecDeque<Result<String, String>>>,
        pub(crate) requests: Mutex<Vec<(Vec<ChatMessage>, SamplingParams)>>,
    }

    impl ScriptedModel {
        pub(crate) fn new(replies: Vec<Result<&str, &str>>) -> Self {
            Self {
                replies: Mutex::new(
                    replies
                        .into_iter()
                        .map(|r| r.map(str::to_string).map_err(str::to_string))
                        .collect(),
                ),
                requests: Mutex::new(Vec::new()),
            }
        }

        /// A model that answers every call with a numbered question.
        pub(crate) fn echoing(count: usize) -> Self {
            let replies = (0..count).map(|i| Ok(format!("Question {i}"))).collect();
            Self {
                replies: Mutex::new(replies),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn last_request(&self) -> Vec<ChatMessage> {
            self.requests.lock().unwrap().last().unwrap().0.clone()
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(
            &self,
            messages: &[ChatMessage],
            params: SamplingParams,
        ) -> Result<String, LlmError> {
            self.requests
                .lock()
                .unwrap()
                .push((messages.to_vec(), params));
            match self.replies.lock().unwrap().pop_front() {
                Some(Ok(text)) => Ok(text),
                Some(Err(message)) => Err(LlmError::Api {
                    status: 500,
                    message,
                }),
                None => Err(LlmError::EmptyContent),
            }
        }
    }

    fn job() -> JobContext {
        JobContext::new("Backend Engineer", None)
    }

    fn initialized() -> InterviewSession {
        let mut session = InterviewSession::new();
        session
            .initialize("Name: Ada Lovelace\nSkills: Rust, SQL", job())
            .unwrap();
        session
    }

    #[test]
    fn test_job_context_default_description() {
        let job = JobContext::new("Designer", None);
        assert_eq!(job.description, "Interview for Designer position");
        let job = JobContext::new("Designer", Some("  ".to_string()));
        assert_eq!(job.description, "Interview for Designer position");
        let job = JobContext::new("Designer", Some("Own the design system".to_string()));
        assert_eq!(job.description, "Own the design system");
    }

    #[test]
    fn test_initialize_sets_single_system_entry() {
        let session = initialized();
        assert_eq!(session.state(), SessionState::Active { turns_taken: 0 });
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].role, Role::System);
        assert!(session.history()[0].content.contains("Ada Lovelace"));
        assert!(session.history()[0].content.contains("Backend Engineer"));
        assert_eq!(session.job().unwrap().position, "Backend Engineer");
    }

    #[test]
    fn test_initialize_rejects_missing_context() {
        let mut session = InterviewSession::new();
        let err = session.initialize("   ", job()).unwrap_err();
        assert!(matches!(err, SessionError::MissingContext("candidate_context")));

        let err = session
            .initialize("Name: Ada", JobContext::new("", None))
            .unwrap_err();
        assert!(matches!(err, SessionError::MissingContext("position")));
        assert_eq!(session.state(), SessionState::Uninitialized);
    }

    #[tokio::test]
    async fn test_next_message_without_initialize_is_invalid_state() {
        let model = ScriptedModel::echoing(1);
        let mut session = InterviewSession::new();
        let err = session.next_message(&model, None).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidState {
                state: SessionState::Uninitialized,
                ..
            }
        ));
        assert!(model.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_five_turn_scenario() {
        let model = ScriptedModel::echoing(6);
        let mut session = initialized();

        let opening = session.next_message(&model, None).await.unwrap();
        assert!(!opening.is_complete);
        assert_eq!(opening.questions_asked, 0);
        assert_eq!(session.turns_taken(), 0);

        for i in 1..MAX_TURNS {
            let turn = session
                .next_message(&model, Some(&format!("reply{i}")))
                .await
                .unwrap();
            assert!(!turn.is_complete, "turn {i} should not complete");
            assert_eq!(turn.questions_asked, i);
            assert_eq!(session.turns_taken(), i);
        }

        let last = session.next_message(&model, Some("reply5")).await.unwrap();
        assert!(last.is_complete);
        assert_eq!(last.questions_asked, MAX_TURNS);
        assert_eq!(session.state(), SessionState::Complete);

        // The closing call carries the closing instruction as a second system entry.
        let request = model.last_request();
        let last_entry = request.last().unwrap();
        assert_eq!(last_entry.role, Role::System);
        assert_eq!(last_entry.content, CLOSING_INSTRUCTION);
        let system_entries = session
            .history()
            .iter()
            .filter(|m| m.role == Role::System)
            .count();
        assert_eq!(system_entries, 2);
    }

    #[tokio::test]
    async fn test_turn_sampling_params() {
        let model = ScriptedModel::echoing(1);
        let mut session = initialized();
        session.next_message(&model, None).await.unwrap();
        let (_, params) = model.requests.lock().unwrap()[0].clone();
        assert_eq!(params, TURN_PARAMS);
    }

    #[tokio::test]
    async fn test_next_message_after_complete_is_invalid_state() {
        let model = ScriptedModel::echoing(MAX_TURNS as usize + 1);
        let mut session = initialized();
        for i in 0..MAX_TURNS {
            session
                .next_message(&model, Some(&format!("reply{i}")))
                .await
                .unwrap();
        }
        assert!(session.is_complete());
        let err = session.next_message(&model, Some("more")).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidState {
                state: SessionState::Complete,
                ..
            }
        ));
        let err = session.initialize("Name: Ada", job()).unwrap_err();
        assert!(matches!(err, SessionError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn test_upstream_failure_leaves_session_untouched() {
        let model = ScriptedModel::new(vec![Ok("Hello, tell me about yourself"), Err("timeout")]);
        let mut session = initialized();
        session.next_message(&model, None).await.unwrap();
        let history_before = session.history().to_vec();

        let err = session
            .next_message(&model, Some("I build databases"))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Upstream(_)));
        assert_eq!(session.history(), history_before.as_slice());
        assert_eq!(session.turns_taken(), 0);
    }

    #[tokio::test]
    async fn test_failed_closing_turn_can_be_retried() {
        let mut replies: Vec<Result<&str, &str>> = vec![Ok("q"); MAX_TURNS as usize];
        replies.push(Err("boom"));
        replies.push(Ok("Thanks for your time"));
        let model = ScriptedModel::new(replies);
        let mut session = initialized();
        session.next_message(&model, None).await.unwrap();
        for i in 1..MAX_TURNS {
            session
                .next_message(&model, Some(&format!("reply{i}")))
                .await
                .unwrap();
        }

        assert!(session.next_message(&model, Some("reply5")).await.is_err());
        assert_eq!(session.turns_taken(), MAX_TURNS - 1);

        let turn = session.next_message(&model, Some("reply5")).await.unwrap();
        assert!(turn.is_complete);
        assert_eq!(turn.message, "Thanks for your time");
    }

    #[tokio::test]
    async fn test_conversation_log_never_contains_system_entries() {
        let model = ScriptedModel::echoing(MAX_TURNS as usize + 1);
        let mut session = InterviewSession::new();
        assert!(session.conversation_log().is_empty());

        session.initialize("Name: Ada", job()).unwrap();
        assert!(session.conversation_log().is_empty());

        session.next_message(&model, None).await.unwrap();
        for i in 1..=MAX_TURNS {
            session
                .next_message(&model, Some(&format!("reply{i}")))
                .await
                .unwrap();
            assert!(session
                .conversation_log()
                .iter()
                .all(|m| m.role != Role::System));
        }

        let log = session.conversation_log();
        // opening + 5 * (reply + answer)
        assert_eq!(log.len(), 1 + 2 * MAX_TURNS as usize);
        assert_eq!(log[0].role, Role::Assistant);
        assert_eq!(log[1], ChatMessage::user("reply1"));
    }

    #[tokio::test]
    async fn test_assessment_requires_complete_session() {
        let model = ScriptedModel::echoing(2);
        let mut session = initialized();
        session.next_message(&model, None).await.unwrap();
        let err = session.generate_assessment(&model).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidState {
                state: SessionState::Active { turns_taken: 0 },
                ..
            }
        ));
    }

    async fn completed_with(final_reply: &'static str) -> (InterviewSession, ScriptedModel) {
        let mut replies: Vec<Result<&str, &str>> = vec![Ok("q"); MAX_TURNS as usize];
        replies.push(Ok(final_reply));
        let model = ScriptedModel::new(replies);
        let mut session = initialized();
        for i in 0..MAX_TURNS {
            session
                .next_message(&model, Some(&format!("reply{i}")))
                .await
                .unwrap();
        }
        (session, model)
    }

    #[tokio::test]
    async fn test_assessment_strips_fences() {
        let (session, model) =
            completed_with("```json\n{\"overall_score\": 77, \"recommendation\": \"Yes\"}\n```")
                .await;
        let history_len = session.history().len();

        let outcome = session.generate_assessment(&model).await.unwrap();
        assert!(outcome.is_parsed());
        assert_eq!(outcome.overall_score(), 77);

        // The evaluation prompt is sent but never kept.
        let (request, params) = model.requests.lock().unwrap().last().unwrap().clone();
        assert_eq!(params, ASSESSMENT_PARAMS);
        assert_eq!(request.len(), history_len + 1);
        assert_eq!(request.last().unwrap().role, Role::User);
        assert!(request.last().unwrap().content.contains("overall_score"));
        assert_eq!(session.history().len(), history_len);
    }

    #[tokio::test]
    async fn test_assessment_falls_back_on_non_json() {
        let (session, model) = completed_with("I think they are great.").await;
        let outcome = session.generate_assessment(&model).await.unwrap();
        assert_eq!(outcome.overall_score(), 50);
        let record = outcome.to_record();
        assert_eq!(record["raw_assessment"], "I think they are great.");
        assert_eq!(record["error"], "parse failed");
    }

    #[tokio::test]
    async fn test_assessment_upstream_failure_is_an_error() {
        let mut replies: Vec<Result<&str, &str>> = vec![Ok("q"); MAX_TURNS as usize];
        replies.push(Err("gateway timeout"));
        let model = ScriptedModel::new(replies);
        let mut session = initialized();
        for i in 0..MAX_TURNS {
            session
                .next_message(&model, Some(&format!("reply{i}")))
                .await
                .unwrap();
        }
        let err = session.generate_assessment(&model).await.unwrap_err();
        assert!(matches!(err, SessionError::Upstream(_)));
        assert!(session.is_complete());
    }
}
