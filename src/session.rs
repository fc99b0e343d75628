//! Chat session controller
//!
//! `ChatSession` owns the transcript and drives one prompt at a time through
//! the topic filter, keyword tracking, endpoint probing and classification.
//! A submission is split in two halves so a front end can observe the
//! in-flight state:
//!
//! ```text
//! Idle --begin(text)--> AwaitingResponse --resolve(result)--> Idle
//!   \--begin(forbidden)--> Idle
//! ```
//!
//! `submit` runs both halves with the session's own prober.

use crate::ai::{
    CLARIFICATION_REPLY, ChatResult, Classification, EndpointProber, HttpTransport, Humanizer,
    LeadInPicker, ProbeSuccess, PromptPayload, RandomLeadIn, Transport, classify,
};
use crate::config::Config;
use crate::storage::{self, FileStore, KeyValueStore, KeywordStore};
use crate::topics::{FORBIDDEN_REPLY, TopicFilter, Verdict, extract_keywords, finance_terms};
use crate::types::ChatMessage;
use tracing::{debug, info, warn};

pub const NETWORK_FAILURE_REPLY: &str =
    "Sorry — I couldn't reach the backend. Please try again in a moment.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingResponse,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Input was empty after trimming.
    Empty,
    /// A submission is already in flight.
    Busy,
    /// `resolve` was called with nothing in flight.
    NotAwaiting,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Ignored(IgnoreReason),
    Forbidden { term: &'static str },
    Answered { endpoint: String },
    Clarify { endpoint: String },
    Unreachable,
}

/// A prompt that passed the filter and is ready to be sent.
#[derive(Clone, Debug, PartialEq)]
pub struct Dispatch {
    pub payload: PromptPayload,
    pub finance_terms: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    Done(SubmitOutcome),
    Dispatch(Dispatch),
}

pub struct ChatSession<T, S, P> {
    prober: EndpointProber<T>,
    keyword_store: KeywordStore<S>,
    humanizer: Humanizer<P>,
    filter: TopicFilter,
    base_url: String,
    messages: Vec<ChatMessage>,
    input: String,
    phase: Phase,
    tracked: Vec<String>,
    last_endpoint: Option<String>,
    last_error: Option<String>,
}

impl ChatSession<HttpTransport, FileStore, RandomLeadIn> {
    /// Session talking HTTP to the configured backend, tracking keywords on disk.
    pub fn from_config(config: &Config) -> ChatResult<Self> {
        let transport = HttpTransport::new(config.request_timeout)?;
        let prober = EndpointProber::new(transport, config.endpoints());
        let keyword_store = KeywordStore::new(FileStore::new(config.data_dir.clone()));
        Ok(Self::new(
            prober,
            keyword_store,
            Humanizer::default(),
            config.api_url.clone(),
        ))
    }
}

impl<T: Transport, S: KeyValueStore, P: LeadInPicker> ChatSession<T, S, P> {
    pub fn new(
        prober: EndpointProber<T>,
        keyword_store: KeywordStore<S>,
        humanizer: Humanizer<P>,
        base_url: impl Into<String>,
    ) -> Self {
        let tracked = keyword_store.load();
        debug!(count = tracked.len(), "loaded tracked keywords");
        Self {
            prober,
            keyword_store,
            humanizer,
            filter: TopicFilter::new(),
            base_url: base_url.into(),
            messages: Vec::new(),
            input: String::new(),
            phase: Phase::Idle,
            tracked,
            last_endpoint: None,
            last_error: None,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::AwaitingResponse
    }

    pub fn tracked_keywords(&self) -> &[String] {
        &self.tracked
    }

    pub fn last_endpoint(&self) -> Option<&str> {
        self.last_endpoint.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The endpoint that last answered, or the configured base URL.
    pub fn backend_label(&self) -> &str {
        self.last_endpoint.as_deref().unwrap_or(&self.base_url)
    }

    /// First half of a submission: record the prompt and decide whether it
    /// goes to the backend.
    pub fn begin(&mut self, text: &str) -> Step {
        let prompt = text.trim();
        if prompt.is_empty() {
            return Step::Done(SubmitOutcome::Ignored(IgnoreReason::Empty));
        }
        if self.phase == Phase::AwaitingResponse {
            debug!("submission ignored while awaiting a response");
            return Step::Done(SubmitOutcome::Ignored(IgnoreReason::Busy));
        }

        self.last_error = None;
        self.input.clear();
        self.messages.push(ChatMessage::user(prompt));

        if let Verdict::Forbidden { term } = self.filter.check(prompt) {
            info!(term, "prompt rejected by topic filter");
            self.messages.push(ChatMessage::assistant(FORBIDDEN_REPLY));
            return Step::Done(SubmitOutcome::Forbidden { term });
        }

        let keywords = extract_keywords(prompt);
        let on_topic = finance_terms(&keywords);
        debug!(?keywords, finance_terms = ?on_topic, "extracted keywords");

        self.tracked = storage::merge(&self.tracked, &keywords);
        self.keyword_store.save(&self.tracked);

        self.phase = Phase::AwaitingResponse;
        Step::Dispatch(Dispatch {
            payload: PromptPayload::new(prompt, keywords),
            finance_terms: on_topic,
        })
    }

    /// Second half of a submission: turn the probe result into an assistant
    /// message and return to idle.
    pub fn resolve(&mut self, result: ChatResult<ProbeSuccess>) -> SubmitOutcome {
        if self.phase != Phase::AwaitingResponse {
            warn!("probe result arrived with no submission in flight");
            return SubmitOutcome::Ignored(IgnoreReason::NotAwaiting);
        }

        let outcome = match result {
            Ok(ProbeSuccess { endpoint, body }) => {
                self.last_endpoint = Some(endpoint.clone());
                match classify(&body) {
                    Classification::Confident(answer) => {
                        let reply = self.humanizer.humanize(&answer);
                        self.messages.push(ChatMessage::assistant(reply));
                        SubmitOutcome::Answered { endpoint }
                    }
                    Classification::LowConfidence { raw } => {
                        debug!(raw = %raw, "low confidence answer, asking for clarification");
                        let reply = self.humanizer.humanize(CLARIFICATION_REPLY);
                        self.messages.push(ChatMessage::assistant(reply));
                        SubmitOutcome::Clarify { endpoint }
                    }
                }
            }
            Err(err) => {
                warn!("backend unreachable: {}", err);
                self.last_error = Some(err.to_string());
                let reply = self.humanizer.humanize(NETWORK_FAILURE_REPLY);
                self.messages.push(ChatMessage::assistant(reply));
                SubmitOutcome::Unreachable
            }
        };

        self.phase = Phase::Idle;
        outcome
    }

    pub async fn submit(&mut self, text: &str) -> SubmitOutcome {
        match self.begin(text) {
            Step::Done(outcome) => outcome,
            Step::Dispatch(dispatch) => {
                let result = self.prober.probe(&dispatch.payload).await;
                self.resolve(result)
            }
        }
    }

    /// Submit the input buffer. It is left untouched if the submission is ignored.
    pub async fn submit_input(&mut self) -> SubmitOutcome {
        let text = std::mem::take(&mut self.input);
        let outcome = self.submit(&text).await;
        if matches!(outcome, SubmitOutcome::Ignored(_)) {
            self.input = text;
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AttemptError, ChatError, FixedLeadIn};
    use crate::storage::MemoryStore;
    use crate::types::Role;
    use async_trait::async_trait;
    use serde_json::{Value, json};

    struct Unused;

    #[async_trait]
    impl Transport for Unused {
        async fn post_json(
            &self,
            url: &str,
            _payload: &PromptPayload,
        ) -> Result<Value, AttemptError> {
            panic!("unexpected request to {url}");
        }
    }

    fn session() -> ChatSession<Unused, MemoryStore, FixedLeadIn> {
        ChatSession::new(
            EndpointProber::new(Unused, vec!["http://backend/generate".into()]),
            KeywordStore::new(MemoryStore::new()),
            Humanizer::new(FixedLeadIn(0)),
            "http://backend",
        )
    }

    #[test]
    fn test_empty_input_is_a_no_op() {
        let mut chat = session();
        assert_eq!(
            chat.begin("   \n\t"),
            Step::Done(SubmitOutcome::Ignored(IgnoreReason::Empty))
        );
        assert!(chat.messages().is_empty());
        assert_eq!(chat.phase(), Phase::Idle);
    }

    #[test]
    fn test_begin_enters_awaiting_and_rejects_resubmission() {
        let mut chat = session();
        let step = chat.begin("  How do dividends work?  ");
        let Step::Dispatch(dispatch) = step else {
            panic!("expected dispatch, got {step:?}");
        };
        assert_eq!(dispatch.payload.prompt, "How do dividends work?");
        assert_eq!(dispatch.payload.keywords, vec!["dividends", "work"]);
        assert!(dispatch.finance_terms.is_empty());
        assert!(chat.is_loading());

        assert_eq!(
            chat.begin("another question"),
            Step::Done(SubmitOutcome::Ignored(IgnoreReason::Busy))
        );
        assert_eq!(chat.messages().len(), 1);
    }

    #[test]
    fn test_dispatch_carries_finance_terms() {
        let mut chat = session();
        let Step::Dispatch(dispatch) = chat.begin("Should I buy stocks now?") else {
            panic!("expected dispatch");
        };
        assert_eq!(dispatch.payload.keywords, vec!["should", "buy", "stocks", "now"]);
        assert_eq!(dispatch.finance_terms, vec!["stocks"]);
    }

    #[test]
    fn test_resolve_without_submission_is_ignored() {
        let mut chat = session();
        let outcome = chat.resolve(Ok(ProbeSuccess {
            endpoint: "http://backend/generate".into(),
            body: json!({"text": "A stray answer that nobody asked for."}),
        }));
        assert_eq!(outcome, SubmitOutcome::Ignored(IgnoreReason::NotAwaiting));
        assert!(chat.messages().is_empty());
    }

    #[test]
    fn test_resolve_success_appends_humanized_answer() {
        let mut chat = session();
        let _ = chat.begin("What moves bond prices?");
        let outcome = chat.resolve(Ok(ProbeSuccess {
            endpoint: "http://backend/chat".into(),
            body: json!({"text": "Bond prices move inversely to interest rates."}),
        }));

        assert_eq!(
            outcome,
            SubmitOutcome::Answered {
                endpoint: "http://backend/chat".into()
            }
        );
        assert_eq!(chat.phase(), Phase::Idle);
        assert_eq!(chat.last_endpoint(), Some("http://backend/chat"));
        assert_eq!(chat.backend_label(), "http://backend/chat");
        let last = chat.messages().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(
            last.content,
            "Sure — Bond prices move inversely to interest rates."
        );
    }

    #[test]
    fn test_resolve_failure_records_error() {
        let mut chat = session();
        let _ = chat.begin("What moves bond prices?");
        let outcome = chat.resolve(Err(ChatError::AllEndpointsUnreachable {
            attempts: Vec::new(),
        }));
        assert_eq!(outcome, SubmitOutcome::Unreachable);
        assert_eq!(chat.last_error(), Some("All endpoints failed"));
        assert_eq!(chat.backend_label(), "http://backend");
        assert_eq!(
            chat.messages().last().unwrap().content,
            format!("Sure — {NETWORK_FAILURE_REPLY}")
        );
    }

    #[test]
    fn test_next_submission_clears_last_error() {
        let mut chat = session();
        let _ = chat.begin("What moves bond prices?");
        let _ = chat.resolve(Err(ChatError::AllEndpointsUnreachable {
            attempts: Vec::new(),
        }));
        let _ = chat.begin("Try again about bond prices");
        assert_eq!(chat.last_error(), None);
    }
}
