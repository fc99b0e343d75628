/// Backend access for the finance chat client
///
/// This module talks to the opaque text-generation service and turns its
/// replies into something presentable.
///
/// # Architecture
///
/// - `http` - reqwest-backed `Transport`
/// - `prober` - sequential fallback across candidate endpoints
/// - `classifier` - answer extraction and low-confidence detection
/// - `humanize` - conversational lead-ins
///
/// # Usage
///
/// ```rust,no_run
/// use finchat::ai::{EndpointProber, HttpTransport, PromptPayload};
/// use finchat::config::Config;
///
/// # async fn example() -> Result<(), finchat::ai::ChatError> {
/// let config = Config::from_env();
/// let transport = HttpTransport::new(config.request_timeout)?;
/// let prober = EndpointProber::new(transport, config.endpoints());
/// let reply = prober
///     .probe(&PromptPayload::new("What is a dividend?", vec!["dividend".into()]))
///     .await?;
/// println!("{} answered", reply.endpoint);
/// # Ok(())
/// # }
/// ```
pub mod classifier;
pub mod http;
pub mod humanize;
pub mod prober;

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

pub use classifier::{CLARIFICATION_REPLY, Classification, classify, resolve_answer};
pub use http::HttpTransport;
pub use humanize::{FixedLeadIn, Humanizer, LEAD_INS, LeadInPicker, RandomLeadIn};
pub use prober::{EndpointProber, ProbeSuccess, PromptPayload};

// ============================================
// Error Types
// ============================================

/// Why a single endpoint attempt was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AttemptError {
    #[error("request failed: {0}")]
    Network(String),

    #[error("endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response is not JSON: {0}")]
    InvalidJson(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EndpointFailure {
    pub endpoint: String,
    pub error: AttemptError,
}

impl fmt::Display for EndpointFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.endpoint, self.error)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("All endpoints failed")]
    AllEndpointsUnreachable { attempts: Vec<EndpointFailure> },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

pub type ChatResult<T> = Result<T, ChatError>;

// ============================================
// Transport
// ============================================

/// One POST of a JSON payload to one URL.
///
/// An attempt succeeds only when the status is a success and the body
/// parses as JSON.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, url: &str, payload: &PromptPayload)
    -> Result<Value, AttemptError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for &T {
    async fn post_json(
        &self,
        url: &str,
        payload: &PromptPayload,
    ) -> Result<Value, AttemptError> {
        (**self).post_json(url, payload).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn post_json(
        &self,
        url: &str,
        payload: &PromptPayload,
    ) -> Result<Value, AttemptError> {
        (**self).post_json(url, payload).await
    }
}
