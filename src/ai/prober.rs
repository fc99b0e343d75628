use super::{ChatError, ChatResult, EndpointFailure, Transport};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

/// Request body sent to every candidate endpoint.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PromptPayload {
    pub prompt: String,
    pub keywords: Vec<String>,
}

impl PromptPayload {
    pub fn new(prompt: impl Into<String>, keywords: Vec<String>) -> Self {
        Self {
            prompt: prompt.into(),
            keywords,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProbeSuccess {
    pub endpoint: String,
    pub body: Value,
}

/// Tries an ordered list of endpoints one after another and keeps the first
/// that answers with a success status and a JSON body.
pub struct EndpointProber<T> {
    transport: T,
    endpoints: Vec<String>,
}

impl<T: Transport> EndpointProber<T> {
    pub fn new(transport: T, endpoints: Vec<String>) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    pub async fn probe(&self, payload: &PromptPayload) -> ChatResult<ProbeSuccess> {
        let mut attempts = Vec::with_capacity(self.endpoints.len());
        for endpoint in &self.endpoints {
            match self.transport.post_json(endpoint, payload).await {
                Ok(parsed) => {
                    info!(endpoint = %endpoint, "backend answered");
                    return Ok(ProbeSuccess {
                        endpoint: endpoint.clone(),
                        body: parsed,
                    });
                }
                Err(error) => {
                    warn!(endpoint = %endpoint, "endpoint rejected: {}", error);
                    attempts.push(EndpointFailure {
                        endpoint: endpoint.clone(),
                        error,
                    });
                }
            }
        }

        Err(ChatError::AllEndpointsUnreachable { attempts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AttemptError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Canned per-URL outcomes; unknown URLs fail with a network error.
    #[derive(Default)]
    struct ScriptedTransport {
        replies: HashMap<String, Result<Value, AttemptError>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn reply(mut self, url: &str, outcome: Result<Value, AttemptError>) -> Self {
            self.replies.insert(url.to_string(), outcome);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn post_json(
            &self,
            url: &str,
            _payload: &PromptPayload,
        ) -> Result<Value, AttemptError> {
            self.calls.lock().unwrap().push(url.to_string());
            self.replies
                .get(url)
                .cloned()
                .unwrap_or_else(|| Err(AttemptError::Network("connection refused".into())))
        }
    }

    fn urls(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let transport = ScriptedTransport::default()
            .reply("A", Err(AttemptError::Network("refused".into())))
            .reply("B", Ok(json!({"text": "from B"})))
            .reply("C", Ok(json!({"text": "from C"})));
        let prober = EndpointProber::new(&transport, urls(&["A", "B", "C"]));

        let success = prober
            .probe(&PromptPayload::new("hello", vec![]))
            .await
            .unwrap();

        assert_eq!(success.endpoint, "B");
        assert_eq!(success.body, json!({"text": "from B"}));
        assert_eq!(transport.calls(), urls(&["A", "B"]));
    }

    #[tokio::test]
    async fn test_skips_bad_status_and_bad_json() {
        let transport = ScriptedTransport::default()
            .reply(
                "A",
                Err(AttemptError::Status {
                    status: 500,
                    body: "boom".into(),
                }),
            )
            .reply("B", Err(AttemptError::InvalidJson("expected value".into())))
            .reply("C", Ok(json!([{"text": "from C"}])));
        let prober = EndpointProber::new(&transport, urls(&["A", "B", "C"]));

        let success = prober
            .probe(&PromptPayload::new("hello", vec![]))
            .await
            .unwrap();
        assert_eq!(success.endpoint, "C");
    }

    #[tokio::test]
    async fn test_all_failures_are_reported_in_order() {
        let transport = ScriptedTransport::default();
        let prober = EndpointProber::new(&transport, urls(&["A", "B", "C", "D"]));

        let err = prober
            .probe(&PromptPayload::new("hello", vec![]))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "All endpoints failed");
        match err {
            ChatError::AllEndpointsUnreachable { attempts } => {
                let endpoints: Vec<_> = attempts.iter().map(|a| a.endpoint.as_str()).collect();
                assert_eq!(endpoints, vec!["A", "B", "C", "D"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_endpoints_fails() {
        let transport = ScriptedTransport::default();
        let prober = EndpointProber::new(&transport, Vec::new());
        let result = prober.probe(&PromptPayload::new("hello", vec![])).await;
        assert!(matches!(
            result,
            Err(ChatError::AllEndpointsUnreachable { attempts }) if attempts.is_empty()
        ));
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn test_payload_shape() {
        let payload = PromptPayload::new("What is CPI?", vec!["cpi".into()]);
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"prompt": "What is CPI?", "keywords": ["cpi"]})
        );
    }
}
