use super::{AttemptError, PromptPayload, Transport};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(
        &self,
        url: &str,
        payload: &PromptPayload,
    ) -> Result<Value, AttemptError> {
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|err| AttemptError::Network(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| AttemptError::Network(err.to_string()))?;

        if !status.is_success() {
            return Err(AttemptError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str::<Value>(&body)
            .map_err(|err| AttemptError::InvalidJson(err.to_string()))
    }
}
