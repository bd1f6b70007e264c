//! Mistral chat-completions client.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::{AiClient, AiError, BoxFuture, ChatCompletionRequest};

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
}

#[derive(Debug, Deserialize)]
struct WireResponseMessage {
    #[serde(default)]
    content: String,
}

/// Calls `POST {base}/v1/chat/completions` with bearer authentication.
pub struct MistralClient {
    http: Client,
    endpoint: Url,
    api_key: String,
    model: String,
}

impl MistralClient {
    pub fn new(base_url: Url, api_key: String, model: String) -> anyhow::Result<Self> {
        let endpoint = base_url.join("v1/chat/completions")?;
        Ok(Self { http: Client::new(), endpoint, api_key, model })
    }

    async fn complete_inner(&self, request: ChatCompletionRequest) -> Result<String, AiError> {
        let body = WireRequest {
            model: self.model.clone(),
            messages: vec![
                WireMessage { role: "system", content: request.system },
                WireMessage { role: "user", content: request.user },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "mistral returned non-success");
            return Err(AiError::Upstream { status: status.as_u16() });
        }

        let parsed: WireResponse = response.json().await.map_err(|_| AiError::Malformed)?;
        // A parsed body with no choices yields an empty string; the caller
        // decides which placeholder applies.
        Ok(parsed.choices.into_iter().next().map(|c| c.message.content).unwrap_or_default())
    }
}

impl AiClient for MistralClient {
    fn complete(&self, request: ChatCompletionRequest) -> BoxFuture<'_, Result<String, AiError>> {
        Box::pin(self.complete_inner(request))
    }
}
