// HTTP adapter onto the Coauthor server API.
//
// Implements `EditService` over `POST /ai-edit` and exposes document save and
// chat send for the apply/chat flows. HTTP failures are folded into the
// shared `EditError` taxonomy; response bodies that fail to decode are
// `UpstreamMalformed`.

use anyhow::Context;
use coauthor_common::error::EditError;
use coauthor_common::protocol::{
    AiEditRequest, ChatSendRequest, ChatSendResponse, UpdateDocumentRequest,
};
use coauthor_common::types::{Document, EditAction, EditOutcome, MessageRole};
use tracing::warn;
use url::Url;

use crate::dispatch::{BoxFuture, EditService};

/// Client for the Coauthor server.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base: Url,
}

impl HttpBackend {
    /// Build a backend against `base_url`. The URL is validated here so a
    /// misconfigured client fails at startup, not on first use.
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let base = Url::parse(base_url)
            .with_context(|| format!("invalid backend base URL: {base_url}"))?;
        let http = reqwest::Client::builder()
            .build()
            .context("failed to build backend HTTP client")?;
        Ok(Self { http, base })
    }

    fn endpoint(&self, path: &str) -> Result<Url, EditError> {
        self.base.join(path).map_err(|_| EditError::invalid_input("invalid endpoint path"))
    }

    async fn post_ai_edit(&self, request: AiEditRequest) -> Result<EditOutcome, EditError> {
        let response = self
            .http
            .post(self.endpoint("/ai-edit")?)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(error_for_status(status));
        }

        let body: coauthor_common::protocol::AiEditResponse =
            response.json().await.map_err(|_| EditError::UpstreamMalformed)?;
        Ok(EditOutcome { suggested_text: body.suggested_text, rationale: body.reasoning })
    }

    /// Persist the document content after an approved apply.
    /// A successful PUT refreshes the document's `updatedAt` server-side.
    pub async fn save_document(
        &self,
        document_id: &str,
        update: UpdateDocumentRequest,
    ) -> Result<Document, EditError> {
        let response = self
            .http
            .put(self.endpoint(&format!("/documents/{document_id}"))?)
            .json(&update)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(error_for_status(status));
        }

        response.json().await.map_err(|_| EditError::UpstreamMalformed)
    }

    /// Send a chat message; the server persists it, generates the assistant
    /// reply, and returns both messages together.
    pub async fn send_chat(
        &self,
        document_id: Option<String>,
        content: String,
    ) -> Result<ChatSendResponse, EditError> {
        let request = ChatSendRequest {
            document_id,
            content,
            role: MessageRole::User,
            metadata: None,
        };

        let response = self
            .http
            .post(self.endpoint("/chat")?)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(error_for_status(status));
        }

        response.json().await.map_err(|_| EditError::UpstreamMalformed)
    }
}

impl EditService for HttpBackend {
    fn transform(
        &self,
        text: &str,
        action: EditAction,
        instruction: Option<&str>,
    ) -> BoxFuture<'_, Result<EditOutcome, EditError>> {
        let request = AiEditRequest {
            text: text.to_string(),
            action,
            custom_prompt: instruction.map(ToOwned::to_owned),
        };
        Box::pin(async move { self.post_ai_edit(request).await })
    }
}

fn transport_error(error: reqwest::Error) -> EditError {
    warn!(%error, "backend request failed in transport");
    EditError::UpstreamUnavailable { status: None }
}

/// Map a non-success server status into the shared taxonomy.
fn error_for_status(status: u16) -> EditError {
    match status {
        400 => EditError::invalid_input("server rejected the request"),
        404 => EditError::NotFound,
        _ => EditError::UpstreamUnavailable { status: Some(status) },
    }
}
