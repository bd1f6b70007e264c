// HTTP request/response DTOs for the Coauthor REST API.
//
// Wire format is camelCase JSON. Shared between the server handlers and the
// editor-side backend client so the two cannot drift.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{ChatMessage, EditAction, MessageMetadata, MessageRole};

/// Body of `PUT /documents/{id}`. Both fields are optional; a successful
/// update always refreshes the document's `updatedAt`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Body of `POST /chat`. `role` must be `user`; the assistant half of the
/// exchange is generated server-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatSendRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    pub content: String,
    pub role: MessageRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
}

/// Response of `POST /chat`: the persisted user message and the persisted
/// assistant reply, returned together as one unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatSendResponse {
    pub user_message: ChatMessage,
    pub ai_message: ChatMessage,
}

/// Body of `POST /ai-edit`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AiEditRequest {
    pub text: String,
    pub action: EditAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_prompt: Option<String>,
}

/// Response of `POST /ai-edit`. `original_text` echoes the request text
/// byte-for-byte; callers use it as an integrity check against a selection
/// that changed while the request was in flight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AiEditResponse {
    pub original_text: String,
    pub suggested_text: String,
    pub reasoning: String,
    pub action: EditAction,
}

/// Body of `POST /search`. `max_results` defaults to 5 server-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<usize>,
}

/// One search hit from the instant-answer upstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Response of `POST /search`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResult>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
}
