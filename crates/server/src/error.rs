// Uniform error envelope for the HTTP boundary.
//
// Every failure a handler can surface maps to a registry code with a fixed
// HTTP status and a default message. Responses carry
// `{"error": {"code", "message", "retryable", "request_id"}}` and never leak
// stack traces or raw upstream bodies.

use std::future::Future;

use axum::{
    http::{header::HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use coauthor_common::error::EditError;
use serde_json::json;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

tokio::task_local! {
    static REQUEST_ID: String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidInput,
    NotFound,
    UpstreamUnavailable,
    UpstreamMalformed,
    PayloadTooLarge,
    Internal,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "INVALID_INPUT",
            Self::NotFound => "NOT_FOUND",
            Self::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            Self::UpstreamMalformed => "UPSTREAM_MALFORMED",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::Internal => "INTERNAL",
        }
    }

    pub const fn status(self) -> StatusCode {
        match self {
            Self::InvalidInput => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            // Upstream failures surface as 500s, not 502s; callers treat
            // them uniformly as retryable server errors.
            Self::UpstreamUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UpstreamMalformed => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn retryable(self) -> bool {
        matches!(self, Self::UpstreamUnavailable | Self::Internal)
    }

    pub const fn default_message(self) -> &'static str {
        match self {
            Self::InvalidInput => "request validation failed",
            Self::NotFound => "requested resource not found",
            Self::UpstreamUnavailable => "upstream service is unavailable",
            Self::UpstreamMalformed => "upstream service returned a malformed response",
            Self::PayloadTooLarge => "payload exceeds maximum allowed size",
            Self::Internal => "internal server error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    request_id: Option<String>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), request_id: None }
    }

    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }
}

impl From<EditError> for ApiError {
    fn from(error: EditError) -> Self {
        let code = match &error {
            EditError::InvalidInput(_) => ErrorCode::InvalidInput,
            EditError::UpstreamUnavailable { .. } => ErrorCode::UpstreamUnavailable,
            EditError::UpstreamMalformed => ErrorCode::UpstreamMalformed,
            // Stale anchors never reach the HTTP boundary; map defensively.
            EditError::StaleAnchor => ErrorCode::Internal,
            EditError::NotFound => ErrorCode::NotFound,
        };
        Self::new(code, error.to_string())
    }
}

impl From<crate::ai::AiError> for ApiError {
    fn from(error: crate::ai::AiError) -> Self {
        use crate::ai::AiError;
        let code = match &error {
            // A missing credential is a deployment problem, not the
            // caller's. 500, retryable once the key is configured.
            AiError::MissingCredential => ErrorCode::UpstreamUnavailable,
            AiError::Upstream { .. } | AiError::Transport(_) => ErrorCode::UpstreamUnavailable,
            AiError::Malformed => ErrorCode::UpstreamMalformed,
        };
        Self::new(code, error.to_string())
    }
}

impl From<crate::chat::ChatError> for ApiError {
    fn from(error: crate::chat::ChatError) -> Self {
        use crate::chat::ChatError;
        match error {
            ChatError::EmptyContent => Self::new(ErrorCode::InvalidInput, error.to_string()),
            ChatError::Ai(inner) => inner.into(),
        }
    }
}

impl From<crate::search::SearchError> for ApiError {
    fn from(error: crate::search::SearchError) -> Self {
        use crate::search::SearchError;
        let code = match &error {
            SearchError::Upstream { .. } | SearchError::Transport(_) => {
                ErrorCode::UpstreamUnavailable
            }
            SearchError::Malformed => ErrorCode::UpstreamMalformed,
        };
        Self::new(code, error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = self.request_id.or_else(current_request_id);

        let mut response = (
            self.code.status(),
            Json(json!({
                "error": {
                    "code": self.code.as_str(),
                    "message": self.message,
                    "retryable": self.code.retryable(),
                    "request_id": request_id.clone(),
                }
            })),
        )
            .into_response();

        if let Some(request_id) = request_id {
            attach_request_id_header(&mut response, &request_id);
        }

        response
    }
}

pub async fn with_request_id_scope<F>(request_id: String, future: F) -> F::Output
where
    F: Future,
{
    REQUEST_ID.scope(request_id, future).await
}

pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(Clone::clone).ok()
}

pub fn request_id_from_headers_or_generate(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

pub fn attach_request_id_header(response: &mut Response, request_id: &str) {
    if let Ok(header) = HeaderValue::from_str(request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, header);
    }
}
