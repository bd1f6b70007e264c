// Chat handlers.

use axum::extract::{Path, State};
use axum::Json;

use coauthor_common::protocol::{ChatSendRequest, ChatSendResponse};
use coauthor_common::types::{ChatMessage, MessageRole};

use crate::error::{ApiError, ErrorCode};
use crate::validation::ValidatedJson;

use super::ApiState;

pub async fn send_message(
    State(state): State<ApiState>,
    ValidatedJson(body): ValidatedJson<ChatSendRequest>,
) -> Result<Json<ChatSendResponse>, ApiError> {
    if body.role != MessageRole::User {
        return Err(ApiError::new(
            ErrorCode::InvalidInput,
            "chat messages must be sent with role \"user\"",
        ));
    }

    let exchange = state.chat.send(body.document_id, &body.content, body.metadata).await?;
    Ok(Json(ChatSendResponse {
        user_message: exchange.user_message,
        ai_message: exchange.ai_message,
    }))
}

/// Transcript for one document, oldest first. Unknown ids yield an empty
/// list rather than 404; a transcript that does not exist yet is just empty.
pub async fn list_messages(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Json<Vec<ChatMessage>> {
    Json(state.chat.list(&id).await)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::ai::{AiClient, AiError, BoxFuture, ChatCompletionRequest};
    use crate::api::test_support::router_with_ai;

    struct FixedReply(&'static str);

    impl AiClient for FixedReply {
        fn complete(&self, _: ChatCompletionRequest) -> BoxFuture<'_, Result<String, AiError>> {
            let reply = self.0.to_string();
            Box::pin(async move { Ok(reply) })
        }
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_chat(body: Value) -> Request<Body> {
        Request::post("/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    // ── POST /chat ─────────────────────────────────────────────────

    #[tokio::test]
    async fn chat_returns_both_messages_and_persists_them() {
        let router = router_with_ai(Some(Arc::new(FixedReply("Happy to help."))));

        let response = router
            .clone()
            .oneshot(post_chat(json!({
                "documentId": "doc-1",
                "content": "Can you improve my intro?",
                "role": "user",
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["userMessage"]["content"], "Can you improve my intro?");
        assert_eq!(body["userMessage"]["role"], "user");
        assert_eq!(body["aiMessage"]["content"], "Happy to help.");
        assert_eq!(body["aiMessage"]["role"], "assistant");

        let transcript = body_json(
            router
                .oneshot(Request::get("/documents/doc-1/messages").body(Body::empty()).unwrap())
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(transcript.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn chat_rejects_non_user_role() {
        let response = router_with_ai(Some(Arc::new(FixedReply("unused"))))
            .oneshot(post_chat(json!({"content": "hi", "role": "assistant"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn chat_rejects_blank_content() {
        let response = router_with_ai(Some(Arc::new(FixedReply("unused"))))
            .oneshot(post_chat(json!({"content": "  ", "role": "user"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn chat_without_credential_persists_user_message_then_fails() {
        let router = router_with_ai(None);

        let response = router
            .clone()
            .oneshot(post_chat(json!({"documentId": "doc-1", "content": "hi", "role": "user"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "Mistral API key not configured");

        let transcript = body_json(
            router
                .oneshot(Request::get("/documents/doc-1/messages").body(Body::empty()).unwrap())
                .await
                .unwrap(),
        )
        .await;
        let messages = transcript.as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
    }

    // ── GET /documents/{id}/messages ───────────────────────────────

    #[tokio::test]
    async fn messages_for_unknown_document_is_empty_list() {
        let response = router_with_ai(None)
            .oneshot(Request::get("/documents/ghost/messages").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]));
    }
}
