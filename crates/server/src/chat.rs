// Chat session: persist-then-reply against a document's transcript.
//
// The user message is persisted before the model is called, so a failed
// upstream turn still leaves the user's side of the conversation on record.

use coauthor_common::types::{ChatMessage, MessageMetadata, MessageRole};
use thiserror::Error;
use tracing::debug;

use crate::ai::{AiError, EditEngine};
use crate::store::MemoryStore;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message content is required")]
    EmptyContent,
    #[error(transparent)]
    Ai(#[from] AiError),
}

/// One message exchange: the persisted user message and the assistant reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatExchange {
    pub user_message: ChatMessage,
    pub ai_message: ChatMessage,
}

#[derive(Clone)]
pub struct ChatSession {
    store: MemoryStore,
    engine: EditEngine,
}

impl ChatSession {
    pub fn new(store: MemoryStore, engine: EditEngine) -> Self {
        Self { store, engine }
    }

    /// Persist `content` as a user message, obtain the assistant reply, and
    /// persist that too. Metadata rides on the user message only; assistant
    /// replies carry none.
    pub async fn send(
        &self,
        document_id: Option<String>,
        content: &str,
        metadata: Option<MessageMetadata>,
    ) -> Result<ChatExchange, ChatError> {
        if content.trim().is_empty() {
            return Err(ChatError::EmptyContent);
        }

        let user_message = self
            .store
            .create_message(ChatMessage::new(
                document_id.clone(),
                content.to_string(),
                MessageRole::User,
                metadata,
            ))
            .await;

        // A failure here leaves the user message persisted; the turn simply
        // has no reply.
        let reply = self.engine.converse(content).await?;

        let ai_message = self
            .store
            .create_message(ChatMessage::new(
                document_id,
                reply,
                MessageRole::Assistant,
                None,
            ))
            .await;

        debug!(user_id = %user_message.id, ai_id = %ai_message.id, "chat turn completed");
        Ok(ChatExchange { user_message, ai_message })
    }

    /// Transcript for one document, oldest first.
    pub async fn list(&self, document_id: &str) -> Vec<ChatMessage> {
        self.store.list_messages(document_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use coauthor_common::types::EditAction;

    use super::*;
    use crate::ai::{AiClient, BoxFuture, ChatCompletionRequest};

    struct FixedReply(Result<String, AiError>);

    impl AiClient for FixedReply {
        fn complete(&self, _: ChatCompletionRequest) -> BoxFuture<'_, Result<String, AiError>> {
            let result = self.0.clone();
            Box::pin(async move { result })
        }
    }

    fn session_with(reply: Result<String, AiError>) -> ChatSession {
        let engine = EditEngine::new(Some(Arc::new(FixedReply(reply)) as Arc<dyn AiClient>));
        ChatSession::new(MemoryStore::new(), engine)
    }

    // ── send ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn send_persists_both_sides_of_the_exchange() {
        let session = session_with(Ok("Here's a suggestion.".to_string()));

        let exchange =
            session.send(Some("doc-1".to_string()), "Help me rephrase this", None).await.unwrap();

        assert_eq!(exchange.user_message.role, MessageRole::User);
        assert_eq!(exchange.user_message.content, "Help me rephrase this");
        assert_eq!(exchange.ai_message.role, MessageRole::Assistant);
        assert_eq!(exchange.ai_message.content, "Here's a suggestion.");

        let transcript = session.list("doc-1").await;
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].id, exchange.user_message.id);
        assert_eq!(transcript[1].id, exchange.ai_message.id);
    }

    #[tokio::test]
    async fn send_rejects_blank_content_without_persisting() {
        let session = session_with(Ok("unused".to_string()));

        let err = session.send(Some("doc-1".to_string()), "   ", None).await.unwrap_err();
        assert!(matches!(err, ChatError::EmptyContent));
        assert!(session.list("doc-1").await.is_empty());
    }

    #[tokio::test]
    async fn upstream_failure_keeps_the_user_message() {
        let session = session_with(Err(AiError::Upstream { status: 500 }));

        let err = session.send(Some("doc-1".to_string()), "hello", None).await.unwrap_err();
        assert!(matches!(err, ChatError::Ai(AiError::Upstream { status: 500 })));

        let transcript = session.list("doc-1").await;
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].role, MessageRole::User);
    }

    #[tokio::test]
    async fn metadata_rides_on_the_user_message_only() {
        let session = session_with(Ok("ok".to_string()));
        let metadata = MessageMetadata {
            edit_type: Some(EditAction::Shorten),
            original_text: Some("long".to_string()),
            suggested_text: None,
            reasoning: None,
        };

        let exchange = session
            .send(Some("doc-1".to_string()), "Shorten this", Some(metadata.clone()))
            .await
            .unwrap();

        assert_eq!(exchange.user_message.metadata, Some(metadata));
        assert_eq!(exchange.ai_message.metadata, None);
    }

    #[tokio::test]
    async fn list_scopes_to_the_requested_document() {
        let session = session_with(Ok("reply".to_string()));
        session.send(Some("doc-a".to_string()), "first", None).await.unwrap();
        session.send(Some("doc-b".to_string()), "second", None).await.unwrap();

        assert_eq!(session.list("doc-a").await.len(), 2);
        assert_eq!(session.list("doc-b").await.len(), 2);
        assert!(session.list("doc-unknown").await.is_empty());
    }
}
