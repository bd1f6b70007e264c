// In-memory document and chat-message store.
//
// Documents are mutated last-writer-wins: concurrent writers (two tabs on
// the same document) are not serialized or merged, and nothing survives a
// restart. Both are accepted limitations, not gaps. Messages are append-only
// except for metadata back-fill.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use coauthor_common::types::{ChatMessage, Document, MessageMetadata};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Id of the document seeded at construction.
pub const DEFAULT_DOCUMENT_ID: &str = "default-doc-id";

/// Shared in-memory store. Cheap to clone; all clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<StoreInner>>,
}

#[derive(Debug, Default)]
struct StoreInner {
    documents: HashMap<String, Document>,
    messages: Vec<ChatMessage>,
}

impl MemoryStore {
    /// Create a store seeded with the default welcome document.
    pub fn new() -> Self {
        let now = Utc::now();
        let mut inner = StoreInner::default();
        inner.documents.insert(
            DEFAULT_DOCUMENT_ID.to_string(),
            Document {
                id: DEFAULT_DOCUMENT_ID.to_string(),
                title: "Welcome Document".to_string(),
                content: welcome_content(),
                user_id: None,
                created_at: now,
                updated_at: now,
            },
        );
        Self { inner: Arc::new(RwLock::new(inner)) }
    }

    /// Create a new document.
    pub async fn create_document(
        &self,
        title: Option<String>,
        content: Option<Value>,
        user_id: Option<String>,
    ) -> Document {
        let now = Utc::now();
        let document = Document {
            id: Uuid::new_v4().to_string(),
            title: title.unwrap_or_else(|| "Untitled Document".to_string()),
            content: content.unwrap_or_else(|| json!({})),
            user_id,
            created_at: now,
            updated_at: now,
        };
        let mut inner = self.inner.write().await;
        inner.documents.insert(document.id.clone(), document.clone());
        document
    }

    pub async fn get_document(&self, id: &str) -> Option<Document> {
        self.inner.read().await.documents.get(id).cloned()
    }

    /// Partial update: absent fields keep their value. Every successful
    /// update refreshes `updated_at` (last-writer-wins discipline). Returns
    /// `None` for unknown ids and never creates a document.
    pub async fn update_document(
        &self,
        id: &str,
        content: Option<Value>,
        title: Option<String>,
    ) -> Option<Document> {
        let mut inner = self.inner.write().await;
        let document = inner.documents.get_mut(id)?;
        if let Some(content) = content {
            document.content = content;
        }
        if let Some(title) = title {
            document.title = title;
        }
        document.updated_at = Utc::now();
        Some(document.clone())
    }

    pub async fn document_count(&self) -> usize {
        self.inner.read().await.documents.len()
    }

    /// Append a message. The caller builds it (id and timestamp included) so
    /// tests can pin timestamps.
    pub async fn create_message(&self, message: ChatMessage) -> ChatMessage {
        let mut inner = self.inner.write().await;
        inner.messages.push(message.clone());
        message
    }

    /// Back-fill metadata on an existing message. The only permitted
    /// post-creation mutation.
    pub async fn update_message_metadata(
        &self,
        id: &str,
        metadata: MessageMetadata,
    ) -> Option<ChatMessage> {
        let mut inner = self.inner.write().await;
        let message = inner.messages.iter_mut().find(|m| m.id == id)?;
        message.metadata = Some(metadata);
        Some(message.clone())
    }

    /// Messages for a document, ascending by timestamp. Stable for equal
    /// timestamps (insertion order).
    pub async fn list_messages(&self, document_id: &str) -> Vec<ChatMessage> {
        let inner = self.inner.read().await;
        let mut messages: Vec<ChatMessage> = inner
            .messages
            .iter()
            .filter(|m| m.document_id.as_deref() == Some(document_id))
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.timestamp);
        messages
    }
}

/// Seed content tree for the welcome document.
fn welcome_content() -> Value {
    json!({
        "type": "doc",
        "content": [
            {
                "type": "heading",
                "attrs": { "level": 1 },
                "content": [{ "type": "text", "text": "Welcome to AI Collaborative Editor" }]
            },
            {
                "type": "paragraph",
                "content": [
                    {
                        "type": "text",
                        "text": "This is your intelligent writing companion. Start typing, select text to see AI-powered editing options, or chat with the AI assistant in the sidebar to get help with your content."
                    }
                ]
            }
        ]
    })
}
