// Core domain types shared across all Coauthor crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A stored document: structured content tree plus display metadata.
///
/// `content` is an arbitrary editor-defined tree (JSON). Nothing in this
/// workspace inspects it; it is carried through intact between the document
/// surface and the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: Value,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Author of a chat message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }
}

/// Structured annotation attached to a message that originated from an edit
/// action. Back-filled after creation; otherwise messages are immutable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct MessageMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_type: Option<EditAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// A persisted chat message, scoped to a document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub document_id: Option<String>,
    pub content: String,
    pub role: MessageRole,
    pub timestamp: DateTime<Utc>,
    pub metadata: Option<MessageMetadata>,
}

impl ChatMessage {
    /// Build a new message with a fresh id and the current timestamp.
    pub fn new(
        document_id: Option<String>,
        content: String,
        role: MessageRole,
        metadata: Option<MessageMetadata>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            document_id,
            content,
            role,
            timestamp: Utc::now(),
            metadata,
        }
    }
}

/// The closed set of AI edit actions a user can trigger on a selection.
///
/// `Custom` carries its free-text instruction separately (see the dispatcher
/// and the `customPrompt` wire field); all other actions carry none.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EditAction {
    Shorten,
    Expand,
    Grammar,
    /// Convert prose into a table. Wire string is `table`.
    #[serde(rename = "table")]
    Tabulate,
    Custom,
}

impl EditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shorten => "shorten",
            Self::Expand => "expand",
            Self::Grammar => "grammar",
            Self::Tabulate => "table",
            Self::Custom => "custom",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "shorten" => Some(Self::Shorten),
            "expand" => Some(Self::Expand),
            "grammar" => Some(Self::Grammar),
            "table" => Some(Self::Tabulate),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    /// Every action, in display order. The built-in (non-custom) actions
    /// come first.
    pub fn all() -> [EditAction; 5] {
        [Self::Shorten, Self::Expand, Self::Grammar, Self::Tabulate, Self::Custom]
    }
}

/// Result of one completed transform: the suggested replacement text plus a
/// short explanation of the change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    pub suggested_text: String,
    pub rationale: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── EditAction wire strings ─────────────────────────────────────

    #[test]
    fn edit_action_round_trips_through_wire_strings() {
        for action in EditAction::all() {
            let encoded = serde_json::to_string(&action).unwrap();
            let expected = format!("\"{}\"", action.as_str());
            assert_eq!(encoded, expected);

            let decoded: EditAction = serde_json::from_str(&encoded).unwrap();
            assert_eq!(decoded, action);
        }
    }

    #[test]
    fn tabulate_uses_table_on_the_wire() {
        assert_eq!(EditAction::Tabulate.as_str(), "table");
        assert_eq!(serde_json::to_string(&EditAction::Tabulate).unwrap(), "\"table\"");
        assert_eq!(EditAction::parse("table"), Some(EditAction::Tabulate));
        assert_eq!(EditAction::parse("tabulate"), None);
    }

    #[test]
    fn edit_action_parse_rejects_unknown() {
        assert_eq!(EditAction::parse("summarize"), None);
        assert_eq!(EditAction::parse(""), None);
    }

    // ── MessageRole ─────────────────────────────────────────────────

    #[test]
    fn message_role_as_str_parse_round_trip() {
        for role in [MessageRole::User, MessageRole::Assistant] {
            assert_eq!(MessageRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(MessageRole::parse("system"), None);
    }

    // ── Serialization shapes ────────────────────────────────────────

    #[test]
    fn document_serializes_camel_case() {
        let doc = Document {
            id: "doc-1".into(),
            title: "Title".into(),
            content: serde_json::json!({"type": "doc"}),
            user_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&doc).unwrap();
        assert!(value.get("userId").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert!(value.get("user_id").is_none());
    }

    #[test]
    fn chat_message_serializes_null_metadata_explicitly() {
        let msg = ChatMessage::new(Some("doc-1".into()), "hi".into(), MessageRole::User, None);
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value.get("metadata"), Some(&Value::Null));
        assert_eq!(value.get("documentId").and_then(Value::as_str), Some("doc-1"));
        assert_eq!(value.get("role").and_then(Value::as_str), Some("user"));
    }

    #[test]
    fn message_metadata_omits_absent_fields() {
        let meta = MessageMetadata {
            edit_type: Some(EditAction::Shorten),
            original_text: Some("long text".into()),
            suggested_text: None,
            reasoning: None,
        };
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value.get("editType").and_then(Value::as_str), Some("shorten"));
        assert!(value.get("suggestedText").is_none());
        assert!(value.get("reasoning").is_none());
    }

    #[test]
    fn chat_message_new_assigns_unique_ids() {
        let a = ChatMessage::new(None, "one".into(), MessageRole::User, None);
        let b = ChatMessage::new(None, "two".into(), MessageRole::User, None);
        assert_ne!(a.id, b.id);
        assert!(!a.id.is_empty());
    }
}
