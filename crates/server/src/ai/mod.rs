// AI edit service: prompt construction and the two operations the HTTP
// handlers consume.
//
// `transform` issues the primary edit call and then a sequential rationale
// sub-call; the rationale is decorative, so any failure there degrades to a
// fixed placeholder while the primary transform stays the operation of
// record. `converse` is one-shot: only the latest user message is sent, with
// no history replay. That bounds upstream cost per turn; the assistant's
// only memory is the transcript the human can already see.

pub mod mistral;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use coauthor_common::types::{EditAction, EditOutcome};
use thiserror::Error;
use tracing::{debug, warn};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// System prompt for the primary edit call.
pub const EDIT_SYSTEM_PROMPT: &str = "You are a professional text editor. Provide only the edited text as your response, without additional commentary unless specifically requested. Focus on making clear, concise improvements.";

/// System prompt for the rationale sub-call.
pub const RATIONALE_SYSTEM_PROMPT: &str =
    "Briefly explain in 1-2 sentences why you made the specific changes to improve the text.";

/// System prompt for chat conversations.
pub const CHAT_SYSTEM_PROMPT: &str = "You are a helpful writing assistant. You can help users improve their writing, answer questions about content, and suggest edits. When users ask for specific edits, provide clear suggestions that can be applied to their text.";

/// Substituted when the primary call parses but carries no suggestion.
pub const EMPTY_SUGGESTION_PLACEHOLDER: &str = "Could not generate suggestion.";

/// Substituted when the rationale sub-call fails in any way.
pub const DEFAULT_RATIONALE: &str = "AI processing completed.";

/// Substituted when a chat completion parses but carries no content.
pub const CHAT_FALLBACK: &str = "I apologize, but I couldn't generate a response at the moment.";

/// Instruction used for `custom` when the caller sent none.
const DEFAULT_CUSTOM_INSTRUCTION: &str = "Improve this text";

/// Failures from the upstream model.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AiError {
    /// No credential configured. Checked before any request is built.
    #[error("Mistral API key not configured")]
    MissingCredential,
    /// Upstream returned a non-success status.
    #[error("upstream AI service returned status {status}")]
    Upstream { status: u16 },
    /// Upstream returned success but the body could not be parsed.
    #[error("upstream AI service returned a malformed response")]
    Malformed,
    /// The request never reached the upstream.
    #[error("upstream AI service unreachable: {0}")]
    Transport(String),
}

/// One chat-completion request to the upstream model.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletionRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Trait for calling the upstream model.
///
/// Returns the first choice's message content; an empty string when the body
/// parsed but carried no content (placeholder substitution happens per call
/// site). Production uses [`mistral::MistralClient`]; tests inject mocks.
pub trait AiClient: Send + Sync {
    fn complete(&self, request: ChatCompletionRequest) -> BoxFuture<'_, Result<String, AiError>>;
}

/// Build the primary edit prompt from the fixed per-action templates.
pub fn build_edit_prompt(text: &str, action: EditAction, custom_prompt: Option<&str>) -> String {
    match action {
        EditAction::Shorten => {
            format!("Make this text more concise while preserving the key meaning: \"{text}\"")
        }
        EditAction::Expand => {
            format!("Expand this text with more detail and context: \"{text}\"")
        }
        EditAction::Grammar => {
            format!("Fix any grammar, spelling, or style issues in this text: \"{text}\"")
        }
        EditAction::Tabulate => {
            format!("Convert this text into a properly formatted table structure: \"{text}\"")
        }
        EditAction::Custom => {
            let instruction = custom_prompt
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .unwrap_or(DEFAULT_CUSTOM_INSTRUCTION);
            format!("{instruction}: \"{text}\"")
        }
    }
}

fn build_rationale_prompt(original: &str, suggested: &str) -> String {
    format!("Original: \"{original}\"\nEdited: \"{suggested}\"\nWhat changes did you make and why?")
}

/// The AI edit service of record.
///
/// Constructed with `None` when no credential is configured: the server still
/// boots and the AI operations fail fast with `MissingCredential`, making
/// zero upstream calls.
#[derive(Clone)]
pub struct EditEngine {
    client: Option<Arc<dyn AiClient>>,
}

impl EditEngine {
    pub fn new(client: Option<Arc<dyn AiClient>>) -> Self {
        Self { client }
    }

    pub fn disabled() -> Self {
        Self { client: None }
    }

    fn client(&self) -> Result<&Arc<dyn AiClient>, AiError> {
        self.client.as_ref().ok_or(AiError::MissingCredential)
    }

    /// Transform `text` per `action`, then ask for a rationale.
    ///
    /// The rationale sub-call is issued only after the primary resolves (its
    /// prompt needs the primary's output) and degrades to a placeholder on
    /// any failure.
    pub async fn transform(
        &self,
        text: &str,
        action: EditAction,
        custom_prompt: Option<&str>,
    ) -> Result<EditOutcome, AiError> {
        let client = self.client()?;

        let prompt = build_edit_prompt(text, action, custom_prompt);
        let content = client
            .complete(ChatCompletionRequest {
                system: EDIT_SYSTEM_PROMPT.to_string(),
                user: prompt,
                max_tokens: 1000,
                temperature: 0.3,
            })
            .await?;
        let suggested_text = if content.is_empty() {
            EMPTY_SUGGESTION_PLACEHOLDER.to_string()
        } else {
            content
        };

        let rationale = match client
            .complete(ChatCompletionRequest {
                system: RATIONALE_SYSTEM_PROMPT.to_string(),
                user: build_rationale_prompt(text, &suggested_text),
                max_tokens: 200,
                temperature: 0.3,
            })
            .await
        {
            Ok(content) if !content.is_empty() => content,
            Ok(_) => DEFAULT_RATIONALE.to_string(),
            Err(error) => {
                warn!(%error, "rationale sub-call failed, using placeholder");
                DEFAULT_RATIONALE.to_string()
            }
        };

        debug!(action = action.as_str(), "transform completed");
        Ok(EditOutcome { suggested_text, rationale })
    }

    /// One-shot chat reply to the latest user message.
    pub async fn converse(&self, user_text: &str) -> Result<String, AiError> {
        let client = self.client()?;

        let content = client
            .complete(ChatCompletionRequest {
                system: CHAT_SYSTEM_PROMPT.to_string(),
                user: user_text.to_string(),
                max_tokens: 500,
                temperature: 0.7,
            })
            .await?;

        if content.is_empty() {
            Ok(CHAT_FALLBACK.to_string())
        } else {
            Ok(content)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// Scripted client: pops responses in order, captures every request.
    struct ScriptedClient {
        responses: Mutex<Vec<Result<String, AiError>>>,
        requests: Mutex<Vec<ChatCompletionRequest>>,
        calls: AtomicU64,
    }

    impl ScriptedClient {
        fn new(responses: Vec<Result<String, AiError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
                calls: AtomicU64::new(0),
            }
        }

        fn call_count(&self) -> u64 {
            self.calls.load(Ordering::SeqCst)
        }

        fn requests(&self) -> Vec<ChatCompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl AiClient for ScriptedClient {
        fn complete(
            &self,
            request: ChatCompletionRequest,
        ) -> BoxFuture<'_, Result<String, AiError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request);
            let mut responses = self.responses.lock().unwrap();
            let result = if responses.is_empty() {
                Err(AiError::Transport("script exhausted".to_string()))
            } else {
                responses.remove(0)
            };
            Box::pin(async move { result })
        }
    }

    fn engine_with(client: ScriptedClient) -> (EditEngine, Arc<ScriptedClient>) {
        let client = Arc::new(client);
        (EditEngine::new(Some(Arc::clone(&client) as Arc<dyn AiClient>)), client)
    }

    // ── Prompt templates ───────────────────────────────────────────

    #[test]
    fn prompts_match_fixed_templates() {
        assert_eq!(
            build_edit_prompt("hi there", EditAction::Shorten, None),
            "Make this text more concise while preserving the key meaning: \"hi there\""
        );
        assert_eq!(
            build_edit_prompt("hi", EditAction::Expand, None),
            "Expand this text with more detail and context: \"hi\""
        );
        assert_eq!(
            build_edit_prompt("hi", EditAction::Grammar, None),
            "Fix any grammar, spelling, or style issues in this text: \"hi\""
        );
        assert_eq!(
            build_edit_prompt("a, b, c", EditAction::Tabulate, None),
            "Convert this text into a properly formatted table structure: \"a, b, c\""
        );
    }

    #[test]
    fn custom_prompt_substituted_verbatim() {
        assert_eq!(
            build_edit_prompt("text", EditAction::Custom, Some("Make it rhyme")),
            "Make it rhyme: \"text\""
        );
    }

    #[test]
    fn custom_prompt_defaults_when_absent_or_blank() {
        assert_eq!(
            build_edit_prompt("text", EditAction::Custom, None),
            "Improve this text: \"text\""
        );
        assert_eq!(
            build_edit_prompt("text", EditAction::Custom, Some("  ")),
            "Improve this text: \"text\""
        );
    }

    // ── transform ──────────────────────────────────────────────────

    #[tokio::test]
    async fn transform_issues_primary_then_rationale() {
        let (engine, client) = engine_with(ScriptedClient::new(vec![
            Ok("Shorter.".to_string()),
            Ok("Cut filler words.".to_string()),
        ]));

        let outcome = engine.transform("A longer sentence.", EditAction::Shorten, None).await.unwrap();

        assert_eq!(outcome.suggested_text, "Shorter.");
        assert_eq!(outcome.rationale, "Cut filler words.");

        let requests = client.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].system, EDIT_SYSTEM_PROMPT);
        assert_eq!(requests[0].max_tokens, 1000);
        assert_eq!(requests[1].system, RATIONALE_SYSTEM_PROMPT);
        assert_eq!(requests[1].max_tokens, 200);
        // The rationale prompt embeds the primary's output.
        assert!(requests[1].user.contains("Edited: \"Shorter.\""));
        assert!(requests[1].user.contains("Original: \"A longer sentence.\""));
    }

    #[tokio::test]
    async fn rationale_failure_degrades_to_placeholder() {
        let (engine, _client) = engine_with(ScriptedClient::new(vec![
            Ok("Edited text.".to_string()),
            Err(AiError::Upstream { status: 429 }),
        ]));

        let outcome = engine.transform("text", EditAction::Grammar, None).await.unwrap();

        assert_eq!(outcome.suggested_text, "Edited text.");
        assert_eq!(outcome.rationale, DEFAULT_RATIONALE);
    }

    #[tokio::test]
    async fn empty_rationale_degrades_to_placeholder() {
        let (engine, _client) = engine_with(ScriptedClient::new(vec![
            Ok("Edited.".to_string()),
            Ok(String::new()),
        ]));

        let outcome = engine.transform("text", EditAction::Grammar, None).await.unwrap();
        assert_eq!(outcome.rationale, DEFAULT_RATIONALE);
    }

    #[tokio::test]
    async fn empty_primary_content_gets_suggestion_placeholder() {
        let (engine, _client) = engine_with(ScriptedClient::new(vec![
            Ok(String::new()),
            Ok("explanation".to_string()),
        ]));

        let outcome = engine.transform("text", EditAction::Expand, None).await.unwrap();
        assert_eq!(outcome.suggested_text, EMPTY_SUGGESTION_PLACEHOLDER);
    }

    #[tokio::test]
    async fn primary_failure_fails_the_operation_without_rationale_call() {
        let (engine, client) = engine_with(ScriptedClient::new(vec![Err(AiError::Upstream {
            status: 503,
        })]));

        let err = engine.transform("text", EditAction::Shorten, None).await.unwrap_err();

        assert_eq!(err, AiError::Upstream { status: 503 });
        // Sequential dependency: no rationale call after a failed primary.
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn missing_credential_fails_with_zero_calls() {
        let engine = EditEngine::disabled();

        let err = engine.transform("text", EditAction::Grammar, None).await.unwrap_err();
        assert_eq!(err, AiError::MissingCredential);

        let err = engine.converse("hello").await.unwrap_err();
        assert_eq!(err, AiError::MissingCredential);
    }

    // ── converse ───────────────────────────────────────────────────

    #[tokio::test]
    async fn converse_sends_only_the_latest_message() {
        let (engine, client) =
            engine_with(ScriptedClient::new(vec![Ok("Sure, here's a thought.".to_string())]));

        let reply = engine.converse("What should the intro say?").await.unwrap();

        assert_eq!(reply, "Sure, here's a thought.");
        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system, CHAT_SYSTEM_PROMPT);
        assert_eq!(requests[0].user, "What should the intro say?");
        assert_eq!(requests[0].max_tokens, 500);
    }

    #[tokio::test]
    async fn converse_empty_content_falls_back() {
        let (engine, _client) = engine_with(ScriptedClient::new(vec![Ok(String::new())]));
        assert_eq!(engine.converse("hi").await.unwrap(), CHAT_FALLBACK);
    }

    #[tokio::test]
    async fn converse_upstream_failure_propagates() {
        let (engine, _client) =
            engine_with(ScriptedClient::new(vec![Err(AiError::Malformed)]));
        assert_eq!(engine.converse("hi").await.unwrap_err(), AiError::Malformed);
    }
}
