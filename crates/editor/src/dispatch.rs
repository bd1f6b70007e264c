// Edit request dispatch.
//
// Validates a selection-driven edit request locally, then sends exactly one
// transform call through the injected `EditService`. Validation failures
// never reach the service. The dispatcher holds no "current" state: concurrent
// submits are independent and the preview controller decides which resolved
// proposal is authoritative.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use coauthor_common::error::EditError;
use coauthor_common::types::{EditAction, EditOutcome};
use tracing::{debug, warn};

use crate::surface::AnchorRange;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait for the AI edit service the dispatcher submits through.
///
/// In production this is the HTTP backend adapter; tests inject a mock that
/// returns canned outcomes and counts calls.
pub trait EditService: Send + Sync {
    fn transform(
        &self,
        text: &str,
        action: EditAction,
        instruction: Option<&str>,
    ) -> BoxFuture<'_, Result<EditOutcome, EditError>>;
}

/// One completed transform, carried to the preview controller.
///
/// `original_text` echoes the submitted selection byte-for-byte; the preview
/// layer uses it as an integrity check against a selection that changed while
/// the request was in flight. `captured_anchor` is the selection anchor at
/// submission time, carried forward for apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditProposal {
    pub submission_id: u64,
    pub original_text: String,
    pub suggested_text: String,
    pub rationale: String,
    pub action: EditAction,
    pub captured_anchor: AnchorRange,
}

/// Dispatches edit requests through an injected service.
pub struct EditDispatcher {
    service: Arc<dyn EditService>,
    next_submission: AtomicU64,
}

impl EditDispatcher {
    pub fn new(service: Arc<dyn EditService>) -> Self {
        Self { service, next_submission: AtomicU64::new(1) }
    }

    /// Submit selected text for transformation.
    ///
    /// Preconditions checked before any service call:
    /// - `selected_text` must be non-empty after trimming
    /// - `Custom` requires a non-empty `instruction`
    ///
    /// Exactly one service call per submit; no retry.
    pub async fn submit(
        &self,
        selected_text: &str,
        action: EditAction,
        instruction: Option<&str>,
        captured_anchor: AnchorRange,
    ) -> Result<EditProposal, EditError> {
        validate_request(selected_text, action, instruction)?;

        let submission_id = self.next_submission.fetch_add(1, Ordering::Relaxed);
        debug!(submission_id, action = action.as_str(), "submitting edit request");

        let outcome = match self.service.transform(selected_text, action, instruction).await {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(submission_id, %error, "edit request failed");
                return Err(error);
            }
        };

        Ok(EditProposal {
            submission_id,
            original_text: selected_text.to_string(),
            suggested_text: outcome.suggested_text,
            rationale: outcome.rationale,
            action,
            captured_anchor,
        })
    }
}

/// Local precondition checks. Failure here means zero service calls.
fn validate_request(
    selected_text: &str,
    action: EditAction,
    instruction: Option<&str>,
) -> Result<(), EditError> {
    if selected_text.trim().is_empty() {
        return Err(EditError::invalid_input("selected text is empty"));
    }
    if action == EditAction::Custom && instruction.map_or(true, |i| i.trim().is_empty()) {
        return Err(EditError::invalid_input("custom action requires an instruction"));
    }
    Ok(())
}
