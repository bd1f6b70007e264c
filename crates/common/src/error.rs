// Shared failure taxonomy for the edit pipeline and its HTTP boundary.

use thiserror::Error;

/// Every failure a caller of the edit pipeline can observe.
///
/// Validation failures (`InvalidInput`) are always raised before any network
/// or store activity. Upstream failures are terminal for the call that hit
/// them; nothing in this workspace retries automatically.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    /// Empty selection, empty custom instruction, or a malformed request
    /// body. Recovered locally; no network call is made.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Missing upstream credential or a non-success upstream status.
    #[error("upstream service unavailable{}", format_status(.status))]
    UpstreamUnavailable { status: Option<u16> },

    /// Upstream returned success but the payload could not be parsed.
    #[error("upstream returned a malformed response")]
    UpstreamMalformed,

    /// The captured selection anchor no longer matches the document.
    /// Apply is best-effort; this is reported, never raised as a panic.
    #[error("selection anchor is no longer valid")]
    StaleAnchor,

    /// Referenced document id does not exist.
    #[error("document not found")]
    NotFound,
}

impl EditError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// True for failures worth retrying by a human (not automatically).
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable { .. } | Self::UpstreamMalformed)
    }
}

fn format_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (status {code})"),
        None => String::new(),
    }
}
