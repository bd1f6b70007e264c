// Preview and apply control for edit proposals.
//
// Holds at most one proposal awaiting human approval. A newer resolved
// proposal replaces the pending one (last-resolved-wins); approval applies
// the suggestion through the document surface at the anchor captured at
// submission time. Apply is best-effort: a stale anchor is reported as a
// skip, never a crash, and leaves the document untouched.

use tracing::{debug, warn};

use crate::dispatch::EditProposal;
use crate::surface::{DocumentSurface, SurfaceError};

/// Observable controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewState {
    Idle,
    Previewing,
}

impl PreviewState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Previewing => "previewing",
        }
    }
}

/// Outcome of an `approve` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyReport {
    /// The surface replaced the span; the proposal is consumed.
    Applied { submission_id: u64 },
    /// The surface refused the anchor. Accepted no-op; proposal consumed.
    Skipped { submission_id: u64, reason: SurfaceError },
    /// No proposal was pending (double approve, or approve after discard).
    NothingPending,
}

/// Owns the currently proposed transformation until it is resolved.
#[derive(Debug, Default)]
pub struct PreviewController {
    pending: Option<EditProposal>,
}

impl PreviewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PreviewState {
        if self.pending.is_some() { PreviewState::Previewing } else { PreviewState::Idle }
    }

    /// The proposal awaiting approval, if any.
    pub fn pending(&self) -> Option<&EditProposal> {
        self.pending.as_ref()
    }

    /// Receive a resolved proposal.
    ///
    /// When one is already previewing, the newer resolution wins and the
    /// superseded proposal is returned (dropped without ever touching the
    /// document). A late-arriving result for a selection the user has since
    /// abandoned lands here harmlessly; it is simply never approved.
    pub fn offer(&mut self, proposal: EditProposal) -> Option<EditProposal> {
        let superseded = self.pending.replace(proposal);
        if let Some(old) = &superseded {
            debug!(
                superseded_id = old.submission_id,
                new_id = self.pending.as_ref().map(|p| p.submission_id),
                "pending proposal superseded"
            );
        }
        superseded
    }

    /// Apply the pending proposal through the surface at its captured anchor.
    ///
    /// Consumes the proposal whatever the outcome, so a second call reports
    /// `NothingPending` and can never mutate the document again. A refused
    /// anchor (the document changed since capture) is an accepted no-op.
    pub fn approve(&mut self, surface: &mut dyn DocumentSurface) -> ApplyReport {
        let Some(proposal) = self.pending.take() else {
            return ApplyReport::NothingPending;
        };

        match surface.replace_range(&proposal.captured_anchor, &proposal.suggested_text) {
            Ok(()) => {
                debug!(submission_id = proposal.submission_id, "proposal applied");
                ApplyReport::Applied { submission_id: proposal.submission_id }
            }
            Err(reason) => {
                warn!(
                    submission_id = proposal.submission_id,
                    %reason,
                    "apply skipped, anchor no longer valid"
                );
                ApplyReport::Skipped { submission_id: proposal.submission_id, reason }
            }
        }
    }

    /// Drop the pending proposal without mutating the document.
    pub fn discard(&mut self) -> Option<EditProposal> {
        let discarded = self.pending.take();
        if let Some(proposal) = &discarded {
            debug!(submission_id = proposal.submission_id, "proposal discarded");
        }
        discarded
    }
}
