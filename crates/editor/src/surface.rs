// Document surface capability interface.
//
// The edit pipeline never inspects the structured document tree. It asks the
// surface for the text behind an anchor and, on an approved proposal, asks it
// to replace that span. Anchors are opaque references into the surface's own
// coordinate space and stay valid only until the document is next mutated.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque reference to a span in a document surface's coordinate space.
///
/// `start`/`end` are surface-defined units. `revision` tags the document
/// state the anchor was captured against; surfaces use it to detect that an
/// anchor has gone stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnchorRange {
    pub start: usize,
    pub end: usize,
    pub revision: u64,
}

impl AnchorRange {
    pub fn new(start: usize, end: usize, revision: u64) -> Self {
        Self { start, end, revision }
    }

    /// True when the anchor spans no content.
    pub fn is_collapsed(&self) -> bool {
        self.start >= self.end
    }
}

/// Why a surface refused a replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceError {
    /// The anchor was captured against an earlier document revision.
    StaleAnchor,
    /// The anchor lies outside the document's current bounds.
    OutOfBounds,
}

impl Display for SurfaceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceError::StaleAnchor => write!(f, "anchor revision no longer matches document"),
            SurfaceError::OutOfBounds => write!(f, "anchor exceeds document bounds"),
        }
    }
}

impl Error for SurfaceError {}

/// Capability interface onto the host document surface.
///
/// Implementations decide how strictly to validate anchors; callers treat any
/// refusal as a best-effort no-op, never a crash.
pub trait DocumentSurface {
    /// Text currently behind `anchor`, or `None` if the anchor no longer
    /// resolves.
    fn text_in_range(&self, anchor: &AnchorRange) -> Option<String>;

    /// Replace the span behind `anchor` with `replacement`. A successful
    /// replace is a document mutation and invalidates previously captured
    /// anchors.
    fn replace_range(&mut self, anchor: &AnchorRange, replacement: &str)
        -> Result<(), SurfaceError>;
}

/// Reference surface over a plain text buffer.
///
/// Anchors are byte ranges tagged with a revision counter that every
/// mutation advances. Used by tests and as the simplest possible host.
#[derive(Debug, Clone)]
pub struct BufferSurface {
    text: String,
    revision: u64,
}

impl BufferSurface {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), revision: 0 }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Capture an anchor for the byte range `[start, end)` at the current
    /// revision. Returns `None` for out-of-bounds or non-boundary offsets.
    pub fn anchor_of(&self, start: usize, end: usize) -> Option<AnchorRange> {
        if start > end || end > self.text.len() {
            return None;
        }
        if !self.text.is_char_boundary(start) || !self.text.is_char_boundary(end) {
            return None;
        }
        Some(AnchorRange::new(start, end, self.revision))
    }

    /// Capture an anchor for the first occurrence of `needle`.
    pub fn find_anchor(&self, needle: &str) -> Option<AnchorRange> {
        if needle.is_empty() {
            return None;
        }
        let start = self.text.find(needle)?;
        self.anchor_of(start, start + needle.len())
    }

    /// Mutate the buffer directly (simulating the user typing elsewhere).
    /// Advances the revision, invalidating outstanding anchors.
    pub fn overwrite(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.revision += 1;
    }

    fn check_anchor(&self, anchor: &AnchorRange) -> Result<(), SurfaceError> {
        if anchor.revision != self.revision {
            return Err(SurfaceError::StaleAnchor);
        }
        if anchor.start > anchor.end
            || anchor.end > self.text.len()
            || !self.text.is_char_boundary(anchor.start)
            || !self.text.is_char_boundary(anchor.end)
        {
            return Err(SurfaceError::OutOfBounds);
        }
        Ok(())
    }
}

impl DocumentSurface for BufferSurface {
    fn text_in_range(&self, anchor: &AnchorRange) -> Option<String> {
        self.check_anchor(anchor).ok()?;
        Some(self.text[anchor.start..anchor.end].to_string())
    }

    fn replace_range(
        &mut self,
        anchor: &AnchorRange,
        replacement: &str,
    ) -> Result<(), SurfaceError> {
        self.check_anchor(anchor)?;
        self.text.replace_range(anchor.start..anchor.end, replacement);
        self.revision += 1;
        Ok(())
    }
}
