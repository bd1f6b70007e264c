// Selection tracking for the document surface.
//
// Coalesces rapid selection-change events within a configurable time window
// (default 100ms, range 0–1000ms) before publishing a descriptor, so drag
// selection does not flood downstream consumers. Pointer-down outside both
// the document surface and the floating toolbar deactivates immediately.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::surface::AnchorRange;

/// Default debounce window.
const DEFAULT_DEBOUNCE_MS: u64 = 100;
/// Maximum allowed debounce window.
const MAX_DEBOUNCE_MS: u64 = 1000;

/// Configuration for the selection debouncer.
#[derive(Debug, Clone)]
pub struct DebounceConfig {
    pub window: Duration,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self { window: Duration::from_millis(DEFAULT_DEBOUNCE_MS) }
    }
}

impl DebounceConfig {
    /// Create a config with the given window in milliseconds, clamped to [0, 1000].
    pub fn with_millis(ms: u64) -> Self {
        Self { window: Duration::from_millis(ms.min(MAX_DEBOUNCE_MS)) }
    }
}

/// Viewport-relative bounding box of the selection. Used only to place the
/// floating toolbar; never interpreted by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Raw input events from the host UI.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    /// The native selection changed. `text` is the raw (untrimmed) selected
    /// content; empty means the selection collapsed.
    SelectionChanged {
        text: String,
        anchor: AnchorRange,
        screen_rect: Option<ScreenRect>,
    },
    /// A pointer-down somewhere in the page. Flags say whether it landed
    /// inside the document surface or the selection toolbar.
    PointerDown { inside_surface: bool, inside_toolbar: bool },
}

/// A normalized selection snapshot published to downstream consumers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectionDescriptor {
    /// Trimmed selected content. Empty means no usable selection.
    pub text: String,
    /// Anchor into the surface's coordinate space, captured with the text.
    pub anchor: AnchorRange,
    /// Bounding box for toolbar placement, when the host reported one.
    pub screen_rect: Option<ScreenRect>,
    /// False once the user clicks away or the selection collapses.
    pub is_active: bool,
}

impl SelectionDescriptor {
    /// Single construction point for fresh selections. Trims the text and
    /// enforces `is_active == false` whenever the trimmed text is empty.
    fn from_raw(text: &str, anchor: AnchorRange, screen_rect: Option<ScreenRect>) -> Self {
        let text = text.trim().to_string();
        let is_active = !text.is_empty();
        Self { text, anchor, screen_rect, is_active }
    }

    /// The same selection, deactivated. Text is kept for display; the
    /// invariant only forbids `is_active` with empty text, not the reverse.
    fn deactivated(&self) -> Self {
        Self { is_active: false, ..self.clone() }
    }

    fn cleared() -> Self {
        Self::default()
    }
}

/// Pending raw selection waiting out its debounce window.
#[derive(Debug, Clone)]
struct PendingSelection {
    text: String,
    anchor: AnchorRange,
    screen_rect: Option<ScreenRect>,
    last_seen: Instant,
}

/// Debounced observer of the user's active text selection.
///
/// Feed host events in with `push_at`, then call `poll_at` with the current
/// time to collect the coalesced descriptor once the window has elapsed.
/// Timestamps are passed explicitly so tests can drive a virtual clock.
#[derive(Debug)]
pub struct SelectionTracker {
    config: DebounceConfig,
    pending: Option<PendingSelection>,
    current: SelectionDescriptor,
}

impl Default for SelectionTracker {
    fn default() -> Self {
        Self::new(DebounceConfig::default())
    }
}

impl SelectionTracker {
    pub fn new(config: DebounceConfig) -> Self {
        Self { config, pending: None, current: SelectionDescriptor::cleared() }
    }

    /// Record a host event.
    pub fn push(&mut self, event: SelectionEvent) {
        self.push_at(event, Instant::now());
    }

    /// Like `push` but with an explicit timestamp.
    ///
    /// Selection changes are coalesced: the latest raw selection wins and the
    /// debounce timer restarts. A pointer-down outside both the surface and
    /// the toolbar deactivates immediately, bypassing the window.
    pub fn push_at(&mut self, event: SelectionEvent, now: Instant) {
        match event {
            SelectionEvent::SelectionChanged { text, anchor, screen_rect } => {
                self.pending = Some(PendingSelection { text, anchor, screen_rect, last_seen: now });
            }
            SelectionEvent::PointerDown { inside_surface, inside_toolbar } => {
                if !inside_surface && !inside_toolbar {
                    debug!("pointer down outside surface and toolbar, deactivating selection");
                    self.pending = None;
                    self.current = self.current.deactivated();
                }
            }
        }
    }

    /// Emit the coalesced descriptor once the debounce window has elapsed.
    pub fn poll(&mut self) -> Option<SelectionDescriptor> {
        self.poll_at(Instant::now())
    }

    /// Like `poll` but with an explicit timestamp. Returns `None` while the
    /// window is still open or no selection change is pending.
    pub fn poll_at(&mut self, now: Instant) -> Option<SelectionDescriptor> {
        let ready = match &self.pending {
            Some(pending) => now.duration_since(pending.last_seen) >= self.config.window,
            None => return None,
        };
        if !ready {
            return None;
        }

        let pending = self.pending.take().expect("pending selection checked above");
        let descriptor =
            SelectionDescriptor::from_raw(&pending.text, pending.anchor, pending.screen_rect);
        debug!(
            text_len = descriptor.text.len(),
            is_active = descriptor.is_active,
            "selection descriptor emitted"
        );
        self.current = descriptor.clone();
        Some(descriptor)
    }

    /// Imperative reset: drops any pending selection, forces the current
    /// descriptor inactive and empty, and returns the cleared descriptor so
    /// the host can drop its native selection state. Never errors.
    pub fn clear(&mut self) -> SelectionDescriptor {
        self.pending = None;
        self.current = SelectionDescriptor::cleared();
        self.current.clone()
    }

    /// The last emitted descriptor.
    pub fn current(&self) -> &SelectionDescriptor {
        &self.current
    }

    /// Time at which the pending selection becomes ready, or None if idle.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.last_seen + self.config.window)
    }
}
