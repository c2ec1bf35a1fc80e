//! Visible-page tracking.
//!
//! Keeps the page-number indicator in sync with scroll position. Geometry is
//! pure so it can be tested without a layout engine; the tracker adds the
//! per-frame coalescing and detach semantics around it.

use tracing::debug;

/// Axis-aligned rectangle in viewer coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// Bounding box of a rendered page, tagged with its 1-based page number.
#[derive(Debug, Clone, Copy)]
pub struct PageRect {
    pub number: u32,
    pub rect: Rect,
}

/// Overlap area of two rectangles, clamped to zero on each axis.
pub fn intersection_area(a: Rect, b: Rect) -> f32 {
    let x_overlap = (a.right.min(b.right) - a.left.max(b.left)).max(0.0);
    let y_overlap = (a.bottom.min(b.bottom) - a.top.max(b.top)).max(0.0);
    x_overlap * y_overlap
}

/// The page occupying the largest visible area. Ties keep the first page in
/// document order; pages with no visible area never win.
pub fn most_visible_page(pages: &[PageRect], viewport: Rect) -> Option<u32> {
    let mut best = None;
    let mut max_area = 0.0f32;
    for page in pages {
        let area = intersection_area(page.rect, viewport);
        if area > max_area {
            max_area = area;
            best = Some(page.number);
        }
    }
    best
}

/// At most one pending recomputation; scheduling again before the frame runs
/// supersedes the previous request instead of queueing a second one.
#[derive(Debug, Default)]
pub struct FrameCoalescer {
    pending: bool,
}

impl FrameCoalescer {
    pub fn schedule(&mut self) {
        self.pending = true;
    }

    /// Consume the pending flag; returns whether a recomputation was due.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    pub fn cancel(&mut self) {
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

/// Scroll/resize driven tracker for the current-page indicator.
pub struct VisiblePageTracker {
    attached: bool,
    coalescer: FrameCoalescer,
    current: Option<u32>,
}

impl Default for VisiblePageTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl VisiblePageTracker {
    pub fn new() -> Self {
        Self {
            attached: true,
            coalescer: FrameCoalescer::default(),
            current: None,
        }
    }

    pub fn on_scroll(&mut self) {
        if self.attached {
            self.coalescer.schedule();
        }
    }

    pub fn on_resize(&mut self) {
        self.on_scroll();
    }

    /// Run the coalesced recomputation for this frame. Returns the new page
    /// number only when a recomputation was pending and the winner differs
    /// from the currently displayed value.
    pub fn on_frame(&mut self, pages: &[PageRect], viewport: Rect) -> Option<u32> {
        if !self.attached || !self.coalescer.take() {
            return None;
        }
        let winner = most_visible_page(pages, viewport)?;
        if self.current == Some(winner) {
            return None;
        }
        debug!(page = winner, "Visible page changed");
        self.current = Some(winner);
        Some(winner)
    }

    /// Tear down: cancel any pending frame and ignore all later events.
    pub fn detach(&mut self) {
        self.attached = false;
        self.coalescer.cancel();
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn current_page(&self) -> Option<u32> {
        self.current
    }
}
