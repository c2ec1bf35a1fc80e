use super::Effect;
use super::super::state::Session;
use crate::visibility::{PageRect, Rect};
use tracing::debug;

impl Session {
    /// Run the coalesced per-frame recomputation against the geometry the
    /// binding layer sampled for this frame.
    pub(in crate::session) fn handle_frame(
        &mut self,
        pages: &[PageRect],
        viewport: Rect,
        effects: &mut Vec<Effect>,
    ) {
        if let Some(page) = self.tracker.on_frame(pages, viewport) {
            effects.push(Effect::UpdatePageIndicator(page));
        }
    }

    pub(in crate::session) fn handle_page_input(&mut self, page: u32, effects: &mut Vec<Effect>) {
        let Some(doc) = self.document.as_ref().filter(|d| d.kind.paginated()) else {
            return;
        };
        if page >= 1 && page <= doc.page_count {
            debug!(page, "Jumping to requested page");
            effects.push(Effect::ScrollToPage(page));
        } else {
            effects.push(Effect::Notify(format!(
                "Invalid page number. Please enter a number between 1 and {}.",
                doc.page_count
            )));
        }
    }
}
