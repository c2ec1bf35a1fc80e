use super::Effect;
use super::super::state::{
    DocumentKind, DocumentState, ResultPane, SelectionState, Session, ZoomState,
};
use crate::cancellation::RenderToken;
use crate::sanitize::sanitize_text;
use crate::translate::TranslationOutcome;
use crate::visibility::VisiblePageTracker;
use tracing::{debug, info, warn};

impl Session {
    pub(in crate::session) fn handle_document_opened(&mut self, kind: DocumentKind, page_count: u32) {
        if let Some(previous) = self.document.take() {
            previous.render_token.cancel();
            debug!("Cancelled the previous document's render loop");
        }
        self.history.clear();
        self.pane = ResultPane::Idle;
        self.selection.last_selection_text = None;
        self.zoom = ZoomState::for_document(Some(kind), &self.config);
        self.tracker = VisiblePageTracker::new();
        if !kind.paginated() {
            // Reflowable formats have no page boxes to track.
            self.tracker.detach();
        }
        self.document = Some(DocumentState {
            kind,
            page_count,
            render_token: RenderToken::new(),
        });
        info!(?kind, page_count, "Document opened");
    }

    pub(in crate::session) fn handle_back_to_library(&mut self) {
        if let Some(doc) = self.document.take() {
            doc.render_token.cancel();
        }
        self.tracker.detach();
        self.selection = SelectionState::from_config(&self.config);
        self.pane = ResultPane::Idle;
        self.zoom = ZoomState::for_document(None, &self.config);
        info!("Returned to library view");
    }

    /// Last write wins: whatever resolves most recently owns the single
    /// result pane, regardless of dispatch order.
    pub(in crate::session) fn handle_translation_resolved(
        &mut self,
        request_id: u64,
        original: String,
        outcome: TranslationOutcome,
    ) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if request_id < self.next_request_id {
            debug!(request_id, "Out-of-order translation arrival");
        }
        let outcome = outcome.sanitized();
        self.history
            .record(sanitize_text(&original), outcome.logged_text());
        self.pane = ResultPane::Ready(outcome);
        info!(request_id, history_len = self.history.len(), "Translation ready");
    }

    pub(in crate::session) fn handle_translation_failed(&mut self, request_id: u64, error: String) {
        self.in_flight = self.in_flight.saturating_sub(1);
        warn!(request_id, "Translation failed: {error}");
        self.pane = ResultPane::Error(format!("Error: {error}"));
    }

    pub(in crate::session) fn handle_export_requested(&mut self, effects: &mut Vec<Effect>) {
        if self.history.is_empty() {
            effects.push(Effect::Notify("No history to export.".to_string()));
            return;
        }
        effects.push(Effect::ExportHistory {
            markdown: self.history.export_markdown(&self.target_language),
        });
    }
}
