use super::Effect;
use super::super::messages::SelectionSnapshot;
use super::super::state::{ResultPane, Session};
use crate::sanitize::validate_selection;
use crate::selection::{SelectionContext, SelectionMode, expand_selection};
use crate::translate::TranslationRequest;
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;

impl Session {
    pub(in crate::session) fn handle_selection_made(
        &mut self,
        raw: String,
        context: Option<SelectionSnapshot>,
        effects: &mut Vec<Effect>,
    ) {
        if self.document.is_none() {
            return;
        }

        let borrowed = context.as_ref().map(|snapshot| SelectionContext {
            text: &snapshot.text,
            start: snapshot.start,
            end: snapshot.end,
        });
        let expanded = expand_selection(
            &raw,
            borrowed.as_ref(),
            self.selection.mode,
            &self.config.auto_thresholds(),
        );
        // PDF text layers often hand out decomposed accents; normalize
        // before comparing against the last dispatched span.
        let text: String = expanded.nfc().collect();

        if text.chars().count() < self.config.min_selection_chars {
            debug!(chars = text.chars().count(), "Selection too short; ignored");
            return;
        }
        if self.selection.last_selection_text.as_deref() == Some(text.as_str()) {
            debug!("Duplicate selection; not re-translating");
            return;
        }
        self.selection.last_selection_text = Some(text.clone());

        let report = validate_selection(&text, self.config.max_selection_chars);
        if !report.valid {
            let message = report
                .error
                .unwrap_or_else(|| "Selection was rejected.".to_string());
            effects.push(Effect::Notify(message));
            return;
        }

        let request = if self.per_word {
            TranslationRequest::Dictionary {
                text,
                target_language: self.target_language.clone(),
            }
        } else {
            TranslationRequest::FreeText {
                text,
                target_language: self.target_language.clone(),
            }
        };
        self.next_request_id += 1;
        self.in_flight += 1;
        self.pane = ResultPane::Loading;
        info!(
            request_id = self.next_request_id,
            mode = %self.selection.mode,
            "Selection accepted for translation"
        );
        effects.push(Effect::Translate {
            request_id: self.next_request_id,
            request,
        });
    }

    pub(in crate::session) fn handle_mode_changed(&mut self, mode: SelectionMode) {
        if self.selection.mode != mode {
            info!(%mode, "Selection mode changed");
            self.selection.mode = mode;
        }
    }

    pub(in crate::session) fn handle_per_word_toggled(
        &mut self,
        enabled: bool,
        effects: &mut Vec<Effect>,
    ) {
        self.per_word = enabled;
        let message = if enabled {
            "Per-word dictionary mode enabled"
        } else {
            "Per-word dictionary mode disabled"
        };
        effects.push(Effect::Notify(message.to_string()));
    }
}
