use super::messages::Event;
use super::state::Session;
use crate::translate::TranslationRequest;

mod document;
mod selection;
mod visibility;

/// Describes work that must be performed outside the pure reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Issue the request; resolution comes back as a `TranslationResolved`
    /// or `TranslationFailed` event. Never cancels an earlier request.
    Translate {
        request_id: u64,
        request: TranslationRequest,
    },
    /// Write the new value into the page-number field.
    UpdatePageIndicator(u32),
    /// Smooth-scroll the viewer to the given page.
    ScrollToPage(u32),
    /// Transient toast-style notification.
    Notify(String),
    /// Offer the rendered Markdown as a download.
    ExportHistory { markdown: String },
}

impl Session {
    /// Advance the session by one event. All state mutation happens here on
    /// the caller's (single) thread; returned effects are run afterwards.
    pub fn reduce(&mut self, event: Event) -> Vec<Effect> {
        let mut effects = Vec::new();
        match event {
            Event::DocumentOpened { kind, page_count } => {
                self.handle_document_opened(kind, page_count)
            }
            Event::BackToLibrary => self.handle_back_to_library(),
            Event::SelectionMade { raw, context } => {
                self.handle_selection_made(raw, context, &mut effects)
            }
            Event::ModeChanged(mode) => self.handle_mode_changed(mode),
            Event::TargetLanguageChanged(language) => self.target_language = language,
            Event::PerWordToggled(enabled) => self.handle_per_word_toggled(enabled, &mut effects),
            Event::Scrolled => self.tracker.on_scroll(),
            Event::Resized => self.tracker.on_resize(),
            Event::Frame { pages, viewport } => {
                self.handle_frame(&pages, viewport, &mut effects)
            }
            Event::PageInputSubmitted(page) => self.handle_page_input(page, &mut effects),
            Event::ZoomIn => self.zoom.zoom_in(self.config.zoom_step),
            Event::ZoomOut => self.zoom.zoom_out(self.config.zoom_step),
            Event::FitModeChanged {
                mode,
                container_width,
                container_height,
                page_width,
                page_height,
            } => self.zoom.apply_fit(
                mode,
                container_width,
                container_height,
                page_width,
                page_height,
            ),
            Event::TranslationResolved {
                request_id,
                original,
                outcome,
            } => self.handle_translation_resolved(request_id, original, outcome),
            Event::TranslationFailed { request_id, error } => {
                self.handle_translation_failed(request_id, error)
            }
            Event::ExportRequested => self.handle_export_requested(&mut effects),
        }
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::session::messages::SelectionSnapshot;
    use crate::session::state::{DocumentKind, ResultPane};
    use crate::translate::TranslationOutcome;
    use crate::visibility::{PageRect, Rect};

    fn build_test_session() -> Session {
        let mut config = AppConfig::default();
        config.history_limit = 5;
        config.min_selection_chars = 3;
        config.max_selection_chars = 60;
        let mut session = Session::new(config);
        session.reduce(Event::DocumentOpened {
            kind: DocumentKind::Pdf,
            page_count: 12,
        });
        session
    }

    fn select(session: &mut Session, raw: &str) -> Vec<Effect> {
        session.reduce(Event::SelectionMade {
            raw: raw.to_string(),
            context: None,
        })
    }

    fn translate_effects(effects: &[Effect]) -> Vec<(u64, String)> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Translate {
                    request_id,
                    request,
                } => Some((*request_id, request.text().to_string())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn valid_selection_dispatches_one_translation() {
        let mut session = build_test_session();
        let effects = select(&mut session, "buenos dias amigo");
        let dispatched = translate_effects(&effects);
        assert_eq!(dispatched.len(), 1);
        assert_eq!(dispatched[0].1, "buenos dias amigo");
        assert_eq!(*session.pane(), ResultPane::Loading);
        assert!(session.is_translating());
    }

    #[test]
    fn repeated_identical_selection_is_deduplicated() {
        let mut session = build_test_session();
        assert_eq!(translate_effects(&select(&mut session, "same span here")).len(), 1);
        assert!(
            translate_effects(&select(&mut session, "same span here")).is_empty(),
            "redundant mouseup must not re-translate the same span"
        );
        assert_eq!(
            translate_effects(&select(&mut session, "a different span")).len(),
            1
        );
    }

    #[test]
    fn word_context_expansion_flows_into_the_request() {
        let mut session = build_test_session();
        session.reduce(Event::ModeChanged(crate::selection::SelectionMode::Word));
        let effects = session.reduce(Event::SelectionMade {
            raw: "llo".to_string(),
            context: Some(SelectionSnapshot {
                text: "say hello-world now".to_string(),
                start: 6,
                end: 9,
            }),
        });
        assert_eq!(translate_effects(&effects)[0].1, "hello");
    }

    #[test]
    fn selections_below_the_minimum_length_are_ignored() {
        let mut session = build_test_session();
        assert!(select(&mut session, "ab").is_empty());
        assert_eq!(*session.pane(), ResultPane::Idle);
    }

    #[test]
    fn oversized_selection_notifies_and_makes_no_request() {
        let mut session = build_test_session();
        let effects = select(&mut session, &"word ".repeat(30));
        assert!(translate_effects(&effects).is_empty());
        assert!(
            effects.iter().any(|e| matches!(e, Effect::Notify(_))),
            "validation failure must surface a notification"
        );
        assert_eq!(*session.pane(), ResultPane::Idle, "pane state is untouched");
    }

    #[test]
    fn selections_outside_a_document_view_are_ignored() {
        let mut session = Session::new(AppConfig::default());
        assert!(select(&mut session, "library view text").is_empty());
    }

    #[test]
    fn per_word_toggle_switches_request_variant() {
        let mut session = build_test_session();
        session.reduce(Event::PerWordToggled(true));
        let effects = select(&mut session, "per word please");
        match &effects[..] {
            [Effect::Translate { request, .. }] => {
                assert!(matches!(request, TranslationRequest::Dictionary { .. }))
            }
            other => panic!("expected a dictionary request, got {other:?}"),
        }
    }

    #[test]
    fn resolution_fills_pane_and_history() {
        let mut session = build_test_session();
        let effects = select(&mut session, "buenos dias amigo");
        let (request_id, original) = translate_effects(&effects).remove(0);
        session.reduce(Event::TranslationResolved {
            request_id,
            original,
            outcome: TranslationOutcome::Text("good morning friend".to_string()),
        });
        assert_eq!(
            *session.pane(),
            ResultPane::Ready(TranslationOutcome::Text("good morning friend".to_string()))
        );
        assert_eq!(session.history().len(), 1);
        assert!(!session.is_translating());
    }

    #[test]
    fn failure_shows_error_and_leaves_history_untouched() {
        let mut session = build_test_session();
        let effects = select(&mut session, "buenos dias amigo");
        let (request_id, _) = translate_effects(&effects).remove(0);
        session.reduce(Event::TranslationFailed {
            request_id,
            error: "API request failed with status 503".to_string(),
        });
        match session.pane() {
            ResultPane::Error(message) => {
                assert!(message.contains("503"), "pane must carry the error: {message}")
            }
            other => panic!("expected an error pane, got {other:?}"),
        }
        assert!(session.history().is_empty());
    }

    #[test]
    fn overlapping_requests_are_last_write_wins_by_arrival() {
        let mut session = build_test_session();
        let first = translate_effects(&select(&mut session, "first selection here")).remove(0);
        let second = translate_effects(&select(&mut session, "second selection here")).remove(0);
        // The newer request resolves first; the older response then lands
        // late and still wins the pane. Documented behavior, not a bug.
        session.reduce(Event::TranslationResolved {
            request_id: second.0,
            original: second.1,
            outcome: TranslationOutcome::Text("newer".to_string()),
        });
        session.reduce(Event::TranslationResolved {
            request_id: first.0,
            original: first.1,
            outcome: TranslationOutcome::Text("older".to_string()),
        });
        assert_eq!(
            *session.pane(),
            ResultPane::Ready(TranslationOutcome::Text("older".to_string()))
        );
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn sanitized_markup_never_reaches_pane_or_history() {
        let mut session = build_test_session();
        let effects = select(&mut session, "evil input text");
        let (request_id, original) = translate_effects(&effects).remove(0);
        session.reduce(Event::TranslationResolved {
            request_id,
            original,
            outcome: TranslationOutcome::Text("<script>x()</script>safe".to_string()),
        });
        match session.pane() {
            ResultPane::Ready(TranslationOutcome::Text(text)) => {
                assert_eq!(text, "safe");
            }
            other => panic!("expected sanitized text, got {other:?}"),
        }
    }

    #[test]
    fn frame_after_scroll_updates_the_page_indicator_once() {
        let mut session = build_test_session();
        session.reduce(Event::Scrolled);
        session.reduce(Event::Scrolled);
        let pages = vec![
            PageRect {
                number: 1,
                rect: Rect::new(0.0, -500.0, 100.0, 10.0),
            },
            PageRect {
                number: 2,
                rect: Rect::new(0.0, 10.0, 100.0, 520.0),
            },
        ];
        let viewport = Rect::new(0.0, 0.0, 100.0, 400.0);
        let effects = session.reduce(Event::Frame {
            pages: pages.clone(),
            viewport,
        });
        assert_eq!(effects, vec![Effect::UpdatePageIndicator(2)]);
        // Coalesced: the second scroll was superseded, not queued.
        assert!(session.reduce(Event::Frame { pages, viewport }).is_empty());
        assert_eq!(session.current_page(), Some(2));
    }

    #[test]
    fn back_to_library_detaches_tracking_and_resets_selection_state() {
        let mut session = build_test_session();
        select(&mut session, "some selection here");
        session.reduce(Event::BackToLibrary);
        assert!(session.document().is_none());
        assert!(session.selection.last_selection_text.is_none());
        // A synthetic scroll after teardown must produce no update.
        session.reduce(Event::Scrolled);
        let effects = session.reduce(Event::Frame {
            pages: vec![PageRect {
                number: 3,
                rect: Rect::new(0.0, 0.0, 100.0, 100.0),
            }],
            viewport: Rect::new(0.0, 0.0, 100.0, 100.0),
        });
        assert!(effects.is_empty());
    }

    #[test]
    fn opening_a_document_clears_history_and_cancels_the_old_render_loop() {
        let mut session = build_test_session();
        let effects = select(&mut session, "buenos dias amigo");
        let (request_id, original) = translate_effects(&effects).remove(0);
        session.reduce(Event::TranslationResolved {
            request_id,
            original,
            outcome: TranslationOutcome::Text("hola".to_string()),
        });
        let old_token = session.render_token().expect("open document has a token");
        session.reduce(Event::DocumentOpened {
            kind: DocumentKind::Epub,
            page_count: 0,
        });
        assert!(old_token.is_cancelled(), "stale render loop must be aborted");
        assert!(session.history().is_empty());
        let new_token = session.render_token().expect("new document has a token");
        assert!(!new_token.is_cancelled());
    }

    #[test]
    fn page_input_is_validated_against_the_page_count() {
        let mut session = build_test_session();
        assert_eq!(
            session.reduce(Event::PageInputSubmitted(7)),
            vec![Effect::ScrollToPage(7)]
        );
        let effects = session.reduce(Event::PageInputSubmitted(99));
        assert!(matches!(&effects[..], [Effect::Notify(msg)] if msg.contains("between 1 and 12")));
    }

    #[test]
    fn export_of_an_empty_history_is_a_reported_no_op() {
        let mut session = build_test_session();
        let effects = session.reduce(Event::ExportRequested);
        assert!(matches!(&effects[..], [Effect::Notify(_)]));
    }

    #[test]
    fn export_emits_markdown_for_a_populated_history() {
        let mut session = build_test_session();
        let effects = select(&mut session, "buenos dias amigo");
        let (request_id, original) = translate_effects(&effects).remove(0);
        session.reduce(Event::TranslationResolved {
            request_id,
            original,
            outcome: TranslationOutcome::Text("good morning".to_string()),
        });
        let effects = session.reduce(Event::ExportRequested);
        match &effects[..] {
            [Effect::ExportHistory { markdown }] => {
                assert!(markdown.contains("# Translation History"));
                assert!(markdown.contains("good morning"));
            }
            other => panic!("expected an export effect, got {other:?}"),
        }
    }
}
