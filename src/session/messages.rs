use super::state::{DocumentKind, FitMode};
use crate::selection::SelectionMode;
use crate::translate::TranslationOutcome;
use crate::visibility::{PageRect, Rect};

/// Owned copy of the text surrounding a selection, with byte offsets of the
/// selected span inside it.
#[derive(Debug, Clone)]
pub struct SelectionSnapshot {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Events fed into the session reducer by the viewer bindings.
#[derive(Debug, Clone)]
pub enum Event {
    DocumentOpened {
        kind: DocumentKind,
        page_count: u32,
    },
    BackToLibrary,
    SelectionMade {
        raw: String,
        context: Option<SelectionSnapshot>,
    },
    ModeChanged(SelectionMode),
    TargetLanguageChanged(String),
    PerWordToggled(bool),
    Scrolled,
    Resized,
    /// One animation frame: layout geometry sampled by the binding layer.
    Frame {
        pages: Vec<PageRect>,
        viewport: Rect,
    },
    PageInputSubmitted(u32),
    ZoomIn,
    ZoomOut,
    FitModeChanged {
        mode: FitMode,
        container_width: f32,
        container_height: f32,
        page_width: f32,
        page_height: f32,
    },
    TranslationResolved {
        request_id: u64,
        original: String,
        outcome: TranslationOutcome,
    },
    TranslationFailed {
        request_id: u64,
        error: String,
    },
    ExportRequested,
}
