use crate::cancellation::RenderToken;
use crate::config::AppConfig;
use crate::history::TranslationLog;
use crate::selection::SelectionMode;
use crate::translate::TranslationOutcome;
use crate::visibility::VisiblePageTracker;

/// Selection mode plus the last dispatched span, used for de-duplication of
/// redundant mouseup events.
#[derive(Debug, Clone)]
pub struct SelectionState {
    pub mode: SelectionMode,
    pub last_selection_text: Option<String>,
}

impl SelectionState {
    pub(super) fn from_config(config: &AppConfig) -> Self {
        Self {
            mode: config.selection_mode,
            last_selection_text: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Epub,
}

impl DocumentKind {
    /// Only paginated documents drive the page-number indicator.
    pub fn paginated(self) -> bool {
        matches!(self, DocumentKind::Pdf)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitMode {
    None,
    Width,
    Page,
}

/// Zoom policy for the current document. The scale is always kept inside
/// `[min_scale, max_scale]`.
#[derive(Debug, Clone, Copy)]
pub struct ZoomState {
    pub scale: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub fit_mode: FitMode,
    pub doc_kind: Option<DocumentKind>,
}

impl ZoomState {
    pub(super) fn for_document(kind: Option<DocumentKind>, config: &AppConfig) -> Self {
        let mut zoom = Self {
            scale: 1.0,
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            fit_mode: FitMode::None,
            doc_kind: kind,
        };
        zoom.set_scale(zoom.scale);
        zoom
    }

    pub fn set_scale(&mut self, scale: f32) {
        let scale = if scale.is_finite() { scale } else { 1.0 };
        self.scale = scale.clamp(self.min_scale, self.max_scale);
    }

    pub fn zoom_in(&mut self, step: f32) {
        self.fit_mode = FitMode::None;
        self.set_scale(self.scale + step);
    }

    pub fn zoom_out(&mut self, step: f32) {
        self.fit_mode = FitMode::None;
        self.set_scale(self.scale - step);
    }

    /// Derive the scale from container dimensions instead of a fixed value.
    pub fn apply_fit(
        &mut self,
        mode: FitMode,
        container_width: f32,
        container_height: f32,
        page_width: f32,
        page_height: f32,
    ) {
        self.fit_mode = mode;
        if page_width <= 0.0 || page_height <= 0.0 {
            return;
        }
        match mode {
            FitMode::None => {}
            FitMode::Width => self.set_scale(container_width / page_width),
            FitMode::Page => {
                let by_width = container_width / page_width;
                let by_height = container_height / page_height;
                self.set_scale(by_width.min(by_height));
            }
        }
    }
}

/// The currently open document, with the token its render loop must check.
#[derive(Debug, Clone)]
pub struct DocumentState {
    pub kind: DocumentKind,
    pub page_count: u32,
    pub(super) render_token: RenderToken,
}

/// What the single result pane is showing.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultPane {
    Idle,
    Loading,
    Ready(TranslationOutcome),
    Error(String),
}

/// Per-document-view session context. Created when the viewer opens, torn
/// down (and reset) when the user returns to the library.
pub struct Session {
    pub(super) config: AppConfig,
    pub(super) selection: SelectionState,
    pub(super) zoom: ZoomState,
    pub(super) tracker: VisiblePageTracker,
    pub(super) history: TranslationLog,
    pub(super) document: Option<DocumentState>,
    pub(super) pane: ResultPane,
    pub(super) per_word: bool,
    pub(super) target_language: String,
    pub(super) next_request_id: u64,
    pub(super) in_flight: usize,
}

impl Session {
    pub fn new(config: AppConfig) -> Self {
        let selection = SelectionState::from_config(&config);
        let zoom = ZoomState::for_document(None, &config);
        let history = TranslationLog::new(config.history_limit);
        let per_word = config.per_word_dictionary;
        let target_language = config.target_language.clone();
        Self {
            config,
            selection,
            zoom,
            tracker: VisiblePageTracker::new(),
            history,
            document: None,
            pane: ResultPane::Idle,
            per_word,
            target_language,
            next_request_id: 0,
            in_flight: 0,
        }
    }

    pub fn pane(&self) -> &ResultPane {
        &self.pane
    }

    pub fn history(&self) -> &TranslationLog {
        &self.history
    }

    pub fn selection_mode(&self) -> SelectionMode {
        self.selection.mode
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    pub fn zoom(&self) -> &ZoomState {
        &self.zoom
    }

    pub fn document(&self) -> Option<&DocumentState> {
        self.document.as_ref()
    }

    pub fn current_page(&self) -> Option<u32> {
        self.tracker.current_page()
    }

    /// Whether at least one translation request is still pending; the UI
    /// disables the copy button while this holds.
    pub fn is_translating(&self) -> bool {
        self.in_flight > 0
    }

    /// Token the external page-render loop must check before each page.
    pub fn render_token(&self) -> Option<RenderToken> {
        self.document.as_ref().map(|doc| doc.render_token.clone())
    }
}
