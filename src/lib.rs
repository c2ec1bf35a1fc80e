//! Selection-to-translation engine for a multi-format document reader.
//!
//! The viewer itself (PDF/DOCX/EPUB rendering, auth, styling) lives outside
//! this crate; what lives here is the logic between a text selection and a
//! translation on screen:
//!
//! - [`selection`]: grow a raw selection to a word / sentence / paragraph
//!   span, or pick automatically by word count.
//! - [`sanitize`]: markup defense and input validation.
//! - [`visibility`]: which rendered page is most visible during scroll,
//!   coalesced to one recomputation per frame.
//! - [`translate`]: dispatch to the language-model endpoint and decode free
//!   text or per-word dictionary responses.
//! - [`history`]: the bounded, newest-first translation log and its
//!   Markdown export.
//! - [`session`]: the per-document-view context tying it all together as an
//!   event reducer.
//! - [`library`]: the local book store.

pub mod cancellation;
pub mod config;
pub mod history;
pub mod library;
pub mod sanitize;
pub mod selection;
pub mod session;
pub mod translate;
pub mod visibility;

pub use config::{AppConfig, load_config};
pub use session::{Effect, Event, Session};
pub use translate::{TranslationOutcome, TranslationRequest, Translator};
