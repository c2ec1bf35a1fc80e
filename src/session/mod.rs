//! Document-view session: the explicit context object that owns selection
//! state, zoom, the visible-page tracker, the result pane and the history
//! log, with a pure reducer turning events into effects.

mod messages;
mod state;
mod update;

pub use messages::{Event, SelectionSnapshot};
pub use state::{
    DocumentKind, DocumentState, FitMode, ResultPane, SelectionState, Session, ZoomState,
};
pub use update::Effect;
