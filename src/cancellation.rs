//! "Still current document" flag for the page-render loop.
//!
//! Rapid document switching can leave a render loop in flight against a
//! reused viewer. The session hands the loop a token and cancels it on
//! navigation; the loop checks before each per-page unit of work and aborts
//! cleanly instead of writing stale pages.

use anyhow::{Result, anyhow};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

#[derive(Clone, Debug, Default)]
pub struct RenderToken {
    cancelled: Arc<AtomicBool>,
}

impl RenderToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Bail out of the render loop with a labeled error when the document
    /// this token was issued for is no longer current.
    pub fn ensure_current(&self, stage: &'static str) -> Result<()> {
        if self.is_cancelled() {
            return Err(anyhow!(
                "render aborted at stage={stage}: document no longer current"
            ));
        }
        Ok(())
    }
}
