//! Session-scoped translation history.
//!
//! Newest first, bounded, never persisted. Cleared whenever a new document
//! is opened.

use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub original: String,
    pub translated: String,
}

#[derive(Debug)]
pub struct TranslationLog {
    entries: VecDeque<LogEntry>,
    limit: usize,
}

impl TranslationLog {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    /// Insert at the front, evicting the oldest entry past the limit.
    pub fn record(&mut self, original: impl Into<String>, translated: impl Into<String>) {
        self.entries.push_front(LogEntry {
            original: original.into(),
            translated: translated.into(),
        });
        while self.entries.len() > self.limit {
            self.entries.pop_back();
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries newest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Render the log as a Markdown document, oldest entry first.
    pub fn export_markdown(&self, target_language: &str) -> String {
        let mut out = String::from("# Translation History\n\n");
        for entry in self.entries.iter().rev() {
            out.push_str("## Original\n> ");
            out.push_str(&entry.original);
            out.push_str("\n\n**Translation (");
            out.push_str(target_language);
            out.push_str(")**\n");
            out.push_str(&entry.translated);
            out.push_str("\n\n---\n\n");
        }
        out
    }
}
