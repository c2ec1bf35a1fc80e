//! Selection expansion.
//!
//! A raw browser selection is often truncated mid-word or mid-sentence. The
//! expander grows it to a semantically complete span based on the active
//! mode, working only on the surrounding context string so it stays
//! independent of any DOM types. Every failure path degrades to the verbatim
//! trimmed selection rather than erroring.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

static RE_PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t\r]*\n").unwrap());

/// Sentence terminators considered by sentence expansion.
const TERMINATORS: [char; 3] = ['.', '!', '?'];

/// How a raw selection is grown before dispatch.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionMode {
    Auto,
    Word,
    Sentence,
    Paragraph,
}

impl Default for SelectionMode {
    fn default() -> Self {
        SelectionMode::Auto
    }
}

impl std::fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SelectionMode::Auto => "Auto",
            SelectionMode::Word => "Word",
            SelectionMode::Sentence => "Sentence",
            SelectionMode::Paragraph => "Paragraph",
        };
        write!(f, "{}", label)
    }
}

/// Word-count boundaries used by [`SelectionMode::Auto`]. These are tuning
/// constants carried in the config rather than hard-coded.
#[derive(Debug, Clone, Copy)]
pub struct AutoThresholds {
    /// Selections of 2 up to this many words are used verbatim.
    pub verbatim_max_words: usize,
    /// Selections above `verbatim_max_words` up to this many words go
    /// through sentence expansion; anything longer is used verbatim.
    pub sentence_max_words: usize,
}

impl Default for AutoThresholds {
    fn default() -> Self {
        Self {
            verbatim_max_words: 3,
            sentence_max_words: 10,
        }
    }
}

/// The text surrounding a selection, with the selection's byte offsets.
#[derive(Debug, Clone)]
pub struct SelectionContext<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

impl SelectionContext<'_> {
    fn offsets_usable(&self) -> bool {
        self.start <= self.end
            && self.end <= self.text.len()
            && self.text.is_char_boundary(self.start)
            && self.text.is_char_boundary(self.end)
    }
}

/// Expand `raw` according to `mode`. Returns a trimmed string which is never
/// empty unless the input was empty.
pub fn expand_selection(
    raw: &str,
    context: Option<&SelectionContext<'_>>,
    mode: SelectionMode,
    thresholds: &AutoThresholds,
) -> String {
    let raw = raw.trim();
    let expanded = match mode {
        SelectionMode::Word => expand_in_context(raw, context, expand_word),
        SelectionMode::Sentence => expand_in_context(raw, context, expand_sentence),
        SelectionMode::Paragraph => expand_in_context(raw, context, expand_paragraph),
        SelectionMode::Auto => expand_auto(raw, context, thresholds),
    };
    if expanded.trim().is_empty() {
        raw.to_string()
    } else {
        expanded.trim().to_string()
    }
}

fn expand_auto(
    raw: &str,
    context: Option<&SelectionContext<'_>>,
    thresholds: &AutoThresholds,
) -> String {
    let words = raw.split_whitespace().count();
    let routed = match words {
        0 => return String::new(),
        1 => SelectionMode::Word,
        n if n <= thresholds.verbatim_max_words => return raw.to_string(),
        n if n <= thresholds.sentence_max_words => SelectionMode::Sentence,
        _ => return raw.to_string(),
    };
    debug!(words, mode = %routed, "Auto selection routed");
    expand_selection(raw, context, routed, thresholds)
}

fn expand_in_context(
    raw: &str,
    context: Option<&SelectionContext<'_>>,
    expand: fn(&str, usize) -> Option<String>,
) -> String {
    let Some(ctx) = context else {
        return raw.to_string();
    };
    if !ctx.offsets_usable() {
        debug!(
            start = ctx.start,
            end = ctx.end,
            "Selection offsets unusable; keeping verbatim selection"
        );
        return raw.to_string();
    }
    expand(ctx.text, ctx.start).unwrap_or_else(|| raw.to_string())
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Grow left and right from `start` while the neighboring characters stay in
/// the word-character class.
fn expand_word(text: &str, start: usize) -> Option<String> {
    let mut left = start;
    for ch in text[..start].chars().rev() {
        if is_word_char(ch) {
            left -= ch.len_utf8();
        } else {
            break;
        }
    }
    let mut right = start;
    for ch in text[start..].chars() {
        if is_word_char(ch) {
            right += ch.len_utf8();
        } else {
            break;
        }
    }
    if left == right {
        return None;
    }
    Some(text[left..right].to_string())
}

/// Scan outwards for the nearest terminator-then-whitespace pair on each
/// side. The computed span keeps its closing terminator.
fn expand_sentence(text: &str, start: usize) -> Option<String> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let cursor = chars.partition_point(|(idx, _)| *idx < start);

    let mut left = 0;
    for i in (0..cursor).rev() {
        let (_, ch) = chars[i];
        let followed_by_space = chars
            .get(i + 1)
            .map(|(_, next)| next.is_whitespace())
            .unwrap_or(false);
        if TERMINATORS.contains(&ch) && followed_by_space {
            left = chars[i + 1].0;
            break;
        }
    }

    let mut right = text.len();
    for i in cursor..chars.len() {
        let (idx, ch) = chars[i];
        let at_boundary = chars
            .get(i + 1)
            .map(|(_, next)| next.is_whitespace())
            .unwrap_or(true);
        if TERMINATORS.contains(&ch) && at_boundary {
            right = idx + ch.len_utf8();
            break;
        }
    }

    if left >= right {
        return None;
    }
    Some(text[left..right].to_string())
}

/// Same boundary scan as sentences, with a blank line as the separator.
fn expand_paragraph(text: &str, start: usize) -> Option<String> {
    let left = RE_PARAGRAPH_BREAK
        .find_iter(&text[..start])
        .last()
        .map(|m| m.end())
        .unwrap_or(0);
    let right = RE_PARAGRAPH_BREAK
        .find(&text[start..])
        .map(|m| start + m.start())
        .unwrap_or(text.len());
    if left >= right {
        return None;
    }
    Some(text[left..right].to_string())
}
