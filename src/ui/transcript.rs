//! On-screen transcript: the [`ChatView`] the terminal UI renders from.

use std::borrow::Cow;

use unicode_width::UnicodeWidthChar;

use crate::commands::{HIDDEN_END, HIDDEN_START};
use crate::ui::{ChatView, ColorTag};

/// Shown in place of content the user loaded for the model's benefit.
pub const HIDDEN_PLACEHOLDER: &str = "[loaded content hidden]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub sender: String,
    pub text: String,
    pub color: ColorTag,
}

#[derive(Debug)]
pub struct TranscriptView {
    entries: Vec<TranscriptEntry>,
    input_enabled: bool,
    /// Lines scrolled up from the bottom; 0 follows new messages.
    scroll_from_bottom: u16,
}

impl Default for TranscriptView {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            input_enabled: true,
            scroll_from_bottom: 0,
        }
    }
}

impl TranscriptView {
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    pub fn scroll_from_bottom(&self) -> u16 {
        self.scroll_from_bottom
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(lines);
    }

    /// Keeps the scroll position inside the content once its height is known.
    pub fn clamp_scroll(&mut self, max: u16) {
        self.scroll_from_bottom = self.scroll_from_bottom.min(max);
    }

    fn push(&mut self, sender: &str, text: String, color: ColorTag) {
        self.entries.push(TranscriptEntry {
            sender: sender.to_string(),
            text,
            color,
        });
        self.scroll_from_bottom = 0;
    }
}

impl ChatView for TranscriptView {
    fn append_user(&mut self, sender: &str, text: &str, color: ColorTag) {
        self.push(sender, text.to_string(), color);
    }

    fn append_assistant(&mut self, sender: &str, text: &str, color: ColorTag) {
        self.push(sender, elide_hidden_sections(text).into_owned(), color);
    }

    fn append_system(&mut self, sender: &str, text: &str, color: ColorTag) {
        self.push(sender, text.to_string(), color);
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.scroll_from_bottom = 0;
    }
}

/// Replaces the hidden block with a placeholder. Markers count only on a
/// line of their own; the block runs from the first start line to the last
/// end line after it, so marker text inside the dump cannot close it early.
/// An unterminated block is left as is.
pub fn elide_hidden_sections(text: &str) -> Cow<'_, str> {
    let Some(start) = marker_lines(text, HIDDEN_START).next() else {
        return Cow::Borrowed(text);
    };
    let Some(end) = marker_lines(text, HIDDEN_END)
        .filter(|&at| at > start)
        .last()
    else {
        return Cow::Borrowed(text);
    };

    let mut out = String::with_capacity(start + HIDDEN_PLACEHOLDER.len() + text.len() - end);
    out.push_str(&text[..start]);
    out.push_str(HIDDEN_PLACEHOLDER);
    out.push_str(&text[end + HIDDEN_END.len()..]);
    Cow::Owned(out)
}

/// Byte offsets where `marker` fills a whole line.
fn marker_lines<'a>(text: &'a str, marker: &'a str) -> impl Iterator<Item = usize> + 'a {
    text.match_indices(marker).map(|(at, _)| at).filter(move |&at| {
        let line_start = at == 0 || text[..at].ends_with('\n');
        let rest = &text[at + marker.len()..];
        line_start && (rest.is_empty() || rest.starts_with('\n') || rest.starts_with("\r\n"))
    })
}

/// Greedy word wrap by display width. Words wider than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_width = 0;

        for word in paragraph.split(' ') {
            let word_width: usize = word.chars().map(char_width).sum();
            let gap = usize::from(!line.is_empty());

            if line_width + gap + word_width <= width {
                if gap == 1 {
                    line.push(' ');
                }
                line.push_str(word);
                line_width += gap + word_width;
                continue;
            }

            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                line_width = 0;
            }
            for ch in word.chars() {
                let w = char_width(ch);
                if line_width + w > width && !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                    line_width = 0;
                }
                line.push(ch);
                line_width += w;
            }
        }
        lines.push(line);
    }
    lines
}

fn char_width(ch: char) -> usize {
    ch.width().unwrap_or(0)
}
