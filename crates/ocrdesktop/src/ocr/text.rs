//! Text assembly and cleanup.

use super::tsv::WordBox;
use once_cell::sync::Lazy;
use regex::Regex;

static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\r\n]{2,}").expect("valid regex"));
static SPACE_BEFORE_NEWLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\r\n]+\n").expect("valid regex"));
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").expect("valid regex"));

/// Join word boxes into display text.
///
/// Words on the same line are separated by a space; a newline is emitted
/// whenever the page, block, paragraph, or line number changes.
pub fn assemble_text(words: &[WordBox]) -> String {
    let mut text = String::new();
    let mut prev: Option<&WordBox> = None;

    for word in words {
        if let Some(prev) = prev {
            if word.breaks_line_after(prev) {
                text.push('\n');
            } else {
                text.push(' ');
            }
        }
        text.push_str(&word.text);
        prev = Some(word);
    }

    text
}

/// Clean up assembled OCR text: collapse runs of spaces, drop blank lines,
/// and trim surrounding whitespace.
pub fn clean_text(text: &str) -> String {
    let text = MULTI_SPACE.replace_all(text, " ");
    let text = SPACE_BEFORE_NEWLINE.replace_all(&text, "\n");
    let mut text = text.into_owned();
    loop {
        let collapsed = BLANK_LINES.replace_all(&text, "\n").into_owned();
        if collapsed == text {
            break;
        }
        text = collapsed;
    }
    text.trim().to_string()
}
