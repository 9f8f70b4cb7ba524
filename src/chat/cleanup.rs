//! Cleanup pipeline applied to every buffered chunk before it reaches the
//! client.
//!
//! Each stage is a pure `&str -> String` transform and is idempotent on its
//! own. [`cleanup`] runs them in this order:
//!
//! 1. [`strip_tags`]
//! 2. [`unescape_newlines`]
//! 3. [`insert_word_breaks`]
//! 4. [`normalize_emphasis`]
//! 5. [`normalize_ordered_lists`]
//! 6. [`normalize_unordered_lists`]
//! 7. [`collapse_whitespace`]
//!
//! With this order the whole pipeline is idempotent as well:
//! `cleanup(&cleanup(x)) == cleanup(x)`.

use once_cell::sync::Lazy;
use regex::Regex;

static THINK_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<think>(.*?)</think>").expect("valid think regex"));
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static DOUBLE_ASTERISK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid bold regex"));
static DOUBLE_UNDERSCORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"__(.+?)__").expect("valid underscore regex"));
static ORDERED_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[^\S\n]*(\d+)\.[^\S\n]+").expect("valid ordered regex"));
static UNORDERED_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[^\S\n]*[-*][^\S\n]+").expect("valid unordered regex"));
static HORIZONTAL_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\S\n]+").expect("valid space regex"));
static SPACE_AROUND_NEWLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" ?\n ?").expect("valid newline regex"));
static EXCESS_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("valid newline run regex"));

pub const BULLET: &str = "• ";

/// Runs the full pipeline. The result has no leading or trailing
/// whitespace, no double spaces and never more than one blank line.
pub fn cleanup(text: &str) -> String {
    let text = strip_tags(text);
    let text = unescape_newlines(&text);
    let text = insert_word_breaks(&text);
    let text = normalize_emphasis(&text);
    let text = normalize_ordered_lists(&text);
    let text = normalize_unordered_lists(&text);
    collapse_whitespace(&text)
}

/// Keeps the body of `<think>` blocks and drops every other tag's markup.
pub fn strip_tags(text: &str) -> String {
    let unwrapped = THINK_BLOCK.replace_all(text, "${1}");
    ANY_TAG.replace_all(&unwrapped, "").into_owned()
}

/// Turns literal `\n` escape sequences into real newlines.
pub fn unescape_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}

/// Inserts a space between a lowercase and an uppercase letter, and between
/// a letter and a digit in either direction.
pub fn insert_word_breaks(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    let mut prev: Option<char> = None;

    for c in text.chars() {
        if let Some(p) = prev {
            if is_word_break(p, c) {
                out.push(' ');
            }
        }
        out.push(c);
        prev = Some(c);
    }

    out
}

fn is_word_break(prev: char, next: char) -> bool {
    (prev.is_lowercase() && next.is_uppercase())
        || (prev.is_numeric() && next.is_alphabetic())
        || (prev.is_alphabetic() && next.is_numeric())
}

/// Rewrites `**x**` to `*x*` and `__x__` to `_x_` until nothing matches.
pub fn normalize_emphasis(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = DOUBLE_ASTERISK.replace_all(&current, "*${1}*");
        let next = DOUBLE_UNDERSCORE.replace_all(&next, "_${1}_").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// `  12.   item` at the start of a line becomes `12. item`.
pub fn normalize_ordered_lists(text: &str) -> String {
    ORDERED_MARKER.replace_all(text, "${1}. ").into_owned()
}

/// `-` or `*` list markers at the start of a line become a bullet glyph.
pub fn normalize_unordered_lists(text: &str) -> String {
    UNORDERED_MARKER.replace_all(text, BULLET).into_owned()
}

pub fn collapse_whitespace(text: &str) -> String {
    let text = HORIZONTAL_SPACE.replace_all(text, " ");
    let text = SPACE_AROUND_NEWLINE.replace_all(&text, "\n");
    let text = EXCESS_NEWLINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}
