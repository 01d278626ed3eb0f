//! Plain searchable text from note content.

use crate::domain::NoteType;
use regex::Regex;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern"));
static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("space pattern"));

/// Extracts the text indexed for a note's content.
///
/// Text and book notes hold HTML: tags become spaces and entities are
/// decoded. Code notes are indexed verbatim. Everything else is indexed by
/// title only, so this returns an empty string.
pub fn extract_text(note_type: NoteType, mime: &str, content: &[u8]) -> String {
    match note_type {
        NoteType::Text | NoteType::Book => strip_html(&String::from_utf8_lossy(content)),
        NoteType::Code => String::from_utf8_lossy(content).into_owned(),
        _ if mime.starts_with("text/") && mime != "text/html" => {
            String::from_utf8_lossy(content).into_owned()
        }
        _ => String::new(),
    }
}

/// Removes tags, decodes entities and collapses whitespace.
pub fn strip_html(html: &str) -> String {
    let without_tags = TAG_RE.replace_all(html, " ");
    let decoded = html_escape::decode_html_entities(&without_tags);
    SPACE_RE.replace_all(decoded.trim(), " ").into_owned()
}
