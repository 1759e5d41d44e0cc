//! `# ::key value` metadata lines.
//!
//! A comment line whose body starts with `::` carries one or more key/value
//! pairs. LDC-style corpora pack several pairs on one line:
//!
//! ```text
//! # ::id bolt12_07_4800.1 ::date 2012-12-19T12:53:14 ::annotator SDL-AMR-09
//! ```
//!
//! Pairs are split at a `::` preceded by whitespace. The JAMR graph keys
//! (`node`, `edge`, `root`) are the exception: their value is the whole rest of
//! the line, tab-separated columns included.

use crate::{blocks::CommentLine, span::Span};

/// Keys whose value always runs to the end of the line.
const WHOLE_LINE_KEYS: [&str; 3] = ["node", "edge", "root"];

/// One `::key value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEntry {
    key: String,
    value: String,
    span: Span,
}

impl MetadataEntry {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The value, trimmed. Empty for flag-like keys such as `::preferred`.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Span of the value in the source (or of the key when the value is empty).
    pub fn span(&self) -> Span {
        self.span
    }
}

/// The metadata of a block, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<MetadataEntry>,
}

impl Metadata {
    pub fn entries(&self) -> &[MetadataEntry] {
        &self.entries
    }

    /// The first entry for `key`.
    pub fn entry(&self, key: &str) -> Option<&MetadataEntry> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    /// The value of the first entry for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entry(key).map(MetadataEntry::value)
    }

    /// Every entry for `key`, in order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a MetadataEntry> + 'a {
        self.entries.iter().filter(move |entry| entry.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entry(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parses the comment lines of a block.
///
/// Returns the metadata and the remaining opaque comments (their text after
/// `#`, trimmed).
pub fn parse_comments(comments: &[CommentLine<'_>]) -> (Metadata, Vec<String>) {
    let mut metadata = Metadata::default();
    let mut opaque = Vec::new();

    for comment in comments {
        match parse_line(comment) {
            Some(entries) => metadata.entries.extend(entries),
            None => opaque.push(comment.text().trim().to_string()),
        }
    }

    (metadata, opaque)
}

/// Parses one comment line, or returns `None` if it carries no metadata.
pub fn parse_line(comment: &CommentLine<'_>) -> Option<Vec<MetadataEntry>> {
    let text = comment.text();
    let body = text.trim_start();
    if !body.starts_with("::") {
        return None;
    }

    let mut offset = comment.span().start() + (text.len() - body.len());
    let mut rest = body;
    let mut entries = Vec::new();

    while let Some(after_marker) = rest.strip_prefix("::") {
        offset += 2;
        let key_len = after_marker
            .find(char::is_whitespace)
            .unwrap_or(after_marker.len());
        let key = &after_marker[..key_len];
        let tail = &after_marker[key_len..];
        let tail_offset = offset + key_len;

        let value_len = if WHOLE_LINE_KEYS.contains(&key) {
            tail.len()
        } else {
            next_pair(tail).unwrap_or(tail.len())
        };
        let raw_value = &tail[..value_len];

        if !key.is_empty() {
            let leading = raw_value.len() - raw_value.trim_start().len();
            let value = raw_value.trim();
            let span = if value.is_empty() {
                Span::new(offset..tail_offset)
            } else {
                let start = tail_offset + leading;
                Span::new(start..start + value.len())
            };
            entries.push(MetadataEntry {
                key: key.to_string(),
                value: value.to_string(),
                span,
            });
        }

        rest = &tail[value_len..];
        offset = tail_offset + value_len;
        let trimmed = rest.trim_start();
        offset += rest.len() - trimmed.len();
        rest = trimmed;
    }

    Some(entries)
}

/// Position of the next `::` that follows whitespace.
fn next_pair(tail: &str) -> Option<usize> {
    tail.match_indices("::")
        .map(|(i, _)| i)
        .find(|&i| tail[..i].ends_with(char::is_whitespace))
}
