//! Token-to-graph alignments in their native notations.
//!
//! Each notation addresses the graph its own way:
//!
//! | Notation | Written as | Addressing |
//! |---|---|---|
//! | LDC | `# ::alignments 0-1.1 1-1.1.r` | 1-indexed paths, `.r` for edges |
//! | JAMR | `# ::alignments 0-1\|0.0+0.1` | token span, 0-indexed paths |
//! | ISI | `(d / dog~e.1)` | markers inside the graph text |
//!
//! The parsers here only read that surface syntax into [`RawAlignment`]s. The
//! [`normalize`] module resolves them against a canonical graph.

pub mod isi;
pub mod jamr;
pub mod ldc;
pub mod normalize;

use std::fmt;

use amrkit_core::alignment::Notation;

use crate::{
    error::{Diagnostic, ErrorCode},
    metadata::MetadataEntry,
    span::Span,
};

/// Suffix of an LDC path that addresses the edge entering the node.
pub const LDC_EDGE_SUFFIX: &str = "r";

/// Whether the end of a JAMR `a-b` span is part of the span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpanEnd {
    /// `0-2` covers tokens 0 and 1.
    #[default]
    Exclusive,
    /// `0-2` covers tokens 0, 1 and 2.
    Inclusive,
}

/// How JAMR `a-b` spans are read unless configured otherwise.
pub const JAMR_SPAN_END: SpanEnd = SpanEnd::Exclusive;

/// A dotted graph path as written, in the notation's own index base.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path(Vec<u32>);

impl Path {
    pub fn new(segments: Vec<u32>) -> Self {
        Self(segments)
    }

    /// Parses `0.1.2`. Returns `None` for empty segments or non-digits.
    pub fn parse(text: &str) -> Option<Self> {
        text.split('.')
            .map(|segment| {
                if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                segment.parse().ok()
            })
            .collect::<Option<Vec<u32>>>()
            .map(Self)
    }

    pub fn segments(&self) -> &[u32] {
        &self.0
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// What a raw alignment points at, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawTarget {
    /// The node reached by following the path.
    Node(Path),
    /// The last edge traversed when following the path.
    Edge(Path),
    /// A node named by a surface variable or declared metadata id.
    Alias(String),
    /// An edge named by the aliases of its endpoints.
    AliasEdge {
        source: String,
        role: String,
        target: String,
    },
}

/// One alignment item in native addressing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAlignment {
    pub notation: Notation,
    /// 0-indexed token positions.
    pub tokens: Vec<usize>,
    pub targets: Vec<RawTarget>,
    /// The item as written.
    pub text: String,
    pub span: Span,
}

/// Settings shared by the alignment parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignmentOptions {
    pub jamr_span_end: SpanEnd,
    /// Number of `::tok` tokens, when known. Enables the range check.
    pub token_count: Option<usize>,
}

impl Default for AlignmentOptions {
    fn default() -> Self {
        Self {
            jamr_span_end: JAMR_SPAN_END,
            token_count: None,
        }
    }
}

/// Raw alignments read from a line, and one diagnostic per rejected item.
#[derive(Debug, Clone, Default)]
pub struct ParsedLine {
    pub alignments: Vec<RawAlignment>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Reads one `::alignments` metadata entry.
pub type LineParser = fn(&MetadataEntry, &AlignmentOptions) -> ParsedLine;

/// The line parser of a comment-based notation. ISI alignments live in the
/// graph text and have none.
pub fn line_parser(notation: Notation) -> Option<LineParser> {
    match notation {
        Notation::Ldc => Some(ldc::parse_line),
        Notation::Jamr => Some(jamr::parse_line),
        Notation::Isi => None,
    }
}

/// JAMR when any item carries a `|`, LDC otherwise.
pub fn detect_notation(value: &str) -> Notation {
    if value.split_whitespace().any(|item| item.contains('|')) {
        Notation::Jamr
    } else {
        Notation::Ldc
    }
}

/// Whitespace-separated items of `value` with their absolute spans.
pub(crate) fn items(value: &str, offset: usize) -> Vec<(&str, Span)> {
    let mut items = Vec::new();
    let mut start = None;
    for (i, c) in value.char_indices().chain([(value.len(), ' ')]) {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                items.push((&value[s..i], Span::new(offset + s..offset + i)));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    items
}

/// Parses a comma list of token indices such as `1,2`.
pub(crate) fn parse_token_list(text: &str) -> Option<Vec<usize>> {
    text.split(',')
        .map(|part| {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            part.parse().ok()
        })
        .collect()
}

pub(crate) fn malformed_span(text: &str, span: Span) -> Diagnostic {
    Diagnostic::error(format!("malformed token span in alignment `{text}`"))
        .with_code(ErrorCode::E300)
        .with_label(span, ErrorCode::E300.description())
}

pub(crate) fn malformed_path(text: &str, span: Span) -> Diagnostic {
    Diagnostic::error(format!("malformed graph path in alignment `{text}`"))
        .with_code(ErrorCode::E302)
        .with_label(span, ErrorCode::E302.description())
        .with_help("paths are dot-separated numbers such as `1.2.1`")
}

/// Rejects token indices past the end of `::tok`.
pub(crate) fn check_range(
    tokens: &[usize],
    options: &AlignmentOptions,
    text: &str,
    span: Span,
) -> Result<(), Diagnostic> {
    let Some(count) = options.token_count else {
        return Ok(());
    };
    match tokens.iter().find(|&&token| token >= count) {
        Some(token) => Err(Diagnostic::error(format!(
            "token {token} in alignment `{text}` is out of range"
        ))
        .with_code(ErrorCode::E301)
        .with_label(span, ErrorCode::E301.description())
        .with_help(format!("the sentence has {count} tokens, numbered from 0"))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_parse() {
        assert_eq!(Path::parse("1.2.10"), Some(Path::new(vec![1, 2, 10])));
        assert_eq!(Path::parse("0"), Some(Path::new(vec![0])));
        assert_eq!(Path::parse(""), None);
        assert_eq!(Path::parse("1..2"), None);
        assert_eq!(Path::parse("1.a"), None);
        assert_eq!(Path::parse("1.-2"), None);
        assert_eq!(Path::new(vec![0, 1]).to_string(), "0.1");
    }

    #[test]
    fn test_detect_notation() {
        assert_eq!(detect_notation("0-1.1 1-1"), Notation::Ldc);
        assert_eq!(detect_notation("0-1|0.0 1-2|0"), Notation::Jamr);
        assert_eq!(detect_notation(""), Notation::Ldc);
    }

    #[test]
    fn test_line_parser_dispatch() {
        assert!(line_parser(Notation::Ldc).is_some());
        assert!(line_parser(Notation::Jamr).is_some());
        assert!(line_parser(Notation::Isi).is_none());
    }

    #[test]
    fn test_items_spans() {
        let items = items("0-1  1-2\t3-4", 10);
        let texts: Vec<&str> = items.iter().map(|(text, _)| *text).collect();
        assert_eq!(texts, ["0-1", "1-2", "3-4"]);
        assert_eq!(items[1].1, Span::new(15..18));
    }

    #[test]
    fn test_token_list() {
        assert_eq!(parse_token_list("1,2,5"), Some(vec![1, 2, 5]));
        assert_eq!(parse_token_list("3"), Some(vec![3]));
        assert_eq!(parse_token_list("1,,2"), None);
        assert_eq!(parse_token_list("x"), None);
    }

    #[test]
    fn test_check_range() {
        let options = AlignmentOptions {
            token_count: Some(3),
            ..AlignmentOptions::default()
        };
        assert!(check_range(&[0, 2], &options, "", Span::default()).is_ok());
        let err = check_range(&[3], &options, "", Span::default()).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E301));
        assert!(check_range(&[99], &AlignmentOptions::default(), "", Span::default()).is_ok());
    }
}
