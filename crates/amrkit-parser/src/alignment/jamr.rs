//! JAMR alignments: `span|path(+path)*`.
//!
//! ```text
//! # ::alignments 0-1|0.0 1-2|0+0.1
//! ```
//!
//! Spans are `a-b`, `a,b,c`, or `a`. Paths are 0-indexed from the root. The
//! same span syntax appears in the span column of `::node` and `::edge` lines.

use std::ops::Range;

use amrkit_core::alignment::Notation;

use super::{
    AlignmentOptions, ParsedLine, Path, RawAlignment, RawTarget, SpanEnd, check_range, items,
    malformed_path, malformed_span, parse_token_list,
};
use crate::{error::Diagnostic, metadata::MetadataEntry, span::Span};

/// Longest `a-b` range accepted. Longer ranges are malformed spans.
pub const MAX_SPAN_TOKENS: usize = 1 << 16;

/// Reads a token span, or `None` when it is malformed.
///
/// A range must not be empty: `3-3` is rejected when the end is exclusive.
pub fn parse_span(text: &str, end: SpanEnd) -> Option<Vec<usize>> {
    if text.contains('-') {
        let range = span_range(text, end).filter(|range| range.len() <= MAX_SPAN_TOKENS)?;
        return Some(range.collect());
    }
    parse_token_list(text)
}

/// The tokens of an `a-b` span as a half-open range.
fn span_range(text: &str, end: SpanEnd) -> Option<Range<usize>> {
    let (start, stop) = text.split_once('-')?;
    let start = parse_index(start)?;
    let stop = parse_index(stop)?;
    match end {
        SpanEnd::Exclusive if start < stop => Some(start..stop),
        SpanEnd::Inclusive if start <= stop => Some(start..stop.checked_add(1)?),
        _ => None,
    }
}

fn parse_index(text: &str) -> Option<usize> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Reads a span column and checks its range.
pub(crate) fn read_span(
    text: &str,
    span: Span,
    options: &AlignmentOptions,
) -> Result<Vec<usize>, Diagnostic> {
    // Range bounds are checked before the range is expanded
    if let Some(range) = span_range(text, options.jamr_span_end) {
        check_range(&[range.end - 1], options, text, span)?;
    }
    let tokens = parse_span(text, options.jamr_span_end).ok_or_else(|| {
        malformed_span(text, span).with_help("JAMR spans are written `0-2`, `0,1`, or `0`")
    })?;
    check_range(&tokens, options, text, span)?;
    Ok(tokens)
}

/// Parses one `span|path(+path)*` item.
///
/// # Errors
///
/// E300 for a bad span, E302 for a bad path, E301 for a token past the end of
/// `::tok`.
pub fn parse_item(
    text: &str,
    span: Span,
    options: &AlignmentOptions,
) -> Result<RawAlignment, Diagnostic> {
    let Some((span_part, paths_part)) = text.split_once('|') else {
        return Err(malformed_span(text, span).with_help("write JAMR alignments as `span|path`"));
    };

    let tokens = read_span(span_part, span, options)?;
    let targets = paths_part
        .split('+')
        .map(|path| Path::parse(path).map(RawTarget::Node))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| malformed_path(text, span))?;

    Ok(RawAlignment {
        notation: Notation::Jamr,
        tokens,
        targets,
        text: text.to_string(),
        span,
    })
}

/// Reads every item of an `::alignments` line.
pub fn parse_line(entry: &MetadataEntry, options: &AlignmentOptions) -> ParsedLine {
    let mut line = ParsedLine::default();
    for (text, span) in items(entry.value(), entry.span().start()) {
        match parse_item(text, span, options) {
            Ok(alignment) => line.alignments.push(alignment),
            Err(diagnostic) => line.diagnostics.push(diagnostic),
        }
    }
    line
}
