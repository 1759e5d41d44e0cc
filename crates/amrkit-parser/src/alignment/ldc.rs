//! LDC alignments: `token-path[.r]`.
//!
//! ```text
//! # ::alignments 0-1.1 1-1 1-1.1.r
//! ```
//!
//! Paths are 1-indexed from the root. A trailing `.r` addresses the edge
//! entering the node at the path instead of the node.

use amrkit_core::alignment::Notation;

use super::{
    AlignmentOptions, LDC_EDGE_SUFFIX, ParsedLine, Path, RawAlignment, RawTarget, check_range,
    items, malformed_path, malformed_span, parse_token_list,
};
use crate::{error::Diagnostic, metadata::MetadataEntry, span::Span};

/// Parses one `token-path[.r]` item.
///
/// # Errors
///
/// E300 for a bad token part, E302 for a bad path, E301 for a token past the
/// end of `::tok`.
pub fn parse_item(
    text: &str,
    span: Span,
    options: &AlignmentOptions,
) -> Result<RawAlignment, Diagnostic> {
    let Some((token_part, path_part)) = text.split_once('-') else {
        return Err(malformed_span(text, span).with_help("write LDC alignments as `token-path`"));
    };

    let tokens = parse_token_list(token_part).ok_or_else(|| malformed_span(text, span))?;
    check_range(&tokens, options, text, span)?;

    let target = match path_part
        .strip_suffix(LDC_EDGE_SUFFIX)
        .and_then(|rest| rest.strip_suffix('.'))
    {
        Some(node_path) => Path::parse(node_path).map(RawTarget::Edge),
        None => Path::parse(path_part).map(RawTarget::Node),
    }
    .ok_or_else(|| malformed_path(text, span))?;

    Ok(RawAlignment {
        notation: Notation::Ldc,
        tokens,
        targets: vec![target],
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
