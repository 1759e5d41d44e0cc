//! ISI alignments: `~e.N` markers inside the graph text.
//!
//! ```text
//! (e / establish-01~e.0
//!    :ARG1 (m / model~e.1
//!       :mod~e.2 (i / innovate-01)))
//! ```
//!
//! A marker belongs to the token right before it. On a concept or variable it
//! aligns the enclosing node; on a constant or a variable reference it aligns
//! that child; on a role it aligns the edge of that role. The scan walks the
//! same tokens the graph parser consumed, keeping the 1-indexed path of the
//! node it is inside.

use amrkit_core::alignment::Notation;

use super::{
    AlignmentOptions, ParsedLine, Path, RawAlignment, RawTarget, check_range, parse_token_list,
};
use crate::{
    error::{Diagnostic, ErrorCode},
    span::Span,
    tokens::{PositionedToken, Token},
};

/// A node being scanned: its path and how many children it has so far.
struct Frame {
    path: Vec<u32>,
    children: u32,
}

impl Frame {
    fn current_child(&self) -> Vec<u32> {
        let mut path = self.path.clone();
        path.push(self.children);
        path
    }
}

/// What the last significant token was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Nothing,
    /// Variable, `/`, or concept of the innermost open node.
    Instance,
    Role,
    /// A constant or a variable reference.
    Value,
    Close,
}

/// Reads the token indices of a marker: `~e.1,2` or `~3`.
pub fn parse_marker(marker: &str) -> Option<Vec<usize>> {
    let body = marker.strip_prefix('~')?;
    let indices = body.strip_prefix("e.").unwrap_or(body);
    parse_token_list(indices)
}

fn misplaced(text: &str, span: Span) -> Diagnostic {
    Diagnostic::error(format!("alignment marker `{text}` follows nothing it can align"))
        .with_code(ErrorCode::E300)
        .with_label(span, "misplaced marker")
        .with_help("put markers right after a concept, a constant, or a role")
}

/// Scans graph tokens for markers.
///
/// `tokens` must be a graph the structural parser accepted.
pub fn scan(tokens: &[PositionedToken<'_>], options: &AlignmentOptions) -> ParsedLine {
    let mut line = ParsedLine::default();
    let mut stack: Vec<Frame> = Vec::new();
    let mut anchor = Anchor::Nothing;

    for token in tokens {
        match token.token {
            Token::LeftParen => {
                let path = stack.last().map_or_else(|| vec![1], Frame::current_child);
                stack.push(Frame { path, children: 0 });
                anchor = Anchor::Instance;
            }
            Token::RightParen => {
                stack.pop();
                anchor = Anchor::Close;
            }
            Token::Slash => anchor = Anchor::Instance,
            Token::Symbol(_) | Token::StringLiteral(_) => {
                // The symbol right after `(` or `/` names the node itself.
                if anchor != Anchor::Instance {
                    anchor = Anchor::Value;
                }
            }
            Token::Role(_) => {
                if let Some(frame) = stack.last_mut() {
                    frame.children += 1;
                }
                anchor = Anchor::Role;
            }
            Token::Alignment(text) => {
                let target = match (anchor, stack.last()) {
                    (Anchor::Instance, Some(frame)) => RawTarget::Node(Path::new(frame.path.clone())),
                    (Anchor::Value, Some(frame)) => RawTarget::Node(Path::new(frame.current_child())),
                    (Anchor::Role, Some(frame)) => RawTarget::Edge(Path::new(frame.current_child())),
                    _ => {
                        line.diagnostics.push(misplaced(text, token.span));
                        continue;
                    }
                };
                let Some(indices) = parse_marker(text) else {
                    line.diagnostics.push(
                        Diagnostic::error(format!("malformed alignment marker `{text}`"))
                            .with_code(ErrorCode::E300)
                            .with_label(token.span, ErrorCode::E300.description())
                            .with_help("markers are written `~e.1` or `~e.1,2`"),
                    );
                    continue;
                };
                if let Err(diagnostic) = check_range(&indices, options, text, token.span) {
                    line.diagnostics.push(diagnostic);
                    continue;
                }
                line.alignments.push(RawAlignment {
                    notation: Notation::Isi,
                    tokens: indices,
                    targets: vec![target],
                    text: text.to_string(),
                    span: token.span,
                });
            }
            Token::Comment(_) | Token::Whitespace | Token::Newline => {}
        }
    }

    line
}
