//! Splitting a corpus into AMR blocks.
//!
//! A corpus is a sequence of blocks separated by one or more blank lines. Each
//! block starts with `#` comment lines (some of which carry `::key value`
//! metadata) followed by the graph text:
//!
//! ```text
//! # ::id ex.1
//! # ::tok The dog chased the cat
//! (c / chase-01
//!    :ARG0 (d / dog)
//!    :ARG1 (c2 / cat))
//! ```
//!
//! [`blocks`] returns a lazy iterator; nothing is parsed beyond line
//! classification, so a malformed block never affects its neighbours.

use crate::span::Span;

/// A `#` line from the head of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentLine<'src> {
    text: &'src str,
    span: Span,
}

impl<'src> CommentLine<'src> {
    /// The line body after the leading `#`.
    pub fn text(&self) -> &'src str {
        self.text
    }

    /// Span of [`text`](Self::text) in the source.
    pub fn span(&self) -> Span {
        self.span
    }
}

/// The raw pieces of one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock<'src> {
    index: usize,
    span: Span,
    text: &'src str,
    comments: Vec<CommentLine<'src>>,
    graph: &'src str,
    graph_offset: usize,
}

impl<'src> RawBlock<'src> {
    /// 0-based position of the block in the corpus.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// The whole block text.
    pub fn text(&self) -> &'src str {
        self.text
    }

    pub fn comments(&self) -> &[CommentLine<'src>] {
        &self.comments
    }

    /// Graph text: from the first non-comment line to the end of the block.
    /// Empty when the block has only comments.
    pub fn graph(&self) -> &'src str {
        self.graph
    }

    /// Absolute offset of [`graph`](Self::graph) in the source.
    pub fn graph_offset(&self) -> usize {
        self.graph_offset
    }
}

/// Iterator over the blocks of a corpus. Cloning restarts from the clone point.
#[derive(Debug, Clone)]
pub struct Blocks<'src> {
    source: &'src str,
    position: usize,
    index: usize,
}

/// Splits `source` into blocks.
pub fn blocks(source: &str) -> Blocks<'_> {
    Blocks {
        source,
        position: 0,
        index: 0,
    }
}

/// A line with its absolute start offset, without the line terminator.
struct Line<'src> {
    start: usize,
    text: &'src str,
    /// Offset just past the terminator.
    next: usize,
}

fn next_line(source: &str, start: usize) -> Option<Line<'_>> {
    if start >= source.len() {
        return None;
    }
    let rest = &source[start..];
    let (raw, next) = match rest.find('\n') {
        Some(i) => (&rest[..i], start + i + 1),
        None => (rest, source.len()),
    };
    let text = raw.strip_suffix('\r').unwrap_or(raw);
    Some(Line { start, text, next })
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

impl<'src> Iterator for Blocks<'src> {
    type Item = RawBlock<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        // Skip the blank-line separator.
        let first = loop {
            let line = next_line(self.source, self.position)?;
            if !is_blank(line.text) {
                break line;
            }
            self.position = line.next;
        };

        let block_start = first.start;
        let mut block_end = first.start + first.text.len();
        let mut comments = Vec::new();
        let mut graph_start = None;
        let mut cursor = Some(first);

        while let Some(line) = cursor {
            if is_blank(line.text) {
                break;
            }
            block_end = line.start + line.text.len();

            if graph_start.is_none() {
                let trimmed = line.text.trim_start();
                if let Some(body) = trimmed.strip_prefix('#') {
                    let body_start = line.start + (line.text.len() - trimmed.len()) + 1;
                    comments.push(CommentLine {
                        text: body,
                        span: Span::new(body_start..body_start + body.len()),
                    });
                } else {
                    graph_start = Some(line.start);
                }
            }

            self.position = line.next;
            cursor = next_line(self.source, line.next);
        }

        let graph_offset = graph_start.unwrap_or(block_end);
        let block = RawBlock {
            index: self.index,
            span: Span::new(block_start..block_end),
            text: &self.source[block_start..block_end],
            comments,
            graph: &self.source[graph_offset..block_end],
            graph_offset,
        };
        self.index += 1;
        Some(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_blank_lines() {
        let source = "# ::id a\n(a / one)\n\n\n# ::id b\n(b / two)\n";
        let found: Vec<_> = blocks(source).collect();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].index(), 0);
        assert_eq!(found[0].graph(), "(a / one)");
        assert_eq!(found[1].index(), 1);
        assert_eq!(found[1].graph(), "(b / two)");
        assert_eq!(found[1].comments()[0].text(), " ::id b");
    }

    #[test]
    fn test_absolute_offsets() {
        let source = "\n# c\n(x / y)";
        let block = blocks(source).next().unwrap();

        assert_eq!(block.span(), Span::new(1..12));
        assert_eq!(block.graph_offset(), 5);
        assert_eq!(&source[block.graph_offset()..], "(x / y)");

        let comment = block.comments()[0];
        assert_eq!(&source[comment.span().range()], " c");
    }

    #[test]
    fn test_crlf_input() {
        let source = "# ::id a\r\n(a / one\r\n   :mod (b / two))\r\n\r\n(c / three)\r\n";
        let found: Vec<_> = blocks(source).collect();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].comments()[0].text(), " ::id a");
        assert_eq!(found[0].graph(), "(a / one\r\n   :mod (b / two))");
        assert_eq!(found[1].graph(), "(c / three)");
    }

    #[test]
    fn test_whitespace_only_lines_separate() {
        let source = "(a / one)\n   \t \n(b / two)";
        assert_eq!(blocks(source).count(), 2);
    }

    #[test]
    fn test_comment_only_block() {
        let source = "# ::id x\n# ::snt nothing here";
        let block = blocks(source).next().unwrap();

        assert_eq!(block.comments().len(), 2);
        assert!(block.graph().is_empty());
    }

    #[test]
    fn test_comments_after_graph_stay_in_graph() {
        let source = "(a / one # trailing\n# note\n :mod (b / two))";
        let block = blocks(source).next().unwrap();

        assert!(block.comments().is_empty());
        assert_eq!(block.graph(), source);
    }

    #[test]
    fn test_restartable() {
        let source = "(a / one)\n\n(b / two)";
        let mut iter = blocks(source);
        iter.next();
        let restart = iter.clone();

        assert_eq!(iter.next().map(|b| b.graph()), Some("(b / two)"));
        assert_eq!(restart.count(), 1);
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(blocks("").count(), 0);
        assert_eq!(blocks("\n\n  \n").count(), 0);
    }
}
