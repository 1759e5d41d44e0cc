//! Tokens of AMR graph text.

use std::fmt;

use crate::span::Span;

/// A lexical token of graph text.
///
/// Text-carrying variants borrow from the source and keep it verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'src> {
    LeftParen,
    RightParen,
    Slash,
    /// `:ARG0`, `:mod`, `:op1`; includes the leading colon.
    Role(&'src str),
    /// Variables, concepts, and unquoted constants (`b`, `boy`, `-`, `5`).
    Symbol(&'src str),
    /// `"New York"`, quotes and escapes kept as written.
    StringLiteral(&'src str),
    /// ISI alignment marker such as `~e.1,2`; includes the `~`.
    Alignment(&'src str),
    /// `# ...` up to the end of the line, without the `#`.
    Comment(&'src str),
    Whitespace,
    Newline,
}

impl Token<'_> {
    /// Tokens with no structural meaning for the graph grammar.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            Token::Whitespace | Token::Newline | Token::Comment(_) | Token::Alignment(_)
        )
    }
}

/// A token with its absolute source span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionedToken<'src> {
    pub token: Token<'src>,
    pub span: Span,
}

impl<'src> PositionedToken<'src> {
    pub fn new(token: Token<'src>, span: Span) -> Self {
        Self { token, span }
    }
}

impl<'src> std::ops::Deref for PositionedToken<'src> {
    type Target = Token<'src>;

    fn deref(&self) -> &Self::Target {
        &self.token
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Slash => write!(f, "/"),
            Token::Role(text)
            | Token::Symbol(text)
            | Token::StringLiteral(text)
            | Token::Alignment(text) => write!(f, "{text}"),
            Token::Comment(text) => write!(f, "#{text}"),
            Token::Whitespace => write!(f, " "),
            Token::Newline => writeln!(f),
        }
    }
}

impl fmt::Display for PositionedToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.token.fmt(f)
    }
}
