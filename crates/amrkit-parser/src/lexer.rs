//! Lexical analyzer for AMR graph text.
//!
//! The lexer converts graph text into a stream of [`Token`]s. It is
//! error-recovering: on a bad character it records a diagnostic, skips one
//! character, and carries on, so one pass reports every lexical problem.
//!
//! Spans are shifted by the offset of the graph text in the corpus, so every
//! token span is absolute.

use winnow::{
    Parser as _,
    combinator::{alt, cut_err, preceded, repeat, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{none_of, take_while},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
    tokens::{PositionedToken, Token},
};

/// Diagnostic information attached to winnow errors via `.context()`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<LexerDiagnostic>>;

fn is_symbol_char(c: char) -> bool {
    !c.is_whitespace() && !c.is_control() && !matches!(c, '(' | ')' | '"' | '~' | '/')
}

fn is_role_char(c: char) -> bool {
    is_symbol_char(c) && c != ':'
}

/// Parse a quoted string, keeping quotes and escapes verbatim.
///
/// Strings do not span lines; a missing closing quote is reported at the end
/// of the line.
fn string_literal<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();

    let content = repeat::<_, _, (), _, _>(
        0..,
        alt((
            preceded('\\', none_of(['\n', '\r'])).void(),
            none_of(['"', '\\', '\n', '\r']).void(),
        )),
    );

    (
        '"',
        cut_err(terminated(content, '"')).context(LexerDiagnostic {
            code: ErrorCode::E001,
            message: "unterminated string literal",
            help: Some("add a closing `\"` before the end of the line"),
            start,
        }),
    )
        .take()
        .map(Token::StringLiteral)
        .parse_next(input)
}

/// Parse `# ...` up to the end of the line.
fn comment<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    preceded('#', take_while(0.., |c: char| c != '\n'))
        .map(Token::Comment)
        .parse_next(input)
}

/// Parse a role such as `:ARG0-of`.
fn role<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    (':', take_while(1.., is_role_char))
        .take()
        .map(Token::Role)
        .parse_next(input)
}

/// Parse an ISI alignment marker such as `~e.1,2` or `~3`.
fn alignment_marker<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    (
        '~',
        take_while(1.., |c: char| {
            c.is_ascii_alphanumeric() || c == '.' || c == ','
        }),
    )
        .take()
        .map(Token::Alignment)
        .parse_next(input)
}

fn symbol<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    take_while(1.., is_symbol_char)
        .verify(|s: &str| !s.starts_with(':'))
        .map(Token::Symbol)
        .parse_next(input)
}

fn punctuation<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt((
        '('.value(Token::LeftParen),
        ')'.value(Token::RightParen),
        '/'.value(Token::Slash),
    ))
    .parse_next(input)
}

/// Parse whitespace (spaces, tabs, carriage returns but not newlines)
fn whitespace<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    take_while(1.., |c: char| c.is_whitespace() && c != '\n')
        .value(Token::Whitespace)
        .parse_next(input)
}

fn newline<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    '\n'.value(Token::Newline).parse_next(input)
}

/// Parse a single token with its span relative to the graph text.
fn positioned_token<'a>(input: &mut Input<'a>) -> IResult<PositionedToken<'a>> {
    let start_pos = input.current_token_start();

    let token = alt((
        string_literal,
        comment,
        role,
        alignment_marker,
        punctuation,
        symbol,
        newline,
        whitespace,
    ))
    .parse_next(input)?;

    let end_pos = input.current_token_start();
    Ok(PositionedToken::new(token, Span::new(start_pos..end_pos)))
}

/// Lexer that accumulates tokens and diagnostics during tokenization.
struct Lexer<'a> {
    offset: usize,
    tokens: Vec<PositionedToken<'a>>,
    diagnostics: DiagnosticCollector,
}

impl<'a> Lexer<'a> {
    fn new(offset: usize) -> Self {
        Self {
            offset,
            tokens: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    fn tokenize(&mut self, mut input: Input<'a>) {
        while !input.is_empty() {
            match positioned_token(&mut input) {
                Ok(mut token) => {
                    token.span = token.span.shift(self.offset);
                    self.tokens.push(token);
                }
                Err(e) => {
                    let error_pos = input.current_token_start();
                    let diagnostic = self.convert_err_mode(e, error_pos);
                    self.diagnostics.emit(diagnostic);

                    if !input.is_empty() {
                        input.next_token();
                    }
                }
            }
        }
    }

    fn finish(self) -> Result<Vec<PositionedToken<'a>>, ParseError> {
        let tokens = self.tokens;
        self.diagnostics.finish().map(|_| tokens)
    }

    /// Convert an ErrMode and error position to a Diagnostic.
    ///
    /// Falls back to E002 (unexpected character) when no context is attached.
    fn convert_err_mode(
        &self,
        err: ErrMode<ContextError<LexerDiagnostic>>,
        error_pos: usize,
    ) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let span = Span::new(*start..error_pos).shift(self.offset);
            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(span, code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        let span = Span::new(error_pos..error_pos.saturating_add(1)).shift(self.offset);
        Diagnostic::error("unexpected character")
            .with_code(ErrorCode::E002)
            .with_label(span, ErrorCode::E002.description())
    }
}

/// Tokenize graph text located at `offset` in the corpus.
///
/// # Errors
///
/// Returns every lexical error of the text in one [`ParseError`].
pub fn tokenize(input: &str, offset: usize) -> Result<Vec<PositionedToken<'_>>, ParseError> {
    let mut lexer = Lexer::new(offset);
    lexer.tokenize(LocatingSlice::new(input));
    lexer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_single_token(input: &str, expected: Token<'_>) {
        let mut located_input = LocatingSlice::new(input);
        let positioned = positioned_token(&mut located_input)
            .unwrap_or_else(|_| panic!("Failed to parse: {input}"));
        assert_eq!(positioned.token, expected);
    }

    fn significant(input: &str) -> Vec<Token<'_>> {
        tokenize(input, 0)
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .filter(|t| !matches!(t, Token::Whitespace | Token::Newline))
            .collect()
    }

    #[test]
    fn test_punctuation() {
        test_single_token("(", Token::LeftParen);
        test_single_token(")", Token::RightParen);
        test_single_token("/", Token::Slash);
    }

    #[test]
    fn test_roles() {
        test_single_token(":ARG0", Token::Role(":ARG0"));
        test_single_token(":ARG0-of", Token::Role(":ARG0-of"));
        test_single_token(":op1", Token::Role(":op1"));
    }

    #[test]
    fn test_symbols() {
        test_single_token("chase-01", Token::Symbol("chase-01"));
        test_single_token("c2", Token::Symbol("c2"));
        test_single_token("-", Token::Symbol("-"));
        test_single_token("+", Token::Symbol("+"));
        test_single_token("5.5", Token::Symbol("5.5"));
        test_single_token("12:30", Token::Symbol("12:30"));
    }

    #[test]
    fn test_string_literals_verbatim() {
        test_single_token("\"York\"", Token::StringLiteral("\"York\""));
        test_single_token("\"\"", Token::StringLiteral("\"\""));
        test_single_token(
            r#""say \"hi\"""#,
            Token::StringLiteral(r#""say \"hi\"""#),
        );
        test_single_token("\"a (b) / c\"", Token::StringLiteral("\"a (b) / c\""));
    }

    #[test]
    fn test_alignment_markers() {
        test_single_token("~e.1,2", Token::Alignment("~e.1,2"));
        test_single_token("~3", Token::Alignment("~3"));
    }

    #[test]
    fn test_comment() {
        test_single_token("# note", Token::Comment(" note"));
    }

    #[test]
    fn test_full_lexing() {
        assert_eq!(
            significant("(c / chase-01~e.2 :ARG0~e.1 (d / dog) :mod \"x\")"),
            [
                Token::LeftParen,
                Token::Symbol("c"),
                Token::Slash,
                Token::Symbol("chase-01"),
                Token::Alignment("~e.2"),
                Token::Role(":ARG0"),
                Token::Alignment("~e.1"),
                Token::LeftParen,
                Token::Symbol("d"),
                Token::Slash,
                Token::Symbol("dog"),
                Token::RightParen,
                Token::Role(":mod"),
                Token::StringLiteral("\"x\""),
                Token::RightParen,
            ]
        );
    }

    #[test]
    fn test_compact_syntax() {
        assert_eq!(
            significant("(b/boy)"),
            [
                Token::LeftParen,
                Token::Symbol("b"),
                Token::Slash,
                Token::Symbol("boy"),
                Token::RightParen,
            ]
        );
    }

    #[test]
    fn test_spans_are_shifted() {
        let tokens = tokenize("(a / b)", 100).unwrap();
        assert_eq!(tokens[0].span, Span::new(100..101));
        assert_eq!(tokens[1].span, Span::new(101..102));
        assert_eq!(tokens.last().unwrap().span, Span::new(106..107));
    }

    #[test]
    fn test_crlf_is_whitespace() {
        let tokens = tokenize("(a / b\r\n)", 0).unwrap();
        assert!(tokens.iter().any(|t| t.token == Token::Newline));
        assert_eq!(tokens.last().unwrap().token, Token::RightParen);
    }

    mod lexer_error_tests {
        use super::*;

        #[test]
        fn test_unterminated_string() {
            let err = tokenize("(n / name :op1 \"New York)\n", 10).unwrap_err();
            let diag = &err.diagnostics()[0];

            assert_eq!(diag.code(), Some(ErrorCode::E001));
            let span = diag.labels()[0].span();
            assert_eq!(span.start(), 25);
        }

        #[test]
        fn test_stray_tilde() {
            let err = tokenize("(a / b ~ )", 0).unwrap_err();
            let diag = &err.diagnostics()[0];

            assert_eq!(diag.code(), Some(ErrorCode::E002));
            assert_eq!(diag.labels()[0].span(), Span::new(7..8));
        }

        #[test]
        fn test_multiple_errors_collected() {
            let err = tokenize("(a ~ / b ~ )", 0).unwrap_err();
            assert_eq!(err.diagnostics().len(), 2);
        }

        #[test]
        fn test_lone_colon() {
            let err = tokenize("(a / b : c)", 0).unwrap_err();
            assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E002));
        }
    }
}
