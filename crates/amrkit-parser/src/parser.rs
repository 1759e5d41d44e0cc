//! Parser for AMR graph tokens.
//!
//! This module turns the token stream from the [`lexer`](super::lexer) into the
//! syntax tree of [`parser_types`](super::parser_types):
//!
//! ```text
//! graph  := node
//! node   := "(" variable "/" concept (role target)* ")"
//! target := node | string | symbol
//! ```
//!
//! Whitespace, comments, and ISI alignment markers are trivia here; the ISI
//! reader scans the markers separately. The public entry point is
//! [`parse_graph`].

use winnow::{
    Parser as _,
    combinator::{preceded, repeat},
    error::{AddContext, ContextError, ErrMode},
    stream::{Stream, TokenSlice},
    token::any,
};

use crate::{
    error::{Diagnostic, ErrorCode, Result},
    parser_types::{NodeSyntax, Relation, Target},
    span::{Span, Spanned},
    tokens::{PositionedToken, Token},
};

/// Context type for parser errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Context {
    /// Description of what was expected
    Label(&'static str),
    /// Remaining token count (`eof_offset()`) where the failing construct began
    StartOffset(usize),
    /// A specific error code chosen by the parser
    Code(ErrorCode),
}

type Input<'src> = TokenSlice<'src, PositionedToken<'src>>;
type IResult<O> = std::result::Result<O, ErrMode<ContextError<Context>>>;

/// Build a Cut error carrying `contexts`.
fn cut_error(input: &Input<'_>, contexts: [Context; 2]) -> ErrMode<ContextError<Context>> {
    let checkpoint = input.checkpoint();
    let error = contexts
        .into_iter()
        .fold(ContextError::new(), |error, context| {
            error.add_context(input, &checkpoint, context)
        });
    ErrMode::Cut(error)
}

fn error_code(input: &Input<'_>, code: ErrorCode, start: usize) -> ErrMode<ContextError<Context>> {
    cut_error(input, [Context::Code(code), Context::StartOffset(start)])
}

fn expected(input: &Input<'_>, label: &'static str, start: usize) -> ErrMode<ContextError<Context>> {
    cut_error(input, [Context::Label(label), Context::StartOffset(start)])
}

/// Parse one trivia token (whitespace, newline, comment, alignment marker)
fn trivia<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| token.is_trivia())
        .void()
        .parse_next(input)
}

/// Parse zero or more trivia tokens
fn trivia0<'src>(input: &mut Input<'src>) -> IResult<()> {
    repeat(0.., trivia).parse_next(input)
}

/// Skip trivia and peek at the next significant token.
fn peek_significant<'src>(input: &mut Input<'src>) -> IResult<Option<&'src PositionedToken<'src>>> {
    trivia0.parse_next(input)?;
    Ok(input.peek_token())
}

fn left_paren<'src>(input: &mut Input<'src>) -> IResult<Span> {
    any.verify_map(|token: &PositionedToken<'_>| {
        matches!(token.token, Token::LeftParen).then_some(token.span)
    })
    .context(Context::Label("`(`"))
    .parse_next(input)
}

/// Parse `( variable / concept relations* )`
fn node<'src>(input: &mut Input<'src>) -> IResult<NodeSyntax<'src>> {
    let start = input.eof_offset();
    let open = left_paren.parse_next(input)?;

    let variable = match peek_significant(input)? {
        Some(PositionedToken {
            token: Token::Symbol(name),
            span,
        }) => {
            input.next_token();
            Spanned::new(*name, *span)
        }
        Some(_) => return Err(expected(input, "variable", start)),
        None => return Err(error_code(input, ErrorCode::E101, start)),
    };

    match peek_significant(input)? {
        Some(PositionedToken {
            token: Token::Slash,
            ..
        }) => {
            input.next_token();
        }
        Some(PositionedToken {
            token: Token::RightParen,
            ..
        }) => return Err(error_code(input, ErrorCode::E106, start)),
        Some(_) => return Err(expected(input, "`/`", start)),
        None => return Err(error_code(input, ErrorCode::E101, start)),
    }

    let concept = match peek_significant(input)? {
        Some(PositionedToken {
            token: Token::Symbol(text) | Token::StringLiteral(text),
            span,
        }) => {
            input.next_token();
            Spanned::new(*text, *span)
        }
        Some(PositionedToken {
            token: Token::RightParen | Token::Role(_),
            ..
        }) => return Err(error_code(input, ErrorCode::E106, start)),
        Some(_) => return Err(expected(input, "concept", start)),
        None => return Err(error_code(input, ErrorCode::E101, start)),
    };

    let mut relations = Vec::new();
    let close = loop {
        match peek_significant(input)? {
            Some(PositionedToken {
                token: Token::RightParen,
                span,
            }) => {
                input.next_token();
                break *span;
            }
            Some(PositionedToken {
                token: Token::Role(role),
                span,
            }) => {
                let role_start = input.eof_offset();
                input.next_token();
                let target = target(input, role_start)?;
                relations.push(Relation {
                    role: Spanned::new(*role, *span),
                    target,
                });
            }
            Some(_) => return Err(expected(input, "role or `)`", start)),
            None => return Err(error_code(input, ErrorCode::E101, start)),
        }
    };

    Ok(NodeSyntax {
        variable,
        concept,
        relations,
        span: open.union(close),
    })
}

/// Parse the target of a role: a node, a string, or a symbol
fn target<'src>(input: &mut Input<'src>, role_start: usize) -> IResult<Target<'src>> {
    match peek_significant(input)? {
        Some(PositionedToken {
            token: Token::LeftParen,
            ..
        }) => node(input).map(Target::Node),
        Some(PositionedToken {
            token: Token::StringLiteral(text),
            span,
        }) => {
            input.next_token();
            Ok(Target::String(Spanned::new(*text, *span)))
        }
        Some(PositionedToken {
            token: Token::Symbol(text),
            span,
        }) => {
            input.next_token();
            Ok(Target::Symbol(Spanned::new(*text, *span)))
        }
        Some(PositionedToken {
            token: Token::RightParen | Token::Role(_),
            ..
        }) => Err(error_code(input, ErrorCode::E102, role_start)),
        Some(_) => Err(expected(input, "node, constant, or variable", role_start)),
        None => Err(error_code(input, ErrorCode::E101, role_start)),
    }
}

/// Convert winnow errors to a diagnostic.
///
/// The span comes from the token the parser stopped at; `StartOffset` context
/// gives the token where the failing construct began.
fn convert_error(
    error: ErrMode<ContextError<Context>>,
    tokens: &[PositionedToken<'_>],
    current_remaining: usize,
) -> Diagnostic {
    let context = match error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e,
        ErrMode::Incomplete(_) => ContextError::new(),
    };

    let code = context.context().find_map(|ctx| match ctx {
        Context::Code(code) => Some(*code),
        _ => None,
    });
    let start_token = context
        .context()
        .find_map(|ctx| match ctx {
            Context::StartOffset(n) => Some(*n),
            _ => None,
        })
        .and_then(|remaining| tokens.get(tokens.len() - remaining));
    let labels: Vec<&str> = context
        .context()
        .filter_map(|ctx| match ctx {
            Context::Label(label) => Some(*label),
            _ => None,
        })
        .collect();

    let end_offset = tokens.len() - current_remaining;
    let found = tokens[end_offset..].iter().find(|t| !t.is_trivia());

    let Some(found) = found else {
        let last_span = tokens
            .iter()
            .rev()
            .find(|t| !t.is_trivia())
            .map(|t| t.span)
            .unwrap_or_default();
        let mut diag = Diagnostic::error("incomplete input, the graph ends too early")
            .with_code(ErrorCode::E101)
            .with_label(last_span, "graph ends here")
            .with_help("close every `(` with a matching `)`");
        if let Some(start) = start_token {
            diag = diag.with_secondary_label(start.span, "unfinished construct starts here");
        }
        return diag;
    };

    match code {
        Some(ErrorCode::E102) => {
            let role = start_token.unwrap_or(found);
            Diagnostic::error(format!("role `{}` has no target", role.token))
                .with_code(ErrorCode::E102)
                .with_label(role.span, "role without target")
                .with_secondary_label(found.span, format!("found `{}` instead", found.token))
                .with_help("follow the role with a node, a constant, or a variable")
        }
        Some(ErrorCode::E106) => {
            let span = start_token
                .map(|start| start.span.union(found.span))
                .unwrap_or(found.span);
            Diagnostic::error("node has no concept")
                .with_code(ErrorCode::E106)
                .with_label(span, "missing concept")
                .with_help("write nodes as `(variable / concept)`")
        }
        _ => {
            let message = if labels.is_empty() {
                format!("unexpected token `{}`", found.token)
            } else {
                format!(
                    "unexpected token `{}`, expected {}",
                    found.token,
                    labels.join(" or ")
                )
            };
            Diagnostic::error(message)
                .with_code(ErrorCode::E100)
                .with_label(found.span, "unexpected token")
                .with_help("check the graph syntax near this token")
        }
    }
}

/// Deepest node nesting a graph may have.
///
/// Parsing and arena building recurse once per level, so deeper graphs are
/// rejected before either runs.
pub const MAX_NESTING: usize = 128;

/// Check that parentheses outside strings balance and nest at most
/// [`MAX_NESTING`] deep.
///
/// # Errors
///
/// Returns an E005 diagnostic for the first `(` past the nesting limit, and an
/// E003 diagnostic for the first stray `)` or, at the end, for the innermost
/// `(` left open.
pub fn check_parentheses(tokens: &[PositionedToken<'_>]) -> Result<()> {
    let mut open: Vec<Span> = Vec::new();

    for token in tokens {
        match token.token {
            Token::LeftParen => {
                open.push(token.span);
                if open.len() > MAX_NESTING {
                    return Err(Diagnostic::error(format!(
                        "graph is nested more than {MAX_NESTING} levels deep"
                    ))
                    .with_code(ErrorCode::E005)
                    .with_label(token.span, "too deep")
                    .with_secondary_label(open[0], "outermost node starts here"));
                }
            }
            Token::RightParen => {
                if open.pop().is_none() {
                    return Err(Diagnostic::error("unbalanced parentheses: stray `)`")
                        .with_code(ErrorCode::E003)
                        .with_label(token.span, "no matching `(`")
                        .with_help("remove the extra `)`"));
                }
            }
            _ => {}
        }
    }

    match open.as_slice() {
        [] => Ok(()),
        [.., innermost] => Err(Diagnostic::error(format!(
            "unbalanced parentheses: {} `(` never closed",
            open.len()
        ))
        .with_code(ErrorCode::E003)
        .with_label(*innermost, "not closed")
        .with_help("add the missing `)`")),
    }
}

/// Parse the graph text of one block.
///
/// # Errors
///
/// Returns a diagnostic for unbalanced parentheses (E003), syntax errors
/// (E100, E101, E102, E106), or content after the root node (E105).
pub fn parse_graph<'src>(
    tokens: &'src [PositionedToken<'src>],
) -> Result<NodeSyntax<'src>> {
    check_parentheses(tokens)?;

    let mut token_slice = TokenSlice::new(tokens);
    let root = preceded(trivia0, node)
        .parse_next(&mut token_slice)
        .map_err(|e| convert_error(e, tokens, token_slice.eof_offset()))?;

    let consumed = tokens.len() - token_slice.eof_offset();
    let mut trailing = tokens[consumed..].iter().filter(|t| !t.is_trivia());
    if let Some(first) = trailing.next() {
        let last = trailing.last().unwrap_or(first);
        return Err(Diagnostic::error("content after the root node")
            .with_code(ErrorCode::E105)
            .with_label(first.span.union(last.span), "trailing content")
            .with_secondary_label(root.span, "root node ends here")
            .with_help("separate graphs with a blank line"));
    }

    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse_tokens(input: &str) -> Vec<PositionedToken<'_>> {
        tokenize(input, 0).expect("Failed to tokenize input")
    }

    #[test]
    fn test_trivia0_skips_markers_and_comments() {
        let tokens = parse_tokens(" ~e.1 # note\n  (");
        let mut slice = TokenSlice::new(&tokens);
        trivia0.parse_next(&mut slice).unwrap();
        assert_eq!(slice.eof_offset(), 1);
    }

    #[test]
    fn test_left_paren() {
        let tokens = parse_tokens("(");
        let mut slice = TokenSlice::new(&tokens);
        assert_eq!(left_paren.parse_next(&mut slice).unwrap(), Span::new(0..1));

        let tokens = parse_tokens("x");
        let mut slice = TokenSlice::new(&tokens);
        assert!(left_paren.parse_next(&mut slice).is_err());
        assert_eq!(slice.eof_offset(), 1);
    }

    #[test]
    fn test_node_spans() {
        let tokens = parse_tokens("(d / dog)");
        let mut slice = TokenSlice::new(&tokens);
        let node = node.parse_next(&mut slice).unwrap();

        assert_eq!(*node.variable.inner(), "d");
        assert_eq!(node.variable.span(), Span::new(1..2));
        assert_eq!(*node.concept.inner(), "dog");
        assert_eq!(node.span, Span::new(0..9));
    }

    #[test]
    fn test_target_kinds() {
        let tokens = parse_tokens("(n / name :op1 \"New\" :op2 x :polarity -)");
        let root = parse_graph(&tokens).unwrap();

        assert!(matches!(root.relations[0].target, Target::String(s) if *s.inner() == "\"New\""));
        assert!(matches!(root.relations[1].target, Target::Symbol(s) if *s.inner() == "x"));
        assert!(matches!(root.relations[2].target, Target::Symbol(s) if *s.inner() == "-"));
    }

    #[test]
    fn test_check_parentheses() {
        assert!(check_parentheses(&parse_tokens("(a / b :c (d / e))")).is_ok());
        assert!(check_parentheses(&parse_tokens("(a / b :name \"(\")")).is_ok());

        let err = check_parentheses(&parse_tokens("(a / b))")).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E003));
        assert_eq!(err.primary_span(), Some(Span::new(7..8)));

        let err = check_parentheses(&parse_tokens("(a / b :c (d / e)")).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E003));
        assert_eq!(err.primary_span(), Some(Span::new(0..1)));
    }

    fn nested(depth: usize) -> String {
        let mut text = String::new();
        for level in 0..depth {
            if level > 0 {
                text.push_str(" :m ");
            }
            text.push_str(&format!("(a{level} / x"));
        }
        text.push_str(&")".repeat(depth));
        text
    }

    #[test]
    fn test_nesting_limit() {
        let text = nested(MAX_NESTING);
        let tokens = parse_tokens(&text);
        assert!(check_parentheses(&tokens).is_ok());

        let text = nested(20_000);
        let tokens = parse_tokens(&text);
        let err = parse_graph(&tokens).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E005));
    }

    #[test]
    fn test_convert_error_at_eof() {
        let tokens = parse_tokens("   ");
        let err = parse_graph(&tokens).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E101));
    }
}
