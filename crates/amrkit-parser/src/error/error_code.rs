//! Error codes for the AMR reader.
//!
//! Codes are grouped by phase:
//! - `E0xx` - block tokenizer and lexer errors
//! - `E1xx` - graph syntax errors
//! - `E2xx` - graph structure and metadata errors
//! - `E3xx` - alignment format errors
//! - `E4xx` - alignment resolution errors

use std::fmt;

/// How far the damage of an error reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The block cannot produce a graph.
    Format,
    /// One alignment item could not be read; the rest of the block survives.
    AlignmentFormat,
    /// One alignment record points at nothing in the graph.
    Resolution,
}

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Tokenizer / Lexer Errors (E0xx)
    // =========================================================================
    /// Unterminated string literal.
    E001,

    /// Unexpected character.
    ///
    /// A character that cannot start any graph token, such as `{`.
    E002,

    /// Unbalanced parentheses.
    ///
    /// Checked outside quoted strings before the graph is parsed.
    E003,

    /// Empty block.
    ///
    /// The block has neither graph text nor `::root`/`::node` metadata.
    E004,

    /// Graph nested too deeply.
    ///
    /// More than [`MAX_NESTING`](crate::parser::MAX_NESTING) open `(` at once.
    E005,

    // =========================================================================
    // Graph Syntax Errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    E100,

    /// Incomplete input.
    ///
    /// The graph text ended before the construct was complete.
    E101,

    /// Role without a target.
    ///
    /// A `:role` was followed by `)` or another role.
    E102,

    /// Undefined variable.
    ///
    /// A bare symbol shaped like a variable (`b`, `c2`) is referenced but
    /// never defined with `( b / concept )`.
    E103,

    /// Duplicate variable definition.
    E104,

    /// Trailing content after the root node.
    E105,

    /// Missing concept.
    ///
    /// `(x)` or `(x /)`.
    E106,

    // =========================================================================
    // Structure / Metadata Errors (E2xx)
    // =========================================================================
    /// Missing `::root` line in a metadata graph.
    E200,

    /// A `::edge` line references a node id never declared by `::node`.
    E201,

    /// Malformed `::node`, `::edge`, or `::root` line.
    E202,

    /// A node is not reachable from the root.
    E203,

    /// Repeated triple. Only the first occurrence is kept.
    E204,

    /// Duplicate `::node` id.
    E205,

    // =========================================================================
    // Alignment Format Errors (E3xx)
    // =========================================================================
    /// Malformed token span.
    E300,

    /// Token index out of range for the `::tok` line.
    E301,

    /// Malformed graph path.
    E302,

    // =========================================================================
    // Resolution Errors (E4xx)
    // =========================================================================
    /// A node path does not lead to a node.
    E400,

    /// An edge path does not lead to an edge.
    E401,

    /// An alias names no node in the graph.
    E402,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E005 => "E005",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            ErrorCode::E105 => "E105",
            ErrorCode::E106 => "E106",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            ErrorCode::E205 => "E205",
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E302 => "E302",
            ErrorCode::E400 => "E400",
            ErrorCode::E401 => "E401",
            ErrorCode::E402 => "E402",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E003 => "unbalanced parentheses",
            ErrorCode::E004 => "empty block",
            ErrorCode::E005 => "graph nested too deeply",
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "incomplete input",
            ErrorCode::E102 => "role without target",
            ErrorCode::E103 => "undefined variable",
            ErrorCode::E104 => "duplicate variable definition",
            ErrorCode::E105 => "trailing content",
            ErrorCode::E106 => "missing concept",
            ErrorCode::E200 => "missing root",
            ErrorCode::E201 => "undeclared node",
            ErrorCode::E202 => "malformed metadata",
            ErrorCode::E203 => "unreachable node",
            ErrorCode::E204 => "duplicate triple",
            ErrorCode::E205 => "duplicate node id",
            ErrorCode::E300 => "malformed span",
            ErrorCode::E301 => "token out of range",
            ErrorCode::E302 => "malformed path",
            ErrorCode::E400 => "unresolved node path",
            ErrorCode::E401 => "unresolved edge path",
            ErrorCode::E402 => "unknown alias",
        }
    }

    /// Returns the category this code belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorCode::E300 | ErrorCode::E301 | ErrorCode::E302 => ErrorCategory::AlignmentFormat,
            ErrorCode::E400 | ErrorCode::E401 | ErrorCode::E402 => ErrorCategory::Resolution,
            _ => ErrorCategory::Format,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
