//! The core diagnostic type.
//!
//! A [`Diagnostic`] is a single error or warning with an optional error code,
//! labelled source spans, and help text.

use std::fmt;

use crate::{
    error::{ErrorCategory, Severity, error_code::ErrorCode, label::Label},
    span::Span,
};

/// A diagnostic message with source locations.
///
/// Rendered by the CLI as:
///
/// ```text
/// error[E104]: variable `b` is defined more than once
///   --> corpus.txt:3:27
///    |
///  3 | (w / want-01 :ARG0 (b / boy) :ARG1 (b / go-01))
///    |                                     ^ redefined here
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// The category of the error code. Diagnostics without a code are
    /// treated as format errors.
    pub fn category(&self) -> ErrorCategory {
        self.code
            .map(|code| code.category())
            .unwrap_or(ErrorCategory::Format)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// The span of the first primary label, if any.
    pub fn primary_span(&self) -> Option<Span> {
        self.labels
            .iter()
            .find(|label| label.is_primary())
            .map(Label::span)
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Turns this diagnostic into a warning, keeping everything else.
    ///
    /// Used when a recoverable error is tolerated by a lenient reader.
    pub fn into_warning(mut self) -> Self {
        self.severity = Severity::Warning;
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // "error[E001]: message" or "error: message"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}
