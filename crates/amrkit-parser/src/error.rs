//! Error and diagnostic system for the AMR reader.
//!
//! The error system is built around the [`Diagnostic`] type: a single error or
//! warning with an [`ErrorCode`], labelled source spans, and optional help.
//! Several diagnostics are wrapped in a [`ParseError`] when a block fails.
//!
//! Codes fall into three categories (see [`ErrorCategory`]):
//! - format errors abort the block they occur in;
//! - alignment format errors drop one alignment item;
//! - resolution errors drop one alignment record.
//!
//! # Example
//!
//! ```
//! # use amrkit_parser::error::{Diagnostic, ErrorCode};
//! # use amrkit_parser::Span;
//! let diag = Diagnostic::error("variable `b` is defined more than once")
//!     .with_code(ErrorCode::E104)
//!     .with_label(Span::new(30..31), "redefined here")
//!     .with_secondary_label(Span::new(4..5), "first defined here")
//!     .with_help("refer to an existing variable without `/ concept`");
//! assert_eq!(diag.to_string(), "error[E104]: variable `b` is defined more than once");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;
pub(crate) use parse_error::Result;

pub use diagnostic::Diagnostic;
pub use error_code::{ErrorCategory, ErrorCode};
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
