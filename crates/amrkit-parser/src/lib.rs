//! # amrkit Parser
//!
//! Reader for textual AMR corpora. This crate turns blocks of text into
//! canonical [`amrkit_core`] graphs and alignment records.
//!
//! The pipeline for each block:
//!
//! 1. **Split** - [`blocks`] cuts the corpus at blank lines
//! 2. **Metadata** - [`metadata`] reads `# ::key value` comment lines
//! 3. **Graph** - [`lexer`] and [`parser`] read the graph text, [`build`] links
//!    re-entrant variables; or [`extract`] reads `::node`/`::edge` lines
//! 4. **Identify** - [`identify`] assigns positional ids (`1`, `1.2`, ...)
//! 5. **Align** - [`alignment`] reads LDC, JAMR, and ISI alignments and
//!    resolves them against the graph
//!
//! ## Usage
//!
//! ```
//! # use amrkit_parser::{read, ReadOptions};
//! let source = "# ::id ex.1\n# ::alignments 0-1.1 1-1\n(c / chase-01 :ARG0 (d / dog))\n";
//!
//! for result in read(source, ReadOptions::default()) {
//!     let amr = result.expect("block parses");
//!     assert_eq!(amr.id(), Some("ex.1"));
//!     assert_eq!(amr.graph().len(), 2);
//!     assert_eq!(amr.alignments().len(), 2);
//! }
//! ```

pub mod alignment;
pub mod blocks;
pub mod build;
pub mod error;
pub mod extract;
pub mod identify;
pub mod lexer;
pub mod metadata;
pub mod parser;
pub mod parser_types;
pub mod reader;
mod span;
pub mod tokens;

pub use alignment::{JAMR_SPAN_END, LDC_EDGE_SUFFIX, SpanEnd};
pub use error::{Diagnostic, ErrorCategory, ErrorCode, ParseError};
pub use reader::{Amr, BlockError, GraphSource, ReadOptions, Reader, read_block};
pub use span::{Span, Spanned};

/// Reads every block of `source`.
///
/// Failed blocks are yielded as [`BlockError`]s; the blocks after them are
/// still read.
pub fn read(source: &str, options: ReadOptions) -> Reader<'_> {
    Reader::new(source, options)
}
