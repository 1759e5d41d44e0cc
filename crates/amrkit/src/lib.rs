//! amrkit - read AMR corpora and normalize their alignments.
//!
//! Graphs written as Penman text or as JAMR `::node`/`::edge` lines are read
//! into one canonical model with positional node ids. LDC, JAMR, and ISI
//! alignments are resolved onto those ids.

pub mod config;
pub mod json;

mod error;

pub use amrkit_core::{alignment, graph, id};
pub use amrkit_parser::{Amr, BlockError, Diagnostic, ErrorCategory, ErrorCode, ParseError};

pub use error::AmrkitError;

use std::{fs, path::Path};

use log::{debug, info, trace};

use config::AppConfig;

/// The outcome of reading a corpus: every block either parsed or failed.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    amrs: Vec<Amr>,
    failures: Vec<BlockError>,
}

impl Corpus {
    /// Blocks that were read, in input order.
    pub fn amrs(&self) -> &[Amr] {
        &self.amrs
    }

    /// Blocks that failed, in input order.
    pub fn failures(&self) -> &[BlockError] {
        &self.failures
    }

    /// Number of blocks in the corpus.
    pub fn len(&self) -> usize {
        self.amrs.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the corpus has blocks and none of them parsed.
    pub fn all_failed(&self) -> bool {
        self.amrs.is_empty() && !self.failures.is_empty()
    }

    pub fn into_parts(self) -> (Vec<Amr>, Vec<BlockError>) {
        (self.amrs, self.failures)
    }
}

/// Reads AMR corpora with a fixed configuration.
///
/// # Examples
///
/// ```
/// use amrkit::{CorpusReader, config::AppConfig};
///
/// let source = "# ::id one\n(d / dog)\n\n# ::id two\n(c / cat\n";
///
/// let reader = CorpusReader::new(AppConfig::default());
/// let corpus = reader.read_str(source);
///
/// assert_eq!(corpus.amrs().len(), 1);
/// assert_eq!(corpus.failures().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CorpusReader {
    config: AppConfig,
}

impl CorpusReader {
    /// Create a new corpus reader with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Read every block of `source`.
    ///
    /// Failed blocks do not stop the read; they are collected in
    /// [`Corpus::failures`].
    pub fn read_str(&self, source: &str) -> Corpus {
        let options = self.config.reader().to_read_options();
        let mut corpus = Corpus::default();

        for result in amrkit_parser::read(source, options) {
            match result {
                Ok(amr) => {
                    trace!(block = amr.index(), nodes = amr.graph().len(); "Block read");
                    corpus.amrs.push(amr);
                }
                Err(err) => corpus.failures.push(err),
            }
        }

        info!(
            blocks = corpus.len(),
            failures = corpus.failures.len();
            "Corpus read"
        );
        corpus
    }

    /// Read every block of the file at `path`.
    ///
    /// Returns the corpus together with the file's text, which the spans of
    /// its diagnostics point into.
    ///
    /// # Errors
    ///
    /// Returns [`AmrkitError::Io`] if the file cannot be read.
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<(Corpus, String), AmrkitError> {
        let path = path.as_ref();
        debug!(path = path.display().to_string(); "Reading corpus file");
        let source = fs::read_to_string(path)?;
        let corpus = self.read_str(&source);
        Ok((corpus, source))
    }

    /// Read a source holding exactly one AMR.
    ///
    /// # Errors
    ///
    /// Returns [`AmrkitError::Parse`] if the block fails, or if `source` holds
    /// no block or more than one.
    pub fn read_one(&self, source: &str) -> Result<Amr, AmrkitError> {
        let options = self.config.reader().to_read_options();
        let mut blocks = amrkit_parser::read(source, options);

        let amr = match blocks.next() {
            Some(result) => result.map_err(|err| AmrkitError::from_block(err, source))?,
            None => {
                let diag = Diagnostic::error("source holds no AMR")
                    .with_code(ErrorCode::E004)
                    .with_help("add graph text, or `::root` and `::node` lines");
                return Err(AmrkitError::new_parse_error(diag.into(), source));
            }
        };

        if let Some(extra) = blocks.next() {
            let span = match &extra {
                Ok(amr) => amr.span(),
                Err(err) => err.span(),
            };
            let diag = Diagnostic::error("source holds more than one AMR")
                .with_code(ErrorCode::E105)
                .with_label(span, "second block starts here")
                .with_help("use `read_str` to read a corpus");
            return Err(AmrkitError::new_parse_error(diag.into(), source));
        }

        Ok(amr)
    }
}
