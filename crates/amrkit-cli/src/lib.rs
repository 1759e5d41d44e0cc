//! amrkit CLI library
//!
//! This module contains the core CLI logic: read a corpus, report failed
//! blocks, and write the normalized alignments as JSON.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::{info, warn};

use amrkit::{AmrkitError, Corpus, CorpusReader, ParseError, json};

use error_adapter::{DiagnosticAdapter, Reportable, render};

/// Run the amrkit CLI application
///
/// Reads the input corpus and writes the alignments of every block that
/// parsed to the output file, keyed by AMR id. Failed blocks and alignment
/// warnings are logged with source snippets.
///
/// # Errors
///
/// Returns `AmrkitError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - A corpus in which every block failed
/// - Any failed block when `--strict` is set
pub fn run(args: &Args) -> Result<(), AmrkitError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing corpus"
    );

    let mut app_config = config::load_config(args.config.as_ref())?;
    if args.strict {
        app_config = app_config.with_strict(true);
    }
    let strict = app_config.reader().strict();

    let reader = CorpusReader::new(app_config);
    let (corpus, source) = reader.read_file(&args.input)?;

    report_warnings(&corpus, &source);

    if corpus.all_failed() || (strict && !corpus.failures().is_empty()) {
        return Err(failures_error(corpus, source));
    }
    report_failures(&corpus, &source);

    fs::write(&args.output, json::corpus_to_string(&corpus)?)?;

    info!(
        amrs = corpus.amrs().len(),
        failures = corpus.failures().len(),
        output_file = args.output;
        "Alignments exported successfully"
    );

    Ok(())
}

fn report_warnings(corpus: &Corpus, source: &str) {
    for amr in corpus.amrs() {
        for diag in amr.diagnostics() {
            let reportable = Reportable::Diagnostic(DiagnosticAdapter::new(diag, source));
            warn!(block = amr.index(); "{}", render(&reportable));
        }
    }
}

fn report_failures(corpus: &Corpus, source: &str) {
    for failure in corpus.failures() {
        for diag in failure.error().diagnostics() {
            let reportable = Reportable::Diagnostic(DiagnosticAdapter::new(diag, source));
            warn!(block = failure.index(); "Skipped block\n{}", render(&reportable));
        }
    }
}

/// Collects the diagnostics of every failed block into one error.
fn failures_error(corpus: Corpus, source: String) -> AmrkitError {
    let (_, failures) = corpus.into_parts();
    let diagnostics = failures
        .into_iter()
        .flat_map(|failure| failure.into_error().into_diagnostics())
        .collect::<Vec<_>>();
    AmrkitError::new_parse_error(ParseError::new(diagnostics), source)
}
