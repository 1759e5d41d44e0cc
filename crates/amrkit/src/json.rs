//! JSON interchange for alignments.
//!
//! A list of alignments is a JSON array of records:
//!
//! ```json
//! [{"type": "ldc", "tokens": [0], "nodes": ["1.1"], "edges": []}]
//! ```
//!
//! Edge ids are written as `["source", ":role", "target"]`. A corpus is an object
//! keyed by AMR id (`::id`, or `#<index>` for blocks without one) whose
//! values are such arrays, in input order.

use indexmap::IndexMap;
use log::debug;

use amrkit_core::{alignment::AlignmentRecord, graph::Graph};
use amrkit_parser::{Amr, Diagnostic, ErrorCode};

use crate::{AmrkitError, Corpus};

/// Alignments of a whole corpus, keyed by AMR id.
pub type CorpusAlignments = IndexMap<String, Vec<AlignmentRecord>>;

/// Writes `records` as a pretty-printed JSON array.
pub fn alignments_to_string(records: &[AlignmentRecord]) -> Result<String, AmrkitError> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Reads a JSON array of alignment records.
///
/// The records are not checked against any graph; see
/// [`validate_alignments`].
pub fn alignments_from_str(text: &str) -> Result<Vec<AlignmentRecord>, AmrkitError> {
    Ok(serde_json::from_str(text)?)
}

/// Checks that every id in `records` exists in `graph`.
///
/// Returns one diagnostic per unknown node (E400) or edge (E401); an empty
/// vector means every record resolves.
pub fn validate_alignments(graph: &Graph, records: &[AlignmentRecord]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for (index, record) in records.iter().enumerate() {
        for node in record.nodes().iter().filter(|id| !graph.contains_node(id)) {
            diagnostics.push(
                Diagnostic::error(format!("alignment #{index}: node `{node}` does not exist"))
                    .with_code(ErrorCode::E400)
                    .with_help("node ids are positional: `1` is the root, `1.2` its second child"),
            );
        }
        for edge in record.edges().iter().filter(|id| !graph.contains_edge(id)) {
            diagnostics.push(
                Diagnostic::error(format!("alignment #{index}: edge `{edge}` does not exist"))
                    .with_code(ErrorCode::E401),
            );
        }
    }

    if !diagnostics.is_empty() {
        debug!(records = records.len(), invalid = diagnostics.len(); "Alignments do not match graph");
    }
    diagnostics
}

/// Returns the key an AMR is stored under in corpus JSON.
pub fn corpus_key(amr: &Amr) -> String {
    match amr.id() {
        Some(id) => id.to_string(),
        None => format!("#{}", amr.index()),
    }
}

/// Collects the alignments of every AMR in `corpus`.
///
/// A repeated `::id` is stored under `<id>#<index>` so no AMR is lost.
pub fn corpus_alignments(corpus: &Corpus) -> CorpusAlignments {
    let mut alignments = CorpusAlignments::with_capacity(corpus.amrs().len());
    for amr in corpus.amrs() {
        let mut key = corpus_key(amr);
        if alignments.contains_key(&key) {
            key = format!("{key}#{}", amr.index());
        }
        alignments.insert(key, amr.alignments().to_vec());
    }
    alignments
}

/// Writes the alignments of every AMR in `corpus` as a JSON object.
pub fn corpus_to_string(corpus: &Corpus) -> Result<String, AmrkitError> {
    Ok(serde_json::to_string_pretty(&corpus_alignments(corpus))?)
}

/// Reads a JSON object written by [`corpus_to_string`].
pub fn corpus_from_str(text: &str) -> Result<CorpusAlignments, AmrkitError> {
    Ok(serde_json::from_str(text)?)
}
