//! Graphs declared by `::root`, `::node`, and `::edge` metadata lines.
//!
//! ```text
//! # ::node	0	chase-01	1-2
//! # ::node	0.0	dog	0-1
//! # ::root	0	chase-01
//! # ::edge	chase-01	ARG0	dog	0	0.0
//! ```
//!
//! Columns are tab-separated. A quoted label may itself contain tabs, so
//! columns are re-joined between an opening and a closing quote before they are
//! indexed. The declared ids become node aliases; canonical ids are assigned
//! afterwards from the edge declaration order, exactly like text graphs.

use std::collections::{HashMap, hash_map::Entry};

use amrkit_core::alignment::Notation;

use crate::{
    alignment::{AlignmentOptions, RawAlignment, RawTarget, jamr},
    build::{Arena, ArenaEdge, ArenaNode},
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    metadata::{Metadata, MetadataEntry},
    span::Span,
};

/// A metadata graph with the alignments of its span columns.
#[derive(Debug, Clone)]
pub struct Extracted {
    pub arena: Arena,
    pub alignments: Vec<RawAlignment>,
    /// Rejected span columns. They do not fail the graph.
    pub alignment_diagnostics: Vec<Diagnostic>,
}

/// Whether the block declares its graph in metadata.
pub fn has_graph_metadata(metadata: &Metadata) -> bool {
    metadata.contains("root") || metadata.contains("node")
}

/// Splits a metadata value into trimmed columns, keeping quoted labels whole.
pub fn columns(value: &str) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    let mut in_quotes = false;

    for part in value.split('\t').map(str::trim) {
        match columns.last_mut() {
            Some(last) if in_quotes => {
                last.push('\t');
                last.push_str(part);
                in_quotes = !part.ends_with('"');
            }
            _ => {
                in_quotes = part.starts_with('"') && (part.len() == 1 || !part.ends_with('"'));
                columns.push(part.to_string());
            }
        }
    }

    columns
}

/// Quoted strings, numbers, `-`, and `+` are constants.
pub fn is_constant_label(label: &str) -> bool {
    if label.starts_with('"') || label == "-" || label == "+" {
        return true;
    }
    let digits = label
        .strip_prefix('-')
        .or_else(|| label.strip_prefix('+'))
        .unwrap_or(label);
    digits.bytes().any(|b| b.is_ascii_digit())
        && digits
            .bytes()
            .all(|b| b.is_ascii_digit() || b == b'.' || b == b'/' || b == b',')
}

fn malformed(entry: &MetadataEntry, expected: &str) -> Diagnostic {
    Diagnostic::error(format!("malformed `::{}` line", entry.key()))
        .with_code(ErrorCode::E202)
        .with_label(entry.span(), ErrorCode::E202.description())
        .with_help(format!("expected tab-separated columns: {expected}"))
}

fn undeclared(entry: &MetadataEntry, id: &str) -> Diagnostic {
    Diagnostic::error(format!("node `{id}` is never declared with `::node`"))
        .with_code(ErrorCode::E201)
        .with_label(entry.span(), ErrorCode::E201.description())
}

fn arena_node(id: &str, label: &str, span: Span) -> ArenaNode {
    let concept = (!is_constant_label(label)).then(|| label.to_string());
    ArenaNode {
        alias: Some(id.to_string()),
        variable: id.to_string(),
        concept,
        span,
        children: Vec::new(),
    }
}

struct Extractor<'m> {
    options: &'m AlignmentOptions,
    nodes: Vec<ArenaNode>,
    declared: HashMap<String, (usize, Span)>,
    diagnostics: DiagnosticCollector,
    alignments: Vec<RawAlignment>,
    alignment_diagnostics: Vec<Diagnostic>,
}

impl<'m> Extractor<'m> {
    fn new(options: &'m AlignmentOptions) -> Self {
        Self {
            options,
            nodes: Vec::new(),
            declared: HashMap::new(),
            diagnostics: DiagnosticCollector::new(),
            alignments: Vec::new(),
            alignment_diagnostics: Vec::new(),
        }
    }

    fn declare(&mut self, id: &str, label: &str, span: Span) -> Option<usize> {
        match self.declared.entry(id.to_string()) {
            Entry::Occupied(first) => {
                self.diagnostics.emit(
                    Diagnostic::error(format!("node id `{id}` is declared more than once"))
                        .with_code(ErrorCode::E205)
                        .with_label(span, "declared again here")
                        .with_secondary_label(first.get().1, "first declared here"),
                );
                None
            }
            Entry::Vacant(slot) => {
                let index = self.nodes.len();
                slot.insert((index, span));
                self.nodes.push(arena_node(id, label, span));
                Some(index)
            }
        }
    }

    fn lookup(&mut self, entry: &MetadataEntry, id: &str) -> Option<usize> {
        let index = self.declared.get(id).map(|(index, _)| *index);
        if index.is_none() {
            self.diagnostics.emit(undeclared(entry, id));
        }
        index
    }

    fn span_column(&mut self, entry: &MetadataEntry, column: Option<&String>, target: RawTarget) {
        let Some(text) = column.filter(|text| !text.is_empty()) else {
            return;
        };
        match jamr::read_span(text, entry.span(), self.options) {
            Ok(tokens) => self.alignments.push(RawAlignment {
                notation: Notation::Jamr,
                tokens,
                targets: vec![target],
                text: text.clone(),
                span: entry.span(),
            }),
            Err(diagnostic) => self.alignment_diagnostics.push(diagnostic),
        }
    }

    fn node_line(&mut self, entry: &MetadataEntry) {
        let columns = columns(entry.value());
        let [id, label, rest @ ..] = columns.as_slice() else {
            self.diagnostics.emit(malformed(entry, "id, label, and optional span"));
            return;
        };
        if self.declare(id, label, entry.span()).is_some() {
            self.span_column(entry, rest.first(), RawTarget::Alias(id.clone()));
        }
    }

    fn root(&mut self, metadata: &Metadata) -> Option<usize> {
        let Some(entry) = metadata.entry("root") else {
            let span = metadata
                .entry("node")
                .map(MetadataEntry::span)
                .unwrap_or_default();
            self.diagnostics.emit(
                Diagnostic::error("metadata graph has no `::root` line")
                    .with_code(ErrorCode::E200)
                    .with_label(span, "graph declared here")
                    .with_help("add `# ::root<TAB>id<TAB>label`"),
            );
            return None;
        };

        let columns = columns(entry.value());
        match columns.as_slice() {
            [id, ..] if self.declared.contains_key(id) => self.lookup(entry, id),
            [id, label, ..] => self.declare(id, label, entry.span()),
            [id] => self.lookup(entry, id),
            [] => {
                self.diagnostics.emit(malformed(entry, "id and label"));
                None
            }
        }
    }

    fn edge_line(&mut self, entry: &MetadataEntry) {
        let columns = columns(entry.value());
        let [_, role, _, source, target, rest @ ..] = columns.as_slice() else {
            self.diagnostics.emit(malformed(
                entry,
                "source label, role, target label, source id, target id, and optional span",
            ));
            return;
        };
        if role.is_empty() {
            self.diagnostics.emit(malformed(entry, "a non-empty role"));
            return;
        }
        let role = if role.starts_with(':') {
            role.clone()
        } else {
            format!(":{role}")
        };

        let (Some(source_index), Some(target_index)) =
            (self.lookup(entry, source), self.lookup(entry, target))
        else {
            return;
        };
        self.nodes[source_index].children.push(ArenaEdge {
            role: role.clone(),
            target: target_index,
            span: entry.span(),
        });
        self.span_column(
            entry,
            rest.first(),
            RawTarget::AliasEdge {
                source: source.clone(),
                role,
                target: target.clone(),
            },
        );
    }
}

/// Builds the arena of a metadata graph.
///
/// # Errors
///
/// Returns every E200, E201, E202, and E205 found in the graph lines.
/// Unreachable nodes are left for [`identify`](crate::identify::identify).
pub fn extract(metadata: &Metadata, options: &AlignmentOptions) -> Result<Extracted, ParseError> {
    let mut extractor = Extractor::new(options);

    for entry in metadata.get_all("node") {
        extractor.node_line(entry);
    }
    let root = extractor.root(metadata);
    for entry in metadata.get_all("edge") {
        extractor.edge_line(entry);
    }

    let Extractor {
        nodes,
        diagnostics,
        alignments,
        alignment_diagnostics,
        ..
    } = extractor;
    diagnostics.finish()?;

    match root {
        Some(root) => Ok(Extracted {
            arena: Arena::new(nodes, root),
            alignments,
            alignment_diagnostics,
        }),
        None => Err(ParseError::from(
            Diagnostic::error("metadata graph has no root").with_code(ErrorCode::E200),
        )),
    }
}
