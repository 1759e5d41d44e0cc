//! Resolution of raw alignments against a canonical graph.
//!
//! Every notation shares one path walk: shift the path to 1-indexed, check
//! that it starts at the root, then follow the nth outgoing edge at each step.
//! A node target is the node reached; an edge target is the last edge
//! traversed.

use amrkit_core::{
    alignment::{AlignmentRecord, Notation},
    graph::Graph,
    id::{EdgeId, NodeId},
};

use super::{Path, RawAlignment, RawTarget};
use crate::error::{Diagnostic, ErrorCode};

/// Records resolved from raw alignments, and one diagnostic per raw
/// alignment that could not be resolved.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub records: Vec<AlignmentRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Follows `path`, written in `notation`'s index base.
///
/// Returns the node reached and the last edge traversed (`None` for the
/// root).
pub fn resolve_path(
    graph: &Graph,
    notation: Notation,
    path: &Path,
) -> Option<(NodeId, Option<EdgeId>)> {
    let shift = 1 - notation.index_base();
    let mut segments = path
        .segments()
        .iter()
        .map(|&segment| segment.checked_add(shift));

    if segments.next()?? != 1 {
        return None;
    }

    let mut node = graph.root().clone();
    let mut edge = None;
    for position in segments {
        let next = graph.child_edge(&node, usize::try_from(position?).ok()?)?;
        node = next.target().clone();
        edge = Some(next.id().clone());
    }
    Some((node, edge))
}

enum Resolved {
    Node(NodeId),
    Edge(EdgeId),
}

fn unresolved(code: ErrorCode, raw: &RawAlignment, what: String) -> Diagnostic {
    Diagnostic::error(format!("alignment `{}`: {what}", raw.text))
        .with_code(code)
        .with_label(raw.span, code.description())
}

fn resolve_target(
    graph: &Graph,
    raw: &RawAlignment,
    target: &RawTarget,
) -> Result<Resolved, Diagnostic> {
    match target {
        RawTarget::Node(path) => resolve_path(graph, raw.notation, path)
            .map(|(node, _)| Resolved::Node(node))
            .ok_or_else(|| {
                unresolved(ErrorCode::E400, raw, format!("path `{path}` leads to no node"))
            }),
        RawTarget::Edge(path) => resolve_path(graph, raw.notation, path)
            .and_then(|(_, edge)| edge)
            .map(Resolved::Edge)
            .ok_or_else(|| {
                unresolved(ErrorCode::E401, raw, format!("path `{path}` leads to no edge"))
            }),
        RawTarget::Alias(alias) => graph
            .lookup_alias(alias)
            .map(|id| Resolved::Node(id.clone()))
            .ok_or_else(|| {
                unresolved(ErrorCode::E402, raw, format!("no node is named `{alias}`"))
            }),
        RawTarget::AliasEdge {
            source,
            role,
            target,
        } => {
            let lookup = |alias: &String| {
                graph.lookup_alias(alias).cloned().ok_or_else(|| {
                    unresolved(ErrorCode::E402, raw, format!("no node is named `{alias}`"))
                })
            };
            let edge = EdgeId::new(lookup(source)?, role.as_str(), lookup(target)?);
            if graph.contains_edge(&edge) {
                Ok(Resolved::Edge(edge))
            } else {
                Err(unresolved(
                    ErrorCode::E401,
                    raw,
                    format!("the graph has no edge `{source} {role} {target}`"),
                ))
            }
        }
    }
}

/// Resolves one raw alignment. Any unresolved target rejects the whole item.
///
/// # Errors
///
/// E400, E401, or E402 naming the first target that did not resolve.
pub fn resolve(graph: &Graph, raw: &RawAlignment) -> Result<AlignmentRecord, Diagnostic> {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    for target in &raw.targets {
        match resolve_target(graph, raw, target)? {
            Resolved::Node(id) => nodes.push(id),
            Resolved::Edge(id) => edges.push(id),
        }
    }
    Ok(AlignmentRecord::new(
        raw.notation,
        raw.tokens.iter().copied(),
        nodes,
        edges,
    ))
}

/// Merges records of one notation.
///
/// Records pointing at the same elements pool their tokens, then records
/// covering the same tokens pool their targets.
pub fn merge(records: Vec<AlignmentRecord>) -> Vec<AlignmentRecord> {
    let mut by_targets: Vec<AlignmentRecord> = Vec::new();
    for record in records {
        match by_targets
            .iter_mut()
            .find(|r| r.notation() == record.notation() && r.same_targets(&record))
        {
            Some(existing) => existing.merge(&record),
            None => by_targets.push(record),
        }
    }

    let mut by_tokens: Vec<AlignmentRecord> = Vec::new();
    for record in by_targets {
        match by_tokens
            .iter_mut()
            .find(|r| r.notation() == record.notation() && r.tokens() == record.tokens())
        {
            Some(existing) => existing.merge(&record),
            None => by_tokens.push(record),
        }
    }

    by_tokens.retain(|record| !record.is_empty());
    by_tokens.sort();
    by_tokens
}

/// Resolves and merges raw alignments.
pub fn normalize(graph: &Graph, raw: &[RawAlignment]) -> Normalized {
    let mut diagnostics = Vec::new();
    let records = raw
        .iter()
        .filter_map(|alignment| match resolve(graph, alignment) {
            Ok(record) => Some(record),
            Err(diagnostic) => {
                diagnostics.push(diagnostic);
                None
            }
        })
        .collect();

    Normalized {
        records: merge(records),
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        alignment::{AlignmentOptions, isi, jamr, ldc},
        build::build_arena,
        identify::identify,
        lexer::tokenize,
        parser::parse_graph,
        span::Span,
    };

    const CHASE: &str = "(c / chase-01 :ARG0 (d / dog) :ARG1 (c2 / cat))";

    fn graph(input: &str) -> Graph {
        let tokens = tokenize(input, 0).unwrap();
        let syntax = parse_graph(&tokens).unwrap();
        identify(&build_arena(&syntax).unwrap()).unwrap().graph
    }

    fn id(s: &str) -> NodeId {
        s.parse().unwrap()
    }

    fn raw(notation: Notation, tokens: &[usize], targets: Vec<RawTarget>) -> RawAlignment {
        RawAlignment {
            notation,
            tokens: tokens.to_vec(),
            targets,
            text: "test".to_string(),
            span: Span::default(),
        }
    }

    fn path(segments: &[u32]) -> Path {
        Path::new(segments.to_vec())
    }

    fn ldc_records(graph: &Graph, line: &str) -> Normalized {
        let alignments = line
            .split_whitespace()
            .map(|item| ldc::parse_item(item, Span::default(), &AlignmentOptions::default()).unwrap())
            .collect::<Vec<_>>();
        normalize(graph, &alignments)
    }

    #[test]
    fn test_resolve_path_bases() {
        let graph = graph(CHASE);

        let (node, edge) = resolve_path(&graph, Notation::Ldc, &path(&[1, 2])).unwrap();
        assert_eq!(node, id("1.2"));
        assert_eq!(edge.unwrap().to_string(), "1 :ARG1 1.2");

        let (node, _) = resolve_path(&graph, Notation::Jamr, &path(&[0, 1])).unwrap();
        assert_eq!(node, id("1.2"));

        let (node, edge) = resolve_path(&graph, Notation::Jamr, &path(&[0])).unwrap();
        assert_eq!(node, id("1"));
        assert!(edge.is_none());
    }

    #[test]
    fn test_resolve_path_failures() {
        let graph = graph(CHASE);
        assert!(resolve_path(&graph, Notation::Ldc, &path(&[2])).is_none());
        assert!(resolve_path(&graph, Notation::Ldc, &path(&[1, 3])).is_none());
        assert!(resolve_path(&graph, Notation::Ldc, &path(&[1, 0])).is_none());
        assert!(resolve_path(&graph, Notation::Ldc, &path(&[1, 1, 1])).is_none());
    }

    #[test]
    fn test_shifted_path_past_u32() {
        let graph = graph(CHASE);
        assert!(resolve_path(&graph, Notation::Jamr, &path(&[u32::MAX])).is_none());
        assert!(resolve_path(&graph, Notation::Jamr, &path(&[0, u32::MAX])).is_none());

        let normalized = normalize(
            &graph,
            &[raw(Notation::Jamr, &[0], vec![RawTarget::Node(path(&[0, u32::MAX]))])],
        );
        assert!(normalized.records.is_empty());
        assert_eq!(normalized.diagnostics[0].code(), Some(ErrorCode::E400));
    }

    #[test]
    fn test_ldc_example() {
        let graph = graph(CHASE);
        let normalized = ldc_records(&graph, "0-1.1 1-1 2-1.2");

        assert!(normalized.diagnostics.is_empty());
        assert_eq!(
            normalized.records,
            [
                AlignmentRecord::new(Notation::Ldc, [0], [id("1.1")], []),
                AlignmentRecord::new(Notation::Ldc, [1], [id("1")], []),
                AlignmentRecord::new(Notation::Ldc, [2], [id("1.2")], []),
            ]
        );
    }

    #[test]
    fn test_edge_of_reentrant_node_follows_position() {
        let graph = graph("(w / want-01 :ARG0 (b / boy) :ARG1 (g / go-01 :ARG0 b))");

        let normalized = ldc_records(&graph, "4-1.2.1.r 5-1.1.r");
        let edges: Vec<String> = normalized
            .records
            .iter()
            .flat_map(|record| record.edges().iter().map(ToString::to_string))
            .collect();
        assert_eq!(edges, ["1.2 :ARG0 1.1", "1 :ARG0 1.1"]);
    }

    #[test]
    fn test_unresolved_items_are_reported() {
        let graph = graph(CHASE);
        let normalized = ldc_records(&graph, "0-1.1 1-1.5 2-1.r");

        assert_eq!(normalized.records.len(), 1);
        let codes: Vec<_> = normalized.diagnostics.iter().map(Diagnostic::code).collect();
        assert_eq!(codes, [Some(ErrorCode::E400), Some(ErrorCode::E401)]);
    }

    #[test]
    fn test_alias_targets() {
        let graph = graph(CHASE);
        let records = normalize(
            &graph,
            &[
                raw(Notation::Jamr, &[0], vec![RawTarget::Alias("d".to_string())]),
                raw(
                    Notation::Jamr,
                    &[1],
                    vec![RawTarget::AliasEdge {
                        source: "c".to_string(),
                        role: ":ARG1".to_string(),
                        target: "c2".to_string(),
                    }],
                ),
                raw(Notation::Jamr, &[2], vec![RawTarget::Alias("zz".to_string())]),
            ],
        );

        assert_eq!(records.records.len(), 2);
        assert_eq!(records.records[1].edges().len(), 1);
        assert_eq!(records.diagnostics[0].code(), Some(ErrorCode::E402));
    }

    #[test]
    fn test_merge_policy() {
        let graph = graph(CHASE);
        let records = normalize(
            &graph,
            &[
                raw(Notation::Ldc, &[0], vec![RawTarget::Node(path(&[1, 1]))]),
                raw(Notation::Ldc, &[1], vec![RawTarget::Node(path(&[1, 1]))]),
                raw(Notation::Ldc, &[3], vec![RawTarget::Node(path(&[1]))]),
                raw(Notation::Ldc, &[3], vec![RawTarget::Edge(path(&[1, 2]))]),
                raw(Notation::Jamr, &[3], vec![RawTarget::Node(path(&[0]))]),
            ],
        )
        .records;

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].tokens().iter().copied().collect::<Vec<_>>(), [0, 1]);
        assert_eq!(records[1].notation(), Notation::Ldc);
        assert_eq!(records[1].nodes().len(), 1);
        assert_eq!(records[1].edges().len(), 1);
        assert_eq!(records[2].notation(), Notation::Jamr);
    }

    #[test]
    fn test_notations_converge() {
        let graph = graph(CHASE);
        let options = AlignmentOptions::default();

        let ldc = ldc_records(&graph, "0-1.1 1-1 2-1.2").records;
        let jamr: Vec<RawAlignment> = ["0-1|0.0", "1-2|0", "2-3|0.1"]
            .iter()
            .map(|item| jamr::parse_item(item, Span::default(), &options).unwrap())
            .collect();
        let jamr = normalize(&graph, &jamr).records;
        let tokens = tokenize("(c / chase-01~e.1 :ARG0 (d / dog~e.0) :ARG1 (c2 / cat~e.2))", 0).unwrap();
        let isi = normalize(&graph, &isi::scan(&tokens, &options).alignments).records;

        let strip = |records: &[AlignmentRecord]| -> Vec<AlignmentRecord> {
            records
                .iter()
                .map(|r| {
                    AlignmentRecord::new(
                        Notation::Ldc,
                        r.tokens().iter().copied(),
                        r.nodes().iter().cloned(),
                        r.edges().iter().cloned(),
                    )
                })
                .collect()
        };
        assert_eq!(strip(&ldc), strip(&jamr));
        assert_eq!(strip(&ldc), strip(&isi));
    }
}
