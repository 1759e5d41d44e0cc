//! Positional identifier assignment.
//!
//! The root is `1` and the nth child of `X` is `X.n`, where n counts every
//! outgoing edge of `X` in textual order, re-entrant ones included. A node
//! reached more than once keeps the id of the first position a preorder walk
//! reaches it at.

use amrkit_core::{
    graph::{Graph, GraphBuilder, GraphError, Node},
    id::{EdgeId, NodeId},
};
use log::trace;

use crate::{
    build::Arena,
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
};

/// A canonical graph together with the warnings raised while building it.
#[derive(Debug, Clone)]
pub struct Identified {
    pub graph: Graph,
    pub warnings: Vec<Diagnostic>,
}

/// Preorder walk with an explicit stack. Returns the id of every arena node
/// (`None` when unreachable) and the visiting order.
fn assign_ids(arena: &Arena) -> (Vec<Option<NodeId>>, Vec<usize>) {
    let mut ids: Vec<Option<NodeId>> = vec![None; arena.len()];
    let mut order = Vec::with_capacity(arena.len());
    let mut stack = vec![(arena.root(), NodeId::root())];

    while let Some((index, id)) = stack.pop() {
        if ids[index].is_some() {
            continue;
        }
        ids[index] = Some(id.clone());
        order.push(index);

        // Reverse so the first child is popped first.
        for (position, edge) in arena.nodes()[index].children.iter().enumerate().rev() {
            if ids[edge.target].is_none() {
                stack.push((edge.target, id.child(position as u32 + 1)));
            }
        }
    }

    (ids, order)
}

fn graph_error(error: GraphError, span: Span) -> Diagnostic {
    let code = match &error {
        GraphError::Unreachable(_) => ErrorCode::E203,
        GraphError::MissingRoot(_) => ErrorCode::E200,
        GraphError::DanglingEdge(_) => ErrorCode::E201,
        GraphError::DuplicateNode(_) => ErrorCode::E205,
    };
    Diagnostic::error(error.to_string())
        .with_code(code)
        .with_label(span, code.description())
}

/// Assigns canonical ids and builds the graph.
///
/// # Errors
///
/// Returns an E203 diagnostic for every arena node the root cannot reach.
pub fn identify(arena: &Arena) -> Result<Identified, ParseError> {
    let (ids, order) = assign_ids(arena);

    let mut diagnostics = DiagnosticCollector::new();
    for (node, id) in arena.nodes().iter().zip(&ids) {
        if id.is_none() {
            diagnostics.emit(
                Diagnostic::error(format!("node `{}` is not reachable from the root", node.variable))
                    .with_code(ErrorCode::E203)
                    .with_label(node.span, "unreachable node")
                    .with_help("connect the node to the graph with an edge, or remove it"),
            );
        }
    }

    diagnostics.finish()?;

    // Every node is reachable here, so positions line up with arena indices.
    let canonical: Vec<NodeId> = ids.into_iter().flatten().collect();
    let id_of = |index: usize| &canonical[index];

    let root = id_of(arena.root()).clone();
    let root_span = arena.nodes()[arena.root()].span;
    let mut builder = GraphBuilder::new(root);

    for &index in &order {
        let node = &arena.nodes()[index];
        let id = id_of(index).clone();
        let canonical_node = match &node.concept {
            Some(concept) => Node::new(id.clone(), node.variable.as_str(), concept.as_str()),
            None => Node::constant(id.clone(), node.variable.as_str()),
        };
        builder
            .add_node(canonical_node)
            .map_err(|e| ParseError::from(graph_error(e, node.span)))?;
        if let Some(alias) = &node.alias {
            builder.add_alias(alias.as_str(), id);
        }
    }

    let mut warnings = Vec::new();
    for &index in &order {
        let node = &arena.nodes()[index];
        for edge in &node.children {
            let edge_id = EdgeId::new(id_of(index).clone(), edge.role.as_str(), id_of(edge.target).clone());
            if !builder.add_edge(edge_id.clone()) {
                warnings.push(
                    Diagnostic::warning(format!("triple `{edge_id}` appears more than once"))
                        .with_code(ErrorCode::E204)
                        .with_label(edge.span, "repeated here")
                        .with_help("only the first occurrence is kept"),
                );
            }
        }
    }

    let graph = builder
        .build()
        .map_err(|e| ParseError::from(graph_error(e, root_span)))?;
    trace!(nodes = graph.len(), edges = graph.edge_count(); "Assigned canonical ids");

    Ok(Identified { graph, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        build::{ArenaEdge, ArenaNode, build_arena},
        lexer::tokenize,
        parser::parse_graph,
    };

    fn id(s: &str) -> NodeId {
        s.parse().unwrap()
    }

    fn identified(input: &str) -> Identified {
        let tokens = tokenize(input, 0).unwrap();
        let syntax = parse_graph(&tokens).unwrap();
        identify(&build_arena(&syntax).unwrap()).unwrap()
    }

    fn edge_strings(graph: &Graph) -> Vec<String> {
        graph.edges().map(|edge| edge.id().to_string()).collect()
    }

    #[test]
    fn test_chase() {
        let Identified { graph, warnings } =
            identified("(c / chase-01 :ARG0 (d / dog) :ARG1 (c2 / cat))");

        assert!(warnings.is_empty());
        let ids: Vec<String> = graph.nodes().map(|n| n.id().to_string()).collect();
        assert_eq!(ids, ["1", "1.1", "1.2"]);
        assert_eq!(edge_strings(&graph), ["1 :ARG0 1.1", "1 :ARG1 1.2"]);
        assert_eq!(graph.lookup_alias("c2"), Some(&id("1.2")));
    }

    #[test]
    fn test_reentrant_node_keeps_first_position() {
        let Identified { graph, .. } =
            identified("(w / want-01 :ARG0 (b / boy) :ARG1 (g / go-01 :ARG0 b))");

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.lookup_alias("b"), Some(&id("1.1")));
        assert_eq!(graph.lookup_alias("g"), Some(&id("1.2")));
        assert_eq!(
            edge_strings(&graph),
            ["1 :ARG0 1.1", "1 :ARG1 1.2", "1.2 :ARG0 1.1"]
        );
    }

    #[test]
    fn test_reentrant_reference_counts_as_position() {
        let Identified { graph, .. } =
            identified("(w / want-01 :ARG1 (g / go-01 :ARG0 b) :ARG0 (b / boy))");

        // `b` is first reached through `g`, as its first child.
        assert_eq!(graph.lookup_alias("g"), Some(&id("1.1")));
        assert_eq!(graph.lookup_alias("b"), Some(&id("1.1.1")));
        assert_eq!(
            graph.child_edge(&id("1"), 2).map(|e| e.target().clone()),
            Some(id("1.1.1"))
        );
    }

    #[test]
    fn test_constants_get_ids() {
        let Identified { graph, .. } = identified("(n / name :op1 \"New\" :op2 \"York\")");

        let york = graph.node(&id("1.2")).unwrap();
        assert!(york.is_constant());
        assert_eq!(york.label(), "\"York\"");
    }

    #[test]
    fn test_duplicate_triple_warns() {
        let Identified { graph, warnings } = identified("(a / and :op1 (b / boy) :op1 b)");

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code(), Some(ErrorCode::E204));
        assert!(warnings[0].severity().is_warning());
    }

    #[test]
    fn test_unreachable_node() {
        let leaf = |name: &str| ArenaNode {
            alias: Some(name.to_string()),
            variable: name.to_string(),
            concept: Some("thing".to_string()),
            span: Span::default(),
            children: Vec::new(),
        };
        let mut root = leaf("a");
        root.children.push(ArenaEdge {
            role: ":mod".to_string(),
            target: 1,
            span: Span::default(),
        });
        let arena = Arena::new(vec![root, leaf("b"), leaf("c")], 0);

        let err = identify(&arena).unwrap_err();
        assert_eq!(err.diagnostics().len(), 1);
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E203));
    }

    #[test]
    fn test_deep_nesting_ids() {
        let Identified { graph, .. } =
            identified("(a / a1 :x (b / b1 :y (c / c1 :z (d / d1))) :w (e / e1))");

        assert_eq!(graph.lookup_alias("d"), Some(&id("1.1.1.1")));
        assert_eq!(graph.lookup_alias("e"), Some(&id("1.2")));
    }
}
