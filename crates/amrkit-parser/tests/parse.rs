use std::fmt::Write as _;

use amrkit_core::{
    alignment::{AlignmentRecord, Notation},
    graph::Graph,
    id::NodeId,
};
use amrkit_parser::{Amr, ErrorCategory, ErrorCode, ReadOptions, read};
use proptest::prelude::*;

const CHASE: &str = "(c / chase-01 :ARG0 (d / dog) :ARG1 (c2 / cat))";

fn id(s: &str) -> NodeId {
    s.parse().unwrap()
}

fn read_all(source: &str) -> Vec<Amr> {
    read(source, ReadOptions::default())
        .map(|result| result.expect("Failed to read block"))
        .collect()
}

fn read_one(source: &str) -> Amr {
    read_all(source).remove(0)
}

/// `(id, label)` of every node, in id order.
fn labelled_nodes(graph: &Graph) -> Vec<(String, String)> {
    let mut nodes: Vec<(NodeId, String)> = graph
        .nodes()
        .map(|node| (node.id().clone(), node.label().to_string()))
        .collect();
    nodes.sort();
    nodes.into_iter().map(|(id, label)| (id.to_string(), label)).collect()
}

fn edge_ids(graph: &Graph) -> Vec<String> {
    let mut edges: Vec<String> = graph.edges().map(|edge| edge.id().to_string()).collect();
    edges.sort();
    edges
}

/// Alignments with the notation erased, for comparing notations.
fn without_notation(records: &[AlignmentRecord]) -> Vec<AlignmentRecord> {
    records
        .iter()
        .map(|record| {
            AlignmentRecord::new(
                Notation::Ldc,
                record.tokens().iter().copied(),
                record.nodes().iter().cloned(),
                record.edges().iter().cloned(),
            )
        })
        .collect()
}

#[test]
fn test_chase_example() {
    let amr = read_one(CHASE);
    let graph = amr.graph();

    assert_eq!(graph.root(), &id("1"));
    assert_eq!(
        labelled_nodes(graph),
        [
            ("1".to_string(), "chase-01".to_string()),
            ("1.1".to_string(), "dog".to_string()),
            ("1.2".to_string(), "cat".to_string()),
        ]
    );
    assert_eq!(edge_ids(graph), ["1 :ARG0 1.1", "1 :ARG1 1.2"]);
}

#[test]
fn test_ldc_example() {
    let amr = read_one(&format!(
        "# ::tok dog chases cat\n# ::alignments 0-1.1 1-1 2-1.2\n{CHASE}"
    ));

    let pairs: Vec<(Vec<usize>, Vec<String>)> = amr
        .alignments()
        .iter()
        .map(|record| {
            (
                record.tokens().iter().copied().collect(),
                record.nodes().iter().map(ToString::to_string).collect(),
            )
        })
        .collect();
    assert_eq!(
        pairs,
        [
            (vec![0], vec!["1.1".to_string()]),
            (vec![1], vec!["1".to_string()]),
            (vec![2], vec!["1.2".to_string()]),
        ]
    );
    assert!(amr.alignments().iter().all(|r| r.notation() == Notation::Ldc));
}

#[test]
fn test_reentrancy() {
    let amr = read_one("(w / want-01 :ARG0 (b / boy) :ARG1 (g / go-01 :ARG0 b))");
    let graph = amr.graph();

    assert_eq!(graph.len(), 3);
    let boy = graph.lookup_alias("b").unwrap();
    assert_eq!(boy, &id("1.1"));
    let incoming: Vec<String> = graph.incoming(boy).map(|e| e.id().to_string()).collect();
    assert_eq!(incoming, ["1 :ARG0 1.1", "1.2 :ARG0 1.1"]);
}

#[test]
fn test_cross_format_convergence() {
    let text = read_one(CHASE);
    let metadata = read_one(
        "# ::node\t0\tchase-01\n\
         # ::node\t0.0\tdog\n\
         # ::node\t0.1\tcat\n\
         # ::root\t0\tchase-01\n\
         # ::edge\tchase-01\tARG0\tdog\t0\t0.0\n\
         # ::edge\tchase-01\tARG1\tcat\t0\t0.1",
    );

    assert_eq!(labelled_nodes(text.graph()), labelled_nodes(metadata.graph()));
    assert_eq!(edge_ids(text.graph()), edge_ids(metadata.graph()));
}

#[test]
fn test_cross_format_convergence_with_constants() {
    let text = read_one("(c / city :name (n / name :op1 \"New\" :op2 \"York\") :quant 2)");
    let metadata = read_one(
        "# ::node\t0\tcity\n\
         # ::node\t0.0\tname\n\
         # ::node\t0.0.0\t\"New\"\n\
         # ::node\t0.0.1\t\"York\"\n\
         # ::node\t0.1\t2\n\
         # ::root\t0\tcity\n\
         # ::edge\tcity\tname\tname\t0\t0.0\n\
         # ::edge\tname\top1\t\"New\"\t0.0\t0.0.0\n\
         # ::edge\tname\top2\t\"York\"\t0.0\t0.0.1\n\
         # ::edge\tcity\tquant\t2\t0\t0.1",
    );

    assert_eq!(labelled_nodes(text.graph()), labelled_nodes(metadata.graph()));
    assert_eq!(edge_ids(text.graph()), edge_ids(metadata.graph()));
    assert!(metadata.graph().node(&id("1.1.2")).unwrap().is_constant());
}

#[test]
fn test_cross_alignment_convergence() {
    let ldc = read_one(&format!(
        "# ::tok dog chases cat\n# ::alignments 0-1.1 1-1 2-1.2 1-1.1.r\n{CHASE}"
    ));
    let jamr = read_one(&format!(
        "# ::tok dog chases cat\n# ::alignments 0-1|0.0 1-2|0 2-3|0.1\n{CHASE}"
    ));
    let isi = read_one(
        "# ::tok dog chases cat\n(c / chase-01~e.1 :ARG0~e.1 (d / dog~e.0) :ARG1 (c2 / cat~e.2))",
    );
    let metadata = read_one(
        "# ::tok dog chases cat\n\
         # ::node\t0\tchase-01\t1-2\n\
         # ::node\t0.0\tdog\t0-1\n\
         # ::node\t0.1\tcat\t2-3\n\
         # ::root\t0\tchase-01\n\
         # ::edge\tchase-01\tARG0\tdog\t0\t0.0\n\
         # ::edge\tchase-01\tARG1\tcat\t0\t0.1",
    );

    // JAMR paths address nodes only, so compare node alignments there.
    assert_eq!(without_notation(jamr.alignments()), without_notation(metadata.alignments()));
    assert_eq!(without_notation(ldc.alignments()), without_notation(isi.alignments()));

    let ldc_nodes_only: Vec<AlignmentRecord> = without_notation(ldc.alignments())
        .into_iter()
        .map(|r| AlignmentRecord::new(Notation::Ldc, r.tokens().iter().copied(), r.nodes().iter().cloned(), []))
        .collect();
    assert_eq!(ldc_nodes_only, without_notation(jamr.alignments()));
}

#[test]
fn test_malformed_block_recovery() {
    let source = format!("# ::id one\n{CHASE}\n\n# ::id two\n(d / dog :mod (b / big)\n\n# ::id three\n(b / boy)\n");
    let results: Vec<_> = read(&source, ReadOptions::default()).collect();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().id(), Some("one"));
    assert_eq!(results[2].as_ref().unwrap().id(), Some("three"));

    let failure = results[1].as_ref().unwrap_err();
    assert_eq!(failure.index(), 1);
    let diag = &failure.error().diagnostics()[0];
    assert_eq!(diag.code(), Some(ErrorCode::E003));
    assert_eq!(diag.category(), ErrorCategory::Format);

    // Spans are absolute in the corpus.
    let span = diag.primary_span().unwrap();
    assert_eq!(&source[span.range()], "(");
    assert!(failure.span().start() > CHASE.len());
}

#[test]
fn test_deep_nesting_fails_only_its_block() {
    let mut deep = String::new();
    for level in 0..20_000 {
        if level > 0 {
            deep.push_str(" :m ");
        }
        write!(deep, "(a{level} / x").unwrap();
    }
    deep.push_str(&")".repeat(20_000));

    let source = format!("# ::id one\n{CHASE}\n\n# ::id deep\n{deep}\n\n# ::id three\n(b / boy)\n");
    let results: Vec<_> = read(&source, ReadOptions::default()).collect();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().id(), Some("one"));
    assert_eq!(results[2].as_ref().unwrap().id(), Some("three"));

    let diag = &results[1].as_ref().unwrap_err().error().diagnostics()[0];
    assert_eq!(diag.code(), Some(ErrorCode::E005));
    assert_eq!(diag.category(), ErrorCategory::Format);
}

#[test]
fn test_oversized_alignment_items_are_reported() {
    let amr = read_one(
        "# ::alignments 0-18446744073709551615|0 0-1|4294967295 1-2|0.0\n(d / dog :mod (b / big))\n",
    );

    assert_eq!(amr.alignments().len(), 1);
    assert_eq!(amr.alignments()[0].nodes().iter().next(), Some(&id("1.1")));
    let codes: Vec<_> = amr.diagnostics().iter().map(|diag| diag.code()).collect();
    assert_eq!(codes, [Some(ErrorCode::E300), Some(ErrorCode::E400)]);
}

#[test]
fn test_idempotence() {
    let source = format!(
        "# ::alignments 0-1.1 1-1\n{CHASE}\n\n(w / want-01 :ARG0 (b / boy) :ARG1 (g / go-01 :ARG0 b))\n"
    );

    let first = read_all(&source);
    let second = read_all(&source);
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.graph(), b.graph());
        assert_eq!(a.alignments(), b.alignments());
    }
}

#[test]
fn test_crlf_corpus() {
    let amrs = read_all("# ::id a\r\n(d / dog)\r\n\r\n# ::id b\r\n(c / cat)\r\n");
    assert_eq!(amrs.len(), 2);
    assert_eq!(amrs[1].id(), Some("b"));
    assert_eq!(amrs[1].graph().root_node().label(), "cat");
}

#[test]
fn test_multi_pair_metadata_line() {
    let amr = read_one(&format!(
        "# ::id bolt.1 ::date 2012-12-19 ::annotator SDL-AMR-09 ::preferred\n# ::snt The dog chased the cat.\n{CHASE}"
    ));

    assert_eq!(amr.id(), Some("bolt.1"));
    assert_eq!(amr.metadata().get("annotator"), Some("SDL-AMR-09"));
    assert!(amr.metadata().contains("preferred"));
}

#[test]
fn test_format_errors_fail_only_their_block() {
    let source = "(a / b :ARG0 q)\n\n(x / y)\n\n(m)\n\n(w / w1 :ARG0 (v / v1) :ARG1 (v / v2))";
    let codes: Vec<Option<ErrorCode>> = read(source, ReadOptions::default())
        .map(|result| match result {
            Ok(_) => None,
            Err(err) => err.error().diagnostics()[0].code(),
        })
        .collect();

    assert_eq!(
        codes,
        [Some(ErrorCode::E103), None, Some(ErrorCode::E106), Some(ErrorCode::E104)]
    );
}

// ===================
// Property tests
// ===================

#[derive(Debug, Clone)]
enum Tree {
    Node {
        concept: String,
        children: Vec<(String, Tree)>,
    },
    Constant(String),
}

impl Tree {
    fn count(&self) -> usize {
        match self {
            Tree::Constant(_) => 1,
            Tree::Node { children, .. } => {
                1 + children.iter().map(|(_, child)| child.count()).sum::<usize>()
            }
        }
    }

    fn render(&self, next: &mut usize, out: &mut String) {
        match self {
            Tree::Constant(text) => out.push_str(text),
            Tree::Node { concept, children } => {
                *next += 1;
                write!(out, "(v{next} / {concept}").unwrap();
                for (role, child) in children {
                    write!(out, "\n  {role} ").unwrap();
                    child.render(next, out);
                }
                out.push(')');
            }
        }
    }
}

/// Writes a canonical graph back as text, with fresh variables.
fn write_graph(graph: &Graph) -> String {
    fn write(graph: &Graph, id: &NodeId, next: &mut usize, out: &mut String) {
        let node = graph.node(id).unwrap();
        let Some(concept) = node.concept() else {
            out.push_str(node.variable());
            return;
        };
        *next += 1;
        write!(out, "(x{next} / {concept}").unwrap();
        for edge in graph.outgoing(id) {
            write!(out, " {} ", edge.role()).unwrap();
            write(graph, edge.target(), next, out);
        }
        out.push(')');
    }

    let mut out = String::new();
    write(graph, graph.root(), &mut 0, &mut out);
    out
}

fn role_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(":ARG0".to_string()),
        Just(":ARG1".to_string()),
        Just(":ARG0-of".to_string()),
        Just(":mod".to_string()),
        Just(":op1".to_string()),
        Just(":polarity".to_string()),
    ]
}

fn concept_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{2,8}",
        "[a-z]{2,8}-0[1-9]",
    ]
}

fn tree_strategy() -> impl Strategy<Value = Tree> {
    let leaf = prop_oneof![
        concept_strategy().prop_map(|concept| Tree::Node {
            concept,
            children: Vec::new(),
        }),
        Just(Tree::Constant("-".to_string())),
        (0u32..1000).prop_map(|n| Tree::Constant(n.to_string())),
        "[A-Z][a-z]{1,6}".prop_map(|s| Tree::Constant(format!("\"{s}\""))),
    ];
    leaf.prop_recursive(4, 40, 4, |inner| {
        (
            concept_strategy(),
            prop::collection::vec((role_strategy(), inner), 1..4),
        )
            .prop_map(|(concept, children)| Tree::Node { concept, children })
    })
}

fn root_strategy() -> impl Strategy<Value = Tree> {
    (
        concept_strategy(),
        prop::collection::vec((role_strategy(), tree_strategy()), 0..4),
    )
        .prop_map(|(concept, children)| Tree::Node { concept, children })
}

/// Every generated tree reads into a graph with one node per tree node, and
/// each child id is its parent id extended by its position.
fn check_tree_ids(tree: &Tree) -> Result<(), TestCaseError> {
    let mut text = String::new();
    tree.render(&mut 0, &mut text);

    let amr = read(&text, ReadOptions::default())
        .next()
        .unwrap()
        .map_err(|e| TestCaseError::fail(format!("{e} in {text}")))?;
    let graph = amr.graph();

    prop_assert_eq!(graph.len(), tree.count());
    for node in graph.nodes() {
        for (position, edge) in graph.outgoing(node.id()).enumerate() {
            prop_assert_eq!(edge.target(), &node.id().child(position as u32 + 1));
        }
    }
    Ok(())
}

/// Writing a graph out and reading it back reproduces the same ids.
fn check_idempotence(tree: &Tree) -> Result<(), TestCaseError> {
    let mut text = String::new();
    tree.render(&mut 0, &mut text);

    let first = read(&text, ReadOptions::default()).next().unwrap();
    let first = first.map_err(|e| TestCaseError::fail(e.to_string()))?;
    let rewritten = write_graph(first.graph());
    let second = read(&rewritten, ReadOptions::default()).next().unwrap();
    let second = second.map_err(|e| TestCaseError::fail(format!("{e} in {rewritten}")))?;

    prop_assert_eq!(labelled_nodes(first.graph()), labelled_nodes(second.graph()));
    prop_assert_eq!(edge_ids(first.graph()), edge_ids(second.graph()));
    Ok(())
}

proptest! {
    #[test]
    fn tree_ids_are_positional(tree in root_strategy()) {
        check_tree_ids(&tree)?;
    }

    #[test]
    fn reading_is_idempotent(tree in root_strategy()) {
        check_idempotence(&tree)?;
    }
}
