//! Reading blocks into AMRs.
//!
//! [`read_block`] runs one [`RawBlock`] through the pipeline: metadata, graph
//! (from text or from `::node`/`::edge` lines), canonical ids, alignments.
//! [`Reader`] does that for every block of a corpus; a block that fails is
//! yielded as an [`Err`] and reading carries on with the next one.

use amrkit_core::{
    alignment::{AlignmentRecord, Notation},
    graph::Graph,
    id::{EdgeId, NodeId},
};
use log::debug;

use crate::{
    alignment::{
        AlignmentOptions, JAMR_SPAN_END, ParsedLine, RawAlignment, SpanEnd, detect_notation, isi,
        line_parser, normalize::normalize,
    },
    blocks::{Blocks, RawBlock, blocks},
    build::build_arena,
    error::{Diagnostic, ErrorCode, ParseError},
    extract::{extract, has_graph_metadata},
    identify::identify,
    lexer::tokenize,
    metadata::{Metadata, parse_comments},
    parser::parse_graph,
    span::Span,
    tokens::Token,
};

/// Where the graph of a block is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphSource {
    /// Metadata when the block has `::root` or `::node` lines, text otherwise.
    #[default]
    Auto,
    Text,
    Metadata,
}

/// Options for reading blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    graph_source: GraphSource,
    notation_override: Option<Notation>,
    jamr_span_end: SpanEnd,
    strict: bool,
    remove_wiki: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            graph_source: GraphSource::Auto,
            notation_override: None,
            jamr_span_end: JAMR_SPAN_END,
            strict: false,
            remove_wiki: false,
        }
    }
}

impl ReadOptions {
    pub fn with_graph_source(mut self, graph_source: GraphSource) -> Self {
        self.graph_source = graph_source;
        self
    }

    /// Reads every `::alignments` line in `notation` instead of detecting it.
    pub fn with_notation(mut self, notation: Option<Notation>) -> Self {
        self.notation_override = notation;
        self
    }

    pub fn with_jamr_span_end(mut self, jamr_span_end: SpanEnd) -> Self {
        self.jamr_span_end = jamr_span_end;
        self
    }

    /// Fails blocks with alignment or resolution errors instead of keeping
    /// those errors as warnings.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Drops `:wiki` edges and their constants after alignment resolution.
    pub fn with_remove_wiki(mut self, remove_wiki: bool) -> Self {
        self.remove_wiki = remove_wiki;
        self
    }

    pub fn graph_source(&self) -> GraphSource {
        self.graph_source
    }

    pub fn notation_override(&self) -> Option<Notation> {
        self.notation_override
    }

    pub fn jamr_span_end(&self) -> SpanEnd {
        self.jamr_span_end
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    pub fn remove_wiki(&self) -> bool {
        self.remove_wiki
    }
}

/// One AMR with its metadata, canonical graph, and alignments.
#[derive(Debug, Clone)]
pub struct Amr {
    index: usize,
    span: Span,
    metadata: Metadata,
    comments: Vec<String>,
    tokens: Vec<String>,
    graph: Graph,
    alignments: Vec<AlignmentRecord>,
    diagnostics: Vec<Diagnostic>,
}

impl Amr {
    /// 0-based position of the block in the corpus.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// The `::id` value.
    pub fn id(&self) -> Option<&str> {
        self.metadata.get("id")
    }

    /// The `::tok` tokens, empty when the block has no `::tok` line.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// The `::snt` value.
    pub fn sentence(&self) -> Option<&str> {
        self.metadata.get("snt")
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Comment lines that carry no metadata.
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Canonical alignments, sorted.
    pub fn alignments(&self) -> &[AlignmentRecord] {
        &self.alignments
    }

    /// Warnings and non-fatal alignment problems of the block.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The first alignment covering token `index`.
    pub fn alignment_for_token(&self, index: usize) -> Option<&AlignmentRecord> {
        self.alignments_for_token(index).next()
    }

    /// The first alignment pointing at node `id`.
    pub fn alignment_for_node(&self, id: &NodeId) -> Option<&AlignmentRecord> {
        self.alignments_for_node(id).next()
    }

    /// The first alignment pointing at edge `id`.
    pub fn alignment_for_edge(&self, id: &EdgeId) -> Option<&AlignmentRecord> {
        self.alignments_for_edge(id).next()
    }

    /// Every alignment covering token `index`, in sorted order.
    pub fn alignments_for_token(&self, index: usize) -> impl Iterator<Item = &AlignmentRecord> {
        self.alignments
            .iter()
            .filter(move |record| record.tokens().contains(&index))
    }

    pub fn alignments_for_node<'a>(
        &'a self,
        id: &NodeId,
    ) -> impl Iterator<Item = &'a AlignmentRecord> {
        self.alignments
            .iter()
            .filter(move |record| record.nodes().contains(id))
    }

    pub fn alignments_for_edge<'a>(
        &'a self,
        id: &EdgeId,
    ) -> impl Iterator<Item = &'a AlignmentRecord> {
        self.alignments
            .iter()
            .filter(move |record| record.edges().contains(id))
    }

    /// Every alignment written in `notation`.
    pub fn alignments_of(&self, notation: Notation) -> impl Iterator<Item = &AlignmentRecord> {
        self.alignments
            .iter()
            .filter(move |record| record.notation() == notation)
    }
}

/// A block that could not be read.
#[derive(Debug, Clone, thiserror::Error)]
#[error("block #{index}: {error}")]
pub struct BlockError {
    index: usize,
    span: Span,
    #[source]
    error: ParseError,
}

impl BlockError {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn error(&self) -> &ParseError {
        &self.error
    }

    pub fn into_error(self) -> ParseError {
        self.error
    }
}

fn empty_block(block: &RawBlock<'_>) -> Diagnostic {
    Diagnostic::error("block has no graph")
        .with_code(ErrorCode::E004)
        .with_label(block.span(), ErrorCode::E004.description())
        .with_help("add graph text, or `::root` and `::node` lines")
}

/// A graph with the raw alignments found while reading it.
struct GraphPart {
    graph: Graph,
    warnings: Vec<Diagnostic>,
    alignments: Vec<RawAlignment>,
    alignment_diagnostics: Vec<Diagnostic>,
}

fn text_graph(block: &RawBlock<'_>, options: &AlignmentOptions) -> Result<GraphPart, ParseError> {
    if block.graph().is_empty() {
        return Err(empty_block(block).into());
    }

    let tokens = tokenize(block.graph(), block.graph_offset())?;
    let syntax = parse_graph(&tokens)?;
    let arena = build_arena(&syntax)?;
    let identified = identify(&arena)?;

    let markers = if tokens.iter().any(|t| matches!(t.token, Token::Alignment(_))) {
        isi::scan(&tokens, options)
    } else {
        ParsedLine::default()
    };

    Ok(GraphPart {
        graph: identified.graph,
        warnings: identified.warnings,
        alignments: markers.alignments,
        alignment_diagnostics: markers.diagnostics,
    })
}

fn metadata_graph(metadata: &Metadata, options: &AlignmentOptions) -> Result<GraphPart, ParseError> {
    let extracted = extract(metadata, options)?;
    let identified = identify(&extracted.arena)?;

    Ok(GraphPart {
        graph: identified.graph,
        warnings: identified.warnings,
        alignments: extracted.alignments,
        alignment_diagnostics: extracted.alignment_diagnostics,
    })
}

fn read(block: &RawBlock<'_>, options: &ReadOptions) -> Result<Amr, ParseError> {
    let (metadata, comments) = parse_comments(block.comments());
    let tokens: Vec<String> = metadata
        .get("tok")
        .map(|tok| tok.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default();
    let alignment_options = AlignmentOptions {
        jamr_span_end: options.jamr_span_end,
        token_count: metadata.contains("tok").then_some(tokens.len()),
    };

    let from_metadata = match options.graph_source {
        GraphSource::Auto => has_graph_metadata(&metadata),
        GraphSource::Text => false,
        GraphSource::Metadata => true,
    };
    let GraphPart {
        graph,
        mut warnings,
        mut alignments,
        alignment_diagnostics: mut alignment_errors,
    } = if from_metadata {
        metadata_graph(&metadata, &alignment_options)?
    } else {
        text_graph(block, &alignment_options)?
    };

    for entry in metadata.get_all("alignments") {
        let notation = options
            .notation_override
            .unwrap_or_else(|| detect_notation(entry.value()));
        match line_parser(notation) {
            Some(parse_line) => {
                let line = parse_line(entry, &alignment_options);
                alignments.extend(line.alignments);
                alignment_errors.extend(line.diagnostics);
            }
            None => {
                debug!(block = block.index(), notation = notation.as_str(); "Skipping `::alignments` line");
            }
        }
    }

    let normalized = normalize(&graph, &alignments);
    alignment_errors.extend(normalized.diagnostics);
    let mut records = normalized.records;

    if !alignment_errors.is_empty() {
        if options.strict {
            return Err(ParseError::new(alignment_errors));
        }
        warnings.extend(alignment_errors.into_iter().map(Diagnostic::into_warning));
    }

    let graph = if options.remove_wiki {
        let graph = graph.without_role(":wiki");
        for record in &mut records {
            record.restrict_to(&graph);
        }
        records.retain(|record| !record.is_empty());
        graph
    } else {
        graph
    };

    debug!(
        block = block.index(),
        nodes = graph.len(),
        alignments = records.len(),
        warnings = warnings.len();
        "Read block"
    );

    Ok(Amr {
        index: block.index(),
        span: block.span(),
        metadata,
        comments,
        tokens,
        graph,
        alignments: records,
        diagnostics: warnings,
    })
}

/// Reads one block.
///
/// # Errors
///
/// Returns a [`BlockError`] holding every diagnostic that made the block fail.
pub fn read_block(block: &RawBlock<'_>, options: &ReadOptions) -> Result<Amr, BlockError> {
    read(block, options).map_err(|error| BlockError {
        index: block.index(),
        span: block.span(),
        error,
    })
}

/// Iterator reading every block of a corpus.
#[derive(Debug, Clone)]
pub struct Reader<'src> {
    blocks: Blocks<'src>,
    options: ReadOptions,
}

impl<'src> Reader<'src> {
    pub fn new(source: &'src str, options: ReadOptions) -> Self {
        Self {
            blocks: blocks(source),
            options,
        }
    }
}

impl Iterator for Reader<'_> {
    type Item = Result<Amr, BlockError>;

    fn next(&mut self) -> Option<Self::Item> {
        let block = self.blocks.next()?;
        let result = read_block(&block, &self.options);
        if let Err(err) = &result {
            debug!(block = err.index(); "Block failed: {}", err.error());
        }
        Some(result)
    }
}
