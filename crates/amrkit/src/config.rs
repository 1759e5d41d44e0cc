//! Configuration types for reading AMR corpora.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from a
//! configuration file; missing fields fall back to their defaults.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level application configuration.
//! - [`ReaderConfig`] - Controls how blocks are read and alignments resolved.
//!
//! # Example
//!
//! ```
//! # use amrkit::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(!config.reader().strict());
//! ```

use serde::Deserialize;

use amrkit_core::alignment::Notation;
use amrkit_parser::{GraphSource, ReadOptions, SpanEnd};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Reader configuration section.
    #[serde(default)]
    reader: ReaderConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the given reader configuration.
    pub fn new(reader: ReaderConfig) -> Self {
        Self { reader }
    }

    /// Returns the reader configuration.
    pub fn reader(&self) -> &ReaderConfig {
        &self.reader
    }

    /// Returns this configuration with strict mode set to `strict`.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.reader.strict = strict;
        self
    }
}

/// Where the graph of a block is read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphSourceKind {
    /// `::node`/`::edge` lines when the block has `::root` or `::node`
    /// metadata, graph text otherwise.
    #[default]
    Auto,
    Text,
    Metadata,
}

impl From<GraphSourceKind> for GraphSource {
    fn from(kind: GraphSourceKind) -> Self {
        match kind {
            GraphSourceKind::Auto => GraphSource::Auto,
            GraphSourceKind::Text => GraphSource::Text,
            GraphSourceKind::Metadata => GraphSource::Metadata,
        }
    }
}

/// Whether the end of a JAMR `a-b` span is exclusive or inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanEndKind {
    #[default]
    Exclusive,
    Inclusive,
}

impl From<SpanEndKind> for SpanEnd {
    fn from(kind: SpanEndKind) -> Self {
        match kind {
            SpanEndKind::Exclusive => SpanEnd::Exclusive,
            SpanEndKind::Inclusive => SpanEnd::Inclusive,
        }
    }
}

/// Reader settings.
///
/// ```toml
/// [reader]
/// graph_source = "auto"
/// notation = "jamr"
/// jamr_span_end = "exclusive"
/// strict = false
/// remove_wiki = true
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReaderConfig {
    #[serde(default)]
    graph_source: GraphSourceKind,

    /// Notation of `::alignments` lines; detected per line when unset.
    #[serde(default)]
    notation: Option<Notation>,

    #[serde(default)]
    jamr_span_end: SpanEndKind,

    /// Fail a block on any alignment or resolution error.
    #[serde(default)]
    strict: bool,

    /// Drop `:wiki` edges and their targets.
    #[serde(default)]
    remove_wiki: bool,
}

impl ReaderConfig {
    pub fn graph_source(&self) -> GraphSourceKind {
        self.graph_source
    }

    pub fn notation(&self) -> Option<Notation> {
        self.notation
    }

    pub fn jamr_span_end(&self) -> SpanEndKind {
        self.jamr_span_end
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    pub fn remove_wiki(&self) -> bool {
        self.remove_wiki
    }

    /// Returns the [`ReadOptions`] the parser is run with.
    pub fn to_read_options(&self) -> ReadOptions {
        ReadOptions::default()
            .with_graph_source(self.graph_source.into())
            .with_notation(self.notation)
            .with_jamr_span_end(self.jamr_span_end.into())
            .with_strict(self.strict)
            .with_remove_wiki(self.remove_wiki)
    }
}
