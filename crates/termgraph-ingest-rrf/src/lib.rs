//! Pipe-delimited terminology corpus ingestion (boundary adapter).
//!
//! This crate turns a multi-table RRF release (ranks, atoms, definitions,
//! hierarchies, relations, attributes, semantic types) into a concept graph
//! written to a [`termgraph_store::GraphSink`]:
//!
//! - original concepts (one per `(terminology, code)`), unified concepts and
//!   semantic types become classes;
//! - per-terminology hierarchies become `subClassOf` edges, after cycle repair;
//! - typed relations become `some`/`only` restrictions;
//! - terms, definitions and attributes become literal annotations.
//!
//! Tables are streamed one at a time, in dependency order, because later
//! tables join on atom identifiers that only the atom table defines:
//!
//! ```text
//! rank → atom → definition → hierarchy → relation → attribute → semantic types
//!                                                                   │
//!                                      cycle breaking + finalization ◄┘
//! ```
//!
//! All mutable import state lives in one explicit [`ImportContext`], passed by
//! reference into every parser and into the finalizer.

pub mod config;
pub mod context;
pub mod cycles;
pub mod finalize;
pub mod importer;
pub mod language;
pub mod parsers;
pub mod reader;
pub mod source;
pub mod table;

pub use config::ImportConfig;
pub use context::{ImportContext, TableStats, Term};
pub use cycles::{break_cycles, CycleDecision, CycleResolution, ParentGraph, ResolvedCycle};
pub use finalize::HierarchyReport;
pub use importer::{ImportReport, Importer, TableReport};
pub use reader::{Remnant, TableLines};
pub use source::{DirectorySource, MemorySource, TableSource};
pub use table::Table;

/// The pseudo-terminology whose records describe the terminologies themselves.
pub const ROOT_SOURCE: &str = "SRC";

/// Allow-list entry that turns unified-concept extraction on.
pub const UNIFIED_SOURCE: &str = "CUI";

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown language code `{code}` in {table} record {line}")]
    UnknownLanguage {
        code: String,
        table: Table,
        line: u64,
    },

    #[error("invalid UTF-8 in {table} record {line}")]
    InvalidUtf8 { table: Table, line: u64 },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("graph store error: {0}")]
    Sink(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ImportError>;
