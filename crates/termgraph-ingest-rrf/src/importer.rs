//! The import driver: tables in dependency order, then finalization.

use crate::config::ImportConfig;
use crate::context::{ImportContext, TableStats};
use crate::cycles::{break_cycles, CycleResolution};
use crate::finalize::{finalize, HierarchyReport};
use crate::parsers::parse_table;
use crate::reader::{Remnant, TableLines};
use crate::source::TableSource;
use crate::table::Table;
use crate::Result;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::time::Instant;
use termgraph_store::GraphSink;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub table: Table,
    pub members: usize,
    #[serde(flatten)]
    pub stats: TableStats,
    /// Bytes of an incomplete record left at the end of the table.
    pub trailing_bytes: usize,
    pub elapsed_ms: u128,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub config: ImportConfig,
    pub tables: Vec<TableReport>,
    pub hierarchies: Vec<HierarchyReport>,
    pub original_concepts: usize,
    pub unified_concepts: usize,
    pub predicates: usize,
    pub facts: u64,
}

impl ImportReport {
    pub fn table(&self, table: Table) -> Option<&TableReport> {
        self.tables.iter().find(|t| t.table == table)
    }

    pub fn total_cycles(&self) -> usize {
        self.hierarchies.iter().map(|h| h.cycles).sum()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| crate::ImportError::Config(format!("report serialization: {e}")))
    }
}

/// One import run into one sink.
pub struct Importer<S: GraphSink> {
    config: ImportConfig,
    ctx: ImportContext<S>,
}

impl<S: GraphSink> Importer<S> {
    /// Validate `config` and write the model vocabulary to the buffer.
    pub fn new(config: ImportConfig, sink: S) -> Result<Self> {
        let ctx = ImportContext::new(&config, sink)?;
        Ok(Self { config, ctx })
    }

    pub fn context(&self) -> &ImportContext<S> {
        &self.ctx
    }

    /// Tables this run reads, in order.
    pub fn tables(&self) -> Vec<Table> {
        let semantic = self.ctx.extract_unified() && self.config.semantic_types;
        Table::ORDER
            .into_iter()
            .filter(|t| semantic || !t.needs_unified_concepts())
            .collect()
    }

    /// Read every table, finalize, and hand back the finished sink.
    pub fn run(mut self, source: &dyn TableSource) -> Result<(S, ImportReport)> {
        let started_at = Utc::now();
        info!(
            unified = self.ctx.extract_unified(),
            batch_size = self.config.batch_size,
            "import started"
        );

        let mut tables = Vec::new();
        for table in self.tables() {
            tables.push(self.read_table(source, table)?);
        }

        info!("finalizing");
        let original_concepts = self.ctx.original_count();
        let unified_concepts = self.ctx.unified_count();
        let hierarchies = finalize(&mut self.ctx)?;
        let predicates = self.ctx.predicates().len();
        let facts = self.ctx.flushed();
        let sink = self.ctx.finish()?;

        let report = ImportReport {
            started_at,
            finished_at: Utc::now(),
            config: self.config,
            tables,
            hierarchies,
            original_concepts,
            unified_concepts,
            predicates,
            facts,
        };
        info!(
            facts = report.facts,
            originals = report.original_concepts,
            unified = report.unified_concepts,
            cycles = report.total_cycles(),
            "import finished"
        );
        Ok((sink, report))
    }

    /// Read the rank, atom and hierarchy tables only and return each
    /// terminology's cycle resolution, without finalizing. The sink gets the
    /// facts of those three tables and is handed back for IRI lookups.
    pub fn inspect_cycles(
        mut self,
        source: &dyn TableSource,
    ) -> Result<(S, Vec<(String, CycleResolution)>)> {
        for table in [Table::Rank, Table::Atom, Table::Hierarchy] {
            self.read_table(source, table)?;
        }
        let resolutions = self
            .ctx
            .take_hierarchies()
            .into_par_iter()
            .map(|(terminology, _, graph)| (terminology, break_cycles(&graph)))
            .collect();
        Ok((self.ctx.finish()?, resolutions))
    }

    /// Stream all members of `table`, carrying the remnant across members.
    pub fn read_table(&mut self, source: &dyn TableSource, table: Table) -> Result<TableReport> {
        let start = Instant::now();
        let members = source.members(table)?;
        if members.is_empty() {
            warn!(%table, stem = table.stem(), "table not found in source");
        }

        let mut remnant = Remnant::default();
        for member in &members {
            info!(%table, member = member.as_str(), "reading");
            let reader = source.open(member)?;
            remnant = parse_table(table, TableLines::new(reader), &mut self.ctx, remnant)?;
            if !remnant.is_empty() {
                debug!(%table, bytes = remnant.len(), "partial record carried to next member");
            }
        }
        if !remnant.is_empty() {
            warn!(%table, bytes = remnant.len(), "incomplete record at end of table");
        }

        self.ctx.after_table(table)?;
        let stats = self.ctx.take_stats();
        info!(
            %table,
            records = stats.records,
            accepted = stats.accepted,
            suppressed = stats.suppressed,
            filtered = stats.filtered,
            unresolved = stats.unresolved,
            "table done"
        );
        Ok(TableReport {
            table,
            members: members.len(),
            stats,
            trailing_bytes: remnant.len(),
            elapsed_ms: start.elapsed().as_millis(),
        })
    }
}
