//! Termgraph CLI
//!
//! - `import`: RRF release directory → N-Triples stream or store snapshot
//! - `stats`: summarize a store snapshot
//! - `cycles`: list hierarchy cycles per terminology without a full import

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use termgraph_ingest_rrf::{DirectorySource, ImportConfig, ImportReport, Importer};
use termgraph_store::{NTriplesSink, TripleStore};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod summary;

#[derive(Parser)]
#[command(name = "termgraph")]
#[command(author, version, about = "Terminology release → concept graph importer")]
struct Cli {
    /// Debug-level logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import an extracted release directory.
    Import {
        /// Release directory (searched recursively for table files)
        source: PathBuf,
        /// Output file (N-Triples defaults to stdout; snapshots require a path)
        #[arg(short, long)]
        out: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Ntriples)]
        format: OutputFormat,
        #[command(flatten)]
        filters: FilterArgs,
        /// JSON import configuration; flags override its values
        #[arg(long)]
        config: Option<PathBuf>,
        /// Buffered facts per batch
        #[arg(long)]
        batch_size: Option<usize>,
        /// Write the import report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
        /// Skip the semantic-type tables
        #[arg(long)]
        no_semantic_types: bool,
    },

    /// Print fact and node counts of a store snapshot.
    Stats {
        snapshot: PathBuf,
    },

    /// Report hierarchy cycles without writing a graph.
    Cycles {
        source: PathBuf,
        #[command(flatten)]
        filters: FilterArgs,
    },
}

#[derive(clap::Args, Debug, Default, Clone)]
struct FilterArgs {
    /// Keep only this terminology (repeatable; add CUI for unified concepts)
    #[arg(long = "terminology")]
    terminologies: Vec<String>,
    /// Keep only terms in this two-letter language (repeatable)
    #[arg(long = "language")]
    languages: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Ntriples,
    Snapshot,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Import {
            source,
            out,
            format,
            filters,
            config,
            batch_size,
            report,
            no_semantic_types,
        } => {
            let config = build_config(config.as_deref(), &filters, batch_size, no_semantic_types)?;
            cmd_import(&source, out.as_deref(), format, config, report.as_deref())
        }
        Commands::Stats { snapshot } => cmd_stats(&snapshot),
        Commands::Cycles { source, filters } => {
            let config = build_config(None, &filters, None, true)?;
            cmd_cycles(&source, config)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// File values first, then flags.
fn build_config(
    file: Option<&Path>,
    filters: &FilterArgs,
    batch_size: Option<usize>,
    no_semantic_types: bool,
) -> Result<ImportConfig> {
    let mut config = match file {
        Some(path) => ImportConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ImportConfig::default(),
    };
    if !filters.terminologies.is_empty() {
        config = config.with_terminologies(filters.terminologies.iter().cloned());
    }
    if !filters.languages.is_empty() {
        config = config.with_languages(filters.languages.iter().cloned());
    }
    if let Some(batch_size) = batch_size {
        config.batch_size = batch_size;
    }
    if no_semantic_types {
        config.semantic_types = false;
    }
    config.validate()?;
    Ok(config)
}

fn open_source(path: &Path) -> Result<DirectorySource> {
    DirectorySource::open(path).with_context(|| format!("scanning {}", path.display()))
}

fn cmd_import(
    source: &Path,
    out: Option<&Path>,
    format: OutputFormat,
    config: ImportConfig,
    report_path: Option<&Path>,
) -> Result<()> {
    let tables = open_source(source)?;
    debug!(?config, "import configuration");
    eprintln!("{} {}", "Importing".green().bold(), source.display());

    let report = match format {
        OutputFormat::Ntriples => {
            let writer: Box<dyn Write> = match out {
                Some(path) => Box::new(BufWriter::new(
                    File::create(path).with_context(|| format!("creating {}", path.display()))?,
                )),
                None => Box::new(BufWriter::new(io::stdout().lock())),
            };
            let importer = Importer::new(config, NTriplesSink::new(writer))?;
            let (_, report) = importer.run(&tables)?;
            report
        }
        OutputFormat::Snapshot => {
            let path = out.ok_or_else(|| anyhow!("--out is required for snapshot output"))?;
            let importer = Importer::new(config, TripleStore::new())?;
            let (store, report) = importer.run(&tables)?;
            store
                .save_snapshot(path)
                .with_context(|| format!("writing {}", path.display()))?;
            report
        }
    };

    summary::print_import(&report);
    if let Some(path) = out {
        eprintln!("{} {}", "wrote".green().bold(), path.display().to_string().bold());
    }
    if let Some(path) = report_path {
        write_report(&report, path)?;
        eprintln!("{} {}", "wrote".green().bold(), path.display().to_string().bold());
    }
    Ok(())
}

fn write_report(report: &ImportReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn cmd_stats(snapshot: &Path) -> Result<()> {
    let store = TripleStore::load_snapshot(snapshot)
        .with_context(|| format!("loading {}", snapshot.display()))?;
    summary::print_store(snapshot, &store.stats());
    Ok(())
}

fn cmd_cycles(source: &Path, config: ImportConfig) -> Result<()> {
    let tables = open_source(source)?;
    let importer = Importer::new(config, NTriplesSink::new(io::sink()))?;
    let (sink, resolutions) = importer.inspect_cycles(&tables)?;
    summary::print_cycles(&resolutions, sink.interner());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("import.json");
        std::fs::write(&path, r#"{ "terminologies": ["T9"], "batch_size": 7 }"#)?;

        let filters = FilterArgs {
            terminologies: vec!["T1".to_string(), "CUI".to_string()],
            languages: vec![],
        };
        let config = build_config(Some(path.as_path()), &filters, None, true)?;
        assert_eq!(config.batch_size, 7);
        assert!(config.extract_unified());
        assert!(config.terminologies.as_ref().is_some_and(|t| !t.contains("T9")));
        assert!(!config.semantic_types);
        Ok(())
    }

    #[test]
    fn zero_batch_size_flag_is_rejected() {
        let result = build_config(None, &FilterArgs::default(), Some(0), false);
        assert!(result.is_err());
    }
}
