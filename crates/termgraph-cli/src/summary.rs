//! Human-readable summaries on stdout.

use colored::Colorize;
use std::path::Path;
use termgraph_ingest_rrf::{CycleDecision, CycleResolution, ImportReport};
use termgraph_store::{StoreStats, StrId, StringInterner};

pub fn print_import(report: &ImportReport) {
    let elapsed = report.finished_at - report.started_at;
    println!(
        "{} facts={} originals={} unified={} predicates={} ({} ms)",
        "ok".green().bold(),
        report.facts,
        report.original_concepts,
        report.unified_concepts,
        report.predicates,
        elapsed.num_milliseconds()
    );
    for table in &report.tables {
        let mut line = format!(
            "  {} {:<12} records={} accepted={} suppressed={} filtered={}",
            "→".yellow(),
            table.table.to_string(),
            table.stats.records,
            table.stats.accepted,
            table.stats.suppressed,
            table.stats.filtered
        );
        if table.stats.unresolved > 0 {
            line.push_str(&format!(" unresolved={}", table.stats.unresolved));
        }
        if table.members == 0 {
            line.push_str(&format!(" {}", "(missing)".dimmed()));
        }
        println!("{line}");
    }
    for hierarchy in report.hierarchies.iter().filter(|h| h.cycles > 0) {
        println!(
            "  {} {} cycles={} dominant={} equivalences={}",
            "↻".yellow(),
            hierarchy.terminology,
            hierarchy.cycles,
            hierarchy.dominant,
            hierarchy.equivalences
        );
    }
}

pub fn print_store(path: &Path, stats: &StoreStats) {
    println!("{} {}", "snapshot".green().bold(), path.display());
    println!("  facts:         {}", stats.facts);
    println!("  literal facts: {}", stats.literal_facts);
    println!("  iris:          {}", stats.iris);
    println!("  blank nodes:   {}", stats.blank_nodes);
    println!("  batches:       {}", stats.batches);
    if !stats.finished {
        println!("  {}", "import did not finish".red());
    }
}

pub fn print_cycles(resolutions: &[(String, CycleResolution)], interner: &StringInterner) {
    let total: usize = resolutions.iter().map(|(_, r)| r.cycle_count()).sum();
    if total == 0 {
        println!("{} no hierarchy cycles", "ok".green().bold());
        return;
    }
    println!("{} {} hierarchy cycle(s)", "found".yellow().bold(), total);
    for (terminology, resolution) in resolutions {
        for cycle in &resolution.cycles {
            let members: Vec<&str> = cycle.members.iter().map(|m| name(interner, *m)).collect();
            let decision = match cycle.decision {
                CycleDecision::Dominant(winner) => format!("dominant {}", name(interner, winner)),
                CycleDecision::Equivalent => "equivalent".to_string(),
            };
            println!(
                "  {} {} [{}] {}",
                "→".yellow(),
                terminology.bold(),
                members.join(", "),
                decision.cyan()
            );
        }
    }
}

fn name(interner: &StringInterner, id: StrId) -> &str {
    interner.lookup(id).unwrap_or("?")
}
