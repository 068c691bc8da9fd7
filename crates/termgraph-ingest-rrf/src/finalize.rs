//! End-of-import resolution.
//!
//! Runs once, after every table has been streamed:
//!
//! 1. break hierarchy cycles per terminology and emit the surviving
//!    `subClassOf` edges (or a root edge) plus equivalence declarations;
//! 2. turn deferred indirect relations into `only` restrictions;
//! 3. mark predicates used mostly indirectly as `only` properties;
//! 4. close the unified ↔ original mappings with `only` restrictions.

use crate::context::ImportContext;
use crate::cycles::{break_cycles, CycleDecision, CycleResolution};
use crate::Result;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;
use termgraph_store::{GraphSink, Literal, StrId, Triple};
use tracing::info;

/// Hierarchy repair outcome for one terminology.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HierarchyReport {
    pub terminology: String,
    pub concepts: usize,
    pub edges: usize,
    pub cycles: usize,
    pub dominant: usize,
    pub equivalences: usize,
    /// Raw member handles of every cycle, in resolution order.
    pub cycle_members: Vec<Vec<u32>>,
}

impl HierarchyReport {
    pub fn new(
        terminology: &str,
        concepts: usize,
        edges: usize,
        resolution: &CycleResolution,
    ) -> Self {
        let dominant = resolution
            .cycles
            .iter()
            .filter(|c| matches!(c.decision, CycleDecision::Dominant(_)))
            .count();
        Self {
            terminology: terminology.to_string(),
            concepts,
            edges,
            cycles: resolution.cycle_count(),
            dominant,
            equivalences: resolution.equivalences.len(),
            cycle_members: resolution
                .cycles
                .iter()
                .map(|c| c.members.iter().map(|m| m.raw()).collect())
                .collect(),
        }
    }
}

pub fn finalize<S: GraphSink>(ctx: &mut ImportContext<S>) -> Result<Vec<HierarchyReport>> {
    let reports = emit_hierarchies(ctx)?;
    emit_only_restrictions(ctx)?;
    emit_predicate_kinds(ctx);
    emit_unified_links(ctx)?;
    ctx.flush()?;
    Ok(reports)
}

fn emit_hierarchies<S: GraphSink>(ctx: &mut ImportContext<S>) -> Result<Vec<HierarchyReport>> {
    info!("breaking hierarchy cycles");
    let hierarchies = ctx.take_hierarchies();
    let resolutions: Vec<CycleResolution> = hierarchies
        .par_iter()
        .map(|(_, _, graph)| break_cycles(graph))
        .collect();

    let v = *ctx.vocabulary();
    let mut reports = Vec::with_capacity(hierarchies.len());
    for ((terminology, originals, graph), resolution) in hierarchies.iter().zip(&resolutions) {
        log_cycles(terminology, resolution);

        for original in originals {
            match resolution.parents_of(*original) {
                Some(parents) => {
                    for parent in parents {
                        ctx.push(Triple::new(*original, v.subclass_of, *parent));
                    }
                }
                None => ctx.push(Triple::new(*original, v.subclass_of, v.concept)),
            }
            ctx.check_flush()?;
        }
        ctx.flush()?;

        for members in &resolution.equivalences {
            emit_equivalence(ctx, members);
        }
        ctx.flush()?;

        reports.push(HierarchyReport::new(
            terminology,
            originals.len(),
            graph.edge_count(),
            resolution,
        ));
    }
    Ok(reports)
}

fn log_cycles(terminology: &str, resolution: &CycleResolution) {
    if resolution.cycles.is_empty() {
        return;
    }
    info!(
        terminology,
        cycles = resolution.cycle_count(),
        "hierarchy cycles found"
    );
    for cycle in &resolution.cycles {
        let members: Vec<u32> = cycle.members.iter().map(|m| m.raw()).collect();
        match cycle.decision {
            CycleDecision::Dominant(winner) => info!(
                terminology,
                ?members,
                winner = winner.raw(),
                "cycle rooted at its dominant member"
            ),
            CycleDecision::Equivalent => info!(
                terminology,
                ?members,
                "cycle collapsed into an equivalence class"
            ),
        }
    }
}

/// A star of `equivalentClass` edges from the smallest member.
fn emit_equivalence<S: GraphSink>(ctx: &mut ImportContext<S>, members: &BTreeSet<StrId>) {
    let equivalent_class = ctx.vocabulary().equivalent_class;
    let mut iter = members.iter();
    let Some(first) = iter.next() else {
        return;
    };
    for other in iter {
        ctx.push(Triple::new(*first, equivalent_class, *other));
    }
}

fn emit_only_restrictions<S: GraphSink>(ctx: &mut ImportContext<S>) -> Result<()> {
    let deferred = ctx.take_only_restrictions();
    info!(count = deferred.len(), "finalizing only restrictions");
    for ((subject, predicate), values) in deferred {
        ctx.restrict_only(subject, predicate, &values);
        ctx.check_flush()?;
    }
    Ok(())
}

/// Predicates asserted more often indirectly than directly are `only`
/// properties.
fn emit_predicate_kinds<S: GraphSink>(ctx: &mut ImportContext<S>) {
    let (direct, indirect) = ctx.take_predicate_uses();
    let predicates: BTreeSet<StrId> = direct.keys().chain(indirect.keys()).copied().collect();
    let marker = ctx.vocabulary().class_property_type;
    for predicate in predicates {
        let d = direct.get(&predicate).copied().unwrap_or(0);
        let i = indirect.get(&predicate).copied().unwrap_or(0);
        if i > d {
            ctx.push(Triple::new(predicate, marker, Literal::plain("only")));
        }
    }
}

fn emit_unified_links<S: GraphSink>(ctx: &mut ImportContext<S>) -> Result<()> {
    let (unified_to_originals, original_to_unifieds) = ctx.take_unified_links();
    if !ctx.extract_unified() {
        return Ok(());
    }
    info!(
        unified = unified_to_originals.len(),
        "finalizing unified concept mappings"
    );
    let v = *ctx.vocabulary();
    for (unified, originals) in unified_to_originals {
        ctx.restrict_only(unified, v.originals, &originals);
        ctx.check_flush()?;
    }
    for (original, unifieds) in original_to_unifieds {
        ctx.restrict_only(original, v.unifieds, &unifieds);
        ctx.check_flush()?;
    }
    Ok(())
}
