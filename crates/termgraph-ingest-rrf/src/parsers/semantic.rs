//! Semantic types: `SRDEF` (the type reference table) and `MRSTY` (type
//! assignments of unified concepts).

use crate::context::ImportContext;
use termgraph_store::{GraphSink, Literal, Triple};

/// `SRDEF` record type of semantic types; relation rows (`RL`) are skipped.
const SEMANTIC_TYPE_ROW: &str = "STY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SemanticTypeDefinition<'a> {
    pub row_type: &'a str,
    pub tui: &'a str,
    pub name: &'a str,
    pub definition: &'a str,
    pub abbreviation: &'a str,
}

impl<'a> SemanticTypeDefinition<'a> {
    pub fn from_fields(fields: &[&'a str]) -> Self {
        Self {
            row_type: fields[0],
            tui: fields[1],
            name: fields[2],
            definition: fields[4],
            abbreviation: fields[8],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SemanticTypeAssignment<'a> {
    pub cui: &'a str,
    pub tui: &'a str,
    pub name: &'a str,
}

impl<'a> SemanticTypeAssignment<'a> {
    pub fn from_fields(fields: &[&'a str]) -> Self {
        Self {
            cui: fields[0],
            tui: fields[1],
            name: fields[3],
        }
    }
}

pub fn parse_definition<S: GraphSink>(ctx: &mut ImportContext<S>, fields: &[&str]) {
    let record = SemanticTypeDefinition::from_fields(fields);
    if record.row_type != SEMANTIC_TYPE_ROW {
        ctx.stats.filtered += 1;
        return;
    }

    let (sem, _) = ctx.semantic_type(record.tui);
    let v = *ctx.vocabulary();
    ctx.push(Triple::new(sem, v.label, Literal::lang(record.name, "en")));
    if !record.abbreviation.is_empty() {
        ctx.push(Triple::new(sem, v.synonyms, Literal::lang(record.abbreviation, "en")));
    }
    if !record.definition.is_empty() {
        ctx.push(Triple::new(sem, v.definitions, Literal::plain(record.definition)));
    }
    ctx.stats.accepted += 1;
}

pub fn parse_assignment<S: GraphSink>(ctx: &mut ImportContext<S>, fields: &[&str]) {
    let record = SemanticTypeAssignment::from_fields(fields);

    let unified = ctx.intern_unified(record.cui);
    if !ctx.is_unified_registered(unified) {
        ctx.stats.unresolved += 1;
        return;
    }
    let (sem, created) = ctx.semantic_type(record.tui);
    let v = *ctx.vocabulary();
    if created {
        ctx.push(Triple::new(sem, v.label, Literal::plain(record.name)));
    }
    ctx.push(Triple::new(unified, v.subclass_of, sem));
    ctx.stats.accepted += 1;
}
