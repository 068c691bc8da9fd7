//! `MRDEF`: free-text definitions of original concepts.

use crate::context::{is_suppressed, ImportContext};
use termgraph_store::{GraphSink, Literal, Triple};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefinitionRecord<'a> {
    pub aui: &'a str,
    pub terminology: &'a str,
    pub text: &'a str,
    pub suppress: &'a str,
}

impl<'a> DefinitionRecord<'a> {
    pub fn from_fields(fields: &[&'a str]) -> Self {
        Self {
            aui: fields[1],
            terminology: fields[4],
            text: fields[5],
            suppress: fields[6],
        }
    }
}

pub fn parse<S: GraphSink>(ctx: &mut ImportContext<S>, fields: &[&str]) {
    let record = DefinitionRecord::from_fields(fields);

    if !ctx.allows_terminology(record.terminology) {
        ctx.stats.filtered += 1;
        return;
    }
    if is_suppressed(record.suppress) {
        ctx.stats.suppressed += 1;
        return;
    }
    let Some(original) = ctx.resolve_atom(record.aui) else {
        debug!(atom = record.aui, "definition on unresolved atom skipped");
        ctx.stats.unresolved += 1;
        return;
    };
    let definitions = ctx.vocabulary().definitions;
    ctx.push(Triple::new(original, definitions, Literal::plain(record.text)));
    ctx.stats.accepted += 1;
}
