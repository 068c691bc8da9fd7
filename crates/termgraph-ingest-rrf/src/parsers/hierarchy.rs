//! `MRHIER`: per-terminology parent edges.
//!
//! The immediate parent is the last atom of the dot-separated ancestor path;
//! the explicit parent-atom column is not used.

use crate::context::ImportContext;
use termgraph_store::GraphSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HierarchyRecord<'a> {
    pub aui: &'a str,
    pub path: &'a str,
}

impl<'a> HierarchyRecord<'a> {
    pub fn from_fields(fields: &[&'a str]) -> Self {
        Self {
            aui: fields[1],
            path: fields[6],
        }
    }

    pub fn parent_aui(&self) -> &'a str {
        self.path.rsplit('.').next().unwrap_or(self.path)
    }
}

pub fn parse<S: GraphSink>(ctx: &mut ImportContext<S>, fields: &[&str]) {
    let record = HierarchyRecord::from_fields(fields);

    let (Some(child), Some(parent)) = (
        ctx.resolve_atom(record.aui),
        ctx.resolve_atom(record.parent_aui()),
    ) else {
        ctx.stats.unresolved += 1;
        return;
    };
    if child == parent {
        ctx.stats.filtered += 1;
        return;
    }
    let Some(terminology) = ctx.terminology_of(child) else {
        ctx.stats.unresolved += 1;
        return;
    };
    ctx.add_parent(terminology, child, parent);
    ctx.stats.accepted += 1;
}
