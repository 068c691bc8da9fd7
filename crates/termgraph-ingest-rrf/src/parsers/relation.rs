//! `MRREL`: typed relations between original concepts.
//!
//! Atom-level relations name both ends and are related immediately.
//! Source-asserted relations carrying only the object atom are correlated by
//! `(terminology, source relation id)`: the first half is parked, and the
//! matching half relates both directions.

use crate::context::{is_suppressed, ImportContext, PartialRelation, PredicateKind};
use termgraph_store::GraphSink;

/// Relation kinds that only restate the hierarchy table.
const HIERARCHY_KINDS: [&str; 2] = ["PAR", "CHD"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationRecord<'a> {
    pub aui1: &'a str,
    pub kind: &'a str,
    pub aui2: &'a str,
    pub subtype: &'a str,
    pub source_id: &'a str,
    pub terminology: &'a str,
    pub group: &'a str,
    pub direct: bool,
    pub suppress: &'a str,
}

impl<'a> RelationRecord<'a> {
    pub fn from_fields(fields: &[&'a str]) -> Self {
        Self {
            aui1: fields[1],
            kind: fields[3],
            aui2: fields[5],
            subtype: fields[7],
            source_id: fields[9],
            terminology: fields[10],
            group: fields[12],
            direct: fields[13] == "Y",
            suppress: fields[14],
        }
    }

    /// The predicate name: the subtype when present, else the kind.
    pub fn predicate_name(&self) -> &'a str {
        if self.subtype.is_empty() {
            self.kind
        } else {
            self.subtype
        }
    }
}

pub fn parse<S: GraphSink>(ctx: &mut ImportContext<S>, fields: &[&str]) {
    let record = RelationRecord::from_fields(fields);

    if HIERARCHY_KINDS.contains(&record.kind) {
        ctx.stats.filtered += 1;
        return;
    }
    if is_suppressed(record.suppress) {
        ctx.stats.suppressed += 1;
        return;
    }

    if !record.aui1.is_empty() {
        let resolved = (ctx.resolve_atom(record.aui1), ctx.resolve_atom(record.aui2));
        let (Some(o1), Some(o2)) = resolved else {
            ctx.stats.unresolved += 1;
            return;
        };
        if !ctx.is_registered(o1) || !ctx.is_registered(o2) {
            ctx.stats.unresolved += 1;
            return;
        }
        let predicate = ctx.predicate(record.predicate_name(), PredicateKind::Object);
        ctx.relate(o2, predicate, o1, record.group, record.direct);
        ctx.stats.accepted += 1;
    } else if !record.source_id.is_empty() {
        let Some(o2) = ctx.resolve_atom(record.aui2) else {
            ctx.stats.unresolved += 1;
            return;
        };
        let terminology = if record.terminology.is_empty() {
            match ctx.terminology_of(o2) {
                Some(id) => ctx.terminology_name(id).to_string(),
                None => {
                    ctx.stats.unresolved += 1;
                    return;
                }
            }
        } else {
            record.terminology.to_string()
        };
        let predicate = ctx.predicate(record.predicate_name(), PredicateKind::Object);
        let key = (terminology, record.source_id.to_string());

        match ctx.partial_relations.get(&key).cloned() {
            Some(first) => {
                let o1 = first.subject;
                if !ctx.is_registered(o1) || !ctx.is_registered(o2) {
                    ctx.stats.unresolved += 1;
                    return;
                }
                ctx.relate(o2, predicate, o1, record.group, record.direct);
                ctx.relate(o1, first.predicate, o2, &first.group, first.direct);
                ctx.stats.accepted += 1;
            }
            None => {
                ctx.partial_relations.insert(
                    key,
                    PartialRelation {
                        predicate,
                        subject: o2,
                        group: record.group.to_string(),
                        direct: record.direct,
                    },
                );
                ctx.stats.accepted += 1;
            }
        }
    } else {
        ctx.stats.filtered += 1;
    }
}
