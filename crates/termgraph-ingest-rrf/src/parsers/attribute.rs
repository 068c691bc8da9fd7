//! `MRSAT`: literal attributes, one runtime predicate per attribute name.

use crate::context::{is_suppressed, ImportContext, PredicateKind};
use termgraph_store::{GraphSink, Literal, Triple};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeRecord<'a> {
    pub cui: &'a str,
    pub metaui: &'a str,
    pub name: &'a str,
    pub terminology: &'a str,
    pub value: &'a str,
    pub suppress: &'a str,
}

impl<'a> AttributeRecord<'a> {
    pub fn from_fields(fields: &[&'a str]) -> Self {
        Self {
            cui: fields[0],
            metaui: fields[3],
            name: fields[8],
            terminology: fields[9],
            value: fields[10],
            suppress: fields[11],
        }
    }
}

pub fn parse<S: GraphSink>(ctx: &mut ImportContext<S>, fields: &[&str]) {
    let record = AttributeRecord::from_fields(fields);

    if is_suppressed(record.suppress) {
        ctx.stats.suppressed += 1;
        return;
    }
    if !ctx.allows_terminology(record.terminology) {
        ctx.stats.filtered += 1;
        return;
    }

    let predicate = ctx.predicate(&record.name.to_lowercase(), PredicateKind::Annotation);

    let subject = if record.metaui.is_empty() {
        if !ctx.extract_unified() {
            ctx.stats.filtered += 1;
            return;
        }
        ctx.intern_unified(record.cui)
    } else if record.metaui.starts_with('A') {
        match ctx.resolve_atom(record.metaui) {
            Some(original) => original,
            None => {
                debug!(atom = record.metaui, "attribute on unresolved atom skipped");
                ctx.stats.unresolved += 1;
                return;
            }
        }
    } else {
        ctx.stats.filtered += 1;
        return;
    };

    ctx.push(Triple::new(subject, predicate, Literal::plain(record.value)));
    ctx.stats.accepted += 1;
}

#[cfg(test)]
mod tests {
    use crate::config::ImportConfig;
    use crate::parsers::test_support::{atom_line, context, feed};
    use crate::table::Table;
    use termgraph_store::{Literal, Object};

    fn sat_line(
        cui: &str,
        metaui: &str,
        atn: &str,
        sab: &str,
        atv: &str,
        suppress: &str,
    ) -> String {
        format!("{cui}|L1|S1|{metaui}|AUI|CODE|AT1|SAT1|{atn}|{sab}|{atv}|{suppress}|N|")
    }

    #[test]
    fn attributes_attach_to_atoms_or_unified_concepts() -> crate::Result<()> {
        let mut ctx = context(&ImportConfig::default());
        let atoms = atom_line("C1", "ENG", "A1", "T1", "PT", "X", "x", "N");
        feed(Table::Atom, &atoms, &mut ctx)?;
        let _ = ctx.take_stats();

        let text = [
            sat_line("C1", "A1", "CHARGE", "T1", "+1", "N"),
            sat_line("C1", "", "MESH_TREE", "T1", "C01", "N"),
            sat_line("C1", "A404", "CHARGE", "T1", "0", "N"),
            sat_line("C1", "R7", "REL_ATTR", "T1", "r", "N"),
            sat_line("C1", "A1", "CHARGE", "T1", "-1", "Y"),
        ]
        .join("\n");
        feed(Table::Attribute, &text, &mut ctx)?;
        ctx.flush()?;

        let charge = ctx.predicates().get("charge").expect("lower-cased predicate");
        let tree = ctx.predicates().get("mesh_tree").expect("declared");
        let x = ctx.intern_original("T1", "X");
        let c1 = ctx.intern_unified("C1");
        let store = ctx.sink();
        assert!(store.contains(x.into(), charge, &Object::Literal(Literal::plain("+1"))));
        assert!(store.contains(c1.into(), tree, &Object::Literal(Literal::plain("C01"))));
        assert_eq!(store.objects(x.into(), charge).len(), 1);

        let stats = ctx.stats();
        assert_eq!(
            (stats.accepted, stats.unresolved, stats.filtered, stats.suppressed),
            (2, 1, 1, 1)
        );
        Ok(())
    }
}
