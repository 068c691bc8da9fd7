//! Record parsers, one per table kind.
//!
//! [`parse_table`] owns the shared line loop: remnant carry-over, field
//! splitting, UTF-8 decoding. Each submodule turns one complete record into
//! context updates and output facts.

pub mod atom;
pub mod attribute;
pub mod definition;
pub mod hierarchy;
pub mod rank;
pub mod relation;
pub mod semantic;

use crate::context::ImportContext;
use crate::reader::{split_record, Remnant, TableLines};
use crate::table::Table;
use crate::{ImportError, Result};
use std::io::BufRead;
use termgraph_store::GraphSink;
use tracing::warn;

/// Stream `lines` of `table` into `ctx`.
///
/// `remnant` is prepended to the first line. The first line whose field count
/// is wrong ends this member and is returned as the next remnant; an empty
/// remnant means the member ended on a record boundary.
pub fn parse_table<S, R>(
    table: Table,
    mut lines: TableLines<R>,
    ctx: &mut ImportContext<S>,
    mut remnant: Remnant,
) -> Result<Remnant>
where
    S: GraphSink,
    R: BufRead,
{
    while let Some(line) = lines.next() {
        let line = remnant.join(line?);
        let Some(raw) = split_record(&line, table.field_count()) else {
            if lines.next().is_some() {
                warn!(%table, "fragment before the end of a member; rest of the member skipped");
            }
            return Ok(Remnant::new(line));
        };

        ctx.stats.records += 1;
        let record = ctx.stats.records;
        let fields = decode(&raw).ok_or(ImportError::InvalidUtf8 {
            table,
            line: record,
        })?;

        match table {
            Table::Rank => rank::parse(ctx, &fields),
            Table::Atom => atom::parse(ctx, &fields, record)?,
            Table::Definition => definition::parse(ctx, &fields),
            Table::Hierarchy => hierarchy::parse(ctx, &fields),
            Table::Relation => relation::parse(ctx, &fields),
            Table::Attribute => attribute::parse(ctx, &fields),
            Table::SemanticTypeDefinition => semantic::parse_definition(ctx, &fields),
            Table::SemanticType => semantic::parse_assignment(ctx, &fields),
        }
        ctx.check_flush()?;
    }
    Ok(remnant)
}

fn decode<'a>(raw: &[&'a [u8]]) -> Option<Vec<&'a str>> {
    raw.iter().map(|f| std::str::from_utf8(f).ok()).collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::parse_table;
    use crate::config::ImportConfig;
    use crate::context::ImportContext;
    use crate::reader::{Remnant, TableLines};
    use crate::table::Table;
    use termgraph_store::TripleStore;

    pub fn context(config: &ImportConfig) -> ImportContext<TripleStore> {
        ImportContext::new(config, TripleStore::new()).expect("context")
    }

    /// Parse a whole table text in one member.
    pub fn feed(
        table: Table,
        text: &str,
        ctx: &mut ImportContext<TripleStore>,
    ) -> crate::Result<Remnant> {
        parse_table(table, TableLines::from_bytes(text.as_bytes()), ctx, Remnant::default())
    }

    /// An atom line with the fields the parser reads filled in.
    #[allow(clippy::too_many_arguments)]
    pub fn atom_line(
        cui: &str,
        lang: &str,
        aui: &str,
        sab: &str,
        tty: &str,
        code: &str,
        text: &str,
        suppress: &str,
    ) -> String {
        format!("{cui}|{lang}|P|L1|PF|S1|Y|{aui}||||{sab}|{tty}|{code}|{text}|0|{suppress}|256|")
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::config::ImportConfig;
    use proptest::prelude::*;

    #[test]
    fn fragment_becomes_the_remnant() -> Result<()> {
        let mut ctx = context(&ImportConfig::default());
        let text = "1|T1|PT|N|\n2|T1|SY";
        let remnant = feed(Table::Rank, text, &mut ctx)?;
        assert_eq!(remnant.as_bytes(), b"2|T1|SY");
        assert_eq!(ctx.priority("T1", "PT"), 1);

        let rest = "|N|\n";
        let lines = TableLines::from_bytes(rest.as_bytes());
        let remnant = parse_table(Table::Rank, lines, &mut ctx, remnant)?;
        assert!(remnant.is_empty());
        assert_eq!(ctx.priority("T1", "SY"), 2);
        assert_eq!(ctx.stats().records, 2);
        Ok(())
    }

    #[test]
    fn invalid_utf8_is_fatal() {
        let mut ctx = context(&ImportConfig::default());
        let bytes: &[u8] = b"1|T\xff|PT|N|\n";
        let lines = TableLines::from_bytes(bytes);
        let err = parse_table(Table::Rank, lines, &mut ctx, Remnant::default());
        assert!(matches!(err, Err(ImportError::InvalidUtf8 { line: 1, .. })));
    }

    fn labels(ctx: &mut ImportContext<termgraph_store::TripleStore>) -> Vec<String> {
        ctx.after_table(Table::Atom).expect("after");
        let store = ctx.sink();
        let label = ctx.vocabulary().label;
        store
            .facts()
            .iter()
            .filter(|t| t.predicate == label)
            .filter_map(|t| t.object.as_literal().map(|l| l.lexical.clone()))
            .collect()
    }

    proptest! {
        #[test]
        fn a_record_split_anywhere_parses_like_the_whole(cut in 0usize..64) {
            let line = atom_line("C1", "FRE", "A1", "T1", "PT", "X1", "fièvre aiguë", "N");
            let bytes = format!("{line}\n").into_bytes();
            let cut = cut.min(bytes.len());

            let mut whole = context(&ImportConfig::default());
            let lines = TableLines::from_bytes(&bytes);
            parse_table(Table::Atom, lines, &mut whole, Remnant::default()).expect("whole");

            let mut split = context(&ImportConfig::default());
            let (head, tail) = bytes.split_at(cut);
            let remnant = parse_table(
                Table::Atom,
                TableLines::from_bytes(head),
                &mut split,
                Remnant::default(),
            )
            .expect("head");
            let lines = TableLines::from_bytes(tail);
            let remnant = parse_table(Table::Atom, lines, &mut split, remnant).expect("tail");

            prop_assert!(remnant.is_empty());
            prop_assert_eq!(split.stats().records, 1);
            prop_assert!(split.resolve_atom("A1").is_some());
            prop_assert_eq!(labels(&mut split), labels(&mut whole));
        }
    }
}
