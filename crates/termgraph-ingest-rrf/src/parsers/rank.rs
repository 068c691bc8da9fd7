//! `MRRANK`: term-type priorities.

use crate::context::{is_suppressed, ImportContext};
use crate::ROOT_SOURCE;
use termgraph_store::GraphSink;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankRecord<'a> {
    pub rank: &'a str,
    pub terminology: &'a str,
    pub term_type: &'a str,
    pub suppress: &'a str,
}

impl<'a> RankRecord<'a> {
    pub fn from_fields(fields: &[&'a str]) -> Self {
        Self {
            rank: fields[0],
            terminology: fields[1],
            term_type: fields[2],
            suppress: fields[3],
        }
    }
}

pub fn parse<S: GraphSink>(ctx: &mut ImportContext<S>, fields: &[&str]) {
    let record = RankRecord::from_fields(fields);

    if record.terminology != ROOT_SOURCE && !ctx.allows_terminology(record.terminology) {
        ctx.stats.filtered += 1;
        return;
    }
    if is_suppressed(record.suppress) {
        ctx.stats.suppressed += 1;
        return;
    }
    let Ok(rank) = record.rank.trim().parse::<i64>() else {
        debug!(rank = record.rank, "non-numeric rank skipped");
        ctx.stats.filtered += 1;
        return;
    };
    ctx.set_priority(record.terminology, record.term_type, rank);
    ctx.stats.accepted += 1;
}

#[cfg(test)]
mod tests {
    use crate::config::ImportConfig;
    use crate::parsers::test_support::{context, feed};
    use crate::table::Table;

    #[test]
    fn ranks_respect_filters_and_suppression() -> crate::Result<()> {
        let config = ImportConfig::default().with_terminologies(["T1"]);
        let mut ctx = context(&config);
        let text = "7|T1|PT|N|\n5|T1|SY|Y|\n9|T2|PT|N|\n3|SRC|RPT|N|\n";
        feed(Table::Rank, &text, &mut ctx)?;

        assert_eq!(ctx.priority("T1", "PT"), 7);
        assert_eq!(ctx.priority("T1", "SY"), 0);
        assert_eq!(ctx.priority("T2", "PT"), 0);
        assert_eq!(ctx.priority("SRC", "RPT"), 3);
        let stats = ctx.stats();
        assert_eq!((stats.accepted, stats.suppressed, stats.filtered), (2, 1, 1));
        Ok(())
    }
}
