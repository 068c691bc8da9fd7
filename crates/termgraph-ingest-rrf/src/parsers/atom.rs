//! `MRCONSO`: atoms, the table every later table joins on.
//!
//! One record names one term of one original concept. The parser binds the
//! atom id to its original (suppressed atoms included, so that later tables
//! can still resolve them), creates original and unified concepts on first
//! sight and buffers the term for label selection.

use crate::context::{is_suppressed, ImportContext, Term};
use crate::language::two_letter;
use crate::table::Table;
use crate::{ImportError, Result, ROOT_SOURCE};
use termgraph_store::GraphSink;

/// Placeholder code for atoms without a source code.
const NO_CODE: &str = "NOCODE";

/// Known malformed codes and their corrections.
const CODE_FIXES: [(&str, &str); 2] = [("R40-F46.9", "R40-R46.9"), ("R90-F94.9", "R90-R94.9")];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtomRecord<'a> {
    pub cui: &'a str,
    pub language: &'a str,
    pub aui: &'a str,
    pub terminology: &'a str,
    pub term_type: &'a str,
    pub code: &'a str,
    pub text: &'a str,
    pub suppress: &'a str,
}

impl<'a> AtomRecord<'a> {
    pub fn from_fields(fields: &[&'a str]) -> Self {
        Self {
            cui: fields[0],
            language: fields[1],
            aui: fields[7],
            terminology: fields[11],
            term_type: fields[12],
            code: fields[13],
            text: fields[14],
            suppress: fields[16],
        }
    }
}

pub fn parse<S: GraphSink>(ctx: &mut ImportContext<S>, fields: &[&str], line: u64) -> Result<()> {
    let record = AtomRecord::from_fields(fields);

    let language = two_letter(record.language).ok_or_else(|| ImportError::UnknownLanguage {
        code: record.language.to_string(),
        table: Table::Atom,
        line,
    })?;
    if !ctx.allows_language(language) {
        ctx.stats.filtered += 1;
        return Ok(());
    }

    let terminology = record.terminology;
    let mut code = record.code;
    if terminology == ROOT_SOURCE {
        code = code.strip_prefix("V-").unwrap_or(code);
    }
    if !ctx.allows_terminology(terminology) {
        let root_record = terminology == ROOT_SOURCE
            && (code == ROOT_SOURCE || ctx.allows_terminology(code));
        if !root_record {
            ctx.stats.filtered += 1;
            return Ok(());
        }
    }

    let code = match code {
        NO_CODE => ctx.next_arbitrary_code(),
        other => CODE_FIXES
            .iter()
            .find(|(bad, _)| *bad == other)
            .map_or(other, |(_, good)| *good)
            .to_string(),
    };

    let unified = ctx
        .extract_unified()
        .then(|| ctx.intern_unified(record.cui));
    let original = ctx.intern_original(terminology, &code);
    ctx.bind_atom(record.aui, original);

    if is_suppressed(record.suppress) {
        ctx.stats.suppressed += 1;
        return Ok(());
    }

    if let Some(unified) = unified {
        ctx.register_unified(unified);
    }
    let (terminology_id, created) = ctx.register_original(original, terminology);
    if created && terminology == ROOT_SOURCE && code != ROOT_SOURCE {
        let root = ctx.vocabulary().source_root;
        ctx.add_parent(terminology_id, original, root);
    }
    if let Some(unified) = unified {
        ctx.link_unified(original, unified);
    }

    let priority = ctx.priority(terminology, record.term_type);
    ctx.push_term(original, Term::new(priority, record.text, language));
    ctx.stats.accepted += 1;
    Ok(())
}
