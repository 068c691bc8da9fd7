//! Streaming N-Triples output.

use crate::{GraphSink, LiteralTag, NodeRef, Object, StrId, StringInterner, Triple};
use anyhow::{anyhow, Result};
use std::io::Write;

/// A sink that writes every appended batch straight to `writer`.
///
/// Only the interner is kept in memory; facts are not retained.
pub struct NTriplesSink<W: Write> {
    writer: W,
    interner: StringInterner,
    next_blank: u64,
    written: u64,
}

impl<W: Write> NTriplesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            interner: StringInterner::new(),
            next_blank: 0,
            written: 0,
        }
    }

    /// Number of facts written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> GraphSink for NTriplesSink<W> {
    fn intern(&mut self, iri: &str) -> StrId {
        self.interner.intern(iri)
    }

    fn new_blank_node(&mut self) -> NodeRef {
        let id = self.next_blank;
        self.next_blank += 1;
        NodeRef::Blank(id)
    }

    fn append(&mut self, batch: Vec<Triple>) -> Result<()> {
        for triple in &batch {
            write_triple(&self.interner, triple, &mut self.writer)?;
        }
        self.written += batch.len() as u64;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

pub(crate) fn write_triple<W: Write>(
    interner: &StringInterner,
    triple: &Triple,
    writer: &mut W,
) -> Result<()> {
    write_node(interner, triple.subject, writer)?;
    writer.write_all(b" ")?;
    write_iri(interner, triple.predicate, writer)?;
    writer.write_all(b" ")?;
    match &triple.object {
        Object::Node(node) => write_node(interner, *node, writer)?,
        Object::Literal(lit) => {
            writer.write_all(b"\"")?;
            writer.write_all(escape_literal(&lit.lexical).as_bytes())?;
            writer.write_all(b"\"")?;
            match &lit.tag {
                LiteralTag::Plain => {}
                LiteralTag::Lang(lang) => write!(writer, "@{lang}")?,
                LiteralTag::Datatype(dt) => {
                    writer.write_all(b"^^")?;
                    write_iri(interner, *dt, writer)?;
                }
            }
        }
    }
    writer.write_all(b" .\n")?;
    Ok(())
}

fn write_node<W: Write>(interner: &StringInterner, node: NodeRef, writer: &mut W) -> Result<()> {
    match node {
        NodeRef::Iri(id) => write_iri(interner, id, writer),
        NodeRef::Blank(n) => {
            write!(writer, "_:b{n}")?;
            Ok(())
        }
    }
}

fn write_iri<W: Write>(interner: &StringInterner, id: StrId, writer: &mut W) -> Result<()> {
    let iri = interner
        .lookup(id)
        .ok_or_else(|| anyhow!("unknown IRI handle {}", id.raw()))?;
    write!(writer, "<{iri}>")?;
    Ok(())
}

fn escape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{vocab, Literal};

    #[test]
    fn writes_nodes_and_tagged_literals() -> Result<()> {
        let mut sink = NTriplesSink::new(Vec::new());
        let a = sink.intern("http://UMLS/T1/A");
        let label = sink.intern(vocab::RDFS_LABEL);
        let bn = sink.new_blank_node();
        let ty = sink.intern(vocab::RDF_TYPE);
        let restriction = sink.intern(vocab::OWL_RESTRICTION);
        sink.append(vec![
            Triple::new(a, label, Literal::lang("Say \"hi\"", "en")),
            Triple::new(bn, ty, restriction),
        ])?;
        sink.finish()?;
        assert_eq!(sink.written(), 2);

        let text = String::from_utf8(sink.into_inner())?;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            concat!(
                "<http://UMLS/T1/A> <http://www.w3.org/2000/01/rdf-schema#label> ",
                "\"Say \\\"hi\\\"\"@en ."
            )
        );
        assert!(lines[1].starts_with("_:b0 <http://www.w3.org/1999/02/22-rdf-syntax-ns#type>"));
        Ok(())
    }
}
