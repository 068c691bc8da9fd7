//! In-memory triple store.
//!
//! Facts are kept in append order; two indexes are maintained on every append:
//!
//! - forward: `(subject, predicate) -> fact ids`
//! - backward: `(predicate, node object) -> fact ids`
//!
//! Indexes are not serialized. Snapshots carry the interner, the fact list and
//! the blank-node counter; indexes are rebuilt on load.

use crate::{GraphSink, NodeRef, Object, StrId, StringInterner, Triple};
use ahash::AHashMap;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

const SNAPSHOT_MAGIC: &[u8; 8] = b"TGSNAP01";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub facts: usize,
    pub iris: usize,
    pub blank_nodes: u64,
    pub literal_facts: usize,
    pub batches: u64,
    pub finished: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TripleStore {
    interner: StringInterner,
    facts: Vec<Triple>,
    next_blank: u64,
    batches: u64,
    finished: bool,
    #[serde(skip)]
    forward_index: AHashMap<(NodeRef, StrId), Vec<u32>>,
    #[serde(skip)]
    backward_index: AHashMap<(StrId, NodeRef), Vec<u32>>,
}

impl TripleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    pub fn facts(&self) -> &[Triple] {
        &self.facts
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Resolve an already-interned IRI to a node, without inserting.
    pub fn node(&self, iri: &str) -> Option<NodeRef> {
        self.interner.id_of(iri).map(NodeRef::Iri)
    }

    pub fn iri_of(&self, id: StrId) -> Option<&str> {
        self.interner.lookup(id)
    }

    fn add(&mut self, triple: Triple) {
        let id = self.facts.len() as u32;
        self.forward_index
            .entry((triple.subject, triple.predicate))
            .or_default()
            .push(id);
        if let Object::Node(node) = &triple.object {
            self.backward_index
                .entry((triple.predicate, *node))
                .or_default()
                .push(id);
        }
        self.facts.push(triple);
    }

    fn rebuild_indexes(&mut self) {
        let facts = std::mem::take(&mut self.facts);
        self.forward_index.clear();
        self.backward_index.clear();
        for triple in facts {
            self.add(triple);
        }
    }

    /// Objects of `subject -[predicate]-> ?`.
    pub fn objects(&self, subject: NodeRef, predicate: StrId) -> Vec<&Object> {
        self.forward_index
            .get(&(subject, predicate))
            .map(|ids| {
                ids.iter()
                    .filter_map(|&id| self.facts.get(id as usize))
                    .map(|t| &t.object)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Node objects of `subject -[predicate]-> ?`.
    pub fn object_nodes(&self, subject: NodeRef, predicate: StrId) -> Vec<NodeRef> {
        self.objects(subject, predicate)
            .into_iter()
            .filter_map(Object::as_node)
            .collect()
    }

    /// Subjects of `? -[predicate]-> object`.
    pub fn subjects(&self, predicate: StrId, object: NodeRef) -> Vec<NodeRef> {
        self.backward_index
            .get(&(predicate, object))
            .map(|ids| {
                ids.iter()
                    .filter_map(|&id| self.facts.get(id as usize))
                    .map(|t| t.subject)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Check whether `subject -[predicate]-> object` is present.
    pub fn contains(&self, subject: NodeRef, predicate: StrId, object: &Object) -> bool {
        self.objects(subject, predicate)
            .into_iter()
            .any(|o| o == object)
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            facts: self.facts.len(),
            iris: self.interner.len(),
            blank_nodes: self.next_blank,
            literal_facts: self
                .facts
                .iter()
                .filter(|t| matches!(t.object, Object::Literal(_)))
                .count(),
            batches: self.batches,
            finished: self.finished,
        }
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = SNAPSHOT_MAGIC.to_vec();
        out.extend(bincode::serialize(self)?);
        Ok(out)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let body = bytes
            .strip_prefix(SNAPSHOT_MAGIC.as_slice())
            .ok_or_else(|| anyhow!("not a termgraph snapshot (bad magic bytes)"))?;
        let mut store: TripleStore = bincode::deserialize(body)?;
        store.rebuild_indexes();
        Ok(store)
    }

    pub fn save_snapshot(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    pub fn load_snapshot(path: &Path) -> Result<Self> {
        Self::from_bytes(&std::fs::read(path)?)
    }

    /// Write every fact as N-Triples.
    pub fn write_ntriples<W: Write>(&self, mut writer: W) -> Result<()> {
        for triple in &self.facts {
            crate::ntriples::write_triple(&self.interner, triple, &mut writer)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl GraphSink for TripleStore {
    fn intern(&mut self, iri: &str) -> StrId {
        self.interner.intern(iri)
    }

    fn new_blank_node(&mut self) -> NodeRef {
        let id = self.next_blank;
        self.next_blank += 1;
        NodeRef::Blank(id)
    }

    fn append(&mut self, batch: Vec<Triple>) -> Result<()> {
        if self.finished {
            return Err(anyhow!("append after finish"));
        }
        if batch.is_empty() {
            return Ok(());
        }
        self.batches += 1;
        self.facts.reserve(batch.len());
        for triple in batch {
            self.add(triple);
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}
