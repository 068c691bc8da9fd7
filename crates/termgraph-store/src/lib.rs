//! Termgraph store boundary.
//!
//! The import pipeline never talks to a concrete database. It talks to a
//! [`GraphSink`], which offers exactly four capabilities:
//!
//! 1. **Interning**: map an IRI to a compact, stable [`StrId`] handle.
//! 2. **Blank nodes**: allocate a fresh anonymous node.
//! 3. **Batched append**: receive a `Vec<Triple>` of subject-predicate-object facts.
//! 4. **Finish**: a hook called exactly once when the import is done.
//!
//! Two sinks ship with this crate:
//!
//! - [`TripleStore`]: in-memory, indexed, snapshot-able (bincode).
//! - [`NTriplesSink`]: streams every batch to a writer as N-Triples.
//!
//! The object position of a triple is a single exhaustive tagged union
//! ([`Object`]): either a node (IRI or blank) or a literal carrying an optional
//! language tag or datatype. There is no third "maybe literal" state.

pub mod memory;
pub mod ntriples;
pub mod vocab;

use ahash::AHashMap;
use anyhow::Result;
use serde::{Deserialize, Serialize};

pub use memory::{StoreStats, TripleStore};
pub use ntriples::NTriplesSink;

// ============================================================================
// String Interning (Compact IRI Storage)
// ============================================================================

/// Interned IRI ID (4 bytes instead of 24+ for String)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct StrId(u32);

impl StrId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// String interner: maps strings to compact IDs.
///
/// IDs are dense and assigned in first-seen order, so `StrId::raw` can index
/// the reverse table directly.
#[derive(Debug, Default, Clone)]
pub struct StringInterner {
    str_to_id: AHashMap<String, StrId>,
    id_to_str: Vec<String>,
}

impl StringInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning its ID
    pub fn intern(&mut self, s: &str) -> StrId {
        if let Some(id) = self.str_to_id.get(s) {
            return *id;
        }

        let id = StrId(self.id_to_str.len() as u32);
        self.str_to_id.insert(s.to_string(), id);
        self.id_to_str.push(s.to_string());
        id
    }

    /// Look up an existing ID for a string without inserting.
    pub fn id_of(&self, s: &str) -> Option<StrId> {
        self.str_to_id.get(s).copied()
    }

    /// Look up string by ID
    pub fn lookup(&self, id: StrId) -> Option<&str> {
        self.id_to_str.get(id.0 as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.id_to_str.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_str.is_empty()
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(&self.id_to_str)?)
    }

    /// Deserialize from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let strings: Vec<String> = bincode::deserialize(bytes)?;
        let mut interner = Self::new();
        for s in strings {
            interner.intern(&s);
        }
        Ok(interner)
    }
}

impl Serialize for StringInterner {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.id_to_str.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StringInterner {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let strings = Vec::<String>::deserialize(deserializer)?;
        let mut interner = Self::new();
        for s in strings {
            interner.intern(&s);
        }
        Ok(interner)
    }
}

// ============================================================================
// Fact model
// ============================================================================

/// A node in subject or object position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeRef {
    Iri(StrId),
    Blank(u64),
}

impl From<StrId> for NodeRef {
    fn from(id: StrId) -> Self {
        NodeRef::Iri(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiteralTag {
    Plain,
    Lang(String),
    Datatype(StrId),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    pub lexical: String,
    pub tag: LiteralTag,
}

impl Literal {
    pub fn plain(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            tag: LiteralTag::Plain,
        }
    }

    pub fn lang(lexical: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            tag: LiteralTag::Lang(lang.into()),
        }
    }

    pub fn typed(lexical: impl Into<String>, datatype: StrId) -> Self {
        Self {
            lexical: lexical.into(),
            tag: LiteralTag::Datatype(datatype),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Object {
    Node(NodeRef),
    Literal(Literal),
}

impl Object {
    pub fn as_node(&self) -> Option<NodeRef> {
        match self {
            Object::Node(node) => Some(*node),
            Object::Literal(_) => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Object::Node(_) => None,
            Object::Literal(lit) => Some(lit),
        }
    }
}

impl From<NodeRef> for Object {
    fn from(node: NodeRef) -> Self {
        Object::Node(node)
    }
}

impl From<StrId> for Object {
    fn from(id: StrId) -> Self {
        Object::Node(NodeRef::Iri(id))
    }
}

impl From<Literal> for Object {
    fn from(lit: Literal) -> Self {
        Object::Literal(lit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: NodeRef,
    pub predicate: StrId,
    pub object: Object,
}

impl Triple {
    pub fn new(subject: impl Into<NodeRef>, predicate: StrId, object: impl Into<Object>) -> Self {
        Self {
            subject: subject.into(),
            predicate,
            object: object.into(),
        }
    }
}

// ============================================================================
// Sink
// ============================================================================

/// The capabilities the import pipeline needs from a graph store.
pub trait GraphSink {
    /// Intern an IRI. Idempotent: the same string always yields the same handle.
    fn intern(&mut self, iri: &str) -> StrId;

    /// Allocate a fresh anonymous node.
    fn new_blank_node(&mut self) -> NodeRef;

    /// Append a batch of facts.
    fn append(&mut self, batch: Vec<Triple>) -> Result<()>;

    /// Called once after the last batch.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: GraphSink + ?Sized> GraphSink for &mut S {
    fn intern(&mut self, iri: &str) -> StrId {
        (**self).intern(iri)
    }

    fn new_blank_node(&mut self) -> NodeRef {
        (**self).new_blank_node()
    }

    fn append(&mut self, batch: Vec<Triple>) -> Result<()> {
        (**self).append(batch)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}
