//! Shared import state.
//!
//! Every parser and the finalizer receive `&mut ImportContext`. The context
//! owns the sink, the output buffer and every cross-reference map. Large maps
//! are released as soon as the last table that reads them is done:
//!
//! | State | Filled by | Released after |
//! |---|---|---|
//! | atom → original | atom | attribute |
//! | original → terms | atom | atom (label emission) |
//! | seen relations, partial relations, groups | relation | relation |
//! | parent graphs, deferred restrictions, unified links | atom … relation | finalization |

use crate::config::ImportConfig;
use crate::cycles::ParentGraph;
use crate::table::Table;
use crate::{Result, ROOT_SOURCE};
use ahash::{AHashMap, AHashSet};
use serde::Serialize;
use std::collections::BTreeSet;
use termgraph_store::{vocab, GraphSink, Literal, NodeRef, Object, StrId, Triple};

// ============================================================================
// Terms
// ============================================================================

/// A synonym. Field order is the label-selection order: priority first, then
/// text, then language.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Term {
    pub priority: i64,
    pub text: String,
    pub language: String,
}

impl Term {
    pub fn new(priority: i64, text: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            priority,
            text: text.into(),
            language: language.into(),
        }
    }
}

/// The display label: the greatest term.
pub fn select_label(terms: &[Term]) -> Option<&Term> {
    terms.iter().max()
}

/// All synonyms, sorted and deduplicated.
pub fn synonyms(terms: &[Term]) -> Vec<&Term> {
    let mut all: Vec<&Term> = terms.iter().collect();
    all.sort();
    all.dedup();
    all
}

// ============================================================================
// Vocabulary
// ============================================================================

/// Interned handles of every fixed IRI the importer writes.
#[derive(Debug, Clone, Copy)]
pub struct Vocabulary {
    pub rdf_type: StrId,
    pub rdf_first: StrId,
    pub rdf_rest: StrId,
    pub rdf_nil: StrId,
    pub subclass_of: StrId,
    pub label: StrId,
    pub owl_class: StrId,
    pub restriction: StrId,
    pub on_property: StrId,
    pub some_values_from: StrId,
    pub all_values_from: StrId,
    pub union_of: StrId,
    pub equivalent_class: StrId,
    pub inverse_of: StrId,
    pub object_property: StrId,
    pub annotation_property: StrId,

    pub concept: StrId,
    pub semantic_type: StrId,
    pub group: StrId,
    pub originals: StrId,
    pub unifieds: StrId,
    pub groups: StrId,
    pub synonyms: StrId,
    pub terminology: StrId,
    pub definitions: StrId,
    pub class_property_type: StrId,
    pub source_root: StrId,
    pub unified_root: StrId,
}

impl Vocabulary {
    fn intern<S: GraphSink>(sink: &mut S, base: &str) -> Self {
        let mut model = |name: &str| sink.intern(&format!("{base}model/{name}"));
        let concept = model("Concept");
        let semantic_type = model("SemanticType");
        let group = model("Group");
        let originals = model("originals");
        let unifieds = model("unifieds");
        let groups = model("groups");
        let synonyms = model("synonyms");
        let terminology = model("terminology");
        let definitions = model("definitions");
        Self {
            rdf_type: sink.intern(vocab::RDF_TYPE),
            rdf_first: sink.intern(vocab::RDF_FIRST),
            rdf_rest: sink.intern(vocab::RDF_REST),
            rdf_nil: sink.intern(vocab::RDF_NIL),
            subclass_of: sink.intern(vocab::RDFS_SUBCLASS_OF),
            label: sink.intern(vocab::RDFS_LABEL),
            owl_class: sink.intern(vocab::OWL_CLASS),
            restriction: sink.intern(vocab::OWL_RESTRICTION),
            on_property: sink.intern(vocab::OWL_ON_PROPERTY),
            some_values_from: sink.intern(vocab::OWL_SOME_VALUES_FROM),
            all_values_from: sink.intern(vocab::OWL_ALL_VALUES_FROM),
            union_of: sink.intern(vocab::OWL_UNION_OF),
            equivalent_class: sink.intern(vocab::OWL_EQUIVALENT_CLASS),
            inverse_of: sink.intern(vocab::OWL_INVERSE_OF),
            object_property: sink.intern(vocab::OWL_OBJECT_PROPERTY),
            annotation_property: sink.intern(vocab::OWL_ANNOTATION_PROPERTY),
            concept,
            semantic_type,
            group,
            originals,
            unifieds,
            groups,
            synonyms,
            terminology,
            definitions,
            class_property_type: sink.intern(vocab::OWLREADY_CLASS_PROPERTY_TYPE),
            source_root: sink.intern(&format!("{base}SRC/{ROOT_SOURCE}")),
            unified_root: sink.intern(&format!("{base}SRC/CUI")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    Some,
    Only,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateKind {
    Object,
    Annotation,
}

/// Runtime-created predicates: name → handle, declared once.
#[derive(Debug, Default)]
pub struct PredicateRegistry {
    by_name: AHashMap<String, StrId>,
}

impl PredicateRegistry {
    pub fn get(&self, name: &str) -> Option<StrId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn names(&self) -> BTreeSet<&str> {
        self.by_name.keys().map(String::as_str).collect()
    }
}

// ============================================================================
// Deferred values
// ============================================================================

/// Values buffered for one key until finalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deferred {
    Single(StrId),
    Many(Vec<StrId>),
}

impl Deferred {
    pub fn push(&mut self, value: StrId) {
        match self {
            Deferred::Single(first) => *self = Deferred::Many(vec![*first, value]),
            Deferred::Many(values) => values.push(value),
        }
    }

    pub fn values(&self) -> &[StrId] {
        match self {
            Deferred::Single(value) => std::slice::from_ref(value),
            Deferred::Many(values) => values,
        }
    }
}

/// An insertion-ordered `key → Deferred` table.
#[derive(Debug)]
pub struct DeferredTable<K> {
    order: Vec<K>,
    values: AHashMap<K, Deferred>,
}

impl<K> Default for DeferredTable<K> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            values: AHashMap::new(),
        }
    }
}

impl<K: Copy + Eq + std::hash::Hash> DeferredTable<K> {
    pub fn push(&mut self, key: K, value: StrId) {
        match self.values.get_mut(&key) {
            Some(deferred) => deferred.push(value),
            None => {
                self.order.push(key);
                self.values.insert(key, Deferred::Single(value));
            }
        }
    }

    pub fn get(&self, key: &K) -> Option<&Deferred> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Drain in first-insertion order.
    pub fn drain(&mut self) -> Vec<(K, Deferred)> {
        let mut values = std::mem::take(&mut self.values);
        std::mem::take(&mut self.order)
            .into_iter()
            .filter_map(|key| values.remove(&key).map(|d| (key, d)))
            .collect()
    }
}

// ============================================================================
// Terminologies
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TerminologyId(u32);

impl TerminologyId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A terminology seen in a non-suppressed atom, with its concepts and raw
/// hierarchy.
#[derive(Debug, Default)]
pub struct TerminologyState {
    pub name: String,
    pub originals: Vec<StrId>,
    pub parents: ParentGraph,
}

#[derive(Debug, Clone)]
pub struct PartialRelation {
    pub predicate: StrId,
    pub subject: StrId,
    pub group: String,
    pub direct: bool,
}

// ============================================================================
// Counters
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableStats {
    /// Complete records read.
    pub records: u64,
    /// Records that produced state or facts.
    pub accepted: u64,
    /// Records dropped for a suppression flag.
    pub suppressed: u64,
    /// Records dropped by the terminology / language filters or by kind.
    pub filtered: u64,
    /// Records skipped because an atom reference did not resolve.
    pub unresolved: u64,
}

pub fn is_suppressed(flag: &str) -> bool {
    matches!(flag, "O" | "E" | "Y")
}

// ============================================================================
// Context
// ============================================================================

pub struct ImportContext<S: GraphSink> {
    sink: S,
    base_iri: String,
    batch_size: usize,
    terminology_filter: Option<AHashSet<String>>,
    language_filter: Option<AHashSet<String>>,
    extract_unified: bool,
    pub(crate) vocab: Vocabulary,

    buffer: Vec<Triple>,
    flushed: u64,
    pub(crate) stats: TableStats,

    rank: AHashMap<(String, String), i64>,
    next_arbitrary_code: u64,
    atoms: AHashMap<String, StrId>,
    original_terminology: AHashMap<StrId, TerminologyId>,
    original_terms: AHashMap<StrId, Vec<Term>>,
    terminologies: Vec<TerminologyState>,
    terminology_index: AHashMap<String, TerminologyId>,

    unified_to_originals: DeferredTable<StrId>,
    original_to_unifieds: DeferredTable<StrId>,

    pub(crate) partial_relations: AHashMap<(String, String), PartialRelation>,
    relations_seen: AHashSet<(StrId, StrId, StrId)>,
    groups: AHashMap<(StrId, String), StrId>,
    only_restrictions: DeferredTable<(StrId, StrId)>,
    direct_uses: AHashMap<StrId, u64>,
    indirect_uses: AHashMap<StrId, u64>,

    predicates: PredicateRegistry,
    semantic_types: AHashMap<String, StrId>,
}

impl<S: GraphSink> ImportContext<S> {
    pub fn new(config: &ImportConfig, mut sink: S) -> Result<Self> {
        config.validate()?;
        let vocab = Vocabulary::intern(&mut sink, &config.base_iri);
        let to_set = |set: &Option<BTreeSet<String>>| {
            set.as_ref()
                .filter(|s| !s.is_empty())
                .map(|s| s.iter().cloned().collect::<AHashSet<String>>())
        };
        let mut ctx = Self {
            sink,
            base_iri: config.base_iri.clone(),
            batch_size: config.batch_size,
            terminology_filter: to_set(&config.terminologies),
            language_filter: to_set(&config.languages),
            extract_unified: config.extract_unified(),
            vocab,
            buffer: Vec::new(),
            flushed: 0,
            stats: TableStats::default(),
            rank: AHashMap::new(),
            next_arbitrary_code: 1,
            atoms: AHashMap::new(),
            original_terminology: AHashMap::new(),
            original_terms: AHashMap::new(),
            terminologies: Vec::new(),
            terminology_index: AHashMap::new(),
            unified_to_originals: DeferredTable::default(),
            original_to_unifieds: DeferredTable::default(),
            partial_relations: AHashMap::new(),
            relations_seen: AHashSet::new(),
            groups: AHashMap::new(),
            only_restrictions: DeferredTable::default(),
            direct_uses: AHashMap::new(),
            indirect_uses: AHashMap::new(),
            predicates: PredicateRegistry::default(),
            semantic_types: AHashMap::new(),
        };
        ctx.emit_model();
        Ok(ctx)
    }

    fn emit_model(&mut self) {
        let v = self.vocab;
        for class in [v.concept, v.semantic_type, v.group] {
            self.push(Triple::new(class, v.rdf_type, v.owl_class));
        }
        for property in [v.originals, v.unifieds, v.groups] {
            self.push(Triple::new(property, v.rdf_type, v.object_property));
        }
        self.push(Triple::new(v.unifieds, v.inverse_of, v.originals));
        for property in [v.synonyms, v.terminology, v.definitions] {
            self.push(Triple::new(property, v.rdf_type, v.annotation_property));
        }
        if self.extract_unified {
            self.push(Triple::new(v.unified_root, v.subclass_of, v.concept));
            self.push(Triple::new(v.unified_root, v.terminology, v.source_root));
            self.push(Triple::new(
                v.unified_root,
                v.label,
                Literal::plain("UMLS unified concepts (CUI)"),
            ));
        }
    }

    // ========================================================================
    // Configuration views
    // ========================================================================

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn extract_unified(&self) -> bool {
        self.extract_unified
    }

    pub fn allows_terminology(&self, terminology: &str) -> bool {
        self.terminology_filter
            .as_ref()
            .map_or(true, |set| set.contains(terminology))
    }

    pub fn allows_language(&self, language: &str) -> bool {
        self.language_filter
            .as_ref()
            .map_or(true, |set| set.contains(language))
    }

    pub fn stats(&self) -> TableStats {
        self.stats
    }

    pub(crate) fn take_stats(&mut self) -> TableStats {
        std::mem::take(&mut self.stats)
    }

    // ========================================================================
    // Interning
    // ========================================================================

    /// `{base}{terminology}/{code}`. A pure function of its arguments.
    pub fn intern_original(&mut self, terminology: &str, code: &str) -> StrId {
        let iri = format!("{}{terminology}/{code}", self.base_iri);
        self.sink.intern(&iri)
    }

    pub fn intern_unified(&mut self, cui: &str) -> StrId {
        let iri = format!("{}CUI/{cui}", self.base_iri);
        self.sink.intern(&iri)
    }

    pub fn intern_terminology_tag(&mut self, terminology: &str) -> StrId {
        let iri = format!("{}SRC/{terminology}", self.base_iri);
        self.sink.intern(&iri)
    }

    pub fn new_blank_node(&mut self) -> NodeRef {
        self.sink.new_blank_node()
    }

    /// A runtime predicate `{base}model/{name}`, declared on first use.
    pub fn predicate(&mut self, name: &str, kind: PredicateKind) -> StrId {
        if let Some(id) = self.predicates.get(name) {
            return id;
        }
        let id = self.sink.intern(&format!("{}model/{name}", self.base_iri));
        let class = match kind {
            PredicateKind::Object => self.vocab.object_property,
            PredicateKind::Annotation => self.vocab.annotation_property,
        };
        self.push(Triple::new(id, self.vocab.rdf_type, class));
        self.predicates.by_name.insert(name.to_string(), id);
        id
    }

    pub fn predicates(&self) -> &PredicateRegistry {
        &self.predicates
    }

    /// A semantic type handle; `true` when it was created by this call.
    pub fn semantic_type(&mut self, tui: &str) -> (StrId, bool) {
        if let Some(id) = self.semantic_types.get(tui) {
            return (*id, false);
        }
        let id = self.sink.intern(&format!("{}TUI/{tui}", self.base_iri));
        self.push(Triple::new(id, self.vocab.rdf_type, self.vocab.owl_class));
        self.push(Triple::new(id, self.vocab.subclass_of, self.vocab.semantic_type));
        self.semantic_types.insert(tui.to_string(), id);
        (id, true)
    }

    // ========================================================================
    // Ranks and atoms
    // ========================================================================

    pub fn set_priority(&mut self, terminology: &str, term_type: &str, rank: i64) {
        self.rank
            .insert((terminology.to_string(), term_type.to_string()), rank);
    }

    /// Unranked `(terminology, term type)` pairs get priority 0.
    pub fn priority(&self, terminology: &str, term_type: &str) -> i64 {
        self.rank
            .get(&(terminology.to_string(), term_type.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn next_arbitrary_code(&mut self) -> String {
        let code = self.next_arbitrary_code;
        self.next_arbitrary_code += 1;
        code.to_string()
    }

    pub fn bind_atom(&mut self, atom: &str, original: StrId) {
        self.atoms.insert(atom.to_string(), original);
    }

    pub fn resolve_atom(&self, atom: &str) -> Option<StrId> {
        self.atoms.get(atom).copied()
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    // ========================================================================
    // Concepts
    // ========================================================================

    fn ensure_terminology(&mut self, name: &str) -> TerminologyId {
        if let Some(id) = self.terminology_index.get(name) {
            return *id;
        }
        let id = TerminologyId(self.terminologies.len() as u32);
        self.terminologies.push(TerminologyState {
            name: name.to_string(),
            ..TerminologyState::default()
        });
        self.terminology_index.insert(name.to_string(), id);
        id
    }

    /// Declare an original concept the first time it is seen. Returns its
    /// terminology and whether it was created by this call.
    pub fn register_original(
        &mut self,
        original: StrId,
        terminology: &str,
    ) -> (TerminologyId, bool) {
        let id = self.ensure_terminology(terminology);
        if let Some(existing) = self.original_terminology.get(&original) {
            return (*existing, false);
        }
        let tag = self.intern_terminology_tag(terminology);
        self.push(Triple::new(original, self.vocab.rdf_type, self.vocab.owl_class));
        self.push(Triple::new(original, self.vocab.terminology, tag));
        self.original_terminology.insert(original, id);
        self.original_terms.insert(original, Vec::new());
        self.terminologies[id.index()].originals.push(original);
        (id, true)
    }

    pub fn is_registered(&self, original: StrId) -> bool {
        self.original_terminology.contains_key(&original)
    }

    pub fn terminology_of(&self, original: StrId) -> Option<TerminologyId> {
        self.original_terminology.get(&original).copied()
    }

    pub fn terminology_name(&self, id: TerminologyId) -> &str {
        &self.terminologies[id.index()].name
    }

    pub fn terminology_id(&self, name: &str) -> Option<TerminologyId> {
        self.terminology_index.get(name).copied()
    }

    pub fn terminologies(&self) -> &[TerminologyState] {
        &self.terminologies
    }

    pub fn original_count(&self) -> usize {
        self.original_terminology.len()
    }

    /// Declare a unified concept the first time it is seen.
    pub fn register_unified(&mut self, unified: StrId) -> bool {
        if self.unified_to_originals.get(&unified).is_some() {
            return false;
        }
        let v = self.vocab;
        self.push(Triple::new(unified, v.rdf_type, v.owl_class));
        self.push(Triple::new(unified, v.subclass_of, v.unified_root));
        self.push(Triple::new(unified, v.terminology, v.unified_root));
        true
    }

    /// Link an original to a unified concept (both directions, once per pair).
    ///
    /// `register_unified` must have been called for `unified` first.
    pub fn link_unified(&mut self, original: StrId, unified: StrId) {
        let known = self
            .original_to_unifieds
            .get(&original)
            .is_some_and(|d| d.values().contains(&unified));
        if known {
            return;
        }
        self.original_to_unifieds.push(original, unified);
        self.unified_to_originals.push(unified, original);
        let v = self.vocab;
        self.restrict(original.into(), Quantifier::Some, v.unifieds, unified.into());
        self.restrict(unified.into(), Quantifier::Some, v.originals, original.into());
    }

    pub fn is_unified_registered(&self, unified: StrId) -> bool {
        self.unified_to_originals.get(&unified).is_some()
    }

    pub fn unified_count(&self) -> usize {
        self.unified_to_originals.len()
    }

    pub fn originals_of(&self, unified: StrId) -> &[StrId] {
        self.unified_to_originals
            .get(&unified)
            .map_or(&[], Deferred::values)
    }

    pub fn push_term(&mut self, original: StrId, term: Term) {
        self.original_terms.entry(original).or_default().push(term);
    }

    pub fn terms_of(&self, original: StrId) -> &[Term] {
        self.original_terms.get(&original).map_or(&[], Vec::as_slice)
    }

    pub fn add_parent(&mut self, terminology: TerminologyId, child: StrId, parent: StrId) {
        self.terminologies[terminology.index()]
            .parents
            .add_edge(child, parent);
    }

    // ========================================================================
    // Relations
    // ========================================================================

    /// Record `subject -[predicate]-> object`.
    ///
    /// Direct relations become `some` restrictions immediately (once per
    /// triple) and, with a group index, a restriction on the group class.
    /// Indirect ones are deferred as `only` candidates unless the triple was
    /// already stated directly. Indirect mentions are not deduplicated
    /// against each other.
    pub fn relate(
        &mut self,
        subject: StrId,
        predicate: StrId,
        object: StrId,
        group: &str,
        direct: bool,
    ) {
        let key = (subject, predicate, object);
        if direct {
            *self.direct_uses.entry(predicate).or_default() += 1;
            if self.relations_seen.insert(key) {
                self.restrict(subject.into(), Quantifier::Some, predicate, object.into());
            }
            if !group.is_empty() {
                let group = self.group_node(subject, group);
                self.restrict(group.into(), Quantifier::Some, predicate, object.into());
            }
        } else {
            *self.indirect_uses.entry(predicate).or_default() += 1;
            if !self.relations_seen.contains(&key) {
                self.only_restrictions.push((subject, predicate), object);
            }
        }
    }

    fn group_node(&mut self, original: StrId, index: &str) -> StrId {
        if let Some(group) = self.groups.get(&(original, index.to_string())) {
            return *group;
        }
        let iri = format!("{}groups/{}_{index}", self.base_iri, original.raw());
        let group = self.sink.intern(&iri);
        let v = self.vocab;
        self.push(Triple::new(group, v.rdf_type, v.owl_class));
        self.push(Triple::new(group, v.subclass_of, v.group));
        self.restrict(original.into(), Quantifier::Some, v.groups, group.into());
        self.groups.insert((original, index.to_string()), group);
        group
    }

    pub(crate) fn take_only_restrictions(&mut self) -> Vec<((StrId, StrId), Deferred)> {
        self.only_restrictions.drain()
    }

    pub(crate) fn take_predicate_uses(&mut self) -> (AHashMap<StrId, u64>, AHashMap<StrId, u64>) {
        (
            std::mem::take(&mut self.direct_uses),
            std::mem::take(&mut self.indirect_uses),
        )
    }

    pub(crate) fn take_unified_links(
        &mut self,
    ) -> (Vec<(StrId, Deferred)>, Vec<(StrId, Deferred)>) {
        (
            self.unified_to_originals.drain(),
            self.original_to_unifieds.drain(),
        )
    }

    pub(crate) fn take_hierarchies(&mut self) -> Vec<(String, Vec<StrId>, ParentGraph)> {
        self.terminologies
            .iter_mut()
            .map(|t| {
                (
                    t.name.clone(),
                    std::mem::take(&mut t.originals),
                    std::mem::take(&mut t.parents),
                )
            })
            .collect()
    }

    // ========================================================================
    // Fact construction
    // ========================================================================

    pub fn push(&mut self, triple: Triple) {
        self.buffer.push(triple);
    }

    /// `a ⊑ (quantifier property . b)` via a fresh restriction node.
    pub fn restrict(
        &mut self,
        a: NodeRef,
        quantifier: Quantifier,
        property: StrId,
        b: NodeRef,
    ) -> NodeRef {
        let v = self.vocab;
        let bn = self.sink.new_blank_node();
        let qualifier = match quantifier {
            Quantifier::Some => v.some_values_from,
            Quantifier::Only => v.all_values_from,
        };
        self.push(Triple::new(a, v.subclass_of, bn));
        self.push(Triple::new(bn, v.rdf_type, v.restriction));
        self.push(Triple::new(bn, v.on_property, property));
        self.push(Triple::new(bn, qualifier, Object::Node(b)));
        bn
    }

    /// An `rdf:first` / `rdf:rest` list of `items`, returning its head.
    pub fn list(&mut self, items: &[StrId]) -> NodeRef {
        let v = self.vocab;
        let head = self.sink.new_blank_node();
        let mut cell = head;
        for (i, item) in items.iter().enumerate() {
            self.push(Triple::new(cell, v.rdf_first, *item));
            if i + 1 < items.len() {
                let next = self.sink.new_blank_node();
                self.push(Triple::new(cell, v.rdf_rest, next));
                cell = next;
            } else {
                self.push(Triple::new(cell, v.rdf_rest, v.rdf_nil));
            }
        }
        head
    }

    /// An anonymous class `unionOf(items)`.
    pub fn union_class(&mut self, items: &[StrId]) -> NodeRef {
        let v = self.vocab;
        let list = self.list(items);
        let bn = self.sink.new_blank_node();
        self.push(Triple::new(bn, v.rdf_type, v.owl_class));
        self.push(Triple::new(bn, v.union_of, list));
        bn
    }

    /// `only` restriction on `deferred`: the value itself, or a union of all.
    pub fn restrict_only(&mut self, subject: StrId, property: StrId, deferred: &Deferred) {
        let target = match deferred {
            Deferred::Single(value) => NodeRef::Iri(*value),
            Deferred::Many(values) => self.union_class(values),
        };
        self.restrict(subject.into(), Quantifier::Only, property, target);
    }

    // ========================================================================
    // Batching
    // ========================================================================

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn flushed(&self) -> u64 {
        self.flushed
    }

    /// Flush when the buffer has reached the batch size.
    pub fn check_flush(&mut self) -> Result<()> {
        if self.buffer.len() >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let batch = std::mem::take(&mut self.buffer);
        self.flushed += batch.len() as u64;
        self.sink.append(batch)?;
        Ok(())
    }

    // ========================================================================
    // Per-table hooks
    // ========================================================================

    /// Emit sort-dependent output and release state no later table reads.
    pub fn after_table(&mut self, table: Table) -> Result<()> {
        match table {
            Table::Atom => self.emit_labels()?,
            Table::Relation => {
                self.relations_seen = AHashSet::new();
                self.partial_relations = AHashMap::new();
                self.groups = AHashMap::new();
            }
            Table::Attribute => {
                self.atoms = AHashMap::new();
            }
            _ => {}
        }
        self.flush()
    }

    fn emit_labels(&mut self) -> Result<()> {
        let terms = std::mem::take(&mut self.original_terms);
        let originals: Vec<StrId> = self
            .terminologies
            .iter()
            .flat_map(|t| t.originals.iter().copied())
            .collect();
        for original in originals {
            if let Some(terms) = terms.get(&original) {
                self.emit_label_and_synonyms(original, terms);
            }
            self.check_flush()?;
        }

        let unified: Vec<(StrId, Vec<StrId>)> = self
            .unified_to_originals
            .order
            .iter()
            .map(|u| (*u, self.originals_of(*u).to_vec()))
            .collect();
        for (unified, originals) in unified {
            let pooled: Vec<Term> = originals
                .iter()
                .filter_map(|o| terms.get(o))
                .flatten()
                .cloned()
                .collect();
            self.emit_label_and_synonyms(unified, &pooled);
            self.check_flush()?;
        }
        Ok(())
    }

    fn emit_label_and_synonyms(&mut self, subject: StrId, terms: &[Term]) {
        let v = self.vocab;
        let Some(label) = select_label(terms) else {
            return;
        };
        self.push(Triple::new(
            subject,
            v.label,
            Literal::lang(label.text.clone(), label.language.clone()),
        ));
        for term in synonyms(terms) {
            self.push(Triple::new(
                subject,
                v.synonyms,
                Literal::lang(term.text.clone(), term.language.clone()),
            ));
        }
    }

    /// Flush and hand the sink back, calling its finishing hook.
    pub fn finish(mut self) -> Result<S> {
        self.flush()?;
        self.sink.finish()?;
        Ok(self.sink)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
