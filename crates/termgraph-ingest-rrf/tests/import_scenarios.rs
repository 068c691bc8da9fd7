//! End-to-end imports over in-memory tables.

use termgraph_ingest_rrf::{ImportConfig, Importer, MemorySource, Table};
use termgraph_store::{vocab, Literal, NodeRef, Object, StrId, TripleStore};

#[allow(clippy::too_many_arguments)]
fn atom(
    cui: &str,
    lang: &str,
    aui: &str,
    sab: &str,
    tty: &str,
    code: &str,
    text: &str,
    suppress: &str,
) -> String {
    format!("{cui}|{lang}|P|L1|PF|S1|Y|{aui}||||{sab}|{tty}|{code}|{text}|0|{suppress}|256|\n")
}

fn hier(cui: &str, aui: &str, path: &str, sab: &str) -> String {
    format!("{cui}|{aui}|1||{sab}||{path}|||\n")
}

fn import(source: &MemorySource, config: ImportConfig) -> TripleStore {
    let importer = Importer::new(config, TripleStore::new()).expect("valid config");
    let (store, _report) = importer.run(source).expect("import should succeed");
    store
}

fn iri(store: &TripleStore, value: &str) -> NodeRef {
    store
        .node(value)
        .unwrap_or_else(|| panic!("{value} should be interned"))
}

fn pred(store: &TripleStore, value: &str) -> StrId {
    store
        .interner()
        .id_of(value)
        .unwrap_or_else(|| panic!("{value} should be interned"))
}

// ============================================================================
// Hierarchy
// ============================================================================

#[test]
fn test_two_concepts_one_hierarchy_line() {
    let source = MemorySource::new()
        .with_part(
            Table::Atom,
            atom("C1", "ENG", "A1", "T1", "PT", "A", "Alpha", "N")
                + &atom("C2", "ENG", "A2", "T1", "PT", "B", "Beta", "N"),
        )
        .with_part(Table::Hierarchy, hier("C2", "A2", "A1", "T1"));

    let store = import(&source, ImportConfig::default());
    let subclass_of = pred(&store, vocab::RDFS_SUBCLASS_OF);
    let a = iri(&store, "http://UMLS/T1/A");
    let b = iri(&store, "http://UMLS/T1/B");
    let concept = iri(&store, "http://UMLS/model/Concept");

    let is_class_edge = |n: &NodeRef| matches!(n, NodeRef::Iri(_));
    let class_parents = |node: NodeRef| -> Vec<NodeRef> {
        store
            .object_nodes(node, subclass_of)
            .into_iter()
            .filter(is_class_edge)
            .collect()
    };
    let b_parents = class_parents(b);
    let a_parents = class_parents(a);
    assert_eq!(b_parents, vec![a]);
    assert_eq!(a_parents, vec![concept]);
}

#[test]
fn test_cycle_is_reported_and_repaired() {
    let source = MemorySource::new()
        .with_part(
            Table::Atom,
            atom("C1", "ENG", "A1", "T1", "PT", "A", "a", "N")
                + &atom("C2", "ENG", "A2", "T1", "PT", "B", "b", "N")
                + &atom("C3", "ENG", "A3", "T1", "PT", "C", "c", "N"),
        )
        .with_part(
            Table::Hierarchy,
            hier("C1", "A1", "A2", "T1")
                + &hier("C2", "A2", "A3", "T1")
                + &hier("C3", "A3", "A1", "T1")
                + &hier("C2", "A2", "A1", "T1"),
        );

    let importer =
        Importer::new(ImportConfig::default(), TripleStore::new()).expect("valid config");
    let (store, report) = importer.run(&source).expect("import should succeed");
    assert_eq!(report.total_cycles(), 1);
    let t1 = report
        .hierarchies
        .iter()
        .find(|h| h.terminology == "T1")
        .expect("T1 report");
    assert_eq!((t1.cycles, t1.dominant, t1.equivalences), (1, 1, 0));

    let subclass_of = pred(&store, vocab::RDFS_SUBCLASS_OF);
    let a = iri(&store, "http://UMLS/T1/A");
    for child in ["http://UMLS/T1/B", "http://UMLS/T1/C"] {
        let parents: Vec<NodeRef> = store
            .object_nodes(iri(&store, child), subclass_of)
            .into_iter()
            .filter(|n| matches!(n, NodeRef::Iri(_)))
            .collect();
        assert_eq!(parents, vec![a]);
    }
}

// ============================================================================
// Labels and unified concepts
// ============================================================================

#[test]
fn test_unified_concept_pools_labels_of_its_originals() {
    let source = MemorySource::new()
        .with_part(Table::Rank, "9|T2|PT|N|\n1|T1|PT|N|\n")
        .with_part(
            Table::Atom,
            atom("C1", "ENG", "A1", "T1", "PT", "X", "Low", "N")
                + &atom("C1", "FRE", "A2", "T2", "PT", "Y", "Haut", "N"),
        );
    let store = import(&source, ImportConfig::default());

    let label = pred(&store, vocab::RDFS_LABEL);
    let synonyms = pred(&store, "http://UMLS/model/synonyms");
    let cui = iri(&store, "http://UMLS/CUI/C1");
    assert_eq!(
        store.objects(cui, label),
        vec![&Object::Literal(Literal::lang("Haut", "fr"))]
    );
    assert_eq!(store.objects(cui, synonyms).len(), 2);

    let originals = pred(&store, "http://UMLS/model/originals");
    let all_values_from = pred(&store, vocab::OWL_ALL_VALUES_FROM);
    let on_property = pred(&store, vocab::OWL_ON_PROPERTY);
    let subclass_of = pred(&store, vocab::RDFS_SUBCLASS_OF);
    let only_targets: Vec<NodeRef> = store
        .object_nodes(cui, subclass_of)
        .into_iter()
        .filter(|bn| store.object_nodes(*bn, on_property) == vec![NodeRef::Iri(originals)])
        .flat_map(|bn| store.object_nodes(bn, all_values_from))
        .collect();
    assert_eq!(only_targets.len(), 1);
    assert!(matches!(only_targets[0], NodeRef::Blank(_)), "two originals form a union");
}

// ============================================================================
// Filtering
// ============================================================================

#[test]
fn test_suppressed_records_leave_no_trace() {
    let source = MemorySource::new()
        .with_part(
            Table::Atom,
            atom("C1", "ENG", "A1", "T1", "PT", "KEEP", "kept", "N")
                + &atom("C2", "ENG", "A2", "T1", "PT", "GONE", "gone", "E"),
        )
        .with_part(Table::Definition, "C2|A2|AT1||T1|hidden|Y|Y|\n")
        .with_part(Table::Attribute, "C1|L1|S1|A1|AUI|CODE|AT1|SAT1|COLOR|T1|red|O|N|\n");
    let store = import(&source, ImportConfig::default());

    assert!(store.node("http://UMLS/T1/KEEP").is_some());
    let gone = store.node("http://UMLS/T1/GONE");
    if let Some(gone) = gone {
        assert!(store.facts().iter().all(|t| t.subject != gone));
    }
    assert!(store.node("http://UMLS/model/color").is_none());
    assert!(store
        .facts()
        .iter()
        .all(|t| t.object.as_literal().map_or(true, |l| l.lexical != "hidden")));
}

#[test]
fn test_terminology_filter_keeps_root_source() {
    let source = MemorySource::new().with_part(
        Table::Atom,
        atom("C0", "ENG", "A0", "SRC", "RPT", "V-SRC", "root", "N")
            + &atom("C1", "ENG", "A1", "SRC", "RPT", "V-T1", "T1", "N")
            + &atom("C2", "ENG", "A2", "T1", "PT", "X", "x", "N")
            + &atom("C3", "ENG", "A3", "T2", "PT", "Y", "y", "N"),
    );
    let config = ImportConfig::default().with_terminologies(["T1"]);
    let store = import(&source, config);

    let terminology = pred(&store, "http://UMLS/model/terminology");
    let tagged: Vec<String> = store
        .facts()
        .iter()
        .filter(|t| t.predicate == terminology)
        .filter_map(|t| t.object.as_node())
        .filter_map(|n| match n {
            NodeRef::Iri(id) => store.iri_of(id).map(str::to_string),
            NodeRef::Blank(_) => None,
        })
        .collect();
    assert!(!tagged.is_empty());
    assert!(tagged.iter().all(|t| t == "http://UMLS/SRC/T1" || t == "http://UMLS/SRC/SRC"));
    assert!(store.node("http://UMLS/T2/Y").is_none());
    assert!(store.node("http://UMLS/CUI/C2").is_none());
}
