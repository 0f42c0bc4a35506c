//! Import Closure Integration Test
//!
//! Builds models over small ontology networks and checks that every managed
//! union graph's direct sub-graphs match its base graph's `owl:imports`.
//!
//! # Scenarios
//!
//! | Scenario | Expectation |
//! |----------|-------------|
//! | Self-import | one graph in the flat hierarchy |
//! | Mutual import | two graphs, each once |
//! | Dangling import, tolerant | empty placeholder registered |
//! | Dangling import, strict | error, nothing registered |
//! | Triple and sub-graph edits | both representations follow |
//! | Header or version IRI edit | repository entry follows the name |
//! | Renaming an imported ontology | rejected, nothing changes |
//! | Conflicting adopted hierarchy | rejected, nothing registered |

use std::rc::Rc;

use ontunion::graph::hierarchy::flat_hierarchy;
use ontunion::{
    create_model, get_model_or_null, vocab, Graph, GraphMem, GraphRef, GraphRepository, ImportsConfig, MemGraphRepository,
    ModelFactory, Node, OntError, OntologyNaming, OntSpecification, Triple, UnionGraph, UnionGraphRepository,
};

fn ontology(name: &str, imports: &[&str]) -> GraphRef {
    let graph = GraphMem::with_standard_prefixes();
    graph.insert(Triple::ontology_header(Node::iri(name)));
    for import in imports {
        graph.insert(Triple::imports(Node::iri(name), Node::iri(*import)));
    }
    Rc::new(graph)
}

fn repository() -> Rc<dyn GraphRepository> {
    Rc::new(MemGraphRepository::new())
}

fn spec() -> OntSpecification {
    OntSpecification::owl2_dl_mem()
}

fn import(from: &str, to: &str) -> Triple {
    Triple::imports(Node::iri(from), Node::iri(to))
}

fn version(ontology: &str, iri: &str) -> Triple {
    Triple::new(Node::iri(ontology), Node::iri(vocab::OWL_VERSION_IRI), Node::iri(iri))
}

fn ids(repo: &Rc<dyn GraphRepository>) -> Vec<String> {
    repo.ids().collect()
}

// ============================================================================
// Cycles
// ============================================================================

/// An ontology importing itself yields a single-graph hierarchy.
#[test]
fn test_self_import_terminates() {
    let repo = repository();
    let model = create_model(Some(ontology("urn:a", &["urn:a"])), &spec(), &repo).unwrap();
    let hierarchy = flat_hierarchy(model.union_graph());
    assert_eq!(hierarchy.len(), 1);
    assert_eq!(model.union_graph().data_graphs().len(), 1);
    assert_eq!(repo.count(), 1);
    assert_eq!(model.size(), 2);
}

/// Mutually importing ontologies each appear exactly once.
#[test]
fn test_mutual_import_terminates() {
    let repo = repository();
    repo.put("urn:b", ontology("urn:b", &["urn:a"]));
    let model = create_model(Some(ontology("urn:a", &["urn:b"])), &spec(), &repo).unwrap();

    let hierarchy = flat_hierarchy(model.union_graph());
    assert_eq!(hierarchy.len(), 2);
    let b = &hierarchy[1];
    assert!(b.contains_graph(&**model.union_graph()));
    assert!(model.union_graph().contains_graph(&**b));
    assert_eq!(model.union_graph().data_graphs().len(), 2);
    // both entries are now union graphs
    assert!(repo.graphs().iter().all(|g| g.as_union().is_some()));
}

// ============================================================================
// Unresolved imports
// ============================================================================

/// Tolerant mode registers an empty placeholder ontology.
#[test]
fn test_dangling_import_gets_placeholder() {
    let repo = repository();
    let model = create_model(Some(ontology("urn:a", &["urn:missing"])), &spec(), &repo).unwrap();
    let placeholder = repo.get("urn:missing").unwrap();
    let placeholder = placeholder.as_union().unwrap();
    assert_eq!(placeholder.base_graph().size(), 1);
    assert!(placeholder
        .base_graph()
        .contains_triple(&Triple::ontology_header(Node::iri("urn:missing"))));
    assert!(model.union_graph().contains_graph(placeholder));
}

/// Strict mode fails before anything is registered.
#[test]
fn test_dangling_import_is_fatal_when_strict() {
    let repo = repository();
    repo.put("urn:b", ontology("urn:b", &["urn:missing"]));
    let factory = ModelFactory::new(ImportsConfig::strict());
    let err = factory
        .create_model(Some(ontology("urn:a", &["urn:b"])), &spec(), &repo)
        .unwrap_err();
    match err {
        OntError::UnresolvedImport { ontology, import } => {
            assert_eq!(ontology, "urn:b");
            assert_eq!(import, "urn:missing");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(repo.ids().collect::<Vec<_>>(), ["urn:b"]);
    assert!(repo.get("urn:b").unwrap().as_union().is_none());
}

// ============================================================================
// Synchronization
// ============================================================================

/// Import statements and sub-graphs follow each other in both directions.
#[test]
fn test_triple_and_sub_graph_edits_stay_in_step() {
    let repo = repository();
    let a = create_model(Some(ontology("urn:a", &[])), &spec(), &repo).unwrap();
    let b = create_model(Some(ontology("urn:b", &[])), &spec(), &repo).unwrap();

    a.add(import("urn:a", "urn:b")).unwrap();
    assert!(a.has_import(&b));

    a.delete(&import("urn:a", "urn:b")).unwrap();
    assert!(!a.has_import(&b));

    a.union_graph().add_sub_graph(b.union_graph().clone()).unwrap();
    assert!(a.base_graph().contains_triple(&import("urn:a", "urn:b")));

    let sub: GraphRef = b.union_graph().clone();
    a.union_graph().remove_sub_graph(&sub).unwrap();
    assert!(!a.base_graph().contains_triple(&import("urn:a", "urn:b")));
    assert!(a.imports().is_empty());
}

/// Statements of imported ontologies are visible through the importer.
#[test]
fn test_imported_statements_are_visible() {
    let repo = repository();
    let fact = Triple::new(Node::iri("urn:x"), Node::iri("urn:p"), Node::iri("urn:y"));
    let c = ontology("urn:c", &[]);
    c.add(fact.clone()).unwrap();
    repo.put("urn:c", c);
    repo.put("urn:b", ontology("urn:b", &["urn:c"]));

    let a = create_model(Some(ontology("urn:a", &["urn:b"])), &spec(), &repo).unwrap();
    assert!(a.graph().contains_triple(&fact));

    a.delete(&import("urn:a", "urn:b")).unwrap();
    assert!(!a.graph().contains_triple(&fact));
}

/// Clearing a managed union detaches its imports.
#[test]
fn test_clear_detaches_imports() {
    let repo = repository();
    let a = create_model(Some(ontology("urn:a", &["urn:x", "urn:y"])), &spec(), &repo).unwrap();
    assert_eq!(a.union_graph().sub_graphs().count(), 2);
    a.union_graph().clear().unwrap();
    assert!(!a.union_graph().has_sub_graphs());
    // placeholders stay registered
    assert_eq!(repo.count(), 3);
}

// ============================================================================
// Renaming
// ============================================================================

/// Moving the header or adding a version IRI re-registers the ontology.
#[test]
fn test_rename_moves_the_repository_entry() {
    let repo = repository();
    repo.put("urn:c", ontology("urn:c", &[]));
    repo.put("urn:b", ontology("urn:b", &["urn:c"]));
    let a = create_model(Some(ontology("urn:a", &["urn:b"])), &spec(), &repo).unwrap();
    assert_eq!(ids(&repo), ["urn:a", "urn:b", "urn:c"]);

    a.set_id(Node::iri("urn:a-x")).unwrap();
    assert_eq!(a.id(), Some(Node::iri("urn:a-x")));
    assert_eq!(ids(&repo), ["urn:a-x", "urn:b", "urn:c"]);
    assert!(a.base_graph().contains_triple(&import("urn:a-x", "urn:b")));
    assert!(!a.base_graph().contains_triple(&import("urn:a", "urn:b")));
    assert_eq!(flat_hierarchy(a.union_graph()).len(), 3);

    a.add(version("urn:a-x", "urn:a-y")).unwrap();
    assert_eq!(ids(&repo), ["urn:a-y", "urn:b", "urn:c"]);
    let entry = repo.get("urn:a-y").unwrap();
    assert!(Rc::ptr_eq(&entry.as_union().unwrap().to_rc().unwrap(), a.union_graph()));

    // dropping the version IRI falls back to the header
    a.delete(&version("urn:a-x", "urn:a-y")).unwrap();
    assert_eq!(ids(&repo), ["urn:a-x", "urn:b", "urn:c"]);
}

/// An import of the new name resolves to the renamed ontology.
#[test]
fn test_renamed_ontology_resolves_under_its_new_name() {
    let repo = repository();
    let a = create_model(Some(ontology("urn:a", &[])), &spec(), &repo).unwrap();
    let b = create_model(Some(ontology("urn:b", &[])), &spec(), &repo).unwrap();

    b.add(version("urn:b", "urn:b-v2")).unwrap();
    assert_eq!(ids(&repo), ["urn:a", "urn:b-v2"]);

    a.add(import("urn:a", "urn:b-v2")).unwrap();
    assert!(a.has_import(&b));
    // no placeholder was needed
    assert_eq!(repo.count(), 2);
}

/// A rename onto a name held by another ontology is rejected.
#[test]
fn test_rename_onto_a_registered_name_is_rejected() {
    let repo = repository();
    let a = create_model(Some(ontology("urn:a", &[])), &spec(), &repo).unwrap();
    create_model(Some(ontology("urn:b", &[])), &spec(), &repo).unwrap();

    let err = a.add(version("urn:a", "urn:b")).unwrap_err();
    assert!(matches!(err, OntError::IllegalArgument(_)));
    assert!(!a.base_graph().contains_triple(&version("urn:a", "urn:b")));
    assert_eq!(ids(&repo), ["urn:a", "urn:b"]);
}

/// Name-bearing edits of an imported ontology fail and change nothing.
#[test]
fn test_imported_ontology_cannot_be_renamed() {
    let repo = repository();
    repo.put("urn:b", ontology("urn:b", &[]));
    let a = create_model(Some(ontology("urn:a", &["urn:b"])), &spec(), &repo).unwrap();
    let b = get_model_or_null(&Node::iri("urn:b"), &spec(), &repo).unwrap().unwrap();
    let union = b.union_graph();
    let header = Triple::ontology_header(Node::iri("urn:b"));

    let renamed = b.set_id(Node::iri("urn:b-x"));
    assert!(matches!(renamed, Err(OntError::IllegalArgument(_))));
    let second_header = union.add(Triple::ontology_header(Node::iri("urn:z")));
    assert!(matches!(second_header, Err(OntError::IllegalArgument(_))));
    let versioned = union.add(version("urn:b", "urn:b-v2"));
    assert!(matches!(versioned, Err(OntError::IllegalArgument(_))));
    let dropped = union.delete(&header);
    assert!(matches!(dropped, Err(OntError::IllegalArgument(_))));
    let cleared = union.clear();
    assert!(matches!(cleared, Err(OntError::IllegalArgument(_))));

    assert_eq!(b.base_graph().size(), 1);
    assert!(b.base_graph().contains_triple(&header));
    assert_eq!(ids(&repo), ["urn:a", "urn:b"]);
    assert!(a.has_import(&b));

    // statements that do not touch the name are fine
    let fact = Triple::new(Node::iri("urn:x"), Node::iri("urn:p"), Node::iri("urn:y"));
    union.add(fact.clone()).unwrap();
    assert!(a.graph().contains_triple(&fact));

    // once no longer imported, the rename goes through
    a.delete(&import("urn:a", "urn:b")).unwrap();
    b.set_id(Node::iri("urn:b-x")).unwrap();
    assert_eq!(ids(&repo), ["urn:a", "urn:b-x"]);
}

// ============================================================================
// Adoption
// ============================================================================

/// A hierarchy built by hand keeps its shape and gains import statements.
#[test]
fn test_prebuilt_hierarchy_is_adopted() {
    let repo = repository();
    let a = UnionGraph::new(ontology("urn:a", &[]));
    let b = UnionGraph::new(ontology("urn:b", &[]));
    let c = UnionGraph::new(Rc::new(GraphMem::new()));
    a.add_sub_graph(b.clone()).unwrap();
    b.add_sub_graph(c.clone()).unwrap();

    let model = create_model(Some(a.clone()), &spec(), &repo).unwrap();
    assert!(Rc::ptr_eq(model.union_graph(), &a));
    assert_eq!(repo.count(), 3);
    assert!(a.base_graph().contains_triple(&import("urn:a", "urn:b")));

    // the anonymous graph got a header and is imported by name
    let c_name = ontunion::HeaderNaming.find_name(&**c.base_graph()).unwrap();
    assert!(c_name.is_blank());
    assert!(b
        .base_graph()
        .contains_triple(&Triple::imports(Node::iri("urn:b"), c_name.clone())));
    assert!(repo.contains(&c_name.to_id()));

    // the adopted hierarchy is managed: new imports resolve
    let f = create_model(Some(ontology("urn:f", &[])), &spec(), &repo).unwrap();
    model.add_import(&f).unwrap();
    assert!(a.base_graph().contains_triple(&import("urn:a", "urn:f")));
    assert_eq!(flat_hierarchy(&a).len(), 4);
}

/// Plain sub-graphs of an adopted hierarchy are wrapped in place.
#[test]
fn test_plain_sub_graphs_are_wrapped_on_adoption() {
    let repo = repository();
    let a = UnionGraph::new(ontology("urn:a", &[]));
    a.add_sub_graph(ontology("urn:p", &[])).unwrap();

    let bridge = UnionGraphRepository::new(repo.clone(), ImportsConfig::default());
    bridge.put(a.clone()).unwrap();
    let subs: Vec<GraphRef> = a.sub_graphs().collect();
    assert_eq!(subs.len(), 1);
    let p = subs[0].as_union().unwrap();
    assert!(bridge.is_managed(p));
    assert!(a.base_graph().contains_triple(&import("urn:a", "urn:p")));
}

/// Sub-graphs conflicting with a registered ontology are rejected.
#[test]
fn test_conflicting_sub_graph_is_rejected() {
    let repo = repository();
    let a = create_model(Some(ontology("urn:a", &[])), &spec(), &repo).unwrap();
    create_model(Some(ontology("urn:b", &[])), &spec(), &repo).unwrap();
    let impostor = UnionGraph::new(ontology("urn:b", &[]));
    let err = a.union_graph().add_sub_graph(impostor).unwrap_err();
    assert!(matches!(err, OntError::IllegalArgument(_)));
    assert!(!a.union_graph().has_sub_graphs());
}

/// A hierarchy that clashes with a registered ontology is rejected before
/// any of it is registered.
#[test]
fn test_conflicting_hierarchy_registers_nothing() {
    let repo = repository();
    create_model(Some(ontology("urn:b", &[])), &spec(), &repo).unwrap();
    let a = UnionGraph::new(ontology("urn:a", &[]));
    a.add_sub_graph(UnionGraph::new(ontology("urn:c", &[]))).unwrap();
    a.add_sub_graph(UnionGraph::new(ontology("urn:b", &[]))).unwrap();

    let bridge = UnionGraphRepository::new(repo.clone(), ImportsConfig::default());
    let err = bridge.put(a.clone()).unwrap_err();
    assert!(matches!(err, OntError::IllegalArgument(_)));
    assert_eq!(ids(&repo), ["urn:b"]);
    assert_eq!(a.base_graph().size(), 1);
    assert!(!bridge.is_managed(&a));
}

/// Two graphs of one hierarchy declaring the same name are rejected.
#[test]
fn test_duplicate_name_in_hierarchy_registers_nothing() {
    let repo = repository();
    let a = UnionGraph::new(ontology("urn:a", &[]));
    a.add_sub_graph(ontology("urn:p", &[])).unwrap();
    a.add_sub_graph(ontology("urn:p", &[])).unwrap();

    let bridge = UnionGraphRepository::new(repo.clone(), ImportsConfig::default());
    let err = bridge.put(a.clone()).unwrap_err();
    assert!(matches!(err, OntError::IllegalArgument(_)));
    assert_eq!(repo.count(), 0);
    assert_eq!(a.sub_graphs().count(), 2);
}
