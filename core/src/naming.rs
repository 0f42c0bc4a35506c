//! How ontology graphs are named.
//!
//! Repositories key ontology graphs by name. The name is read from the
//! ontology header (`<name> rdf:type owl:Ontology`) of a graph's base graph,
//! and a header is synthesized when a graph that must be registered has none.

use crate::error::Result;
use crate::graph::Graph;
use crate::node::{Node, Pattern, Triple};
use crate::vocab;

/// Strategy that finds or assigns the name of an ontology graph.
///
/// Implementations should be given indivisible graphs; for union graphs pass
/// [`UnionGraph::base_graph`](crate::graph::UnionGraph::base_graph), since a
/// union sees the headers of its whole import closure.
pub trait OntologyNaming {
    /// The subject of the ontology header chosen for `graph`.
    fn header(&self, graph: &dyn Graph) -> Option<Node>;

    /// The registry name of `graph`, if it has a header.
    fn find_name(&self, graph: &dyn Graph) -> Option<Node>;

    /// The registry name of `graph`, adding an anonymous header if needed.
    ///
    /// # Errors
    ///
    /// Errors raised while adding the header triple.
    fn ensure_name(&self, graph: &dyn Graph) -> Result<Node>;

    /// Objects of the `owl:imports` statements of the chosen header, in
    /// graph order, without duplicates.
    fn imports(&self, graph: &dyn Graph) -> Vec<Node> {
        let Some(header) = self.header(graph) else {
            return Vec::new();
        };
        let mut out: Vec<Node> = Vec::new();
        let pattern = Pattern::new(Some(header), Some(Node::iri(vocab::OWL_IMPORTS)), None);
        for triple in graph.find(&pattern) {
            if !triple.o.is_literal() && !out.contains(&triple.o) {
                out.push(triple.o);
            }
        }
        out
    }
}

/// Names graphs after their `owl:Ontology` header.
///
/// With several headers the choice is deterministic: IRIs win over blank
/// nodes, then the header with more outgoing statements, then the smaller
/// node. The name is the header's single IRI `owl:versionIRI` when it has
/// one, otherwise the header itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderNaming;

impl OntologyNaming for HeaderNaming {
    fn header(&self, graph: &dyn Graph) -> Option<Node> {
        let mut headers = ontology_headers(graph);
        if headers.len() > 1 {
            headers.sort_by_cached_key(|h| {
                let outgoing = graph
                    .find(&Pattern::new(Some(h.clone()), None, None))
                    .count();
                (!h.is_iri(), std::cmp::Reverse(outgoing), h.clone())
            });
        }
        headers.into_iter().next()
    }

    fn find_name(&self, graph: &dyn Graph) -> Option<Node> {
        let header = self.header(graph)?;
        if header.is_iri() {
            let pattern = Pattern::new(
                Some(header.clone()),
                Some(Node::iri(vocab::OWL_VERSION_IRI)),
                None,
            );
            let versions: Vec<Node> = graph.find(&pattern).map(|t| t.o).filter(Node::is_iri).collect();
            if let [version] = versions.as_slice() {
                return Some(version.clone());
            }
        }
        Some(header)
    }

    fn ensure_name(&self, graph: &dyn Graph) -> Result<Node> {
        if let Some(name) = self.find_name(graph) {
            return Ok(name);
        }
        let header = Node::fresh_blank();
        graph.add(Triple::ontology_header(header.clone()))?;
        Ok(header)
    }
}

/// Distinct subjects of `rdf:type owl:Ontology` statements, IRIs and blank
/// nodes only, in graph order.
#[must_use]
pub fn ontology_headers(graph: &dyn Graph) -> Vec<Node> {
    let pattern = Pattern::new(
        None,
        Some(Node::iri(vocab::RDF_TYPE)),
        Some(Node::iri(vocab::OWL_ONTOLOGY)),
    );
    let mut out: Vec<Node> = Vec::new();
    for triple in graph.find(&pattern) {
        if !triple.s.is_literal() && !out.contains(&triple.s) {
            out.push(triple.s);
        }
    }
    out
}

/// Returns true if `graph` has at least one ontology header.
#[must_use]
pub fn is_ont_graph(graph: &dyn Graph) -> bool {
    graph.contains(&Pattern::new(
        None,
        Some(Node::iri(vocab::RDF_TYPE)),
        Some(Node::iri(vocab::OWL_ONTOLOGY)),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::graph::GraphMem;

    #[test]
    fn iri_header_wins_over_blank() {
        let g = GraphMem::from_triples([
            Triple::ontology_header(Node::blank("b")),
            Triple::ontology_header(Node::iri("urn:o")),
        ]);
        assert_eq!(HeaderNaming.header(&g), Some(Node::iri("urn:o")));
    }

    #[test]
    fn busier_header_wins_among_iris() {
        let g = GraphMem::from_triples([
            Triple::ontology_header(Node::iri("urn:a")),
            Triple::ontology_header(Node::iri("urn:b")),
            Triple::imports(Node::iri("urn:b"), Node::iri("urn:c")),
        ]);
        assert_eq!(HeaderNaming.header(&g), Some(Node::iri("urn:b")));
    }

    #[test]
    fn version_iri_names_the_ontology() {
        let g = GraphMem::from_triples([
            Triple::ontology_header(Node::iri("urn:o")),
            Triple::new(
                Node::iri("urn:o"),
                Node::iri(vocab::OWL_VERSION_IRI),
                Node::iri("urn:o/1.0"),
            ),
        ]);
        assert_eq!(HeaderNaming.find_name(&g), Some(Node::iri("urn:o/1.0")));
        assert_eq!(HeaderNaming.header(&g), Some(Node::iri("urn:o")));
    }

    #[test]
    fn ensure_name_adds_anonymous_header_once() {
        let g = GraphMem::new();
        assert!(!is_ont_graph(&g));
        let name = HeaderNaming.ensure_name(&g).unwrap();
        assert!(name.is_blank());
        assert!(is_ont_graph(&g));
        assert_eq!(HeaderNaming.ensure_name(&g).unwrap(), name);
        assert_eq!(g.size(), 1);
    }

    #[test]
    fn imports_follow_the_chosen_header() {
        let g = GraphMem::from_triples([
            Triple::ontology_header(Node::iri("urn:a")),
            Triple::imports(Node::iri("urn:a"), Node::iri("urn:b")),
            Triple::imports(Node::iri("urn:x"), Node::iri("urn:y")),
        ]);
        assert_eq!(HeaderNaming.imports(&g), vec![Node::iri("urn:b")]);
    }
}
