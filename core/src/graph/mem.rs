//! Plain in-memory graph.

use std::cell::RefCell;
use std::collections::BTreeSet;

use super::{Graph, PrefixMapping, TripleIter};
use crate::error::Result;
use crate::node::{Node, Pattern, Triple};
use crate::vocab;

/// An ordered set of triples held in memory.
///
/// `find` answers a snapshot of the matches taken at call time, so callers may
/// mutate the graph while still consuming a previous result.
#[derive(Debug, Default)]
pub struct GraphMem {
    triples: RefCell<BTreeSet<Triple>>,
    prefixes: PrefixMapping,
}

impl GraphMem {
    /// Creates an empty graph without prefixes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty graph with the `owl`, `rdf`, `rdfs` and `xsd` prefixes bound.
    #[must_use]
    pub fn with_standard_prefixes() -> Self {
        let graph = Self::new();
        for (prefix, ns) in vocab::STANDARD_PREFIXES {
            graph.prefixes.set(*prefix, *ns);
        }
        graph
    }

    /// Creates a graph holding `triples`.
    pub fn from_triples(triples: impl IntoIterator<Item = Triple>) -> Self {
        let graph = Self::new();
        graph.triples.borrow_mut().extend(triples);
        graph
    }

    /// Inserts a triple; returns false if it was already present.
    pub fn insert(&self, triple: Triple) -> bool {
        self.triples.borrow_mut().insert(triple)
    }

    /// Removes a triple; returns false if it was absent.
    pub fn remove(&self, triple: &Triple) -> bool {
        self.triples.borrow_mut().remove(triple)
    }
}

impl Graph for GraphMem {
    fn add(&self, triple: Triple) -> Result<()> {
        self.insert(triple);
        Ok(())
    }

    fn delete(&self, triple: &Triple) -> Result<()> {
        self.remove(triple);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.triples.borrow_mut().clear();
        Ok(())
    }

    fn find(&self, pattern: &Pattern) -> TripleIter {
        let triples = self.triples.borrow();
        let matches: Vec<Triple> = match &pattern.s {
            // Triples sort by subject first and `Iri("")` is the least node,
            // so a bound subject is a range scan.
            Some(s) => triples
                .range(Triple::new(s.clone(), Node::iri(""), Node::iri(""))..)
                .take_while(|t| &t.s == s)
                .filter(|t| pattern.matches(t))
                .cloned()
                .collect(),
            None => triples
                .iter()
                .filter(|t| pattern.matches(t))
                .cloned()
                .collect(),
        };
        Box::new(matches.into_iter())
    }

    fn contains(&self, pattern: &Pattern) -> bool {
        self.triples.borrow().iter().any(|t| pattern.matches(t))
    }

    fn contains_triple(&self, triple: &Triple) -> bool {
        self.triples.borrow().contains(triple)
    }

    fn size(&self) -> usize {
        self.triples.borrow().len()
    }

    fn is_empty(&self) -> bool {
        self.triples.borrow().is_empty()
    }

    fn prefixes(&self) -> &PrefixMapping {
        &self.prefixes
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn t(s: &str, p: &str, o: &str) -> Triple {
        Triple::new(Node::iri(s), Node::iri(p), Node::iri(o))
    }

    #[test]
    fn set_semantics() {
        let g = GraphMem::new();
        g.add(t("urn:a", "urn:p", "urn:b")).unwrap();
        g.add(t("urn:a", "urn:p", "urn:b")).unwrap();
        assert_eq!(g.size(), 1);
        g.delete(&t("urn:a", "urn:p", "urn:b")).unwrap();
        assert!(g.is_empty());
    }

    #[test]
    fn find_by_subject_and_object() {
        let g = GraphMem::from_triples([
            t("urn:a", "urn:p", "urn:b"),
            t("urn:a", "urn:q", "urn:c"),
            t("urn:b", "urn:p", "urn:c"),
            t("urn:c", "urn:p", "urn:a"),
        ]);
        let by_subject: Vec<_> = g
            .find(&Pattern::new(Some(Node::iri("urn:a")), None, None))
            .collect();
        assert_eq!(by_subject.len(), 2);
        let by_object = g
            .find(&Pattern::new(None, None, Some(Node::iri("urn:c"))))
            .count();
        assert_eq!(by_object, 2);
        assert!(g.contains_triple(&t("urn:c", "urn:p", "urn:a")));
    }

    #[test]
    fn find_is_a_snapshot() {
        let g = GraphMem::from_triples([t("urn:a", "urn:p", "urn:b")]);
        let mut it = g.find(&Pattern::any());
        g.clear().unwrap();
        assert!(it.next().is_some());
        assert!(g.is_empty());
    }

    #[test]
    fn standard_prefixes_are_bound() {
        let g = GraphMem::with_standard_prefixes();
        assert_eq!(g.prefixes().get("owl").as_deref(), Some(vocab::OWL));
    }
}
