//! Ontology models: an assembled graph plus the profile it is read under.

use std::rc::Rc;

use crate::error::Result;
use crate::graph::{Graph, GraphRef, TripleIter, UnionGraph};
use crate::naming::{HeaderNaming, OntologyNaming};
use crate::node::{Node, Pattern, Triple};
use crate::specification::OntProfile;

/// An assembled ontology model.
///
/// The model graph is either the union graph itself or an inference-bound
/// graph over it. Writes always end up in the union's base graph.
#[derive(Clone)]
pub struct OntModel {
    graph: GraphRef,
    union: Rc<UnionGraph>,
    profile: OntProfile,
}

impl std::fmt::Debug for OntModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OntModel")
            .field("id", &self.id())
            .field("graph", &self.graph)
            .field("profile", &self.profile)
            .finish()
    }
}

impl OntModel {
    /// Wraps an assembled graph. `graph` must be `union` or a graph whose
    /// writes go to `union`.
    #[must_use]
    pub fn new(graph: GraphRef, union: Rc<UnionGraph>, profile: OntProfile) -> Self {
        Self {
            graph,
            union,
            profile,
        }
    }

    /// The model graph, inference-bound if the specification had a reasoner.
    #[must_use]
    pub fn graph(&self) -> &GraphRef {
        &self.graph
    }

    /// The union graph holding the import closure.
    #[must_use]
    pub fn union_graph(&self) -> &Rc<UnionGraph> {
        &self.union
    }

    /// The base graph holding this ontology's own statements.
    #[must_use]
    pub fn base_graph(&self) -> &GraphRef {
        self.union.base_graph()
    }

    /// The ontology profile.
    #[must_use]
    pub fn profile(&self) -> OntProfile {
        self.profile
    }

    /// The ontology name.
    #[must_use]
    pub fn id(&self) -> Option<Node> {
        HeaderNaming.find_name(&**self.base_graph())
    }

    /// Names this ontology imports directly.
    #[must_use]
    pub fn imports(&self) -> Vec<Node> {
        HeaderNaming.imports(&**self.base_graph())
    }

    /// Returns true if `other` is a direct import of this model.
    #[must_use]
    pub fn has_import(&self, other: &OntModel) -> bool {
        self.union.contains_graph(&*other.union)
    }

    /// Imports `other`: attaches its union graph and asserts the
    /// `owl:imports` statement.
    ///
    /// # Errors
    ///
    /// Listener errors, for example when `other` is anonymous and this model
    /// is managed by a repository.
    pub fn add_import(&self, other: &OntModel) -> Result<()> {
        self.union.add_sub_graph_if_absent(other.union.clone())?;
        if let Some(triple) = self.import_triple(other)? {
            if !self.base_graph().contains_triple(&triple) {
                self.base_graph().add(triple)?;
            }
        }
        Ok(())
    }

    /// Removes the import of `other` together with its statement.
    ///
    /// # Errors
    ///
    /// Listener errors.
    pub fn remove_import(&self, other: &OntModel) -> Result<()> {
        let sub: GraphRef = other.union.clone();
        self.union.remove_sub_graph(&sub)?;
        let header = HeaderNaming.header(&**self.base_graph());
        if let (Some(header), Some(name)) = (header, other.id()) {
            self.base_graph().delete(&Triple::imports(header, name))?;
        }
        Ok(())
    }

    /// Renames the ontology: the header statements move to `id`.
    ///
    /// A managed model is re-registered under its new name.
    ///
    /// # Errors
    ///
    /// [`OntError::IllegalArgument`](crate::OntError::IllegalArgument) if
    /// another managed ontology imports this one, or if `id` is registered
    /// to a different ontology.
    pub fn set_id(&self, id: Node) -> Result<()> {
        let Some(header) = HeaderNaming.header(&**self.base_graph()) else {
            return self.union.add(Triple::ontology_header(id));
        };
        if header == id {
            return Ok(());
        }
        let (typing, rest): (Vec<Triple>, Vec<Triple>) = self
            .base_graph()
            .find(&Pattern::new(Some(header), None, None))
            .partition(Triple::is_ontology_header);
        // the new header goes in first so an imported ontology fails untouched
        self.union.add(Triple::ontology_header(id.clone()))?;
        for t in &rest {
            self.union.add(Triple::new(id.clone(), t.p.clone(), t.o.clone()))?;
        }
        for t in typing.iter().chain(&rest) {
            self.union.delete(t)?;
        }
        Ok(())
    }

    fn import_triple(&self, other: &OntModel) -> Result<Option<Triple>> {
        let base = self.base_graph();
        HeaderNaming.ensure_name(&**base)?;
        Ok(HeaderNaming
            .header(&**base)
            .zip(other.id())
            .map(|(header, name)| Triple::imports(header, name)))
    }

    /// Statements matching `pattern`, including imported and inferred ones.
    #[must_use]
    pub fn statements(&self, pattern: &Pattern) -> TripleIter {
        self.graph.find(pattern)
    }

    /// Number of visible statements.
    #[must_use]
    pub fn size(&self) -> usize {
        self.graph.size()
    }

    /// Adds a statement to the base graph.
    ///
    /// # Errors
    ///
    /// Listener errors, for example an unresolved `owl:imports` in strict
    /// mode.
    pub fn add(&self, triple: Triple) -> Result<()> {
        self.graph.add(triple)
    }

    /// Deletes a statement from the base graph.
    ///
    /// # Errors
    ///
    /// Listener errors.
    pub fn delete(&self, triple: &Triple) -> Result<()> {
        self.graph.delete(triple)
    }

    /// Returns true if a reasoner is bound over the model.
    #[must_use]
    pub fn is_inferred(&self) -> bool {
        self.graph.as_inf().is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::graph::GraphMem;

    fn model(name: &str) -> OntModel {
        let base = GraphMem::new();
        base.insert(Triple::ontology_header(Node::iri(name)));
        let union = UnionGraph::new(Rc::new(base));
        OntModel::new(union.clone(), union, OntProfile::default())
    }

    #[test]
    fn unmanaged_imports_assert_statements() {
        let a = model("urn:a");
        let b = model("urn:b");
        a.add_import(&b).unwrap();
        a.add_import(&b).unwrap();
        assert!(a.has_import(&b));
        assert_eq!(a.imports(), [Node::iri("urn:b")]);
        assert_eq!(a.union_graph().sub_graphs().count(), 1);

        a.remove_import(&b).unwrap();
        assert!(!a.has_import(&b));
        assert!(a.imports().is_empty());
    }

    #[test]
    fn reads_see_imported_statements() {
        let a = model("urn:a");
        let b = model("urn:b");
        let fact = Triple::new(Node::iri("urn:x"), Node::iri("urn:p"), Node::iri("urn:y"));
        b.add(fact.clone()).unwrap();
        a.add_import(&b).unwrap();
        assert!(a.graph().contains_triple(&fact));
        assert!(!a.base_graph().contains_triple(&fact));
        assert_eq!(a.id(), Some(Node::iri("urn:a")));
        assert!(!a.is_inferred());
    }
}
