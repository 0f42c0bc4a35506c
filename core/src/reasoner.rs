//! Reasoner seam: binding entailment over a graph.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::rc::Rc;

use crate::error::{OntError, Result};
use crate::graph::hierarchy::has_inf_graph;
use crate::graph::{describe, Graph, GraphRef, PrefixMapping, TripleIter};
use crate::node::{Node, Pattern, Triple};
use crate::vocab;

/// Computes the triples entailed by a graph.
pub trait Reasoner {
    /// Short identifier used in logs and configuration.
    fn name(&self) -> &str;

    /// Triples entailed by `raw`. May include triples already in `raw`.
    fn entailments(&self, raw: &dyn Graph) -> Vec<Triple>;
}

/// Creates reasoners; carried by an
/// [`OntSpecification`](crate::specification::OntSpecification).
pub trait ReasonerFactory {
    /// Short identifier of the reasoners this factory creates.
    fn name(&self) -> &str;

    /// A new reasoner.
    fn create(&self) -> Rc<dyn Reasoner>;

    /// Binds a new reasoner over `raw`.
    ///
    /// # Errors
    ///
    /// Returns [`OntError::InferenceBound`] if `raw` or a graph reachable
    /// from it is already inference-bound.
    fn bind(&self, raw: GraphRef) -> Result<Rc<InfGraph>> {
        InfGraph::bind(self.create(), raw)
    }
}

/// A graph whose reads include the entailments of a reasoner over a raw graph.
///
/// Entailments are recomputed on every read; writes go to the raw graph.
pub struct InfGraph {
    raw: GraphRef,
    reasoner: Rc<dyn Reasoner>,
}

impl std::fmt::Debug for InfGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfGraph")
            .field("raw", &describe(&*self.raw))
            .field("reasoner", &self.reasoner.name())
            .finish()
    }
}

impl InfGraph {
    /// Binds `reasoner` over `raw`.
    ///
    /// # Errors
    ///
    /// Returns [`OntError::InferenceBound`] if `raw` or a graph reachable
    /// from it is already inference-bound: entailments would be applied twice.
    pub fn bind(reasoner: Rc<dyn Reasoner>, raw: GraphRef) -> Result<Rc<Self>> {
        if has_inf_graph(&raw) {
            return Err(OntError::InferenceBound(describe(&*raw)));
        }
        Ok(Rc::new(Self { raw, reasoner }))
    }

    /// The graph the reasoner is bound over.
    #[must_use]
    pub fn raw_graph(&self) -> &GraphRef {
        &self.raw
    }

    /// The bound reasoner.
    #[must_use]
    pub fn reasoner(&self) -> &Rc<dyn Reasoner> {
        &self.reasoner
    }

    /// Entailed triples that are not in the raw graph.
    #[must_use]
    pub fn deductions(&self) -> Vec<Triple> {
        let mut out: Vec<Triple> = self
            .reasoner
            .entailments(&*self.raw)
            .into_iter()
            .filter(|t| !self.raw.contains_triple(t))
            .collect();
        out.sort();
        out.dedup();
        out
    }
}

impl Graph for InfGraph {
    fn add(&self, triple: Triple) -> Result<()> {
        self.raw.add(triple)
    }

    fn delete(&self, triple: &Triple) -> Result<()> {
        self.raw.delete(triple)
    }

    fn clear(&self) -> Result<()> {
        self.raw.clear()
    }

    fn find(&self, pattern: &Pattern) -> TripleIter {
        let inferred: Vec<Triple> = self
            .deductions()
            .into_iter()
            .filter(|t| pattern.matches(t))
            .collect();
        Box::new(self.raw.find(pattern).chain(inferred))
    }

    fn prefixes(&self) -> &PrefixMapping {
        self.raw.prefixes()
    }

    fn as_inf(&self) -> Option<&InfGraph> {
        Some(self)
    }
}

/// Transitive closure of `rdfs:subClassOf` and `rdfs:subPropertyOf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitiveReasoner;

impl TransitiveReasoner {
    const PREDICATES: [&'static str; 2] = [vocab::RDFS_SUB_CLASS_OF, vocab::RDFS_SUB_PROPERTY_OF];
}

impl Reasoner for TransitiveReasoner {
    fn name(&self) -> &str {
        "transitive"
    }

    fn entailments(&self, raw: &dyn Graph) -> Vec<Triple> {
        let mut out = Vec::new();
        for predicate in Self::PREDICATES {
            let mut edges: BTreeMap<Node, BTreeSet<Node>> = BTreeMap::new();
            for t in raw.find(&Pattern::predicate(predicate)) {
                edges.entry(t.s).or_default().insert(t.o);
            }
            for (start, direct) in &edges {
                let mut reached = BTreeSet::new();
                let mut queue: VecDeque<&Node> = direct.iter().collect();
                while let Some(next) = queue.pop_front() {
                    if !reached.insert(next.clone()) {
                        continue;
                    }
                    if let Some(more) = edges.get(next) {
                        queue.extend(more);
                    }
                }
                reached.remove(start);
                out.extend(
                    reached
                        .into_iter()
                        .map(|o| Triple::new(start.clone(), Node::iri(predicate), o)),
                );
            }
        }
        out
    }
}

/// Creates [`TransitiveReasoner`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitiveReasonerFactory;

impl ReasonerFactory for TransitiveReasonerFactory {
    fn name(&self) -> &str {
        "transitive"
    }

    fn create(&self) -> Rc<dyn Reasoner> {
        Rc::new(TransitiveReasoner)
    }
}
