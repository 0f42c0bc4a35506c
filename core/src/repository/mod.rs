//! Identity-keyed graph registries.
//!
//! Two sibling abstractions with deliberately different miss handling:
//!
//! - [`GraphRepository`] is map-like and lenient: lookups of unknown ids
//!   answer `None`.
//! - [`GraphMaker`] manages graph lifecycles and is strict: creating an
//!   existing name fails with [`OntError::AlreadyExists`](crate::OntError::AlreadyExists),
//!   opening or removing an unknown one with [`OntError::NotFound`](crate::OntError::NotFound).

pub mod document;
pub mod maker;
pub mod persistent;

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::graph::GraphRef;

pub use document::DocumentGraphRepository;
pub use maker::{FileGraphMaker, GraphMaker, MemGraphMaker};
pub use persistent::PersistentGraphRepository;

/// A mapping from string ids to shared graphs.
pub trait GraphRepository {
    /// The graph registered under `id`, or `None`.
    fn get(&self, id: &str) -> Option<GraphRef>;

    /// Registers `graph` under `id`, answering the graph it replaced.
    fn put(&self, id: &str, graph: GraphRef) -> Option<GraphRef>;

    /// Detaches and answers the graph under `id`; a no-op for unknown ids.
    fn remove(&self, id: &str) -> Option<GraphRef>;

    /// Drops every entry. Graphs are not closed.
    fn clear(&self);

    /// Registered ids, snapshot at call time.
    fn ids(&self) -> Box<dyn Iterator<Item = String>>;

    /// Number of entries.
    fn count(&self) -> usize {
        self.ids().count()
    }

    /// Every registered graph, in id order.
    fn graphs(&self) -> Vec<GraphRef> {
        self.ids().filter_map(|id| self.get(&id)).collect()
    }

    /// Returns true if `id` is registered.
    fn contains(&self, id: &str) -> bool {
        self.ids().any(|known| known == id)
    }

    /// The maker backing this repository, when graphs can be allocated
    /// persistently through it.
    fn graph_maker(&self) -> Option<&dyn GraphMaker> {
        None
    }
}

/// Repository held entirely in memory.
#[derive(Default)]
pub struct MemGraphRepository {
    graphs: RefCell<BTreeMap<String, GraphRef>>,
}

impl std::fmt::Debug for MemGraphRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemGraphRepository")
            .field("ids", &self.graphs.borrow().keys().collect::<Vec<_>>())
            .finish()
    }
}

impl MemGraphRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl GraphRepository for MemGraphRepository {
    fn get(&self, id: &str) -> Option<GraphRef> {
        self.graphs.borrow().get(id).cloned()
    }

    fn put(&self, id: &str, graph: GraphRef) -> Option<GraphRef> {
        self.graphs.borrow_mut().insert(id.to_owned(), graph)
    }

    fn remove(&self, id: &str) -> Option<GraphRef> {
        self.graphs.borrow_mut().remove(id)
    }

    fn clear(&self) {
        self.graphs.borrow_mut().clear();
    }

    fn ids(&self) -> Box<dyn Iterator<Item = String>> {
        let ids: Vec<String> = self.graphs.borrow().keys().cloned().collect();
        Box::new(ids.into_iter())
    }

    fn count(&self) -> usize {
        self.graphs.borrow().len()
    }

    fn contains(&self, id: &str) -> bool {
        self.graphs.borrow().contains_key(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::graph::{same_graph, GraphMem};

    #[test]
    fn put_answers_the_replaced_graph() {
        let repo = MemGraphRepository::new();
        let g1: GraphRef = Rc::new(GraphMem::new());
        let g2: GraphRef = Rc::new(GraphMem::new());
        assert!(repo.put("k", g1.clone()).is_none());
        let prior = repo.put("k", g2.clone()).unwrap();
        assert!(same_graph(&*prior, &*g1));
        assert!(same_graph(&*repo.get("k").unwrap(), &*g2));
        assert_eq!(repo.count(), 1);
    }

    #[test]
    fn misses_are_none() {
        let repo = MemGraphRepository::new();
        assert!(repo.get("x").is_none());
        assert!(repo.remove("x").is_none());
        assert!(!repo.contains("x"));
    }

    #[test]
    fn ids_are_a_snapshot() {
        let repo = MemGraphRepository::new();
        repo.put("a", Rc::new(GraphMem::new()));
        repo.put("b", Rc::new(GraphMem::new()));
        let ids = repo.ids();
        repo.clear();
        assert_eq!(ids.collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(repo.count(), 0);
        assert!(repo.graphs().is_empty());
    }
}
