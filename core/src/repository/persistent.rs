//! Repository over a [`GraphMaker`].

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use super::{GraphMaker, GraphRepository};
use crate::graph::GraphRef;

/// A [`GraphRepository`] whose graphs live in a [`GraphMaker`].
///
/// Lookups fall through to the maker, so graphs stored by a previous session
/// are found again. Entries put by callers (typically union graphs wrapping a
/// maker graph) shadow the maker's graph under the same id. Since the maker
/// is exposed through [`GraphRepository::graph_maker`], model assembly
/// allocates new ontology graphs through it.
///
/// [`GraphRepository::clear`] only forgets entries: the maker keeps its
/// graphs, and a cleared id becomes visible again once it is put anew.
pub struct PersistentGraphRepository {
    maker: Box<dyn GraphMaker>,
    cache: RefCell<BTreeMap<String, GraphRef>>,
    // maker graphs hidden by `clear`
    hidden: RefCell<BTreeSet<String>>,
}

impl std::fmt::Debug for PersistentGraphRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentGraphRepository")
            .field("names", &self.maker.names())
            .field("cached", &self.cache.borrow().len())
            .finish()
    }
}

impl PersistentGraphRepository {
    /// Wraps `maker`.
    #[must_use]
    pub fn new(maker: impl GraphMaker + 'static) -> Self {
        Self {
            maker: Box::new(maker),
            cache: RefCell::new(BTreeMap::new()),
            hidden: RefCell::new(BTreeSet::new()),
        }
    }

    /// The underlying maker.
    #[must_use]
    pub fn maker(&self) -> &dyn GraphMaker {
        &*self.maker
    }
}

impl GraphRepository for PersistentGraphRepository {
    fn get(&self, id: &str) -> Option<GraphRef> {
        if let Some(graph) = self.cache.borrow().get(id) {
            return Some(graph.clone());
        }
        if self.hidden.borrow().contains(id) {
            return None;
        }
        match self.maker.get_graph_or_null(id) {
            Ok(Some(graph)) => {
                self.cache.borrow_mut().insert(id.to_owned(), graph.clone());
                Some(graph)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(id, error = %e, "graph could not be opened");
                None
            }
        }
    }

    fn put(&self, id: &str, graph: GraphRef) -> Option<GraphRef> {
        let prior = self.get(id);
        self.hidden.borrow_mut().remove(id);
        self.cache.borrow_mut().insert(id.to_owned(), graph);
        prior
    }

    fn remove(&self, id: &str) -> Option<GraphRef> {
        let prior = self.get(id);
        self.cache.borrow_mut().remove(id);
        if prior.is_some() && self.maker.has_graph(id) {
            if let Err(e) = self.maker.remove_graph(id) {
                warn!(id, error = %e, "graph could not be removed from the maker");
            }
        }
        prior
    }

    fn clear(&self) {
        self.cache.borrow_mut().clear();
        self.hidden.borrow_mut().extend(self.maker.names());
    }

    fn ids(&self) -> Box<dyn Iterator<Item = String>> {
        let mut ids: Vec<String> = self.cache.borrow().keys().cloned().collect();
        let hidden = self.hidden.borrow();
        ids.extend(self.maker.names().into_iter().filter(|n| !hidden.contains(n)));
        ids.sort();
        ids.dedup();
        Box::new(ids.into_iter())
    }

    fn contains(&self, id: &str) -> bool {
        self.cache.borrow().contains_key(id)
            || (!self.hidden.borrow().contains(id) && self.maker.has_graph(id))
    }

    fn graph_maker(&self) -> Option<&dyn GraphMaker> {
        Some(&*self.maker)
    }
}
