//! The graph abstraction: a mutable set of triples shared by reference.
//!
//! Graphs are handed around as [`GraphRef`] (`Rc<dyn Graph>`) and mutated
//! through `&self`, so one graph can sit in several hierarchies at once.
//! Identity is the allocation, never the content: two empty graphs are
//! different graphs. Use [`same_graph`] and [`graph_key`] to compare or index
//! graphs.

pub mod events;
pub mod hierarchy;
pub mod mem;
pub mod union;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::Result;
use crate::node::{Pattern, Triple};
use crate::reasoner::InfGraph;

pub use events::{EventManager, GraphEvent, Listener};
pub use mem::GraphMem;
pub use union::UnionGraph;

/// Shared handle to any graph.
pub type GraphRef = Rc<dyn Graph>;

/// Owned, lazily evaluated sequence of matching triples.
pub type TripleIter = Box<dyn Iterator<Item = Triple>>;

/// A mutable collection of triples.
///
/// Mutators take `&self`: implementations use interior mutability so that the
/// same graph can be shared between a repository, several union graphs and the
/// caller. Nothing here is thread-safe.
pub trait Graph {
    /// Adds a triple.
    ///
    /// # Errors
    ///
    /// Composite graphs propagate errors raised by their listeners, in which
    /// case nothing was added.
    fn add(&self, triple: Triple) -> Result<()>;

    /// Deletes a triple if present.
    ///
    /// # Errors
    ///
    /// Composite graphs propagate errors raised by their listeners.
    fn delete(&self, triple: &Triple) -> Result<()>;

    /// Removes every triple.
    ///
    /// # Errors
    ///
    /// Composite graphs propagate errors raised by their listeners.
    fn clear(&self) -> Result<()>;

    /// Returns every triple matching `pattern`.
    fn find(&self, pattern: &Pattern) -> TripleIter;

    /// Returns true if any triple matches `pattern`.
    fn contains(&self, pattern: &Pattern) -> bool {
        self.find(pattern).next().is_some()
    }

    /// Number of triples visible through [`Graph::find`].
    fn size(&self) -> usize {
        self.find(&Pattern::any()).count()
    }

    /// Returns true if the graph has no triples.
    fn is_empty(&self) -> bool {
        !self.contains(&Pattern::any())
    }

    /// Returns true if this exact triple is present.
    fn contains_triple(&self, triple: &Triple) -> bool {
        self.contains(&Pattern::from(triple))
    }

    /// The prefix mapping attached to this graph.
    fn prefixes(&self) -> &PrefixMapping;

    /// Downcast to a union graph.
    fn as_union(&self) -> Option<&UnionGraph> {
        None
    }

    /// Downcast to an inference-bound graph.
    fn as_inf(&self) -> Option<&InfGraph> {
        None
    }
}

/// Returns an identity key for a graph: the address of its allocation.
///
/// `graph_key(&*rc)` for an `Rc<dyn Graph>` equals `graph_key(value)` for a
/// reference to the same value, whatever the static type.
#[must_use]
pub fn graph_key<G: ?Sized>(graph: &G) -> usize {
    graph as *const G as *const () as usize
}

/// Reference identity for graphs.
#[must_use]
pub fn same_graph<A: ?Sized, B: ?Sized>(a: &A, b: &B) -> bool {
    graph_key(a) == graph_key(b)
}

/// Short printable identity used in log and error messages.
#[must_use]
pub fn describe(graph: &dyn Graph) -> String {
    let kind = if graph.as_union().is_some() {
        "UnionGraph"
    } else if graph.as_inf().is_some() {
        "InfGraph"
    } else {
        "Graph"
    };
    format!("{kind}@{:x}", graph_key(graph))
}

impl std::fmt::Debug for dyn Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&describe(self))
    }
}

/// Prefix-to-namespace mapping.
#[derive(Debug, Default)]
pub struct PrefixMapping {
    map: RefCell<BTreeMap<String, String>>,
}

impl PrefixMapping {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `prefix` to `namespace`, replacing any previous binding.
    pub fn set(&self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.map.borrow_mut().insert(prefix.into(), namespace.into());
    }

    /// Removes a binding.
    pub fn remove(&self, prefix: &str) -> Option<String> {
        self.map.borrow_mut().remove(prefix)
    }

    /// Looks up the namespace bound to `prefix`.
    #[must_use]
    pub fn get(&self, prefix: &str) -> Option<String> {
        self.map.borrow().get(prefix).cloned()
    }

    /// All bindings, ordered by prefix.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, String)> {
        self.map
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Returns true if there are no bindings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.borrow().is_empty()
    }

    /// Abbreviates `iri` to `prefix:local` using the longest matching
    /// namespace, if the local part is a plain name.
    #[must_use]
    pub fn shorten(&self, iri: &str) -> Option<String> {
        let map = self.map.borrow();
        map.iter()
            .filter(|(_, ns)| !ns.is_empty() && iri.starts_with(ns.as_str()))
            .max_by_key(|(_, ns)| ns.len())
            .and_then(|(prefix, ns)| {
                let local = &iri[ns.len()..];
                let plain = local
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
                let starts_ok = local
                    .chars()
                    .next()
                    .map_or(true, |c| c.is_ascii_alphabetic() || c == '_');
                (plain && starts_ok).then(|| format!("{prefix}:{local}"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_ignores_static_type() {
        let mem = Rc::new(GraphMem::new());
        let as_dyn: GraphRef = mem.clone();
        assert!(same_graph(&*mem, &*as_dyn));
        assert!(!same_graph(&*as_dyn, &GraphMem::new()));
    }

    #[test]
    fn shorten_prefers_longest_namespace() {
        let pm = PrefixMapping::new();
        pm.set("ex", "http://ex.com/");
        pm.set("exa", "http://ex.com/a#");
        assert_eq!(pm.shorten("http://ex.com/a#B").as_deref(), Some("exa:B"));
        assert_eq!(pm.shorten("http://ex.com/x").as_deref(), Some("ex:x"));
        assert_eq!(pm.shorten("http://ex.com/a/b"), None);
        assert_eq!(pm.shorten("urn:other"), None);
    }
}
