//! Composite graph over one owned base graph and any number of sub-graphs.

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::{Rc, Weak};

use super::events::{EventManager, GraphEvent};
use super::{graph_key, same_graph, Graph, GraphRef, PrefixMapping, TripleIter};
use crate::error::Result;
use crate::node::{Pattern, Triple};

/// A union of a base graph and a set of sub-graphs.
///
/// Reads see every triple of every indivisible graph in the hierarchy; writes
/// go to the base graph only. Sub-graphs are shared, not owned, and the
/// hierarchy may contain cycles (a graph may include itself transitively).
///
/// Union graphs are always created behind an `Rc` so they can hand out
/// themselves as super-graph references.
pub struct UnionGraph {
    this: Weak<UnionGraph>,
    base: GraphRef,
    sub_graphs: RefCell<Vec<GraphRef>>,
    super_graphs: RefCell<Vec<Weak<UnionGraph>>>,
    distinct: bool,
    events: Rc<EventManager>,
}

impl std::fmt::Debug for UnionGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnionGraph")
            .field("id", &format!("{:x}", graph_key(self)))
            .field("base", &format!("{:x}", graph_key(&*self.base)))
            .field("sub_graphs", &self.sub_graphs.borrow().len())
            .field("distinct", &self.distinct)
            .finish()
    }
}

impl UnionGraph {
    /// Wraps `base` in a distinct union graph with its own event manager.
    #[must_use]
    pub fn new(base: GraphRef) -> Rc<Self> {
        Self::with_options(base, true, Rc::new(EventManager::new()))
    }

    /// Wraps `base` with the given `distinct` flag and event manager.
    ///
    /// Several union graphs may share one event manager.
    #[must_use]
    pub fn with_options(base: GraphRef, distinct: bool, events: Rc<EventManager>) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            base,
            sub_graphs: RefCell::new(Vec::new()),
            super_graphs: RefCell::new(Vec::new()),
            distinct,
            events,
        })
    }

    /// The owned base graph, fixed for the lifetime of this union.
    #[must_use]
    pub fn base_graph(&self) -> &GraphRef {
        &self.base
    }

    /// Whether `find` suppresses duplicates contributed by overlapping graphs.
    #[must_use]
    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    /// The event manager notified of every change to this union.
    #[must_use]
    pub fn event_manager(&self) -> &Rc<EventManager> {
        &self.events
    }

    /// A strong handle to this union.
    ///
    /// Answers `None` only while the last external handle is being dropped.
    #[must_use]
    pub fn to_rc(&self) -> Option<Rc<UnionGraph>> {
        self.this.upgrade()
    }

    /// Attaches `graph` as a sub-graph. Duplicates are allowed.
    ///
    /// Hooks fire in this order: `on_add_sub_graph`, then the attachment,
    /// then `notify_sub_graph_added`, then, if `graph` is a union graph,
    /// `notify_super_graph_added` on that graph's own event manager.
    ///
    /// # Errors
    ///
    /// Listener errors. An error from `on_add_sub_graph` leaves the
    /// hierarchy untouched.
    pub fn add_sub_graph(&self, graph: GraphRef) -> Result<()> {
        self.events.on_add_sub_graph(self, &graph)?;
        self.sub_graphs.borrow_mut().push(graph.clone());
        if let Some(child) = graph.as_union() {
            child.super_graphs.borrow_mut().push(self.this.clone());
        }
        self.events.notify_sub_graph_added(self, &graph)?;
        if let Some(child) = graph.as_union() {
            child.events.notify_super_graph_added(child, self)?;
        }
        Ok(())
    }

    /// Attaches `graph` unless it already is a direct sub-graph.
    ///
    /// # Errors
    ///
    /// As [`UnionGraph::add_sub_graph`].
    pub fn add_sub_graph_if_absent(&self, graph: GraphRef) -> Result<()> {
        if self.contains_graph(&*graph) {
            return Ok(());
        }
        self.add_sub_graph(graph)
    }

    /// Detaches one occurrence of `graph`; does nothing if it is not a direct
    /// sub-graph.
    ///
    /// # Errors
    ///
    /// Listener errors. An error from `on_remove_sub_graph` leaves the
    /// hierarchy untouched.
    pub fn remove_sub_graph(&self, graph: &GraphRef) -> Result<()> {
        if !self.contains_graph(&**graph) {
            return Ok(());
        }
        self.events.on_remove_sub_graph(self, graph)?;
        {
            let mut subs = self.sub_graphs.borrow_mut();
            if let Some(i) = subs.iter().position(|g| same_graph(&**g, &**graph)) {
                subs.remove(i);
            }
        }
        let still_attached = self.contains_graph(&**graph);
        if let (Some(child), false) = (graph.as_union(), still_attached) {
            let key = graph_key(self);
            child
                .super_graphs
                .borrow_mut()
                .retain(|w| w.upgrade().is_some_and(|p| graph_key(&*p) != key));
        }
        self.events.notify_sub_graph_removed(self, graph)
    }

    /// Returns true if `graph` is a direct sub-graph (not transitive).
    #[must_use]
    pub fn contains_graph(&self, graph: &dyn Graph) -> bool {
        self.sub_graphs
            .borrow()
            .iter()
            .any(|g| same_graph(&**g, graph))
    }

    /// Returns true if there is at least one sub-graph.
    #[must_use]
    pub fn has_sub_graphs(&self) -> bool {
        !self.sub_graphs.borrow().is_empty()
    }

    /// Direct sub-graphs, snapshot at call time.
    pub fn sub_graphs(&self) -> impl Iterator<Item = GraphRef> {
        self.sub_graphs.borrow().clone().into_iter()
    }

    /// Live union graphs that include this one directly, snapshot at call time.
    pub fn super_graphs(&self) -> impl Iterator<Item = Rc<UnionGraph>> {
        let supers: Vec<Rc<UnionGraph>> = self
            .super_graphs
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        supers.into_iter()
    }

    /// The indivisible graphs of the hierarchy, base graph first, each once.
    ///
    /// Union graphs met along the way are expanded, never returned; every
    /// union is expanded at most once, so cycles terminate.
    #[must_use]
    pub fn data_graphs(&self) -> Vec<GraphRef> {
        let mut unions = HashSet::from([graph_key(self)]);
        let mut data = HashSet::new();
        let mut out = Vec::new();
        let mut queue: VecDeque<GraphRef> = self.children().into();
        while let Some(graph) = queue.pop_front() {
            match graph.as_union() {
                Some(union) => {
                    if unions.insert(graph_key(union)) {
                        queue.extend(union.children());
                    }
                }
                None => {
                    if data.insert(graph_key(&*graph)) {
                        out.push(graph);
                    }
                }
            }
        }
        out
    }

    /// Every union graph linked to this one through sub- or super-graph
    /// relations, this one first, each exactly once.
    #[must_use]
    pub fn linked_union_graphs(&self) -> Vec<Rc<UnionGraph>> {
        let Some(start) = self.to_rc() else {
            return Vec::new();
        };
        let mut seen = HashSet::from([graph_key(self)]);
        let mut out = vec![start.clone()];
        let mut queue = VecDeque::from([start]);
        while let Some(union) = queue.pop_front() {
            let subs = union.sub_graphs().filter_map(|g| g.as_union().and_then(Self::to_rc));
            let linked: Vec<_> = subs.chain(union.super_graphs()).collect();
            for next in linked {
                if seen.insert(graph_key(&*next)) {
                    out.push(next.clone());
                    queue.push_back(next);
                }
            }
        }
        out
    }

    fn children(&self) -> Vec<GraphRef> {
        let mut children = vec![self.base.clone()];
        children.extend(self.sub_graphs.borrow().iter().cloned());
        children
    }
}

impl Graph for UnionGraph {
    fn add(&self, triple: Triple) -> Result<()> {
        self.events.on_add_triple(self, &triple)?;
        self.base.add(triple.clone())?;
        self.events
            .notify_event(self, &GraphEvent::TripleAdded(triple))
    }

    fn delete(&self, triple: &Triple) -> Result<()> {
        self.events.on_delete_triple(self, triple)?;
        self.base.delete(triple)?;
        self.events
            .notify_event(self, &GraphEvent::TripleDeleted(triple.clone()))
    }

    fn clear(&self) -> Result<()> {
        self.events.on_clear(self)?;
        self.base.clear()?;
        self.events.notify_event(self, &GraphEvent::Cleared)
    }

    fn find(&self, pattern: &Pattern) -> TripleIter {
        let mut graphs = self.data_graphs();
        if graphs.len() == 1 {
            if let Some(only) = graphs.pop() {
                return only.find(pattern);
            }
        }
        let pattern = pattern.clone();
        let all = graphs.into_iter().flat_map(move |g| g.find(&pattern));
        if self.distinct {
            let mut seen = HashSet::new();
            Box::new(all.filter(move |t| seen.insert(t.clone())))
        } else {
            Box::new(all)
        }
    }

    fn contains(&self, pattern: &Pattern) -> bool {
        self.data_graphs().iter().any(|g| g.contains(pattern))
    }

    fn contains_triple(&self, triple: &Triple) -> bool {
        self.data_graphs().iter().any(|g| g.contains_triple(triple))
    }

    fn prefixes(&self) -> &PrefixMapping {
        self.base.prefixes()
    }

    fn as_union(&self) -> Option<&UnionGraph> {
        Some(self)
    }
}
