//! Listener protocol for [`UnionGraph`] structure and content changes.
//!
//! `on_*` hooks fire before a change and may veto it by returning an error;
//! the change is then not applied. `notify_*` hooks fire after the change.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::{GraphRef, UnionGraph};
use crate::error::Result;
use crate::node::Triple;

/// A completed content change, reported through [`Listener::notify_event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphEvent {
    /// A triple was added to the base graph.
    TripleAdded(Triple),
    /// A triple was deleted from the base graph.
    TripleDeleted(Triple),
    /// The base graph was cleared.
    Cleared,
}

/// Upcasting support so listeners can be filtered by concrete type.
pub trait AsAny: Any {
    /// Converts a shared listener into `Rc<dyn Any>` for downcasting.
    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// Observer of a [`UnionGraph`]. Every hook defaults to a no-op.
pub trait Listener: AsAny {
    /// Before a triple is added.
    ///
    /// # Errors
    ///
    /// An error aborts the addition.
    fn on_add_triple(&self, _graph: &UnionGraph, _triple: &Triple) -> Result<()> {
        Ok(())
    }

    /// Before a triple is deleted.
    ///
    /// # Errors
    ///
    /// An error aborts the deletion.
    fn on_delete_triple(&self, _graph: &UnionGraph, _triple: &Triple) -> Result<()> {
        Ok(())
    }

    /// Before the base graph is cleared.
    ///
    /// # Errors
    ///
    /// An error aborts the clear.
    fn on_clear(&self, _graph: &UnionGraph) -> Result<()> {
        Ok(())
    }

    /// Before `sub_graph` is attached.
    ///
    /// # Errors
    ///
    /// An error aborts the attachment.
    fn on_add_sub_graph(&self, _graph: &UnionGraph, _sub_graph: &GraphRef) -> Result<()> {
        Ok(())
    }

    /// Before `sub_graph` is detached.
    ///
    /// # Errors
    ///
    /// An error aborts the detachment.
    fn on_remove_sub_graph(&self, _graph: &UnionGraph, _sub_graph: &GraphRef) -> Result<()> {
        Ok(())
    }

    /// After `sub_graph` was attached.
    ///
    /// # Errors
    ///
    /// Errors propagate to the caller of `add_sub_graph`.
    fn notify_sub_graph_added(&self, _graph: &UnionGraph, _sub_graph: &GraphRef) -> Result<()> {
        Ok(())
    }

    /// After `sub_graph` was detached.
    ///
    /// # Errors
    ///
    /// Errors propagate to the caller of `remove_sub_graph`.
    fn notify_sub_graph_removed(&self, _graph: &UnionGraph, _sub_graph: &GraphRef) -> Result<()> {
        Ok(())
    }

    /// After `graph` was attached as a sub-graph of `super_graph`.
    ///
    /// # Errors
    ///
    /// Errors propagate to the caller of `add_sub_graph`.
    fn notify_super_graph_added(&self, _graph: &UnionGraph, _super_graph: &UnionGraph) -> Result<()> {
        Ok(())
    }

    /// After a content change.
    ///
    /// # Errors
    ///
    /// Errors propagate to the caller of the mutating method.
    fn notify_event(&self, _graph: &UnionGraph, _event: &GraphEvent) -> Result<()> {
        Ok(())
    }
}

/// Holder of the listeners of one or more union graphs.
///
/// [`EventManager::off`] silences every listener until [`EventManager::on`];
/// bulk loads use this to skip per-triple import synchronization.
pub struct EventManager {
    listeners: RefCell<Vec<Rc<dyn Listener>>>,
    enabled: Cell<bool>,
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventManager")
            .field("listeners", &self.listeners.borrow().len())
            .field("enabled", &self.enabled.get())
            .finish()
    }
}

impl EventManager {
    /// Creates an enabled manager without listeners.
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
            enabled: Cell::new(true),
        }
    }

    /// Adds a listener.
    pub fn register(&self, listener: Rc<dyn Listener>) {
        self.listeners.borrow_mut().push(listener);
    }

    /// Removes a listener by identity; returns false if it was not registered.
    pub fn unregister(&self, listener: &Rc<dyn Listener>) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let key = Rc::as_ptr(listener) as *const ();
        match listeners
            .iter()
            .position(|l| Rc::as_ptr(l) as *const () == key)
        {
            Some(i) => {
                listeners.remove(i);
                true
            }
            None => false,
        }
    }

    /// Re-enables listener calls.
    pub fn on(&self) {
        self.enabled.set(true);
    }

    /// Suppresses all listener calls.
    pub fn off(&self) {
        self.enabled.set(false);
    }

    /// Returns true unless [`EventManager::off`] is in effect.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// Snapshot of the registered listeners.
    #[must_use]
    pub fn listeners(&self) -> Vec<Rc<dyn Listener>> {
        self.listeners.borrow().clone()
    }

    /// Returns true if at least one listener is registered.
    #[must_use]
    pub fn has_listeners(&self) -> bool {
        !self.listeners.borrow().is_empty()
    }

    // Listeners may register further listeners or mutate the graph, so each
    // dispatch works on a snapshot and holds no borrow while calling out.
    fn each(&self, mut call: impl FnMut(&dyn Listener) -> Result<()>) -> Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }
        for listener in self.listeners() {
            call(listener.as_ref())?;
        }
        Ok(())
    }

    pub(crate) fn on_add_triple(&self, graph: &UnionGraph, triple: &Triple) -> Result<()> {
        self.each(|l| l.on_add_triple(graph, triple))
    }

    pub(crate) fn on_delete_triple(&self, graph: &UnionGraph, triple: &Triple) -> Result<()> {
        self.each(|l| l.on_delete_triple(graph, triple))
    }

    pub(crate) fn on_clear(&self, graph: &UnionGraph) -> Result<()> {
        self.each(|l| l.on_clear(graph))
    }

    pub(crate) fn on_add_sub_graph(&self, graph: &UnionGraph, sub: &GraphRef) -> Result<()> {
        self.each(|l| l.on_add_sub_graph(graph, sub))
    }

    pub(crate) fn on_remove_sub_graph(&self, graph: &UnionGraph, sub: &GraphRef) -> Result<()> {
        self.each(|l| l.on_remove_sub_graph(graph, sub))
    }

    pub(crate) fn notify_sub_graph_added(&self, graph: &UnionGraph, sub: &GraphRef) -> Result<()> {
        self.each(|l| l.notify_sub_graph_added(graph, sub))
    }

    pub(crate) fn notify_sub_graph_removed(&self, graph: &UnionGraph, sub: &GraphRef) -> Result<()> {
        self.each(|l| l.notify_sub_graph_removed(graph, sub))
    }

    pub(crate) fn notify_super_graph_added(
        &self,
        graph: &UnionGraph,
        super_graph: &UnionGraph,
    ) -> Result<()> {
        self.each(|l| l.notify_super_graph_added(graph, super_graph))
    }

    pub(crate) fn notify_event(&self, graph: &UnionGraph, event: &GraphEvent) -> Result<()> {
        self.each(|l| l.notify_event(graph, event))
    }
}

/// Registered listeners of concrete type `L`.
#[must_use]
pub fn listeners_of<L: Listener>(events: &EventManager) -> Vec<Rc<L>> {
    events
        .listeners()
        .into_iter()
        .filter_map(|l| l.into_any_rc().downcast::<L>().ok())
        .collect()
}

/// Returns true if a listener of type `L` is registered.
#[must_use]
pub fn has_listener<L: Listener>(events: &EventManager) -> bool {
    !listeners_of::<L>(events).is_empty()
}
