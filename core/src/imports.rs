//! Keeps union graph hierarchies and `owl:imports` statements in step.
//!
//! A [`UnionGraphRepository`] wraps a [`GraphRepository`] and manages union
//! graphs registered in it. For every managed union graph `U` with base `B`,
//! the direct sub-graphs of `U` are exactly the graphs named by the
//! `owl:imports` objects of `B`'s ontology header. The rule is restored after
//! every change made through `U`:
//!
//! - adding an import statement attaches the imported graph;
//! - deleting it detaches the graph;
//! - attaching a sub-graph asserts the import statement;
//! - detaching it retracts the statement.
//!
//! Imports missing from the repository are replaced by empty placeholder
//! ontologies when [`ImportsConfig::ignore_unresolved_imports`] is set, and
//! rejected with [`OntError::UnresolvedImport`] otherwise.
//!
//! Editing the header or `owl:versionIRI` of a managed ontology renames it:
//! the repository entry moves to the new name. Ontologies imported by another
//! managed ontology cannot be renamed; such edits fail with
//! [`OntError::IllegalArgument`] and leave the graph unchanged.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::config::ImportsConfig;
use crate::error::{OntError, Result};
use crate::graph::events::{listeners_of, EventManager, GraphEvent, Listener};
use crate::graph::hierarchy::flat_hierarchy;
use crate::graph::{describe, graph_key, same_graph, Graph, GraphMem, GraphRef, UnionGraph};
use crate::naming::{ontology_headers, HeaderNaming, OntologyNaming};
use crate::node::{Node, Pattern, Triple};
use crate::repository::GraphRepository;
use crate::vocab;

/// Wraps a plain graph into a union graph.
pub type WrapFn = Box<dyn Fn(GraphRef) -> Rc<UnionGraph>>;

/// Creates the base graph of a placeholder ontology with the given name.
pub type PlaceholderFn = Box<dyn Fn(&Node) -> Result<GraphRef>>;

/// Bridge between a [`GraphRepository`] and the union graphs stored in it.
///
/// Cloning is cheap and yields a handle to the same bridge.
#[derive(Clone)]
pub struct UnionGraphRepository {
    inner: Rc<Inner>,
}

struct Inner {
    repository: Rc<dyn GraphRepository>,
    wrap: WrapFn,
    placeholder: PlaceholderFn,
    naming: Box<dyn OntologyNaming>,
    config: ImportsConfig,
    // Unions whose sub-graphs are being reconciled. Listener calls caused by
    // the reconciliation itself are ignored for them.
    active: RefCell<HashSet<usize>>,
    // Name each union this bridge listens to is registered under.
    names: RefCell<HashMap<usize, String>>,
}

impl std::fmt::Debug for UnionGraphRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnionGraphRepository")
            .field("ids", &self.inner.repository.ids().collect::<Vec<_>>())
            .field("config", &self.inner.config)
            .finish()
    }
}

/// Builder for [`UnionGraphRepository`].
pub struct UnionGraphRepositoryBuilder {
    repository: Rc<dyn GraphRepository>,
    wrap: Option<WrapFn>,
    placeholder: Option<PlaceholderFn>,
    naming: Option<Box<dyn OntologyNaming>>,
    config: ImportsConfig,
}

impl UnionGraphRepositoryBuilder {
    /// How plain graphs are wrapped. Defaults to a union with its own event
    /// manager and the configured `distinct` flag.
    #[must_use]
    pub fn wrap(mut self, wrap: impl Fn(GraphRef) -> Rc<UnionGraph> + 'static) -> Self {
        self.wrap = Some(Box::new(wrap));
        self
    }

    /// How placeholder base graphs are created. Defaults to an in-memory graph
    /// holding only the ontology header.
    #[must_use]
    pub fn placeholder(mut self, placeholder: impl Fn(&Node) -> Result<GraphRef> + 'static) -> Self {
        self.placeholder = Some(Box::new(placeholder));
        self
    }

    /// The naming strategy. Defaults to [`HeaderNaming`].
    #[must_use]
    pub fn naming(mut self, naming: impl OntologyNaming + 'static) -> Self {
        self.naming = Some(Box::new(naming));
        self
    }

    /// Import resolution settings.
    #[must_use]
    pub fn config(mut self, config: ImportsConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the bridge.
    #[must_use]
    pub fn build(self) -> UnionGraphRepository {
        let distinct = self.config.distinct;
        UnionGraphRepository {
            inner: Rc::new(Inner {
                repository: self.repository,
                wrap: self.wrap.unwrap_or_else(|| {
                    Box::new(move |g| UnionGraph::with_options(g, distinct, Rc::new(EventManager::new())))
                }),
                placeholder: self.placeholder.unwrap_or_else(|| Box::new(placeholder_graph)),
                naming: self.naming.unwrap_or_else(|| Box::new(HeaderNaming)),
                config: self.config,
                active: RefCell::new(HashSet::new()),
                names: RefCell::new(HashMap::new()),
            }),
        }
    }
}

/// An in-memory graph holding only the header `<name> rdf:type owl:Ontology`.
///
/// # Errors
///
/// This function is infallible; the `Result` matches [`PlaceholderFn`].
pub fn placeholder_graph(name: &Node) -> Result<GraphRef> {
    let graph = GraphMem::with_standard_prefixes();
    graph.insert(Triple::ontology_header(name.clone()));
    Ok(Rc::new(graph))
}

impl UnionGraphRepository {
    /// A bridge with default wrapping, placeholders and naming.
    #[must_use]
    pub fn new(repository: Rc<dyn GraphRepository>, config: ImportsConfig) -> Self {
        Self::builder(repository).config(config).build()
    }

    /// Starts a builder over `repository`.
    #[must_use]
    pub fn builder(repository: Rc<dyn GraphRepository>) -> UnionGraphRepositoryBuilder {
        UnionGraphRepositoryBuilder {
            repository,
            wrap: None,
            placeholder: None,
            naming: None,
            config: ImportsConfig::default(),
        }
    }

    /// The backing repository.
    #[must_use]
    pub fn repository(&self) -> &Rc<dyn GraphRepository> {
        &self.inner.repository
    }

    /// Import resolution settings.
    #[must_use]
    pub fn config(&self) -> ImportsConfig {
        self.inner.config
    }

    /// The naming strategy.
    #[must_use]
    pub fn naming(&self) -> &dyn OntologyNaming {
        &*self.inner.naming
    }

    /// Registers `graph` and wires its import closure.
    ///
    /// A plain graph gets an ontology header if it has none, is wrapped
    /// into a union graph and stored under its name. Putting a graph whose
    /// name is already registered to a union over the same graph answers
    /// that union.
    ///
    /// A union graph is adopted together with the union graphs below it:
    /// their existing sub-graphs are kept and the matching import statements
    /// are added to their bases.
    ///
    /// # Errors
    ///
    /// [`OntError::UnresolvedImport`] in strict mode, checked before
    /// anything is registered. [`OntError::IllegalArgument`] if the name is
    /// registered to a different union graph.
    pub fn put(&self, graph: GraphRef) -> Result<Rc<UnionGraph>> {
        self.inner.put(&graph)
    }

    /// The managed union graph named `name`.
    ///
    /// A plain graph stored under the name is wrapped and wired first.
    ///
    /// # Errors
    ///
    /// Errors from wiring the import closure of a newly wrapped graph.
    pub fn get(&self, name: &Node) -> Result<Option<Rc<UnionGraph>>> {
        let id = name.to_id();
        match self.inner.repository.get(&id) {
            Some(graph) => self.inner.resolved(&id, graph).map(Some),
            None => Ok(None),
        }
    }

    /// Returns true if the backing repository holds a graph named `name`.
    #[must_use]
    pub fn contains(&self, name: &Node) -> bool {
        self.inner.repository.contains(&name.to_id())
    }

    /// Returns true if `union` is managed by a bridge over this bridge's
    /// repository.
    ///
    /// Bridges over the same repository share union graphs; the first one to
    /// manage a union keeps listening to it.
    #[must_use]
    pub fn is_managed(&self, union: &UnionGraph) -> bool {
        self.inner.is_managed(union)
    }

    /// Re-establishes the sub-graph/import correspondence of `union`.
    ///
    /// Needed after bulk edits made while its event manager was switched off.
    ///
    /// # Errors
    ///
    /// [`OntError::UnresolvedImport`] in strict mode.
    pub fn refresh(&self, union: &UnionGraph) -> Result<()> {
        self.inner.reconcile(union)
    }
}

/// What triggered a synchronization pass.
enum Change<'a> {
    Triples,
    SubGraphAdded(&'a GraphRef),
    SubGraphRemoved(&'a GraphRef),
}

/// A pending edit of a managed base graph.
enum Edit<'a> {
    Add(&'a Triple),
    Delete(&'a Triple),
    Clear,
}

/// Listener attached to every managed union graph.
pub struct ImportsListener {
    bridge: Rc<Inner>,
}

impl Listener for ImportsListener {
    fn on_add_triple(&self, graph: &UnionGraph, triple: &Triple) -> Result<()> {
        let inner = &self.bridge;
        if inner.is_active(graph) {
            return Ok(());
        }
        inner.check_rename(graph, &Edit::Add(triple))?;
        if inner.config.ignore_unresolved_imports || !triple.is_import() {
            return Ok(());
        }
        let base = graph.base_graph();
        if inner.naming.header(&**base).as_ref() != Some(&triple.s) {
            return Ok(());
        }
        let own = inner.name_of(base).unwrap_or_default();
        let known = HashMap::from([(own.clone(), base.clone())]);
        inner.check_closure(own, vec![triple.o.clone()], &known)
    }

    fn on_delete_triple(&self, graph: &UnionGraph, triple: &Triple) -> Result<()> {
        if self.bridge.is_active(graph) {
            return Ok(());
        }
        self.bridge.check_rename(graph, &Edit::Delete(triple))
    }

    fn on_clear(&self, graph: &UnionGraph) -> Result<()> {
        if self.bridge.is_active(graph) {
            return Ok(());
        }
        self.bridge.check_rename(graph, &Edit::Clear)
    }

    fn on_add_sub_graph(&self, graph: &UnionGraph, sub_graph: &GraphRef) -> Result<()> {
        let inner = &self.bridge;
        if inner.is_active(graph) {
            return Ok(());
        }
        let Some(child) = sub_graph.as_union() else {
            return Err(OntError::IllegalArgument(format!(
                "{} is not a union graph and cannot be imported",
                describe(&**sub_graph)
            )));
        };
        let Some(id) = inner.name_of(child.base_graph()) else {
            return Err(OntError::IllegalArgument(format!(
                "{} has no ontology header and cannot be imported",
                describe(&**sub_graph)
            )));
        };
        inner.check_registration(&id, child)?;
        inner.check_hierarchy(child)
    }

    fn notify_sub_graph_added(&self, graph: &UnionGraph, sub_graph: &GraphRef) -> Result<()> {
        self.bridge.synchronize(graph, Change::SubGraphAdded(sub_graph))
    }

    fn notify_sub_graph_removed(&self, graph: &UnionGraph, sub_graph: &GraphRef) -> Result<()> {
        self.bridge.synchronize(graph, Change::SubGraphRemoved(sub_graph))
    }

    fn notify_event(&self, graph: &UnionGraph, event: &GraphEvent) -> Result<()> {
        let relevant = match event {
            GraphEvent::TripleAdded(t) | GraphEvent::TripleDeleted(t) => {
                t.is_import() || t.is_ontology_header() || t.p.is(vocab::OWL_VERSION_IRI)
            }
            GraphEvent::Cleared => true,
        };
        if relevant {
            self.bridge.synchronize(graph, Change::Triples)
        } else {
            Ok(())
        }
    }
}

fn conflict(id: &str, existing: &dyn Graph) -> OntError {
    OntError::IllegalArgument(format!(
        "ontology <{id}> is already registered as {}",
        describe(existing)
    ))
}

fn base_of(graph: &GraphRef) -> GraphRef {
    match graph.as_union() {
        Some(union) => union.base_graph().clone(),
        None => graph.clone(),
    }
}

impl Inner {
    fn name_of(&self, base: &GraphRef) -> Option<String> {
        self.naming.find_name(&**base).map(|n| n.to_id())
    }

    fn is_active(&self, union: &UnionGraph) -> bool {
        self.active.borrow().contains(&graph_key(union))
    }

    fn is_managed(self: &Rc<Self>, union: &UnionGraph) -> bool {
        listeners_of::<ImportsListener>(union.event_manager())
            .iter()
            .any(|l| std::ptr::addr_eq(Rc::as_ptr(&l.bridge.repository), Rc::as_ptr(&self.repository)))
    }

    fn manage(self: &Rc<Self>, union: &UnionGraph, id: &str) {
        if !self.is_managed(union) {
            union
                .event_manager()
                .register(Rc::new(ImportsListener { bridge: self.clone() }));
            self.names.borrow_mut().insert(graph_key(union), id.to_owned());
        }
    }

    /// Fails if `id` is registered to a union graph other than `union`.
    fn check_registration(&self, id: &str, union: &UnionGraph) -> Result<()> {
        let Some(existing) = self.repository.get(id) else {
            return Ok(());
        };
        match existing.as_union() {
            Some(other) if !same_graph(other, union) => Err(conflict(id, &*existing)),
            _ => Ok(()),
        }
    }

    /// Fails if adopting the hierarchy below `root` would register two
    /// graphs under one name. Plain sub-graphs count with the union they
    /// will be wrapped into.
    fn check_adoption(&self, root: &Rc<UnionGraph>) -> Result<()> {
        let mut claimed: HashMap<String, usize> = HashMap::new();
        for union in flat_hierarchy(root) {
            let plain = union.sub_graphs().filter(|g| g.as_union().is_none());
            let candidates =
                std::iter::once((union.base_graph().clone(), true)).chain(plain.map(|g| (g, false)));
            for (base, is_base) in candidates {
                let Some(id) = self.name_of(&base) else {
                    continue;
                };
                let key = graph_key(&*base);
                if claimed.insert(id.clone(), key).is_some_and(|other| other != key) {
                    return Err(OntError::IllegalArgument(format!(
                        "ontology <{id}> is declared by two graphs of the hierarchy"
                    )));
                }
                let Some(existing) = self.repository.get(&id) else {
                    continue;
                };
                let fits = match existing.as_union() {
                    Some(other) if is_base => same_graph(other, &*union),
                    Some(other) => same_graph(&**other.base_graph(), &*base),
                    None => true,
                };
                if !fits {
                    return Err(conflict(&id, &*existing));
                }
            }
        }
        Ok(())
    }

    /// Rejects `edit` if it renames an ontology another managed ontology
    /// imports, or renames it to a name registered to another graph.
    fn check_rename(&self, union: &UnionGraph, edit: &Edit<'_>) -> Result<()> {
        let base = union.base_graph();
        let headers = ontology_headers(&**base);
        let header_edit = match edit {
            Edit::Add(t) | Edit::Delete(t) => {
                let present = base.contains_triple(t);
                let effective = matches!(edit, Edit::Add(_)) != present;
                let naming = t.is_ontology_header()
                    || (t.p.is(vocab::OWL_VERSION_IRI) && headers.contains(&t.s));
                if !effective || !naming {
                    return Ok(());
                }
                t.is_ontology_header()
            }
            Edit::Clear => {
                if headers.is_empty() {
                    return Ok(());
                }
                true
            }
        };
        let old = self.name_of(base);
        let new = self.prospective_name(base, &headers, edit);
        if old == new && !header_edit {
            return Ok(());
        }
        if let Some(old) = &old {
            if let Some(importer) = self.importer_of(union, old) {
                return Err(OntError::IllegalArgument(format!(
                    "ontology <{old}> is imported by <{importer}> and cannot be renamed"
                )));
            }
        }
        match new {
            Some(new) if old.as_ref() != Some(&new) => self.check_registration(&new, union),
            _ => Ok(()),
        }
    }

    /// The name `base` would have after `edit`.
    fn prospective_name(&self, base: &GraphRef, headers: &[Node], edit: &Edit<'_>) -> Option<String> {
        let (Edit::Add(triple) | Edit::Delete(triple)) = edit else {
            return None;
        };
        // statements about the headers are all a naming strategy reads
        let scratch = GraphMem::new();
        for subject in headers.iter().chain(std::iter::once(&triple.s)) {
            for t in base.find(&Pattern::new(Some(subject.clone()), None, None)) {
                scratch.insert(t);
            }
        }
        if matches!(edit, Edit::Add(_)) {
            scratch.insert(Triple::clone(triple));
        } else {
            scratch.remove(triple);
        }
        self.naming.find_name(&scratch).map(|n| n.to_id())
    }

    /// A managed super-graph of `union` importing `name`, by its own name.
    fn importer_of(&self, union: &UnionGraph, name: &str) -> Option<String> {
        union.super_graphs().find_map(|importer| {
            let base = importer.base_graph();
            self.naming
                .imports(&**base)
                .iter()
                .any(|n| n.to_id() == name)
                .then(|| self.name_of(base).unwrap_or_else(|| describe(&*importer)))
        })
    }

    /// Moves the repository entry of `union` to its current name.
    fn rekey(&self, union: &UnionGraph) -> Result<()> {
        let key = graph_key(union);
        let Some(old) = self.names.borrow().get(&key).cloned() else {
            return Ok(());
        };
        let (Some(new), Some(this)) = (self.name_of(union.base_graph()), union.to_rc()) else {
            return Ok(());
        };
        if new == old {
            return Ok(());
        }
        self.check_registration(&new, union)?;
        if self.repository.get(&old).is_some_and(|g| same_graph(&*g, union)) {
            self.repository.remove(&old);
        }
        self.repository.put(&new, this);
        self.names.borrow_mut().insert(key, new.clone());
        debug!(from = %old, to = %new, "renamed ontology graph");
        Ok(())
    }

    /// In strict mode, fails unless every import reachable from `union`'s
    /// hierarchy resolves. Names declared inside the hierarchy count as
    /// resolved.
    fn check_hierarchy(&self, union: &UnionGraph) -> Result<()> {
        if self.config.ignore_unresolved_imports {
            return Ok(());
        }
        let Some(root) = union.to_rc() else {
            return Ok(());
        };
        let hierarchy = flat_hierarchy(&root);
        let mut known = HashMap::new();
        for u in &hierarchy {
            if let Some(id) = self.name_of(u.base_graph()) {
                known.entry(id).or_insert_with(|| u.base_graph().clone());
            }
        }
        for u in &hierarchy {
            let base = u.base_graph();
            let own = self.name_of(base).unwrap_or_default();
            self.check_closure(own, self.naming.imports(&**base), &known)?;
        }
        Ok(())
    }

    /// In strict mode, walks the import closure starting from `imports` of
    /// `ontology` and fails at the first name found neither in `known` nor in
    /// the repository.
    fn check_closure(
        &self,
        ontology: String,
        imports: Vec<Node>,
        known: &HashMap<String, GraphRef>,
    ) -> Result<()> {
        if self.config.ignore_unresolved_imports {
            return Ok(());
        }
        let mut seen = HashSet::from([ontology.clone()]);
        let mut queue = VecDeque::from([(ontology, imports)]);
        while let Some((ontology, imports)) = queue.pop_front() {
            for import in imports {
                let id = import.to_id();
                if !seen.insert(id.clone()) {
                    continue;
                }
                let target = known
                    .get(&id)
                    .cloned()
                    .or_else(|| self.repository.get(&id).map(|g| base_of(&g)));
                let Some(base) = target else {
                    return Err(OntError::UnresolvedImport {
                        ontology,
                        import: id,
                    });
                };
                let next = self.naming.imports(&*base);
                queue.push_back((id, next));
            }
        }
        Ok(())
    }

    fn put(self: &Rc<Self>, graph: &GraphRef) -> Result<Rc<UnionGraph>> {
        if let Some(union) = graph.as_union().and_then(UnionGraph::to_rc) {
            self.check_adoption(&union)?;
            self.check_hierarchy(&union)?;
            let mut adopted = Vec::new();
            self.adopt(&union, &mut HashSet::new(), &mut adopted)?;
            for u in &adopted {
                self.reconcile(u)?;
            }
            return Ok(union);
        }

        if let Some(id) = self.name_of(graph) {
            let known = HashMap::from([(id.clone(), graph.clone())]);
            self.check_closure(id, self.naming.imports(&**graph), &known)?;
        }
        let id = self.naming.ensure_name(&**graph)?.to_id();
        if let Some(existing) = self.repository.get(&id) {
            if let Some(union) = existing.as_union().and_then(UnionGraph::to_rc) {
                if !same_graph(&**union.base_graph(), &**graph) {
                    return Err(conflict(&id, &*existing));
                }
                self.manage(&union, &id);
                self.reconcile(&union)?;
                return Ok(union);
            }
        }
        let union = self.register(&id, graph.clone());
        self.reconcile(&union)?;
        Ok(union)
    }

    /// Wraps `graph` and stores the union under `id`.
    fn register(self: &Rc<Self>, id: &str, graph: GraphRef) -> Rc<UnionGraph> {
        let union = (self.wrap)(graph);
        self.repository.put(id, union.clone());
        self.manage(&union, id);
        debug!(id, graph = %describe(&*union), "registered ontology graph");
        union
    }

    /// Registers `union` and every union graph below it, keeping existing
    /// sub-graphs and asserting the import statements they stand for.
    fn adopt(
        self: &Rc<Self>,
        union: &Rc<UnionGraph>,
        seen: &mut HashSet<usize>,
        adopted: &mut Vec<Rc<UnionGraph>>,
    ) -> Result<()> {
        if !seen.insert(graph_key(&**union)) {
            return Ok(());
        }
        let base = union.base_graph().clone();
        let id = self.naming.ensure_name(&*base)?.to_id();
        self.check_registration(&id, union)?;
        self.repository.put(&id, union.clone());
        self.manage(union, &id);
        adopted.push(union.clone());
        debug!(id, graph = %describe(&**union), "adopted ontology graph");

        let key = graph_key(&**union);
        self.active.borrow_mut().insert(key);
        let result = self.adopt_sub_graphs(union, &base, seen, adopted);
        self.active.borrow_mut().remove(&key);
        result
    }

    fn adopt_sub_graphs(
        self: &Rc<Self>,
        union: &Rc<UnionGraph>,
        base: &GraphRef,
        seen: &mut HashSet<usize>,
        adopted: &mut Vec<Rc<UnionGraph>>,
    ) -> Result<()> {
        let header = self.naming.ensure_name(&**base).and_then(|_| {
            self.naming
                .header(&**base)
                .ok_or_else(|| OntError::IllegalArgument(describe(&**base)))
        })?;
        for sub in union.sub_graphs() {
            let child = match sub.as_union().and_then(UnionGraph::to_rc) {
                Some(child) => child,
                None => {
                    // plain sub-graphs become union graphs of their own
                    let wrapped = match self.registered_union(&sub)? {
                        Some(existing) => existing,
                        None => (self.wrap)(sub.clone()),
                    };
                    union.remove_sub_graph(&sub)?;
                    union.add_sub_graph_if_absent(wrapped.clone())?;
                    wrapped
                }
            };
            self.adopt(&child, seen, adopted)?;
            if let Some(name) = self.naming.find_name(&**child.base_graph()) {
                let triple = Triple::imports(header.clone(), name);
                if !base.contains_triple(&triple) {
                    base.add(triple)?;
                }
            }
        }
        Ok(())
    }

    /// The union already registered over the plain graph `graph`, if any.
    fn registered_union(&self, graph: &GraphRef) -> Result<Option<Rc<UnionGraph>>> {
        let id = self.naming.ensure_name(&**graph)?.to_id();
        Ok(self
            .repository
            .get(&id)
            .and_then(|g| g.as_union().and_then(UnionGraph::to_rc))
            .filter(|u| same_graph(&**u.base_graph(), &**graph)))
    }

    /// The managed union for an import resolved to `graph` under `id`.
    fn resolved(self: &Rc<Self>, id: &str, graph: GraphRef) -> Result<Rc<UnionGraph>> {
        if let Some(union) = graph.as_union().and_then(UnionGraph::to_rc) {
            if !self.is_managed(&union) {
                self.manage(&union, id);
                self.reconcile(&union)?;
            }
            return Ok(union);
        }
        let union = self.register(id, graph);
        self.reconcile(&union)?;
        Ok(union)
    }

    fn resolve(self: &Rc<Self>, import: &Node, ontology: &str) -> Result<Rc<UnionGraph>> {
        let id = import.to_id();
        if let Some(graph) = self.repository.get(&id) {
            return self.resolved(&id, graph);
        }
        if !self.config.ignore_unresolved_imports {
            return Err(OntError::UnresolvedImport {
                ontology: ontology.to_owned(),
                import: id,
            });
        }
        warn!(ontology, import = %id, "unresolved import replaced by an empty ontology");
        let placeholder = (self.placeholder)(import)?;
        Ok(self.register(&id, placeholder))
    }

    fn synchronize(self: &Rc<Self>, union: &UnionGraph, change: Change<'_>) -> Result<()> {
        if self.is_active(union) {
            return Ok(());
        }
        let base = union.base_graph();
        match change {
            Change::Triples => self.rekey(union)?,
            Change::SubGraphAdded(sub) => {
                if let Some(child) = sub.as_union().and_then(UnionGraph::to_rc) {
                    self.put(&(child.clone() as GraphRef))?;
                    self.naming.ensure_name(&**base)?;
                    let header = self.naming.header(&**base);
                    let name = self.naming.find_name(&**child.base_graph());
                    if let (Some(header), Some(name)) = (header, name) {
                        let triple = Triple::imports(header, name);
                        if !base.contains_triple(&triple) {
                            debug!(import = %triple.o, "asserting import for attached sub-graph");
                            base.add(triple)?;
                        }
                    }
                }
            }
            Change::SubGraphRemoved(sub) => {
                let name = sub
                    .as_union()
                    .and_then(|child| self.naming.find_name(&**child.base_graph()));
                if let (Some(header), Some(name)) = (self.naming.header(&**base), name) {
                    let still_imported = union.sub_graphs().any(|g| {
                        g.as_union()
                            .and_then(|u| self.naming.find_name(&**u.base_graph()))
                            .as_ref()
                            == Some(&name)
                    });
                    if !still_imported {
                        debug!(import = %name, "retracting import for detached sub-graph");
                        base.delete(&Triple::imports(header, name))?;
                    }
                }
            }
        }
        self.reconcile(union)
    }

    /// Makes the direct sub-graphs of `union` match its base's imports.
    fn reconcile(self: &Rc<Self>, union: &UnionGraph) -> Result<()> {
        let key = graph_key(union);
        if !self.active.borrow_mut().insert(key) {
            return Ok(());
        }
        let result = self.reconcile_now(union);
        self.active.borrow_mut().remove(&key);
        result
    }

    fn reconcile_now(self: &Rc<Self>, union: &UnionGraph) -> Result<()> {
        let base = union.base_graph();
        let ontology = self.name_of(base).unwrap_or_default();
        let imports = self.naming.imports(&**base);
        trace!(ontology = %ontology, imports = imports.len(), "synchronizing imports");

        let mut targets: Vec<GraphRef> = Vec::with_capacity(imports.len());
        for import in &imports {
            targets.push(self.resolve(import, &ontology)?);
        }
        for target in &targets {
            if !union.contains_graph(&**target) {
                debug!(ontology = %ontology, import = %describe(&**target), "attaching imported graph");
                union.add_sub_graph(target.clone())?;
            }
        }
        for sub in union.sub_graphs() {
            if !targets.iter().any(|t| same_graph(&**t, &*sub)) {
                debug!(ontology = %ontology, graph = %describe(&*sub), "detaching graph no longer imported");
                union.remove_sub_graph(&sub)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::graph::hierarchy::flat_hierarchy;
    use crate::repository::MemGraphRepository;

    fn ontology(name: &str, imports: &[&str]) -> GraphRef {
        let g = GraphMem::with_standard_prefixes();
        g.insert(Triple::ontology_header(Node::iri(name)));
        for import in imports {
            g.insert(Triple::imports(Node::iri(name), Node::iri(*import)));
        }
        Rc::new(g)
    }

    fn bridge(config: ImportsConfig) -> UnionGraphRepository {
        UnionGraphRepository::new(Rc::new(MemGraphRepository::new()), config)
    }

    #[test]
    fn put_is_idempotent() {
        let bridge = bridge(ImportsConfig::default());
        let a = ontology("urn:a", &[]);
        let first = bridge.put(a.clone()).unwrap();
        let second = bridge.put(a).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(first.event_manager().listeners().len(), 1);
        assert!(bridge.is_managed(&first));
    }

    #[test]
    fn imports_resolve_from_the_repository() {
        let bridge = bridge(ImportsConfig::default());
        bridge.repository().put("urn:b", ontology("urn:b", &["urn:c"]));
        bridge.repository().put("urn:c", ontology("urn:c", &[]));
        let a = bridge.put(ontology("urn:a", &["urn:b"])).unwrap();
        assert_eq!(flat_hierarchy(&a).len(), 3);
        let b = bridge.get(&Node::iri("urn:b")).unwrap().unwrap();
        assert!(a.contains_graph(&*b));
        assert!(bridge.is_managed(&b));
    }

    #[test]
    fn adding_an_import_triple_attaches_the_graph() {
        let bridge = bridge(ImportsConfig::default());
        let a = bridge.put(ontology("urn:a", &[])).unwrap();
        let b = bridge.put(ontology("urn:b", &[])).unwrap();
        a.add(Triple::imports(Node::iri("urn:a"), Node::iri("urn:b"))).unwrap();
        assert!(a.contains_graph(&*b));
        a.delete(&Triple::imports(Node::iri("urn:a"), Node::iri("urn:b"))).unwrap();
        assert!(!a.contains_graph(&*b));
    }

    #[test]
    fn attaching_a_sub_graph_asserts_the_import() {
        let bridge = bridge(ImportsConfig::default());
        let a = bridge.put(ontology("urn:a", &[])).unwrap();
        let c = UnionGraph::new(ontology("urn:c", &[]));
        a.add_sub_graph(c.clone()).unwrap();
        let import = Triple::imports(Node::iri("urn:a"), Node::iri("urn:c"));
        assert!(a.base_graph().contains_triple(&import));
        assert!(bridge.contains(&Node::iri("urn:c")));
        assert!(bridge.is_managed(&c));

        a.remove_sub_graph(&(c as GraphRef)).unwrap();
        assert!(!a.base_graph().contains_triple(&import));
    }

    #[test]
    fn plain_or_anonymous_sub_graphs_are_rejected() {
        let bridge = bridge(ImportsConfig::default());
        let a = bridge.put(ontology("urn:a", &[])).unwrap();
        let plain = ontology("urn:p", &[]);
        assert!(matches!(a.add_sub_graph(plain), Err(OntError::IllegalArgument(_))));
        let anonymous = UnionGraph::new(Rc::new(GraphMem::new()));
        assert!(matches!(a.add_sub_graph(anonymous), Err(OntError::IllegalArgument(_))));
        assert!(!a.has_sub_graphs());
    }

    #[test]
    fn strict_mode_rejects_unresolved_import_triples() {
        let bridge = bridge(ImportsConfig::strict());
        let a = bridge.put(ontology("urn:a", &[])).unwrap();
        let import = Triple::imports(Node::iri("urn:a"), Node::iri("urn:missing"));
        let err = a.add(import.clone()).unwrap_err();
        assert!(matches!(err, OntError::UnresolvedImport { .. }));
        assert!(!a.base_graph().contains_triple(&import));
        assert!(!bridge.contains(&Node::iri("urn:missing")));
    }

    #[test]
    fn clearing_detaches_everything() {
        let bridge = bridge(ImportsConfig::default());
        let a = bridge.put(ontology("urn:a", &["urn:x", "urn:y"])).unwrap();
        assert_eq!(a.sub_graphs().count(), 2);
        a.clear().unwrap();
        assert!(!a.has_sub_graphs());
    }

    #[test]
    fn switched_off_events_need_a_refresh() {
        let bridge = bridge(ImportsConfig::default());
        let a = bridge.put(ontology("urn:a", &[])).unwrap();
        a.event_manager().off();
        a.add(Triple::imports(Node::iri("urn:a"), Node::iri("urn:b"))).unwrap();
        assert!(!a.has_sub_graphs());
        a.event_manager().on();
        bridge.refresh(&a).unwrap();
        assert_eq!(a.sub_graphs().count(), 1);
    }
}
