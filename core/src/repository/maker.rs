//! Strict graph lifecycle management.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::debug;

use crate::error::{OntError, Result};
use crate::graph::{Graph, GraphMem, GraphRef, PrefixMapping, TripleIter};
use crate::node::{Pattern, Triple};
use crate::parser;
use crate::serializer::ntriples::to_ntriples;

/// Allocates, opens and removes named graphs.
///
/// Unlike a [`GraphRepository`](super::GraphRepository), misses and
/// collisions are errors.
pub trait GraphMaker {
    /// Creates and registers a new empty graph.
    ///
    /// # Errors
    ///
    /// [`OntError::AlreadyExists`] if `name` is taken, [`OntError::Closed`]
    /// after [`GraphMaker::close`], or a backend error.
    fn create_graph(&self, name: &str) -> Result<GraphRef>;

    /// Opens an existing graph.
    ///
    /// # Errors
    ///
    /// [`OntError::NotFound`] if there is no graph called `name`,
    /// [`OntError::Closed`] after [`GraphMaker::close`], or a backend error.
    fn open_graph(&self, name: &str) -> Result<GraphRef>;

    /// Detaches `name`. Handles to the graph stay usable.
    ///
    /// # Errors
    ///
    /// [`OntError::NotFound`] if there is no graph called `name`, or a
    /// backend error.
    fn remove_graph(&self, name: &str) -> Result<()>;

    /// Returns true if a graph called `name` exists.
    fn has_graph(&self, name: &str) -> bool;

    /// Names of all graphs, sorted.
    fn names(&self) -> Vec<String>;

    /// Releases backend resources; later create and open calls fail.
    ///
    /// # Errors
    ///
    /// Backend errors raised while flushing graphs.
    fn close(&self) -> Result<()>;

    /// Opens `name`, answering `None` instead of [`OntError::NotFound`].
    ///
    /// # Errors
    ///
    /// Errors other than the miss.
    fn get_graph_or_null(&self, name: &str) -> Result<Option<GraphRef>> {
        match self.open_graph(name) {
            Ok(graph) => Ok(Some(graph)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Opens every graph, skipping names that vanish meanwhile.
    ///
    /// # Errors
    ///
    /// Errors other than a miss.
    fn graphs(&self) -> Result<Vec<GraphRef>> {
        let mut out = Vec::new();
        for name in self.names() {
            if let Some(graph) = self.get_graph_or_null(&name)? {
                out.push(graph);
            }
        }
        Ok(out)
    }
}

/// Graph maker keeping every graph in memory.
#[derive(Debug, Default)]
pub struct MemGraphMaker {
    graphs: RefCell<BTreeMap<String, GraphRef>>,
    closed: Cell<bool>,
}

impl MemGraphMaker {
    /// Creates an empty maker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn check_open(&self) -> Result<()> {
        if self.closed.get() {
            return Err(OntError::Closed("memory".to_owned()));
        }
        Ok(())
    }
}

impl GraphMaker for MemGraphMaker {
    fn create_graph(&self, name: &str) -> Result<GraphRef> {
        self.check_open()?;
        let mut graphs = self.graphs.borrow_mut();
        if graphs.contains_key(name) {
            return Err(OntError::AlreadyExists(name.to_owned()));
        }
        let graph: GraphRef = Rc::new(GraphMem::with_standard_prefixes());
        graphs.insert(name.to_owned(), graph.clone());
        Ok(graph)
    }

    fn open_graph(&self, name: &str) -> Result<GraphRef> {
        self.check_open()?;
        self.graphs
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| OntError::NotFound(name.to_owned()))
    }

    fn remove_graph(&self, name: &str) -> Result<()> {
        self.graphs
            .borrow_mut()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| OntError::NotFound(name.to_owned()))
    }

    fn has_graph(&self, name: &str) -> bool {
        self.graphs.borrow().contains_key(name)
    }

    fn names(&self) -> Vec<String> {
        self.graphs.borrow().keys().cloned().collect()
    }

    fn close(&self) -> Result<()> {
        self.graphs.borrow_mut().clear();
        self.closed.set(true);
        Ok(())
    }
}

/// A graph loaded from, and saved back to, one N-Triples file.
#[derive(Debug)]
pub struct FileGraph {
    path: RefCell<PathBuf>,
    inner: GraphMem,
    dirty: Cell<bool>,
}

impl FileGraph {
    fn new(path: PathBuf, inner: GraphMem) -> Self {
        Self {
            path: RefCell::new(path),
            inner,
            dirty: Cell::new(false),
        }
    }

    /// The backing file. Moves when the graph is removed from its maker.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.path.borrow().clone()
    }

    /// Writes the graph to its file if it changed since the last flush.
    ///
    /// # Errors
    ///
    /// Returns [`OntError::Io`] if the file cannot be written.
    pub fn flush(&self) -> Result<()> {
        if !self.dirty.get() {
            return Ok(());
        }
        let path = self.path();
        std::fs::write(&path, to_ntriples(&self.inner)).map_err(|e| OntError::io(&path, e))?;
        self.dirty.set(false);
        Ok(())
    }
}

impl Graph for FileGraph {
    fn add(&self, triple: Triple) -> Result<()> {
        if self.inner.insert(triple) {
            self.dirty.set(true);
        }
        Ok(())
    }

    fn delete(&self, triple: &Triple) -> Result<()> {
        if self.inner.remove(triple) {
            self.dirty.set(true);
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if !self.inner.is_empty() {
            self.dirty.set(true);
        }
        self.inner.clear()
    }

    fn find(&self, pattern: &Pattern) -> TripleIter {
        self.inner.find(pattern)
    }

    fn contains(&self, pattern: &Pattern) -> bool {
        self.inner.contains(pattern)
    }

    fn contains_triple(&self, triple: &Triple) -> bool {
        self.inner.contains_triple(triple)
    }

    fn size(&self) -> usize {
        self.inner.size()
    }

    fn prefixes(&self) -> &PrefixMapping {
        self.inner.prefixes()
    }
}

/// Graph maker storing each graph as an N-Triples file in one directory.
///
/// File names are the percent-encoded graph names with an `.nt` extension.
/// Changes are written on [`FileGraphMaker::flush`] and on close.
///
/// Removing a graph moves its file below `.removed/` under a unique name, so
/// the data and any open handle outlive the name.
#[derive(Debug)]
pub struct FileGraphMaker {
    dir: PathBuf,
    open: RefCell<BTreeMap<String, Rc<FileGraph>>>,
    detached: RefCell<Vec<Rc<FileGraph>>>,
    closed: Cell<bool>,
}

const REMOVED_DIR: &str = ".removed";

impl FileGraphMaker {
    /// Uses `dir` as graph store, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`OntError::Io`] if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| OntError::io(&dir, e))?;
        Ok(Self {
            dir,
            open: RefCell::new(BTreeMap::new()),
            detached: RefCell::new(Vec::new()),
            closed: Cell::new(false),
        })
    }

    /// The store directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes every changed graph to disk, removed ones included.
    ///
    /// # Errors
    ///
    /// Returns the first write failure.
    pub fn flush(&self) -> Result<()> {
        let mut graphs: Vec<Rc<FileGraph>> = self.open.borrow().values().cloned().collect();
        graphs.extend(self.detached.borrow().iter().cloned());
        for graph in graphs {
            graph.flush()?;
        }
        Ok(())
    }

    fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.nt", urlencoding::encode(name)))
    }

    /// Where the data of a removed graph goes.
    fn tombstone_of(&self, name: &str) -> PathBuf {
        self.dir.join(REMOVED_DIR).join(format!(
            "{}.{}.nt",
            urlencoding::encode(name),
            uuid::Uuid::new_v4().simple()
        ))
    }

    fn check_open(&self) -> Result<()> {
        if self.closed.get() {
            return Err(OntError::Closed(self.dir.display().to_string()));
        }
        Ok(())
    }
}

impl GraphMaker for FileGraphMaker {
    fn create_graph(&self, name: &str) -> Result<GraphRef> {
        self.check_open()?;
        if self.has_graph(name) {
            return Err(OntError::AlreadyExists(name.to_owned()));
        }
        let path = self.path_of(name);
        std::fs::write(&path, "").map_err(|e| OntError::io(&path, e))?;
        debug!(name, path = %path.display(), "created graph file");
        let graph = Rc::new(FileGraph::new(path, GraphMem::with_standard_prefixes()));
        self.open.borrow_mut().insert(name.to_owned(), graph.clone());
        Ok(graph)
    }

    fn open_graph(&self, name: &str) -> Result<GraphRef> {
        self.check_open()?;
        if let Some(graph) = self.open.borrow().get(name) {
            return Ok(graph.clone());
        }
        let path = self.path_of(name);
        if !path.is_file() {
            return Err(OntError::NotFound(name.to_owned()));
        }
        let graph = Rc::new(FileGraph::new(path.clone(), parser::read_file(&path)?));
        self.open.borrow_mut().insert(name.to_owned(), graph.clone());
        Ok(graph)
    }

    fn remove_graph(&self, name: &str) -> Result<()> {
        if !self.has_graph(name) {
            return Err(OntError::NotFound(name.to_owned()));
        }
        let path = self.path_of(name);
        let tombstone = self.tombstone_of(name);
        if path.is_file() {
            let removed = self.dir.join(REMOVED_DIR);
            std::fs::create_dir_all(&removed).map_err(|e| OntError::io(&removed, e))?;
            std::fs::rename(&path, &tombstone).map_err(|e| OntError::io(&path, e))?;
        }
        if let Some(graph) = self.open.borrow_mut().remove(name) {
            graph.path.replace(tombstone.clone());
            self.detached.borrow_mut().push(graph);
        }
        debug!(name, tombstone = %tombstone.display(), "detached graph file");
        Ok(())
    }

    fn has_graph(&self, name: &str) -> bool {
        self.open.borrow().contains_key(name) || self.path_of(name).is_file()
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.open.borrow().keys().cloned().collect();
        if let Ok(entries) = std::fs::read_dir(&self.dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("nt") {
                    continue;
                }
                if let Some(name) = path.file_stem().and_then(|s| s.to_str()).and_then(decode_name) {
                    names.push(name);
                }
            }
        }
        names.sort();
        names.dedup();
        names
    }

    fn close(&self) -> Result<()> {
        if self.closed.replace(true) {
            return Ok(());
        }
        self.flush()?;
        self.open.borrow_mut().clear();
        self.detached.borrow_mut().clear();
        Ok(())
    }
}

fn decode_name(encoded: &str) -> Option<String> {
    urlencoding::decode(encoded).ok().map(|name| name.into_owned())
}
