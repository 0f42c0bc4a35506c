//! Repository of ontology documents loaded on first use.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, warn};
use walkdir::WalkDir;

use super::GraphRepository;
use crate::error::{OntError, Result};
use crate::graph::GraphRef;
use crate::naming::{HeaderNaming, OntologyNaming};
use crate::parser::{self, Syntax};

/// Maps ontology ids to document files and parses each file the first time
/// its id is looked up.
///
/// A document that fails to load is reported as a miss by
/// [`GraphRepository::get`]; use [`DocumentGraphRepository::load`] to see
/// the error.
#[derive(Debug, Default)]
pub struct DocumentGraphRepository {
    mappings: RefCell<BTreeMap<String, PathBuf>>,
    loaded: RefCell<BTreeMap<String, GraphRef>>,
}

impl DocumentGraphRepository {
    /// Creates a repository without mappings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a repository from every `.ttl` and `.nt` document below `dir`,
    /// keyed by the ontology name each document declares.
    ///
    /// Documents without a header or that fail to parse are skipped with a
    /// warning. When two documents declare the same name the first in path
    /// order wins.
    ///
    /// # Errors
    ///
    /// Returns [`OntError::Io`] if the directory cannot be walked.
    pub fn from_directory(dir: &Path) -> Result<Self> {
        let repo = Self::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                OntError::io(path, e.into())
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() || Syntax::from_path(path).is_none() {
                continue;
            }
            let graph = match parser::read_file(path) {
                Ok(graph) => graph,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable document");
                    continue;
                }
            };
            let Some(name) = HeaderNaming.find_name(&graph) else {
                warn!(path = %path.display(), "skipping document without ontology header");
                continue;
            };
            let id = name.to_id();
            if repo.mappings.borrow().contains_key(&id) {
                warn!(id, path = %path.display(), "ontology already mapped; skipping");
                continue;
            }
            debug!(id, path = %path.display(), "catalogued ontology document");
            repo.mappings.borrow_mut().insert(id.clone(), path.to_path_buf());
            repo.loaded.borrow_mut().insert(id, Rc::new(graph));
        }
        Ok(repo)
    }

    /// Maps `id` to the document at `path`, dropping any graph already
    /// loaded for `id`.
    pub fn add_mapping(&self, id: impl Into<String>, path: impl Into<PathBuf>) {
        let id = id.into();
        self.loaded.borrow_mut().remove(&id);
        self.mappings.borrow_mut().insert(id, path.into());
    }

    /// The document mapped to `id`.
    #[must_use]
    pub fn mapping(&self, id: &str) -> Option<PathBuf> {
        self.mappings.borrow().get(id).cloned()
    }

    /// Answers the graph for `id`, parsing its document if needed.
    ///
    /// # Errors
    ///
    /// Returns [`OntError::Io`] or [`OntError::Parse`] if the mapped
    /// document cannot be loaded.
    pub fn load(&self, id: &str) -> Result<Option<GraphRef>> {
        if let Some(graph) = self.loaded.borrow().get(id) {
            return Ok(Some(graph.clone()));
        }
        let Some(path) = self.mapping(id) else {
            return Ok(None);
        };
        let graph: GraphRef = Rc::new(parser::read_file(&path)?);
        debug!(id, path = %path.display(), "loaded ontology document");
        self.loaded.borrow_mut().insert(id.to_owned(), graph.clone());
        Ok(Some(graph))
    }
}

impl GraphRepository for DocumentGraphRepository {
    fn get(&self, id: &str) -> Option<GraphRef> {
        match self.load(id) {
            Ok(graph) => graph,
            Err(e) => {
                warn!(id, error = %e, "document could not be loaded");
                None
            }
        }
    }

    fn put(&self, id: &str, graph: GraphRef) -> Option<GraphRef> {
        self.loaded.borrow_mut().insert(id.to_owned(), graph)
    }

    fn remove(&self, id: &str) -> Option<GraphRef> {
        let prior = self.get(id);
        self.mappings.borrow_mut().remove(id);
        self.loaded.borrow_mut().remove(id);
        prior
    }

    fn clear(&self) {
        self.mappings.borrow_mut().clear();
        self.loaded.borrow_mut().clear();
    }

    fn ids(&self) -> Box<dyn Iterator<Item = String>> {
        let mut ids: Vec<String> = self.mappings.borrow().keys().cloned().collect();
        ids.extend(self.loaded.borrow().keys().cloned());
        ids.sort();
        ids.dedup();
        Box::new(ids.into_iter())
    }

    fn contains(&self, id: &str) -> bool {
        self.loaded.borrow().contains_key(id) || self.mappings.borrow().contains_key(id)
    }
}
