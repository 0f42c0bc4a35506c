//! Model assembly: turning graphs into wired ontology models.
//!
//! The free functions use a tolerant [`ImportsConfig`], so dangling imports
//! become empty placeholder ontologies. [`ModelFactory`] runs the same
//! assembly with a caller-chosen configuration.

use std::rc::Rc;

use tracing::debug;

use crate::config::ImportsConfig;
use crate::error::{OntError, Result};
use crate::graph::hierarchy::has_inf_graph;
use crate::graph::{describe, Graph, GraphMem, GraphRef, UnionGraph};
use crate::imports::UnionGraphRepository;
use crate::model::OntModel;
use crate::node::{Node, Triple};
use crate::repository::GraphRepository;
use crate::specification::OntSpecification;

/// Assembles models with a fixed import configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelFactory {
    config: ImportsConfig,
}

impl ModelFactory {
    /// A factory using `config`.
    #[must_use]
    pub fn new(config: ImportsConfig) -> Self {
        Self { config }
    }

    /// The import configuration.
    #[must_use]
    pub fn config(&self) -> ImportsConfig {
        self.config
    }

    /// The bridge model assembly registers graphs through.
    ///
    /// Placeholders for unresolved imports are allocated through the
    /// repository's graph maker when it has one.
    #[must_use]
    pub fn bridge(&self, repository: &Rc<dyn GraphRepository>) -> UnionGraphRepository {
        let allocator = repository.clone();
        UnionGraphRepository::builder(repository.clone())
            .config(self.config)
            .placeholder(move |name| open_ont_graph(name, &*allocator))
            .build()
    }

    /// Builds a model over `graph` and its import closure.
    ///
    /// Without a graph a new anonymous ontology is created. A union graph is
    /// adopted with its existing hierarchy; a plain graph is wrapped. Every
    /// ontology in the closure ends up registered in `repository`.
    ///
    /// # Errors
    ///
    /// [`OntError::InferenceBound`] if `graph` or a graph below it already
    /// carries entailments; nothing is registered then. In strict mode,
    /// [`OntError::UnresolvedImport`], also before anything is registered.
    /// Graph maker errors when allocating the anonymous graph.
    pub fn create_model(
        &self,
        graph: Option<GraphRef>,
        spec: &OntSpecification,
        repository: &Rc<dyn GraphRepository>,
    ) -> Result<OntModel> {
        if let Some(graph) = &graph {
            if has_inf_graph(graph) {
                return Err(OntError::InferenceBound(describe(&**graph)));
            }
        }
        let graph = match graph {
            Some(graph) => graph,
            None => create_ont_graph(None, &**repository)?,
        };
        let union = self.bridge(repository).put(graph)?;
        debug!(graph = %describe(&*union), profile = %spec.profile(), "assembled ontology model");
        assemble(union, spec)
    }

    /// The model of the ontology registered as `name`, if there is one.
    ///
    /// # Errors
    ///
    /// Errors from wiring a plain registered graph, or from binding the
    /// reasoner.
    pub fn get_model_or_null(
        &self,
        name: &Node,
        spec: &OntSpecification,
        repository: &Rc<dyn GraphRepository>,
    ) -> Result<Option<OntModel>> {
        match self.bridge(repository).get(name)? {
            Some(union) => assemble(union, spec).map(Some),
            None => Ok(None),
        }
    }
}

/// [`ModelFactory::create_model`] with tolerant import resolution.
///
/// # Errors
///
/// As [`ModelFactory::create_model`].
pub fn create_model(
    graph: Option<GraphRef>,
    spec: &OntSpecification,
    repository: &Rc<dyn GraphRepository>,
) -> Result<OntModel> {
    ModelFactory::default().create_model(graph, spec, repository)
}

/// [`ModelFactory::get_model_or_null`] with tolerant import resolution.
///
/// # Errors
///
/// As [`ModelFactory::get_model_or_null`].
pub fn get_model_or_null(
    name: &Node,
    spec: &OntSpecification,
    repository: &Rc<dyn GraphRepository>,
) -> Result<Option<OntModel>> {
    ModelFactory::default().get_model_or_null(name, spec, repository)
}

/// A new ontology graph with the header `<name> rdf:type owl:Ontology`.
///
/// The graph is allocated through the repository's graph maker when it has
/// one, in memory otherwise. Without a name a fresh blank node is used.
///
/// # Errors
///
/// [`OntError::AlreadyExists`] if the graph maker already owns the name.
pub fn create_ont_graph(name: Option<&Node>, repository: &dyn GraphRepository) -> Result<GraphRef> {
    let name = name.cloned().unwrap_or_else(Node::fresh_blank);
    let graph: GraphRef = match repository.graph_maker() {
        Some(maker) => maker.create_graph(&name.to_id())?,
        None => Rc::new(GraphMem::with_standard_prefixes()),
    };
    graph.add(Triple::ontology_header(name))?;
    Ok(graph)
}

/// Like [`create_ont_graph`], but reuses a graph the maker already owns.
fn open_ont_graph(name: &Node, repository: &dyn GraphRepository) -> Result<GraphRef> {
    let Some(maker) = repository.graph_maker() else {
        return create_ont_graph(Some(name), repository);
    };
    let id = name.to_id();
    let graph = match maker.get_graph_or_null(&id)? {
        Some(graph) => graph,
        None => maker.create_graph(&id)?,
    };
    let header = Triple::ontology_header(name.clone());
    if !graph.contains_triple(&header) {
        graph.add(header)?;
    }
    Ok(graph)
}

/// A model over a new anonymous ontology that is not registered anywhere.
///
/// Imports are not resolved automatically; use [`OntModel::add_import`].
///
/// # Errors
///
/// Errors from binding the specification's reasoner.
pub fn create_default_model(spec: &OntSpecification) -> Result<OntModel> {
    let base = GraphMem::with_standard_prefixes();
    base.insert(Triple::ontology_header(Node::fresh_blank()));
    assemble(UnionGraph::new(Rc::new(base)), spec)
}

fn assemble(union: Rc<UnionGraph>, spec: &OntSpecification) -> Result<OntModel> {
    let graph: GraphRef = match spec.reasoner() {
        Some(factory) => factory.bind(union.clone())?,
        None => union.clone(),
    };
    Ok(OntModel::new(graph, union, spec.profile()))
}
