//! Graph-of-graphs composition for OWL ontologies.
//!
//! An ontology and its `owl:imports` closure are represented as a hierarchy of
//! [`UnionGraph`]s: each union owns one base graph with the ontology's own
//! statements and references the union graphs of the ontologies it imports.
//! Hierarchies may be cyclic; every walk over them tracks visited graphs by
//! identity.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`graph`] | `Graph` trait, in-memory graphs, `UnionGraph`, listener protocol |
//! | [`repository`] | lenient `GraphRepository` and strict `GraphMaker` registries |
//! | [`imports`] | bridge keeping sub-graphs and `owl:imports` statements in step |
//! | [`factory`] | model assembly over a repository |
//! | [`naming`] | how ontology graphs are named |
//! | [`reasoner`] | reasoner seam and inference-bound graphs |
//! | [`parser`], [`serializer`] | Turtle and N-Triples input and output |
//! | [`config`] | import settings and the `ontunion.toml` format |
//!
//! # Entry Point
//!
//! ```
//! use std::rc::Rc;
//! use ontunion::{create_model, GraphRepository, MemGraphRepository, Node, OntSpecification};
//!
//! let repository: Rc<dyn GraphRepository> = Rc::new(MemGraphRepository::new());
//! let model = create_model(None, &OntSpecification::owl2_dl_mem(), &repository)?;
//! assert!(repository.contains(&model.id().map(|n| n.to_id()).unwrap_or_default()));
//! # Ok::<(), ontunion::OntError>(())
//! ```
//!
//! Everything here is single-threaded: graphs are shared through `Rc` and
//! mutated through `&self`.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod config;
pub mod error;
pub mod factory;
pub mod graph;
pub mod imports;
pub mod model;
pub mod naming;
pub mod node;
pub mod parser;
pub mod reasoner;
pub mod repository;
pub mod serializer;
pub mod specification;
pub mod vocab;

pub use config::{ImportsConfig, OntConfig};
pub use error::{OntError, Result};
pub use factory::{create_default_model, create_model, create_ont_graph, get_model_or_null, ModelFactory};
pub use graph::{EventManager, Graph, GraphEvent, GraphMem, GraphRef, Listener, UnionGraph};
pub use imports::UnionGraphRepository;
pub use model::OntModel;
pub use naming::{HeaderNaming, OntologyNaming};
pub use node::{Literal, Node, Pattern, Triple};
pub use repository::{
    DocumentGraphRepository, FileGraphMaker, GraphMaker, GraphRepository, MemGraphMaker,
    MemGraphRepository, PersistentGraphRepository,
};
pub use specification::{OntProfile, OntSpecification};
