//! Error type shared by every graph, repository and assembly operation.

use std::path::PathBuf;

/// Errors raised by the ontology graph layer.
///
/// Lookups through the lenient [`GraphRepository`](crate::repository::GraphRepository)
/// never produce [`OntError::NotFound`]; they answer `None` instead. The strict
/// [`GraphMaker`](crate::repository::GraphMaker) reports misses and collisions
/// through this type.
#[derive(Debug, thiserror::Error)]
pub enum OntError {
    /// A graph maker already owns a graph with this name.
    #[error("graph name already exists: {0}")]
    AlreadyExists(String),

    /// A graph maker has no graph with this name.
    #[error("graph name not found: {0}")]
    NotFound(String),

    /// A reasoner would be bound over a graph that already carries entailments.
    #[error("graph is already inference-bound: {0}")]
    InferenceBound(String),

    /// An `owl:imports` target could not be found in the repository.
    #[error("unresolved import <{import}> in ontology <{ontology}>")]
    UnresolvedImport {
        /// Name of the importing ontology.
        ontology: String,
        /// Name of the missing imported ontology.
        import: String,
    },

    /// A structural edit was rejected by a graph or one of its listeners.
    #[error("illegal argument: {0}")]
    IllegalArgument(String),

    /// The graph maker has been closed.
    #[error("graph maker is closed: {0}")]
    Closed(String),

    /// Reading or writing a graph document failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A graph document could not be parsed.
    #[error("failed to parse {location}: {message}")]
    Parse {
        /// Document path or other description of the input.
        location: String,
        /// Parser message.
        message: String,
    },
}

impl OntError {
    /// Wraps an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true if this is the strict-API miss error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = OntError> = std::result::Result<T, E>;
