//! Configuration values passed explicitly into import resolution and model
//! assembly, and the TOML file format they are loaded from.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::Deserialize;

use crate::error::{OntError, Result};
use crate::reasoner::TransitiveReasonerFactory;
use crate::repository::DocumentGraphRepository;
use crate::specification::{OntProfile, OntSpecification};

/// How `owl:imports` are resolved into union graph hierarchies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportsConfig {
    /// Substitute an empty placeholder ontology for imports missing from the
    /// repository instead of failing.
    pub ignore_unresolved_imports: bool,
    /// Build union graphs whose `find` suppresses duplicate triples.
    pub distinct: bool,
}

impl Default for ImportsConfig {
    fn default() -> Self {
        Self {
            ignore_unresolved_imports: true,
            distinct: true,
        }
    }
}

impl ImportsConfig {
    /// Fails on unresolved imports.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            ignore_unresolved_imports: false,
            ..Self::default()
        }
    }
}

/// Reasoners selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReasonerKind {
    /// [`TransitiveReasoner`](crate::reasoner::TransitiveReasoner).
    Transitive,
}

/// Contents of an `ontunion.toml` file.
///
/// ```toml
/// profile = "owl2-dl"
/// reasoner = "transitive"
/// catalog_dir = "ontologies"
///
/// [imports]
/// ignore_unresolved_imports = false
///
/// [catalog]
/// "http://example.com/core" = "vendor/core.ttl"
/// ```
///
/// Relative paths are resolved against the directory of the file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OntConfig {
    /// Import resolution settings.
    pub imports: ImportsConfig,
    /// Ontology profile of built models.
    pub profile: OntProfile,
    /// Reasoner bound over built models.
    pub reasoner: Option<ReasonerKind>,
    /// Ontology id to document path.
    pub catalog: BTreeMap<String, PathBuf>,
    /// Directory scanned recursively for ontology documents.
    pub catalog_dir: Option<PathBuf>,
}

impl OntConfig {
    /// Parses TOML text; `location` names the input in errors.
    ///
    /// # Errors
    ///
    /// Returns [`OntError::Parse`] on invalid TOML or unknown keys.
    pub fn from_toml_str(text: &str, location: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| OntError::Parse {
            location: location.to_owned(),
            message: e.to_string(),
        })
    }

    /// Reads a configuration file, resolving relative paths against its
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`OntError::Io`] if the file cannot be read and
    /// [`OntError::Parse`] if it is invalid.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| OntError::io(path, e))?;
        let mut config = Self::from_toml_str(&text, &path.display().to_string())?;
        if let Some(dir) = path.parent() {
            config.rebase(dir);
        }
        Ok(config)
    }

    fn rebase(&mut self, dir: &Path) {
        for path in self.catalog.values_mut() {
            if path.is_relative() {
                *path = dir.join(&*path);
            }
        }
        if let Some(path) = self.catalog_dir.as_mut().filter(|p| p.is_relative()) {
            *path = dir.join(&*path);
        }
    }

    /// The model specification described by `profile` and `reasoner`.
    #[must_use]
    pub fn specification(&self) -> OntSpecification {
        let spec = OntSpecification::new(self.profile);
        match self.reasoner {
            Some(ReasonerKind::Transitive) => spec.with_reasoner(Rc::new(TransitiveReasonerFactory)),
            None => spec,
        }
    }

    /// A document repository holding the catalog directory's documents and
    /// the explicit catalog mappings, the latter taking precedence.
    ///
    /// # Errors
    ///
    /// Returns [`OntError::Io`] if the catalog directory cannot be walked.
    pub fn repository(&self) -> Result<DocumentGraphRepository> {
        let repo = match &self.catalog_dir {
            Some(dir) => DocumentGraphRepository::from_directory(dir)?,
            None => DocumentGraphRepository::new(),
        };
        for (id, path) in &self.catalog {
            repo.add_mapping(id.clone(), path.clone());
        }
        Ok(repo)
    }
}
