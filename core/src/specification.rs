//! Model specifications: an ontology profile plus an optional reasoner.

use std::fmt;
use std::rc::Rc;

use serde::Deserialize;

use crate::reasoner::{ReasonerFactory, TransitiveReasonerFactory};

/// The ontology language profile a model is interpreted under.
///
/// Carried through model assembly untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OntProfile {
    /// OWL 2 DL.
    #[default]
    Owl2Dl,
    /// OWL 2 EL.
    Owl2El,
    /// OWL 2 QL.
    Owl2Ql,
    /// OWL 2 RL.
    Owl2Rl,
    /// OWL 2 Full.
    Owl2Full,
    /// OWL 1 DL.
    Owl1Dl,
    /// OWL 1 Lite.
    Owl1Lite,
    /// RDF Schema.
    Rdfs,
}

impl OntProfile {
    /// Kebab-case identifier, as used in configuration files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owl2Dl => "owl2-dl",
            Self::Owl2El => "owl2-el",
            Self::Owl2Ql => "owl2-ql",
            Self::Owl2Rl => "owl2-rl",
            Self::Owl2Full => "owl2-full",
            Self::Owl1Dl => "owl1-dl",
            Self::Owl1Lite => "owl1-lite",
            Self::Rdfs => "rdfs",
        }
    }
}

impl fmt::Display for OntProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of model to build: profile and optional reasoner.
#[derive(Clone, Default)]
pub struct OntSpecification {
    profile: OntProfile,
    reasoner: Option<Rc<dyn ReasonerFactory>>,
}

impl fmt::Debug for OntSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OntSpecification")
            .field("profile", &self.profile)
            .field("reasoner", &self.reasoner.as_ref().map(|r| r.name().to_owned()))
            .finish()
    }
}

impl OntSpecification {
    /// A specification without reasoner.
    #[must_use]
    pub fn new(profile: OntProfile) -> Self {
        Self {
            profile,
            reasoner: None,
        }
    }

    /// Adds a reasoner factory.
    #[must_use]
    pub fn with_reasoner(mut self, reasoner: Rc<dyn ReasonerFactory>) -> Self {
        self.reasoner = Some(reasoner);
        self
    }

    /// OWL 2 DL, in memory, no inference.
    #[must_use]
    pub fn owl2_dl_mem() -> Self {
        Self::new(OntProfile::Owl2Dl)
    }

    /// OWL 2 DL, in memory, with transitive class and property hierarchies.
    #[must_use]
    pub fn owl2_dl_mem_trans_inf() -> Self {
        Self::owl2_dl_mem().with_reasoner(Rc::new(TransitiveReasonerFactory))
    }

    /// The profile.
    #[must_use]
    pub fn profile(&self) -> OntProfile {
        self.profile
    }

    /// The reasoner factory, if any.
    #[must_use]
    pub fn reasoner(&self) -> Option<&Rc<dyn ReasonerFactory>> {
        self.reasoner.as_ref()
    }
}
