//! RDF terms, triples and match patterns.

use std::fmt;

use crate::vocab;

/// A literal value: lexical form plus datatype, optionally language-tagged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    lexical: String,
    datatype: String,
    language: Option<String>,
}

impl Literal {
    /// Creates a typed literal.
    pub fn typed(lexical: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: datatype.into(),
            language: None,
        }
    }

    /// Creates an `xsd:string` literal.
    pub fn string(lexical: impl Into<String>) -> Self {
        Self::typed(lexical, vocab::XSD_STRING)
    }

    /// Creates a language-tagged string.
    pub fn lang(lexical: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: vocab::RDF_LANG_STRING.to_owned(),
            language: Some(language.into()),
        }
    }

    /// The lexical form.
    #[must_use]
    pub fn lexical(&self) -> &str {
        &self.lexical
    }

    /// The datatype IRI.
    #[must_use]
    pub fn datatype(&self) -> &str {
        &self.datatype
    }

    /// The language tag, if any.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}

/// An RDF term.
///
/// Ordering puts IRIs before blank nodes before literals, which the naming
/// strategy relies on when it has to pick between several ontology headers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Node {
    /// An absolute IRI.
    Iri(String),
    /// A blank node, identified by its label.
    Blank(String),
    /// A literal.
    Literal(Literal),
}

impl Node {
    /// Creates an IRI node.
    pub fn iri(iri: impl Into<String>) -> Self {
        Self::Iri(iri.into())
    }

    /// Creates a blank node with the given label.
    pub fn blank(label: impl Into<String>) -> Self {
        Self::Blank(label.into())
    }

    /// Creates a blank node with a fresh, globally unique label.
    #[must_use]
    pub fn fresh_blank() -> Self {
        Self::Blank(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Creates a literal node.
    #[must_use]
    pub fn literal(literal: Literal) -> Self {
        Self::Literal(literal)
    }

    /// Parses a repository id back into a node: `_:label` is a blank node,
    /// anything else an IRI.
    #[must_use]
    pub fn from_id(id: &str) -> Self {
        match id.strip_prefix("_:") {
            Some(label) => Self::blank(label),
            None => Self::iri(id),
        }
    }

    /// Returns the key under which a graph named by this node is registered
    /// in a repository: the bare IRI, or `_:label` for blank nodes.
    #[must_use]
    pub fn to_id(&self) -> String {
        match self {
            Self::Iri(iri) => iri.clone(),
            Self::Blank(label) => format!("_:{label}"),
            Self::Literal(lit) => lit.lexical.clone(),
        }
    }

    /// Returns true for IRI nodes.
    #[must_use]
    pub fn is_iri(&self) -> bool {
        matches!(self, Self::Iri(_))
    }

    /// Returns true for blank nodes.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Blank(_))
    }

    /// Returns true for literals.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    /// Returns the IRI string of an IRI node.
    #[must_use]
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Self::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// Returns true if this node is the IRI `iri`.
    #[must_use]
    pub fn is(&self, iri: &str) -> bool {
        self.as_iri() == Some(iri)
    }
}

/// Writes the node in N-Triples syntax.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(iri) => write!(f, "<{iri}>"),
            Self::Blank(label) => write!(f, "_:{label}"),
            Self::Literal(lit) => {
                write!(f, "\"{}\"", escape_literal(&lit.lexical))?;
                match &lit.language {
                    Some(lang) => write!(f, "@{lang}"),
                    None if lit.datatype == vocab::XSD_STRING => Ok(()),
                    None => write!(f, "^^<{}>", lit.datatype),
                }
            }
        }
    }
}

pub(crate) fn escape_literal(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

/// A subject-predicate-object statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triple {
    /// Subject.
    pub s: Node,
    /// Predicate.
    pub p: Node,
    /// Object.
    pub o: Node,
}

impl Triple {
    /// Creates a triple.
    #[must_use]
    pub fn new(s: Node, p: Node, o: Node) -> Self {
        Self { s, p, o }
    }

    /// `<ontology> rdf:type owl:Ontology`.
    #[must_use]
    pub fn ontology_header(ontology: Node) -> Self {
        Self::new(
            ontology,
            Node::iri(vocab::RDF_TYPE),
            Node::iri(vocab::OWL_ONTOLOGY),
        )
    }

    /// `<ontology> owl:imports <import>`.
    #[must_use]
    pub fn imports(ontology: Node, import: Node) -> Self {
        Self::new(ontology, Node::iri(vocab::OWL_IMPORTS), import)
    }

    /// Returns true if this is an `owl:imports` statement.
    #[must_use]
    pub fn is_import(&self) -> bool {
        self.p.is(vocab::OWL_IMPORTS)
    }

    /// Returns true if this is an `rdf:type owl:Ontology` statement.
    #[must_use]
    pub fn is_ontology_header(&self) -> bool {
        self.p.is(vocab::RDF_TYPE) && self.o.is(vocab::OWL_ONTOLOGY)
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.s, self.p, self.o)
    }
}

/// A triple pattern; `None` positions match any node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Pattern {
    /// Subject constraint.
    pub s: Option<Node>,
    /// Predicate constraint.
    pub p: Option<Node>,
    /// Object constraint.
    pub o: Option<Node>,
}

impl Pattern {
    /// Creates a pattern from optional positions.
    #[must_use]
    pub fn new(s: Option<Node>, p: Option<Node>, o: Option<Node>) -> Self {
        Self { s, p, o }
    }

    /// The pattern matching every triple.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Matches every triple with the given predicate.
    #[must_use]
    pub fn predicate(p: &str) -> Self {
        Self::new(None, Some(Node::iri(p)), None)
    }

    /// Returns true if `triple` satisfies this pattern.
    #[must_use]
    pub fn matches(&self, triple: &Triple) -> bool {
        fn ok(slot: &Option<Node>, node: &Node) -> bool {
            slot.as_ref().map_or(true, |n| n == node)
        }
        ok(&self.s, &triple.s) && ok(&self.p, &triple.p) && ok(&self.o, &triple.o)
    }
}

/// A fully bound pattern matching exactly one triple.
impl From<&Triple> for Pattern {
    fn from(t: &Triple) -> Self {
        Self::new(Some(t.s.clone()), Some(t.p.clone()), Some(t.o.clone()))
    }
}
