//! Reading Turtle and N-Triples documents into in-memory graphs.

use std::path::Path;

use sophia_api::source::TripleSource;
use sophia_api::term::{Term, TermKind};
use sophia_api::triple::Triple as _;
use sophia_turtle::parser::{nt, turtle};

use crate::error::{OntError, Result};
use crate::graph::GraphMem;
use crate::node::{Literal, Node, Triple};

/// Concrete syntax of a graph document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    /// Turtle 1.1.
    Turtle,
    /// N-Triples.
    NTriples,
}

impl Syntax {
    /// Guesses the syntax from a file extension (`.ttl`, `.nt`).
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "ttl" | "turtle" => Some(Self::Turtle),
            "nt" | "ntriples" => Some(Self::NTriples),
            _ => None,
        }
    }
}

/// Parses `text` into a new graph carrying the standard prefixes.
///
/// `location` only names the input in error messages. Generalized triples
/// (literal subjects, variables) are skipped.
///
/// # Errors
///
/// Returns [`OntError::Parse`] on a syntax error.
pub fn parse_str(text: &str, syntax: Syntax, location: &str) -> Result<GraphMem> {
    let mut triples = Vec::new();
    let outcome = match syntax {
        Syntax::Turtle => turtle::parse_str(text)
            .for_each_triple(|t| triples.extend(convert(t.s(), t.p(), t.o())))
            .map_err(|e| e.to_string()),
        Syntax::NTriples => nt::parse_str(text)
            .for_each_triple(|t| triples.extend(convert(t.s(), t.p(), t.o())))
            .map_err(|e| e.to_string()),
    };
    outcome.map_err(|message| OntError::Parse {
        location: location.to_owned(),
        message,
    })?;
    let graph = GraphMem::with_standard_prefixes();
    for triple in triples {
        graph.insert(triple);
    }
    Ok(graph)
}

/// Reads and parses the document at `path`, choosing the syntax from its
/// extension and defaulting to Turtle.
///
/// # Errors
///
/// Returns [`OntError::Io`] if the file cannot be read and
/// [`OntError::Parse`] on a syntax error.
pub fn read_file(path: &Path) -> Result<GraphMem> {
    let text = std::fs::read_to_string(path).map_err(|e| OntError::io(path, e))?;
    let syntax = Syntax::from_path(path).unwrap_or(Syntax::Turtle);
    parse_str(&text, syntax, &path.display().to_string())
}

fn convert<T: Term>(s: T, p: T, o: T) -> Option<Triple> {
    Some(Triple::new(node(s)?, node(p)?, node(o)?))
}

fn node<T: Term>(term: T) -> Option<Node> {
    match term.kind() {
        TermKind::Iri => term.iri().map(|iri| Node::iri(iri.as_str())),
        TermKind::BlankNode => term.bnode_id().map(|id| Node::blank(id.as_str())),
        TermKind::Literal => {
            let lexical = term.lexical_form()?.to_string();
            let literal = match term.language_tag() {
                Some(tag) => Literal::lang(lexical, tag.as_str()),
                None => Literal::typed(lexical, term.datatype()?.as_str()),
            };
            Some(Node::literal(literal))
        }
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::naming::{HeaderNaming, OntologyNaming};
    use crate::node::Pattern;
    use crate::vocab;

    const TTL: &str = r#"
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
<http://ex.com/a> a owl:Ontology ;
    owl:imports <http://ex.com/b> .
<http://ex.com/A> a owl:Class ;
    rdfs:label "A"@en ;
    rdfs:comment "plain" .
[] a owl:Class .
"#;

    #[test]
    fn parses_turtle_into_nodes() {
        let g = parse_str(TTL, Syntax::Turtle, "inline").unwrap();
        assert_eq!(g.size(), 6);
        assert_eq!(HeaderNaming.find_name(&g), Some(Node::iri("http://ex.com/a")));
        let label = g
            .find(&Pattern::new(Some(Node::iri("http://ex.com/A")), None, None))
            .find_map(|t| match t.o {
                Node::Literal(lit) if lit.language().is_some() => Some(lit),
                _ => None,
            })
            .unwrap();
        assert_eq!(label.lexical(), "A");
        assert_eq!(label.language(), Some("en"));
        let comment = Literal::string("plain");
        assert!(g.contains(&Pattern::new(None, None, Some(Node::literal(comment)))));
        assert_eq!(
            g.find(&Pattern::predicate(vocab::RDF_TYPE))
                .filter(|t| t.s.is_blank())
                .count(),
            1
        );
    }

    #[test]
    fn parses_ntriples() {
        let nt = "<urn:a> <http://www.w3.org/2002/07/owl#imports> <urn:b> .\n";
        let g = parse_str(nt, Syntax::NTriples, "inline").unwrap();
        assert!(g.contains_triple(&Triple::imports(Node::iri("urn:a"), Node::iri("urn:b"))));
    }

    #[test]
    fn syntax_errors_name_the_location() {
        let err = parse_str("<urn:a> <urn:b> .", Syntax::Turtle, "broken.ttl").unwrap_err();
        assert!(err.to_string().contains("broken.ttl"), "{err}");
    }

    #[test]
    fn syntax_follows_extension() {
        assert_eq!(Syntax::from_path(Path::new("x.nt")), Some(Syntax::NTriples));
        assert_eq!(Syntax::from_path(Path::new("x.ttl")), Some(Syntax::Turtle));
        assert_eq!(Syntax::from_path(Path::new("x.owl")), None);
    }
}
