//! Turtle 1.1 serializer.
//!
//! Produces a Turtle document with the graph's prefix declarations followed
//! by one block per subject. Ontology headers are written first.

use std::collections::BTreeMap;

use crate::graph::{Graph, PrefixMapping};
use crate::node::{escape_literal, Node, Pattern, Triple};
use crate::vocab;

/// Serializes every triple visible in `graph` to a Turtle string.
///
/// # Errors
///
/// This function is infallible; it always returns a valid Turtle string.
#[must_use]
pub fn to_turtle(graph: &dyn Graph) -> String {
    let prefixes = graph.prefixes();
    let mut out = String::with_capacity(4 * 1024);

    let entries = prefixes.entries();
    let width = entries.iter().map(|(p, _)| p.len()).max().unwrap_or(0);
    for (prefix, ns) in &entries {
        let pad = " ".repeat(width - prefix.len());
        out.push_str(&format!("@prefix {prefix}:{pad} <{ns}> .\n"));
    }
    if !entries.is_empty() {
        out.push('\n');
    }

    let mut by_subject: BTreeMap<Node, Vec<Triple>> = BTreeMap::new();
    for triple in graph.find(&Pattern::any()) {
        by_subject.entry(triple.s.clone()).or_default().push(triple);
    }
    let (headers, others): (Vec<_>, Vec<_>) = by_subject
        .into_iter()
        .partition(|(_, triples)| triples.iter().any(Triple::is_ontology_header));

    for (subject, mut triples) in headers.into_iter().chain(others) {
        triples.sort();
        triples.dedup();
        out.push_str(&term(&subject, prefixes));
        let mut previous: Option<&Node> = None;
        for triple in &triples {
            if previous == Some(&triple.p) {
                out.push_str(" ,\n    ");
            } else {
                if previous.is_some() {
                    out.push_str(" ;");
                }
                out.push_str("\n  ");
                out.push_str(&predicate(&triple.p, prefixes));
                out.push(' ');
            }
            out.push_str(&term(&triple.o, prefixes));
            previous = Some(&triple.p);
        }
        out.push_str(" .\n\n");
    }

    out
}

fn predicate(node: &Node, prefixes: &PrefixMapping) -> String {
    if node.is(vocab::RDF_TYPE) {
        "a".to_owned()
    } else {
        term(node, prefixes)
    }
}

fn term(node: &Node, prefixes: &PrefixMapping) -> String {
    match node {
        Node::Iri(iri) => prefixes
            .shorten(iri)
            .unwrap_or_else(|| format!("<{iri}>")),
        Node::Blank(label) => format!("_:{label}"),
        Node::Literal(lit) => {
            let lexical = format!("\"{}\"", escape_literal(lit.lexical()));
            match lit.language() {
                Some(lang) => format!("{lexical}@{lang}"),
                None if lit.datatype() == vocab::XSD_STRING => lexical,
                None => {
                    let datatype = prefixes
                        .shorten(lit.datatype())
                        .unwrap_or_else(|| format!("<{}>", lit.datatype()));
                    format!("{lexical}^^{datatype}")
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::graph::GraphMem;
    use crate::node::Literal;

    fn sample() -> GraphMem {
        let g = GraphMem::with_standard_prefixes();
        let o = Node::iri("http://ex.com/o");
        for t in [
            Triple::new(
                Node::iri("http://ex.com/A"),
                Node::iri(vocab::RDF_TYPE),
                Node::iri(vocab::OWL_CLASS),
            ),
            Triple::ontology_header(o.clone()),
            Triple::imports(o.clone(), Node::iri("http://ex.com/b")),
            Triple::imports(o, Node::iri("http://ex.com/c")),
            Triple::new(
                Node::iri("http://ex.com/A"),
                Node::iri("http://ex.com/size"),
                Node::literal(Literal::typed("3", format!("{}integer", vocab::XSD))),
            ),
        ] {
            g.insert(t);
        }
        g
    }

    #[test]
    fn produces_prefixes_and_header_first() {
        let ttl = to_turtle(&sample());
        assert!(ttl.starts_with("@prefix owl:"));
        let header = ttl.find("<http://ex.com/o>\n  a owl:Ontology").unwrap();
        let class = ttl.find("<http://ex.com/A>").unwrap();
        assert!(header < class);
    }

    #[test]
    fn repeated_predicates_become_object_lists() {
        let ttl = to_turtle(&sample());
        assert!(ttl.contains("owl:imports <http://ex.com/b> ,\n    <http://ex.com/c>"));
        assert!(ttl.contains("\"3\"^^xsd:integer"));
    }
}
