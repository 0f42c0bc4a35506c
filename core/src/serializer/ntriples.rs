//! N-Triples serializer.
//!
//! Output is sorted, so writing the same graph twice gives identical bytes,
//! which keeps stored graphs diff-friendly.

use crate::graph::Graph;
use crate::node::{Pattern, Triple};

/// Serializes every triple visible in `graph` to an N-Triples string.
///
/// # Errors
///
/// This function is infallible; it always returns a valid N-Triples string.
#[must_use]
pub fn to_ntriples(graph: &dyn Graph) -> String {
    let mut triples: Vec<Triple> = graph.find(&Pattern::any()).collect();
    triples.sort();
    triples.dedup();
    let mut out = String::with_capacity(triples.len() * 96);
    for triple in &triples {
        out.push_str(&triple.to_string());
        out.push('\n');
    }
    out
}
