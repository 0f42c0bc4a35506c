//! Writers for ontology graphs.
//!
//! Two formats are supported:
//! - **N-Triples** ([`ntriples`]): one statement per line, absolute IRIs; used
//!   for graph storage by [`FileGraphMaker`](crate::repository::FileGraphMaker)
//! - **Turtle** ([`turtle`]): prefix-aware, grouped by subject; used for human
//!   readable dumps

pub mod ntriples;
pub mod turtle;
