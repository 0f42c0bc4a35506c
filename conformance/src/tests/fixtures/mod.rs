//! Ontology document fixtures for conformance validation.
//!
//! Each constant holds a Turtle 1.1 document declaring one ontology. Together
//! they form small import networks: a chain, a cycle and a dangling import.

mod chain;
mod cycle;
mod dangling;

pub use chain::{CHAIN_BASE, CHAIN_TOP};
pub use cycle::{CYCLE_LEFT, CYCLE_RIGHT};
pub use dangling::DANGLING;
