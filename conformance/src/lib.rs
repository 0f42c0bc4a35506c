//! Ontunion conformance suite.
//!
//! Validators that check an assembled ontology hierarchy, the repository it
//! is registered in, and document catalogs against the invariants the
//! `ontunion` crate maintains.
//!
//! # Conformance Scope
//!
//! | Validator | Checks |
//! |-----------|--------|
//! | `hierarchy` | one header per ontology, sub-graphs match `owl:imports`, placeholders, cycles |
//! | `repository` | entries are union graphs under their own name, none inference-bound |
//! | `documents` | catalog documents parse, declare a header, names are unique |
//!
//! # Entry Point
//!
//! ```no_run
//! use std::rc::Rc;
//! use ontunion::{create_model, GraphRepository, MemGraphRepository, OntSpecification};
//! use ontunion_conformance::run_all;
//!
//! let repository: Rc<dyn GraphRepository> = Rc::new(MemGraphRepository::new());
//! let model = create_model(None, &OntSpecification::owl2_dl_mem(), &repository)?;
//! let report = run_all(model.union_graph(), &*repository);
//! assert!(report.all_passed());
//! # Ok::<(), ontunion::OntError>(())
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod report;
pub mod tests;
pub mod validators;

use std::rc::Rc;

use ontunion::{GraphRepository, HeaderNaming, UnionGraph};

pub use report::{ConformanceReport, Severity, TestResult};

/// Runs the hierarchy and repository validators with the default naming
/// strategy and returns the aggregated report.
///
/// Validators are run in this order:
/// 1. Hierarchy below `root`
/// 2. Repository entries
pub fn run_all(root: &Rc<UnionGraph>, repository: &dyn GraphRepository) -> ConformanceReport {
    let mut report = ConformanceReport::new();

    // 1. Hierarchy
    report.extend(validators::hierarchy::validate(root, &HeaderNaming));

    // 2. Repository
    report.extend(validators::repository::validate(repository, &HeaderNaming));

    report
}
