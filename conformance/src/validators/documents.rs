//! Ontology document catalog validator.
//!
//! Checks every `.ttl`/`.nt` document below a catalog directory:
//! - The document parses
//! - It declares an ontology header
//! - No two documents declare the same ontology name

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ontunion::parser::{self, Syntax};
use ontunion::OntologyNaming;
use walkdir::WalkDir;

use crate::report::{ConformanceReport, TestResult};

const VALIDATOR: &str = "documents";

/// Validates the documents below `dir`.
///
/// # Errors
///
/// Returns an error if the directory cannot be walked.
pub fn validate(dir: &Path, naming: &dyn OntologyNaming) -> Result<ConformanceReport> {
    let mut report = ConformanceReport::new();
    let mut names: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walking {}", dir.display()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || Syntax::from_path(path).is_none() {
            continue;
        }
        let shown = path.display().to_string();
        match parser::read_file(path) {
            Err(e) => report.push(TestResult::fail(VALIDATOR, e.to_string()).about(&shown)),
            Ok(graph) => match naming.find_name(&graph) {
                Some(name) => {
                    report.push(TestResult::pass(VALIDATOR, format!("declares {name}")).about(&shown));
                    names.entry(name.to_id()).or_default().push(path.to_path_buf());
                }
                None => report.push(TestResult::fail(VALIDATOR, "no ontology header").about(&shown)),
            },
        }
    }

    for (name, paths) in names.into_iter().filter(|(_, p)| p.len() > 1) {
        report.push(
            TestResult::fail_with_details(
                VALIDATOR,
                "ontology declared by several documents",
                paths.iter().map(|p| p.display().to_string()).collect(),
            )
            .about(name),
        );
    }

    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tests::fixtures::{CHAIN_BASE, CHAIN_TOP};
    use ontunion::HeaderNaming;

    #[test]
    fn catalog_problems_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("base.ttl"), CHAIN_BASE).unwrap();
        std::fs::write(dir.path().join("copy.ttl"), CHAIN_BASE).unwrap();
        std::fs::write(dir.path().join("top.ttl"), CHAIN_TOP).unwrap();
        std::fs::write(dir.path().join("broken.ttl"), "<urn:a> <urn:b> .").unwrap();
        std::fs::write(dir.path().join("bare.nt"), "<urn:a> <urn:b> <urn:c> .\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let report = validate(dir.path(), &HeaderNaming).unwrap();
        assert_eq!(report.results.len(), 6);
        assert_eq!(report.failure_count(), 3);
        let duplicate = report.by_validator(VALIDATOR).last().unwrap();
        assert_eq!(duplicate.details.len(), 2);
    }
}
