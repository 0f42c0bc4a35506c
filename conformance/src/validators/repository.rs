//! Graph repository validator.
//!
//! Checks every repository entry:
//! - The entry is a union graph (plain entries have not been wired yet)
//! - The entry is registered under the name its base graph declares
//! - No entry is inference-bound

use ontunion::graph::hierarchy::has_inf_graph;
use ontunion::{GraphRepository, OntologyNaming};

use crate::report::{ConformanceReport, TestResult};

const VALIDATOR: &str = "repository";

/// Validates every entry of `repository`.
pub fn validate(repository: &dyn GraphRepository, naming: &dyn OntologyNaming) -> ConformanceReport {
    let mut report = ConformanceReport::new();

    for id in repository.ids() {
        let Some(graph) = repository.get(&id) else {
            report.push(TestResult::fail(VALIDATOR, "listed id cannot be fetched").about(&id));
            continue;
        };
        if has_inf_graph(&graph) {
            report.push(TestResult::fail(VALIDATOR, "entry is inference-bound").about(&id));
            continue;
        }
        let Some(union) = graph.as_union() else {
            report.push(TestResult::warn(VALIDATOR, "entry is not wrapped in a union graph").about(&id));
            continue;
        };
        match naming.find_name(&**union.base_graph()).map(|n| n.to_id()) {
            Some(name) if name == id => {
                report.push(TestResult::pass(VALIDATOR, "registered under its own name").about(&id));
            }
            Some(name) => report.push(
                TestResult::warn(VALIDATOR, "registered under a different name")
                    .about(&id)
                    .with_details(vec![format!("declared name: {name}")]),
            ),
            None => report.push(TestResult::fail(VALIDATOR, "entry has no ontology header").about(&id)),
        }
    }

    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use ontunion::reasoner::{ReasonerFactory, TransitiveReasonerFactory};
    use ontunion::{GraphMem, HeaderNaming, MemGraphRepository, Node, Triple, UnionGraph};

    fn base(name: &str) -> Rc<GraphMem> {
        let g = GraphMem::new();
        g.insert(Triple::ontology_header(Node::iri(name)));
        Rc::new(g)
    }

    #[test]
    fn entries_are_classified() {
        let repo = MemGraphRepository::new();
        repo.put("urn:a", UnionGraph::new(base("urn:a")));
        repo.put("urn:alias", UnionGraph::new(base("urn:b")));
        repo.put("urn:plain", base("urn:plain"));
        repo.put("urn:inf", TransitiveReasonerFactory.bind(base("urn:inf")).unwrap());

        let report = validate(&repo, &HeaderNaming);
        assert_eq!(report.results.len(), 4);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.warning_count(), 2);
        let failure = report.results.iter().find(|r| r.is_failure()).unwrap();
        assert_eq!(failure.subject.as_deref(), Some("urn:inf"));
    }
}
