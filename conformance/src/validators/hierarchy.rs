//! Union graph hierarchy validator.
//!
//! Walks the flat hierarchy below a union graph and checks:
//! - Every base graph declares exactly one ontology header
//! - Direct sub-graphs equal the graphs named by the header's `owl:imports`
//! - Placeholder ontologies (header only) are reported
//! - Import cycles are reported

use std::collections::{BTreeSet, HashMap, HashSet};
use std::rc::Rc;

use ontunion::graph::hierarchy::flat_hierarchy;
use ontunion::graph::{graph_key, Graph};
use ontunion::naming::ontology_headers;
use ontunion::{OntologyNaming, UnionGraph};

use crate::report::{ConformanceReport, TestResult};

const VALIDATOR: &str = "hierarchy";

/// Validates the hierarchy below `root`.
pub fn validate(root: &Rc<UnionGraph>, naming: &dyn OntologyNaming) -> ConformanceReport {
    let mut report = ConformanceReport::new();
    let hierarchy = flat_hierarchy(root);

    for union in &hierarchy {
        let base = union.base_graph();
        let subject = naming
            .find_name(&**base)
            .map_or_else(|| format!("{union:?}"), |n| n.to_id());

        check_header(&**base, &subject, &mut report);
        check_imports(union, naming, &subject, &mut report);
        if is_placeholder(&**base) {
            report.push(
                TestResult::warn(VALIDATOR, "ontology is an empty placeholder").about(&subject),
            );
        }
    }

    check_cycles(&hierarchy, naming, &mut report);
    report
}

fn check_header(base: &dyn Graph, subject: &str, report: &mut ConformanceReport) {
    let headers = ontology_headers(base);
    let result = match headers.len() {
        0 => TestResult::fail(VALIDATOR, "base graph has no ontology header"),
        1 => TestResult::pass(VALIDATOR, "exactly one ontology header"),
        n => TestResult::warn(VALIDATOR, format!("{n} ontology headers")).with_details(
            headers.iter().map(ToString::to_string).collect(),
        ),
    };
    report.push(result.about(subject));
}

fn check_imports(
    union: &UnionGraph,
    naming: &dyn OntologyNaming,
    subject: &str,
    report: &mut ConformanceReport,
) {
    let declared: BTreeSet<String> = naming
        .imports(&**union.base_graph())
        .iter()
        .map(|n| n.to_id())
        .collect();

    let mut attached = BTreeSet::new();
    let mut details = Vec::new();
    for sub in union.sub_graphs() {
        match sub.as_union() {
            Some(child) => match naming.find_name(&**child.base_graph()) {
                Some(name) => {
                    attached.insert(name.to_id());
                }
                None => details.push(format!("anonymous sub-graph {sub:?}")),
            },
            None => details.push(format!("plain sub-graph {sub:?}")),
        }
    }
    details.extend(
        declared
            .difference(&attached)
            .map(|id| format!("imported but not attached: {id}")),
    );
    details.extend(
        attached
            .difference(&declared)
            .map(|id| format!("attached but not imported: {id}")),
    );

    let result = if details.is_empty() {
        TestResult::pass(VALIDATOR, format!("{} imports attached", declared.len()))
    } else {
        TestResult::fail_with_details(VALIDATOR, "sub-graphs and owl:imports disagree", details)
    };
    report.push(result.about(subject));
}

/// A placeholder carries nothing but its header.
fn is_placeholder(base: &dyn Graph) -> bool {
    base.size() == 1 && ontology_headers(base).len() == 1
}

fn check_cycles(
    hierarchy: &[Rc<UnionGraph>],
    naming: &dyn OntologyNaming,
    report: &mut ConformanceReport,
) {
    let index: HashMap<usize, usize> = hierarchy
        .iter()
        .enumerate()
        .map(|(i, u)| (graph_key(&**u), i))
        .collect();
    let edges: Vec<Vec<usize>> = hierarchy
        .iter()
        .map(|u| {
            u.sub_graphs()
                .filter_map(|g| index.get(&graph_key(&*g)).copied())
                .collect()
        })
        .collect();

    let mut cyclic = Vec::new();
    for start in 0..hierarchy.len() {
        // start lies on a cycle if it can reach itself
        let mut seen = HashSet::new();
        let mut stack: Vec<usize> = edges[start].clone();
        while let Some(next) = stack.pop() {
            if next == start {
                cyclic.push(start);
                break;
            }
            if seen.insert(next) {
                stack.extend(&edges[next]);
            }
        }
    }

    if cyclic.is_empty() {
        report.push(TestResult::pass(VALIDATOR, "import graph is acyclic"));
        return;
    }
    let names = cyclic
        .into_iter()
        .map(|i| {
            naming
                .find_name(&**hierarchy[i].base_graph())
                .map_or_else(|| format!("{:?}", hierarchy[i]), |n| n.to_id())
        })
        .collect();
    report.push(TestResult::warn(VALIDATOR, "import cycles present").with_details(names));
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ontunion::{GraphMem, HeaderNaming, Node, Triple};

    fn ontology(name: &str) -> Rc<UnionGraph> {
        let base = GraphMem::new();
        base.insert(Triple::ontology_header(Node::iri(name)));
        base.insert(Triple::new(Node::iri(name), Node::iri("urn:p"), Node::iri("urn:o")));
        UnionGraph::new(Rc::new(base))
    }

    #[test]
    fn consistent_hierarchy_passes() {
        let a = ontology("urn:a");
        let b = ontology("urn:b");
        a.add_sub_graph(b.clone()).unwrap();
        a.add(Triple::imports(Node::iri("urn:a"), Node::iri("urn:b"))).unwrap();
        let report = validate(&a, &HeaderNaming);
        assert!(report.all_passed(), "{report:#?}");
        assert_eq!(report.warning_count(), 0);
    }

    #[test]
    fn unattached_import_fails() {
        let a = ontology("urn:a");
        a.add(Triple::imports(Node::iri("urn:a"), Node::iri("urn:b"))).unwrap();
        let report = validate(&a, &HeaderNaming);
        assert_eq!(report.failure_count(), 1);
        let failure = report.results.iter().find(|r| r.is_failure()).unwrap();
        assert_eq!(failure.details, ["imported but not attached: urn:b"]);
    }

    #[test]
    fn cycles_and_placeholders_warn() {
        let a = ontology("urn:a");
        let empty = GraphMem::new();
        empty.insert(Triple::ontology_header(Node::iri("urn:e")));
        let e = UnionGraph::new(Rc::new(empty));
        a.add_sub_graph(a.clone()).unwrap();
        a.add_sub_graph(e.clone()).unwrap();
        a.add(Triple::imports(Node::iri("urn:a"), Node::iri("urn:a"))).unwrap();
        a.add(Triple::imports(Node::iri("urn:a"), Node::iri("urn:e"))).unwrap();
        let report = validate(&a, &HeaderNaming);
        assert!(report.all_passed(), "{report:#?}");
        assert_eq!(report.warning_count(), 2);
    }

    #[test]
    fn headerless_base_fails() {
        let anonymous = UnionGraph::new(Rc::new(GraphMem::new()));
        let report = validate(&anonymous, &HeaderNaming);
        assert_eq!(report.failure_count(), 1);
    }
}
