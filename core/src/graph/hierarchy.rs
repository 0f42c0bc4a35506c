//! Cycle-safe walks over graph hierarchies that may mix plain, union and
//! inference-bound graphs.

use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use super::{graph_key, GraphRef, UnionGraph};

/// `union` and every union graph below it, each exactly once, breadth first.
#[must_use]
pub fn flat_hierarchy(union: &Rc<UnionGraph>) -> Vec<Rc<UnionGraph>> {
    let mut seen = HashSet::from([graph_key(&**union)]);
    let mut out = vec![union.clone()];
    let mut queue = VecDeque::from([union.clone()]);
    while let Some(next) = queue.pop_front() {
        for sub in next.sub_graphs() {
            let Some(child) = sub.as_union().and_then(UnionGraph::to_rc) else {
                continue;
            };
            if seen.insert(graph_key(&*child)) {
                out.push(child.clone());
                queue.push_back(child);
            }
        }
    }
    out
}

/// The indivisible graphs behind `graph`.
///
/// A union graph answers its [`UnionGraph::data_graphs`]; any other graph is
/// its own single data graph.
#[must_use]
pub fn data_graphs(graph: &GraphRef) -> Vec<GraphRef> {
    match graph.as_union() {
        Some(union) => union.data_graphs(),
        None => vec![graph.clone()],
    }
}

/// Every graph reachable from `graph`: unions, the raw graphs of
/// inference-bound graphs and data graphs, each once.
#[must_use]
pub fn reachable_graphs(graph: &GraphRef) -> Vec<GraphRef> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    let mut queue = VecDeque::from([graph.clone()]);
    while let Some(next) = queue.pop_front() {
        if !seen.insert(graph_key(&*next)) {
            continue;
        }
        if let Some(union) = next.as_union() {
            queue.push_back(union.base_graph().clone());
            queue.extend(union.sub_graphs());
        } else if let Some(inf) = next.as_inf() {
            queue.push_back(inf.raw_graph().clone());
        }
        out.push(next);
    }
    out
}

/// Returns true if `graph` or any graph reachable from it carries entailments.
#[must_use]
pub fn has_inf_graph(graph: &GraphRef) -> bool {
    reachable_graphs(graph)
        .iter()
        .any(|g| g.as_inf().is_some())
}
