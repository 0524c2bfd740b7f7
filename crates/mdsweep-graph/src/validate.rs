//! Structural validation of workflow graphs
//!
//! Checks the invariants the execution service relies on: unique names,
//! every signal declared, every consumed signal produced exactly once, and
//! no cycles between processes.

use crate::error::GraphError;
use crate::workflow::WorkflowGraph;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

/// Validate `graph`
///
/// # Errors
/// Returns the first [`GraphError`] found.
pub fn check(graph: &WorkflowGraph) -> Result<(), GraphError> {
    execution_order(graph).map(|_| ())
}

/// Validate `graph` and return its process names in a dependency order
///
/// # Errors
/// Returns the first [`GraphError`] found.
pub fn execution_order(graph: &WorkflowGraph) -> Result<Vec<&str>, GraphError> {
    let mut declared = HashSet::new();
    for signal in &graph.signals {
        if !declared.insert(signal.name.as_str()) {
            return Err(GraphError::DuplicateSignal(signal.name.clone()));
        }
    }
    for input in &graph.inputs {
        if !declared.contains(input.as_str()) {
            return Err(GraphError::UndeclaredSignal(input.clone()));
        }
    }

    let mut dag: DiGraph<&str, ()> = DiGraph::new();
    let mut by_name: HashMap<&str, NodeIndex> = HashMap::new();
    let mut producers: HashMap<&str, NodeIndex> = HashMap::new();

    for process in &graph.processes {
        let idx = dag.add_node(process.name.as_str());
        if by_name.insert(process.name.as_str(), idx).is_some() {
            return Err(GraphError::DuplicateProcess(process.name.clone()));
        }
        for out in &process.outs {
            if !declared.contains(out.as_str()) {
                return Err(GraphError::UndeclaredSignal(out.clone()));
            }
            if let Some(first) = producers.insert(out.as_str(), idx) {
                return Err(GraphError::MultipleProducers {
                    signal: out.clone(),
                    first: dag[first].to_string(),
                    second: process.name.clone(),
                });
            }
        }
    }

    let is_input = |name: &str| graph.inputs.iter().any(|i| i == name);

    for process in &graph.processes {
        let consumer = by_name[process.name.as_str()];
        for input in &process.ins {
            if let Some(&producer) = producers.get(input.as_str()) {
                dag.add_edge(producer, consumer, ());
            } else if !is_input(input) {
                return Err(GraphError::UnproducedSignal {
                    consumer: process.name.clone(),
                    signal: input.clone(),
                });
            }
        }
    }

    for output in &graph.outputs {
        if !producers.contains_key(output.as_str()) && !is_input(output) {
            return Err(GraphError::UnproducedSignal {
                consumer: "outs".to_string(),
                signal: output.clone(),
            });
        }
    }

    match toposort(&dag, None) {
        Ok(order) => Ok(order.into_iter().map(|idx| dag[idx]).collect()),
        Err(cycle) => Err(GraphError::CycleDetected(dag[cycle.node_id()].to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{ProcessNode, SignalDecl};

    fn process(name: &str, ins: &[&str], outs: &[&str]) -> ProcessNode {
        ProcessNode::command(
            name,
            "/bin/true",
            vec![],
            ins.iter().map(ToString::to_string).collect(),
            outs.iter().map(ToString::to_string).collect(),
        )
    }

    fn graph_with(processes: Vec<ProcessNode>, signals: &[&str]) -> WorkflowGraph {
        let mut graph = WorkflowGraph::with_start();
        for p in processes {
            graph.push_process(p);
        }
        for s in signals {
            graph.declare_signal(SignalDecl::named(*s));
        }
        graph
    }

    #[test]
    fn accepts_chain() {
        let graph = graph_with(
            vec![process("a", &["start"], &["x"]), process("b", &["x"], &["y"])],
            &["x", "y"],
        );
        assert_eq!(execution_order(&graph).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn rejects_duplicate_process() {
        let graph = graph_with(
            vec![process("a", &["start"], &["x"]), process("a", &["start"], &["y"])],
            &["x", "y"],
        );
        assert_eq!(check(&graph), Err(GraphError::DuplicateProcess("a".into())));
    }

    #[test]
    fn rejects_duplicate_signal() {
        let graph = graph_with(vec![process("a", &["start"], &["x"])], &["x", "x"]);
        assert_eq!(check(&graph), Err(GraphError::DuplicateSignal("x".into())));
    }

    #[test]
    fn rejects_undeclared_output() {
        let graph = graph_with(vec![process("a", &["start"], &["x"])], &[]);
        assert_eq!(check(&graph), Err(GraphError::UndeclaredSignal("x".into())));
    }

    #[test]
    fn rejects_unproduced_input() {
        let graph = graph_with(vec![process("b", &["missing"], &["y"])], &["y"]);
        assert!(matches!(
            check(&graph),
            Err(GraphError::UnproducedSignal { .. })
        ));
    }

    #[test]
    fn rejects_two_producers() {
        let graph = graph_with(
            vec![process("a", &["start"], &["x"]), process("b", &["start"], &["x"])],
            &["x"],
        );
        assert!(matches!(
            check(&graph),
            Err(GraphError::MultipleProducers { .. })
        ));
    }

    #[test]
    fn rejects_cycle() {
        let graph = graph_with(
            vec![process("a", &["y"], &["x"]), process("b", &["x"], &["y"])],
            &["x", "y"],
        );
        assert!(matches!(check(&graph), Err(GraphError::CycleDetected(_))));
    }

    #[test]
    fn rejects_unproduced_output() {
        let mut graph = graph_with(vec![], &[]);
        graph.declare_output("nothing");
        assert!(matches!(
            check(&graph),
            Err(GraphError::UnproducedSignal { consumer, .. }) if consumer == "outs"
        ));
    }
}
