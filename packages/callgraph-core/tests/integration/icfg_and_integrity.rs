//! Interprocedural view, integrity, cancellation
//!
//! The ICFG exercise walks every block of a finished graph, counts the
//! blocks that contain calls, and follows call/return splices. Integrity
//! and cancellation cover the two "never silently" contracts: a broken
//! graph is always reported, a cancelled build never returns a graph.

#[path = "../common/mod.rs"]
mod common;

use callgraph_core::{
    AnalysisOptions, BlockInContext, CallGraphBuilder, CallGraphError, CancelToken,
    ClassHierarchy, IntegrityChecker, InterproceduralCfg,
};
use common::fixtures::{self, nodes_of};
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[test]
fn icfg_iterates_and_counts_call_blocks() {
    let fx = fixtures::hello_world();
    let result = fx.build(AnalysisOptions::default());
    let icfg = InterproceduralCfg::new(&result.call_graph);

    // every node, root included, carries IR after construction
    let total_blocks = icfg.iter().count();
    assert!(total_blocks >= 5, "root(2) + main(2) + greet(1), got {total_blocks}");

    // root calls main, main calls greet
    assert_eq!(icfg.count_call_blocks(), 2);
}

#[test]
fn icfg_splices_calls_and_returns() {
    let fx = fixtures::hello_world();
    let main = fx.method("main");
    let greet = fx.method("greet");
    let result = fx.build(AnalysisOptions::default());
    let icfg = InterproceduralCfg::new(&result.call_graph);

    let main_node = nodes_of(&result, main)[0];
    let greet_node = nodes_of(&result, greet)[0];
    let main_body = result.call_graph.node(main_node).ir().unwrap().clone();

    let call_block = BlockInContext {
        node: main_node,
        block: main_body.entry_block(),
    };
    assert!(icfg.has_call(call_block));

    // call block flows into greet's entry
    let succs = icfg.successors(call_block);
    assert_eq!(succs.len(), 1);
    assert_eq!(succs[0].node, greet_node);

    // greet's exit flows back to main's return-site block
    let greet_exit = succs[0];
    let returns = icfg.successors(greet_exit);
    assert!(returns.iter().any(|bb| bb.node == main_node));
}

#[test]
fn finished_graphs_pass_integrity() {
    for result in [
        fixtures::hello_world().build(AnalysisOptions::default()),
        fixtures::two_impls().build(AnalysisOptions::default()),
        fixtures::recursion().build(AnalysisOptions::default()),
        fixtures::lifecycle(true).build(AnalysisOptions::default()),
    ] {
        IntegrityChecker::default()
            .check(&result.call_graph)
            .expect("constructed graph must pass integrity");
    }
}

#[test]
fn integrity_failure_is_never_swallowed() {
    use callgraph_core::{CallGraph, Context, MethodId};

    // hand-built broken graph: a node nothing points at
    let mut graph = CallGraph::new();
    graph.find_or_create(MethodId(7), Context::empty());

    let report = IntegrityChecker::default().check(&graph).unwrap_err();
    assert_eq!(report.violations.len(), 1);
    assert!(report.to_string().contains("no incoming edge"));
}

#[test]
fn cancellation_discards_the_partial_graph() {
    let fx = fixtures::hello_world();
    let hierarchy: Arc<dyn ClassHierarchy> = fx.hierarchy.clone();
    let builder = CallGraphBuilder::new(hierarchy, fx.store.clone(), AnalysisOptions::default());

    let cancel = CancelToken::new();
    cancel.cancel();
    let err = builder.build(&fx.entrypoints, &cancel).unwrap_err();
    assert!(matches!(err, CallGraphError::Cancelled));
}

#[test]
fn iteration_guard_marks_result_incomplete() {
    let fx = fixtures::two_impls();
    let options = AnalysisOptions {
        max_iterations: 1,
        verify: false, // a truncated graph is expectedly unsound
        ..Default::default()
    };
    let result = fx.build(options);
    assert!(!result.stats.complete);
    assert!(result
        .diagnostics
        .iter()
        .any(|d| d.kind() == "iteration-guard"));
}
