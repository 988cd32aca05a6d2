//! Precision ladder
//!
//! Mirrors the classic regression drill: build the same program at several
//! precision levels, integrity-check each graph, and verify that every more
//! precise method projection is a subset of the less precise one. Also
//! covers idempotence: re-running construction on unchanged input yields an
//! isomorphic graph.

#[path = "../common/mod.rs"]
mod common;

use callgraph_core::{
    AnalysisOptions, ContextKey, IntegrityChecker, PointerKey, PrecisionPolicy, Var,
};
use common::fixtures::{self, assert_squash_subset, graph_signature, nodes_of};
use pretty_assertions::assert_eq;

fn options(policy: PrecisionPolicy) -> AnalysisOptions {
    AnalysisOptions {
        policy,
        container_types: vec!["Box".into()],
        ..Default::default()
    }
}

#[test]
fn precision_ladder_is_monotone() {
    let insensitive = fixtures::two_impls().build(options(PrecisionPolicy::Insensitive));
    let call_string = fixtures::two_impls().build(options(PrecisionPolicy::CallString));
    let receiver = fixtures::two_impls().build(options(PrecisionPolicy::ReceiverObject));

    for result in [&insensitive, &call_string, &receiver] {
        IntegrityChecker::default()
            .check(&result.call_graph)
            .expect("constructed graph must be structurally sound");
    }

    assert_squash_subset(&call_string, &insensitive);
    assert_squash_subset(&receiver, &insensitive);
}

#[test]
fn call_string_separates_merged_receivers() {
    let fx = fixtures::two_impls();
    let main = fx.method("main");
    let wrap = fx.method("wrap");
    let result = fx.build(options(PrecisionPolicy::CallString));

    // one wrap analysis per call site
    assert_eq!(nodes_of(&result, wrap).len(), 2);

    // the handle now holds exactly the A allocation, so one speak edge
    let main_node = nodes_of(&result, main)[0];
    assert_eq!(result.call_graph.targets(main_node, 4).len(), 1);

    let ha = PointerKey::Local {
        node: main_node,
        var: Var(2),
    };
    assert_eq!(result.points_to.points_to(&ha).len(), 1);
}

#[test]
fn receiver_object_contexts_carry_the_receiver() {
    let fx = fixtures::two_impls();
    let a_speak = fx.method("A.speak");
    let result = fx.build(options(PrecisionPolicy::ReceiverObject));

    let speak_nodes = nodes_of(&result, a_speak);
    assert_eq!(speak_nodes.len(), 1);
    let node = result.call_graph.node(speak_nodes[0]);
    assert!(
        node.context().get(ContextKey::ReceiverInstance).is_some(),
        "callee analyzed under its receiver object"
    );

    // `this` binds exactly the dispatching instance
    let this = PointerKey::Local {
        node: speak_nodes[0],
        var: Var(0),
    };
    assert_eq!(result.points_to.points_to(&this).len(), 1);
}

#[test]
fn container_sensitivity_separates_heterogeneous_boxes() {
    let merged = fixtures::containers().build(options(PrecisionPolicy::Insensitive));
    let split = fixtures::containers().build(options(PrecisionPolicy::Container));

    assert_squash_subset(&split, &merged);

    // x = b1.get(); x is Var(4) of main
    let x_of = |result: &callgraph_core::BuildResult| {
        let main_node = result.call_graph.entrypoints()[0];
        let x = PointerKey::Local {
            node: main_node,
            var: Var(4),
        };
        result.points_to.points_to(&x).len()
    };

    // insensitive: both element types leak into x
    assert_eq!(x_of(&merged), 2);
    // container-sensitive: only the A put into b1 comes back out
    assert_eq!(x_of(&split), 1);

    // Box methods were analyzed per container instance, keyed by element type
    let get = fixtures::containers().method("get");
    let put = fixtures::containers().method("put");
    assert_eq!(nodes_of(&split, get).len(), 1, "only b1.get is reachable");
    assert_eq!(nodes_of(&split, put).len(), 2, "one put per box");
    let get_node = nodes_of(&split, get)[0];
    let context = split.call_graph.node(get_node).context();
    assert!(context.get(ContextKey::Container).is_some());
    assert!(context.get(ContextKey::ContainerElement).is_some());
}

#[test]
fn construction_is_idempotent() {
    let first = fixtures::two_impls().build(options(PrecisionPolicy::ReceiverObject));
    let second = fixtures::two_impls().build(options(PrecisionPolicy::ReceiverObject));

    assert_eq!(first.call_graph.len(), second.call_graph.len());
    assert_eq!(graph_signature(&first), graph_signature(&second));
    assert_eq!(first.stats.graph, second.stats.graph);
}

#[test]
fn reachable_method_counts_shrink_with_precision() {
    let insensitive = fixtures::two_impls().build(options(PrecisionPolicy::Insensitive));
    let call_string = fixtures::two_impls().build(options(PrecisionPolicy::CallString));

    let loose = insensitive.call_graph.reachable_methods().len();
    let tight = call_string.call_graph.reachable_methods().len();
    assert!(
        tight <= loose,
        "more context can only remove spurious reachability"
    );
    // B.speak is spurious under the insensitive merge and gone with 1-CFA
    assert_eq!(loose - tight, 1);
}
