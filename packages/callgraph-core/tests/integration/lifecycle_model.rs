//! Lifecycle synthesis scenarios
//!
//! Scenario C from the design notes: a modeled launcher call with several
//! plausible component targets picks exactly one, deterministically, and
//! records the precision loss as a diagnostic instead of failing.

#[path = "../common/mod.rs"]
mod common;

use callgraph_core::{AnalysisOptions, ContextKey, Diagnostic, TypeName};
use common::fixtures::{self, graph_signature, nodes_of};
use pretty_assertions::assert_eq;

#[test]
fn ambiguous_target_chooses_one_and_diagnoses() {
    let fx = fixtures::lifecycle(true);
    let alpha_create = fx.method("Alpha.onCreate");
    let alpha_start = fx.method("Alpha.onStart");
    let beta_create = fx.method("Beta.onCreate");
    let result = fx.build(AnalysisOptions::default());

    let ambiguity: Vec<_> = result
        .diagnostics
        .iter()
        .filter(|d| d.kind() == "ambiguous-model-target")
        .collect();
    assert_eq!(ambiguity.len(), 1);
    match ambiguity[0] {
        Diagnostic::AmbiguousModelTarget {
            chosen, candidates, ..
        } => {
            assert_eq!(chosen, &TypeName::new("AlphaComponent"));
            assert_eq!(candidates.len(), 2);
        }
        other => panic!("unexpected diagnostic {other:?}"),
    }

    // the chosen component's lifecycle is inlined into the graph
    assert_eq!(nodes_of(&result, alpha_create).len(), 1);
    assert_eq!(nodes_of(&result, alpha_start).len(), 1);
    // the rejected candidate is not
    assert!(nodes_of(&result, beta_create).is_empty());
}

#[test]
fn ambiguous_choice_is_stable_across_runs() {
    let first = fixtures::lifecycle(true).build(AnalysisOptions::default());
    let second = fixtures::lifecycle(true).build(AnalysisOptions::default());

    assert_eq!(graph_signature(&first), graph_signature(&second));
    assert_eq!(first.diagnostics, second.diagnostics);
}

#[test]
fn unambiguous_target_is_pinned_by_context() {
    let fx = fixtures::lifecycle(false);
    let start = fx.method("start");
    let alpha_create = fx.method("Alpha.onCreate");
    let result = fx.build(AnalysisOptions::default());

    assert!(
        result
            .diagnostics
            .iter()
            .all(|d| d.kind() != "ambiguous-model-target"),
        "a single possible target is not ambiguous"
    );

    // the selector pinned the component into the starter's context
    let start_nodes = nodes_of(&result, start);
    assert_eq!(start_nodes.len(), 1);
    let context = result.call_graph.node(start_nodes[0]).context();
    assert!(context.get(ContextKey::LaunchTarget).is_some());

    assert_eq!(nodes_of(&result, alpha_create).len(), 1);
}

#[test]
fn synthesized_body_is_attached_and_models_the_component() {
    let fx = fixtures::lifecycle(true);
    let start = fx.method("start");
    let result = fx.build(AnalysisOptions::default());

    let start_node = nodes_of(&result, start)[0];
    let body = result
        .call_graph
        .node(start_node)
        .ir()
        .expect("synthesized IR attached to the starter node");

    // allocates the chosen component, then drives both phases
    let site = body.new_sites().next().unwrap();
    assert_eq!(site.ty, TypeName::new("AlphaComponent"));
    assert_eq!(body.call_sites().count(), 2);
}
