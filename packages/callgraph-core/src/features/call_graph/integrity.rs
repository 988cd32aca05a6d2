//! Structural integrity checking
//!
//! Runs after construction, in order: reachability of every non-root node,
//! edge endpoint liveness, uniqueness of (method, context) identities. A
//! failed check always surfaces as an `IntegrityReport`; there is no mode
//! that marks a broken graph valid.

use super::graph::CallGraph;
use crate::shared::models::{MethodId, NodeId};
use rustc_hash::FxHashMap;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum IntegrityViolation {
    /// Non-entrypoint node with no incoming edge
    UnreachableNode { node: NodeId, method: MethodId },

    /// Edge endpoint outside the node arena
    DanglingEdge { from: NodeId, to: NodeId },

    /// Two arena slots carrying the same (method, context) identity
    DuplicateIdentity { first: NodeId, second: NodeId, method: MethodId },
}

impl std::fmt::Display for IntegrityViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrityViolation::UnreachableNode { node, method } => {
                write!(f, "node {node} ({method}) has no incoming edge")
            }
            IntegrityViolation::DanglingEdge { from, to } => {
                write!(f, "edge {from} -> {to} references a node outside the graph")
            }
            IntegrityViolation::DuplicateIdentity { first, second, method } => {
                write!(f, "nodes {first} and {second} share identity for {method}")
            }
        }
    }
}

/// All violations found by one check
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{} violation(s): {}", .violations.len(), describe(.violations))]
pub struct IntegrityReport {
    pub violations: Vec<IntegrityViolation>,
}

fn describe(violations: &[IntegrityViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Post-construction validator
#[derive(Debug, Clone, Copy)]
pub struct IntegrityChecker {
    /// Stop at the first violation instead of collecting all of them
    pub fail_fast: bool,
}

impl Default for IntegrityChecker {
    fn default() -> Self {
        Self { fail_fast: false }
    }
}

impl IntegrityChecker {
    pub fn new(fail_fast: bool) -> Self {
        Self { fail_fast }
    }

    pub fn check(&self, graph: &CallGraph) -> Result<(), IntegrityReport> {
        let mut violations = Vec::new();

        'checks: {
            // 1. every node except the root has an incoming edge
            for (id, node) in graph.iter() {
                if id != graph.root() && node.predecessors().is_empty() {
                    violations.push(IntegrityViolation::UnreachableNode {
                        node: id,
                        method: node.method(),
                    });
                    if self.fail_fast {
                        break 'checks;
                    }
                }
            }

            // 2. every edge endpoint is a live node
            for (id, node) in graph.iter() {
                for callee in node.successors() {
                    if !graph.contains(callee) {
                        violations.push(IntegrityViolation::DanglingEdge { from: id, to: callee });
                        if self.fail_fast {
                            break 'checks;
                        }
                    }
                }
                for &pred in node.predecessors() {
                    if !graph.contains(pred) {
                        violations.push(IntegrityViolation::DanglingEdge { from: pred, to: id });
                        if self.fail_fast {
                            break 'checks;
                        }
                    }
                }
            }

            // 3. no duplicate (method, context) identities
            let mut seen: FxHashMap<(MethodId, crate::features::context::Context), NodeId> =
                FxHashMap::default();
            for (id, node) in graph.iter() {
                let key = (node.method(), node.context().clone());
                if let Some(&first) = seen.get(&key) {
                    violations.push(IntegrityViolation::DuplicateIdentity {
                        first,
                        second: id,
                        method: node.method(),
                    });
                    if self.fail_fast {
                        break 'checks;
                    }
                } else {
                    seen.insert(key, id);
                }
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(IntegrityReport { violations })
        }
    }
}
