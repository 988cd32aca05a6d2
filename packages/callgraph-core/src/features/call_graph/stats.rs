//! Graph statistics
//!
//! Read-only aggregation over a finished graph; safe to run concurrently
//! with other consumers, so the per-node folds go through rayon.

use super::graph::CallGraph;
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CallGraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub call_sites_with_targets: usize,
    pub reachable_methods: usize,
    pub max_out_degree: usize,
}

impl CallGraphStats {
    pub fn collect(graph: &CallGraph) -> Self {
        let per_node: Vec<(usize, usize)> = (0..graph.len())
            .into_par_iter()
            .map(|i| {
                let node = graph.node(crate::shared::models::NodeId(i as u32));
                let sites = node.sites().count();
                (node.num_edges(), sites)
            })
            .collect();

        let edges: usize = per_node.iter().map(|(e, _)| e).sum();
        let call_sites_with_targets: usize = per_node.iter().map(|(_, s)| s).sum();
        let max_out_degree = per_node.iter().map(|(e, _)| *e).max().unwrap_or(0);

        Self {
            nodes: graph.len(),
            edges,
            call_sites_with_targets,
            reachable_methods: graph.reachable_methods().len(),
            max_out_degree,
        }
    }
}

impl CallGraphStats {
    /// JSON rendering for log sinks and external tooling
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl fmt::Display for CallGraphStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nodes: {}, edges: {}, sites: {}, methods: {}, max out-degree: {}",
            self.nodes,
            self.edges,
            self.call_sites_with_targets,
            self.reachable_methods,
            self.max_out_degree
        )
    }
}
