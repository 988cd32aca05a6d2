//! Interprocedural control-flow view
//!
//! Lazy composition over a finished call graph: (node, local block) pairs
//! with local edges spliced at calls and returns. Nothing is materialized;
//! every query walks the underlying bodies on demand. Because a call always
//! terminates its block (body-builder invariant), "does this block contain
//! a call" is a precomputed bit and the call site of a calling block is its
//! last instruction.

use crate::features::call_graph::CallGraph;
use crate::shared::models::{BlockId, NodeId};

/// One basic block of one (method, context) node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockInContext {
    pub node: NodeId,
    pub block: BlockId,
}

/// Read-only interprocedural view; cheap to construct, nothing cached
pub struct InterproceduralCfg<'a> {
    graph: &'a CallGraph,
}

impl<'a> InterproceduralCfg<'a> {
    pub fn new(graph: &'a CallGraph) -> Self {
        Self { graph }
    }

    /// Forward iteration over every block of every node with attached IR
    pub fn iter(&self) -> impl Iterator<Item = BlockInContext> + 'a {
        self.graph.iter().flat_map(|(id, node)| {
            node.ir()
                .into_iter()
                .flat_map(move |body| {
                    body.blocks()
                        .iter()
                        .map(move |b| BlockInContext { node: id, block: b.id })
                })
        })
    }

    /// O(1): does this block end in a call?
    pub fn has_call(&self, bb: BlockInContext) -> bool {
        self.graph
            .node(bb.node)
            .ir()
            .map(|body| body.block(bb.block).has_call)
            .unwrap_or(false)
    }

    /// Successors with call/return splicing:
    /// - a calling block with resolved targets flows into callee entries
    /// - an exit block flows back to every caller's return site
    /// - everything else follows local edges
    pub fn successors(&self, bb: BlockInContext) -> Vec<BlockInContext> {
        let node = self.graph.node(bb.node);
        let Some(body) = node.ir() else {
            return Vec::new();
        };
        let block = body.block(bb.block);
        let mut out = Vec::new();

        if block.has_call {
            let pc = (block.end - 1) as u32;
            let targets = node.targets(pc);
            if !targets.is_empty() {
                for &callee in targets {
                    if let Some(callee_body) = self.graph.node(callee).ir() {
                        out.push(BlockInContext {
                            node: callee,
                            block: callee_body.entry_block(),
                        });
                    }
                }
                return out;
            }
            // unresolved call: fall through locally
        }

        for &succ in &block.successors {
            out.push(BlockInContext {
                node: bb.node,
                block: succ,
            });
        }

        if body.exit_blocks().any(|b| b == bb.block) {
            self.push_return_sites(bb.node, &mut out);
        }
        out
    }

    /// Return edges: callers' blocks following their call sites into `node`
    fn push_return_sites(&self, node: NodeId, out: &mut Vec<BlockInContext>) {
        for &pred in self.graph.node(node).predecessors() {
            let pred_node = self.graph.node(pred);
            let Some(pred_body) = pred_node.ir() else {
                continue;
            };
            for (pc, targets) in pred_node.sites() {
                if !targets.contains(&node) {
                    continue;
                }
                if let Some(call_block) = pred_body.block_containing(pc) {
                    for &ret in &pred_body.block(call_block).successors {
                        let bic = BlockInContext { node: pred, block: ret };
                        if !out.contains(&bic) {
                            out.push(bic);
                        }
                    }
                }
            }
        }
    }

    /// Count of blocks containing a call; the classic ICFG exercise
    pub fn count_call_blocks(&self) -> usize {
        self.iter().filter(|&bb| self.has_call(bb)).count()
    }
}
