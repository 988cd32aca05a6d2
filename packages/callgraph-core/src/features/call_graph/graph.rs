//! Node arena and edge structure
//!
//! A node is created exactly once, at first discovery of its (method,
//! context) identity, and persists until the graph is dropped. Edges and
//! predecessor lists are append-only; nothing shrinks during construction.
//! After construction the graph is immutable and safe for unsynchronized
//! concurrent reads.

use crate::features::context::Context;
use crate::features::ir::domain::IrBody;
use crate::shared::models::{MethodId, NodeId};
use once_cell::sync::OnceCell;
use petgraph::graphmap::DiGraphMap;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// One call-graph node: (method, context) plus its outgoing edges
#[derive(Debug)]
pub struct CgNode {
    method: MethodId,
    context: Context,
    /// Callees per call-site program counter, in discovery order
    out: FxHashMap<u32, Vec<NodeId>>,
    preds: Vec<NodeId>,
    /// Attached when the node's constraints are generated
    ir: OnceCell<Arc<IrBody>>,
}

impl CgNode {
    #[inline]
    pub fn method(&self) -> MethodId {
        self.method
    }

    #[inline]
    pub fn context(&self) -> &Context {
        &self.context
    }

    #[inline]
    pub fn ir(&self) -> Option<&Arc<IrBody>> {
        self.ir.get()
    }

    #[inline]
    pub fn predecessors(&self) -> &[NodeId] {
        &self.preds
    }

    /// (site pc, callees) pairs in unspecified order
    pub fn sites(&self) -> impl Iterator<Item = (u32, &[NodeId])> {
        self.out.iter().map(|(pc, t)| (*pc, t.as_slice()))
    }

    pub fn successors(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.out.values().flatten().copied()
    }

    pub fn targets(&self, pc: u32) -> &[NodeId] {
        self.out.get(&pc).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn num_edges(&self) -> usize {
        self.out.values().map(Vec::len).sum()
    }
}

/// Directed multigraph of (method, context) nodes keyed by call site
#[derive(Debug)]
pub struct CallGraph {
    nodes: Vec<CgNode>,
    index: FxHashMap<(MethodId, Context), NodeId>,
    root: NodeId,
    entrypoints: Vec<NodeId>,
}

impl CallGraph {
    /// New graph containing only the synthetic root node
    pub fn new() -> Self {
        let mut graph = Self {
            nodes: Vec::new(),
            index: FxHashMap::default(),
            root: NodeId(0),
            entrypoints: Vec::new(),
        };
        let (root, _) = graph.find_or_create(MethodId::FAKE_ROOT, Context::empty());
        graph.root = root;
        graph
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &CgNode {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &CgNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    /// Node lookup by identity
    pub fn find_node(&self, method: MethodId, context: &Context) -> Option<NodeId> {
        self.index.get(&(method, context.clone())).copied()
    }

    /// Intern a node, creating it on first discovery
    pub fn find_or_create(&mut self, method: MethodId, context: Context) -> (NodeId, bool) {
        if let Some(&id) = self.index.get(&(method, context.clone())) {
            return (id, false);
        }
        let id = NodeId(self.nodes.len() as u32);
        self.index.insert((method, context.clone()), id);
        self.nodes.push(CgNode {
            method,
            context,
            out: FxHashMap::default(),
            preds: Vec::new(),
            ir: OnceCell::new(),
        });
        (id, true)
    }

    /// Add a call edge; returns true if it was not already present
    pub fn add_edge(&mut self, caller: NodeId, pc: u32, callee: NodeId) -> bool {
        let targets = self.nodes[caller.index()].out.entry(pc).or_default();
        if targets.contains(&callee) {
            return false;
        }
        targets.push(callee);
        let preds = &mut self.nodes[callee.index()].preds;
        if !preds.contains(&caller) {
            preds.push(caller);
        }
        true
    }

    pub fn attach_ir(&mut self, node: NodeId, body: Arc<IrBody>) {
        let _ = self.nodes[node.index()].ir.set(body);
    }

    pub fn set_entrypoints(&mut self, nodes: Vec<NodeId>) {
        self.entrypoints = nodes;
    }

    #[inline]
    pub fn entrypoints(&self) -> &[NodeId] {
        &self.entrypoints
    }

    /// All edges for one call site
    pub fn targets(&self, caller: NodeId, pc: u32) -> &[NodeId] {
        self.node(caller).targets(pc)
    }

    /// Collapse contexts: the method-level projection used to compare
    /// graphs built at different precision levels
    pub fn squash(&self) -> DiGraphMap<MethodId, ()> {
        let mut projection = DiGraphMap::new();
        for node in &self.nodes {
            projection.add_node(node.method);
        }
        for node in &self.nodes {
            for callee in node.successors() {
                projection.add_edge(node.method, self.node(callee).method, ());
            }
        }
        projection
    }

    /// Distinct reachable methods, the root excluded
    pub fn reachable_methods(&self) -> Vec<MethodId> {
        let mut methods: Vec<MethodId> = self
            .nodes
            .iter()
            .map(|n| n.method)
            .filter(|m| !m.is_fake_root())
            .collect();
        methods.sort_unstable();
        methods.dedup();
        methods
    }
}

impl Default for CallGraph {
    fn default() -> Self {
        Self::new()
    }
}
