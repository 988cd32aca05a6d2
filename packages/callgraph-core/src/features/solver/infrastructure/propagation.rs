//! Propagation system
//!
//! Worklist fixpoint over a dependency graph whose nodes are pointer-key
//! handles. The system only moves instance sets along edges and reports
//! which complex/dispatch constraints became due; interpreting those
//! constraints (and growing the call graph) happens in `GenScope`.
//!
//! Termination: sets are append-only and drawn from the finite product of
//! allocation sites and bounded contexts, so every key can change at most
//! finitely often and the worklist drains.

use crate::features::heap::HeapModel;
use crate::features::hierarchy::ClassHierarchy;
use crate::features::solver::domain::{
    ComplexConstraint, DispatchConstraint, FlowEdge, PointsToSet,
};
use crate::shared::models::{InstId, PtrId};
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::collections::VecDeque;

/// Counters reported with the build result
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SolverStats {
    pub iterations: usize,
    pub propagations: usize,
    pub flow_edges: usize,
    pub complex_constraints: usize,
    pub dispatch_constraints: usize,
}

#[derive(Debug, Default)]
pub struct PropagationSystem {
    sets: Vec<PointsToSet>,
    flow: Vec<Vec<FlowEdge>>,

    complexes: Vec<ComplexConstraint>,
    complex_watch: Vec<Vec<u32>>,
    /// (constraint, instance) pairs already materialized
    applied: FxHashSet<(u32, InstId)>,

    dispatches: Vec<DispatchConstraint>,
    dispatch_watch: Vec<Vec<u32>>,
    /// (dispatch, receiver instance) pairs already resolved
    resolved: FxHashSet<(u32, InstId)>,

    worklist: VecDeque<PtrId>,
    in_worklist: FxHashSet<PtrId>,

    stats: SolverStats,
}

impl PropagationSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grow the arenas to cover `ptr`
    pub fn ensure(&mut self, ptr: PtrId) {
        let needed = ptr.index() + 1;
        if self.sets.len() < needed {
            self.sets.resize_with(needed, PointsToSet::new);
            self.flow.resize_with(needed, Vec::new);
            self.complex_watch.resize_with(needed, Vec::new);
            self.dispatch_watch.resize_with(needed, Vec::new);
        }
    }

    #[inline]
    pub fn set(&self, ptr: PtrId) -> &PointsToSet {
        &self.sets[ptr.index()]
    }

    #[inline]
    pub fn stats(&self) -> &SolverStats {
        &self.stats
    }

    pub fn push(&mut self, ptr: PtrId) {
        if self.in_worklist.insert(ptr) {
            self.worklist.push_back(ptr);
        }
    }

    pub fn pop(&mut self) -> Option<PtrId> {
        let ptr = self.worklist.pop_front()?;
        self.in_worklist.remove(&ptr);
        self.stats.iterations += 1;
        Some(ptr)
    }

    /// Put an instance directly into a key's set
    pub fn seed(&mut self, ptr: PtrId, inst: InstId) -> bool {
        self.ensure(ptr);
        let changed = self.sets[ptr.index()].insert(inst);
        if changed {
            self.push(ptr);
        }
        changed
    }

    /// Subset edge src → dest; existing contents of src flow on the next pop
    pub fn add_flow_edge(&mut self, src: PtrId, dest: PtrId, filter: Option<crate::shared::models::TypeId>) {
        self.ensure(src);
        self.ensure(dest);
        let edge = FlowEdge { dest, filter };
        let edges = &mut self.flow[src.index()];
        if edges.contains(&edge) {
            return;
        }
        edges.push(edge);
        self.stats.flow_edges += 1;
        if !self.sets[src.index()].is_empty() {
            self.push(src);
        }
    }

    pub fn add_complex(&mut self, constraint: ComplexConstraint) {
        let base = constraint.base();
        self.ensure(base);
        let idx = self.complexes.len() as u32;
        self.complexes.push(constraint);
        self.complex_watch[base.index()].push(idx);
        self.stats.complex_constraints += 1;
        if !self.sets[base.index()].is_empty() {
            self.push(base);
        }
    }

    pub fn add_dispatch(&mut self, constraint: DispatchConstraint) {
        let receiver = constraint.receiver;
        self.ensure(receiver);
        let idx = self.dispatches.len() as u32;
        self.dispatches.push(constraint);
        self.dispatch_watch[receiver.index()].push(idx);
        self.stats.dispatch_constraints += 1;
        if !self.sets[receiver.index()].is_empty() {
            self.push(receiver);
        }
    }

    #[inline]
    pub fn complex(&self, idx: u32) -> &ComplexConstraint {
        &self.complexes[idx as usize]
    }

    #[inline]
    pub fn dispatch(&self, idx: u32) -> &DispatchConstraint {
        &self.dispatches[idx as usize]
    }

    /// Recompute dependents of `ptr`: push its set along every outgoing
    /// edge, honoring filters; growing destinations re-enter the worklist
    pub fn propagate(&mut self, ptr: PtrId, heap: &HeapModel, hierarchy: &dyn ClassHierarchy) {
        self.ensure(ptr);
        let snapshot = self.sets[ptr.index()].clone();
        if snapshot.is_empty() {
            return;
        }
        let edges = self.flow[ptr.index()].clone();
        for edge in edges {
            let grew = match edge.filter {
                None => self.sets[edge.dest.index()].union_with(&snapshot),
                Some(bound) => {
                    let filtered: PointsToSet = snapshot
                        .iter()
                        .filter(|&inst| {
                            hierarchy.is_subtype(heap.instance(inst).concrete_type(), bound)
                        })
                        .collect();
                    self.sets[edge.dest.index()].union_with(&filtered)
                }
            };
            if grew {
                self.stats.propagations += 1;
                self.push(edge.dest);
            }
        }
    }

    /// Complex constraints watching `ptr`, with the instances they have not
    /// seen yet; marks them seen
    pub fn due_complex(&mut self, ptr: PtrId) -> Vec<(u32, Vec<InstId>)> {
        self.due(ptr, false)
    }

    /// Same for dispatch constraints
    pub fn due_dispatch(&mut self, ptr: PtrId) -> Vec<(u32, Vec<InstId>)> {
        self.due(ptr, true)
    }

    fn due(&mut self, ptr: PtrId, dispatch: bool) -> Vec<(u32, Vec<InstId>)> {
        self.ensure(ptr);
        let watchers = if dispatch {
            self.dispatch_watch[ptr.index()].clone()
        } else {
            self.complex_watch[ptr.index()].clone()
        };
        let instances: Vec<InstId> = self.sets[ptr.index()].iter().collect();

        let mut due = Vec::new();
        for idx in watchers {
            let seen = if dispatch {
                &mut self.resolved
            } else {
                &mut self.applied
            };
            let fresh: Vec<InstId> = instances
                .iter()
                .copied()
                .filter(|&inst| seen.insert((idx, inst)))
                .collect();
            if !fresh.is_empty() {
                due.push((idx, fresh));
            }
        }
        due
    }

    pub fn num_keys(&self) -> usize {
        self.sets.len()
    }

    /// Final sets, indexed by pointer-key handle
    pub fn into_sets(self) -> Vec<PointsToSet> {
        self.sets
    }
}
