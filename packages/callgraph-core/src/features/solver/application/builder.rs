//! Call-graph construction use case
//!
//! Orchestrates one construction: validates options and entrypoints,
//! synthesizes the root body, seeds argument instances, runs the fixpoint,
//! and assembles the immutable result. A single logical worker drives the
//! whole loop; cancellation is polled at every worklist iteration and
//! inside every IR request.

use crate::config::{AnalysisOptions, PrecisionPolicy};
use crate::errors::{CallGraphError, Result};
use crate::features::call_graph::{CallGraph, CallGraphStats, IntegrityChecker};
use crate::features::context::{
    CallStringPolicy, ContainerPolicy, ContextPolicy, ContextSelector, LaunchTargetPolicy,
    ReceiverInstancePolicy,
};
use crate::features::heap::{HeapModel, InstanceKey, PointerKey};
use crate::features::hierarchy::ClassHierarchy;
use crate::features::ir::domain::{DispatchKind, IrBody, IrBuilder};
use crate::features::ir::infrastructure::{
    IrProviderRegistry, LifecycleInterpreter, LifecycleRegistry, MethodStore, RootIrProvider,
    StoredIrProvider,
};
use crate::features::ir::ports::IrProvider;
use crate::features::solver::domain::PointsToSet;
use crate::features::solver::infrastructure::{GenScope, PropagationSystem, SolverStats};
use crate::shared::cancel::CancelToken;
use crate::shared::diagnostics::{Diagnostic, DiagnosticSink};
use crate::shared::models::{InstId, MethodId, NodeId, TypeId, Var};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Argument instance to seed into a root-body variable before solving
struct Seed {
    var: Var,
    ty: TypeId,
    label: String,
}

/// Builder for one call-graph construction
pub struct CallGraphBuilder {
    hierarchy: Arc<dyn ClassHierarchy>,
    options: AnalysisOptions,
    registry: IrProviderRegistry,
    lifecycle: Option<Arc<LifecycleRegistry>>,
}

impl CallGraphBuilder {
    /// Standard setup: stored bodies as the default IR source
    pub fn new(
        hierarchy: Arc<dyn ClassHierarchy>,
        store: Arc<MethodStore>,
        options: AnalysisOptions,
    ) -> Self {
        let mut registry = IrProviderRegistry::new();
        registry.register(Box::new(StoredIrProvider::new(store)));
        Self {
            hierarchy,
            options,
            registry,
            lifecycle: None,
        }
    }

    /// Add the synthesizing lifecycle interpreter for modeled launcher calls
    pub fn with_lifecycle(mut self, lifecycle: LifecycleRegistry) -> Self {
        let lifecycle = Arc::new(lifecycle);
        self.registry.register(Box::new(LifecycleInterpreter::new(
            lifecycle.clone(),
            self.hierarchy.clone(),
        )));
        self.lifecycle = Some(lifecycle);
        self
    }

    /// Register an additional provider (claims must stay unambiguous)
    pub fn with_provider(mut self, provider: Box<dyn IrProvider>) -> Self {
        self.registry.register(provider);
        self
    }

    fn build_selector(&self) -> Result<ContextSelector> {
        let mut policies: Vec<Box<dyn ContextPolicy>> = Vec::new();
        match self.options.policy {
            PrecisionPolicy::Insensitive => {}
            PrecisionPolicy::CallString => policies.push(Box::new(CallStringPolicy)),
            PrecisionPolicy::Container => {
                let mut containers = FxHashSet::default();
                for name in &self.options.container_types {
                    let ty = self.hierarchy.type_id(name).ok_or_else(|| {
                        CallGraphError::configuration(format!(
                            "container type `{name}` is not in the class hierarchy"
                        ))
                    })?;
                    containers.insert(ty);
                }
                policies.push(Box::new(ContainerPolicy::new(containers)));
            }
            PrecisionPolicy::ReceiverObject => policies.push(Box::new(ReceiverInstancePolicy)),
        }
        let mut selector = ContextSelector::new(policies);
        if let Some(lifecycle) = &self.lifecycle {
            selector.push_front(Box::new(LaunchTargetPolicy::new(lifecycle.clone())));
        }
        Ok(selector)
    }

    /// Root body: one call per entrypoint, arguments seeded with "any
    /// instance of the declared parameter type"
    fn synthesize_root(
        &self,
        entrypoints: &[MethodId],
        diagnostics: &mut DiagnosticSink,
    ) -> Result<(IrBody, Vec<Seed>)> {
        let mut b = IrBuilder::new(MethodId::FAKE_ROOT, 0);
        let mut seeds = Vec::new();

        for (ep_index, &ep) in entrypoints.iter().enumerate() {
            let info = self.hierarchy.method(ep);
            if info.is_abstract {
                return Err(CallGraphError::configuration(format!(
                    "entrypoint {} is abstract",
                    info.selector
                )));
            }
            let declaring = self.hierarchy.class(info.declaring);

            let mut seed_var = |b: &mut IrBuilder,
                               seeds: &mut Vec<Seed>,
                               slot: usize,
                               ty: TypeId|
             -> Var {
                let var = b.fresh_var();
                let concrete = self.hierarchy.concrete_subtypes(ty);
                if concrete.is_empty() {
                    diagnostics.record(Diagnostic::AbstractTypeWithoutConcreteSubclass {
                        ty: self.hierarchy.class(ty).name.clone(),
                    });
                }
                for sub in concrete {
                    seeds.push(Seed {
                        var,
                        ty: sub,
                        label: format!("entry{ep_index}-slot{slot}"),
                    });
                }
                var
            };

            let receiver = if info.is_static {
                None
            } else {
                Some(seed_var(&mut b, &mut seeds, 0, info.declaring))
            };

            let mut args = Vec::new();
            for (i, param) in info.param_types.iter().enumerate() {
                let ty = self.hierarchy.type_id(param).ok_or_else(|| {
                    CallGraphError::hierarchy(format!(
                        "entrypoint parameter type `{param}` is unresolvable"
                    ))
                })?;
                args.push(seed_var(&mut b, &mut seeds, i + 1, ty));
            }

            let kind = if info.is_static {
                DispatchKind::Static
            } else {
                DispatchKind::Special
            };
            b.invoke(
                declaring.name.clone(),
                info.selector.clone(),
                kind,
                receiver,
                args,
                None,
            );
        }
        b.ret(None);

        Ok((b.finish(), seeds))
    }

    /// Run construction to fixpoint
    pub fn build(mut self, entrypoints: &[MethodId], cancel: &CancelToken) -> Result<BuildResult> {
        if entrypoints.is_empty() {
            return Err(CallGraphError::configuration("no entrypoints supplied"));
        }
        let selector = self.build_selector()?;

        let mut diagnostics = DiagnosticSink::new();
        let (root_body, seeds) = self.synthesize_root(entrypoints, &mut diagnostics)?;
        self.registry
            .register_front(Box::new(RootIrProvider::new(Arc::new(root_body))));

        let mut heap = HeapModel::new();
        let mut system = PropagationSystem::new();
        let mut call_graph = CallGraph::new();
        let mut pending: VecDeque<NodeId> = VecDeque::new();
        let root = call_graph.root();
        pending.push_back(root);

        // initial argument points-to sets
        for seed in &seeds {
            let inst = heap.intern_instance(InstanceKey::External {
                label: seed.label.clone(),
                ty: seed.ty,
            });
            let ptr = heap.intern_pointer(PointerKey::Local {
                node: root,
                var: seed.var,
            });
            system.seed(ptr, inst);
        }

        info!(
            policy = self.options.policy.as_str(),
            entrypoints = entrypoints.len(),
            "starting call graph construction"
        );

        let mut complete = true;
        {
            let mut scope = GenScope {
                hierarchy: self.hierarchy.as_ref(),
                selector: &selector,
                registry: &mut self.registry,
                heap: &mut heap,
                system: &mut system,
                call_graph: &mut call_graph,
                diagnostics: &mut diagnostics,
                cancel,
                pending: &mut pending,
            };

            loop {
                while let Some(node) = scope.pending.pop_front() {
                    scope.generate(node)?;
                }
                let Some(ptr) = scope.system.pop() else {
                    break;
                };
                cancel.check()?;

                let iterations = scope.system.stats().iterations;
                if self.options.max_iterations > 0 && iterations > self.options.max_iterations {
                    warn!(iterations, "iteration guard tripped; result is incomplete");
                    scope
                        .diagnostics
                        .record(Diagnostic::IterationGuardTripped { iterations });
                    complete = false;
                    break;
                }

                scope.system.propagate(ptr, scope.heap, scope.hierarchy);
                for (idx, instances) in scope.system.due_complex(ptr) {
                    scope.apply_complex(idx, &instances)?;
                }
                for (idx, instances) in scope.system.due_dispatch(ptr) {
                    scope.apply_dispatch(idx, &instances)?;
                }
            }
        }

        // entrypoint nodes in call-site order
        let mut site_pcs: Vec<u32> = call_graph.node(root).sites().map(|(pc, _)| pc).collect();
        site_pcs.sort_unstable();
        let mut entry_nodes = Vec::new();
        for pc in site_pcs {
            for &target in call_graph.targets(root, pc) {
                if !entry_nodes.contains(&target) {
                    entry_nodes.push(target);
                }
            }
        }
        call_graph.set_entrypoints(entry_nodes);

        if self.options.verify {
            IntegrityChecker::new(self.options.fail_fast_integrity).check(&call_graph)?;
        }

        let stats = BuildStats {
            graph: CallGraphStats::collect(&call_graph),
            solver: system.stats().clone(),
            pointer_keys: heap.num_pointers(),
            instance_keys: heap.num_instances(),
            complete,
        };
        debug!(%stats.graph, "construction finished");

        Ok(BuildResult {
            call_graph,
            points_to: PointsToResult {
                heap,
                sets: system.into_sets(),
            },
            stats,
            diagnostics: diagnostics.into_entries(),
        })
    }
}

/// Final points-to mapping, immutable after construction
#[derive(Debug)]
pub struct PointsToResult {
    heap: HeapModel,
    sets: Vec<PointsToSet>,
}

impl PointsToResult {
    /// Instances a pointer key may reference; empty for unknown keys
    pub fn points_to(&self, key: &PointerKey) -> &[InstId] {
        const EMPTY: &[InstId] = &[];
        match self.heap.pointer_id(key) {
            Some(ptr) if ptr.index() < self.sets.len() => self.sets[ptr.index()].as_slice(),
            _ => EMPTY,
        }
    }

    /// Same, resolved to the instance keys themselves
    pub fn instances<'a>(&'a self, key: &PointerKey) -> impl Iterator<Item = &'a InstanceKey> {
        self.points_to(key).iter().map(|&i| self.heap.instance(i))
    }

    #[inline]
    pub fn instance(&self, id: InstId) -> &InstanceKey {
        self.heap.instance(id)
    }

    #[inline]
    pub fn heap(&self) -> &HeapModel {
        &self.heap
    }
}

/// Aggregate counters for one construction
#[derive(Debug, Clone)]
pub struct BuildStats {
    pub graph: CallGraphStats,
    pub solver: SolverStats,
    pub pointer_keys: usize,
    pub instance_keys: usize,
    /// False when the iteration guard stopped the solve early
    pub complete: bool,
}

/// Everything one construction produces
#[derive(Debug)]
pub struct BuildResult {
    pub call_graph: CallGraph,
    pub points_to: PointsToResult,
    pub stats: BuildStats,
    pub diagnostics: Vec<Diagnostic>,
}
