//! Constraint generation and graph growth
//!
//! `GenScope` borrows one construction's mutable state and performs the two
//! operations that extend the dependency graph mid-solve: generating a newly
//! interned node's constraints (once per node) and connecting call edges as
//! dispatch constraints resolve.

use crate::errors::{CallGraphError, Result};
use crate::features::call_graph::CallGraph;
use crate::features::context::{Context, ContextQuery, ContextSelector};
use crate::features::heap::{HeapModel, InstanceKey, PointerKey};
use crate::features::hierarchy::ClassHierarchy;
use crate::features::ir::domain::{CallSiteRef, Instr};
use crate::features::ir::infrastructure::IrProviderRegistry;
use crate::features::ir::ports::{NodeRef, ProviderCx};
use crate::features::solver::domain::{ComplexConstraint, DispatchConstraint};
use crate::features::solver::infrastructure::PropagationSystem;
use crate::shared::cancel::CancelToken;
use crate::shared::diagnostics::{Diagnostic, DiagnosticSink};
use crate::shared::models::{InstId, MethodId, NodeId, PtrId, TypeId, TypeName, Var};
use std::collections::VecDeque;
use tracing::debug;

/// One construction's mutable state, borrowed for a generation step
pub(crate) struct GenScope<'a> {
    pub hierarchy: &'a dyn ClassHierarchy,
    pub selector: &'a ContextSelector,
    pub registry: &'a mut IrProviderRegistry,
    pub heap: &'a mut HeapModel,
    pub system: &'a mut PropagationSystem,
    pub call_graph: &'a mut CallGraph,
    pub diagnostics: &'a mut DiagnosticSink,
    pub cancel: &'a CancelToken,
    /// Nodes interned but not yet constraint-generated
    pub pending: &'a mut VecDeque<NodeId>,
}

impl GenScope<'_> {
    fn resolve_type(&self, name: &TypeName) -> Result<TypeId> {
        self.hierarchy
            .type_id(name)
            .ok_or_else(|| CallGraphError::hierarchy(format!("unresolvable type `{name}`")))
    }

    fn local(&mut self, node: NodeId, var: Var) -> PtrId {
        let ptr = self.heap.intern_pointer(PointerKey::Local { node, var });
        self.system.ensure(ptr);
        ptr
    }

    fn return_value(&mut self, node: NodeId) -> PtrId {
        let ptr = self.heap.intern_pointer(PointerKey::ReturnValue { node });
        self.system.ensure(ptr);
        ptr
    }

    /// Intern a (method, context) node; first discovery queues it for
    /// constraint generation
    pub fn ensure_node(
        &mut self,
        method: MethodId,
        context: Context,
    ) -> NodeId {
        let (node, created) = self.call_graph.find_or_create(method, context);
        if created {
            debug!(%node, %method, "discovered call graph node");
            self.pending.push_back(node);
        }
        node
    }

    /// One pass over a node's instructions, turning them into constraints
    pub fn generate(&mut self, node: NodeId) -> Result<()> {
        self.cancel.check()?;

        let (method, context) = {
            let data = self.call_graph.node(node);
            (data.method(), data.context().clone())
        };
        let node_ref = NodeRef {
            node,
            method,
            context: &context,
        };
        let mut pcx = ProviderCx {
            cancel: self.cancel,
            diagnostics: &mut *self.diagnostics,
        };
        let body = self.registry.provider_for(&node_ref)?.ir(&node_ref, &mut pcx)?;
        self.call_graph.attach_ir(node, body.clone());

        for (pc, instr) in body.instructions().iter().enumerate() {
            match instr {
                Instr::New { dest, site } => {
                    let ty = self.resolve_type(&site.ty)?;
                    let element = match &site.element {
                        Some(name) => Some(self.resolve_type(name)?),
                        None => None,
                    };
                    let inst = self.heap.intern_instance(InstanceKey::AllocationSite {
                        node,
                        pc: site.pc,
                        ty,
                        element,
                    });
                    let dest = self.local(node, *dest);
                    self.system.seed(dest, inst);
                }

                Instr::Assign { dest, src } => {
                    let src = self.local(node, *src);
                    let dest = self.local(node, *dest);
                    self.system.add_flow_edge(src, dest, None);
                }

                Instr::GetField { dest, obj, field } => {
                    let base = self.local(node, *obj);
                    let dest = self.local(node, *dest);
                    self.system.add_complex(ComplexConstraint::FieldLoad {
                        base,
                        field: field.clone(),
                        dest,
                    });
                }

                Instr::PutField { obj, field, value } => {
                    let base = self.local(node, *obj);
                    let src = self.local(node, *value);
                    self.system.add_complex(ComplexConstraint::FieldStore {
                        base,
                        field: field.clone(),
                        src,
                    });
                }

                Instr::GetStatic { dest, field } => {
                    let src = self
                        .heap
                        .intern_pointer(PointerKey::StaticField { field: field.clone() });
                    let dest = self.local(node, *dest);
                    self.system.add_flow_edge(src, dest, None);
                }

                Instr::PutStatic { field, value } => {
                    let src = self.local(node, *value);
                    let dest = self
                        .heap
                        .intern_pointer(PointerKey::StaticField { field: field.clone() });
                    self.system.ensure(dest);
                    self.system.add_flow_edge(src, dest, None);
                }

                Instr::ArrayLoad { dest, array } => {
                    let base = self.local(node, *array);
                    let dest = self.local(node, *dest);
                    self.system
                        .add_complex(ComplexConstraint::ArrayLoad { base, dest });
                }

                Instr::ArrayStore { array, value } => {
                    let base = self.local(node, *array);
                    let src = self.local(node, *value);
                    self.system
                        .add_complex(ComplexConstraint::ArrayStore { base, src });
                }

                Instr::Invoke {
                    site,
                    receiver,
                    args,
                    dest,
                } => {
                    let arg_ptrs: Vec<PtrId> =
                        args.iter().map(|&a| self.local(node, a)).collect();
                    let dest_ptr = (*dest).map(|d| self.local(node, d));
                    let recv_ptr = (*receiver).map(|r| self.local(node, r));
                    self.generate_call(node, method, site, recv_ptr, arg_ptrs, dest_ptr)?;
                }

                Instr::Return { value } => {
                    if let Some(v) = value {
                        let src = self.local(node, *v);
                        let ret = self.return_value(node);
                        self.system.add_flow_edge(src, ret, None);
                    }
                }

                Instr::Opaque { mnemonic } => {
                    debug!(%method, mnemonic, "no constraint rule; recording diagnostic");
                    self.diagnostics.record(Diagnostic::UnsupportedConstruct {
                        method,
                        pc: pc as u32,
                        mnemonic: mnemonic.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn generate_call(
        &mut self,
        node: NodeId,
        method: MethodId,
        site: &CallSiteRef,
        recv_ptr: Option<PtrId>,
        arg_ptrs: Vec<PtrId>,
        dest_ptr: Option<PtrId>,
    ) -> Result<()> {
        if site.kind.is_dynamic() {
            let receiver = recv_ptr.ok_or_else(|| {
                CallGraphError::configuration(format!(
                    "virtual call site {site} carries no receiver"
                ))
            })?;
            self.system.add_dispatch(DispatchConstraint {
                caller: node,
                caller_method: method,
                site: site.clone(),
                receiver,
                args: arg_ptrs,
                dest: dest_ptr,
            });
            return Ok(());
        }

        // static / special: target fixed by declared class + selector
        let declared = self.resolve_type(&site.declared_class)?;
        let target = self
            .hierarchy
            .lookup_method(declared, &site.selector)
            .ok_or_else(|| {
                CallGraphError::hierarchy(format!(
                    "no target for direct call {site} on {}",
                    site.declared_class
                ))
            })?;
        self.connect(node, method, site, target, recv_ptr, None, &arg_ptrs, dest_ptr)
    }

    /// Resolve newly observed receiver instances of one dispatch constraint
    pub fn apply_dispatch(
        &mut self,
        idx: u32,
        instances: &[InstId],
    ) -> Result<()> {
        let constraint = self.system.dispatch(idx).clone();
        let declared = self.resolve_type(&constraint.site.declared_class)?;

        for &inst in instances {
            let receiver_type = self.heap.instance(inst).concrete_type();
            if !self.hierarchy.is_subtype(receiver_type, declared) {
                continue;
            }
            let Some(target) = self
                .hierarchy
                .dispatch_target(&constraint.site.selector, receiver_type)
            else {
                debug!(site = %constraint.site, ty = receiver_type.0, "no dispatch target");
                continue;
            };
            if self.hierarchy.method(target).is_abstract {
                continue;
            }
            self.connect(
                constraint.caller,
                constraint.caller_method,
                &constraint.site,
                target,
                Some(constraint.receiver),
                Some(inst),
                &constraint.args,
                constraint.dest,
            )?;
        }
        Ok(())
    }

    /// Materialize newly observed base instances of one complex constraint
    pub fn apply_complex(
        &mut self,
        idx: u32,
        instances: &[InstId],
    ) -> Result<()> {
        let constraint = self.system.complex(idx).clone();
        match constraint {
            ComplexConstraint::FieldLoad { field, dest, .. } => {
                for &inst in instances {
                    let fp = self.heap.intern_pointer(PointerKey::InstanceField {
                        instance: inst,
                        field: field.clone(),
                    });
                    self.system.ensure(fp);
                    self.system.add_flow_edge(fp, dest, None);
                }
            }
            ComplexConstraint::FieldStore { field, src, .. } => {
                for &inst in instances {
                    let fp = self.heap.intern_pointer(PointerKey::InstanceField {
                        instance: inst,
                        field: field.clone(),
                    });
                    self.system.ensure(fp);
                    self.system.add_flow_edge(src, fp, None);
                }
            }
            ComplexConstraint::ArrayLoad { dest, .. } => {
                for &inst in instances {
                    let ap = self
                        .heap
                        .intern_pointer(PointerKey::ArrayContents { instance: inst });
                    self.system.ensure(ap);
                    self.system.add_flow_edge(ap, dest, None);
                }
            }
            ComplexConstraint::ArrayStore { src, .. } => {
                for &inst in instances {
                    let ap = self
                        .heap
                        .intern_pointer(PointerKey::ArrayContents { instance: inst });
                    self.system.ensure(ap);
                    self.system.add_flow_edge(src, ap, None);
                }
            }
        }
        Ok(())
    }

    /// Create (or reuse) the callee node for one resolved call and wire the
    /// parameter/receiver/return plumbing. Idempotent per (site, callee).
    #[allow(clippy::too_many_arguments)]
    fn connect(
        &mut self,
        caller: NodeId,
        caller_method: MethodId,
        site: &CallSiteRef,
        target: MethodId,
        recv_ptr: Option<PtrId>,
        recv_inst: Option<InstId>,
        arg_ptrs: &[PtrId],
        dest_ptr: Option<PtrId>,
    ) -> Result<()> {
        let caller_context = self.call_graph.node(caller).context().clone();
        let query = ContextQuery {
            caller,
            caller_method,
            caller_context: &caller_context,
            site,
            callee: target,
            receiver: recv_inst,
        };
        let context = self.selector.select(&query, self.heap, self.hierarchy);
        let callee = self.ensure_node(target, context);
        self.call_graph.add_edge(caller, site.pc, callee);

        let target_info = self.hierarchy.method(target);
        let num_slots = target_info.num_param_slots();
        let declaring = target_info.declaring;
        let is_static = target_info.is_static;

        if !is_static {
            let this_ptr = self.local(callee, Var(0));
            match (recv_inst, recv_ptr) {
                // dispatch already singled out the receiver object
                (Some(inst), _) => {
                    self.system.seed(this_ptr, inst);
                }
                // direct call: the receiver key flows in, filtered to the
                // implementor's type
                (None, Some(rp)) => {
                    self.system.add_flow_edge(rp, this_ptr, Some(declaring));
                }
                (None, None) => {}
            }
        }

        let first_arg_slot = if is_static { 0 } else { 1 };
        for (i, &arg) in arg_ptrs.iter().enumerate() {
            let slot = first_arg_slot + i as u32;
            if slot < num_slots {
                let param = self.local(callee, Var(slot));
                self.system.add_flow_edge(arg, param, None);
            }
        }

        if let Some(dest) = dest_ptr {
            let ret = self.return_value(callee);
            self.system.add_flow_edge(ret, dest, None);
        }

        Ok(())
    }
}
