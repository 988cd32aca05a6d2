//! Context selection policies
//!
//! Each policy is a pure function of the query tuple; the composite selector
//! tries them in registration order and the first one that answers wins,
//! with the insensitive (empty) context as the final fallback. Policies must
//! keep context cardinality bounded for the solver to terminate.

use super::domain::{Context, ContextItem, ContextKey};
use crate::features::heap::HeapModel;
use crate::features::hierarchy::ClassHierarchy;
use crate::features::ir::domain::CallSiteRef;
use crate::features::ir::infrastructure::LifecycleRegistry;
use crate::shared::models::{InstId, MethodId, NodeId, TypeId};
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// One discovered-edge query: everything a policy may discriminate on
#[derive(Debug, Clone, Copy)]
pub struct ContextQuery<'a> {
    pub caller: NodeId,
    pub caller_method: MethodId,
    pub caller_context: &'a Context,
    pub site: &'a CallSiteRef,
    pub callee: MethodId,
    pub receiver: Option<InstId>,
}

/// A single selection policy. `None` means "no opinion, ask the next one".
pub trait ContextPolicy {
    fn name(&self) -> &'static str;

    fn select(
        &self,
        query: &ContextQuery<'_>,
        heap: &HeapModel,
        hierarchy: &dyn ClassHierarchy,
    ) -> Option<Context>;
}

/// Composite selector: ordered policies, most-specific-wins
pub struct ContextSelector {
    policies: Vec<Box<dyn ContextPolicy>>,
}

impl ContextSelector {
    /// Pure context-insensitive selector
    pub fn insensitive() -> Self {
        Self { policies: vec![] }
    }

    pub fn new(policies: Vec<Box<dyn ContextPolicy>>) -> Self {
        Self { policies }
    }

    pub fn push_front(&mut self, policy: Box<dyn ContextPolicy>) {
        self.policies.insert(0, policy);
    }

    pub fn select(
        &self,
        query: &ContextQuery<'_>,
        heap: &HeapModel,
        hierarchy: &dyn ClassHierarchy,
    ) -> Context {
        for policy in &self.policies {
            if let Some(ctx) = policy.select(query, heap, hierarchy) {
                return ctx;
            }
        }
        Context::empty()
    }
}

/// Call-string sensitivity of length 1: the immediate call site
pub struct CallStringPolicy;

impl ContextPolicy for CallStringPolicy {
    fn name(&self) -> &'static str {
        "call-string-1"
    }

    fn select(
        &self,
        query: &ContextQuery<'_>,
        _heap: &HeapModel,
        _hierarchy: &dyn ClassHierarchy,
    ) -> Option<Context> {
        Some(Context::empty().with(
            ContextKey::CallSite,
            ContextItem::Site {
                method: query.caller_method,
                pc: query.site.pc,
            },
        ))
    }
}

/// Receiver-object sensitivity: the callee is analyzed once per abstract
/// receiver object
pub struct ReceiverInstancePolicy;

impl ContextPolicy for ReceiverInstancePolicy {
    fn name(&self) -> &'static str {
        "receiver-object"
    }

    fn select(
        &self,
        query: &ContextQuery<'_>,
        _heap: &HeapModel,
        _hierarchy: &dyn ClassHierarchy,
    ) -> Option<Context> {
        query.receiver.map(|inst| {
            Context::empty().with(ContextKey::ReceiverInstance, ContextItem::Instance(inst))
        })
    }
}

/// Container sensitivity: receiver-object applied only to registered
/// container types, additionally keyed by the declared element type so
/// heterogeneous collections stay apart
pub struct ContainerPolicy {
    containers: FxHashSet<TypeId>,
}

impl ContainerPolicy {
    pub fn new(containers: FxHashSet<TypeId>) -> Self {
        Self { containers }
    }

    fn is_container(&self, ty: TypeId, hierarchy: &dyn ClassHierarchy) -> bool {
        self.containers
            .iter()
            .any(|&c| hierarchy.is_subtype(ty, c))
    }
}

impl ContextPolicy for ContainerPolicy {
    fn name(&self) -> &'static str {
        "container"
    }

    fn select(
        &self,
        query: &ContextQuery<'_>,
        heap: &HeapModel,
        hierarchy: &dyn ClassHierarchy,
    ) -> Option<Context> {
        let inst = query.receiver?;
        let key = heap.instance(inst);
        if !self.is_container(key.concrete_type(), hierarchy) {
            return None;
        }
        let mut ctx = Context::empty().with(ContextKey::Container, ContextItem::Instance(inst));
        if let Some(element) = key.element_type() {
            ctx = ctx.with(ContextKey::ContainerElement, ContextItem::Type(element));
        }
        Some(ctx)
    }
}

/// Pins the component type for launcher calls whose target is unambiguous,
/// so lifecycle synthesis is fully determined by the node identity
pub struct LaunchTargetPolicy {
    registry: Arc<LifecycleRegistry>,
}

impl LaunchTargetPolicy {
    pub fn new(registry: Arc<LifecycleRegistry>) -> Self {
        Self { registry }
    }
}

impl ContextPolicy for LaunchTargetPolicy {
    fn name(&self) -> &'static str {
        "launch-target"
    }

    fn select(
        &self,
        query: &ContextQuery<'_>,
        _heap: &HeapModel,
        hierarchy: &dyn ClassHierarchy,
    ) -> Option<Context> {
        let selector = &hierarchy.method(query.callee).selector;
        let info = self.registry.info(selector)?;
        match info.possible.as_slice() {
            [only] => {
                Some(Context::empty().with(ContextKey::LaunchTarget, ContextItem::Type(*only)))
            }
            // ambiguous: leave unpinned, the interpreter picks and diagnoses
            _ => None,
        }
    }
}
