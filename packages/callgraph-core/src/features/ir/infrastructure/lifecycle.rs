//! Lifecycle interpreter
//!
//! Rewrites calls that hand control to a managed component (launcher
//! methods) into a synthesized body that allocates the target component and
//! drives its lifecycle phases, so propagation treats the hand-off as
//! inlined code.
//!
//! Target selection: the context's `LaunchTarget` entry pins the component
//! when the selector could determine it. Otherwise the launcher's possible
//! set decides; with more than one candidate the lexicographically least
//! type name is chosen and an `AmbiguousModelTarget` diagnostic records the
//! precision loss. Synthesis is a pure function of (method, context) and is
//! memoized on exactly that identity, which also guards re-entrant requests
//! for the same node.

use super::super::domain::{DispatchKind, IrBody, IrBuilder};
use super::super::ports::{IrProvider, NodeRef, ProviderCx};
use crate::errors::{CallGraphError, Result};
use crate::features::context::{Context, ContextItem, ContextKey};
use crate::features::hierarchy::ClassHierarchy;
use crate::shared::diagnostics::Diagnostic;
use crate::shared::models::{MethodId, Selector, TypeId, TypeName, Var};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// What one launcher method may start, and the lifecycle it drives
#[derive(Debug, Clone)]
pub struct StartInfo {
    /// Component types this launcher can hand control to
    pub possible: Vec<TypeId>,
    /// Lifecycle phase selectors invoked on the started component, in order
    pub phases: Vec<Selector>,
}

/// Table of launcher selectors, the analog of a framework's starter list
#[derive(Debug, Default)]
pub struct LifecycleRegistry {
    starters: FxHashMap<Selector, StartInfo>,
}

impl LifecycleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_starter(&mut self, selector: Selector, info: StartInfo) {
        self.starters.insert(selector, info);
    }

    #[inline]
    pub fn is_starter(&self, selector: &Selector) -> bool {
        self.starters.contains_key(selector)
    }

    #[inline]
    pub fn info(&self, selector: &Selector) -> Option<&StartInfo> {
        self.starters.get(selector)
    }
}

/// Synthesizing provider for launcher methods
pub struct LifecycleInterpreter {
    registry: Arc<LifecycleRegistry>,
    hierarchy: Arc<dyn ClassHierarchy>,
    memo: FxHashMap<(MethodId, Context), Arc<IrBody>>,
}

impl LifecycleInterpreter {
    pub fn new(registry: Arc<LifecycleRegistry>, hierarchy: Arc<dyn ClassHierarchy>) -> Self {
        Self {
            registry,
            hierarchy,
            memo: FxHashMap::default(),
        }
    }

    /// Deterministic component choice; diagnoses ambiguity instead of failing
    fn choose_target(
        &self,
        launcher: &Selector,
        info: &StartInfo,
        context: &Context,
        cx: &mut ProviderCx<'_>,
    ) -> Result<TypeId> {
        if let Some(ContextItem::Type(ty)) = context.get(ContextKey::LaunchTarget) {
            return Ok(*ty);
        }

        let mut candidates: Vec<TypeId> = info.possible.clone();
        candidates.sort_by(|a, b| {
            self.hierarchy
                .class(*a)
                .name
                .cmp(&self.hierarchy.class(*b).name)
        });

        match candidates.as_slice() {
            [] => Err(CallGraphError::configuration(format!(
                "launcher {launcher} registered with an empty component set"
            ))),
            [only] => Ok(*only),
            [first, ..] => {
                let names: Vec<TypeName> = candidates
                    .iter()
                    .map(|t| self.hierarchy.class(*t).name.clone())
                    .collect();
                let chosen = self.hierarchy.class(*first).name.clone();
                warn!(
                    launcher = %launcher,
                    candidates = ?names,
                    chosen = %chosen,
                    "unable to determine the exact component type; assuming one to avoid failing"
                );
                cx.diagnostics.record(Diagnostic::AmbiguousModelTarget {
                    launcher: launcher.clone(),
                    candidates: names,
                    chosen,
                });
                Ok(*first)
            }
        }
    }

    fn synthesize(
        &self,
        node: &NodeRef<'_>,
        target: TypeId,
        info: &StartInfo,
    ) -> Arc<IrBody> {
        let launcher = self.hierarchy.method(node.method);
        let num_slots = launcher.num_param_slots();
        let mut b = IrBuilder::new(node.method, num_slots);

        let target_class = self.hierarchy.class(target);
        let component = b.fresh_var();
        b.new_instance(component, target_class.name.clone());

        // available request arguments, receiver slot excluded
        let first_arg = if launcher.is_static { 0 } else { 1 };
        let args: Vec<Var> = (first_arg..num_slots).map(Var).collect();

        for phase in &info.phases {
            let Some(phase_method) = self.hierarchy.lookup_method(target, phase) else {
                debug!(component = %target_class.name, phase = %phase, "lifecycle phase not declared; skipped");
                continue;
            };
            let wanted = self.hierarchy.method(phase_method).param_types.len();
            let passed: Vec<Var> = args.iter().copied().take(wanted).collect();
            b.invoke(
                target_class.name.clone(),
                phase.clone(),
                DispatchKind::Special,
                Some(component),
                passed,
                None,
            );
        }
        b.ret(None);

        Arc::new(b.finish())
    }
}

impl IrProvider for LifecycleInterpreter {
    fn name(&self) -> &'static str {
        "lifecycle-interpreter"
    }

    fn understands(&self, node: &NodeRef<'_>) -> bool {
        if node.method.is_fake_root() {
            return false;
        }
        self.registry
            .is_starter(&self.hierarchy.method(node.method).selector)
    }

    fn ir(&mut self, node: &NodeRef<'_>, cx: &mut ProviderCx<'_>) -> Result<Arc<IrBody>> {
        // cancellation surfaces as a structured error, never a panic
        cx.cancel.check()?;

        let key = (node.method, node.context.clone());
        if let Some(body) = self.memo.get(&key) {
            return Ok(body.clone());
        }

        let selector = self.hierarchy.method(node.method).selector.clone();
        let info = self
            .registry
            .info(&selector)
            .cloned()
            .ok_or_else(|| {
                CallGraphError::configuration(format!(
                    "lifecycle interpreter asked for non-starter {selector}"
                ))
            })?;

        let target = self.choose_target(&selector, &info, node.context, cx)?;
        debug!(
            launcher = %selector,
            target = %self.hierarchy.class(target).name,
            context = %node.context,
            "synthesizing lifecycle body"
        );
        let body = self.synthesize(node, target, &info);
        self.memo.insert(key, body.clone());
        Ok(body)
    }
}
