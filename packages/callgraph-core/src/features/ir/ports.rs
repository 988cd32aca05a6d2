//! IR provider port
//!
//! Exactly one registered provider claims any given node (see the registry);
//! everything past `ir` defaults through it, mirroring how a synthesizing
//! provider regenerates its representation for every derived accessor.

use super::domain::{BasicBlock, CallSiteRef, DefUse, IrBody, NewSiteRef};
use crate::errors::Result;
use crate::features::context::Context;
use crate::shared::cancel::CancelToken;
use crate::shared::diagnostics::DiagnosticSink;
use crate::shared::models::{MethodId, NodeId};
use std::sync::Arc;

/// The identity a provider sees: the interned node plus its components
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    pub node: NodeId,
    pub method: MethodId,
    pub context: &'a Context,
}

/// Services threaded into every provider call
pub struct ProviderCx<'a> {
    pub cancel: &'a CancelToken,
    pub diagnostics: &'a mut DiagnosticSink,
}

/// Pluggable source of a method's instruction representation.
///
/// `ir` must be deterministic in (method, context): the context carries all
/// discriminating information, so repeated calls for the same node yield an
/// identical body. Providers that synthesize memoize on that same identity.
pub trait IrProvider {
    /// Short name used in configuration error messages
    fn name(&self) -> &'static str;

    /// Does this provider supply the representation for `node`?
    fn understands(&self, node: &NodeRef<'_>) -> bool;

    fn ir(&mut self, node: &NodeRef<'_>, cx: &mut ProviderCx<'_>) -> Result<Arc<IrBody>>;

    fn call_sites(
        &mut self,
        node: &NodeRef<'_>,
        cx: &mut ProviderCx<'_>,
    ) -> Result<Vec<CallSiteRef>> {
        Ok(self.ir(node, cx)?.call_sites().cloned().collect())
    }

    fn new_sites(
        &mut self,
        node: &NodeRef<'_>,
        cx: &mut ProviderCx<'_>,
    ) -> Result<Vec<NewSiteRef>> {
        Ok(self.ir(node, cx)?.new_sites().cloned().collect())
    }

    fn cfg(&mut self, node: &NodeRef<'_>, cx: &mut ProviderCx<'_>) -> Result<Vec<BasicBlock>> {
        Ok(self.ir(node, cx)?.blocks().to_vec())
    }

    fn def_use(&mut self, node: &NodeRef<'_>, cx: &mut ProviderCx<'_>) -> Result<DefUse> {
        Ok(self.ir(node, cx)?.def_use())
    }
}
