//! Synthesized root provider
//!
//! Serves exactly one body: the fake root method that invokes every
//! entrypoint. The body itself is synthesized by the builder (it owns the
//! entrypoint list and the argument seeding plan); this provider only claims
//! the sentinel method id.

use super::super::domain::IrBody;
use super::super::ports::{IrProvider, NodeRef, ProviderCx};
use crate::errors::Result;
use crate::shared::models::MethodId;
use std::sync::Arc;

pub struct RootIrProvider {
    body: Arc<IrBody>,
}

impl RootIrProvider {
    pub fn new(body: Arc<IrBody>) -> Self {
        debug_assert!(body.method().is_fake_root());
        Self { body }
    }
}

impl IrProvider for RootIrProvider {
    fn name(&self) -> &'static str {
        "synthetic-root"
    }

    fn understands(&self, node: &NodeRef<'_>) -> bool {
        node.method == MethodId::FAKE_ROOT
    }

    fn ir(&mut self, _node: &NodeRef<'_>, cx: &mut ProviderCx<'_>) -> Result<Arc<IrBody>> {
        cx.cancel.check()?;
        Ok(self.body.clone())
    }
}
