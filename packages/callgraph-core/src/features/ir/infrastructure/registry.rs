//! Provider registry
//!
//! Capability-predicate dispatch over an ordered provider list. Exactly one
//! provider must claim a node; zero or several claims is a configuration
//! error surfaced before any IR is produced. Claims are memoized per node id
//! since node → provider never changes within one construction.

use super::super::ports::{IrProvider, NodeRef};
use crate::errors::{CallGraphError, Result};
use rustc_hash::FxHashMap;
use tracing::debug;

#[derive(Default)]
pub struct IrProviderRegistry {
    providers: Vec<Box<dyn IrProvider>>,
    claims: FxHashMap<crate::shared::models::NodeId, usize>,
}

impl IrProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: Box<dyn IrProvider>) {
        debug!(provider = provider.name(), "registering IR provider");
        self.providers.push(provider);
    }

    /// Highest-priority position; used for the root provider
    pub fn register_front(&mut self, provider: Box<dyn IrProvider>) {
        debug!(provider = provider.name(), "registering IR provider (front)");
        self.providers.insert(0, provider);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Resolve the unique provider for `node`
    pub fn provider_for(&mut self, node: &NodeRef<'_>) -> Result<&mut dyn IrProvider> {
        if let Some(&idx) = self.claims.get(&node.node) {
            return Ok(self.providers[idx].as_mut());
        }

        let claiming: Vec<usize> = self
            .providers
            .iter()
            .enumerate()
            .filter(|(_, p)| p.understands(node))
            .map(|(i, _)| i)
            .collect();

        match claiming.as_slice() {
            [idx] => {
                self.claims.insert(node.node, *idx);
                Ok(self.providers[*idx].as_mut())
            }
            [] => Err(CallGraphError::configuration(format!(
                "no IR provider claims method {} (node {})",
                node.method, node.node
            ))),
            many => {
                let names: Vec<&str> = many.iter().map(|&i| self.providers[i].name()).collect();
                Err(CallGraphError::configuration(format!(
                    "ambiguous IR provider claim for method {}: {}",
                    node.method,
                    names.join(", ")
                )))
            }
        }
    }
}
