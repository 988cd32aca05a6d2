//! Stored-IR provider
//!
//! Stands in for the classfile-backed IR source: bodies are supplied up
//! front in a `MethodStore` and served unchanged for every context. The
//! store is the memo table; bodies are shared `Arc`s.

use super::super::domain::IrBody;
use super::super::ports::{IrProvider, NodeRef, ProviderCx};
use crate::errors::{CallGraphError, Result};
use crate::shared::models::MethodId;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Concrete method bodies keyed by method
#[derive(Debug, Default)]
pub struct MethodStore {
    bodies: FxHashMap<MethodId, Arc<IrBody>>,
}

impl MethodStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, method: MethodId, body: IrBody) {
        debug_assert_eq!(method, body.method());
        self.bodies.insert(method, Arc::new(body));
    }

    pub fn get(&self, method: MethodId) -> Option<Arc<IrBody>> {
        self.bodies.get(&method).cloned()
    }

    #[inline]
    pub fn contains(&self, method: MethodId) -> bool {
        self.bodies.contains_key(&method)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

/// Provider over a `MethodStore`
pub struct StoredIrProvider {
    store: Arc<MethodStore>,
}

impl StoredIrProvider {
    pub fn new(store: Arc<MethodStore>) -> Self {
        Self { store }
    }
}

impl IrProvider for StoredIrProvider {
    fn name(&self) -> &'static str {
        "stored-ir"
    }

    fn understands(&self, node: &NodeRef<'_>) -> bool {
        self.store.contains(node.method)
    }

    fn ir(&mut self, node: &NodeRef<'_>, cx: &mut ProviderCx<'_>) -> Result<Arc<IrBody>> {
        cx.cancel.check()?;
        self.store.get(node.method).ok_or_else(|| {
            // understands() gates this; reaching here is a wiring defect
            CallGraphError::configuration(format!("no stored body for method {}", node.method))
        })
    }
}
