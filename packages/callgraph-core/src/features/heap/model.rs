//! Key interning arena

use super::keys::{InstanceKey, PointerKey};
use crate::shared::models::{InstId, PtrId};
use rustc_hash::FxHashMap;

/// Arena interning instance and pointer keys to dense handles.
///
/// Handles are stable for the lifetime of one construction; interning the
/// same key twice returns the same handle.
#[derive(Debug, Default)]
pub struct HeapModel {
    instances: Vec<InstanceKey>,
    instance_ids: FxHashMap<InstanceKey, InstId>,
    pointers: Vec<PointerKey>,
    pointer_ids: FxHashMap<PointerKey, PtrId>,
}

impl HeapModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern_instance(&mut self, key: InstanceKey) -> InstId {
        if let Some(&id) = self.instance_ids.get(&key) {
            return id;
        }
        let id = InstId(self.instances.len() as u32);
        self.instances.push(key.clone());
        self.instance_ids.insert(key, id);
        id
    }

    pub fn intern_pointer(&mut self, key: PointerKey) -> PtrId {
        if let Some(&id) = self.pointer_ids.get(&key) {
            return id;
        }
        let id = PtrId(self.pointers.len() as u32);
        self.pointers.push(key.clone());
        self.pointer_ids.insert(key, id);
        id
    }

    #[inline]
    pub fn instance(&self, id: InstId) -> &InstanceKey {
        &self.instances[id.index()]
    }

    #[inline]
    pub fn pointer(&self, id: PtrId) -> &PointerKey {
        &self.pointers[id.index()]
    }

    /// Read-only lookup; `None` when the key was never interned
    pub fn pointer_id(&self, key: &PointerKey) -> Option<PtrId> {
        self.pointer_ids.get(key).copied()
    }

    pub fn instance_id(&self, key: &InstanceKey) -> Option<InstId> {
        self.instance_ids.get(key).copied()
    }

    #[inline]
    pub fn num_instances(&self) -> usize {
        self.instances.len()
    }

    #[inline]
    pub fn num_pointers(&self) -> usize {
        self.pointers.len()
    }

    pub fn iter_pointers(&self) -> impl Iterator<Item = (PtrId, &PointerKey)> {
        self.pointers
            .iter()
            .enumerate()
            .map(|(i, k)| (PtrId(i as u32), k))
    }
}
