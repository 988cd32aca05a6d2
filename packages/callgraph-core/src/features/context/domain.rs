//! Context value type
//!
//! Stored as a vec of (tag, item) pairs kept sorted by tag, one entry per
//! tag. Equality, hashing and ordering all derive from that normal form, so
//! two contexts built from the same entries in any order compare equal.

use crate::shared::models::{InstId, MethodId, NodeId, TypeId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed tag set for context entries
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ContextKey {
    /// Calling node (reserved for deeper call-string policies)
    Caller,
    /// Call site: (caller method, program counter)
    CallSite,
    /// Receiver instance the callee was dispatched on
    ReceiverInstance,
    /// Container instance a container-method call was dispatched on
    Container,
    /// Declared element type of that container
    ContainerElement,
    /// Component type a modeled launcher call resolves to
    LaunchTarget,
}

/// Context entry values
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContextItem {
    Node(NodeId),
    Site { method: MethodId, pc: u32 },
    Instance(InstId),
    Type(TypeId),
}

/// Immutable, value-compared context
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Context {
    items: Vec<(ContextKey, ContextItem)>,
}

impl Context {
    /// The context-insensitive (empty) context
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// New context with `key` bound to `item`; rebinding a key replaces it
    pub fn with(mut self, key: ContextKey, item: ContextItem) -> Self {
        match self.items.binary_search_by_key(&key, |(k, _)| *k) {
            Ok(pos) => self.items[pos].1 = item,
            Err(pos) => self.items.insert(pos, (key, item)),
        }
        self
    }

    #[inline]
    pub fn get(&self, key: ContextKey) -> Option<&ContextItem> {
        self.items
            .binary_search_by_key(&key, |(k, _)| *k)
            .ok()
            .map(|pos| &self.items[pos].1)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ContextKey, &ContextItem)> {
        self.items.iter().map(|(k, v)| (*k, v))
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.items.is_empty() {
            return write!(f, "Everywhere");
        }
        write!(f, "[")?;
        for (i, (k, v)) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k:?}={v:?}")?;
        }
        write!(f, "]")
    }
}
