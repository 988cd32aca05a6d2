//! Core identifiers and name models
//!
//! Every arena in the engine hands out dense `u32` handles; the newtypes here
//! keep them from being mixed up. Name-bearing models (`TypeName`, `Selector`,
//! `FieldRef`) are immutable and compared by value.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! dense_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

dense_id! {
    /// Interned type handle, owned by the class hierarchy
    TypeId
}

dense_id! {
    /// Interned method handle, owned by the class hierarchy
    MethodId
}

dense_id! {
    /// Call-graph node handle: unique per (method, context) pair
    NodeId
}

dense_id! {
    /// Instance-key handle, owned by the heap model
    InstId
}

dense_id! {
    /// Pointer-key handle, owned by the heap model
    PtrId
}

dense_id! {
    /// Basic-block index within one method body
    BlockId
}

dense_id! {
    /// Local value number within one method body
    Var
}

impl MethodId {
    /// The synthesized root method that invokes all entrypoints.
    /// Never resolved through the class hierarchy.
    pub const FAKE_ROOT: MethodId = MethodId(u32::MAX);

    #[inline]
    pub fn is_fake_root(self) -> bool {
        self == Self::FAKE_ROOT
    }
}

/// Fully qualified type name, compared by value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeName(pub String);

impl TypeName {
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TypeName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Method selector: name + descriptor, the unit of virtual-dispatch lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Selector {
    pub name: String,
    pub descriptor: String,
}

impl Selector {
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }

    /// Selector with the default nullary descriptor, for terse fixtures
    pub fn nullary(name: impl Into<String>) -> Self {
        Self::new(name, "()V")
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.descriptor)
    }
}

/// Field reference: declaring class name + field name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldRef {
    pub declaring: TypeName,
    pub name: String,
}

impl FieldRef {
    pub fn new(declaring: impl Into<TypeName>, name: impl Into<String>) -> Self {
        Self {
            declaring: declaring.into(),
            name: name.into(),
        }
    }
}

impl From<String> for TypeName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.declaring, self.name)
    }
}
