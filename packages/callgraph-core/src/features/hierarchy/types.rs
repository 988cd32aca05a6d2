//! Class and method records

use crate::shared::models::{MethodId, Selector, TypeId, TypeName};
use serde::{Deserialize, Serialize};

/// One resolved class or interface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: TypeName,
    pub superclass: Option<TypeId>,
    pub interfaces: Vec<TypeId>,
    pub is_interface: bool,
    pub is_abstract: bool,

    /// Methods declared directly on this class, in declaration order
    pub methods: Vec<MethodId>,
}

impl ClassInfo {
    /// Can an instance of this type exist at runtime?
    #[inline]
    pub fn is_concrete(&self) -> bool {
        !self.is_interface && !self.is_abstract
    }
}

/// One resolved method; identity is (declaring type, selector)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodInfo {
    pub declaring: TypeId,
    pub selector: Selector,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_public: bool,

    /// Declared parameter types, excluding the receiver
    pub param_types: Vec<TypeName>,
}

impl MethodInfo {
    /// Number of local parameter slots including the receiver
    #[inline]
    pub fn num_param_slots(&self) -> u32 {
        self.param_types.len() as u32 + if self.is_static { 0 } else { 1 }
    }
}
