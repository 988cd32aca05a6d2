//! Instance and pointer keys

use crate::shared::models::{FieldRef, InstId, NodeId, TypeId, Var};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Abstract runtime object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstanceKey {
    /// Objects created at one allocation site in one (method, context) node.
    /// Context sensitivity of the heap falls out of the node component.
    AllocationSite {
        node: NodeId,
        pc: u32,
        ty: TypeId,
        /// Declared element type for container allocations
        element: Option<TypeId>,
    },

    /// Externally modeled object with no allocation site in the analyzed
    /// program (entrypoint arguments, modeled components)
    External { label: String, ty: TypeId },
}

impl InstanceKey {
    /// Concrete runtime type of the abstracted objects
    #[inline]
    pub fn concrete_type(&self) -> TypeId {
        match self {
            InstanceKey::AllocationSite { ty, .. } => *ty,
            InstanceKey::External { ty, .. } => *ty,
        }
    }

    #[inline]
    pub fn element_type(&self) -> Option<TypeId> {
        match self {
            InstanceKey::AllocationSite { element, .. } => *element,
            InstanceKey::External { .. } => None,
        }
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceKey::AllocationSite { node, pc, ty, .. } => {
                write!(f, "alloc@{}:{} in {}", ty, pc, node)
            }
            InstanceKey::External { label, ty } => write!(f, "external<{label}>:{ty}"),
        }
    }
}

/// Abstract storage location tracked by the solver
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerKey {
    /// Local value number in one call-graph node
    Local { node: NodeId, var: Var },

    /// The value a node's method returns
    ReturnValue { node: NodeId },

    /// A static field, shared across all contexts
    StaticField { field: FieldRef },

    /// An instance field qualified by the owning abstract object
    InstanceField { instance: InstId, field: FieldRef },

    /// The merged contents of one abstract array object
    ArrayContents { instance: InstId },
}

impl fmt::Display for PointerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointerKey::Local { node, var } => write!(f, "{node}#{var}"),
            PointerKey::ReturnValue { node } => write!(f, "{node}#ret"),
            PointerKey::StaticField { field } => write!(f, "static {field}"),
            PointerKey::InstanceField { instance, field } => {
                write!(f, "{instance}.{}", field.name)
            }
            PointerKey::ArrayContents { instance } => write!(f, "{instance}[*]"),
        }
    }
}
