//! Constraint model
//!
//! Three shapes, mirroring how they fire:
//! - `FlowEdge`: x ⊇ y, applied on every growth of the source
//! - `ComplexConstraint`: field/array access; watches its base key and
//!   materializes edges through instance-qualified keys as objects arrive
//! - `DispatchConstraint`: dormant until the receiver set is non-empty,
//!   then resolved per concrete receiver type; the only way the call graph
//!   grows

use crate::features::ir::domain::CallSiteRef;
use crate::shared::models::{FieldRef, MethodId, NodeId, PtrId, TypeId};
use serde::{Deserialize, Serialize};

/// Subset edge between two pointer keys, optionally type-filtered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowEdge {
    pub dest: PtrId,
    /// Only instances assignable to this type pass
    pub filter: Option<TypeId>,
}

/// Field/array constraint watching a base pointer key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplexConstraint {
    /// x = y.f : for each o ∈ pts(y), pts(x) ⊇ pts(o.f)
    FieldLoad {
        base: PtrId,
        field: FieldRef,
        dest: PtrId,
    },
    /// y.f = x : for each o ∈ pts(y), pts(o.f) ⊇ pts(x)
    FieldStore {
        base: PtrId,
        field: FieldRef,
        src: PtrId,
    },
    /// x = a[i] : for each o ∈ pts(a), pts(x) ⊇ pts(o[*])
    ArrayLoad { base: PtrId, dest: PtrId },
    /// a[i] = x : for each o ∈ pts(a), pts(o[*]) ⊇ pts(x)
    ArrayStore { base: PtrId, src: PtrId },
}

impl ComplexConstraint {
    /// The pointer key whose growth reactivates this constraint
    #[inline]
    pub fn base(&self) -> PtrId {
        match self {
            ComplexConstraint::FieldLoad { base, .. }
            | ComplexConstraint::FieldStore { base, .. }
            | ComplexConstraint::ArrayLoad { base, .. }
            | ComplexConstraint::ArrayStore { base, .. } => *base,
        }
    }
}

/// Dormant virtual/interface call awaiting receiver instances
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConstraint {
    pub caller: NodeId,
    pub caller_method: MethodId,
    pub site: CallSiteRef,
    /// Receiver pointer key this constraint watches
    pub receiver: PtrId,
    /// Actual-argument pointer keys, receiver excluded
    pub args: Vec<PtrId>,
    /// Caller-side destination of the returned value
    pub dest: Option<PtrId>,
}
