//! Instruction set
//!
//! Constraint mapping:
//! - `New`                → fresh instance into the destination key
//! - `Assign`             → subset edge
//! - `GetField`/`PutField`→ complex constraints through field keys
//! - `ArrayLoad`/`Store`  → complex constraints through array-contents keys
//! - `GetStatic`/`Put...` → edges through the static-field key
//! - `Invoke`             → dispatch constraint (virtual/interface) or
//!                          immediate edge (static/special)
//! - `Opaque`             → no rule; recorded as a diagnostic

use crate::shared::models::{FieldRef, Selector, TypeName, Var};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a call site selects its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DispatchKind {
    /// Single-dispatch on the runtime receiver type
    Virtual,
    /// Like `Virtual`, declared against an interface
    Interface,
    /// No receiver; target fixed by declared class + selector
    Static,
    /// Receiver-carrying but non-virtual (constructors, super calls)
    Special,
}

impl DispatchKind {
    /// Does resolution wait on the receiver's points-to set?
    #[inline]
    pub fn is_dynamic(self) -> bool {
        matches!(self, DispatchKind::Virtual | DispatchKind::Interface)
    }
}

/// Allocation site within one method body
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NewSiteRef {
    pub pc: u32,
    pub ty: TypeName,

    /// Declared element type for container allocations; feeds
    /// container-sensitive context selection
    pub element: Option<TypeName>,
}

impl NewSiteRef {
    pub fn new(pc: u32, ty: impl Into<TypeName>) -> Self {
        Self {
            pc,
            ty: ty.into(),
            element: None,
        }
    }

    pub fn with_element(mut self, element: impl Into<TypeName>) -> Self {
        self.element = Some(element.into());
        self
    }
}

/// Call site: program point + declared target + dispatch kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallSiteRef {
    pub pc: u32,
    pub declared_class: TypeName,
    pub selector: Selector,
    pub kind: DispatchKind,
}

impl fmt::Display for CallSiteRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}@{} {}.{}",
            self.kind, self.pc, self.declared_class, self.selector
        )
    }
}

/// One register-based instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instr {
    New {
        dest: Var,
        site: NewSiteRef,
    },
    Assign {
        dest: Var,
        src: Var,
    },
    GetField {
        dest: Var,
        obj: Var,
        field: FieldRef,
    },
    PutField {
        obj: Var,
        field: FieldRef,
        value: Var,
    },
    GetStatic {
        dest: Var,
        field: FieldRef,
    },
    PutStatic {
        field: FieldRef,
        value: Var,
    },
    ArrayLoad {
        dest: Var,
        array: Var,
    },
    ArrayStore {
        array: Var,
        value: Var,
    },
    Invoke {
        site: CallSiteRef,
        receiver: Option<Var>,
        args: Vec<Var>,
        dest: Option<Var>,
    },
    Return {
        value: Option<Var>,
    },
    /// Instruction the generator has no rule for
    Opaque {
        mnemonic: String,
    },
}

impl Instr {
    #[inline]
    pub fn is_call(&self) -> bool {
        matches!(self, Instr::Invoke { .. })
    }

    #[inline]
    pub fn call_site(&self) -> Option<&CallSiteRef> {
        match self {
            Instr::Invoke { site, .. } => Some(site),
            _ => None,
        }
    }

    #[inline]
    pub fn new_site(&self) -> Option<&NewSiteRef> {
        match self {
            Instr::New { site, .. } => Some(site),
            _ => None,
        }
    }
}
