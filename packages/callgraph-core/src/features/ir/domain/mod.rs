//! IR domain models
//!
//! - Instruction set: the constraint-relevant categories (alloc, copy,
//!   field/array access, call, return) plus `Opaque` for everything else
//! - `IrBody`: one method's instructions + basic blocks + handler ranges
//! - `DefUse`: per-variable definition and use sites

mod body;
mod instruction;

pub use body::{BasicBlock, DefUse, HandlerRange, IrBody, IrBuilder};
pub use instruction::{CallSiteRef, DispatchKind, Instr, NewSiteRef};
