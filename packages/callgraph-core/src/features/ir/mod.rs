//! Intermediate representation
//!
//! The register-based instruction model the constraint generator consumes,
//! the provider port that supplies one body per (method, context), and the
//! provider implementations: stored bodies, the synthesized root, and the
//! lifecycle interpreter that rewrites modeled launcher calls on demand.

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::{
    BasicBlock, CallSiteRef, DefUse, DispatchKind, HandlerRange, Instr, IrBody, IrBuilder,
    NewSiteRef,
};
pub use infrastructure::{
    IrProviderRegistry, LifecycleInterpreter, LifecycleRegistry, MethodStore, RootIrProvider,
    StartInfo, StoredIrProvider,
};
pub use ports::{IrProvider, NodeRef, ProviderCx};
